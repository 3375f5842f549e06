//! Cost uncertainty sampling.
//!
//! Rows may carry low and high ends for their fixed and unit costs. Each
//! sample redraws those costs from the chosen distribution, reruns stages 3
//! to 8 of the estimate, and accumulates per-account and per-summary mean
//! and population standard deviation for both columns. Rows without both
//! ends keep their baseline cost in every sample.

use std::fmt;
use std::str::FromStr;

use mrc_core::{
    AccountRow, ColumnPair, CostColumn, CostReport, DesignParameters, MrcError, MrcResult,
    ReportRow, Stage, SummaryFigures, SummaryKey,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::estimate::{CostEngine, CostEstimate, PreparedChart};
use crate::inflation::AdjustedCosts;

/// Draws before a truncated-normal sample is declared unreachable.
const MAX_REJECTIONS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingDistribution {
    /// Log-space mean and spread of low, high and baseline
    Lognormal,
    /// Normal around the baseline with std (high - low)/4, clipped to [low, high]
    TruncatedNormal,
    Uniform,
}

impl fmt::Display for SamplingDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SamplingDistribution::Lognormal => "lognormal",
            SamplingDistribution::TruncatedNormal => "truncated-normal",
            SamplingDistribution::Uniform => "uniform",
        };
        f.write_str(name)
    }
}

impl FromStr for SamplingDistribution {
    type Err = MrcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "lognormal" => Ok(SamplingDistribution::Lognormal),
            "truncated-normal" => Ok(SamplingDistribution::TruncatedNormal),
            "uniform" => Ok(SamplingDistribution::Uniform),
            _ => Err(MrcError::config(
                Stage::Sampling,
                format!("unavailable distribution '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub samples: usize,
    pub distribution: SamplingDistribution,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            distribution: SamplingDistribution::Lognormal,
            seed: 42,
        }
    }
}

/// One cost drawn between `low` and `high` around `baseline`.
pub fn draw<R: Rng>(
    distribution: SamplingDistribution,
    low: f64,
    high: f64,
    baseline: f64,
    rng: &mut R,
    account: &str,
) -> MrcResult<f64> {
    let domain = |message: String| MrcError::domain(Stage::Sampling, account, message);
    if low > high {
        return Err(domain(format!("low end {} is above high end {}", low, high)));
    }
    match distribution {
        SamplingDistribution::Lognormal => {
            if low <= 0.0 || baseline <= 0.0 {
                return Err(domain(format!(
                    "lognormal sampling needs positive costs (low {}, baseline {}, high {})",
                    low, baseline, high
                )));
            }
            let logs = [low.ln(), high.ln(), baseline.ln()];
            let mu = logs.iter().sum::<f64>() / 3.0;
            let sigma = (logs.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / 3.0).sqrt();
            if sigma == 0.0 {
                return Ok(mu.exp());
            }
            let dist = LogNormal::new(mu, sigma).map_err(|e| domain(e.to_string()))?;
            Ok(dist.sample(rng))
        }
        SamplingDistribution::TruncatedNormal => {
            let std = (high - low) / 4.0;
            if std == 0.0 {
                return Ok(low);
            }
            // Mean stays inside the truncation range
            let mean = baseline.clamp(low, high);
            let dist = Normal::new(mean, std).map_err(|e| domain(e.to_string()))?;
            for _ in 0..MAX_REJECTIONS {
                let value = dist.sample(rng);
                if (low..=high).contains(&value) {
                    return Ok(value);
                }
            }
            Err(domain(format!(
                "no truncated-normal draw within [{}, {}] around {}",
                low, high, baseline
            )))
        }
        SamplingDistribution::Uniform => {
            if low == high {
                return Ok(low);
            }
            Ok(rng.gen_range(low..=high))
        }
    }
}

/// Adjusted costs with every ranged component redrawn.
pub fn perturb<R: Rng>(
    rows: &[AccountRow],
    adjusted: &[AdjustedCosts],
    distribution: SamplingDistribution,
    rng: &mut R,
) -> MrcResult<Vec<AdjustedCosts>> {
    rows.iter()
        .zip(adjusted)
        .map(|(row, costs)| -> MrcResult<AdjustedCosts> {
            let mut sampled = *costs;
            if let Some((low, high)) = costs.range.fixed() {
                sampled.fixed = draw(distribution, low, high, costs.fixed, rng, row.account.as_str())?;
            }
            if let Some((low, high)) = costs.range.unit() {
                sampled.unit = draw(distribution, low, high, costs.unit, rng, row.account.as_str())?;
            }
            Ok(sampled)
        })
        .collect()
}

/// Running mean and population variance.
#[derive(Debug, Clone, Copy, Default)]
struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    fn std(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.m2 / self.count as f64).sqrt())
    }
}

/// Result of a sampling run.
#[derive(Debug, Clone)]
pub struct SampledEstimate {
    /// Evaluation at the unperturbed costs
    pub baseline: CostEstimate,
    pub samples: usize,
    pub mean: ColumnPair<Vec<Option<f64>>>,
    pub std: ColumnPair<Vec<Option<f64>>>,
    pub summary_mean: ColumnPair<SummaryFigures>,
    pub summary_std: ColumnPair<SummaryFigures>,
}

impl SampledEstimate {
    /// Report with sample means as values and their spread as std columns.
    pub fn into_report(self, params: DesignParameters, design_id: Option<String>) -> CostReport {
        let mut rows: Vec<ReportRow> = self
            .baseline
            .table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| ReportRow {
                account: row.account.to_string(),
                level: Some(row.level),
                title: row.title.clone(),
                foak: self.mean.foak[i],
                noak: self.mean.noak[i],
                foak_std: self.std.foak[i],
                noak_std: self.std.noak[i],
            })
            .collect();
        rows.extend(SummaryKey::ALL.into_iter().map(|key| ReportRow {
            account: key.key().to_string(),
            level: None,
            title: key.title().to_string(),
            foak: Some(self.summary_mean.foak.get(key)),
            noak: Some(self.summary_mean.noak.get(key)),
            foak_std: Some(self.summary_std.foak.get(key)),
            noak_std: Some(self.summary_std.noak.get(key)),
        }));
        CostReport {
            design_id,
            escalation_year: self.baseline.escalation_year,
            samples: Some(self.samples),
            rows,
            summary: self.summary_mean,
            summary_std: Some(self.summary_std),
            parameters: params,
            diagnostics: self.baseline.diagnostics,
        }
    }
}

/// Run `config.samples` perturbed evaluations of a prepared chart.
///
/// Any fatal error in a sample aborts the whole run.
pub fn sample_estimate(
    engine: &CostEngine<'_>,
    prepared: &PreparedChart,
    config: &SamplingConfig,
) -> MrcResult<SampledEstimate> {
    if config.samples == 0 {
        return Err(MrcError::config(
            Stage::Sampling,
            "at least one sample is required",
        ));
    }
    let baseline = engine.evaluate(prepared)?;
    let rows = prepared.rows.len();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut account_stats = ColumnPair::new(
        vec![RunningStats::default(); rows],
        vec![RunningStats::default(); rows],
    );
    let mut summary_stats: ColumnPair<[RunningStats; 9]> = ColumnPair::default();

    for sample in 0..config.samples {
        let adjusted = perturb(&prepared.rows, &prepared.adjusted, config.distribution, &mut rng)?;
        let estimate = engine.evaluate_with(prepared, &adjusted)?;
        for column in CostColumn::BOTH {
            let stats = account_stats.get_mut(column);
            for (slot, value) in stats.iter_mut().zip(estimate.table.column(column)) {
                if let Some(v) = value {
                    slot.push(*v);
                }
            }
            let figures = estimate.summary.get(column);
            for (slot, key) in summary_stats.get_mut(column).iter_mut().zip(SummaryKey::ALL) {
                slot.push(figures.get(key));
            }
        }
        debug!(sample, lcoe = estimate.lcoe(CostColumn::Foak), "sample evaluated");
    }

    let mut summary_mean = ColumnPair::<SummaryFigures>::default();
    let mut summary_std = ColumnPair::<SummaryFigures>::default();
    for column in CostColumn::BOTH {
        for (stats, key) in summary_stats.get(column).iter().zip(SummaryKey::ALL) {
            summary_mean.get_mut(column).set(key, stats.mean().unwrap_or(f64::NAN));
            summary_std.get_mut(column).set(key, stats.std().unwrap_or(f64::NAN));
        }
    }
    let collect = |f: fn(&RunningStats) -> Option<f64>| {
        ColumnPair::new(
            account_stats.foak.iter().map(f).collect::<Vec<_>>(),
            account_stats.noak.iter().map(f).collect::<Vec<_>>(),
        )
    };
    let mean = collect(RunningStats::mean);
    let std = collect(RunningStats::std);

    info!(
        samples = config.samples,
        distribution = %config.distribution,
        lcoe_mean = summary_mean.foak.lcoe,
        lcoe_std = summary_std.foak.lcoe,
        "sampling complete"
    );
    Ok(SampledEstimate {
        baseline,
        samples: config.samples,
        mean,
        std,
        summary_mean,
        summary_std,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_parse() {
        assert_eq!(
            "Truncated Normal".parse::<SamplingDistribution>().unwrap(),
            SamplingDistribution::TruncatedNormal
        );
        assert_eq!(
            "lognormal".parse::<SamplingDistribution>().unwrap(),
            SamplingDistribution::Lognormal
        );
        assert!("Beta".parse::<SamplingDistribution>().is_err());
    }

    #[test]
    fn test_draws_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let t = draw(SamplingDistribution::TruncatedNormal, 80.0, 150.0, 100.0, &mut rng, "11")
                .unwrap();
            assert!((80.0..=150.0).contains(&t));
            let u = draw(SamplingDistribution::Uniform, 80.0, 150.0, 100.0, &mut rng, "11").unwrap();
            assert!((80.0..=150.0).contains(&u));
            let l = draw(SamplingDistribution::Lognormal, 80.0, 150.0, 100.0, &mut rng, "11").unwrap();
            assert!(l > 0.0);
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        for dist in [
            SamplingDistribution::Lognormal,
            SamplingDistribution::TruncatedNormal,
            SamplingDistribution::Uniform,
        ] {
            let v = draw(dist, 5.0, 5.0, 5.0, &mut rng, "11").unwrap();
            assert!((v - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_truncated_normal_baseline_outside_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for baseline in [1.0e9, -50.0] {
            for _ in 0..200 {
                let v = draw(SamplingDistribution::TruncatedNormal, 10.0, 20.0, baseline, &mut rng, "73")
                    .unwrap();
                assert!((10.0..=20.0).contains(&v), "{} outside [10, 20]", v);
            }
        }
    }

    #[test]
    fn test_lognormal_rejects_non_positive() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = draw(SamplingDistribution::Lognormal, 0.0, 10.0, 5.0, &mut rng, "212A").unwrap_err();
        assert!(matches!(err, MrcError::Domain { stage: Stage::Sampling, .. }));
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let a: Vec<f64> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..5)
                .map(|_| draw(SamplingDistribution::Uniform, 0.0, 1.0, 0.5, &mut rng, "x").unwrap())
                .collect()
        };
        let mut rng = StdRng::seed_from_u64(99);
        for expected in a {
            let v = draw(SamplingDistribution::Uniform, 0.0, 1.0, 0.5, &mut rng, "x").unwrap();
            assert_eq!(v, expected);
        }
    }

    #[test]
    fn test_running_stats_population_std() {
        let mut stats = RunningStats::default();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(v);
        }
        assert!((stats.mean().unwrap() - 5.0).abs() < 1e-12);
        assert!((stats.std().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(RunningStats::default().mean(), None);
    }
}
