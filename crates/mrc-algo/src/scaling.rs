//! Cost scaler: sizes each leaf account from its cost law.
//!
//! Standard rows use a fixed term plus a unit cost scaled by one design
//! parameter, optionally normalized around a reference value:
//!
//! ```text
//! cost = fixed + unit * x                              (no reference)
//! cost = fixed + unit * x^exponent / v_ref^(exponent - 1)   (reference v_ref)
//! ```
//!
//! Non-standard rows look their law up in the [`LawRegistry`] and compute
//! `multiplier * unit * x^exponent`; the offsite staffing law scales with
//! `(1/x)^exponent` instead. A declared scaling variable equal to zero means
//! the subsystem is absent and the row costs exactly 0.

use mrc_core::{
    AccountId, AccountRow, DesignParameters, LawRegistry, MrcError, MrcResult, NonStandardLaw,
    ParamKey, Stage,
};
use tracing::debug;

use crate::inflation::AdjustedCosts;

/// Enrichment at or above which the fuel premium applies.
const PREMIUM_ENRICHMENT: f64 = 0.10;
/// Highest enrichment the fuel premium law covers (HALEU limit).
const MAX_ENRICHMENT: f64 = 0.20;
const HALEU_PREMIUM: f64 = 1.15;

/// Estimated cost of one row, or `None` if the row has no cost law.
pub fn scale(
    row: &AccountRow,
    adjusted: &AdjustedCosts,
    params: &DesignParameters,
    laws: &LawRegistry,
) -> MrcResult<Option<f64>> {
    if !row.has_cost_law() {
        return Ok(None);
    }

    let x = match &row.scaling {
        Some(spec) => {
            let x = params
                .number(&spec.variable, Stage::Scaling)
                .map_err(|err| with_account(err, &row.account))?;
            if x == 0.0 {
                debug!(account = %row.account, variable = %spec.variable, "scaling variable is zero");
                return Ok(Some(0.0));
            }
            Some(x)
        }
        None => None,
    };

    let cost = if row.standard_equation {
        standard_cost(row, adjusted, x)
    } else {
        let law = laws.law_for(&row.account).ok_or_else(|| {
            MrcError::config(
                Stage::Scaling,
                format!(
                    "account {} uses a non-standard cost equation but no law is registered for it",
                    row.account
                ),
            )
        })?;
        let multiplier = law_multiplier(law, params, &row.account)?;
        let term = match (&row.scaling, x) {
            (Some(spec), Some(x)) if law == NonStandardLaw::OffsiteOperatorStaffing => {
                (1.0 / x).powf(spec.exponent)
            }
            (Some(spec), Some(x)) => x.powf(spec.exponent),
            _ => 1.0,
        };
        debug!(account = %row.account, law = %law, multiplier, "non-standard law");
        multiplier * adjusted.unit * term
    };

    if !cost.is_finite() {
        return Err(MrcError::domain(
            Stage::Scaling,
            &row.account,
            format!("estimated cost is not finite ({})", cost),
        ));
    }
    debug!(account = %row.account, cost, "scaled");
    Ok(Some(cost))
}

fn standard_cost(row: &AccountRow, adjusted: &AdjustedCosts, x: Option<f64>) -> f64 {
    match (&row.scaling, x) {
        (Some(spec), Some(x)) => match spec.reference_value {
            Some(v_ref) => {
                adjusted.fixed + adjusted.unit * x.powf(spec.exponent) / v_ref.powf(spec.exponent - 1.0)
            }
            None => adjusted.fixed + adjusted.unit * x,
        },
        _ => adjusted.fixed,
    }
}

/// Cost multiplier of a non-standard law for the current design.
pub fn law_multiplier(
    law: NonStandardLaw,
    params: &DesignParameters,
    account: &AccountId,
) -> MrcResult<f64> {
    let get = |key: ParamKey| {
        params
            .require(key, Stage::Scaling)
            .map_err(|err| with_account(err, account))
    };
    match law {
        NonStandardLaw::Pump => {
            let efficiency = get(ParamKey::PumpIsentropicEfficiency)?;
            Ok(0.2 / (1.0 - efficiency) + 1.0)
        }
        NonStandardLaw::Compressor => {
            let efficiency = get(ParamKey::CompressorIsentropicEfficiency)?;
            let ratio = get(ParamKey::CompressorPressureRatio)?;
            if ratio <= 0.0 {
                return Err(MrcError::domain(
                    Stage::Scaling,
                    account,
                    format!("compressor pressure ratio must be positive (got {})", ratio),
                ));
            }
            Ok(1.0 / (0.95 - efficiency) * ratio * ratio.ln())
        }
        NonStandardLaw::FuelEnrichmentPremium => {
            enrichment_premium(get(ParamKey::Enrichment)?, account)
        }
        NonStandardLaw::OnsiteOperatorStaffing => get(ParamKey::FtesPerOnsiteOperatorPerYear),
        NonStandardLaw::OffsiteOperatorStaffing => get(ParamKey::FtesPerOffsiteOperator),
        NonStandardLaw::SecurityStaffing => get(ParamKey::FtesPerSecurityStaff),
        NonStandardLaw::DecommissioningAnnuity => {
            let rate = get(ParamKey::AnnualReturn)?;
            let years = get(ParamKey::LevelizationPeriod)?;
            Ok(annuity_factor(rate, years))
        }
        NonStandardLaw::RefuelingLabor => get(ParamKey::FtesPerOperatorPerRefueling),
    }
}

/// Fuel cost premium for an enrichment fraction.
pub fn enrichment_premium(enrichment: f64, account: &AccountId) -> MrcResult<f64> {
    if !(0.0..=MAX_ENRICHMENT).contains(&enrichment) {
        return Err(MrcError::domain(
            Stage::Scaling,
            account,
            format!(
                "enrichment {} is outside the fuel cost law range [0, {}]",
                enrichment, MAX_ENRICHMENT
            ),
        ));
    }
    Ok(if enrichment < PREMIUM_ENRICHMENT {
        1.0
    } else {
        HALEU_PREMIUM
    })
}

/// Yearly payment that accumulates 1 dollar after `years` at `rate`.
pub fn annuity_factor(rate: f64, years: f64) -> f64 {
    if rate.abs() < 1e-10 {
        1.0 / years
    } else {
        -rate / (1.0 - (1.0 + rate).powf(years))
    }
}

fn with_account(err: MrcError, account: &AccountId) -> MrcError {
    match err {
        MrcError::Config { stage, message } => MrcError::Config {
            stage,
            message: format!("account {}: {}", account, message),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_inflation(row: &AccountRow) -> AdjustedCosts {
        AdjustedCosts {
            multiplier: 1.0,
            fixed: row.fixed_cost.unwrap_or(0.0),
            unit: row.unit_cost.unwrap_or(0.0),
            range: row.cost_range,
        }
    }

    fn run(row: &AccountRow, params: &DesignParameters) -> MrcResult<Option<f64>> {
        scale(row, &no_inflation(row), params, &LawRegistry::default())
    }

    #[test]
    fn test_row_without_cost_law_is_unsized() {
        let row = AccountRow::new(21, 1, "Structures");
        assert_eq!(run(&row, &DesignParameters::new()).unwrap(), None);
    }

    #[test]
    fn test_standard_linear_law() {
        let row = AccountRow::new(12, 1, "Permits")
            .with_fixed_cost(0.0, 2020)
            .with_unit_cost(500.0, 2020)
            .with_scaling("X", 1.0, None);
        let params = DesignParameters::new().with("X", 10.0);
        assert_eq!(run(&row, &params).unwrap(), Some(5000.0));
    }

    #[test]
    fn test_reference_law_at_reference_point() {
        for exponent in [0.6, 0.8, 1.0, 1.3] {
            let row = AccountRow::new("221.1", 3, "Vessel")
                .with_fixed_cost(2500.0, 2023)
                .with_unit_cost(42.0, 2023)
                .with_scaling("Vessel Mass", exponent, Some(7300.0));
            let params = DesignParameters::new().with("Vessel Mass", 7300.0);
            let cost = run(&row, &params).unwrap().unwrap();
            assert!((cost - (2500.0 + 42.0 * 7300.0)).abs() < 1e-6, "exponent {}", exponent);
        }
    }

    #[test]
    fn test_zero_scaling_variable_is_zero_cost() {
        let standard = AccountRow::new(213, 2, "Turbine Building")
            .with_fixed_cost(1.0e6, 2023)
            .with_unit_cost(900.0, 2023)
            .with_scaling("Turbine Volume", -0.5, Some(10.0));
        let pump = AccountRow::new("222.1", 3, "Primary Pumps")
            .with_unit_cost(1.0e5, 2023)
            .with_scaling("Pump Power", 0.6, None)
            .non_standard();
        let params = DesignParameters::new()
            .with("Turbine Volume", 0.0)
            .with("Pump Power", 0.0);
        assert_eq!(run(&standard, &params).unwrap(), Some(0.0));
        assert_eq!(run(&pump, &params).unwrap(), Some(0.0));
    }

    #[test]
    fn test_missing_scaling_variable_is_config_error() {
        let row = AccountRow::new(12, 1, "Permits")
            .with_unit_cost(500.0, 2020)
            .with_scaling("X", 1.0, None);
        let err = run(&row, &DesignParameters::new()).unwrap_err();
        assert!(matches!(err, MrcError::Config { stage: Stage::Scaling, .. }));
        assert!(err.to_string().contains("account 12"));
    }

    #[test]
    fn test_pump_law() {
        let row = AccountRow::new("222.1", 3, "Primary Pumps")
            .with_unit_cost(1000.0, 2023)
            .with_scaling("Pump Power", 1.0, None)
            .non_standard();
        let params = DesignParameters::new()
            .with("Pump Power", 2.0)
            .with("Pump Isentropic Efficiency", 0.8);
        let cost = run(&row, &params).unwrap().unwrap();
        assert!((cost - 2.0 * 1000.0 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_compressor_law() {
        let account = AccountId::new("222.2");
        let params = DesignParameters::new()
            .with("Compressor Isentropic Efficiency", 0.85)
            .with("Compressor Pressure Ratio", 2.0);
        let m = law_multiplier(NonStandardLaw::Compressor, &params, &account).unwrap();
        assert!((m - 10.0 * 2.0 * 2f64.ln()).abs() < 1e-9);

        let bad = params.clone().with("Compressor Pressure Ratio", 0.0);
        assert!(matches!(
            law_multiplier(NonStandardLaw::Compressor, &bad, &account),
            Err(MrcError::Domain { .. })
        ));
    }

    #[test]
    fn test_enrichment_premium_bands() {
        let id = AccountId::new("251");
        assert_eq!(enrichment_premium(0.05, &id).unwrap(), 1.0);
        assert_eq!(enrichment_premium(0.10, &id).unwrap(), 1.15);
        assert_eq!(enrichment_premium(0.1975, &id).unwrap(), 1.15);
        assert_eq!(enrichment_premium(0.20, &id).unwrap(), 1.15);
    }

    #[test]
    fn test_enrichment_above_limit_is_domain_error() {
        let row = AccountRow::new(251, 2, "Fuel")
            .with_unit_cost(3000.0, 2023)
            .with_scaling("Fuel Mass", 1.0, None)
            .non_standard();
        let params = DesignParameters::new()
            .with("Fuel Mass", 100.0)
            .with("Enrichment", 0.25);
        let err = run(&row, &params).unwrap_err();
        match err {
            MrcError::Domain { account, stage, .. } => {
                assert_eq!(account, "251");
                assert_eq!(stage, Stage::Scaling);
            }
            other => panic!("expected domain error, got {other}"),
        }
    }

    #[test]
    fn test_offsite_staffing_scales_inversely() {
        let row = AccountRow::new(712, 2, "Offsite Operators")
            .with_unit_cost(150_000.0, 2023)
            .with_scaling("Reactors Monitored Per Operator", 1.0, None)
            .non_standard();
        let params = DesignParameters::new()
            .with("Reactors Monitored Per Operator", 10.0)
            .with("FTEs Per Offsite Operator (24/7)", 5.0);
        let cost = run(&row, &params).unwrap().unwrap();
        assert!((cost - 5.0 * 150_000.0 / 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_law_without_scaling_variable_applies_once() {
        let row = AccountRow::new(711, 2, "Onsite Operators")
            .with_unit_cost(120_000.0, 2023)
            .non_standard();
        let params = DesignParameters::new().with("FTEs Per Onsite Operator Per Year", 4.2);
        let cost = run(&row, &params).unwrap().unwrap();
        assert!((cost - 4.2 * 120_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_annuity_factor() {
        let f = annuity_factor(0.05, 10.0);
        // sinking fund: payments accumulate to 1
        let fv: f64 = (0..10).map(|k| f * 1.05f64.powi(k)).sum();
        assert!((fv - 1.0).abs() < 1e-12);
        assert!((annuity_factor(0.0, 40.0) - 0.025).abs() < 1e-15);
    }

    #[test]
    fn test_unregistered_non_standard_account() {
        let row = AccountRow::new(999, 1, "Mystery").with_fixed_cost(1.0, 2023).non_standard();
        let err = run(&row, &DesignParameters::new()).unwrap_err();
        assert!(matches!(err, MrcError::Config { stage: Stage::Scaling, .. }));
    }

    #[test]
    fn test_non_finite_result_is_domain_error() {
        let row = AccountRow::new("222.1", 3, "Primary Pumps")
            .with_unit_cost(1000.0, 2023)
            .non_standard();
        let params = DesignParameters::new().with("Pump Isentropic Efficiency", 1.0);
        assert!(matches!(
            run(&row, &params),
            Err(MrcError::Domain { stage: Stage::Scaling, .. })
        ));
    }
}
