//! Levelized cost of electricity.
//!
//! Year 0 carries the capital outlay and no generation; years
//! `1..=lifetime` carry the annual cost and a full year of output at the
//! capacity factor. Both streams are discounted at the same rate:
//!
//! ```text
//! LCOE = sum(cost_i / (1+r)^i) / sum(generation_i / (1+r)^i)
//! ```

use mrc_core::{AccountId, MrcError, MrcResult, Stage};

/// Hours in a generation year.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Discounted cost and discounted generation over the plant life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountedTotals {
    pub cost: f64,
    /// MWh
    pub generation: f64,
}

pub fn discounted_totals(
    capital_cost: f64,
    annual_cost: f64,
    discount_rate: f64,
    lifetime_years: u32,
    power_mwe: f64,
    capacity_factor: f64,
) -> DiscountedTotals {
    let yearly_generation = power_mwe * capacity_factor * HOURS_PER_YEAR;
    let mut totals = DiscountedTotals {
        cost: capital_cost,
        generation: 0.0,
    };
    for year in 1..=lifetime_years {
        let discount = (1.0 + discount_rate).powi(year as i32);
        totals.cost += annual_cost / discount;
        totals.generation += yearly_generation / discount;
    }
    totals
}

/// LCOE in $/MWh.
pub fn lcoe(
    capital_cost: f64,
    annual_cost: f64,
    discount_rate: f64,
    lifetime_years: u32,
    power_mwe: f64,
    capacity_factor: f64,
) -> MrcResult<f64> {
    let totals = discounted_totals(
        capital_cost,
        annual_cost,
        discount_rate,
        lifetime_years,
        power_mwe,
        capacity_factor,
    );
    if totals.generation <= 0.0 || !totals.generation.is_finite() {
        return Err(MrcError::domain(
            Stage::Levelization,
            "LCOE",
            format!(
                "discounted generation is {} (check power, capacity factor and levelization period)",
                totals.generation
            ),
        ));
    }
    Ok(totals.cost / totals.generation)
}

/// Split of the plant LCOE by account.
///
/// Accounts below 70 are capital spent in year 0, the rest recur every year.
/// The contributions sum to the LCOE of the summed capital and annual costs.
pub fn lcoe_contributions(
    costs: &[(AccountId, f64)],
    discount_rate: f64,
    lifetime_years: u32,
    power_mwe: f64,
    capacity_factor: f64,
) -> MrcResult<Vec<(AccountId, f64)>> {
    let unit = discounted_totals(0.0, 1.0, discount_rate, lifetime_years, power_mwe, capacity_factor);
    if unit.generation <= 0.0 || !unit.generation.is_finite() {
        return Err(MrcError::domain(
            Stage::Levelization,
            "LCOE",
            format!("discounted generation is {}", unit.generation),
        ));
    }
    Ok(costs
        .iter()
        .map(|(account, cost)| {
            let is_capital = account.as_number().map(|n| n < 70.0).unwrap_or(true);
            let share = if is_capital {
                cost / unit.generation
            } else {
                cost * unit.cost / unit.generation
            };
            (account.clone(), share)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_holds() {
        let cases = [
            (1.2e8, 3.5e6, 0.07, 60, 10.0, 0.93),
            (5.0e7, 1.0e6, 0.03, 20, 1.5, 0.5),
            (2.0e9, 8.0e7, 0.12, 40, 300.0, 1.0),
        ];
        for (capital, annual, r, life, power, cf) in cases {
            let value = lcoe(capital, annual, r, life, power, cf).unwrap();
            let totals = discounted_totals(capital, annual, r, life, power, cf);
            let rel = (value * totals.generation - totals.cost).abs() / totals.cost;
            assert!(rel < 1e-12);
        }
    }

    #[test]
    fn test_single_year_by_hand() {
        // 1 MW at full output for one year, r = 0: (1000 + 100) / 8760
        let value = lcoe(1000.0, 100.0, 0.0, 1, 1.0, 1.0).unwrap();
        assert!((value - 1100.0 / 8760.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_lifetime_is_domain_error() {
        assert!(matches!(
            lcoe(1000.0, 100.0, 0.05, 0, 1.0, 1.0),
            Err(MrcError::Domain { stage: Stage::Levelization, .. })
        ));
    }

    #[test]
    fn test_contributions_sum_to_lcoe() {
        let costs = vec![
            (AccountId::new("20"), 8.0e7),
            (AccountId::new("30"), 2.0e7),
            (AccountId::new("60"), 5.0e6),
            (AccountId::new("70"), 2.0e6),
            (AccountId::new("80"), 1.5e6),
        ];
        let parts = lcoe_contributions(&costs, 0.07, 60, 10.0, 0.93).unwrap();
        let total: f64 = parts.iter().map(|(_, v)| v).sum();
        let expected = lcoe(1.05e8, 3.5e6, 0.07, 60, 10.0, 0.93).unwrap();
        assert!((total - expected).abs() / expected < 1e-12);
    }
}
