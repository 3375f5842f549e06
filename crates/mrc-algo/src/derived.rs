//! Accounts computed by formula rather than by summing children.
//!
//! Every function here reads already-aggregated accounts of one column and
//! writes results back into that same column, so FOAK and NOAK totals never
//! mix. Undefined (NaN) inputs pass straight through; a non-finite result
//! from finite inputs is a domain error naming the account.

use std::f64::consts::PI;

use mrc_core::{
    CostColumn, EconomicAssumptions, MrcError, MrcResult, PlantFigures, Stage, SummaryFigures,
};
use tracing::debug;

use crate::table::CostTable;

/// Days per year used to turn fuel lifetime into refueling cycles.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Top-level accounts whose sum is the overnight capital cost.
pub const OCC_ACCOUNTS: [u32; 5] = [10, 20, 30, 40, 50];

fn checked(value: f64, inputs: &[f64], account: &str, what: &str) -> MrcResult<f64> {
    if value.is_finite() || inputs.iter().any(|v| !v.is_finite()) {
        Ok(value)
    } else {
        Err(MrcError::domain(
            Stage::Derived,
            account,
            format!("{} is not finite ({})", what, value),
        ))
    }
}

/// Accounts 31, 32, 75 and 82, computed after the base family is summed.
pub fn indirect_costs(
    table: &mut CostTable,
    column: CostColumn,
    economics: &EconomicAssumptions,
    plant: &PlantFigures,
) -> MrcResult<()> {
    let a20 = table.value(column, 20)?;
    let a21 = table.value(column, 21)?;
    let a22 = table.value(column, 22)?;
    let a23 = table.value(column, 23)?;
    let a25 = table.value(column, 25)?;
    let ratio = economics.indirect_to_direct_field_cost;

    let a31 = checked(
        ratio * (a21 + a22 + a23),
        &[ratio, a21, a22, a23],
        "31",
        "factory and field indirect cost",
    )?;
    let a32 = checked(
        a21 * (a31 / a22),
        &[a21, a31],
        "32",
        "construction supervision cost (is account 22 zero?)",
    )?;
    let maintenance = economics.maintenance_to_direct_cost_ratio;
    let a75 = checked(a20 * maintenance, &[a20, maintenance], "75", "decommissioning cost")?;
    let cycle_years = plant.fuel_lifetime_days / DAYS_PER_YEAR;
    let a82 = checked(
        a25 / cycle_years,
        &[a25, plant.fuel_lifetime_days],
        "82",
        "annualized fuel cost (is the fuel lifetime zero?)",
    )?;

    debug!(column = %column, a31, a32, a75, a82, "indirect accounts");
    table.set(column, 31, a31)?;
    table.set(column, 32, a32)?;
    table.set(column, 75, a75)?;
    table.set(column, 82, a82)?;
    Ok(())
}

/// Interest accrued on `occ` over the construction period.
pub fn interest_during_construction(economics: &EconomicAssumptions, occ: f64) -> f64 {
    let growth = (1.0 + economics.interest_rate).ln();
    let years = economics.construction_duration_months / 12.0;
    let b = 1.0 + (growth * years).exp();
    let c = (growth * years / PI).powi(2) + 1.0;
    economics.debt_to_equity_ratio * occ * (0.5 * b / c - 1.0)
}

/// OCC figures for a column; also writes interest into account 62.
pub fn capital_summary(
    table: &mut CostTable,
    column: CostColumn,
    economics: &EconomicAssumptions,
    plant: &PlantFigures,
    summary: &mut SummaryFigures,
) -> MrcResult<()> {
    let mut occ = 0.0;
    for account in OCC_ACCOUNTS {
        if !table.contains(account) {
            return Err(MrcError::config(
                Stage::Derived,
                format!("overnight capital cost needs account {} in the chart", account),
            ));
        }
        occ += table.value(column, account)?;
    }
    let kwe = plant.power_kwe();
    let fuel = table.value(column, 25)?;

    summary.occ = occ;
    summary.occ_per_kw = checked(occ / kwe, &[occ], "OCC per kW", "OCC per kW (is Power MWe zero?)")?;
    summary.occ_excl_fuel = occ - fuel;
    summary.occ_excl_fuel_per_kw = checked(
        summary.occ_excl_fuel / kwe,
        &[occ, fuel],
        "OCC excl. fuel per kW",
        "OCC excluding fuel per kW",
    )?;

    let interest = checked(
        interest_during_construction(economics, occ),
        &[occ, economics.interest_rate, economics.construction_duration_months],
        "62",
        "interest during construction",
    )?;
    table.set(column, 62, interest)?;
    debug!(column = %column, occ, interest, "capital summary");
    Ok(())
}

/// Total capital investment once the finance family is summed.
pub fn total_capital(
    table: &CostTable,
    column: CostColumn,
    plant: &PlantFigures,
    summary: &mut SummaryFigures,
) -> MrcResult<()> {
    let a60 = table.value(column, 60)?;
    summary.tci = summary.occ + a60;
    summary.tci_per_kw = checked(
        summary.tci / plant.power_kwe(),
        &[summary.tci],
        "TCI per kW",
        "TCI per kW (is Power MWe zero?)",
    )?;
    Ok(())
}

/// Annualized cost once the annual family is summed.
pub fn annualized_cost(
    table: &CostTable,
    column: CostColumn,
    plant: &PlantFigures,
    summary: &mut SummaryFigures,
) -> MrcResult<()> {
    let a70 = table.value(column, 70)?;
    let a80 = table.value(column, 80)?;
    summary.ac = a70 + a80;
    summary.ac_per_mwh = checked(
        summary.ac / plant.annual_electricity_production,
        &[summary.ac],
        "AC per MWh",
        "AC per MWh (is the annual electricity production zero?)",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrc_core::AccountRow;

    fn economics() -> EconomicAssumptions {
        EconomicAssumptions {
            interest_rate: 0.07,
            capacity_factor: 0.93,
            construction_duration_months: 24.0,
            debt_to_equity_ratio: 0.5,
            levelization_period_years: 60,
            indirect_to_direct_field_cost: 0.3,
            maintenance_to_direct_cost_ratio: 0.1,
        }
    }

    fn plant() -> PlantFigures {
        PlantFigures {
            power_mwe: 10.0,
            fuel_lifetime_days: 730.5,
            annual_electricity_production: 80_000.0,
            escalation_year: 2023,
        }
    }

    fn table() -> CostTable {
        let rows = vec![
            AccountRow::new(20, 0, "Direct"),
            AccountRow::new(21, 1, "Structures"),
            AccountRow::new(22, 1, "Reactor"),
            AccountRow::new(23, 1, "Energy Conversion"),
            AccountRow::new(25, 1, "Fuel"),
            AccountRow::new(30, 0, "Indirect"),
            AccountRow::new(31, 1, "Field Indirect"),
            AccountRow::new(32, 1, "Supervision"),
            AccountRow::new(70, 0, "O&M"),
            AccountRow::new(75, 1, "Decommissioning"),
            AccountRow::new(80, 0, "Fuel Cost"),
            AccountRow::new(82, 1, "Fuel"),
        ];
        let mut t = CostTable::new(rows).unwrap();
        for (account, value) in [(20, 1000.0), (21, 100.0), (22, 400.0), (23, 200.0), (25, 300.0)] {
            t.set(CostColumn::Foak, account, value).unwrap();
        }
        t
    }

    #[test]
    fn test_indirect_costs() {
        let mut t = table();
        indirect_costs(&mut t, CostColumn::Foak, &economics(), &plant()).unwrap();
        assert!((t.value(CostColumn::Foak, 31).unwrap() - 210.0).abs() < 1e-9);
        assert!((t.value(CostColumn::Foak, 32).unwrap() - 52.5).abs() < 1e-9);
        assert!((t.value(CostColumn::Foak, 75).unwrap() - 100.0).abs() < 1e-9);
        assert!((t.value(CostColumn::Foak, 82).unwrap() - 150.0).abs() < 1e-9);
        assert!(t.value(CostColumn::Noak, 31).is_err());
    }

    #[test]
    fn test_zero_reactor_account_is_domain_error() {
        let mut t = table();
        t.set(CostColumn::Foak, 22, 0.0).unwrap();
        t.set(CostColumn::Foak, 21, 0.0).unwrap();
        t.set(CostColumn::Foak, 23, 0.0).unwrap();
        let err = indirect_costs(&mut t, CostColumn::Foak, &economics(), &plant()).unwrap_err();
        assert!(matches!(err, MrcError::Domain { ref account, .. } if account == "32"));
    }

    #[test]
    fn test_nan_inputs_propagate() {
        let mut t = table();
        for (account, value) in [(20, f64::NAN), (21, 1.0), (22, f64::NAN), (23, 1.0), (25, 1.0)] {
            t.set(CostColumn::Noak, account, value).unwrap();
        }
        indirect_costs(&mut t, CostColumn::Noak, &economics(), &plant()).unwrap();
        assert!(t.value(CostColumn::Noak, 31).unwrap().is_nan());
        assert!(t.value(CostColumn::Noak, 75).unwrap().is_nan());
        assert_eq!(t.value(CostColumn::Noak, 82).unwrap(), 0.5);
    }

    #[test]
    fn test_interest_zero_rate_is_zero() {
        let mut econ = economics();
        econ.interest_rate = 0.0;
        assert_eq!(interest_during_construction(&econ, 1.0e9), 0.0);
    }

    #[test]
    fn test_interest_positive() {
        let interest = interest_during_construction(&economics(), 1.0e8);
        // half of the debt share accrues roughly one year of interest
        assert!(interest > 0.0);
        assert!(interest < 0.5 * 1.0e8 * 0.07 * 2.0);
    }

    #[test]
    fn test_missing_occ_account_is_config_error() {
        let mut t = table();
        let mut summary = SummaryFigures::default();
        let err = capital_summary(&mut t, CostColumn::Foak, &economics(), &plant(), &mut summary)
            .unwrap_err();
        assert!(matches!(err, MrcError::Config { stage: Stage::Derived, .. }));
        assert!(err.to_string().contains("10"));
    }
}
