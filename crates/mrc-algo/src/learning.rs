//! FOAK to NOAK projection.
//!
//! Each scaled leaf carries a learning tag. Most tags name a multiplier the
//! economics table supplies directly; onsite learning follows the unit
//! learning curve `(1 - rate)^log2(units)`. A row without a recognized tag
//! gets an undefined (NaN) NOAK cost and a warning, never a silent 1 or 0.

use mrc_core::diagnostics::CATEGORY_LEARNING;
use mrc_core::{
    AccountRow, CostColumn, DesignParameters, Diagnostics, LearningCategory, MrcError, MrcResult,
    ParamKey, Stage,
};
use tracing::{info, warn};

use crate::table::CostTable;

/// Unit learning curve: cost of the `units`-th unit relative to the first.
pub fn learning_rate_multiplier(rate: f64, units: f64) -> f64 {
    (1.0 - rate).powf(units.log2())
}

/// NOAK/FOAK ratio for a row.
///
/// Unknown or missing tags return the non-fatal [`MrcError::LearningCurve`];
/// a known tag whose parameter is absent is a configuration error.
pub fn noak_multiplier(row: &AccountRow, params: &DesignParameters) -> MrcResult<f64> {
    let stage = Stage::Projection;
    let direct = |key: ParamKey| {
        params.require(key, stage).map_err(|err| match err {
            MrcError::Config { stage, message } => MrcError::Config {
                stage,
                message: format!("account {}: {}", row.account, message),
            },
            other => other,
        })
    };
    match &row.learning {
        Some(LearningCategory::NoLearning) => direct(ParamKey::NoLearningMultiplier),
        Some(LearningCategory::LicensingLearning) => direct(ParamKey::LicensingLearningMultiplier),
        Some(LearningCategory::FactoryPrimaryStructure) => {
            direct(ParamKey::FactoryPrimaryStructureMultiplier)
        }
        Some(LearningCategory::FactoryDrums) => direct(ParamKey::FactoryDrumsMultiplier),
        Some(LearningCategory::FactoryOther) => direct(ParamKey::FactoryOtherMultiplier),
        Some(LearningCategory::OnsiteLearning) => {
            let rate = direct(ParamKey::OnsiteLearningRate)?;
            let units = direct(ParamKey::NumberOfUnits)?;
            if !(0.0..1.0).contains(&rate) {
                return Err(MrcError::domain(
                    stage,
                    &row.account,
                    format!("onsite learning rate must be in [0, 1) (got {})", rate),
                ));
            }
            if units < 1.0 {
                return Err(MrcError::domain(
                    stage,
                    &row.account,
                    format!("number of units must be at least 1 (got {})", units),
                ));
            }
            Ok(learning_rate_multiplier(rate, units))
        }
        Some(LearningCategory::Unrecognized(tag)) => Err(MrcError::LearningCurve {
            account: row.account.to_string(),
            tag: tag.clone(),
        }),
        None => Err(MrcError::LearningCurve {
            account: row.account.to_string(),
            tag: String::new(),
        }),
    }
}

/// Fill the NOAK column for every row the scaler sized.
pub fn project_leaves(
    table: &mut CostTable,
    params: &DesignParameters,
    diagnostics: &mut Diagnostics,
) -> MrcResult<()> {
    let mut undefined = 0usize;
    let mut noak = vec![None; table.len()];
    for (i, (row, foak, _)) in table.entries().enumerate() {
        let Some(foak) = foak else { continue };
        let multiplier = match noak_multiplier(row, params) {
            Ok(m) => m,
            Err(err) if !err.is_fatal() => {
                warn!(account = %row.account, "{}", err);
                diagnostics.add_warning_with_entity(
                    CATEGORY_LEARNING,
                    &err.to_string(),
                    row.account.as_str(),
                );
                undefined += 1;
                f64::NAN
            }
            Err(err) => return Err(err),
        };
        noak[i] = Some(foak * multiplier);
    }
    for (slot, value) in table.column_mut(CostColumn::Noak).iter_mut().zip(noak) {
        if value.is_some() {
            *slot = value;
        }
    }
    info!(undefined, "projected FOAK costs to NOAK");
    Ok(())
}
