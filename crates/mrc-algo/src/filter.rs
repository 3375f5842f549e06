//! Drops chart rows gated on a design option the current design does not use.

use mrc_core::diagnostics::CATEGORY_FILTER;
use mrc_core::{AccountRow, DesignParameters, Diagnostics};
use tracing::{debug, info};

/// Positions of the rows whose optional-variable gate matches `params`,
/// in chart order.
///
/// A row whose gate variable is absent from `params` is dropped. Every drop
/// is recorded as an info diagnostic naming the account.
pub fn filter_irrelevant(
    rows: &[AccountRow],
    params: &DesignParameters,
    diagnostics: &mut Diagnostics,
) -> Vec<usize> {
    let kept: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| is_relevant(row, params, diagnostics))
        .map(|(i, _)| i)
        .collect();
    info!(
        kept = kept.len(),
        dropped = rows.len() - kept.len(),
        "filtered irrelevant accounts"
    );
    kept
}

/// Gate check for a single row; records a diagnostic when the row is dropped.
fn is_relevant(
    row: &AccountRow,
    params: &DesignParameters,
    diagnostics: &mut Diagnostics,
) -> bool {
    let Some(gate) = &row.gate else {
        return true;
    };
    let actual = params.get(&gate.variable);
    if actual.is_some_and(|v| v.matches(&gate.value)) {
        return true;
    }
    let message = match actual {
        Some(v) => format!(
            "dropped: '{}' is {} (row requires {})",
            gate.variable, v, gate.value
        ),
        None => format!(
            "dropped: '{}' is not set (row requires {})",
            gate.variable, gate.value
        ),
    };
    debug!(account = %row.account, "{}", message);
    diagnostics.add_info_with_entity(CATEGORY_FILTER, &message, row.account.as_str());
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> Vec<AccountRow> {
        vec![
            AccountRow::new(22, 1, "Reactor System"),
            AccountRow::new("222.1", 3, "Primary Pumps").with_gate("Reactor Type", "LTMR"),
            AccountRow::new("222.2", 3, "Compressor").with_gate("Reactor Type", "GCMR"),
            AccountRow::new("222.3", 3, "Heat Pipes").with_gate("Heat Pipe Count", 120.0),
        ]
    }

    #[test]
    fn test_keeps_matching_and_ungated_rows() {
        let params = DesignParameters::new()
            .with("Reactor Type", "LTMR")
            .with("Heat Pipe Count", "120");
        let mut diag = Diagnostics::new();
        let chart = chart();
        let kept = filter_irrelevant(&chart, &params, &mut diag);
        assert_eq!(kept, vec![0, 1, 3]);
        assert_eq!(diag.info_count(), 1);
        assert_eq!(diag.issues[0].entity.as_deref(), Some("222.2"));
    }

    #[test]
    fn test_missing_gate_variable_drops_row() {
        let mut diag = Diagnostics::new();
        let kept = filter_irrelevant(&chart(), &DesignParameters::new(), &mut diag);
        assert_eq!(kept, vec![0]);
        assert_eq!(diag.issues_by_category(CATEGORY_FILTER).count(), 3);
    }
}
