//! Account hierarchy and bottom-up aggregation.
//!
//! The chart of accounts arrives as a flat list where nesting is implied by
//! the level column: an account's children are the following rows one level
//! deeper, up to the next row at its own level or shallower. [`AccountTree`]
//! turns that listing into an explicit parent -> child graph once, so the
//! aggregator walks edges instead of rescanning rows.

use std::fmt;

use mrc_core::AccountRow;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

/// Account-number prefix families aggregated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountFamily {
    /// Pre-construction and direct costs (1x, 2x)
    Base,
    /// Indirect services, owner's and supplementary costs (3x, 4x, 5x)
    Other,
    /// Financial costs (6x)
    Finance,
    /// Annualized O&M and fuel (7x, 8x)
    Annual,
}

impl AccountFamily {
    pub fn prefixes(&self) -> &'static [u32] {
        match self {
            AccountFamily::Base => &[1, 2],
            AccountFamily::Other => &[3, 4, 5],
            AccountFamily::Finance => &[6],
            AccountFamily::Annual => &[7, 8],
        }
    }

    pub fn contains(&self, row: &AccountRow) -> bool {
        row.account
            .leading_digit()
            .map(|d| self.prefixes().contains(&d))
            .unwrap_or(false)
    }
}

impl fmt::Display for AccountFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountFamily::Base => "base",
            AccountFamily::Other => "other",
            AccountFamily::Finance => "finance",
            AccountFamily::Annual => "annual",
        };
        f.write_str(name)
    }
}

/// Parent -> child graph over row positions of a chart.
#[derive(Debug, Clone)]
pub struct AccountTree {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
    levels: Vec<u32>,
    max_level: u32,
    detached: Vec<usize>,
}

impl AccountTree {
    /// Build the tree from the level column.
    ///
    /// A row nested more than one level below its closest open ancestor, or
    /// a row below level 0 with no ancestor at all, gets no parent. It keeps
    /// its own value and its own children but is summed into no account.
    /// This is what happens to the children of a filtered-out row that sat
    /// above the deepest level.
    pub fn build(rows: &[AccountRow]) -> Self {
        let mut graph = DiGraph::with_capacity(rows.len(), rows.len());
        let nodes: Vec<NodeIndex> = (0..rows.len()).map(|i| graph.add_node(i)).collect();
        let mut open: Vec<usize> = Vec::new();
        let mut detached = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            while open.last().is_some_and(|&a| rows[a].level >= row.level) {
                open.pop();
            }
            match open.last() {
                Some(&parent) if row.level == rows[parent].level + 1 => {
                    graph.add_edge(nodes[parent], nodes[i], ());
                }
                None if row.level == 0 => {}
                closest => {
                    debug!(
                        account = %row.account,
                        level = row.level,
                        ancestor = ?closest.map(|&a| rows[a].account.to_string()),
                        "account has no parent one level up"
                    );
                    detached.push(i);
                }
            }
            open.push(i);
        }

        Self {
            graph,
            nodes,
            levels: rows.iter().map(|r| r.level).collect(),
            max_level: rows.iter().map(|r| r.level).max().unwrap_or(0),
            detached,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Child row positions in chart order.
    pub fn children(&self, row: usize) -> Vec<usize> {
        let mut children: Vec<usize> = self
            .graph
            .neighbors_directed(self.nodes[row], Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        children.sort_unstable();
        children
    }

    /// Rows below level 0 that no account rolls up, in chart order.
    pub fn detached(&self) -> &[usize] {
        &self.detached
    }

    /// Row positions at a level, in chart order.
    pub fn rows_at_level(&self, level: u32) -> impl Iterator<Item = usize> + '_ {
        self.levels
            .iter()
            .enumerate()
            .filter(move |(_, l)| **l == level)
            .map(|(i, _)| i)
    }
}

/// Fill missing values of `family` rows with the sum of their children,
/// deepest level first.
///
/// Rows that already hold a value are left as they are. A childless row
/// without a value becomes 0, and a child with no value contributes 0.
pub fn aggregate(
    tree: &AccountTree,
    rows: &[AccountRow],
    values: &mut [Option<f64>],
    family: AccountFamily,
) {
    for level in (0..=tree.max_level()).rev() {
        let pending: Vec<usize> = tree
            .rows_at_level(level)
            .filter(|&i| values[i].is_none() && family.contains(&rows[i]))
            .collect();
        for i in pending {
            let total: f64 = tree
                .children(i)
                .into_iter()
                .map(|c| values[c].unwrap_or(0.0))
                .sum();
            debug!(account = %rows[i].account, family = %family, total, "aggregated");
            values[i] = Some(total);
        }
    }
}
