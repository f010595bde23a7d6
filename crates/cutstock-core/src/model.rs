//! Linear models shared by the engine adapter and the text formatter.
//!
//! The same `MasterModel` value is handed to [`crate::engine::OptimizationEngine`]
//! and rendered by [`MasterModel::text`], so what gets printed is what gets solved.

use crate::pattern::{Pattern, PatternPool};
use crate::types::*;

/// Covering LP over a fixed set of patterns:
/// minimize `sum c_i * y_i` s.t. `sum_i a_ij * y_i >= d_j`, `y >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterModel {
    columns: Vec<Vec<u32>>,
    costs: Vec<f64>,
    demand: Vec<u32>,
}

impl MasterModel {
    pub fn new(columns: Vec<Vec<u32>>, costs: Vec<f64>, demand: Vec<u32>) -> Self {
        debug_assert_eq!(columns.len(), costs.len());
        debug_assert!(columns.iter().all(|column| column.len() == demand.len()));
        Self {
            columns,
            costs,
            demand,
        }
    }

    pub fn from_patterns<'a>(
        patterns: impl IntoIterator<Item = &'a Pattern>,
        demand: &[u32],
        objective: MasterObjective,
    ) -> Self {
        let (columns, costs) = patterns
            .into_iter()
            .map(|pattern| (pattern.counts().to_vec(), column_cost(pattern, objective)))
            .unzip();
        Self::new(columns, costs, demand.to_vec())
    }

    pub fn from_pool(pool: &PatternPool, demand: &[u32], objective: MasterObjective) -> Self {
        Self::from_patterns(pool.iter(), demand, objective)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.demand.len()
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn demand(&self) -> &[u32] {
        &self.demand
    }

    /// Units of item `row` cut by pattern `column`.
    pub fn coefficient(&self, column: usize, row: usize) -> u32 {
        self.columns[column][row]
    }

    pub fn objective_text(&self) -> String {
        if self.columns.is_empty() {
            return "Minimize: 0".to_string();
        }
        let terms: Vec<String> = self
            .costs
            .iter()
            .enumerate()
            .map(|(i, &cost)| format!("{} * x{}", format_coefficient(cost), i + 1))
            .collect();
        format!("Minimize: {}", terms.join(" + "))
    }

    /// One covering row per item, then the non-negativity line.
    pub fn constraint_texts(&self) -> Vec<String> {
        let mut constraints: Vec<String> = (0..self.num_rows())
            .map(|row| {
                let terms: Vec<String> = (0..self.num_columns())
                    .map(|column| format!("{} * x{}", self.coefficient(column, row), column + 1))
                    .collect();
                let lhs = if terms.is_empty() {
                    "0".to_string()
                } else {
                    terms.join(" + ")
                };
                format!("{} >= {}", lhs, self.demand[row])
            })
            .collect();

        if !self.columns.is_empty() {
            let variables: Vec<String> = (1..=self.num_columns()).map(|i| format!("x{i}")).collect();
            constraints.push(format!("{} >= 0", variables.join(", ")));
        }
        constraints
    }

    pub fn text(&self) -> ModelText {
        ModelText {
            objective: self.objective_text(),
            constraints: self.constraint_texts(),
        }
    }
}

/// Cost of one bar cut with `pattern` under the chosen master objective.
pub fn column_cost(pattern: &Pattern, objective: MasterObjective) -> f64 {
    match objective {
        MasterObjective::Bars => 1.0,
        MasterObjective::Waste => f64::from(pattern.waste()),
    }
}

/// Unbounded integer knapsack priced with master duals:
/// maximize `sum p_i * x_i` s.t. `sum l_i * x_i <= L`, `x` integer and non-negative.
///
/// A candidate column's reduced cost is `base_cost - objective`.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingModel {
    bar_length: u32,
    lengths: Vec<u32>,
    profits: Vec<f64>,
    base_cost: f64,
}

impl PricingModel {
    pub fn new(bar_length: u32, lengths: Vec<u32>, profits: Vec<f64>, base_cost: f64) -> Self {
        debug_assert_eq!(lengths.len(), profits.len());
        Self {
            bar_length,
            lengths,
            profits,
            base_cost,
        }
    }

    /// Builds the pricing problem for the given duals.
    ///
    /// With the bar-count objective every column costs 1, so the profits are the
    /// duals. With the waste objective a column costs `L - sum l_i * x_i`, which
    /// folds the item lengths into the profits and moves `L` to the base cost.
    pub fn from_duals(
        bar_length: u32,
        lengths: &[u32],
        duals: &[f64],
        objective: MasterObjective,
    ) -> Self {
        match objective {
            MasterObjective::Bars => Self::new(bar_length, lengths.to_vec(), duals.to_vec(), 1.0),
            MasterObjective::Waste => Self::new(
                bar_length,
                lengths.to_vec(),
                duals
                    .iter()
                    .zip(lengths)
                    .map(|(&dual, &length)| dual + f64::from(length))
                    .collect(),
                f64::from(bar_length),
            ),
        }
    }

    pub fn bar_length(&self) -> u32 {
        self.bar_length
    }

    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    pub fn profits(&self) -> &[f64] {
        &self.profits
    }

    pub fn base_cost(&self) -> f64 {
        self.base_cost
    }

    /// Per-item upper bounds implied by the capacity row.
    pub fn upper_bounds(&self) -> Vec<u32> {
        crate::enumerate::max_counts(self.bar_length, &self.lengths)
    }

    pub fn reduced_cost(&self, objective: f64) -> f64 {
        self.base_cost - objective
    }

    pub fn text(&self) -> ModelText {
        let objective: Vec<String> = self
            .profits
            .iter()
            .enumerate()
            .map(|(i, &profit)| format!("{} * x{}", format_coefficient(profit), i + 1))
            .collect();
        let capacity: Vec<String> = self
            .lengths
            .iter()
            .enumerate()
            .map(|(i, length)| format!("{} * x{}", length, i + 1))
            .collect();
        let variables: Vec<String> = (1..=self.lengths.len()).map(|i| format!("x{i}")).collect();

        ModelText {
            objective: format!("Maximize: {}", objective.join(" + ")),
            constraints: vec![
                format!("{} <= {}", capacity.join(" + "), self.bar_length),
                format!("{} >= 0, integer", variables.join(", ")),
            ],
        }
    }
}

/// Whole numbers print without a fractional part, everything else with four decimals.
fn format_coefficient(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.4}")
    }
}
