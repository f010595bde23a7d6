//! Boundary to the mathematical optimization engine.
//!
//! The column generation loop only sees [`OptimizationEngine`]: it hands over a
//! [`MasterModel`] or a [`PricingModel`] and gets primal values, dual values and
//! an objective back. [`GoodLpEngine`] is the default adapter, built on `good_lp`
//! with the pure-Rust `microlp` simplex backend.

use crate::model::{MasterModel, PricingModel};
use good_lp::{
    constraint, microlp, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::{trace, warn};

/// Why the engine could not return an optimum
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("problem is infeasible")]
    Infeasible,

    #[error("problem is unbounded")]
    Unbounded,

    #[error("solver error: {0}")]
    Failed(String),
}

impl From<ResolutionError> for EngineError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::Infeasible => EngineError::Infeasible,
            ResolutionError::Unbounded => EngineError::Unbounded,
            other => EngineError::Failed(other.to_string()),
        }
    }
}

/// Optimal solution of a restricted master LP
#[derive(Debug, Clone, PartialEq)]
pub struct MasterSolution {
    /// One value per column, in column order
    pub quantities: Vec<f64>,
    /// One shadow price per demand row, in row order
    pub duals: Vec<f64>,
    pub objective: f64,
}

/// Optimal solution of a pricing knapsack
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSolution {
    pub counts: Vec<u32>,
    pub objective: f64,
}

/// Solves the two programs column generation needs.
///
/// Implementations must not keep per-call state: the same engine may serve
/// several independent instances.
pub trait OptimizationEngine {
    fn solve_master(&self, model: &MasterModel) -> Result<MasterSolution, EngineError>;

    fn solve_pricing(&self, model: &PricingModel) -> Result<PricingSolution, EngineError>;
}

impl<E: OptimizationEngine + ?Sized> OptimizationEngine for &E {
    fn solve_master(&self, model: &MasterModel) -> Result<MasterSolution, EngineError> {
        (**self).solve_master(model)
    }

    fn solve_pricing(&self, model: &PricingModel) -> Result<PricingSolution, EngineError> {
        (**self).solve_pricing(model)
    }
}

/// `good_lp` adapter using the `microlp` backend.
///
/// `microlp` reports primal values only, so the master duals come from solving
/// the LP dual explicitly: maximize `sum d_j * pi_j` s.t. `sum_j a_ij * pi_j <= c_i`,
/// `pi >= 0`. Any optimal dual vertex prices columns correctly.
#[derive(Debug, Clone)]
pub struct GoodLpEngine {
    /// Largest tolerated gap between primal and dual objective before warning
    pub duality_tolerance: f64,
}

impl Default for GoodLpEngine {
    fn default() -> Self {
        Self {
            duality_tolerance: 1e-6,
        }
    }
}

impl GoodLpEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn solve_primal(&self, model: &MasterModel) -> Result<Vec<f64>, EngineError> {
        let mut vars = variables!();
        let ys: Vec<Variable> = (0..model.num_columns())
            .map(|i| vars.add(variable().min(0.0).name(format!("y{}", i + 1))))
            .collect();

        let objective: Expression = ys
            .iter()
            .zip(model.costs())
            .map(|(&y, &cost)| cost * y)
            .sum();

        let mut problem = vars.minimise(objective).using(microlp);
        for (row, &demand) in model.demand().iter().enumerate() {
            let covered: Expression = ys
                .iter()
                .enumerate()
                .map(|(column, &y)| f64::from(model.coefficient(column, row)) * y)
                .sum();
            problem = problem.with(constraint!(covered >= f64::from(demand)));
        }

        let solution = problem.solve()?;
        Ok(ys
            .iter()
            .map(|&y| solution.value(y).max(0.0))
            .collect())
    }

    fn solve_dual(&self, model: &MasterModel) -> Result<Vec<f64>, EngineError> {
        let mut vars = variables!();
        let pis: Vec<Variable> = (0..model.num_rows())
            .map(|j| vars.add(variable().min(0.0).name(format!("pi{}", j + 1))))
            .collect();

        let objective: Expression = pis
            .iter()
            .zip(model.demand())
            .map(|(&pi, &demand)| f64::from(demand) * pi)
            .sum();

        let mut problem = vars.maximise(objective).using(microlp);
        for (column, &cost) in model.costs().iter().enumerate() {
            let priced: Expression = pis
                .iter()
                .enumerate()
                .map(|(row, &pi)| f64::from(model.coefficient(column, row)) * pi)
                .sum();
            problem = problem.with(constraint!(priced <= cost));
        }

        let solution = problem.solve()?;
        Ok(pis
            .iter()
            .map(|&pi| solution.value(pi).max(0.0))
            .collect())
    }
}

impl OptimizationEngine for GoodLpEngine {
    fn solve_master(&self, model: &MasterModel) -> Result<MasterSolution, EngineError> {
        if model.num_columns() == 0 {
            return if model.demand().iter().all(|&demand| demand == 0) {
                Ok(MasterSolution {
                    quantities: Vec::new(),
                    duals: vec![0.0; model.num_rows()],
                    objective: 0.0,
                })
            } else {
                Err(EngineError::Infeasible)
            };
        }

        let quantities = self.solve_primal(model)?;
        let duals = self.solve_dual(model)?;

        let objective: f64 = quantities
            .iter()
            .zip(model.costs())
            .map(|(q, c)| q * c)
            .sum();
        let dual_objective: f64 = duals
            .iter()
            .zip(model.demand())
            .map(|(pi, &d)| pi * f64::from(d))
            .sum();

        let gap = (objective - dual_objective).abs();
        if gap > self.duality_tolerance * objective.abs().max(1.0) {
            warn!(
                "Duality gap of {:.3e} between master ({:.6}) and dual ({:.6})",
                gap, objective, dual_objective
            );
        }
        trace!("Master solved: objective {:.6}, duals {:?}", objective, duals);

        Ok(MasterSolution {
            quantities,
            duals,
            objective,
        })
    }

    fn solve_pricing(&self, model: &PricingModel) -> Result<PricingSolution, EngineError> {
        let mut vars = variables!();
        let xs: Vec<Variable> = model
            .upper_bounds()
            .iter()
            .enumerate()
            .map(|(i, &max)| {
                vars.add(
                    variable()
                        .integer()
                        .min(0)
                        .max(max)
                        .name(format!("x{}", i + 1)),
                )
            })
            .collect();

        if xs.is_empty() {
            return Ok(PricingSolution {
                counts: Vec::new(),
                objective: 0.0,
            });
        }

        let objective: Expression = xs
            .iter()
            .zip(model.profits())
            .map(|(&x, &profit)| profit * x)
            .sum();
        let used: Expression = xs
            .iter()
            .zip(model.lengths())
            .map(|(&x, &length)| f64::from(length) * x)
            .sum();

        let solution = vars
            .maximise(objective)
            .using(microlp)
            .with(constraint!(used <= f64::from(model.bar_length())))
            .solve()?;

        let counts: Vec<u32> = xs
            .iter()
            .map(|&x| solution.value(x).round().max(0.0) as u32)
            .collect();
        let objective = counts
            .iter()
            .zip(model.profits())
            .map(|(&count, &profit)| f64::from(count) * profit)
            .sum();

        Ok(PricingSolution { counts, objective })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::types::MasterObjective;

    fn master(bar_length: u32, lengths: &[u32], counts: &[&[u32]], demand: &[u32]) -> MasterModel {
        let patterns: Vec<Pattern> = counts
            .iter()
            .map(|c| Pattern::new(c.to_vec(), bar_length, lengths).unwrap())
            .collect();
        MasterModel::from_patterns(&patterns, demand, MasterObjective::Bars)
    }

    #[test]
    fn test_master_on_homogeneous_basis() {
        let model = master(100, &[30, 45], &[&[3, 0], &[0, 2]], &[5, 3]);
        let solution = GoodLpEngine::new().solve_master(&model).unwrap();

        assert!((solution.quantities[0] - 5.0 / 3.0).abs() < 1e-6);
        assert!((solution.quantities[1] - 1.5).abs() < 1e-6);
        assert!((solution.objective - (5.0 / 3.0 + 1.5)).abs() < 1e-6);
        assert!((solution.duals[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((solution.duals[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_master_without_columns() {
        let engine = GoodLpEngine::new();
        let empty = MasterModel::new(Vec::new(), Vec::new(), vec![0, 0]);
        assert_eq!(engine.solve_master(&empty).unwrap().duals, vec![0.0, 0.0]);

        let uncovered = MasterModel::new(Vec::new(), Vec::new(), vec![1]);
        assert_eq!(engine.solve_master(&uncovered), Err(EngineError::Infeasible));
    }

    #[test]
    fn test_pricing_knapsack() {
        // (3,0) -> 1.05, (1,1) -> 1.0, (0,2) -> 1.3
        let model = PricingModel::from_duals(100, &[30, 45], &[0.35, 0.65], MasterObjective::Bars);
        let solution = GoodLpEngine::new().solve_pricing(&model).unwrap();

        assert_eq!(solution.counts, vec![0, 2]);
        assert!((solution.objective - 1.3).abs() < 1e-9);
        assert!(model.reduced_cost(solution.objective) < 0.0);
    }
}
