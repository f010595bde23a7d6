use super::*;
use crate::engine::MasterSolution;
use crate::model::PricingModel;
use tracing::{debug, trace};

/// Outcome of one column generation run that reached LP optimality.
#[derive(Debug, Clone)]
pub struct ColumnGenerationRun {
    /// Master solution over the pool as it stood when pricing stopped
    pub solution: MasterSolution,
    /// Master solves performed
    pub iterations: u32,
    /// Patterns appended to the pool by this run
    pub added: usize,
}

enum State {
    Pricing,
    Optimal(MasterSolution),
}

impl<E: OptimizationEngine> Optimizer<E> {
    /// Solves the restricted master, prices a knapsack column with its duals and
    /// appends it while its reduced cost is negative.
    ///
    /// Engine failures and the iteration cap end the run with an error; the
    /// pool keeps every pattern appended before that.
    pub(super) fn column_generation(
        &self,
        pool: &mut PatternPool,
        demand: &[u32],
    ) -> Result<ColumnGenerationRun> {
        let settings = &self.request.settings;
        let mut iterations = 0;
        let mut added = 0;
        let mut state = State::Pricing;

        loop {
            match state {
                State::Optimal(solution) => {
                    debug!(
                        "Column generation optimal after {} iterations, {} patterns added",
                        iterations, added
                    );
                    return Ok(ColumnGenerationRun {
                        solution,
                        iterations,
                        added,
                    });
                }
                State::Pricing => {
                    if iterations >= settings.max_pricing_iterations {
                        return Err(CuttingStockError::IterationLimit(
                            settings.max_pricing_iterations,
                        ));
                    }
                    iterations += 1;
                    state = self.pricing_step(pool, demand, iterations, &mut added)?;
                }
            }
        }
    }

    fn pricing_step(
        &self,
        pool: &mut PatternPool,
        demand: &[u32],
        iteration: u32,
        added: &mut usize,
    ) -> Result<State> {
        let settings = &self.request.settings;

        let master = MasterModel::from_pool(pool, demand, settings.objective);
        let solution = self
            .engine
            .solve_master(&master)
            .map_err(|source| CuttingStockError::Engine {
                stage: SolveStage::Master,
                source,
            })?;

        let pricing = PricingModel::from_duals(
            pool.bar_length(),
            pool.lengths(),
            &solution.duals,
            settings.objective,
        );
        trace!("Pricing model: {:?}", pricing.text());
        let candidate = self
            .engine
            .solve_pricing(&pricing)
            .map_err(|source| CuttingStockError::Engine {
                stage: SolveStage::Pricing,
                source,
            })?;

        let reduced_cost = pricing.reduced_cost(candidate.objective);
        debug!(
            "Iteration {}: master objective {:.6}, reduced cost {:.6}, candidate {:?}",
            iteration, solution.objective, reduced_cost, candidate.counts
        );

        if reduced_cost >= -settings.reduced_cost_tolerance {
            return Ok(State::Optimal(solution));
        }

        if let Some(existing) = pool.position(&candidate.counts) {
            warn!(
                "Pricing returned pattern {:?} already in the pool at {}; stopping",
                candidate.counts, existing
            );
            return Ok(State::Optimal(solution));
        }

        let index = pool.push(candidate.counts)?;
        *added += 1;
        if let Some(pattern) = pool.get(index) {
            debug!(
                "Added pattern {} using {} of {}, waste {}",
                index + 1,
                pattern.used_length(),
                pool.bar_length(),
                pattern.waste()
            );
        }

        Ok(State::Pricing)
    }
}
