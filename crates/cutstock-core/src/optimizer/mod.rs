use crate::engine::{GoodLpEngine, OptimizationEngine};
use crate::enumerate::{homogeneous_basis, select_homogeneous, usable_patterns};
use crate::model::MasterModel;
use crate::pattern::PatternPool;
use crate::types::*;
use tracing::{info, warn};

mod column_generation;
pub mod ffd;
mod summary;
pub mod truncation;

pub use column_generation::ColumnGenerationRun;
pub use summary::{merge_rows, summarize};

/// Solves one-dimensional cutting stock instances by column generation,
/// then rounds the LP optimum to whole bars with truncation and FFD.
pub struct Optimizer<E = GoodLpEngine> {
    request: CuttingStockRequest,
    engine: E,
}

impl Optimizer<GoodLpEngine> {
    /// Validates requests and builds an optimizer backed by the default engine.
    pub fn new(request: CuttingStockRequest) -> Result<Self> {
        Self::with_engine(request, GoodLpEngine::default())
    }
}

impl<E: OptimizationEngine> Optimizer<E> {
    /// Validates requests and builds an optimizer backed by `engine`.
    pub fn with_engine(request: CuttingStockRequest, engine: E) -> Result<Self> {
        if request.bar_length == 0 {
            return Err(CuttingStockError::InvalidInput(
                "Bar length must be positive".to_string(),
            ));
        }

        if request.items.is_empty() {
            return Err(CuttingStockError::InvalidInput(
                "At least one item type must be provided".to_string(),
            ));
        }

        for (index, item) in request.items.iter().enumerate() {
            if item.length == 0 {
                return Err(CuttingStockError::InvalidInput(format!(
                    "'{}' has zero length",
                    item.label(index)
                )));
            }

            if item.length > request.bar_length {
                return Err(CuttingStockError::ItemExceedsBar {
                    index: index + 1,
                    length: item.length,
                    bar_length: request.bar_length,
                });
            }
        }

        let settings = &request.settings;
        if settings.max_pricing_iterations == 0 || settings.max_phases == 0 {
            return Err(CuttingStockError::InvalidInput(
                "Iteration and phase limits must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("reduced_cost_tolerance", settings.reduced_cost_tolerance),
            ("integrality_tolerance", settings.integrality_tolerance),
        ] {
            if !(0.0..0.5).contains(&value) {
                return Err(CuttingStockError::InvalidInput(format!(
                    "{name} must lie in [0, 0.5), got {value}"
                )));
            }
        }

        Ok(Self { request, engine })
    }

    /// Executes the full flow: seed the pool, run the phases, merge the plan.
    pub fn optimize(&self) -> Result<CuttingStockResult> {
        let bar_length = self.request.bar_length;
        let lengths = self.request.lengths();
        let demand = self.request.demand();

        info!(
            "Solving cutting stock: bar length {}, {} item types, {} pieces demanded",
            bar_length,
            lengths.len(),
            demand.iter().map(|&d| u64::from(d)).sum::<u64>()
        );

        let (basis, enumerated_patterns, enumerated_model) =
            match usable_patterns(bar_length, &lengths, self.request.settings.enumeration_limit) {
                Some(enumerated) => {
                    info!("Enumerated {} feasible patterns", enumerated.len());
                    let model =
                        MasterModel::from_patterns(&enumerated, &demand, MasterObjective::Waste);
                    (
                        select_homogeneous(&enumerated, lengths.len()),
                        enumerated.iter().map(|p| p.row()).collect(),
                        Some(model.text()),
                    )
                }
                None => {
                    info!(
                        "Pattern space exceeds {} combinations, skipping enumeration",
                        self.request.settings.enumeration_limit
                    );
                    (homogeneous_basis(bar_length, &lengths)?, Vec::new(), None)
                }
            };

        let mut pool = PatternPool::with_patterns(bar_length, lengths, basis);
        let phases = self.run_phases(&mut pool, demand)?;

        let plan = merge_rows(phases.iter().flat_map(|phase| phase.rows.iter().cloned()));
        let summary = summarize(&plan, self.request.items.len());

        info!(
            "Cutting plan ready: {} bars, total waste {}",
            summary.bars_used, summary.total_waste
        );

        Ok(CuttingStockResult {
            bar_length,
            items: self.request.items.clone(),
            enumerated_patterns,
            enumerated_model,
            patterns: pool.rows(),
            phases,
            plan,
            summary,
        })
    }

    /// Truncate-then-recurse, as a loop over residual demand.
    ///
    /// Every phase re-runs column generation on what is still missing. A phase
    /// whose truncation commits nothing hands the residual to FFD and ends the
    /// loop; so does reaching `max_phases` or a phase that commits bars without
    /// reducing the residual.
    fn run_phases(&self, pool: &mut PatternPool, demand: Vec<u32>) -> Result<Vec<Phase>> {
        let settings = &self.request.settings;
        let mut phases = Vec::new();
        let mut residual = demand;

        while residual.iter().any(|&d| d > 0) {
            let number = phases.len() as u32 + 1;

            if number > settings.max_phases {
                warn!(
                    "Reached {} phases, packing the remaining demand with FFD",
                    settings.max_phases
                );
                phases.push(self.ffd_phase(number, residual, None)?);
                break;
            }

            let run = self.column_generation(pool, &residual)?;
            info!(
                "Phase {}: LP objective {:.4} after {} iterations, {} patterns added, {} in pool",
                number,
                run.solution.objective,
                run.iterations,
                run.added,
                pool.len()
            );
            let relaxation = self.relaxation(pool, &run);
            let truncation = truncation::truncate(
                pool,
                &run.solution.quantities,
                &residual,
                settings.integrality_tolerance,
            );

            if !truncation.is_usable() {
                info!(
                    "Phase {}: truncation left no whole bar, switching to FFD",
                    number
                );
                phases.push(self.ffd_phase(number, truncation.residual, Some(relaxation))?);
                break;
            }

            let rows = truncation.rows(pool);
            let committed = total(&residual) - total(&truncation.residual);
            info!(
                "Phase {}: committed {} bars over {} patterns, {} pieces still open",
                number,
                rows.iter().map(|row| row.quantity).sum::<f64>(),
                rows.len(),
                total(&truncation.residual)
            );

            phases.push(Phase {
                number,
                kind: PhaseKind::Truncation,
                demand: residual,
                relaxation: Some(relaxation),
                summary: summarize(&rows, pool.lengths().len()),
                rows,
                residual_demand: truncation.residual.clone(),
            });
            residual = truncation.residual;

            if committed == 0 && residual.iter().any(|&d| d > 0) {
                warn!(
                    "Phase {} did not reduce the residual demand, packing it with FFD",
                    number
                );
                phases.push(self.ffd_phase(number + 1, residual, None)?);
                break;
            }
        }

        Ok(phases)
    }

    fn ffd_phase(
        &self,
        number: u32,
        demand: Vec<u32>,
        relaxation: Option<Relaxation>,
    ) -> Result<Phase> {
        let bars = ffd::first_fit_decreasing(self.request.bar_length, &self.request.lengths(), &demand)?;
        let rows: Vec<PlanRow> = ffd::group_bars(&bars)
            .into_iter()
            .map(|(pattern, quantity)| PlanRow {
                pattern_index: None,
                quantity: f64::from(quantity),
                counts: pattern.counts().to_vec(),
                waste: pattern.waste(),
            })
            .collect();

        info!("Phase {}: FFD packed {} bars", number, bars.len());

        Ok(Phase {
            number,
            kind: PhaseKind::FirstFitDecreasing,
            residual_demand: vec![0; demand.len()],
            demand,
            relaxation,
            summary: summarize(&rows, self.request.items.len()),
            rows,
        })
    }

    /// LP rows with positive quantity, in pool order.
    fn relaxation(&self, pool: &PatternPool, run: &ColumnGenerationRun) -> Relaxation {
        let tolerance = self.request.settings.integrality_tolerance;
        let rows: Vec<PlanRow> = run
            .solution
            .quantities
            .iter()
            .enumerate()
            .filter(|(_, &quantity)| quantity > tolerance)
            .filter_map(|(index, &quantity)| {
                pool.get(index).map(|pattern| PlanRow {
                    pattern_index: Some(index),
                    quantity,
                    counts: pattern.counts().to_vec(),
                    waste: pattern.waste(),
                })
            })
            .collect();

        Relaxation {
            objective: run.solution.objective,
            pricing_iterations: run.iterations,
            summary: summarize(&rows, pool.lengths().len()),
            rows,
        }
    }
}

fn total(demand: &[u32]) -> u64 {
    demand.iter().map(|&d| u64::from(d)).sum()
}
