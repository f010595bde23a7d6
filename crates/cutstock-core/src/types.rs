use crate::engine::EngineError;
use serde::{Deserialize, Serialize};

/// Item type to be cut from the stock bars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    /// Display name; defaults to `Item {n}` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub length: u32,
    pub demand: u32,
}

impl ItemType {
    pub fn new(length: u32, demand: u32) -> Self {
        Self {
            id: None,
            length,
            demand,
        }
    }

    /// Name used in reports for the item at `index`.
    pub fn label(&self, index: usize) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("Item {}", index + 1))
    }
}

/// Which cost the restricted master problem minimizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterObjective {
    /// Every bar costs 1, so the master minimizes the number of bars
    #[default]
    Bars,
    /// Every bar costs its pattern waste
    Waste,
}

/// Tunables for the solver; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub objective: MasterObjective,
    /// Upper bound on master/pricing rounds inside one phase
    pub max_pricing_iterations: u32,
    /// Upper bound on truncation phases before the remainder goes to FFD
    pub max_phases: u32,
    /// Largest Cartesian product the pattern enumerator will walk
    pub enumeration_limit: u64,
    pub reduced_cost_tolerance: f64,
    pub integrality_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            objective: MasterObjective::Bars,
            max_pricing_iterations: 1_000,
            max_phases: 64,
            enumeration_limit: 100_000,
            reduced_cost_tolerance: 1e-6,
            integrality_tolerance: 1e-6,
        }
    }
}

/// Input: What user provides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingStockRequest {
    pub bar_length: u32,
    pub items: Vec<ItemType>,
    #[serde(default)]
    pub settings: SolverSettings,
}

impl CuttingStockRequest {
    pub fn new(bar_length: u32, items: Vec<ItemType>) -> Self {
        Self {
            bar_length,
            items,
            settings: SolverSettings::default(),
        }
    }

    pub fn lengths(&self) -> Vec<u32> {
        self.items.iter().map(|item| item.length).collect()
    }

    pub fn demand(&self) -> Vec<u32> {
        self.items.iter().map(|item| item.demand).collect()
    }
}

/// A pattern together with its waste, as shown in the pattern table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRow {
    pub counts: Vec<u32>,
    pub waste: u32,
}

/// Symbolic form of a master problem, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelText {
    pub objective: String,
    pub constraints: Vec<String>,
}

/// One line of a solution table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    /// Index into the pattern pool; `None` for bars packed by FFD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_index: Option<usize>,
    pub quantity: f64,
    pub counts: Vec<u32>,
    pub waste: u32,
}

/// Totals for a solution table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_quantity: f64,
    /// Waste over every bar cut (quantity times pattern waste)
    pub total_waste: f64,
    /// Whole bars needed to cut the rows, rounding fractional quantities up
    pub bars_used: u64,
    /// Pieces produced per item type
    pub pieces: Vec<f64>,
}

/// How a phase turned demand into integer bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Truncation,
    FirstFitDecreasing,
}

/// LP relaxation reached at the end of a column generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relaxation {
    pub objective: f64,
    pub pricing_iterations: u32,
    pub rows: Vec<PlanRow>,
    pub summary: PlanSummary,
}

/// One pass of the recursion controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub number: u32,
    pub kind: PhaseKind,
    /// Demand this phase started from
    pub demand: Vec<u32>,
    /// Present for phases that ran column generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relaxation: Option<Relaxation>,
    pub rows: Vec<PlanRow>,
    pub summary: PlanSummary,
    pub residual_demand: Vec<u32>,
}

/// Output: What the solver returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuttingStockResult {
    pub bar_length: u32,
    pub items: Vec<ItemType>,
    /// Every feasible pattern, when the instance was small enough to enumerate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerated_patterns: Vec<PatternRow>,
    /// Waste-minimizing model over the enumerated patterns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerated_model: Option<ModelText>,
    /// Final pattern pool, in insertion order
    pub patterns: Vec<PatternRow>,
    pub phases: Vec<Phase>,
    /// Integer plan merged over all phases
    pub plan: Vec<PlanRow>,
    pub summary: PlanSummary,
}

/// Error type for the solver
#[derive(Debug, thiserror::Error)]
pub enum CuttingStockError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Item {index} of length {length} does not fit on a bar of length {bar_length}")]
    ItemExceedsBar {
        index: usize,
        length: u32,
        bar_length: u32,
    },

    #[error("Pattern {counts:?} uses {used} of a bar of length {bar_length}")]
    PatternOverCapacity {
        counts: Vec<u32>,
        used: u64,
        bar_length: u32,
    },

    #[error("Optimization engine failed on the {stage}: {source}")]
    Engine {
        stage: SolveStage,
        #[source]
        source: EngineError,
    },

    #[error("Column generation did not converge within {0} pricing iterations")]
    IterationLimit(u32),
}

/// Which engine call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStage {
    Master,
    Pricing,
}

impl std::fmt::Display for SolveStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStage::Master => write!(f, "restricted master problem"),
            SolveStage::Pricing => write!(f, "pricing subproblem"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CuttingStockError>;
