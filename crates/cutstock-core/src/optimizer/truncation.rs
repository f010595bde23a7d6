//! Rounds a fractional master solution down to whole bars.

use crate::pattern::PatternPool;
use crate::types::PlanRow;

/// Floored quantity of one pattern that had a positive LP value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedQuantity {
    pub pattern_index: usize,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    /// Pool order, restricted to patterns with positive LP quantity
    pub quantities: Vec<TruncatedQuantity>,
    /// Demand left after cutting the floored quantities, never below zero
    pub residual: Vec<u32>,
}

impl Truncation {
    /// True when at least one pattern kept a whole bar.
    pub fn is_usable(&self) -> bool {
        self.quantities.iter().any(|t| t.quantity >= 1)
    }

    /// Solution rows for the committed bars; zero quantities are dropped.
    pub fn rows(&self, pool: &PatternPool) -> Vec<PlanRow> {
        self.quantities
            .iter()
            .filter(|t| t.quantity > 0)
            .filter_map(|t| {
                pool.get(t.pattern_index).map(|pattern| PlanRow {
                    pattern_index: Some(t.pattern_index),
                    quantity: f64::from(t.quantity),
                    counts: pattern.counts().to_vec(),
                    waste: pattern.waste(),
                })
            })
            .collect()
    }
}

/// Floors every LP quantity above `tolerance` and subtracts the cut pieces from `demand`.
///
/// A quantity within `tolerance` below an integer counts as that integer, so
/// solver noise such as `2.9999999` keeps its third bar.
pub fn truncate(
    pool: &PatternPool,
    lp_quantities: &[f64],
    demand: &[u32],
    tolerance: f64,
) -> Truncation {
    let quantities: Vec<TruncatedQuantity> = lp_quantities
        .iter()
        .enumerate()
        .filter(|(_, &value)| value > tolerance)
        .map(|(pattern_index, &value)| TruncatedQuantity {
            pattern_index,
            quantity: (value + tolerance).floor() as u32,
        })
        .collect();

    let mut residual: Vec<i64> = demand.iter().map(|&d| i64::from(d)).collect();
    for truncated in &quantities {
        if let Some(pattern) = pool.get(truncated.pattern_index) {
            for (remaining, &count) in residual.iter_mut().zip(pattern.counts()) {
                *remaining -= i64::from(truncated.quantity) * i64::from(count);
            }
        }
    }

    Truncation {
        quantities,
        residual: residual
            .into_iter()
            .map(|remaining| remaining.max(0) as u32)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> PatternPool {
        let mut pool = PatternPool::new(100, vec![30, 45]);
        pool.push(vec![3, 0]).unwrap();
        pool.push(vec![0, 2]).unwrap();
        pool.push(vec![1, 1]).unwrap();
        pool
    }

    #[test]
    fn test_floors_positive_quantities() {
        let pool = pool();
        let truncation = truncate(&pool, &[1.6667, 0.0, 2.5], &[5, 3], 1e-6);

        assert_eq!(
            truncation.quantities,
            vec![
                TruncatedQuantity {
                    pattern_index: 0,
                    quantity: 1
                },
                TruncatedQuantity {
                    pattern_index: 2,
                    quantity: 2
                },
            ]
        );
        // 5 - (3 + 2) = 0, 3 - 2 = 1
        assert_eq!(truncation.residual, vec![0, 1]);
        assert!(truncation.is_usable());
        assert_eq!(truncation.rows(&pool).len(), 2);
    }

    #[test]
    fn test_fractions_below_one_are_not_usable() {
        let pool = pool();
        let truncation = truncate(&pool, &[0.4, 0.9, 0.0], &[1, 1], 1e-6);

        assert_eq!(truncation.quantities.len(), 2);
        assert!(!truncation.is_usable());
        assert!(truncation.rows(&pool).is_empty());
        assert_eq!(truncation.residual, vec![1, 1]);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let pool = pool();
        let truncation = truncate(&pool, &[0.0, 3.0, 0.0], &[0, 4], 1e-6);
        assert_eq!(truncation.residual, vec![0, 0]);
    }

    #[test]
    fn test_solver_noise_rounds_up() {
        let pool = pool();
        let truncation = truncate(&pool, &[1.9999999, 0.0, 0.0], &[6, 0], 1e-6);
        assert_eq!(truncation.quantities[0].quantity, 2);
        assert_eq!(truncation.residual, vec![0, 0]);
    }

    #[test]
    fn test_flooring_never_exceeds_lp_cover() {
        let pool = pool();
        let lp = [1.3, 0.75, 2.2];
        let truncation = truncate(&pool, &lp, &[9, 4], 1e-6);

        for item in 0..2 {
            let floored: f64 = truncation
                .quantities
                .iter()
                .map(|t| {
                    f64::from(t.quantity)
                        * f64::from(pool.get(t.pattern_index).unwrap().counts()[item])
                })
                .sum();
            let covered: f64 = lp
                .iter()
                .enumerate()
                .map(|(i, q)| q * f64::from(pool.get(i).unwrap().counts()[item]))
                .sum();
            assert!(floored <= covered + 1e-9);
        }
    }
}
