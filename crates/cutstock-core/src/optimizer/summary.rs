use crate::types::*;

/// Computes bar, waste, and per-item piece totals for a solution table.
pub fn summarize(rows: &[PlanRow], item_count: usize) -> PlanSummary {
    let total_quantity: f64 = rows.iter().map(|row| row.quantity).sum();
    let total_waste: f64 = rows
        .iter()
        .map(|row| row.quantity * f64::from(row.waste))
        .sum();

    // Round LP noise away before taking whole bars
    let bars_used: u64 = rows
        .iter()
        .map(|row| (row.quantity - 1e-9).ceil().max(0.0) as u64)
        .sum();

    let mut pieces = vec![0.0; item_count];
    for row in rows {
        for (total, &count) in pieces.iter_mut().zip(&row.counts) {
            *total += row.quantity * f64::from(count);
        }
    }

    PlanSummary {
        total_quantity,
        total_waste,
        bars_used,
        pieces,
    }
}

/// Aggregates rows cutting the same pattern, keeping first-seen order.
pub fn merge_rows(rows: impl IntoIterator<Item = PlanRow>) -> Vec<PlanRow> {
    let mut merged: Vec<PlanRow> = Vec::new();
    for row in rows {
        if row.quantity <= 0.0 {
            continue;
        }
        match merged.iter_mut().find(|m| m.counts == row.counts) {
            Some(existing) => {
                existing.quantity += row.quantity;
                existing.pattern_index = existing.pattern_index.or(row.pattern_index);
            }
            None => merged.push(row),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pattern_index: Option<usize>, quantity: f64, counts: &[u32], waste: u32) -> PlanRow {
        PlanRow {
            pattern_index,
            quantity,
            counts: counts.to_vec(),
            waste,
        }
    }

    #[test]
    fn test_summary_totals() {
        let rows = vec![row(Some(0), 2.0, &[3, 0], 10), row(None, 1.0, &[1, 1], 25)];
        let summary = summarize(&rows, 2);

        assert_eq!(summary.total_quantity, 3.0);
        assert_eq!(summary.total_waste, 45.0);
        assert_eq!(summary.bars_used, 3);
        assert_eq!(summary.pieces, vec![7.0, 1.0]);
    }

    #[test]
    fn test_fractional_rows_round_bars_up() {
        let rows = vec![row(Some(0), 1.5, &[0, 2], 10), row(Some(1), 0.25, &[3, 0], 10)];
        let summary = summarize(&rows, 2);
        assert_eq!(summary.bars_used, 3);
        assert!((summary.total_waste - 17.5).abs() < 1e-12);
    }

    #[test]
    fn test_merge_rows_by_pattern() {
        let merged = merge_rows(vec![
            row(Some(0), 1.0, &[3, 0], 10),
            row(None, 2.0, &[0, 2], 10),
            row(None, 1.0, &[3, 0], 10),
            row(Some(4), 0.0, &[1, 1], 25),
            row(Some(1), 1.0, &[0, 2], 10),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].quantity, 2.0);
        assert_eq!(merged[0].pattern_index, Some(0));
        assert_eq!(merged[1].quantity, 3.0);
        assert_eq!(merged[1].pattern_index, Some(1));
    }
}
