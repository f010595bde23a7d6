//! First-fit-decreasing packing of residual demand.

use crate::pattern::Pattern;
use crate::types::*;

/// Packs `demand` onto bars, longest item types first.
///
/// Each bar takes as many units of every item type, in decreasing length
/// order, as still fit. Returns one pattern per bar; the per-item sum over all
/// bars equals `demand` exactly.
pub fn first_fit_decreasing(bar_length: u32, lengths: &[u32], demand: &[u32]) -> Result<Vec<Pattern>> {
    if lengths.len() != demand.len() {
        return Err(CuttingStockError::InvalidInput(format!(
            "{} lengths but {} demand entries",
            lengths.len(),
            demand.len()
        )));
    }

    for (index, (&length, &needed)) in lengths.iter().zip(demand).enumerate() {
        if needed > 0 && length > bar_length {
            return Err(CuttingStockError::ItemExceedsBar {
                index: index + 1,
                length,
                bar_length,
            });
        }
        if needed > 0 && length == 0 {
            return Err(CuttingStockError::InvalidInput(format!(
                "Item {} has zero length",
                index + 1
            )));
        }
    }

    let mut order: Vec<usize> = (0..lengths.len()).collect();
    order.sort_by(|&a, &b| lengths[b].cmp(&lengths[a]));

    let mut remaining = demand.to_vec();
    let mut bars = Vec::new();

    while remaining.iter().any(|&d| d > 0) {
        let mut counts = vec![0u32; lengths.len()];
        let mut free = bar_length;

        for &item in &order {
            if remaining[item] == 0 || lengths[item] > free {
                continue;
            }
            let take = (free / lengths[item]).min(remaining[item]);
            counts[item] = take;
            remaining[item] -= take;
            free -= take * lengths[item];
        }

        bars.push(Pattern::new(counts, bar_length, lengths)?);
    }

    Ok(bars)
}

/// Collapses identical bars into `(pattern, quantity)`, in order of first appearance.
pub fn group_bars(bars: &[Pattern]) -> Vec<(Pattern, u32)> {
    let mut grouped: Vec<(Pattern, u32)> = Vec::new();
    for bar in bars {
        match grouped.iter_mut().find(|(pattern, _)| pattern == bar) {
            Some((_, quantity)) => *quantity += 1,
            None => grouped.push((bar.clone(), 1)),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(bars: &[Pattern], items: usize) -> Vec<u32> {
        let mut totals = vec![0; items];
        for bar in bars {
            for (total, &count) in totals.iter_mut().zip(bar.counts()) {
                *total += count;
            }
        }
        totals
    }

    #[test]
    fn test_packs_longest_first() {
        let bars = first_fit_decreasing(100, &[30, 45], &[5, 3]).unwrap();

        let counts: Vec<&[u32]> = bars.iter().map(Pattern::counts).collect();
        assert_eq!(counts, vec![&[0, 2][..], &[1, 1][..], &[3, 0][..], &[1, 0][..]]);
        assert_eq!(totals(&bars, 2), vec![5, 3]);
        assert!(bars.iter().all(|bar| bar.used_length() <= 100));
    }

    #[test]
    fn test_demand_is_met_exactly() {
        let lengths = [17, 23, 41, 8, 55];
        let demand = [7, 3, 9, 12, 4];
        let bars = first_fit_decreasing(120, &lengths, &demand).unwrap();

        assert_eq!(totals(&bars, lengths.len()), demand.to_vec());
        for bar in &bars {
            assert!(!bar.is_empty());
            assert_eq!(u64::from(bar.waste()) + bar.used_length(), 120);
        }
    }

    #[test]
    fn test_zero_demand_needs_no_bars() {
        let bars = first_fit_decreasing(100, &[30, 45], &[0, 0]).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn test_item_longer_than_bar_is_rejected() {
        let err = first_fit_decreasing(100, &[30, 120], &[1, 1]).unwrap_err();
        assert!(matches!(
            err,
            CuttingStockError::ItemExceedsBar {
                index: 2,
                length: 120,
                ..
            }
        ));

        // no demand for the long item, nothing to pack it into
        assert!(first_fit_decreasing(100, &[30, 120], &[1, 0]).is_ok());
    }

    #[test]
    fn test_group_bars() {
        let bars = first_fit_decreasing(10, &[3], &[7]).unwrap();
        let grouped = group_bars(&bars);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0.counts(), &[3]);
        assert_eq!(grouped[0].1, 2);
        assert_eq!(grouped[1].0.counts(), &[1]);
        assert_eq!(grouped[1].1, 1);
    }
}
