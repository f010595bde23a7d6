//! Exhaustive pattern enumeration and the homogeneous starting basis.
//!
//! Enumeration walks the full Cartesian product of per-item counts, so it is
//! only meant for small instances. Column generation never depends on it for
//! correctness; it seeds the pattern table and the homogeneous basis.

use crate::pattern::Pattern;
use crate::types::*;

/// Largest number of units of each item that fits on one bar.
pub fn max_counts(bar_length: u32, lengths: &[u32]) -> Vec<u32> {
    lengths
        .iter()
        .map(|&length| if length == 0 { 0 } else { bar_length / length })
        .collect()
}

/// Size of the Cartesian product the enumerator would walk.
pub fn combination_count(bar_length: u32, lengths: &[u32]) -> u64 {
    max_counts(bar_length, lengths)
        .iter()
        .fold(1u64, |acc, &max| acc.saturating_mul(u64::from(max) + 1))
}

/// Every count vector that fits on the bar, the all-zero vector included.
///
/// Order is deterministic: the first item varies slowest, the last fastest.
pub fn enumerate_patterns(bar_length: u32, lengths: &[u32]) -> Vec<Vec<u32>> {
    let limits = max_counts(bar_length, lengths);
    let mut counts = vec![0u32; lengths.len()];
    let mut patterns = Vec::new();

    loop {
        if crate::pattern::used_length(&counts, lengths) <= u64::from(bar_length) {
            patterns.push(counts.clone());
        }

        // Odometer step from the last position
        let mut position = counts.len();
        loop {
            if position == 0 {
                return patterns;
            }
            position -= 1;
            if counts[position] < limits[position] {
                counts[position] += 1;
                break;
            }
            counts[position] = 0;
        }
    }
}

/// Enumerated patterns without the all-zero one.
///
/// Returns `None` when the product exceeds `limit` combinations.
pub fn usable_patterns(bar_length: u32, lengths: &[u32], limit: u64) -> Option<Vec<Pattern>> {
    if combination_count(bar_length, lengths) > limit {
        return None;
    }

    let patterns = enumerate_patterns(bar_length, lengths)
        .into_iter()
        .filter_map(|counts| Pattern::new(counts, bar_length, lengths).ok())
        .filter(|pattern| !pattern.is_empty())
        .collect();

    Some(patterns)
}

/// For each item type, the homogeneous pattern cutting the most units of it.
///
/// Ties keep the first pattern seen. Item types without any homogeneous
/// pattern are skipped, so the result has at most `item_count` entries.
pub fn select_homogeneous(patterns: &[Pattern], item_count: usize) -> Vec<Pattern> {
    let homogeneous: Vec<(usize, &Pattern)> = patterns
        .iter()
        .filter_map(|pattern| pattern.homogeneous_item().map(|item| (item, pattern)))
        .collect();

    (0..item_count)
        .filter_map(|item| {
            let mut best: Option<&Pattern> = None;
            for &(owner, pattern) in &homogeneous {
                if owner != item {
                    continue;
                }
                match best {
                    Some(current) if pattern.counts()[item] <= current.counts()[item] => {}
                    _ => best = Some(pattern),
                }
            }
            best.cloned()
        })
        .collect()
}

/// Homogeneous basis built without enumeration: `floor(L / l_i)` units of item `i`.
pub fn homogeneous_basis(bar_length: u32, lengths: &[u32]) -> Result<Vec<Pattern>> {
    max_counts(bar_length, lengths)
        .into_iter()
        .enumerate()
        .filter(|(_, max)| *max > 0)
        .map(|(item, max)| {
            let mut counts = vec![0; lengths.len()];
            counts[item] = max;
            Pattern::new(counts, bar_length, lengths)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerates_small_instance() {
        let patterns = enumerate_patterns(10, &[3, 4]);

        let mut expected = vec![
            vec![0, 0],
            vec![1, 0],
            vec![2, 0],
            vec![3, 0],
            vec![0, 1],
            vec![0, 2],
            vec![1, 1],
            vec![2, 1],
        ];
        let mut sorted = patterns.clone();
        sorted.sort();
        expected.sort();
        assert_eq!(sorted, expected);

        // first item varies slowest
        assert_eq!(patterns[0], vec![0, 0]);
        assert_eq!(patterns[1], vec![0, 1]);
        assert_eq!(patterns[2], vec![0, 2]);
        assert_eq!(patterns[3], vec![1, 0]);
    }

    #[test]
    fn test_usable_patterns_exclude_zero_and_respect_capacity() {
        let patterns = usable_patterns(10, &[3, 4], 1_000).unwrap();
        assert_eq!(patterns.len(), 7);
        for pattern in &patterns {
            assert!(!pattern.is_empty());
            assert!(pattern.used_length() <= 10);
            assert_eq!(u64::from(pattern.waste()), 10 - pattern.used_length());
        }
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let first = enumerate_patterns(23, &[4, 5, 7]);
        let second = enumerate_patterns(23, &[4, 5, 7]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_enumeration_limit() {
        assert_eq!(combination_count(10, &[3, 4]), 12);
        assert!(usable_patterns(10, &[3, 4], 11).is_none());
        assert!(usable_patterns(10, &[3, 4], 12).is_some());
        assert_eq!(combination_count(1_000_000, &[1, 1, 1, 1]), u64::MAX);
    }

    #[test]
    fn test_select_homogeneous_picks_max_count() {
        let patterns = usable_patterns(10, &[3, 4], 1_000).unwrap();
        let basis = select_homogeneous(&patterns, 2);

        let counts: Vec<&[u32]> = basis.iter().map(Pattern::counts).collect();
        assert_eq!(counts, vec![&[3, 0][..], &[0, 2][..]]);
        assert_eq!(basis[0].waste(), 1);
        assert_eq!(basis[1].waste(), 2);
    }

    #[test]
    fn test_direct_basis_matches_selection() {
        let lengths = [30, 45, 17];
        let enumerated = usable_patterns(100, &lengths, 100_000).unwrap();
        let selected = select_homogeneous(&enumerated, lengths.len());
        let direct = homogeneous_basis(100, &lengths).unwrap();
        assert_eq!(selected, direct);
    }
}
