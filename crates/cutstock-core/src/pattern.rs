use crate::types::*;

/// Material a pattern occupies on one bar.
pub fn used_length(counts: &[u32], lengths: &[u32]) -> u64 {
    counts
        .iter()
        .zip(lengths)
        .map(|(&count, &length)| u64::from(count) * u64::from(length))
        .sum()
}

/// How many units of each item type are cut from one bar.
///
/// A `Pattern` can only be built through [`Pattern::new`], which enforces
/// `used_length <= bar_length`, so `waste` never underflows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    counts: Vec<u32>,
    used_length: u64,
    waste: u32,
}

impl Pattern {
    pub fn new(counts: Vec<u32>, bar_length: u32, lengths: &[u32]) -> Result<Self> {
        if counts.len() != lengths.len() {
            return Err(CuttingStockError::InvalidInput(format!(
                "Pattern has {} entries but there are {} item types",
                counts.len(),
                lengths.len()
            )));
        }

        let used = used_length(&counts, lengths);
        if used > u64::from(bar_length) {
            return Err(CuttingStockError::PatternOverCapacity {
                counts,
                used,
                bar_length,
            });
        }

        Ok(Self {
            waste: bar_length - used as u32,
            used_length: used,
            counts,
        })
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn used_length(&self) -> u64 {
        self.used_length
    }

    pub fn waste(&self) -> u32 {
        self.waste
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    /// Item type of a single-type pattern, `None` for mixed or empty patterns.
    pub fn homogeneous_item(&self) -> Option<usize> {
        let mut non_zero = self
            .counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(index, _)| index);

        match (non_zero.next(), non_zero.next()) {
            (Some(index), None) => Some(index),
            _ => None,
        }
    }

    pub fn row(&self) -> PatternRow {
        PatternRow {
            counts: self.counts.clone(),
            waste: self.waste,
        }
    }
}

/// Append-only arena of patterns. Indices handed out by [`PatternPool::push`]
/// stay valid for the lifetime of the pool.
#[derive(Debug, Clone)]
pub struct PatternPool {
    bar_length: u32,
    lengths: Vec<u32>,
    patterns: Vec<Pattern>,
}

impl PatternPool {
    pub fn new(bar_length: u32, lengths: Vec<u32>) -> Self {
        Self {
            bar_length,
            lengths,
            patterns: Vec::new(),
        }
    }

    pub fn with_patterns(bar_length: u32, lengths: Vec<u32>, patterns: Vec<Pattern>) -> Self {
        let mut pool = Self::new(bar_length, lengths);
        for pattern in patterns {
            if pool.position(pattern.counts()).is_none() {
                pool.patterns.push(pattern);
            }
        }
        pool
    }

    pub fn bar_length(&self) -> u32 {
        self.bar_length
    }

    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    /// Index of the pattern with exactly these counts, if the pool holds one.
    pub fn position(&self, counts: &[u32]) -> Option<usize> {
        self.patterns
            .iter()
            .position(|pattern| pattern.counts() == counts)
    }

    /// Validates `counts` against the bar and appends it, returning its index.
    pub fn push(&mut self, counts: Vec<u32>) -> Result<usize> {
        let pattern = Pattern::new(counts, self.bar_length, &self.lengths)?;
        self.patterns.push(pattern);
        Ok(self.patterns.len() - 1)
    }

    pub fn rows(&self) -> Vec<PatternRow> {
        self.patterns.iter().map(Pattern::row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waste_is_bar_minus_used_length() {
        let pattern = Pattern::new(vec![2, 1], 10, &[3, 4]).unwrap();
        assert_eq!(pattern.used_length(), 10);
        assert_eq!(pattern.waste(), 0);

        let pattern = Pattern::new(vec![1, 1], 10, &[3, 4]).unwrap();
        assert_eq!(pattern.waste(), 3);
    }

    #[test]
    fn test_over_capacity_pattern_is_rejected() {
        let err = Pattern::new(vec![2, 2], 10, &[3, 4]).unwrap_err();
        assert!(matches!(
            err,
            CuttingStockError::PatternOverCapacity { used: 14, .. }
        ));
    }

    #[test]
    fn test_homogeneous_item() {
        let lengths = [3, 4];
        assert_eq!(
            Pattern::new(vec![0, 2], 10, &lengths)
                .unwrap()
                .homogeneous_item(),
            Some(1)
        );
        assert_eq!(
            Pattern::new(vec![1, 1], 10, &lengths)
                .unwrap()
                .homogeneous_item(),
            None
        );
        assert_eq!(
            Pattern::new(vec![0, 0], 10, &lengths)
                .unwrap()
                .homogeneous_item(),
            None
        );
    }

    #[test]
    fn test_pool_indices_are_stable() {
        let mut pool = PatternPool::new(100, vec![30, 45]);
        let first = pool.push(vec![3, 0]).unwrap();
        let second = pool.push(vec![0, 2]).unwrap();
        let third = pool.push(vec![1, 1]).unwrap();

        assert_eq!((first, second, third), (0, 1, 2));
        assert_eq!(pool.get(1).unwrap().counts(), &[0, 2]);
        assert_eq!(pool.position(&[1, 1]), Some(2));
        assert_eq!(pool.position(&[2, 0]), None);
        assert!(pool.push(vec![0, 3]).is_err());
        assert_eq!(pool.len(), 3);
    }
}
