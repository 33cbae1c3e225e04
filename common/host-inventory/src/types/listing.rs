//! Best-effort enumeration results

use serde::{Deserialize, Serialize};

/// Items collected by a best-effort enumeration
///
/// Entries the OS refused to describe are left out and counted in
/// `skipped` instead of failing the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Listing<T> {
    /// Split per-item results into successes and a skipped count
    pub fn collect<E>(results: impl IntoIterator<Item = Result<T, E>>) -> Self {
        let mut items = Vec::new();
        let mut skipped = 0;
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(_) => skipped += 1,
            }
        }
        Self { items, skipped }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Keep only the items matching `predicate`; the skipped count is preserved
    pub fn retain(mut self, predicate: impl FnMut(&T) -> bool) -> Self {
        self.items.retain(predicate);
        self
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_counts_failures() {
        let results: Vec<Result<u32, &str>> = vec![Ok(1), Err("denied"), Ok(3), Err("gone")];
        let listing = Listing::collect(results);
        assert_eq!(listing.items, vec![1, 3]);
        assert_eq!(listing.skipped, 2);
    }

    #[test]
    fn test_retain_keeps_skipped() {
        let listing = Listing {
            items: vec![1, 2, 3, 4],
            skipped: 1,
        }
        .retain(|n| n % 2 == 0);
        assert_eq!(listing.items, vec![2, 4]);
        assert_eq!(listing.skipped, 1);
    }
}
