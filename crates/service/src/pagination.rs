//! Pagination utilities for service layer
//!
//! Offset/limit windows over already-sorted result sets.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Offset/limit parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// Clamp `limit` to `1..=MAX_LIMIT`, defaulting missing values.
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Self { limit, offset: offset.unwrap_or(0) }
    }

    /// Slice `items` into a page, recording the total before slicing.
    pub fn apply<T>(self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let items: Vec<T> = items.into_iter().skip(self.offset).take(self.limit).collect();
        let has_more = self.offset.saturating_add(items.len()) < total;
        Page { items, total, limit: self.limit, offset: self.offset, has_more }
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { limit: DEFAULT_LIMIT, offset: 0 } }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_zero_and_upper_bound() {
        assert_eq!(PageRequest::new(Some(0), None).limit, 1);
        assert_eq!(PageRequest::new(Some(1000), Some(5)), PageRequest { limit: MAX_LIMIT, offset: 5 });
    }

    #[test]
    fn default_values_are_sane() {
        let d = PageRequest::default();
        assert_eq!(d.limit, 20);
        assert_eq!(d.offset, 0);
    }

    #[test]
    fn apply_reports_has_more() {
        let page = PageRequest::new(Some(2), Some(1)).apply(vec![1, 2, 3, 4]);
        assert_eq!(page.items, vec![2, 3]);
        assert_eq!(page.total, 4);
        assert!(page.has_more);

        let tail = PageRequest::new(Some(2), Some(3)).apply(vec![1, 2, 3, 4]);
        assert_eq!(tail.items, vec![4]);
        assert!(!tail.has_more);

        let past_end = PageRequest::new(Some(2), Some(10)).apply(vec![1]);
        assert!(past_end.items.is_empty());
        assert!(!past_end.has_more);
    }
}
