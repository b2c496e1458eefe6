//! List query parameters.
//!
//! `get_all` is unfiltered by default. A [`ListQuery`] narrows the result to an
//! offset/limit window over the repository's natural (insertion) order.

/// Offset/limit window applied after ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Number of leading rows to skip.
    pub offset: usize,
    /// Maximum number of rows to return; `None` returns everything after `offset`.
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn page(page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        Self {
            offset: (page - 1) * per_page,
            limit: Some(per_page),
        }
    }

    /// Applies the window to an already ordered sequence.
    pub fn apply<T>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let rows = rows.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ListQuery;

    #[test]
    fn page_clamps_zero_to_defaults() {
        let q = ListQuery::page(0, 0);
        assert_eq!(q.offset, 0);
        assert_eq!(q.limit, Some(1));
    }

    #[test]
    fn page_clamps_upper_bound() {
        let q = ListQuery::page(5, 1000);
        assert_eq!(q.offset, 400);
        assert_eq!(q.limit, Some(100));
    }

    #[test]
    fn apply_windows_in_order() {
        let q = ListQuery {
            offset: 1,
            limit: Some(2),
        };
        assert_eq!(q.apply(vec![1, 2, 3, 4]), vec![2, 3]);
        assert_eq!(ListQuery::default().apply(vec![1, 2]), vec![1, 2]);
    }
}
