//! Offset and cursor pagination shared by the provider clients.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive page size range accepted by one list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub min: u32,
    pub max: u32,
}

impl PageBounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &str, value: u32) -> Result<()> {
        if value < self.min {
            return Err(Error::validation(format!(
                "{} can't be under {} (got {})",
                field, self.min, value
            )));
        }
        if value > self.max {
            return Err(Error::validation(format!(
                "{} can't be more than {} (got {})",
                field, self.max, value
            )));
        }
        Ok(())
    }
}

/// Page-number request, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for OffsetRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl OffsetRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    pub fn validate(&self, bounds: PageBounds) -> Result<()> {
        if self.page < 1 {
            return Err(Error::validation(
                "page can't be under 1 as it's the minimum value",
            ));
        }
        bounds.check("per_page", self.per_page)
    }

    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Metadata returned with an offset-paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetInfo {
    pub page: u32,
    pub per_page: u32,
    /// Items in this page only.
    pub count: u32,
    pub total_count: u32,
    pub total_pages: u32,
}

impl OffsetInfo {
    /// Number of items seen up to and including this page.
    ///
    /// `count` is page-local, so reports must use this value instead.
    pub fn running_count(&self) -> u32 {
        self.count + self.per_page * self.page.saturating_sub(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Timestamp-cursor request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorRequest {
    pub limit: Option<u32>,
    pub since: Option<i64>,
    pub until: Option<i64>,
}

impl CursorRequest {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn validate(&self, bounds: PageBounds) -> Result<()> {
        if let Some(limit) = self.limit {
            bounds.check("limit", limit)?;
        }
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(Error::validation(format!(
                    "since ({}) can't be after until ({})",
                    since, until
                )));
            }
        }
        Ok(())
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(since) = self.since {
            query.push(("since", since.to_string()));
        }
        if let Some(until) = self.until {
            query.push(("until", until.to_string()));
        }
        query
    }
}

/// Metadata returned with a cursor-paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorInfo {
    pub count: u32,
    pub next: Option<i64>,
    pub prev: Option<i64>,
}

impl CursorInfo {
    /// The request for the following page, or `None` at the end.
    pub fn next_request(&self, current: &CursorRequest) -> Option<CursorRequest> {
        self.next.map(|next| CursorRequest {
            limit: current.limit,
            since: None,
            until: Some(next),
        })
    }

    pub fn prev_request(&self, current: &CursorRequest) -> Option<CursorRequest> {
        self.prev.map(|prev| CursorRequest {
            limit: current.limit,
            since: Some(prev),
            until: None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageInfo {
    Offset(OffsetInfo),
    Cursor(CursorInfo),
    /// The endpoint returns everything at once.
    Unpaged { count: u32 },
}

impl PageInfo {
    /// Count to show in reports: running count for offset pages, page count otherwise.
    pub fn display_count(&self) -> u32 {
        match self {
            PageInfo::Offset(info) => info.running_count(),
            PageInfo::Cursor(info) => info.count,
            PageInfo::Unpaged { count } => *count,
        }
    }
}

/// One page of items plus its pagination metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn unpaged(items: Vec<T>) -> Self {
        let count = items.len() as u32;
        Self {
            items,
            info: PageInfo::Unpaged { count },
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: PageBounds = PageBounds::new(5, 100);

    #[test]
    fn test_running_count() {
        let info = OffsetInfo {
            page: 3,
            per_page: 5,
            count: 5,
            total_count: 40,
            total_pages: 8,
        };

        assert_eq!(info.running_count(), 15);
        assert!(info.has_next());
        assert_eq!(PageInfo::Offset(info).display_count(), 15);
    }

    #[test]
    fn test_running_count_last_partial_page() {
        let info = OffsetInfo {
            page: 3,
            per_page: 20,
            count: 7,
            total_count: 47,
            total_pages: 3,
        };

        assert_eq!(info.running_count(), 47);
        assert!(!info.has_next());
    }

    #[test]
    fn test_offset_bounds() {
        assert!(OffsetRequest::new(1, 5).validate(BOUNDS).is_ok());
        assert!(OffsetRequest::new(7, 100).validate(BOUNDS).is_ok());

        for request in [
            OffsetRequest::new(0, 20),
            OffsetRequest::new(1, 4),
            OffsetRequest::new(1, 101),
        ] {
            let err = request.validate(BOUNDS).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{:?}", request);
        }
    }

    #[test]
    fn test_offset_query_echoes_values() {
        let query = OffsetRequest::new(3, 25).query();
        assert_eq!(query[0], ("page", "3".to_string()));
        assert_eq!(query[1], ("per_page", "25".to_string()));
    }

    #[test]
    fn test_cursor_validation() {
        let bounds = PageBounds::new(1, 100);
        assert!(CursorRequest::with_limit(20).validate(bounds).is_ok());
        assert!(CursorRequest::with_limit(0).validate(bounds).is_err());
        assert!(CursorRequest::with_limit(101).validate(bounds).is_err());

        let inverted = CursorRequest {
            limit: None,
            since: Some(200),
            until: Some(100),
        };
        assert!(inverted.validate(bounds).is_err());
    }

    #[test]
    fn test_cursor_next_request() {
        let current = CursorRequest::with_limit(10);
        let info = CursorInfo {
            count: 10,
            next: Some(1_650_000_000_000),
            prev: None,
        };

        let next = info.next_request(&current).unwrap();
        assert_eq!(next.limit, Some(10));
        assert_eq!(next.until, Some(1_650_000_000_000));
        assert!(info.prev_request(&current).is_none());

        let last = CursorInfo {
            count: 3,
            next: None,
            prev: Some(1),
        };
        assert!(last.next_request(&current).is_none());
    }

    #[test]
    fn test_unpaged_count() {
        let page = Page::unpaged(vec!["a", "b", "c"]);
        assert_eq!(page.info.display_count(), 3);
        assert_eq!(page.len(), 3);
    }
}
