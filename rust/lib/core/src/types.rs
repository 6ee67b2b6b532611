use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 100_000;

/// Pagination parameters (`?count=&page=`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    /// Items per page.
    #[serde(default = "default_count")]
    pub count: usize,

    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_count() -> usize {
    50
}

fn default_page() -> usize {
    1
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            count: default_count(),
            page: default_page(),
        }
    }
}

impl PageParams {
    pub fn new(count: usize, page: usize) -> Self {
        Self { count, page }
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> usize {
        self.count.clamp(1, MAX_PAGE_SIZE)
    }

    /// Page number, at least 1 and small enough that `offset()` fits
    /// in an SQL `OFFSET` (i64).
    pub fn page(&self) -> usize {
        let max_offset = usize::try_from(i64::MAX).unwrap_or(usize::MAX);
        self.page.clamp(1, max_offset / self.limit() + 1)
    }

    /// Rows to skip before this page. Never exceeds `i64::MAX`.
    pub fn offset(&self) -> usize {
        (self.page() - 1) * self.limit()
    }
}

/// One page of an `ORDER BY id` listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub data: Vec<T>,
    pub current_page: usize,
    pub per_page: usize,
    pub total: usize,
    pub last_page: usize,
    /// 1-based position of the first item on this page.
    pub from: Option<usize>,
    /// 1-based position of the last item on this page.
    pub to: Option<usize>,
}

impl<T: Serialize> Page<T> {
    pub fn new(data: Vec<T>, params: &PageParams, total: usize) -> Self {
        let per_page = params.limit();
        let offset = params.offset();
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (
                Some(offset.saturating_add(1)),
                Some(offset.saturating_add(data.len())),
            )
        };
        Self {
            current_page: params.page(),
            per_page,
            total,
            last_page: total.div_ceil(per_page).max(1),
            from,
            to,
            data,
        }
    }
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn test_now_rfc3339() {
        let ts = now_rfc3339();
        assert!(ts.contains('T'));
    }

    #[test]
    fn page_params_defaults() {
        let params: PageParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params.limit(), 50);
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_params_clamp() {
        assert_eq!(PageParams::new(0, 0).limit(), 1);
        assert_eq!(PageParams::new(0, 0).offset(), 0);
        assert_eq!(PageParams::new(1_000_000, 1).limit(), MAX_PAGE_SIZE);
        assert_eq!(PageParams::new(20, 3).offset(), 40);
    }

    #[test]
    fn huge_page_stays_within_sql_offset() {
        for count in [1, 2, 50, MAX_PAGE_SIZE] {
            let params = PageParams::new(count, usize::MAX);
            assert!(i64::try_from(params.offset()).is_ok(), "count={count}");
        }
        let params = PageParams::new(2, i64::MAX as usize / 2 + 2);
        assert_eq!(params.page(), i64::MAX as usize / 2 + 1);
        assert!(i64::try_from(params.offset()).is_ok());

        let params = PageParams::new(50, usize::MAX);
        let page = Page::new(vec![1], &params, 1);
        assert_eq!(page.current_page, params.page());
        assert_eq!(page.from, Some(params.offset() + 1));
        assert_eq!(page.last_page, 1);
    }

    #[test]
    fn page_metadata() {
        let page = Page::new(vec![1, 2, 3], &PageParams::new(3, 2), 7);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.from, Some(4));
        assert_eq!(page.to, Some(6));

        let empty: Page<i32> = Page::new(vec![], &PageParams::default(), 0);
        assert_eq!(empty.last_page, 1);
        assert_eq!(empty.from, None);
    }
}
