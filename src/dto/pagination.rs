use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?q=&page=&limit=` shared by the admin and public list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn page_and_limit(&self) -> (u32, u32) {
        normalize(self.page, self.limit)
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Page is at least 1; limit defaults to 20 and is clamped to 1..=100.
pub fn normalize(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let pages = total.div_ceil(u64::from(limit.max(1)));
        Page { items, total, page, limit, pages: u32::try_from(pages).unwrap_or(u32::MAX) }
    }

    /// Slice one page out of an already filtered, ordered list.
    pub fn from_all(all: Vec<T>, page: u32, limit: u32) -> Self {
        let total = all.len() as u64;
        let skip = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let items = all.into_iter().skip(skip).take(limit as usize).collect();
        Page::new(items, total, page, limit)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(None, None), (1, 20));
        assert_eq!(normalize(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize(Some(3), Some(500)), (3, 100));
    }

    #[test]
    fn test_from_all() {
        let page = Page::from_all((1..=45).collect::<Vec<u32>>(), 3, 20);
        assert_eq!(page.items, (41..=45).collect::<Vec<u32>>());
        assert_eq!(page.total, 45);
        assert_eq!(page.pages, 3);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page = Page::from_all(vec![1, 2, 3], 5, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.pages, 2);
    }

    #[test]
    fn test_empty_list_has_zero_pages() {
        let page: Page<u8> = Page::new(Vec::new(), 0, 1, 20);
        assert_eq!(page.pages, 0);
    }

    #[test]
    fn test_search_ignores_blank() {
        let query = ListQuery { q: Some("   ".to_string()), ..ListQuery::default() };
        assert!(query.search().is_none());
    }
}
