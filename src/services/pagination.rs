use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// 分页结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, page: u64, page_size: u64) -> Self {
        Self {
            items,
            total_count,
            total_pages: total_count.div_ceil(page_size.max(1)),
            current_page: page,
        }
    }
}

/// page 至少为 1，page_size 限制在 1..=100
pub fn normalize_page(page: u64, page_size: u64) -> (u64, u64) {
    (page.max(1), page_size.clamp(1, MAX_PAGE_SIZE))
}
