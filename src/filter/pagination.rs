use serde::Serialize;

/// Requested window: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Neighbouring pages, present only when they hold results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRequest>,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let end = u64::from(request.page) * u64::from(request.limit);
        let next = (end < total).then(|| PageRequest {
            page: request.page + 1,
            limit: request.limit,
        });
        let prev = (request.page > 1).then(|| PageRequest {
            page: request.page - 1,
            limit: request.limit,
        });
        Self { next, prev }
    }
}

/// One page of results together with the size of the full filtered set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub pagination: Pagination,
}
