//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs,
//! plus the `Page` envelope returned by list endpoints.

use serde::Serialize;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self { page: page.unwrap_or(1), limit: limit.unwrap_or(DEFAULT_LIMIT) }.normalize()
    }

    /// Clamp to sane defaults: page 0 becomes 1, limit is kept within 1..=100.
    pub fn normalize(self) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        Self { page, limit: self.limit.clamp(1, MAX_LIMIT) }
    }

    pub fn skip(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }

    /// Slice an already filtered and sorted list into a page.
    pub fn apply<T>(self, items: Vec<T>) -> Page<T> {
        let p = self.normalize();
        let total = items.len() as u64;
        let items: Vec<T> = items.into_iter().skip(p.skip()).take(p.limit as usize).collect();
        Page {
            items,
            pagination: PageInfo { page: p.page, limit: p.limit, total, pages: total.div_ceil(u64::from(p.limit)) },
        }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: DEFAULT_LIMIT } }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}
