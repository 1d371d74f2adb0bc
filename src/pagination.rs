// ABOUTME: Page-based pagination parameters and response envelope
// ABOUTME: Clamps client-supplied page sizes and wraps list results with a total count
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Page/limit pagination shared by the list endpoints

use crate::constants::limits;
use serde::{Deserialize, Serialize};

/// Client-supplied pagination query parameters
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: Option<u32>,
    /// Requested page size
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Effective page size, clamped to `[1, MAX_PAGE_SIZE]`
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(limits::DEFAULT_PAGE_SIZE)
            .clamp(1, limits::MAX_PAGE_SIZE)
    }

    /// Row offset for the effective page
    #[must_use]
    pub fn offset(&self) -> u32 {
        let page = self.page.unwrap_or(1).max(1);
        (page - 1).saturating_mul(self.limit())
    }
}

/// Count-plus-results envelope for paginated list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matching records across all pages
    pub count: i64,
    /// Records on this page
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap a page of results with its total count
    #[must_use]
    pub fn new(count: i64, results: Vec<T>) -> Self {
        Self { count, results }
    }
}
