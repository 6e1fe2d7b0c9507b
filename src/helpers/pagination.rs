//! Pagination: page slicing and page-link targets

use serde::Serialize;
use std::ops::{Range, RangeInclusive};

use crate::error::{Error, Result};

/// Posts per listing page
pub const POSTS_PER_PAGE: usize = 12;

/// Number of numbered links shown around the current page
pub const VISIBLE_PAGES: usize = 5;

/// How page links are addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// `/tags/rust` -> `/tags/rust/page/2`
    PathSuffix,
    /// `/search?q=go` -> `/search?q=go&page=2`
    QueryParam,
}

/// Splits a collection of `total` items into 1-based pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: usize,
    per_page: usize,
}

impl Paginator {
    pub fn new(total: usize, per_page: usize) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// `ceil(total / per_page)`; zero for an empty collection
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.per_page)
    }

    /// Item range of `page`. Pages outside `1..=total_pages` are an error,
    /// never clamped.
    pub fn bounds(&self, page: usize) -> Result<Range<usize>> {
        let total_pages = self.total_pages();
        if page < 1 || page > total_pages {
            return Err(Error::PageOutOfRange { page, total_pages });
        }
        let start = (page - 1) * self.per_page;
        let end = (start + self.per_page).min(self.total);
        Ok(start..end)
    }

    /// The items of `page`
    pub fn page<'a, T>(&self, items: &'a [T], page: usize) -> Result<&'a [T]> {
        let range = self.bounds(page)?;
        Ok(&items[range])
    }
}

/// Everything needed to render a pagination control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub current: usize,
    pub total_pages: usize,
    pub base_path: String,
    pub mode: LinkMode,
}

impl PageLinks {
    pub fn new(current: usize, total_pages: usize, base_path: impl Into<String>, mode: LinkMode) -> Self {
        Self {
            current,
            total_pages,
            base_path: base_path.into(),
            mode,
        }
    }

    /// No control is rendered without pages
    pub fn is_visible(&self) -> bool {
        self.total_pages > 0
    }

    /// Link target of `page`; page 1 is always the base path itself
    pub fn href(&self, page: usize) -> String {
        if page <= 1 {
            return self.base_path.clone();
        }
        match self.mode {
            LinkMode::PathSuffix => format!("{}/page/{}", self.base_path, page),
            LinkMode::QueryParam => {
                let separator = if self.base_path.contains('?') { '&' } else { '?' };
                format!("{}{}page={}", self.base_path, separator, page)
            }
        }
    }

    /// Numbered pages to show
    pub fn window(&self) -> RangeInclusive<usize> {
        page_window(self.current, self.total_pages, VISIBLE_PAGES)
    }

    pub fn first(&self) -> Option<String> {
        (self.current > 2).then(|| self.href(1))
    }

    pub fn prev(&self) -> Option<String> {
        (self.current > 1).then(|| self.href(self.current - 1))
    }

    pub fn next(&self) -> Option<String> {
        (self.current < self.total_pages).then(|| self.href(self.current + 1))
    }

    pub fn last(&self) -> Option<String> {
        (self.current + 1 < self.total_pages).then(|| self.href(self.total_pages))
    }
}

/// A window of `width` page numbers centered on `current`, clamped to
/// `1..=total_pages`. When the high end is clamped the window shifts down.
pub fn page_window(current: usize, total_pages: usize, width: usize) -> RangeInclusive<usize> {
    let start = current.saturating_sub(width / 2).max(1);
    let end = total_pages.min(start + width.saturating_sub(1));
    let start = if end + 1 < start + width {
        (end + 1).saturating_sub(width).max(1)
    } else {
        start
    };
    start..=end
}

/// Parse a page number from a route or query parameter
pub fn parse_page(raw: &str) -> Option<usize> {
    raw.trim().parse().ok()
}
