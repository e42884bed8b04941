//! Page and offset arithmetic over the non-pinned repository list.

use crate::models::RepositorySummary;
use std::collections::HashSet;

/// How the caller addresses the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// 1-based page number; 0 is read as 1, past-the-end is clamped.
    Page(usize),
    /// Item offset for infinite scroll; past-the-end yields nothing.
    Offset(usize),
}

/// The slice of the list a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub current_page: usize,
    /// Never below 1, even for an empty list.
    pub total_pages: usize,
    pub total: usize,
}

impl PageWindow {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_more(&self) -> bool {
        self.end < self.total
    }

    pub fn next_offset(&self) -> usize {
        self.end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start.min(items.len())..self.end.min(items.len())]
    }
}

/// Fixed-size paginator shared by both listing styles.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn window(&self, total: usize, request: PageRequest) -> PageWindow {
        let total_pages = self.total_pages(total);
        match request {
            PageRequest::Page(page) => {
                let current_page = page.clamp(1, total_pages);
                let start = ((current_page - 1) * self.page_size).min(total);
                PageWindow {
                    start,
                    end: (start + self.page_size).min(total),
                    current_page,
                    total_pages,
                    total,
                }
            }
            PageRequest::Offset(offset) => {
                let start = offset.min(total);
                PageWindow {
                    start,
                    end: start.saturating_add(self.page_size).min(total),
                    current_page: (start / self.page_size + 1).min(total_pages),
                    total_pages,
                    total,
                }
            }
        }
    }
}

/// Split `repos` into (pinned, not pinned), keeping the incoming order.
pub fn split_pinned(
    repos: Vec<RepositorySummary>,
    pinned_names: &[String],
) -> (Vec<RepositorySummary>, Vec<RepositorySummary>) {
    let pinned: HashSet<&str> = pinned_names.iter().map(String::as_str).collect();
    repos
        .into_iter()
        .partition(|repo| pinned.contains(repo.name.as_str()))
}
