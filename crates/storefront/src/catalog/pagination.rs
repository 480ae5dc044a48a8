//! Stateless page-number pagination.
//!
//! A page number maps to `offset = (page - 1) * per_page` and nothing else;
//! the WPGraphQL offset pagination extension does the rest. The same URL
//! always issues the same GraphQL request, on any instance.

use serde::Serialize;

use crate::woo::OffsetPageInfo;

/// A requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// GraphQL `Int` is 32-bit signed; offsets past it are rejected upstream.
    const MAX_OFFSET: u32 = i32::MAX.unsigned_abs();

    /// Build a request. Missing or zero pages mean page 1; pages whose
    /// offset would not fit a GraphQL `Int` are clamped to the last one that
    /// does.
    #[must_use]
    pub fn new(page: Option<u32>, per_page: u32) -> Self {
        let per_page = per_page.clamp(1, Self::MAX_OFFSET);
        let max_page = Self::MAX_OFFSET / per_page + 1;
        Self {
            page: page.unwrap_or(1).clamp(1, max_page),
            per_page,
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of items before this page.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Position of a page within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current: u32,
    per_page: u32,
    total_items: u32,
    total_pages: u32,
}

/// One slot in the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(u32),
    Gap,
}

impl Pagination {
    /// Pages shown either side of the current one.
    const WINDOW: u32 = 2;

    /// Combine a request with the total reported by the API.
    #[must_use]
    pub const fn new(request: PageRequest, total_items: u32) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            total_items.div_ceil(request.per_page)
        };
        Self {
            current: request.page,
            per_page: request.per_page,
            total_items,
            total_pages,
        }
    }

    /// Build from a response's page info.
    #[must_use]
    pub const fn from_page_info(request: PageRequest, page_info: &OffsetPageInfo) -> Self {
        Self::new(request, page_info.total)
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.total_items
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    /// The last page, when the request points past it.
    ///
    /// An empty result set has no out-of-range pages: page 1 renders the
    /// "no products" state, later pages redirect to page 1.
    #[must_use]
    pub const fn redirect_target(&self) -> Option<u32> {
        if self.current > self.total_pages {
            Some(self.total_pages)
        } else {
            None
        }
    }

    /// 1-based index of the first item on this page (0 when empty).
    #[must_use]
    pub const fn first_item(&self) -> u32 {
        if self.total_items == 0 {
            0
        } else {
            (self.current - 1)
                .saturating_mul(self.per_page)
                .saturating_add(1)
        }
    }

    /// 1-based index of the last item on this page.
    #[must_use]
    pub fn last_item(&self) -> u32 {
        (self.current.saturating_mul(self.per_page)).min(self.total_items)
    }

    /// First, last and current ±2 pages, with gaps where pages are skipped.
    ///
    /// A gap of exactly one page shows that page instead of an ellipsis.
    #[must_use]
    pub fn window(&self) -> Vec<PageSlot> {
        let start = self.current.saturating_sub(Self::WINDOW).max(1);
        let end = self.current.saturating_add(Self::WINDOW).min(self.total_pages);

        let mut pages = vec![1];
        pages.extend(start..=end);
        pages.push(self.total_pages);
        pages.sort_unstable();
        pages.dedup();

        let mut slots = Vec::with_capacity(pages.len() + 2);
        let mut previous: Option<u32> = None;
        for page in pages {
            if let Some(prev) = previous {
                match page - prev {
                    1 => {}
                    2 => slots.push(PageSlot::Page(prev + 1)),
                    _ => slots.push(PageSlot::Gap),
                }
            }
            slots.push(PageSlot::Page(page));
            previous = Some(page);
        }
        slots
    }

    /// Render links for templates.
    pub fn view(&self, href: impl Fn(u32) -> String) -> PaginationView {
        let links = self
            .window()
            .into_iter()
            .map(|slot| match slot {
                PageSlot::Page(number) => PageLink {
                    label: number.to_string(),
                    href: Some(href(number)),
                    is_current: number == self.current,
                },
                PageSlot::Gap => PageLink {
                    label: "…".to_string(),
                    href: None,
                    is_current: false,
                },
            })
            .collect();

        PaginationView {
            links,
            previous_href: self.has_previous().then(|| href(self.current - 1)),
            next_href: self.has_next().then(|| href(self.current + 1)),
            is_multi_page: self.total_pages > 1,
            summary: if self.total_items == 0 {
                "No results".to_string()
            } else {
                format!(
                    "Showing {}–{} of {}",
                    self.first_item(),
                    self.last_item(),
                    self.total_items
                )
            },
        }
    }
}

/// Page links precomputed for a template.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationView {
    pub links: Vec<PageLink>,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub is_multi_page: bool,
    pub summary: String,
}

/// One entry in the page strip; gaps have no href.
#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    pub label: String,
    pub href: Option<String>,
    pub is_current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offsets() {
        assert_eq!(PageRequest::new(None, 12).offset(), 0);
        assert_eq!(PageRequest::new(Some(0), 12).page(), 1);
        assert_eq!(PageRequest::new(Some(1), 12).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), 12).offset(), 24);
        assert_eq!(PageRequest::new(Some(2), 0).per_page(), 1);
    }

    #[test]
    fn test_page_request_offset_fits_graphql_int() {
        let limit = u32::try_from(i32::MAX).unwrap();
        for page in [200_000_000, u32::MAX] {
            let request = PageRequest::new(Some(page), 12);
            assert!(request.offset() <= limit);
            assert_eq!(request.page(), limit / 12 + 1);
        }
        assert_eq!(PageRequest::new(Some(u32::MAX), 1).offset(), limit);
        assert!(PageRequest::new(Some(3), u32::MAX).offset() <= limit);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(Pagination::new(PageRequest::new(None, 12), 0).total_pages(), 1);
        assert_eq!(Pagination::new(PageRequest::new(None, 12), 12).total_pages(), 1);
        assert_eq!(Pagination::new(PageRequest::new(None, 12), 13).total_pages(), 2);
    }

    #[test]
    fn test_redirect_past_last_page() {
        let p = Pagination::new(PageRequest::new(Some(9), 10), 35);
        assert_eq!(p.redirect_target(), Some(4));

        let p = Pagination::new(PageRequest::new(Some(4), 10), 35);
        assert_eq!(p.redirect_target(), None);
        assert!(!p.has_next());
        assert!(p.has_previous());

        let p = Pagination::new(PageRequest::new(Some(3), 10), 0);
        assert_eq!(p.redirect_target(), Some(1));
    }

    #[test]
    fn test_item_range() {
        let p = Pagination::new(PageRequest::new(Some(3), 10), 25);
        assert_eq!((p.first_item(), p.last_item()), (21, 25));
        let p = Pagination::new(PageRequest::new(Some(1), 10), 0);
        assert_eq!((p.first_item(), p.last_item()), (0, 0));
    }

    #[test]
    fn test_window_with_gaps() {
        use PageSlot::{Gap, Page};

        let p = Pagination::new(PageRequest::new(Some(6), 1), 12);
        assert_eq!(
            p.window(),
            vec![Page(1), Gap, Page(4), Page(5), Page(6), Page(7), Page(8), Gap, Page(12)]
        );

        // A single skipped page is shown rather than elided.
        let p = Pagination::new(PageRequest::new(Some(4), 1), 6);
        assert_eq!(
            p.window(),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6)]
        );

        let p = Pagination::new(PageRequest::new(Some(1), 10), 5);
        assert_eq!(p.window(), vec![Page(1)]);
    }

    #[test]
    fn test_view_links() {
        let p = Pagination::new(PageRequest::new(Some(2), 10), 30);
        let view = p.view(|n| format!("/shop?page={n}"));
        assert_eq!(view.previous_href.as_deref(), Some("/shop?page=1"));
        assert_eq!(view.next_href.as_deref(), Some("/shop?page=3"));
        assert!(view.is_multi_page);
        assert_eq!(view.summary, "Showing 11–20 of 30");
        let current: Vec<&str> = view
            .links
            .iter()
            .filter(|l| l.is_current)
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(current, vec!["2"]);
    }
}
