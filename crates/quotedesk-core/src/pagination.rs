//! Page slicing for response and product lists

use serde::Serialize;

/// One page of items (pages are 1-based)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }
}

/// Slice `items` into page `page` of `page_size`
///
/// Page 0 is treated as page 1. Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };

    let start = (page - 1).saturating_mul(page_size);
    let page_items = if page_size == 0 || start >= total_items {
        vec![]
    } else {
        let end = (start + page_size).min(total_items);
        items[start..end].to_vec()
    };

    Page {
        items: page_items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}
