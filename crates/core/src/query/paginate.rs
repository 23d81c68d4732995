use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, models::GameRecord};

/// One materialised page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    /// Records on the current page, in result order.
    pub items: Vec<GameRecord>,
    /// Records matching the query across all pages.
    pub total_matches: usize,
    /// Always at least 1, even with no matches.
    pub total_pages: usize,
    /// 1-based, within `1..=total_pages`.
    pub current_page: usize,
    /// Requested page size; the last page may hold fewer items.
    pub page_size: usize,
}

impl ResultPage {
    /// No record matched the query.
    pub fn is_empty(&self) -> bool {
        self.total_matches == 0
    }

    /// Whether a page exists before this one.
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a page exists after this one.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// 1-based positions of the first and last item shown, if any.
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.current_page - 1) * self.page_size + 1;
        Some((first, first + self.items.len() - 1))
    }
}

/// Slice `results` into the page at `page`, clamping the page into range.
pub fn paginate(
    results: &[&GameRecord],
    page: usize,
    page_size: usize,
) -> Result<ResultPage, ValidationError> {
    if page_size == 0 {
        return Err(ValidationError::ZeroPageSize);
    }

    let total_matches = results.len();
    let total_pages = total_matches.div_ceil(page_size).max(1);
    let current_page = page.clamp(1, total_pages);
    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(total_matches);
    let items = results[start..end]
        .iter()
        .map(|game| (*game).clone())
        .collect();

    Ok(ResultPage {
        items,
        total_matches,
        total_pages,
        current_page,
        page_size,
    })
}
