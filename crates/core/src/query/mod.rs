//! Filter, search, sort and pagination over a catalog.

/// Filter request value object and partial updates.
pub mod filter;
/// Applying predicates and sorts to a catalog.
pub mod executor;
/// Fixed-size result pages.
pub mod paginate;
/// Combined record predicate.
pub mod predicate;

pub use executor::{execute, execute_sorted, sort_results};
pub use filter::{
    toggle, FilterRequest, FilterUpdate, SortKey, SortOrder, SortSpec, DEFAULT_PAGE_SIZE,
};
pub use paginate::{paginate, ResultPage};
pub use predicate::Predicate;

use crate::{catalog::CatalogStore, error::ValidationError};

/// Run `request` against `catalog` end to end: predicate, scan, sort, page.
pub fn run_query(
    catalog: &CatalogStore,
    request: &FilterRequest,
) -> Result<ResultPage, ValidationError> {
    let predicate = Predicate::build(request);
    let results = execute_sorted(catalog, &predicate, request.sort);
    paginate(&results, request.page, request.page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameCategory, GameFlag};

    #[test]
    fn featured_puzzle_or_racing_scenario() {
        let catalog = CatalogStore::builtin().expect("builtin catalog");
        let mut request = FilterRequest::default();
        request.apply(
            FilterUpdate::default()
                .categories([GameCategory::Puzzle, GameCategory::Racing])
                .flags([GameFlag::Featured]),
        );
        let page = run_query(&catalog, &request).expect("valid request");
        assert_eq!(page.total_matches, 1);
        assert!(page.items.iter().all(|game| game.flags.featured
            && matches!(game.category, GameCategory::Puzzle | GameCategory::Racing)));
    }

    #[test]
    fn sorted_query_pages_follow_sort_order() {
        let catalog = CatalogStore::builtin().expect("builtin catalog");
        let mut request = FilterRequest::with_page_size(5).expect("valid size");
        request.apply(FilterUpdate::default().sort(SortSpec::by(SortKey::Popular)).page(1));
        let page = run_query(&catalog, &request).expect("valid request");
        assert_eq!(page.total_pages, 3);
        let counts: Vec<_> = page.items.iter().map(|game| game.play_count).collect();
        assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
