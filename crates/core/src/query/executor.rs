use std::cmp::Ordering;

use crate::{catalog::CatalogStore, models::GameRecord};

use super::{Predicate, SortKey, SortOrder, SortSpec};

/// Records accepted by `predicate`, in catalog order.
pub fn execute<'a>(catalog: &'a CatalogStore, predicate: &Predicate) -> Vec<&'a GameRecord> {
    if predicate.is_trivial() {
        return catalog.iter().collect();
    }
    catalog.iter().filter(|game| predicate.matches(game)).collect()
}

/// Like [`execute`], then ordered by `sort`. Ties keep catalog order.
pub fn execute_sorted<'a>(
    catalog: &'a CatalogStore,
    predicate: &Predicate,
    sort: SortSpec,
) -> Vec<&'a GameRecord> {
    let mut results = execute(catalog, predicate);
    sort_results(&mut results, sort);
    results
}

/// Stable in-place sort. [`SortKey::Relevance`] leaves the order untouched.
pub fn sort_results(results: &mut [&GameRecord], sort: SortSpec) {
    if sort.key == SortKey::Relevance {
        return;
    }
    results.sort_by(|a, b| {
        let ordering = compare(a, b, sort.key);
        match sort.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn compare(a: &GameRecord, b: &GameRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Relevance => Ordering::Equal,
        SortKey::Rating => a.rating.average.total_cmp(&b.rating.average),
        SortKey::Newest => a.release_date.cmp(&b.release_date),
        SortKey::Popular => a.play_count.cmp(&b.play_count),
        SortKey::Alphabetical => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::FileSize => a.file_size_mb.total_cmp(&b.file_size_mb),
    }
}
