use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::form_urlencoded;

use crate::{
    error::ValidationError,
    models::{GameCategory, GameDifficulty, GameFlag, GamePlatform, UnknownTag},
};

/// Default number of games per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Field used to order results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Catalog insertion order.
    #[default]
    Relevance,
    /// Average rating.
    Rating,
    /// Release date.
    Newest,
    /// Play count.
    Popular,
    /// Title, case-insensitive.
    Alphabetical,
    /// Download size.
    FileSize,
}

impl SortKey {
    /// Every key, in the order the UI cycles through them.
    pub const ALL: [SortKey; 6] = [
        SortKey::Relevance,
        SortKey::Rating,
        SortKey::Newest,
        SortKey::Popular,
        SortKey::Alphabetical,
        SortKey::FileSize,
    ];

    /// Lowercase name used in URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Rating => "rating",
            SortKey::Newest => "newest",
            SortKey::Popular => "popular",
            SortKey::Alphabetical => "alphabetical",
            SortKey::FileSize => "filesize",
        }
    }

    /// Direction a user most likely wants for this key.
    pub fn natural_order(self) -> SortOrder {
        match self {
            SortKey::Relevance | SortKey::Alphabetical | SortKey::FileSize => SortOrder::Ascending,
            SortKey::Rating | SortKey::Newest | SortKey::Popular => SortOrder::Descending,
        }
    }

    /// The key after this one, wrapping around.
    pub fn next(self) -> SortKey {
        let index = SortKey::ALL.iter().position(|key| *key == self).unwrap_or(0);
        SortKey::ALL[(index + 1) % SortKey::ALL.len()]
    }
}

impl FromStr for SortKey {
    type Err = UnknownTag;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownTag(value.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// Sort key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SortSpec {
    /// Field to compare.
    pub key: SortKey,
    /// Direction to compare in.
    pub order: SortOrder,
}

impl SortSpec {
    /// Sort by `key` in its natural direction.
    pub fn by(key: SortKey) -> Self {
        Self {
            key,
            order: key.natural_order(),
        }
    }
}

/// Every user-selected restriction plus the pagination position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    /// Accepted categories; empty accepts all.
    pub categories: BTreeSet<GameCategory>,
    /// Accepted difficulties; empty accepts all.
    pub difficulties: BTreeSet<GameDifficulty>,
    /// Accepted platforms; empty accepts all.
    pub platforms: BTreeSet<GamePlatform>,
    /// Flags a record must all carry.
    pub flags: BTreeSet<GameFlag>,
    /// Lowest accepted average rating.
    pub min_rating: Option<f32>,
    /// Raw text as typed; normalised by [`FilterRequest::normalized_query`].
    pub query: String,
    /// Result order.
    pub sort: SortSpec,
    /// 1-based page index.
    pub page: usize,
    /// Games per page, always positive.
    pub page_size: usize,
}

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            difficulties: BTreeSet::new(),
            platforms: BTreeSet::new(),
            flags: BTreeSet::new(),
            min_rating: None,
            query: String::new(),
            sort: SortSpec::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterRequest {
    /// Fresh request with the given page size.
    pub fn with_page_size(page_size: usize) -> Result<Self, ValidationError> {
        if page_size == 0 {
            return Err(ValidationError::ZeroPageSize);
        }
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    /// Trimmed, lowercased query text.
    pub fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }

    /// Number of active restriction groups and toggles.
    pub fn active_filter_count(&self) -> usize {
        self.categories.len()
            + self.difficulties.len()
            + self.platforms.len()
            + self.flags.len()
            + usize::from(self.min_rating.is_some())
            + usize::from(!self.normalized_query().is_empty())
    }

    /// Whether no restriction is active.
    pub fn is_unfiltered(&self) -> bool {
        self.active_filter_count() == 0
    }

    /// Reset every restriction, the sort and the page, keeping the page size.
    pub fn clear(&mut self) {
        *self = Self {
            page_size: self.page_size,
            ..Self::default()
        };
    }

    /// Merge a partial change. Returns `true` when any field changed.
    ///
    /// Changing a restriction or the sort moves back to page 1 unless the
    /// same update sets the page explicitly.
    pub fn apply(&mut self, update: FilterUpdate) -> bool {
        let before = self.clone();

        if let Some(categories) = update.categories {
            self.categories = categories;
        }
        if let Some(difficulties) = update.difficulties {
            self.difficulties = difficulties;
        }
        if let Some(platforms) = update.platforms {
            self.platforms = platforms;
        }
        if let Some(flags) = update.flags {
            self.flags = flags;
        }
        if let Some(min_rating) = update.min_rating {
            self.min_rating = min_rating.filter(|value| value.is_finite());
        }
        if let Some(query) = update.query {
            self.query = query;
        }
        if let Some(sort) = update.sort {
            self.sort = sort;
        }

        let restrictions_changed = self.categories != before.categories
            || self.difficulties != before.difficulties
            || self.platforms != before.platforms
            || self.flags != before.flags
            || self.min_rating != before.min_rating
            || self.normalized_query() != before.normalized_query()
            || self.sort != before.sort;

        match update.page {
            Some(page) => self.page = page.max(1),
            None if restrictions_changed => self.page = 1,
            None => {}
        }

        *self != before
    }
}

/// Toggle membership of `value` in `set`. Returns whether it is now present.
pub fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Partial change to a [`FilterRequest`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    /// Replacement category set.
    pub categories: Option<BTreeSet<GameCategory>>,
    /// Replacement difficulty set.
    pub difficulties: Option<BTreeSet<GameDifficulty>>,
    /// Replacement platform set.
    pub platforms: Option<BTreeSet<GamePlatform>>,
    /// Replacement required-flag set.
    pub flags: Option<BTreeSet<GameFlag>>,
    /// `Some(None)` clears the minimum rating.
    pub min_rating: Option<Option<f32>>,
    /// Replacement query text.
    pub query: Option<String>,
    /// Replacement sort.
    pub sort: Option<SortSpec>,
    /// Explicit page; suppresses the reset to page 1.
    pub page: Option<usize>,
}

impl FilterUpdate {
    /// Replace the category set.
    pub fn categories(mut self, values: impl IntoIterator<Item = GameCategory>) -> Self {
        self.categories = Some(values.into_iter().collect());
        self
    }

    /// Replace the difficulty set.
    pub fn difficulties(mut self, values: impl IntoIterator<Item = GameDifficulty>) -> Self {
        self.difficulties = Some(values.into_iter().collect());
        self
    }

    /// Replace the platform set.
    pub fn platforms(mut self, values: impl IntoIterator<Item = GamePlatform>) -> Self {
        self.platforms = Some(values.into_iter().collect());
        self
    }

    /// Replace the required flags.
    pub fn flags(mut self, values: impl IntoIterator<Item = GameFlag>) -> Self {
        self.flags = Some(values.into_iter().collect());
        self
    }

    /// Set or clear the minimum rating.
    pub fn min_rating(mut self, value: Option<f32>) -> Self {
        self.min_rating = Some(value);
        self
    }

    /// Replace the query text.
    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    /// Replace the sort.
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Jump to an explicit page.
    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Build an update from a URL query string such as
    /// `category=puzzle&category=racing&featured=1&q=cyber&page=2`.
    ///
    /// Unknown keys and unknown enum values are ignored as if unset.
    pub fn from_query_string(input: &str) -> Self {
        let mut update = FilterUpdate::default();
        let mut categories = Vec::new();
        let mut difficulties = Vec::new();
        let mut platforms = Vec::new();
        let mut flags = Vec::new();
        let mut sort_key = None;
        let mut sort_order = None;

        for (key, value) in form_urlencoded::parse(input.trim_start_matches('?').as_bytes()) {
            let value = value.into_owned();
            match &*key {
                "category" | "categories" => categories.extend(split_list(&value)),
                "difficulty" | "difficulties" => difficulties.extend(split_list(&value)),
                "platform" | "platforms" => platforms.extend(split_list(&value)),
                "flag" | "flags" => flags.extend(split_list(&value)),
                "featured" | "new" | "trending" if is_truthy(&value) => flags.push(key.to_string()),
                "featured" | "new" | "trending" => {}
                "q" | "query" => update.query = Some(value),
                "page" => match value.trim().parse::<usize>() {
                    Ok(page) => update.page = Some(page),
                    Err(_) => warn!(value = %value, "Ignoring malformed page parameter"),
                },
                "min_rating" | "minRating" => match value.trim().parse::<f32>() {
                    Ok(rating) if rating.is_finite() => update.min_rating = Some(Some(rating)),
                    _ => warn!(value = %value, "Ignoring malformed rating parameter"),
                },
                "sort" | "sortBy" => match value.parse::<SortKey>() {
                    Ok(key) => sort_key = Some(key),
                    Err(err) => warn!(%err, "Ignoring sort parameter"),
                },
                "order" | "sortOrder" => match value.trim().to_ascii_lowercase().as_str() {
                    "asc" | "ascending" => sort_order = Some(SortOrder::Ascending),
                    "desc" | "descending" => sort_order = Some(SortOrder::Descending),
                    _ => warn!(value = %value, "Ignoring sort order parameter"),
                },
                other => warn!(key = other, "Ignoring unknown filter parameter"),
            }
        }

        if !categories.is_empty() {
            update.categories = Some(parse_known(categories));
        }
        if !difficulties.is_empty() {
            update.difficulties = Some(parse_known(difficulties));
        }
        if !platforms.is_empty() {
            update.platforms = Some(parse_known(platforms));
        }
        if !flags.is_empty() {
            update.flags = Some(parse_known(flags));
        }
        if let Some(key) = sort_key {
            update.sort = Some(SortSpec {
                key,
                order: sort_order.unwrap_or_else(|| key.natural_order()),
            });
        }

        update
    }
}

fn parse_known<T, S>(names: impl IntoIterator<Item = S>) -> BTreeSet<T>
where
    T: FromStr<Err = UnknownTag> + Ord,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| match name.as_ref().parse::<T>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%err, "Ignoring unknown filter value");
                None
            }
        })
        .collect()
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    )
}
