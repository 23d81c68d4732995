//! Immutable in-memory game catalog.

/// Built-in game list.
pub mod seed;
/// Where catalogs come from and how they are loaded.
pub mod source;

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

pub use seed::BUILTIN_GAMES;
pub use source::CatalogSource;

use crate::{
    error::LoadFailure,
    models::{GameCategory, GameRecord},
};

/// Ordered, read-only collection of game records.
///
/// Cloning is cheap: all clones share the same backing slice. Iteration
/// order is insertion order.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    records: Arc<[GameRecord]>,
}

impl CatalogStore {
    /// Build a store, rejecting empty or duplicate identifiers.
    pub fn new(records: Vec<GameRecord>) -> Result<Self, LoadFailure> {
        let mut seen = HashSet::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(LoadFailure::EmptyId(position));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(LoadFailure::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self {
            records: records.into(),
        })
    }

    /// Store containing the built-in game list.
    pub fn builtin() -> Result<Self, LoadFailure> {
        Self::new(BUILTIN_GAMES.clone())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.records.iter()
    }

    /// All records in insertion order.
    pub fn as_slice(&self) -> &[GameRecord] {
        &self.records
    }

    /// Record with the given identifier.
    pub fn by_id(&self, id: &str) -> Option<&GameRecord> {
        self.records.iter().find(|game| game.id == id)
    }

    /// Record with the given slug.
    pub fn by_slug(&self, slug: &str) -> Option<&GameRecord> {
        self.records.iter().find(|game| game.slug == slug)
    }

    /// Games marked as featured.
    pub fn featured(&self) -> Vec<&GameRecord> {
        self.iter().filter(|game| game.flags.featured).collect()
    }

    /// Games marked as new releases.
    pub fn new_releases(&self) -> Vec<&GameRecord> {
        self.iter().filter(|game| game.flags.is_new).collect()
    }

    /// Games marked as trending.
    pub fn trending(&self) -> Vec<&GameRecord> {
        self.iter().filter(|game| game.flags.trending).collect()
    }

    /// Records in `category`, in insertion order.
    pub fn by_category(&self, category: GameCategory) -> Vec<&GameRecord> {
        self.iter().filter(|game| game.category == category).collect()
    }

    /// Number of games per category. Categories without games are reported as zero.
    pub fn category_counts(&self) -> BTreeMap<GameCategory, usize> {
        let mut counts: BTreeMap<_, _> = GameCategory::ALL.iter().map(|c| (*c, 0)).collect();
        for game in self.iter() {
            *counts.entry(game.category).or_default() += 1;
        }
        counts
    }
}
