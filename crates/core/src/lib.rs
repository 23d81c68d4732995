#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Arcadia game catalog.
//!
//! This crate hosts the game records, the catalog store and its sources,
//! configuration handling, the filter/search/sort/paginate pipeline and
//! the query session used by the terminal UI and any future frontends.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod session;

pub use catalog::{CatalogSource, CatalogStore};
pub use config::AppConfig;
pub use error::{LoadFailure, ValidationError};
pub use models::{GameCategory, GameDifficulty, GameFlag, GamePlatform, GameRecord};
pub use query::{run_query, FilterRequest, FilterUpdate, ResultPage, SortKey, SortOrder, SortSpec};
pub use session::{Latency, QuerySession, QueryStatus, SessionConfig, SessionState};
