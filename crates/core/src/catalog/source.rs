use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{error::LoadFailure, models::GameRecord};

use super::{CatalogStore, BUILTIN_GAMES};

/// Origin of the records backing a session.
#[derive(Clone)]
pub enum CatalogSource {
    /// The game list compiled into the binary.
    Builtin,
    /// Records handed over by the caller.
    Records(Arc<Vec<GameRecord>>),
    /// A JSON array of records on disk.
    File(PathBuf),
}

impl fmt::Debug for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Builtin => f.write_str("Builtin"),
            CatalogSource::Records(records) => write!(f, "Records({})", records.len()),
            CatalogSource::File(path) => write!(f, "File({})", path.display()),
        }
    }
}

impl CatalogSource {
    /// Wrap an in-memory record list.
    pub fn records(records: Vec<GameRecord>) -> Self {
        CatalogSource::Records(Arc::new(records))
    }

    /// Pick the file source when a path is configured, the built-in list otherwise.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => CatalogSource::File(path),
            None => CatalogSource::Builtin,
        }
    }

    /// Produce a validated catalog store.
    pub async fn load(&self) -> Result<CatalogStore, LoadFailure> {
        let records = match self {
            CatalogSource::Builtin => BUILTIN_GAMES.clone(),
            CatalogSource::Records(records) => records.as_ref().clone(),
            CatalogSource::File(path) => read_catalog_file(path).await?,
        };
        let store = CatalogStore::new(records)?;
        info!(source = ?self, total = store.len(), "Catalog loaded");
        Ok(store)
    }
}

async fn read_catalog_file(path: &Path) -> Result<Vec<GameRecord>, LoadFailure> {
    debug!(path = %path.display(), "Reading catalog file");
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadFailure::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&contents).map_err(|source| LoadFailure::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write records as a pretty JSON catalog, creating parent directories if needed.
pub fn export_catalog(path: impl AsRef<Path>, records: &[GameRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create catalog directory {}", parent.display())
        })?;
    }

    let serialized =
        serde_json::to_string_pretty(records).context("failed to serialize catalog")?;
    std::fs::write(path, serialized)
        .with_context(|| format!("failed to write catalog {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_round_trips_through_export() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/catalog.json");
        export_catalog(&path, &BUILTIN_GAMES[..4])?;

        let store = CatalogSource::File(path).load().await?;
        assert_eq!(store.len(), 4);
        assert_eq!(store.as_slice(), &BUILTIN_GAMES[..4]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_a_read_failure() {
        let dir = tempdir().expect("tempdir");
        let err = CatalogSource::File(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, LoadFailure::Read { .. }));
        assert_eq!(err.user_message(), "The game catalog is unavailable right now.");
    }

    #[tokio::test]
    async fn garbage_file_is_a_parse_failure() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json")?;
        let err = CatalogSource::File(path).load().await.unwrap_err();
        assert!(matches!(err, LoadFailure::Parse { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn builtin_and_records_sources_load() -> Result<()> {
        assert_eq!(CatalogSource::Builtin.load().await?.len(), 12);
        let source = CatalogSource::records(BUILTIN_GAMES[..2].to_vec());
        assert_eq!(source.load().await?.len(), 2);
        assert!(matches!(
            CatalogSource::from_path(None),
            CatalogSource::Builtin
        ));
        Ok(())
    }
}
