//! Database provider selection
//!
//! ```rust,ignore
//! use tooldeck::db::DatabaseProvider;
//!
//! // In-memory database (tests, throwaway demos)
//! let store = DatabaseProvider::Memory.open().await?;
//!
//! // File-backed SQLite
//! let store = DatabaseProvider::Local { path: "data/turf.db".into() }.open().await?;
//! ```

use super::store::{TurfStore, DEFAULT_BUSY_TIMEOUT};
use std::time::Duration;
use crate::booking::OperatingWindow;
use crate::types::Result;
use crate::utils::toml_config::ToolDeckConfig;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    Local {
        /// Path to the SQLite database file
        path: String,
    },
}

impl DatabaseProvider {
    /// `:memory:` maps to [`DatabaseProvider::Memory`], anything else is a path.
    pub fn from_url(url: &str) -> Self {
        if url.trim() == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::Local {
                path: url.trim().to_string(),
            }
        }
    }

    pub async fn open(&self) -> Result<TurfStore> {
        self.open_with(DEFAULT_BUSY_TIMEOUT).await
    }

    pub async fn open_with(&self, busy_timeout: Duration) -> Result<TurfStore> {
        match self {
            DatabaseProvider::Memory => TurfStore::new_memory().await,
            DatabaseProvider::Local { path } => TurfStore::connect(path, busy_timeout).await,
        }
    }

    /// Open the configured store with the configured operating window and
    /// busy timeout.
    pub async fn open_configured(config: &ToolDeckConfig) -> Result<TurfStore> {
        let busy_timeout = Duration::from_millis(config.database.busy_timeout_ms);
        let store = Self::from_url(&config.database.url)
            .open_with(busy_timeout)
            .await?;
        Ok(store.with_window(OperatingWindow::from(&config.booking)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(DatabaseProvider::from_url(":memory:"), DatabaseProvider::Memory);
        assert_eq!(
            DatabaseProvider::from_url("data/turf.db"),
            DatabaseProvider::Local {
                path: "data/turf.db".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_open_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("turf.db");
        let provider = DatabaseProvider::Local {
            path: path.to_string_lossy().into_owned(),
        };

        let store = provider.open().await.unwrap();
        assert!(store.list_turfs().await.unwrap().is_empty());
        assert!(path.exists());
    }
}
