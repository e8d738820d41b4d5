//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CommentRepository, PostRepository, UserRepository};
use quill_infra::MemoryStore;

#[cfg(feature = "postgres")]
use quill_infra::database::{self, DatabaseConfig};
#[cfg(feature = "postgres")]
use quill_infra::{PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(url) = &config.database_url {
                let db_config = DatabaseConfig {
                    url: url.clone(),
                    max_connections: config.db_max_connections,
                    min_connections: config.db_min_connections,
                };
                match database::connect(&db_config).await {
                    Ok(conn) => {
                        tracing::info!("Application state initialized (postgres)");
                        return Self {
                            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
                            users: Arc::new(PostgresUserRepository::new(conn)),
                        };
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory store.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
            }
        }

        #[cfg(not(feature = "postgres"))]
        if config.database_url.is_some() {
            tracing::warn!(
                "DATABASE_URL is set but this build has no postgres support; using the in-memory store"
            );
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory()
    }

    /// State over a fresh in-memory store. One store backs all three
    /// repositories so that post deletion cascades into comments.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            posts: store.clone(),
            comments: store.clone(),
            users: store,
        }
    }
}
