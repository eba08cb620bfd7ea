//! # Database Operations
//!
//! Postgres pool construction, health checks and schema migrations for
//! [`PgStore`](crate::storage::PgStore).
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bundlr_core::config::BundlrConfig;
//! use bundlr_core::database::DatabaseConnection;
//! use bundlr_core::storage::PgStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BundlrConfig::default();
//! let db = DatabaseConnection::connect(&config.database, &config.environment).await?;
//! db.migrate().await?;
//! let store = PgStore::new(db.pool().clone());
//! # Ok(())
//! # }
//! ```

pub mod connection;

pub use connection::DatabaseConnection;
