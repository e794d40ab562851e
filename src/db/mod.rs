//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over
//! database operations.
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//! - [`retry`]: Bounded retry of transiently-failing write operations
//! - [`embedded`]: Embedded PostgreSQL database support (optional feature)
//!
//! # Backend selection
//!
//! The deployment mode (embedded vs. external PostgreSQL) is resolved exactly
//! once at startup from [`crate::config::DatabaseConfig`]; everything below
//! that point sees a single `PgPool`. Repositories never branch on the
//! backend.
//!
//! # Transactions
//!
//! Repositories are constructed from a `PgConnection`, so callers choose
//! whether to run them inside a transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut repo = Users::new(&mut tx);
//! // ... operations ...
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/`
//! directory. The [`crate::migrator`] function provides access to the
//! migrator.

pub mod embedded;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod retry;
