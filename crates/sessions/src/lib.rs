//! Per-user conversation state.
//!
//! Each user owns one [`Session`]: a few scratch values plus at most one
//! pending command. [`SessionStore`] serializes access per user and persists
//! through a [`SessionBackend`].

pub mod backend;
pub mod error;
pub mod session;
pub mod sqlite;
pub mod store;

pub use {
    backend::{MemorySessionBackend, SessionBackend},
    error::{Error, Result},
    session::{Session, SessionKey, SessionValue, User},
    sqlite::SqliteSessionBackend,
    store::{SessionStore, UserGuard},
};

/// Run database migrations for the sessions crate.
///
/// Creates the `user_sessions` table used by [`SqliteSessionBackend`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
