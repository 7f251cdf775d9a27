//! Schema migrations embedded at compile time.
//!
//! Migrations run over a synchronous connection on the blocking pool before
//! the async connection pool is built.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {message}")]
    Connect {
        /// Error detail.
        message: String,
    },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply {
        /// Error detail.
        message: String,
    },
    /// The blocking migration task did not complete.
    #[error("migration task failed: {message}")]
    Task {
        /// Error detail.
        message: String,
    },
}

fn apply_pending(database_url: &str) -> Result<usize, MigrationError> {
    let mut connection =
        PgConnection::establish(database_url).map_err(|error| MigrationError::Connect {
            message: error.to_string(),
        })?;
    connection
        .run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
        .map_err(|error| MigrationError::Apply {
            message: error.to_string(),
        })
}

/// Apply all pending migrations to the database at `database_url`.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a migration
/// fails.
pub async fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || apply_pending(&url))
        .await
        .map_err(|error| MigrationError::Task {
            message: error.to_string(),
        })??;
    info!(applied, "database migrations up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn unreachable_database_reports_connect_error() {
        let err = run_migrations("postgres://nobody@127.0.0.1:1/edunexus")
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, MigrationError::Connect { .. }));
    }
}
