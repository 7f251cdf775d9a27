//! Shared error mapping for the Diesel repositories.
//!
//! Every repository port error has `connection` and `query` constructors; the
//! helpers here take those constructors so each adapter keeps a two-line
//! `map_pool_error` / `map_diesel_error` pair of its own.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use super::pool::PoolError;

/// Map a pool failure through a repository's connection constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    warn!(%message, "database pool unavailable");
    connection(message)
}

/// Map common Diesel failures into query/connection constructors.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => connection("database connection error"),
        _ => query("database error"),
    }
}

/// Name of the unique constraint a write violated, if that is why it failed.
pub(crate) fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Clamp an affected-row count from Diesel into "did anything change".
pub(crate) const fn touched(rows: usize) -> bool {
    rows > 0
}

/// Build the error Postgres reports when `constraint` rejects a write.
#[cfg(test)]
pub(crate) fn unique_violation_error(constraint: &'static str) -> DieselError {
    DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(ConstraintViolation(constraint)),
    )
}

#[cfg(test)]
struct ConstraintViolation(&'static str);

#[cfg(test)]
impl diesel::result::DatabaseErrorInformation for ConstraintViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }
    fn details(&self) -> Option<&str> {
        None
    }
    fn hint(&self) -> Option<&str> {
        None
    }
    fn table_name(&self) -> Option<&str> {
        None
    }
    fn column_name(&self) -> Option<&str> {
        None
    }
    fn constraint_name(&self) -> Option<&str> {
        Some(self.0)
    }
    fn statement_position(&self) -> Option<i32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Connection(String),
        Query(String),
    }

    fn mapped_query(message: &'static str) -> Mapped {
        Mapped::Query(message.to_owned())
    }

    fn mapped_connection(message: &'static str) -> Mapped {
        Mapped::Connection(message.to_owned())
    }

    #[rstest]
    #[case(DieselError::NotFound, Mapped::Query("record not found".to_owned()))]
    #[case(DieselError::BrokenTransactionManager, Mapped::Connection("database connection error".to_owned()))]
    #[case(DieselError::RollbackTransaction, Mapped::Query("database error".to_owned()))]
    fn diesel_errors_map_to_query_or_connection(#[case] error: DieselError, #[case] expected: Mapped) {
        assert_eq!(
            map_basic_diesel_error(error, mapped_query, mapped_connection),
            expected
        );
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn non_database_errors_are_not_unique_violations() {
        assert!(unique_violation(&DieselError::NotFound).is_none());
    }

    #[rstest]
    fn unique_violations_report_their_constraint() {
        assert_eq!(
            unique_violation(&unique_violation_error("tags_name_key")),
            Some("tags_name_key")
        );
    }

    #[rstest]
    fn collect_rows_stops_at_first_failure() {
        let rows = vec![Ok(1), Err("bad row".to_owned()), Err("worse".to_owned())];
        let result: Result<Vec<i32>, Mapped> = collect_rows(rows.into_iter(), Mapped::Query);
        assert_eq!(result, Err(Mapped::Query("bad row".to_owned())));
    }
}
