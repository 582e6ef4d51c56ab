//! PostgreSQL-backed `GreetingRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{
    GREETING_FETCH_FAILED_MESSAGE, GREETING_SEED_FAILED_MESSAGE, GreetingRepository,
    GreetingRepositoryError,
};
use crate::domain::{Greeting, GreetingMessage};

use super::diesel_basic_error_mapping::{database_failure, map_diesel_error};
use super::models::{GreetingRow, NewGreetingRow};
use super::pool::DbPool;
use super::schema::greetings;

/// Diesel-backed implementation of the `GreetingRepository` port.
#[derive(Clone)]
pub struct DieselGreetingRepository {
    pool: DbPool,
}

impl DieselGreetingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Decode the result of the newest-first, single-row query.
///
/// A row failing greeting validation is an integrity problem and maps to a
/// database error with the validation failure as cause.
pub(crate) fn latest_from_rows(rows: Vec<GreetingRow>) -> Result<Greeting, GreetingRepositoryError> {
    let Some(row) = rows.into_iter().next() else {
        return Err(GreetingRepositoryError::not_found());
    };
    Greeting::try_new(i64::from(row.id), row.message)
        .map_err(|err| database_failure(GREETING_FETCH_FAILED_MESSAGE, "row validation error", err))
}

#[async_trait]
impl GreetingRepository for DieselGreetingRepository {
    async fn get_latest(&self) -> Result<Greeting, GreetingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            database_failure(GREETING_FETCH_FAILED_MESSAGE, "pool checkout error", err)
        })?;
        let rows: Vec<GreetingRow> = greetings::table
            .select(GreetingRow::as_select())
            .order(greetings::id.desc())
            .limit(1)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error(GREETING_FETCH_FAILED_MESSAGE))?;
        latest_from_rows(rows)
    }

    async fn insert_if_empty(
        &self,
        message: &GreetingMessage,
    ) -> Result<bool, GreetingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            database_failure(GREETING_SEED_FAILED_MESSAGE, "pool checkout error", err)
        })?;
        let row = NewGreetingRow {
            message: message.as_str(),
        };
        let inserted = conn
            .transaction(|conn| {
                async move {
                    let seeded: bool = diesel::select(exists(greetings::table.select(greetings::id)))
                        .get_result(conn)
                        .await?;
                    if seeded {
                        return Ok(false);
                    }
                    diesel::insert_into(greetings::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error(GREETING_SEED_FAILED_MESSAGE))?;
        debug!(inserted, "greeting seed applied");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::GreetingRepositoryErrorKind;
    use rstest::rstest;

    fn row(id: i32, message: &str) -> GreetingRow {
        GreetingRow {
            id,
            message: message.to_owned(),
        }
    }

    #[rstest]
    fn empty_result_is_not_found() {
        let err = latest_from_rows(Vec::new()).expect_err("no rows");
        assert_eq!(err.kind(), GreetingRepositoryErrorKind::NotFound);
        assert_eq!(err.message(), "Greeting not found");
    }

    #[rstest]
    fn first_row_becomes_the_greeting() {
        let greeting = latest_from_rows(vec![row(100, "Newest")]).expect("greeting");
        assert_eq!(greeting, Greeting::try_new(100, "Newest").expect("valid"));
    }

    #[rstest]
    #[case(row(0, "Hello"))]
    #[case(row(-1, "Hello"))]
    #[case(row(1, ""))]
    fn invalid_rows_are_database_errors(#[case] invalid: GreetingRow) {
        let err = latest_from_rows(vec![invalid]).expect_err("invalid row");
        assert_eq!(err.kind(), GreetingRepositoryErrorKind::Database);
        assert_eq!(err.message(), GREETING_FETCH_FAILED_MESSAGE);
        assert!(err.cause().is_some());
    }
}
