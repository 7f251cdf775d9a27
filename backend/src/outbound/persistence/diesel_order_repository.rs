//! PostgreSQL-backed orders and the purchase transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderPlacement, UserId};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error, unique_violation};
use super::models::{EnrollmentRow, OrderRow, order_from_row};
use super::pool::{DbPool, PoolError};
use super::schema::{account_balances, courses, enrollments, orders};

/// Diesel-backed [`OrderRepository`].
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> OrderRepositoryError {
    match unique_violation(&error) {
        // A concurrent purchase of the same course won the race.
        Some("orders_user_course_key") => OrderRepositoryError::already_ordered(),
        _ => map_basic_diesel_error(
            error,
            OrderRepositoryError::query,
            OrderRepositoryError::connection,
        ),
    }
}

/// Failure inside the purchase transaction; any variant rolls it back.
#[derive(Debug)]
enum PlacementError {
    Refused(OrderRepositoryError),
    Database(DieselError),
}

impl From<DieselError> for PlacementError {
    fn from(error: DieselError) -> Self {
        Self::Database(error)
    }
}

impl From<PlacementError> for OrderRepositoryError {
    fn from(error: PlacementError) -> Self {
        match error {
            PlacementError::Refused(refusal) => refusal,
            PlacementError::Database(error) => map_diesel_error(error),
        }
    }
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(&self, placement: &OrderPlacement) -> Result<Order, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let order = placement.to_order();
        let order_row = OrderRow::from(&order);
        let buyer = *placement.user_id.as_uuid();
        let total = placement.total.cents();

        conn.transaction::<_, PlacementError, _>(|conn| {
            async move {
                let ordered = diesel::select(diesel::dsl::exists(
                    orders::table
                        .filter(orders::user_id.eq(buyer))
                        .filter(orders::course_id.eq(order_row.course_id)),
                ))
                .get_result::<bool>(conn)
                .await?;
                if ordered {
                    return Err(PlacementError::Refused(OrderRepositoryError::already_ordered()));
                }

                let debited = diesel::update(
                    account_balances::table
                        .filter(account_balances::user_id.eq(buyer))
                        .filter(account_balances::balance_cents.ge(total)),
                )
                .set((
                    account_balances::balance_cents.eq(account_balances::balance_cents - total),
                    account_balances::updated_at.eq(placement.placed_at),
                ))
                .execute(conn)
                .await?;
                if debited == 0 {
                    let has_balance = diesel::select(diesel::dsl::exists(
                        account_balances::table.filter(account_balances::user_id.eq(buyer)),
                    ))
                    .get_result::<bool>(conn)
                    .await?;
                    return Err(PlacementError::Refused(if has_balance {
                        OrderRepositoryError::insufficient_balance()
                    } else {
                        OrderRepositoryError::balance_missing()
                    }));
                }

                diesel::insert_into(orders::table)
                    .values(&order_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(enrollments::table)
                    .values(&EnrollmentRow {
                        user_id: buyer,
                        course_id: order_row.course_id,
                        enrolled_at: placement.placed_at,
                        progress: 0.0,
                        completed: false,
                    })
                    .on_conflict((enrollments::user_id, enrollments::course_id))
                    .do_nothing()
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        Ok(order)
    }

    async fn exists(&self, user_id: &UserId, course_id: Uuid) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            orders::table
                .filter(orders::user_id.eq(user_id.as_uuid()))
                .filter(orders::course_id.eq(course_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(OrderRow, String)> = orders::table
            .inner_join(courses::table)
            .filter(orders::user_id.eq(user_id.as_uuid()))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select((OrderRow::as_select(), courses::title))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, title)| order_from_row(row, title))
            .collect())
    }

    async fn find_for_user(
        &self,
        user_id: &UserId,
        order_id: Uuid,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        orders::table
            .inner_join(courses::table)
            .filter(orders::id.eq(order_id))
            .filter(orders::user_id.eq(user_id.as_uuid()))
            .select((OrderRow::as_select(), courses::title))
            .first::<(OrderRow, String)>(&mut conn)
            .await
            .optional()
            .map(|row| row.map(|(row, title)| order_from_row(row, title)))
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::persistence::diesel_helpers::unique_violation_error;
    use rstest::rstest;

    #[rstest]
    fn racing_duplicate_order_reads_as_already_ordered() {
        assert_eq!(
            map_diesel_error(unique_violation_error("orders_user_course_key")),
            OrderRepositoryError::already_ordered()
        );
    }

    #[rstest]
    #[case(OrderRepositoryError::insufficient_balance())]
    #[case(OrderRepositoryError::balance_missing())]
    fn refusals_pass_through_unchanged(#[case] refusal: OrderRepositoryError) {
        assert_eq!(
            OrderRepositoryError::from(PlacementError::Refused(refusal.clone())),
            refusal
        );
    }

    #[rstest]
    fn database_failures_inside_placement_are_query_errors() {
        assert!(matches!(
            OrderRepositoryError::from(PlacementError::Database(DieselError::RollbackTransaction)),
            OrderRepositoryError::Query { .. }
        ));
    }
}
