//! PostgreSQL-backed coupons and their course scoping.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CouponRepository, CouponRepositoryError};
use crate::domain::{Coupon, UserId};

use super::diesel_helpers::{
    collect_rows, map_basic_diesel_error, map_basic_pool_error, touched, unique_violation,
};
use super::models::{CouponRow, coupon_from_row};
use super::pool::{DbPool, PoolError};
use super::schema::{coupon_courses, coupons};

/// Diesel-backed [`CouponRepository`].
#[derive(Clone)]
pub struct DieselCouponRepository {
    pool: DbPool,
}

impl DieselCouponRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CouponRepositoryError {
    map_basic_pool_error(error, CouponRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> CouponRepositoryError {
    map_basic_diesel_error(
        error,
        CouponRepositoryError::query,
        CouponRepositoryError::connection,
    )
}

fn map_write_error(error: DieselError, code: &str) -> CouponRepositoryError {
    match unique_violation(&error) {
        Some("coupons_code_key") => CouponRepositoryError::duplicate_code(code),
        _ => map_diesel_error(error),
    }
}

async fn write_course_links(
    conn: &mut AsyncPgConnection,
    coupon: &Coupon,
) -> Result<(), DieselError> {
    diesel::delete(coupon_courses::table.filter(coupon_courses::coupon_id.eq(coupon.id)))
        .execute(conn)
        .await?;
    if coupon.course_ids.is_empty() {
        return Ok(());
    }
    let links: Vec<_> = coupon
        .course_ids
        .iter()
        .map(|course_id| {
            (
                coupon_courses::coupon_id.eq(coupon.id),
                coupon_courses::course_id.eq(*course_id),
            )
        })
        .collect();
    diesel::insert_into(coupon_courses::table)
        .values(links)
        .execute(conn)
        .await?;
    Ok(())
}

/// Attach course scoping to coupon rows.
async fn with_courses(
    conn: &mut AsyncPgConnection,
    rows: Vec<CouponRow>,
) -> Result<Vec<Coupon>, CouponRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut courses_by_coupon: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let links: Vec<(Uuid, Uuid)> = coupon_courses::table
        .filter(coupon_courses::coupon_id.eq_any(&ids))
        .order((coupon_courses::coupon_id, coupon_courses::course_id))
        .select((coupon_courses::coupon_id, coupon_courses::course_id))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    for (coupon_id, course_id) in links {
        courses_by_coupon.entry(coupon_id).or_default().push(course_id);
    }
    collect_rows(
        rows.into_iter().map(|row| {
            let course_ids = courses_by_coupon.remove(&row.id).unwrap_or_default();
            coupon_from_row(row, course_ids)
        }),
        CouponRepositoryError::query,
    )
}

impl DieselCouponRepository {
    async fn first_where<F>(&self, query: F) -> Result<Option<Coupon>, CouponRepositoryError>
    where
        F: FnOnce(coupons::table) -> coupons::BoxedQuery<'static, diesel::pg::Pg> + Send,
    {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CouponRow> = query(coupons::table)
            .select(CouponRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let found = with_courses(&mut conn, row.into_iter().collect()).await?;
        Ok(found.into_iter().next())
    }
}

#[async_trait]
impl CouponRepository for DieselCouponRepository {
    async fn list_by_creator(&self, creator_id: &UserId) -> Result<Vec<Coupon>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CouponRow> = coupons::table
            .filter(coupons::creator_id.eq(creator_id.as_uuid()))
            .order((coupons::created_at.desc(), coupons::id.desc()))
            .select(CouponRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        with_courses(&mut conn, rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Coupon>, CouponRepositoryError> {
        self.first_where(move |table| table.filter(coupons::id.eq(id)).into_boxed())
            .await
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponRepositoryError> {
        let code = code.to_owned();
        self.first_where(move |table| {
            table
                .filter(coupons::code.eq(code))
                .filter(coupons::is_active.eq(true))
                .into_boxed()
        })
        .await
    }

    async fn create(&self, coupon: &Coupon) -> Result<(), CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CouponRow::from(coupon);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(coupons::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                write_course_links(conn, coupon).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, &coupon.code))
    }

    async fn update(&self, coupon: &Coupon) -> Result<bool, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CouponRow::from(coupon);
        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(coupons::table.find(row.id))
                    .set((
                        coupons::code.eq(&row.code),
                        coupons::discount_percentage.eq(row.discount_percentage),
                        coupons::valid_until.eq(row.valid_until),
                        coupons::is_active.eq(row.is_active),
                        coupons::min_order_value_cents.eq(row.min_order_value_cents),
                        coupons::notified.eq(row.notified),
                    ))
                    .execute(conn)
                    .await?;
                if !touched(updated) {
                    return Ok(false);
                }
                write_course_links(conn, coupon).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, &coupon.code))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(coupons::table.find(id))
            .execute(&mut conn)
            .await
            .map(touched)
            .map_err(map_diesel_error)
    }

    async fn list_expiring(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CouponRow> = coupons::table
            .filter(coupons::is_active.eq(true))
            .filter(coupons::notified.eq(false))
            .filter(coupons::valid_until.between(from, until))
            .order((coupons::valid_until, coupons::id))
            .select(CouponRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        with_courses(&mut conn, rows).await
    }

    async fn mark_notified(&self, id: Uuid) -> Result<bool, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(coupons::table.find(id))
            .set(coupons::notified.eq(true))
            .execute(&mut conn)
            .await
            .map(touched)
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::persistence::diesel_helpers::unique_violation_error;
    use rstest::rstest;

    #[rstest]
    fn code_clash_reports_the_code() {
        assert_eq!(
            map_write_error(unique_violation_error("coupons_code_key"), "SPRING10"),
            CouponRepositoryError::duplicate_code("SPRING10")
        );
    }

    #[rstest]
    fn closed_transactions_are_connection_errors() {
        assert!(matches!(
            map_diesel_error(DieselError::BrokenTransactionManager),
            CouponRepositoryError::Connection { .. }
        ));
    }
}
