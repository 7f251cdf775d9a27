//! PostgreSQL-backed user and balance repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{
    AccountBalanceRepository, BalanceRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountBalance, EmailAddress, MAX_AMOUNT_CENTS, Money, ProfileUpdate, User, UserId,
};

use super::diesel_helpers::{
    map_basic_diesel_error, map_basic_pool_error, touched, unique_violation,
};
use super::models::{BalanceRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{account_balances, users};

/// Diesel-backed [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    match unique_violation(&error) {
        Some("users_username_key") => UserPersistenceError::duplicate("username"),
        Some("users_email_key") => UserPersistenceError::duplicate("email"),
        _ => map_basic_diesel_error(
            error,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        ),
    }
}

fn to_user(row: Option<UserRow>) -> Result<Option<User>, UserPersistenceError> {
    row.map(User::try_from)
        .transpose()
        .map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User, opening_balance: Money) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_row = UserRow::from(user);
        let balance_row = BalanceRow {
            user_id: user_row.id,
            balance_cents: opening_balance.cents(),
            updated_at: user.created_at,
        };

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(account_balances::table)
                    .values(&balance_row)
                    .execute(conn)
                    .await?;
                Ok::<_, DieselError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_user(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_user(row)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_user(row)
    }

    async fn mark_verified(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::is_verified.eq(true))
            .execute(&mut conn)
            .await
            .map(touched)
            .map_err(map_diesel_error)
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)
            .await
            .map(touched)
            .map_err(map_diesel_error)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::bio.eq(update.bio.as_deref()),
                users::profile_picture.eq(update.profile_picture.as_deref()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_user(row)
    }
}

/// Diesel-backed [`AccountBalanceRepository`].
#[derive(Clone)]
pub struct DieselBalanceRepository {
    pool: DbPool,
}

impl DieselBalanceRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_balance_pool_error(error: PoolError) -> BalanceRepositoryError {
    map_basic_pool_error(error, BalanceRepositoryError::connection)
}

fn map_balance_diesel_error(error: DieselError) -> BalanceRepositoryError {
    map_basic_diesel_error(
        error,
        BalanceRepositoryError::query,
        BalanceRepositoryError::connection,
    )
}

#[async_trait]
impl AccountBalanceRepository for DieselBalanceRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<AccountBalance>, BalanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_balance_pool_error)?;
        account_balances::table
            .filter(account_balances::user_id.eq(user_id.as_uuid()))
            .select(BalanceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(AccountBalance::from))
            .map_err(map_balance_diesel_error)
    }

    async fn credit(
        &self,
        user_id: &UserId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<Option<AccountBalance>, BalanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_balance_pool_error)?;
        let ceiling = MAX_AMOUNT_CENTS.saturating_sub(amount.cents());

        // The ceiling guard keeps the column check constraint from firing.
        let credited = diesel::update(
            account_balances::table
                .filter(account_balances::user_id.eq(user_id.as_uuid()))
                .filter(account_balances::balance_cents.le(ceiling)),
        )
        .set((
            account_balances::balance_cents.eq(account_balances::balance_cents + amount.cents()),
            account_balances::updated_at.eq(at),
        ))
        .returning(BalanceRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_balance_diesel_error)?;

        if let Some(row) = credited {
            return Ok(Some(row.into()));
        }

        let exists = diesel::select(diesel::dsl::exists(
            account_balances::table.filter(account_balances::user_id.eq(user_id.as_uuid())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_balance_diesel_error)?;

        if exists {
            Err(BalanceRepositoryError::limit_exceeded())
        } else {
            Ok(None)
        }
    }
}
