//! Users and balances.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AccountBalanceRepository, BalanceRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{AccountBalance, EmailAddress, Money, ProfileUpdate, User, UserId};

use super::MemoryStore;

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User, opening_balance: Money) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        if state.users.values().any(|other| other.username == user.username) {
            return Err(UserPersistenceError::duplicate("username"));
        }
        if state.users.values().any(|other| other.email == user.email) {
            return Err(UserPersistenceError::duplicate("email"));
        }
        state.users.insert(user.id.clone(), user.clone());
        state.balances.insert(
            user.id.clone(),
            AccountBalance {
                user_id: user.id.clone(),
                balance: opening_balance,
                updated_at: user.created_at,
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock(UserPersistenceError::query)?.users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock(UserPersistenceError::query)?
            .users
            .values()
            .find(|user| user.username.as_ref() == username)
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock(UserPersistenceError::query)?
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn mark_verified(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let Some(user) = state.users.get_mut(id) else {
            return Ok(false);
        };
        user.is_verified = true;
        Ok(true)
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let Some(user) = state.users.get_mut(id) else {
            return Ok(false);
        };
        password_hash.clone_into(&mut user.password_hash);
        Ok(true)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        Ok(state.users.get_mut(id).map(|user| {
            user.bio.clone_from(&update.bio);
            user.profile_picture.clone_from(&update.profile_picture);
            user.clone()
        }))
    }
}

#[async_trait]
impl AccountBalanceRepository for MemoryStore {
    async fn find(&self, user_id: &UserId) -> Result<Option<AccountBalance>, BalanceRepositoryError> {
        Ok(self
            .lock(BalanceRepositoryError::query)?
            .balances
            .get(user_id)
            .cloned())
    }

    async fn credit(
        &self,
        user_id: &UserId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<Option<AccountBalance>, BalanceRepositoryError> {
        let mut state = self.lock(BalanceRepositoryError::query)?;
        let Some(balance) = state.balances.get_mut(user_id) else {
            return Ok(None);
        };
        let credited = balance
            .balance
            .checked_add(amount)
            .filter(|total| total.fits_storage())
            .ok_or_else(BalanceRepositoryError::limit_exceeded)?;
        balance.balance = credited;
        balance.updated_at = at;
        Ok(Some(balance.clone()))
    }
}
