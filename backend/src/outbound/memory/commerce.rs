//! Coupons and orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    CouponRepository, CouponRepositoryError, OrderRepository, OrderRepositoryError,
};
use crate::domain::{Coupon, Order, OrderPlacement, UserId};

use super::{EnrollmentRow, MemoryStore, newest_first};

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn list_by_creator(&self, creator_id: &UserId) -> Result<Vec<Coupon>, CouponRepositoryError> {
        let state = self.lock(CouponRepositoryError::query)?;
        let mut coupons: Vec<Coupon> = state
            .coupons
            .values()
            .filter(|coupon| &coupon.creator_id == creator_id)
            .cloned()
            .collect();
        newest_first(&mut coupons, |coupon| (coupon.created_at, coupon.id));
        Ok(coupons)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Coupon>, CouponRepositoryError> {
        Ok(self
            .lock(CouponRepositoryError::query)?
            .coupons
            .get(&id)
            .cloned())
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponRepositoryError> {
        Ok(self
            .lock(CouponRepositoryError::query)?
            .coupons
            .values()
            .find(|coupon| coupon.code == code && coupon.is_active)
            .cloned())
    }

    async fn create(&self, coupon: &Coupon) -> Result<(), CouponRepositoryError> {
        let mut state = self.lock(CouponRepositoryError::query)?;
        if state.coupons.values().any(|other| other.code == coupon.code) {
            return Err(CouponRepositoryError::duplicate_code(coupon.code.as_str()));
        }
        state.coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> Result<bool, CouponRepositoryError> {
        let mut state = self.lock(CouponRepositoryError::query)?;
        if state
            .coupons
            .values()
            .any(|other| other.id != coupon.id && other.code == coupon.code)
        {
            return Err(CouponRepositoryError::duplicate_code(coupon.code.as_str()));
        }
        let Some(stored) = state.coupons.get_mut(&coupon.id) else {
            return Ok(false);
        };
        stored.clone_from(coupon);
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CouponRepositoryError> {
        Ok(self
            .lock(CouponRepositoryError::query)?
            .coupons
            .remove(&id)
            .is_some())
    }

    async fn list_expiring(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, CouponRepositoryError> {
        let state = self.lock(CouponRepositoryError::query)?;
        let mut coupons: Vec<Coupon> = state
            .coupons
            .values()
            .filter(|coupon| {
                coupon.is_active
                    && !coupon.notified
                    && (from..=until).contains(&coupon.valid_until)
            })
            .cloned()
            .collect();
        coupons.sort_by_key(|coupon| (coupon.valid_until, coupon.id));
        Ok(coupons)
    }

    async fn mark_notified(&self, id: Uuid) -> Result<bool, CouponRepositoryError> {
        let mut state = self.lock(CouponRepositoryError::query)?;
        let Some(coupon) = state.coupons.get_mut(&id) else {
            return Ok(false);
        };
        coupon.notified = true;
        Ok(true)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place(&self, placement: &OrderPlacement) -> Result<Order, OrderRepositoryError> {
        let mut state = self.lock(OrderRepositoryError::query)?;
        let user_id = &placement.user_id;
        let course_id = placement.course_id;
        if state
            .orders
            .values()
            .any(|order| &order.user_id == user_id && order.course_id == course_id)
        {
            return Err(OrderRepositoryError::already_ordered());
        }
        let balance = state
            .balances
            .get_mut(user_id)
            .ok_or_else(OrderRepositoryError::balance_missing)?;
        let remaining = balance
            .balance
            .checked_sub(placement.total)
            .filter(|remaining| !remaining.is_negative())
            .ok_or_else(OrderRepositoryError::insufficient_balance)?;
        balance.balance = remaining;
        balance.updated_at = placement.placed_at;

        let order = placement.to_order();
        state.orders.insert(order.id, order.clone());
        if !state
            .enrollments
            .iter()
            .any(|row| &row.user_id == user_id && row.course_id == course_id)
        {
            state.enrollments.push(EnrollmentRow {
                user_id: user_id.clone(),
                course_id,
                enrolled_at: placement.placed_at,
                progress: 0.0,
                completed: false,
            });
        }
        Ok(order)
    }

    async fn exists(&self, user_id: &UserId, course_id: Uuid) -> Result<bool, OrderRepositoryError> {
        Ok(self
            .lock(OrderRepositoryError::query)?
            .orders
            .values()
            .any(|order| &order.user_id == user_id && order.course_id == course_id))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let state = self.lock(OrderRepositoryError::query)?;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| &order.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders, |order| (order.created_at, order.id));
        Ok(orders)
    }

    async fn find_for_user(
        &self,
        user_id: &UserId,
        order_id: Uuid,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self
            .lock(OrderRepositoryError::query)?
            .orders
            .get(&order_id)
            .filter(|order| &order.user_id == user_id)
            .cloned())
    }
}
