//! Background reminder for coupons about to expire.
//!
//! Each round lists active, un-notified coupons whose `valid_until` falls
//! inside the look-ahead window, mails the creator, and marks the coupon
//! notified. A coupon whose email could not be queued stays un-notified and
//! is retried on the next round.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{CouponRepository, Mailer, UserRepository};
use crate::domain::{Coupon, Error, Notifications};

/// Scheduling for [`CouponExpiryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponExpiryConfig {
    /// How far ahead of expiry reminders go out.
    pub window: TimeDelta,
    /// Pause between rounds.
    pub interval: Duration,
}

impl Default for CouponExpiryConfig {
    fn default() -> Self {
        Self {
            window: TimeDelta::hours(48),
            interval: Duration::from_secs(3_600),
        }
    }
}

/// Periodic coupon expiry reminder.
pub struct CouponExpiryNotifier {
    coupons: Arc<dyn CouponRepository>,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    notifications: Notifications,
    config: CouponExpiryConfig,
}

impl CouponExpiryNotifier {
    /// Build a notifier.
    pub fn new(
        coupons: Arc<dyn CouponRepository>,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        notifications: Notifications,
        config: CouponExpiryConfig,
    ) -> Self {
        Self {
            coupons,
            users,
            mailer,
            clock,
            notifications,
            config,
        }
    }

    /// Send reminders for coupons expiring within the window after `now`.
    ///
    /// Returns how many coupons were marked notified.
    pub async fn scan_and_notify(&self, now: DateTime<Utc>) -> Result<usize, Error> {
        let until = now + self.config.window;
        let candidates = self.coupons.list_expiring(now, until).await?;
        let mut notified = 0;
        for coupon in candidates
            .iter()
            .filter(|coupon| coupon.needs_expiry_notice(now, self.config.window))
        {
            if self.notify(coupon).await? {
                notified += 1;
            }
        }
        Ok(notified)
    }

    async fn notify(&self, coupon: &Coupon) -> Result<bool, Error> {
        let Some(creator) = self.users.find_by_id(&coupon.creator_id).await? else {
            warn!(coupon_id = %coupon.id, "coupon creator no longer exists");
            return Ok(false);
        };
        let message = self.notifications.coupon_expiry(
            &creator.email,
            creator.username.as_ref(),
            &coupon.code,
            coupon.valid_until,
        );
        if let Err(err) = self.mailer.send(&message).await {
            warn!(coupon_id = %coupon.id, error = %err, "coupon expiry notice not queued");
            return Ok(false);
        }
        Ok(self.coupons.mark_notified(coupon.id).await?)
    }

    /// Run one round at the clock's current time, logging the outcome.
    pub async fn tick(&self) -> usize {
        match self.scan_and_notify(self.clock.utc()).await {
            Ok(0) => {
                debug!("no coupons near expiry");
                0
            }
            Ok(count) => {
                info!(count, "coupon expiry notices sent");
                count
            }
            Err(err) => {
                warn!(error = %err, "coupon expiry scan failed");
                0
            }
        }
    }

    /// Run rounds forever, pausing [`CouponExpiryConfig::interval`] between
    /// them. Intended for a spawned task that is aborted on shutdown.
    pub async fn run(&self) {
        loop {
            self.tick().await;
            tokio::time::sleep(self.config.interval).await;
        }
    }
}
