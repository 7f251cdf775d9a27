//! Test utilities for the unit tests in `src/`.
//!
//! Only compiled under `cfg(test)`; integration tests in `tests/` build their
//! own doubles against the public ports.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Local, TimeDelta, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::{
    Category, Course, EmailAddress, Money, RatingSummary, Role, User, UserId, Username,
};

/// Fixed instant used across unit tests: 2024-10-01T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_727_784_000)
}

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixed_now())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// A verified student called `username`.
pub fn sample_user(username: &str) -> User {
    User {
        id: UserId::random(),
        username: Username::new(username).expect("fixture username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("fixture email"),
        password_hash: "$argon2id$fixture".to_owned(),
        role: Role::Student,
        is_verified: true,
        is_admin: false,
        bio: None,
        profile_picture: None,
        created_at: fixed_now(),
    }
}

/// A verified instructor called `username`.
pub fn sample_instructor(username: &str) -> User {
    User {
        role: Role::Instructor,
        ..sample_user(username)
    }
}

/// A course published by `instructor` at `price_cents`.
pub fn sample_course(instructor: &User, title: &str, price_cents: i64) -> Course {
    Course {
        id: Uuid::new_v4(),
        title: title.to_owned(),
        description: format!("{title} from first principles"),
        price: Money::from_cents(price_cents),
        instructor_id: instructor.id.clone(),
        instructor_username: instructor.username.to_string(),
        category: None,
        tags: Vec::new(),
        rating: RatingSummary::default(),
        created_at: fixed_now(),
    }
}

/// A root category called `name`.
pub fn sample_category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
        parent_id: None,
        created_at: fixed_now(),
    }
}
