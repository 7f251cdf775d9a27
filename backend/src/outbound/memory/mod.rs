//! In-memory repositories.
//!
//! [`MemoryStore`] implements every repository port over one mutex-guarded
//! state, so multi-table operations such as placing an order are atomic the
//! same way a database transaction would make them. It backs the server when
//! no database URL is configured and the end-to-end tests.

mod accounts;
mod catalogue;
mod commerce;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::CourseWrite;
use crate::domain::{
    AccountBalance, Category, Coupon, Course, Enrollment, Lesson, Order, RatingSummary, Review,
    Tag, User, UserId,
};

#[derive(Debug, Clone)]
struct EnrollmentRow {
    user_id: UserId,
    course_id: Uuid,
    enrolled_at: DateTime<Utc>,
    progress: f64,
    completed: bool,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    balances: HashMap<UserId, AccountBalance>,
    categories: HashMap<Uuid, Category>,
    tags: HashMap<Uuid, Tag>,
    courses: HashMap<Uuid, CourseWrite>,
    lessons: HashMap<Uuid, Lesson>,
    reviews: HashMap<Uuid, Review>,
    coupons: HashMap<Uuid, Coupon>,
    orders: HashMap<Uuid, Order>,
    enrollments: Vec<EnrollmentRow>,
}

impl State {
    fn rating(&self, course_id: Uuid) -> RatingSummary {
        self.reviews
            .values()
            .filter(|review| review.course_id == course_id)
            .fold(RatingSummary::default(), |summary, review| RatingSummary {
                total: summary.total + i64::from(review.rating.value()),
                count: summary.count + 1,
            })
    }

    /// Join a stored course with its instructor, category, tags, and ratings.
    fn hydrate(&self, row: &CourseWrite) -> Course {
        Course {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            price: row.price,
            instructor_id: row.instructor_id.clone(),
            instructor_username: self
                .users
                .get(&row.instructor_id)
                .map(|user| user.username.to_string())
                .unwrap_or_default(),
            category: row
                .category_id
                .and_then(|id| self.categories.get(&id))
                .cloned(),
            tags: row
                .tag_ids
                .iter()
                .filter_map(|id| self.tags.get(id))
                .cloned()
                .collect(),
            rating: self.rating(row.id),
            created_at: row.created_at,
        }
    }

    fn enrollment(&self, row: &EnrollmentRow) -> Option<Enrollment> {
        let course = self.courses.get(&row.course_id)?;
        Some(Enrollment {
            user_id: row.user_id.clone(),
            course: self.hydrate(course),
            enrolled_at: row.enrolled_at,
            progress: row.progress,
            completed: row.completed,
        })
    }
}

/// Shared in-memory storage. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the state, mapping a poisoned lock through `poisoned`.
    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, State>, E> {
        self.state
            .lock()
            .map_err(|_| poisoned("in-memory store lock poisoned"))
    }
}

/// Sort newest first, breaking ties by id so listings are stable.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
