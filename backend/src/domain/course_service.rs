//! Course catalogue service.
//!
//! The unfiltered listing and each user's enrollments are cached as JSON
//! snapshots. Course and category writes drop the listing snapshot. Order
//! placement drops the buyer's enrollment snapshot, and deleting a course
//! drops the snapshot of everyone enrolled in it. A cache outage degrades to repository
//! reads rather than failing the request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::access::{PERMISSION_DENIED, load_actor, require_instructor};
use crate::domain::ports::{
    CourseCommand, CourseQuery, CourseRepository, CourseRequest, CourseWrite, KeyValueCache,
    TaxonomyRepository, UserRepository, get_json, set_json,
};
use crate::domain::{
    Course, CourseDraft, CourseFilter, Enrollment, Error, PopularCourse, RatingSummary, User,
    UserId, rank_popular,
};

/// Cache key holding the unfiltered course listing.
pub const COURSE_LIST_CACHE_KEY: &str = "course_list";

/// Lifetime of catalogue snapshots.
pub const CATALOGUE_CACHE_TTL: Duration = Duration::from_secs(900);

/// Cache key holding a user's enrollments.
pub fn enrollments_cache_key(user_id: &UserId) -> String {
    format!("user_enrollments_{user_id}")
}

/// Read a snapshot, treating backend failures as misses.
pub(crate) async fn cached<T: DeserializeOwned>(cache: &dyn KeyValueCache, key: &str) -> Option<T> {
    match get_json(cache, key).await {
        Ok(value) => value,
        Err(err) => {
            warn!(%key, error = %err, "cache read failed");
            None
        }
    }
}

/// Store a snapshot; failures are logged and ignored.
pub(crate) async fn remember<T: Serialize + Sync>(
    cache: &dyn KeyValueCache,
    key: &str,
    value: &T,
    ttl: Duration,
) {
    if let Err(err) = set_json(cache, key, value, ttl).await {
        warn!(%key, error = %err, "cache write failed");
    }
}

/// Drop a snapshot; failures are logged and ignored.
pub(crate) async fn forget(cache: &dyn KeyValueCache, key: &str) {
    if let Err(err) = cache.delete(key).await {
        warn!(%key, error = %err, "cache invalidation failed");
    }
}

/// Port bundle required by [`CourseService`].
#[derive(Clone)]
pub struct CoursePorts {
    /// Course storage.
    pub courses: Arc<dyn CourseRepository>,
    /// Category and tag resolution.
    pub taxonomy: Arc<dyn TaxonomyRepository>,
    /// Instructor lookup.
    pub users: Arc<dyn UserRepository>,
    /// Listing and enrollment snapshots.
    pub cache: Arc<dyn KeyValueCache>,
    /// Creation timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Course service implementing [`CourseCommand`] and [`CourseQuery`].
#[derive(Clone)]
pub struct CourseService {
    ports: CoursePorts,
}

impl CourseService {
    /// Create a service over the given ports.
    pub fn new(ports: CoursePorts) -> Self {
        Self { ports }
    }

    async fn require_course(&self, id: Uuid) -> Result<Course, Error> {
        self.ports
            .courses
            .find_course(id)
            .await?
            .ok_or_else(|| Error::not_found("Course not found."))
    }

    async fn require_owned(&self, actor: &UserId, id: Uuid) -> Result<(User, Course), Error> {
        let user = load_actor(self.ports.users.as_ref(), actor).await?;
        let course = self.require_course(id).await?;
        if !course.is_owned_by(&user.id) {
            return Err(Error::forbidden(PERMISSION_DENIED));
        }
        Ok((user, course))
    }

    /// Resolve category and tag names, then build the row to write and the
    /// course to return.
    async fn materialise(
        &self,
        id: Uuid,
        instructor: &User,
        request: &CourseRequest,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(CourseWrite, Course), Error> {
        let draft = CourseDraft::new(
            &request.title,
            &request.description,
            request.price,
            request.category.as_deref(),
            &request.tags,
        )?;
        let now = self.ports.clock.utc();
        let category = match draft.category.as_deref() {
            Some(name) => Some(self.ports.taxonomy.ensure_category(name, now).await?),
            None => None,
        };
        let tags = if draft.tags.is_empty() {
            Vec::new()
        } else {
            self.ports.taxonomy.ensure_tags(&draft.tags, now).await?
        };

        let write = CourseWrite {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            price: draft.price,
            instructor_id: instructor.id.clone(),
            category_id: category.as_ref().map(|category| category.id),
            tag_ids: tags.iter().map(|tag| tag.id).collect(),
            created_at,
        };
        let course = Course {
            id,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            instructor_id: instructor.id.clone(),
            instructor_username: instructor.username.to_string(),
            category,
            tags,
            rating: RatingSummary::default(),
            created_at,
        };
        Ok((write, course))
    }

    async fn load_all(&self) -> Result<Vec<Course>, Error> {
        let cache = self.ports.cache.as_ref();
        if let Some(courses) = cached::<Vec<Course>>(cache, COURSE_LIST_CACHE_KEY).await {
            return Ok(courses);
        }
        let courses = self.ports.courses.list_courses().await?;
        remember(cache, COURSE_LIST_CACHE_KEY, &courses, CATALOGUE_CACHE_TTL).await;
        Ok(courses)
    }
}

#[async_trait]
impl CourseCommand for CourseService {
    async fn create_course(&self, actor: &UserId, request: CourseRequest) -> Result<Course, Error> {
        let instructor = require_instructor(self.ports.users.as_ref(), actor).await?;
        let now = self.ports.clock.utc();
        let (write, course) = self
            .materialise(Uuid::new_v4(), &instructor, &request, now)
            .await?;
        self.ports.courses.create_course(&write).await?;
        forget(self.ports.cache.as_ref(), COURSE_LIST_CACHE_KEY).await;
        info!(course_id = %course.id, instructor_id = %actor, "course created");
        Ok(course)
    }

    async fn update_course(
        &self,
        actor: &UserId,
        id: Uuid,
        request: CourseRequest,
    ) -> Result<Course, Error> {
        let (instructor, existing) = self.require_owned(actor, id).await?;
        let (write, course) = self
            .materialise(id, &instructor, &request, existing.created_at)
            .await?;
        if !self.ports.courses.update_course(&write).await? {
            return Err(Error::not_found("Course not found."));
        }
        forget(self.ports.cache.as_ref(), COURSE_LIST_CACHE_KEY).await;
        Ok(Course {
            rating: existing.rating,
            ..course
        })
    }

    async fn delete_course(&self, actor: &UserId, id: Uuid) -> Result<(), Error> {
        self.require_owned(actor, id).await?;
        let Some(enrolled) = self.ports.courses.delete_course(id).await? else {
            return Err(Error::not_found("Course not found."));
        };
        let cache = self.ports.cache.as_ref();
        forget(cache, COURSE_LIST_CACHE_KEY).await;
        for user_id in &enrolled {
            forget(cache, &enrollments_cache_key(user_id)).await;
        }
        info!(course_id = %id, enrolled = enrolled.len(), "course deleted");
        Ok(())
    }
}

#[async_trait]
impl CourseQuery for CourseService {
    async fn list_courses(&self, filter: CourseFilter) -> Result<Vec<Course>, Error> {
        if filter.is_empty() {
            return self.load_all().await;
        }
        let mut courses = self.ports.courses.list_courses().await?;
        courses.retain(|course| filter.matches(course));
        Ok(courses)
    }

    async fn get_course(&self, id: Uuid) -> Result<Course, Error> {
        self.require_course(id).await
    }

    async fn popular_courses(&self) -> Result<Vec<PopularCourse>, Error> {
        let mut courses = self.ports.courses.popular_courses().await?;
        rank_popular(&mut courses);
        Ok(courses)
    }

    async fn list_enrollments(&self, user_id: &UserId) -> Result<Vec<Enrollment>, Error> {
        let cache = self.ports.cache.as_ref();
        let key = enrollments_cache_key(user_id);
        if let Some(enrollments) = cached::<Vec<Enrollment>>(cache, &key).await {
            return Ok(enrollments);
        }
        let enrollments = self.ports.courses.list_enrollments(user_id).await?;
        remember(cache, &key, &enrollments, CATALOGUE_CACHE_TTL).await;
        Ok(enrollments)
    }

    async fn get_enrollment(&self, user_id: &UserId, course_id: Uuid) -> Result<Enrollment, Error> {
        self.ports
            .courses
            .find_enrollment(user_id, course_id)
            .await?
            .ok_or_else(|| Error::not_found("Enrollment not found."))
    }
}

#[cfg(test)]
#[path = "course_service_tests.rs"]
mod tests;
