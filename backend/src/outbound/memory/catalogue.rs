//! Categories, tags, courses, lessons, and reviews.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    CourseRepository, CourseRepositoryError, CourseWrite, LessonRepository,
    LessonRepositoryError, ReviewRepository, ReviewRepositoryError, TaxonomyRepository,
    TaxonomyRepositoryError,
};
use crate::domain::{Category, Course, Enrollment, Lesson, PopularCourse, Review, Tag, UserId};

use super::{MemoryStore, newest_first};

#[async_trait]
impl TaxonomyRepository for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, TaxonomyRepositoryError> {
        let state = self.lock(TaxonomyRepositoryError::query)?;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, TaxonomyRepositoryError> {
        Ok(self
            .lock(TaxonomyRepositoryError::query)?
            .categories
            .get(&id)
            .cloned())
    }

    async fn create_category(&self, category: &Category) -> Result<(), TaxonomyRepositoryError> {
        let mut state = self.lock(TaxonomyRepositoryError::query)?;
        if state.categories.values().any(|other| other.name == category.name) {
            return Err(TaxonomyRepositoryError::duplicate_name(category.name.as_str()));
        }
        state.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Result<bool, TaxonomyRepositoryError> {
        let mut state = self.lock(TaxonomyRepositoryError::query)?;
        if state
            .categories
            .values()
            .any(|other| other.id != category.id && other.name == category.name)
        {
            return Err(TaxonomyRepositoryError::duplicate_name(category.name.as_str()));
        }
        let Some(stored) = state.categories.get_mut(&category.id) else {
            return Ok(false);
        };
        stored.clone_from(category);
        Ok(true)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, TaxonomyRepositoryError> {
        let mut state = self.lock(TaxonomyRepositoryError::query)?;
        if state.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for child in state.categories.values_mut() {
            if child.parent_id == Some(id) {
                child.parent_id = None;
            }
        }
        for course in state.courses.values_mut() {
            if course.category_id == Some(id) {
                course.category_id = None;
            }
        }
        Ok(true)
    }

    async fn ensure_category(
        &self,
        name: &str,
        at: DateTime<Utc>,
    ) -> Result<Category, TaxonomyRepositoryError> {
        let mut state = self.lock(TaxonomyRepositoryError::query)?;
        if let Some(existing) = state.categories.values().find(|category| category.name == name) {
            return Ok(existing.clone());
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: None,
            parent_id: None,
            created_at: at,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn ensure_tags(
        &self,
        names: &[String],
        at: DateTime<Utc>,
    ) -> Result<Vec<Tag>, TaxonomyRepositoryError> {
        let mut state = self.lock(TaxonomyRepositoryError::query)?;
        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let existing = state.tags.values().find(|tag| &tag.name == name).cloned();
            let tag = existing.unwrap_or_else(|| {
                let tag = Tag {
                    id: Uuid::new_v4(),
                    name: name.clone(),
                    created_at: at,
                };
                state.tags.insert(tag.id, tag.clone());
                tag
            });
            tags.push(tag);
        }
        Ok(tags)
    }
}

#[async_trait]
impl CourseRepository for MemoryStore {
    async fn list_courses(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        let mut courses: Vec<Course> = state.courses.values().map(|row| state.hydrate(row)).collect();
        newest_first(&mut courses, |course| (course.created_at, course.id));
        Ok(courses)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        Ok(state.courses.get(&id).map(|row| state.hydrate(row)))
    }

    async fn find_course_by_title(
        &self,
        title: &str,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        Ok(state
            .courses
            .values()
            .filter(|row| row.title == title)
            .min_by_key(|row| (row.created_at, row.id))
            .map(|row| state.hydrate(row)))
    }

    async fn create_course(&self, course: &CourseWrite) -> Result<(), CourseRepositoryError> {
        let mut state = self.lock(CourseRepositoryError::query)?;
        state.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn update_course(&self, course: &CourseWrite) -> Result<bool, CourseRepositoryError> {
        let mut state = self.lock(CourseRepositoryError::query)?;
        let Some(stored) = state.courses.get_mut(&course.id) else {
            return Ok(false);
        };
        stored.clone_from(course);
        Ok(true)
    }

    async fn delete_course(
        &self,
        id: Uuid,
    ) -> Result<Option<Vec<UserId>>, CourseRepositoryError> {
        let mut state = self.lock(CourseRepositoryError::query)?;
        if state.courses.remove(&id).is_none() {
            return Ok(None);
        }
        state.lessons.retain(|_, lesson| lesson.course_id != id);
        state.reviews.retain(|_, review| review.course_id != id);
        state.orders.retain(|_, order| order.course_id != id);
        let mut enrolled = Vec::new();
        state.enrollments.retain(|row| {
            if row.course_id == id {
                enrolled.push(row.user_id.clone());
                return false;
            }
            true
        });
        for coupon in state.coupons.values_mut() {
            let before = coupon.course_ids.len();
            coupon.course_ids.retain(|course_id| *course_id != id);
            if before > 0 && coupon.course_ids.is_empty() {
                coupon.is_active = false;
            }
        }
        Ok(Some(enrolled))
    }

    async fn popular_courses(&self) -> Result<Vec<PopularCourse>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        Ok(state
            .courses
            .values()
            .map(|row| PopularCourse {
                course: state.hydrate(row),
                enrollment_count: i64::try_from(
                    state
                        .enrollments
                        .iter()
                        .filter(|enrollment| enrollment.course_id == row.id)
                        .count(),
                )
                .unwrap_or(i64::MAX),
            })
            .collect())
    }

    async fn list_enrollments(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        let mut enrollments: Vec<Enrollment> = state
            .enrollments
            .iter()
            .filter(|row| &row.user_id == user_id)
            .filter_map(|row| state.enrollment(row))
            .collect();
        newest_first(&mut enrollments, |enrollment| {
            (enrollment.enrolled_at, enrollment.course.id)
        });
        Ok(enrollments)
    }

    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        Ok(state
            .enrollments
            .iter()
            .find(|row| &row.user_id == user_id && row.course_id == course_id)
            .and_then(|row| state.enrollment(row)))
    }
}

#[async_trait]
impl LessonRepository for MemoryStore {
    async fn list(&self, course_id: Uuid) -> Result<Vec<Lesson>, LessonRepositoryError> {
        let state = self.lock(LessonRepositoryError::query)?;
        let mut lessons: Vec<Lesson> = state
            .lessons
            .values()
            .filter(|lesson| lesson.course_id == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|lesson| (lesson.created_at, lesson.id));
        Ok(lessons)
    }

    async fn find(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<Lesson>, LessonRepositoryError> {
        Ok(self
            .lock(LessonRepositoryError::query)?
            .lessons
            .get(&lesson_id)
            .filter(|lesson| lesson.course_id == course_id)
            .cloned())
    }

    async fn create(&self, lesson: &Lesson) -> Result<(), LessonRepositoryError> {
        let mut state = self.lock(LessonRepositoryError::query)?;
        state.lessons.insert(lesson.id, lesson.clone());
        Ok(())
    }

    async fn update(&self, lesson: &Lesson) -> Result<bool, LessonRepositoryError> {
        let mut state = self.lock(LessonRepositoryError::query)?;
        match state.lessons.get_mut(&lesson.id) {
            Some(stored) if stored.course_id == lesson.course_id => {
                stored.clone_from(lesson);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, course_id: Uuid, lesson_id: Uuid) -> Result<bool, LessonRepositoryError> {
        let mut state = self.lock(LessonRepositoryError::query)?;
        let owned = state
            .lessons
            .get(&lesson_id)
            .is_some_and(|lesson| lesson.course_id == course_id);
        if owned {
            state.lessons.remove(&lesson_id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn list(&self, course_id: Uuid) -> Result<Vec<Review>, ReviewRepositoryError> {
        let state = self.lock(ReviewRepositoryError::query)?;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|review| review.course_id == course_id)
            .cloned()
            .collect();
        newest_first(&mut reviews, |review| (review.created_at, review.id));
        Ok(reviews)
    }

    async fn find(
        &self,
        course_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(self
            .lock(ReviewRepositoryError::query)?
            .reviews
            .get(&review_id)
            .filter(|review| review.course_id == course_id)
            .cloned())
    }

    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut state = self.lock(ReviewRepositoryError::query)?;
        state.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<bool, ReviewRepositoryError> {
        let mut state = self.lock(ReviewRepositoryError::query)?;
        match state.reviews.get_mut(&review.id) {
            Some(stored) if stored.course_id == review.course_id => {
                stored.clone_from(review);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, course_id: Uuid, review_id: Uuid) -> Result<bool, ReviewRepositoryError> {
        let mut state = self.lock(ReviewRepositoryError::query)?;
        let owned = state
            .reviews
            .get(&review_id)
            .is_some_and(|review| review.course_id == course_id);
        if owned {
            state.reviews.remove(&review_id);
        }
        Ok(owned)
    }
}
