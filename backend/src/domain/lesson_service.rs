//! Lessons inside a course. Writes are reserved for the course's instructor.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::access::PERMISSION_DENIED;
use crate::domain::ports::{
    CourseRepository, LessonCommand, LessonQuery, LessonRepository, LessonRequest,
};
use crate::domain::{Course, Error, Lesson, LessonDraft, UserId};

/// Lesson service implementing [`LessonCommand`] and [`LessonQuery`].
#[derive(Clone)]
pub struct LessonService {
    lessons: Arc<dyn LessonRepository>,
    courses: Arc<dyn CourseRepository>,
    clock: Arc<dyn Clock>,
}

impl LessonService {
    /// Create a service over the lesson and course repositories.
    pub fn new(
        lessons: Arc<dyn LessonRepository>,
        courses: Arc<dyn CourseRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lessons,
            courses,
            clock,
        }
    }

    async fn require_course(&self, course_id: Uuid) -> Result<Course, Error> {
        self.courses
            .find_course(course_id)
            .await?
            .ok_or_else(|| Error::not_found("Course not found."))
    }

    async fn require_owned_course(&self, actor: &UserId, course_id: Uuid) -> Result<Course, Error> {
        let course = self.require_course(course_id).await?;
        if !course.is_owned_by(actor) {
            return Err(Error::forbidden(PERMISSION_DENIED));
        }
        Ok(course)
    }

    async fn require_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> Result<Lesson, Error> {
        self.lessons
            .find(course_id, lesson_id)
            .await?
            .ok_or_else(|| Error::not_found("Lesson not found."))
    }
}

fn draft_from(request: &LessonRequest) -> Result<LessonDraft, Error> {
    Ok(LessonDraft::new(
        &request.title,
        request.video.as_deref(),
        &request.content,
    )?)
}

#[async_trait]
impl LessonCommand for LessonService {
    async fn create_lesson(
        &self,
        actor: &UserId,
        course_id: Uuid,
        request: LessonRequest,
    ) -> Result<Lesson, Error> {
        self.require_owned_course(actor, course_id).await?;
        let draft = draft_from(&request)?;
        let lesson = Lesson {
            id: Uuid::new_v4(),
            course_id,
            title: draft.title,
            video: draft.video,
            content: draft.content,
            created_at: self.clock.utc(),
        };
        self.lessons.create(&lesson).await?;
        Ok(lesson)
    }

    async fn update_lesson(
        &self,
        actor: &UserId,
        course_id: Uuid,
        lesson_id: Uuid,
        request: LessonRequest,
    ) -> Result<Lesson, Error> {
        self.require_owned_course(actor, course_id).await?;
        let existing = self.require_lesson(course_id, lesson_id).await?;
        let draft = draft_from(&request)?;
        let lesson = Lesson {
            title: draft.title,
            video: draft.video,
            content: draft.content,
            ..existing
        };
        if !self.lessons.update(&lesson).await? {
            return Err(Error::not_found("Lesson not found."));
        }
        Ok(lesson)
    }

    async fn delete_lesson(
        &self,
        actor: &UserId,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<(), Error> {
        self.require_owned_course(actor, course_id).await?;
        if !self.lessons.delete(course_id, lesson_id).await? {
            return Err(Error::not_found("Lesson not found."));
        }
        Ok(())
    }
}

#[async_trait]
impl LessonQuery for LessonService {
    async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<Lesson>, Error> {
        self.require_course(course_id).await?;
        Ok(self.lessons.list(course_id).await?)
    }

    async fn get_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> Result<Lesson, Error> {
        self.require_lesson(course_id, lesson_id).await
    }
}
