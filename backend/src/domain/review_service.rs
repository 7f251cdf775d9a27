//! Course reviews.
//!
//! Reviews feed course ratings, so every write drops the cached course
//! listing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::access::{PERMISSION_DENIED, load_actor};
use crate::domain::course_service::{COURSE_LIST_CACHE_KEY, forget};
use crate::domain::ports::{
    CourseRepository, KeyValueCache, ReviewCommand, ReviewQuery, ReviewRepository, ReviewRequest,
    UserRepository,
};
use crate::domain::{Error, Review, ReviewDraft, UserId};

/// Port bundle required by [`ReviewService`].
#[derive(Clone)]
pub struct ReviewPorts {
    /// Review storage.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Course and enrollment lookup.
    pub courses: Arc<dyn CourseRepository>,
    /// Author lookup.
    pub users: Arc<dyn UserRepository>,
    /// Course listing snapshot to drop.
    pub cache: Arc<dyn KeyValueCache>,
    /// Review timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Review service implementing [`ReviewCommand`] and [`ReviewQuery`].
#[derive(Clone)]
pub struct ReviewService {
    ports: ReviewPorts,
}

impl ReviewService {
    /// Create a service over the given ports.
    pub fn new(ports: ReviewPorts) -> Self {
        Self { ports }
    }

    async fn require_review(&self, course_id: Uuid, review_id: Uuid) -> Result<Review, Error> {
        self.ports
            .reviews
            .find(course_id, review_id)
            .await?
            .ok_or_else(|| Error::not_found("Review not found."))
    }

    async fn require_authored(
        &self,
        actor: &UserId,
        course_id: Uuid,
        review_id: Uuid,
    ) -> Result<Review, Error> {
        let review = self.require_review(course_id, review_id).await?;
        if &review.user_id != actor {
            return Err(Error::forbidden(PERMISSION_DENIED));
        }
        Ok(review)
    }
}

#[async_trait]
impl ReviewCommand for ReviewService {
    async fn create_review(
        &self,
        actor: &UserId,
        course_id: Uuid,
        request: ReviewRequest,
    ) -> Result<Review, Error> {
        let user = load_actor(self.ports.users.as_ref(), actor).await?;
        let course = self
            .ports
            .courses
            .find_course(course_id)
            .await?
            .ok_or_else(|| Error::not_found("Course not found."))?;
        if course.is_owned_by(&user.id) {
            return Err(Error::invalid_request(
                "Instructors cannot write reviews for their own courses.",
            ));
        }
        let draft = ReviewDraft::new(request.rating, &request.comment)?;

        let review = Review {
            id: Uuid::new_v4(),
            course_id,
            user_id: user.id,
            username: user.username.to_string(),
            rating: draft.rating,
            comment: draft.comment,
            created_at: self.ports.clock.utc(),
        };
        self.ports.reviews.create(&review).await?;
        forget(self.ports.cache.as_ref(), COURSE_LIST_CACHE_KEY).await;
        info!(review_id = %review.id, course_id = %course_id, rating = review.rating.value(), "review created");
        Ok(review)
    }

    async fn update_review(
        &self,
        actor: &UserId,
        course_id: Uuid,
        review_id: Uuid,
        request: ReviewRequest,
    ) -> Result<Review, Error> {
        let existing = self.require_authored(actor, course_id, review_id).await?;
        let draft = ReviewDraft::new(request.rating, &request.comment)?;
        let review = Review {
            rating: draft.rating,
            comment: draft.comment,
            ..existing
        };
        if !self.ports.reviews.update(&review).await? {
            return Err(Error::not_found("Review not found."));
        }
        forget(self.ports.cache.as_ref(), COURSE_LIST_CACHE_KEY).await;
        Ok(review)
    }

    async fn delete_review(
        &self,
        actor: &UserId,
        course_id: Uuid,
        review_id: Uuid,
    ) -> Result<(), Error> {
        self.require_authored(actor, course_id, review_id).await?;
        if !self.ports.reviews.delete(course_id, review_id).await? {
            return Err(Error::not_found("Review not found."));
        }
        forget(self.ports.cache.as_ref(), COURSE_LIST_CACHE_KEY).await;
        Ok(())
    }
}

#[async_trait]
impl ReviewQuery for ReviewService {
    async fn list_reviews(&self, course_id: Uuid) -> Result<Vec<Review>, Error> {
        Ok(self.ports.reviews.list(course_id).await?)
    }

    async fn get_review(&self, course_id: Uuid, review_id: Uuid) -> Result<Review, Error> {
        self.require_review(course_id, review_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockCourseRepository, MockKeyValueCache, MockReviewRepository, MockUserRepository,
    };
    use crate::domain::{ErrorCode, Rating, User};
    use crate::test_support::{MutableClock, fixed_now, sample_course, sample_instructor, sample_user};
    use rstest::rstest;

    struct Mocks {
        reviews: MockReviewRepository,
        courses: MockCourseRepository,
        users: MockUserRepository,
        cache: MockKeyValueCache,
    }

    impl Mocks {
        fn new(actor: &User) -> Self {
            let actor = actor.clone();
            let mut users = MockUserRepository::new();
            users
                .expect_find_by_id()
                .returning(move |_| Ok(Some(actor.clone())));
            Self {
                reviews: MockReviewRepository::new(),
                courses: MockCourseRepository::new(),
                users,
                cache: MockKeyValueCache::new(),
            }
        }

        fn into_service(self) -> ReviewService {
            ReviewService::new(ReviewPorts {
                reviews: Arc::new(self.reviews),
                courses: Arc::new(self.courses),
                users: Arc::new(self.users),
                cache: Arc::new(self.cache),
                clock: Arc::new(MutableClock::default()),
            })
        }
    }

    fn request(rating: i64) -> ReviewRequest {
        ReviewRequest {
            rating,
            comment: "Clear and well paced.".to_owned(),
        }
    }

    fn review_by(author: &User, course_id: Uuid) -> Review {
        Review {
            id: Uuid::new_v4(),
            course_id,
            user_id: author.id.clone(),
            username: author.username.to_string(),
            rating: Rating::new(4).expect("rating"),
            comment: String::new(),
            created_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn student_reviews_course_and_listing_is_invalidated() {
        let owner = sample_instructor("ida");
        let student = sample_user("sam");
        let course = sample_course(&owner, "Rust", 100);
        let course_id = course.id;

        let mut mocks = Mocks::new(&student);
        mocks
            .courses
            .expect_find_course()
            .return_once(move |_| Ok(Some(course)));
        mocks.reviews.expect_create().times(1).return_once(|_| Ok(()));
        mocks
            .cache
            .expect_delete()
            .withf(|key| key == COURSE_LIST_CACHE_KEY)
            .times(1)
            .return_once(|_| Ok(()));

        let review = mocks
            .into_service()
            .create_review(&student.id, course_id, request(5))
            .await
            .expect("created");
        assert_eq!(review.username, "sam");
        assert_eq!(review.rating.value(), 5);
    }

    #[tokio::test]
    async fn instructors_cannot_review_own_course() {
        let owner = sample_instructor("ida");
        let course = sample_course(&owner, "Rust", 100);
        let course_id = course.id;
        let mut mocks = Mocks::new(&owner);
        mocks
            .courses
            .expect_find_course()
            .return_once(move |_| Ok(Some(course)));

        let err = mocks
            .into_service()
            .create_review(&owner.id, course_id, request(5))
            .await
            .expect_err("own course");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Instructors cannot write reviews for their own courses.");
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[tokio::test]
    async fn rating_must_be_in_range(#[case] rating: i64) {
        let owner = sample_instructor("ida");
        let student = sample_user("sam");
        let course = sample_course(&owner, "Rust", 100);
        let course_id = course.id;
        let mut mocks = Mocks::new(&student);
        mocks
            .courses
            .expect_find_course()
            .return_once(move |_| Ok(Some(course)));

        let err = mocks
            .into_service()
            .create_review(&student.id, course_id, request(rating))
            .await
            .expect_err("out of range");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Rating must be between 1 and 5.");
    }

    #[tokio::test]
    async fn only_author_may_edit() {
        let author = sample_user("sam");
        let other = sample_user("max");
        let course_id = Uuid::new_v4();
        let review = review_by(&author, course_id);
        let review_id = review.id;
        let mut mocks = Mocks::new(&other);
        mocks
            .reviews
            .expect_find()
            .return_once(move |_, _| Ok(Some(review)));

        let err = mocks
            .into_service()
            .update_review(&other.id, course_id, review_id, request(2))
            .await
            .expect_err("not author");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn author_deletes_review() {
        let author = sample_user("sam");
        let course_id = Uuid::new_v4();
        let review = review_by(&author, course_id);
        let review_id = review.id;
        let mut mocks = Mocks::new(&author);
        mocks
            .reviews
            .expect_find()
            .return_once(move |_, _| Ok(Some(review)));
        mocks.reviews.expect_delete().return_once(|_, _| Ok(true));
        mocks.cache.expect_delete().return_once(|_| Ok(()));

        mocks
            .into_service()
            .delete_review(&author.id, course_id, review_id)
            .await
            .expect("deleted");
    }
}
