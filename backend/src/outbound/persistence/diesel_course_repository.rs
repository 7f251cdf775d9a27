//! PostgreSQL-backed courses and enrollments.
//!
//! Course rows are hydrated in batches: one query each for instructors,
//! categories, ordered tag links, and rating aggregates, whatever the number
//! of courses being returned.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CourseRepository, CourseRepositoryError, CourseWrite};
use crate::domain::{
    Category, Course, Enrollment, Money, PopularCourse, RatingSummary, Tag, UserId,
};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error, touched};
use super::models::{CategoryRow, CourseChangeset, CourseRow, EnrollmentRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{
    categories, coupon_courses, coupons, course_tags, courses, enrollments, reviews, tags, users,
};

/// Diesel-backed [`CourseRepository`].
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    map_basic_pool_error(error, CourseRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> CourseRepositoryError {
    map_basic_diesel_error(
        error,
        CourseRepositoryError::query,
        CourseRepositoryError::connection,
    )
}

fn course_row(course: &CourseWrite) -> CourseRow {
    CourseRow {
        id: course.id,
        title: course.title.clone(),
        description: course.description.clone(),
        price_cents: course.price.cents(),
        instructor_id: *course.instructor_id.as_uuid(),
        category_id: course.category_id,
        created_at: course.created_at,
    }
}

/// Deactivate coupons whose only scoped course is `course_id`.
async fn deactivate_sole_scope_coupons(
    conn: &mut AsyncPgConnection,
    course_id: Uuid,
) -> Result<(), DieselError> {
    let scoped: Vec<Uuid> = coupon_courses::table
        .filter(coupon_courses::course_id.eq(course_id))
        .select(coupon_courses::coupon_id)
        .load(conn)
        .await?;
    if scoped.is_empty() {
        return Ok(());
    }
    let shared: HashSet<Uuid> = coupon_courses::table
        .filter(coupon_courses::coupon_id.eq_any(&scoped))
        .filter(coupon_courses::course_id.ne(course_id))
        .select(coupon_courses::coupon_id)
        .load::<Uuid>(conn)
        .await?
        .into_iter()
        .collect();
    let sole: Vec<Uuid> = scoped
        .into_iter()
        .filter(|coupon_id| !shared.contains(coupon_id))
        .collect();
    if sole.is_empty() {
        return Ok(());
    }
    diesel::update(coupons::table.filter(coupons::id.eq_any(&sole)))
        .set(coupons::is_active.eq(false))
        .execute(conn)
        .await?;
    Ok(())
}

/// Replace the tag links of `course`, keeping the given order.
async fn write_tag_links(
    conn: &mut AsyncPgConnection,
    course: &CourseWrite,
) -> Result<(), DieselError> {
    diesel::delete(course_tags::table.filter(course_tags::course_id.eq(course.id)))
        .execute(conn)
        .await?;
    if course.tag_ids.is_empty() {
        return Ok(());
    }
    let links: Vec<_> = course
        .tag_ids
        .iter()
        .zip(0_i32..)
        .map(|(tag_id, position)| {
            (
                course_tags::course_id.eq(course.id),
                course_tags::tag_id.eq(*tag_id),
                course_tags::position.eq(position),
            )
        })
        .collect();
    diesel::insert_into(course_tags::table)
        .values(links)
        .execute(conn)
        .await?;
    Ok(())
}

/// Attach instructor, category, tags, and ratings to course rows.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<CourseRow>,
) -> Result<Vec<Course>, DieselError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let instructor_ids: Vec<Uuid> = rows.iter().map(|row| row.instructor_id).collect();
    let category_ids: Vec<Uuid> = rows.iter().filter_map(|row| row.category_id).collect();

    let usernames: HashMap<Uuid, String> = users::table
        .filter(users::id.eq_any(&instructor_ids))
        .select((users::id, users::username))
        .load::<(Uuid, String)>(conn)
        .await?
        .into_iter()
        .collect();

    let mut category_by_id: HashMap<Uuid, Category> = HashMap::new();
    if !category_ids.is_empty() {
        let loaded: Vec<CategoryRow> = categories::table
            .filter(categories::id.eq_any(&category_ids))
            .select(CategoryRow::as_select())
            .load(conn)
            .await?;
        category_by_id.extend(loaded.into_iter().map(|row| (row.id, Category::from(row))));
    }

    let mut tags_by_course: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    let links: Vec<(Uuid, TagRow)> = course_tags::table
        .inner_join(tags::table)
        .filter(course_tags::course_id.eq_any(&ids))
        .order((course_tags::course_id, course_tags::position))
        .select((course_tags::course_id, TagRow::as_select()))
        .load(conn)
        .await?;
    for (course_id, tag) in links {
        tags_by_course.entry(course_id).or_default().push(tag.into());
    }

    let ratings: HashMap<Uuid, RatingSummary> = reviews::table
        .filter(reviews::course_id.eq_any(&ids))
        .group_by(reviews::course_id)
        .select((
            reviews::course_id,
            diesel::dsl::sum(reviews::rating),
            diesel::dsl::count(reviews::id),
        ))
        .load::<(Uuid, Option<i64>, i64)>(conn)
        .await?
        .into_iter()
        .map(|(course_id, total, count)| {
            (
                course_id,
                RatingSummary {
                    total: total.unwrap_or_default(),
                    count,
                },
            )
        })
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| Course {
            id: row.id,
            instructor_username: usernames.get(&row.instructor_id).cloned().unwrap_or_default(),
            category: row
                .category_id
                .and_then(|id| category_by_id.get(&id))
                .cloned(),
            tags: tags_by_course.remove(&row.id).unwrap_or_default(),
            rating: ratings.get(&row.id).copied().unwrap_or_default(),
            title: row.title,
            description: row.description,
            price: Money::from_cents(row.price_cents),
            instructor_id: UserId::from_uuid(row.instructor_id),
            created_at: row.created_at,
        })
        .collect())
}

/// Hydrate enrollment rows joined with their course rows.
async fn hydrate_enrollments(
    conn: &mut AsyncPgConnection,
    rows: Vec<(EnrollmentRow, CourseRow)>,
) -> Result<Vec<Enrollment>, DieselError> {
    let (enrollment_rows, course_rows): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let courses = hydrate(conn, course_rows).await?;
    Ok(enrollment_rows
        .into_iter()
        .zip(courses)
        .map(|(row, course)| Enrollment {
            user_id: UserId::from_uuid(row.user_id),
            course,
            enrolled_at: row.enrolled_at,
            progress: row.progress,
            completed: row.completed,
        })
        .collect())
}

impl DieselCourseRepository {
    async fn load_where<F>(&self, query: F) -> Result<Vec<Course>, CourseRepositoryError>
    where
        F: FnOnce(courses::table) -> courses::BoxedQuery<'static, diesel::pg::Pg> + Send,
    {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = query(courses::table)
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await.map_err(map_diesel_error)
    }
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn list_courses(&self) -> Result<Vec<Course>, CourseRepositoryError> {
        self.load_where(|table| {
            table
                .order((courses::created_at.desc(), courses::id.desc()))
                .into_boxed()
        })
        .await
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, CourseRepositoryError> {
        let found = self
            .load_where(move |table| table.filter(courses::id.eq(id)).into_boxed())
            .await?;
        Ok(found.into_iter().next())
    }

    async fn find_course_by_title(
        &self,
        title: &str,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let title = title.to_owned();
        let found = self
            .load_where(move |table| {
                table
                    .filter(courses::title.eq(title))
                    .order((courses::created_at, courses::id))
                    .limit(1)
                    .into_boxed()
            })
            .await?;
        Ok(found.into_iter().next())
    }

    async fn create_course(&self, course: &CourseWrite) -> Result<(), CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = course_row(course);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(courses::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                write_tag_links(conn, course).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update_course(&self, course: &CourseWrite) -> Result<bool, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let changes = CourseChangeset {
                    title: &course.title,
                    description: &course.description,
                    price_cents: course.price.cents(),
                    category_id: course.category_id,
                };
                let updated = diesel::update(courses::table.find(course.id))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                if !touched(updated) {
                    return Ok(false);
                }
                write_tag_links(conn, course).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete_course(
        &self,
        id: Uuid,
    ) -> Result<Option<Vec<UserId>>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let enrolled: Vec<Uuid> = enrollments::table
                    .filter(enrollments::course_id.eq(id))
                    .select(enrollments::user_id)
                    .load(conn)
                    .await?;
                deactivate_sole_scope_coupons(conn, id).await?;
                // Lessons, reviews, enrollments, orders, and links cascade.
                let deleted = diesel::delete(courses::table.find(id)).execute(conn).await?;
                Ok(touched(deleted)
                    .then(|| enrolled.into_iter().map(UserId::from_uuid).collect::<Vec<_>>()))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn popular_courses(&self) -> Result<Vec<PopularCourse>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let counts: HashMap<Uuid, i64> = enrollments::table
            .group_by(enrollments::course_id)
            .select((enrollments::course_id, diesel::dsl::count(enrollments::user_id)))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();
        let courses = hydrate(&mut conn, rows).await.map_err(map_diesel_error)?;
        Ok(courses
            .into_iter()
            .map(|course| PopularCourse {
                enrollment_count: counts.get(&course.id).copied().unwrap_or_default(),
                course,
            })
            .collect())
    }

    async fn list_enrollments(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(EnrollmentRow, CourseRow)> = enrollments::table
            .inner_join(courses::table)
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .order((enrollments::enrolled_at.desc(), enrollments::course_id.desc()))
            .select((EnrollmentRow::as_select(), CourseRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate_enrollments(&mut conn, rows)
            .await
            .map_err(map_diesel_error)
    }

    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(EnrollmentRow, CourseRow)> = enrollments::table
            .inner_join(courses::table)
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .filter(enrollments::course_id.eq(course_id))
            .select((EnrollmentRow::as_select(), CourseRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let found = hydrate_enrollments(&mut conn, rows)
            .await
            .map_err(map_diesel_error)?;
        Ok(found.into_iter().next())
    }
}
