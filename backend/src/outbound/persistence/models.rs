//! Internal Diesel row structs and their conversions to domain types.
//!
//! These types never leave the persistence layer. Conversions that can fail
//! (a row violating a domain invariant) return the reason as a `String`, which
//! callers fold into their repository's query error.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    AccountBalance, Category, Coupon, DiscountPercentage, EmailAddress, Lesson, Money, Order,
    Rating, Review, Role, Tag, User, UserId, Username,
};

use super::schema::{
    account_balances, categories, coupons, courses, enrollments, lessons, orders, reviews, tags,
    users,
};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub is_admin: bool,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_owned(),
            is_verified: user.is_verified,
            is_admin: user.is_admin,
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: Username::new(row.username).map_err(|err| err.to_string())?,
            email: EmailAddress::new(row.email).map_err(|err| err.to_string())?,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role).map_err(|err| err.to_string())?,
            is_verified: row.is_verified,
            is_admin: row.is_admin,
            bio: row.bio,
            profile_picture: row.profile_picture,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = account_balances)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BalanceRow {
    pub user_id: Uuid,
    pub balance_cents: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<BalanceRow> for AccountBalance {
    fn from(row: BalanceRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            balance: Money::from_cents(row.balance_cents),
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
            created_at: category.created_at,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            parent_id: row.parent_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub instructor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Columns replaced by a course update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CourseChangeset<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrollmentRow {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub progress: f64,
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Lessons and reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LessonRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub video: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Lesson> for LessonRow {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title.clone(),
            video: lesson.video.clone(),
            content: lesson.content.clone(),
            created_at: lesson.created_at,
        }
    }
}

impl From<LessonRow> for Lesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            video: row.video,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            course_id: review.course_id,
            user_id: *review.user_id.as_uuid(),
            rating: i16::from(review.rating.value()),
            comment: review.comment.clone(),
            created_at: review.created_at,
        }
    }
}

/// Build a review from its row and the author's username.
pub(crate) fn review_from_row(row: ReviewRow, username: String) -> Result<Review, String> {
    Ok(Review {
        id: row.id,
        course_id: row.course_id,
        user_id: UserId::from_uuid(row.user_id),
        username,
        rating: Rating::new(i64::from(row.rating)).map_err(|err| err.message)?,
        comment: row.comment,
        created_at: row.created_at,
    })
}

// ---------------------------------------------------------------------------
// Coupons and orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponRow {
    pub id: Uuid,
    pub code: String,
    pub discount_percentage: i16,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub min_order_value_cents: Option<i64>,
    pub creator_id: Uuid,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Coupon> for CouponRow {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code.clone(),
            discount_percentage: i16::from(coupon.discount.value()),
            valid_until: coupon.valid_until,
            is_active: coupon.is_active,
            min_order_value_cents: coupon.min_order_value.map(Money::cents),
            creator_id: *coupon.creator_id.as_uuid(),
            notified: coupon.notified,
            created_at: coupon.created_at,
        }
    }
}

/// Build a coupon from its row and the ids of the courses it is scoped to.
pub(crate) fn coupon_from_row(row: CouponRow, course_ids: Vec<Uuid>) -> Result<Coupon, String> {
    let discount = u8::try_from(row.discount_percentage)
        .map_err(|err| err.to_string())
        .and_then(|value| DiscountPercentage::new(value).map_err(|err| err.to_string()))?;
    Ok(Coupon {
        id: row.id,
        code: row.code,
        discount,
        valid_until: row.valid_until,
        is_active: row.is_active,
        min_order_value: row.min_order_value_cents.map(Money::from_cents),
        course_ids,
        creator_id: UserId::from_uuid(row.creator_id),
        notified: row.notified,
        created_at: row.created_at,
    })
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub coupon_code: Option<String>,
    pub amount_cents: i64,
    pub tax_amount_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            user_id: *order.user_id.as_uuid(),
            course_id: order.course_id,
            coupon_code: order.coupon_code.clone(),
            amount_cents: order.amount.cents(),
            tax_amount_cents: order.tax_amount.cents(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Build an order from its row and the purchased course's title.
pub(crate) fn order_from_row(row: OrderRow, course_title: String) -> Order {
    Order {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        course_id: row.course_id,
        course_title,
        coupon_code: row.coupon_code,
        amount: Money::from_cents(row.amount_cents),
        tax_amount: Money::from_cents(row.tax_amount_cents),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_now, sample_instructor};
    use rstest::rstest;

    #[rstest]
    fn user_rows_round_trip_role_and_identity() {
        let user = sample_instructor("ida");
        let row = UserRow::from(&user);
        assert_eq!(row.role, "instructor");
        assert_eq!(User::try_from(row).expect("valid row"), user);
    }

    #[rstest]
    fn unknown_role_is_reported() {
        let mut row = UserRow::from(&sample_instructor("ida"));
        row.role = "admin".to_owned();
        let err = User::try_from(row).expect_err("bad role");
        assert!(err.contains("admin"));
    }

    #[rstest]
    #[case(0)]
    #[case(101)]
    #[case(-3)]
    fn out_of_range_discount_is_reported(#[case] stored: i16) {
        let row = CouponRow {
            id: Uuid::new_v4(),
            code: "X".to_owned(),
            discount_percentage: stored,
            valid_until: fixed_now(),
            is_active: true,
            min_order_value_cents: None,
            creator_id: Uuid::new_v4(),
            notified: false,
            created_at: fixed_now(),
        };
        assert!(coupon_from_row(row, Vec::new()).is_err());
    }

    #[rstest]
    fn review_rating_is_validated() {
        let row = ReviewRow {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: 6,
            comment: String::new(),
            created_at: fixed_now(),
        };
        assert!(review_from_row(row, "sam".to_owned()).is_err());
    }
}
