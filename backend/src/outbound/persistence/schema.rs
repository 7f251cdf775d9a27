//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Monetary
//! columns hold integer cents.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// `student` or `instructor`.
        role -> Varchar,
        is_verified -> Bool,
        is_admin -> Bool,
        bio -> Nullable<Text>,
        profile_picture -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored-value balance, one row per user.
    account_balances (user_id) {
        user_id -> Uuid,
        balance_cents -> Int8,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        parent_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    courses (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        price_cents -> Int8,
        instructor_id -> Uuid,
        category_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tag links; `position` keeps the order the instructor gave.
    course_tags (course_id, tag_id) {
        course_id -> Uuid,
        tag_id -> Uuid,
        position -> Int4,
    }
}

diesel::table! {
    lessons (id) {
        id -> Uuid,
        course_id -> Uuid,
        title -> Varchar,
        video -> Nullable<Text>,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reviews (id) {
        id -> Uuid,
        course_id -> Uuid,
        user_id -> Uuid,
        rating -> Int2,
        comment -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    enrollments (user_id, course_id) {
        user_id -> Uuid,
        course_id -> Uuid,
        enrolled_at -> Timestamptz,
        progress -> Float8,
        completed -> Bool,
    }
}

diesel::table! {
    coupons (id) {
        id -> Uuid,
        code -> Varchar,
        discount_percentage -> Int2,
        valid_until -> Timestamptz,
        is_active -> Bool,
        min_order_value_cents -> Nullable<Int8>,
        creator_id -> Uuid,
        /// Whether the expiry reminder has gone out.
        notified -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    coupon_courses (coupon_id, course_id) {
        coupon_id -> Uuid,
        course_id -> Uuid,
    }
}

diesel::table! {
    orders (id) {
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        coupon_code -> Nullable<Varchar>,
        amount_cents -> Int8,
        tax_amount_cents -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(account_balances -> users (user_id));
diesel::joinable!(courses -> users (instructor_id));
diesel::joinable!(courses -> categories (category_id));
diesel::joinable!(course_tags -> courses (course_id));
diesel::joinable!(course_tags -> tags (tag_id));
diesel::joinable!(lessons -> courses (course_id));
diesel::joinable!(reviews -> courses (course_id));
diesel::joinable!(reviews -> users (user_id));
diesel::joinable!(enrollments -> courses (course_id));
diesel::joinable!(coupons -> users (creator_id));
diesel::joinable!(coupon_courses -> coupons (coupon_id));
diesel::joinable!(coupon_courses -> courses (course_id));
diesel::joinable!(orders -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    account_balances,
    categories,
    tags,
    courses,
    course_tags,
    lessons,
    reviews,
    enrollments,
    coupons,
    coupon_courses,
    orders,
);
