//! Orders and account balances.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Money, PriceBreakdown, UserId};

/// A stored-value balance debited on purchase. Never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    /// Account owner.
    pub user_id: UserId,
    /// Available funds.
    pub balance: Money,
    /// Time of the last change.
    pub updated_at: DateTime<Utc>,
}

impl AccountBalance {
    /// Whether the balance covers `amount`.
    #[must_use]
    pub fn covers(&self, amount: Money) -> bool {
        self.balance >= amount
    }
}

/// A completed course purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Order id.
    pub id: Uuid,
    /// Buyer.
    pub user_id: UserId,
    /// Purchased course.
    pub course_id: Uuid,
    /// Course title at purchase time.
    pub course_title: String,
    /// Coupon applied, if any.
    pub coupon_code: Option<String>,
    /// Price after discount, before tax.
    pub amount: Money,
    /// Tax charged on top of `amount`.
    pub tax_amount: Money,
    /// Time of purchase.
    pub created_at: DateTime<Utc>,
    /// Time of the last change.
    pub updated_at: DateTime<Utc>,
}

/// Everything the repository needs to commit a purchase atomically.
///
/// `total` is debited from the buyer's balance; the order records `amount`
/// and `tax_amount`; an enrollment is created if absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlacement {
    /// Id of the order to create.
    pub order_id: Uuid,
    /// Buyer.
    pub user_id: UserId,
    /// Purchased course.
    pub course_id: Uuid,
    /// Course title at purchase time.
    pub course_title: String,
    /// Coupon applied, if any.
    pub coupon_code: Option<String>,
    /// Price after discount, before tax.
    pub amount: Money,
    /// Tax on `amount`.
    pub tax_amount: Money,
    /// Sum debited from the balance.
    pub total: Money,
    /// Purchase time.
    pub placed_at: DateTime<Utc>,
}

impl OrderPlacement {
    /// Assemble a placement from a price breakdown.
    #[must_use]
    pub fn new(
        user_id: UserId,
        course_id: Uuid,
        course_title: String,
        coupon_code: Option<String>,
        price: PriceBreakdown,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            user_id,
            course_id,
            course_title,
            coupon_code,
            amount: price.final_price,
            tax_amount: price.tax_amount,
            total: price.total_amount,
            placed_at,
        }
    }

    /// The order row this placement produces.
    #[must_use]
    pub fn to_order(&self) -> Order {
        Order {
            id: self.order_id,
            user_id: self.user_id.clone(),
            course_id: self.course_id,
            course_title: self.course_title.clone(),
            coupon_code: self.coupon_code.clone(),
            amount: self.amount,
            tax_amount: self.tax_amount,
            created_at: self.placed_at,
            updated_at: self.placed_at,
        }
    }
}
