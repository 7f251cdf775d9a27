//! Order price arithmetic.
//!
//! Discount and tax are each rounded to the cent with banker's rounding
//! (half to even) before being applied.

use super::{Money, Percentage};

/// Tax rate applied when configuration does not override it.
pub const DEFAULT_TAX_PERCENTAGE: u8 = 5;

/// Result of pricing a course purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Price after the coupon discount, before tax.
    pub final_price: Money,
    /// Tax charged on the discounted price.
    pub tax_amount: Money,
    /// Amount debited from the buyer's balance.
    pub total_amount: Money,
}

/// Arithmetic overflow while pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("price calculation overflowed")]
pub struct PricingOverflow;

/// Compute the discounted price, tax, and total for a purchase.
///
/// # Examples
/// ```
/// use edunexus::domain::{Money, Percentage, calculate_final_price};
///
/// let breakdown = calculate_final_price(
///     Money::from_cents(10_000),
///     Percentage::new(10).expect("valid"),
///     Percentage::new(5).expect("valid"),
/// )
/// .expect("no overflow");
/// assert_eq!(breakdown.final_price, Money::from_cents(9_000));
/// assert_eq!(breakdown.tax_amount, Money::from_cents(450));
/// assert_eq!(breakdown.total_amount, Money::from_cents(9_450));
/// ```
pub fn calculate_final_price(
    base_price: Money,
    discount_percentage: Percentage,
    tax_percentage: Percentage,
) -> Result<PriceBreakdown, PricingOverflow> {
    let discount = percent_of(base_price, discount_percentage)?;
    let final_price = base_price.checked_sub(discount).ok_or(PricingOverflow)?;
    let tax_amount = percent_of(final_price, tax_percentage)?;
    let total_amount = final_price.checked_add(tax_amount).ok_or(PricingOverflow)?;
    Ok(PriceBreakdown {
        final_price,
        tax_amount,
        total_amount,
    })
}

/// `amount * percentage / 100`, rounded half to even.
fn percent_of(amount: Money, percentage: Percentage) -> Result<Money, PricingOverflow> {
    let numerator = i128::from(amount.cents()) * i128::from(percentage.value());
    let rounded = divide_half_even(numerator, 100);
    i64::try_from(rounded)
        .map(Money::from_cents)
        .map_err(|_| PricingOverflow)
}

fn divide_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    let twice = remainder * 2;
    if twice > denominator || (twice == denominator && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pct(value: u8) -> Percentage {
        Percentage::new(value).expect("valid percentage")
    }

    #[rstest]
    #[case(10_000, 0, 5, 10_000, 500, 10_500)]
    #[case(10_000, 10, 5, 9_000, 450, 9_450)]
    #[case(10_000, 100, 5, 0, 0, 0)]
    #[case(4_999, 20, 5, 3_999, 200, 4_199)]
    #[case(0, 50, 5, 0, 0, 0)]
    #[case(1_999, 0, 0, 1_999, 0, 1_999)]
    fn computes_breakdown(
        #[case] base: i64,
        #[case] discount: u8,
        #[case] tax: u8,
        #[case] final_price: i64,
        #[case] tax_amount: i64,
        #[case] total: i64,
    ) {
        let breakdown =
            calculate_final_price(Money::from_cents(base), pct(discount), pct(tax)).expect("price");
        assert_eq!(breakdown.final_price, Money::from_cents(final_price));
        assert_eq!(breakdown.tax_amount, Money::from_cents(tax_amount));
        assert_eq!(breakdown.total_amount, Money::from_cents(total));
    }

    #[rstest]
    #[case(250, 2)]
    #[case(350, 4)]
    #[case(251, 3)]
    #[case(249, 2)]
    #[case(-250, -2)]
    fn rounds_half_to_even(#[case] numerator: i128, #[case] expected: i128) {
        assert_eq!(divide_half_even(numerator, 100), expected);
    }

    #[test]
    fn discount_of_fifty_cents_rounds_to_even_cent() {
        // 0.50 * 5% = 0.025 -> 0.02; 0.30 * 5% = 0.015 -> 0.02
        assert_eq!(percent_of(Money::from_cents(50), pct(5)), Ok(Money::from_cents(2)));
        assert_eq!(percent_of(Money::from_cents(30), pct(5)), Ok(Money::from_cents(2)));
    }

    #[test]
    fn reports_overflow() {
        let result = calculate_final_price(Money::from_cents(i64::MAX), pct(0), pct(100));
        assert_eq!(result, Err(PricingOverflow));
    }
}
