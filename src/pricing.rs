//! Wholesale pricing policy
//!
//! Per-line unit pricing: the normal retail price below the bulk threshold,
//! a discounted wholesale price at or above it. Products may carry an
//! explicit bulk price; otherwise a rounded fallback is derived from the
//! retail price.
//!
//! Uses rust_decimal for the arithmetic so stored totals stay stable.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Minimum line quantity at which the bulk price applies (inclusive)
pub const BULK_MIN_QTY: i32 = 3;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Fallback bulk price when a product has no explicit one:
/// `ceil((price - 100) / 100) * 100`, a round-number wholesale price below
/// retail. The formula is part of the order contract; totals depend on its
/// exact output.
pub fn bulk_fallback_price(price: f64) -> f64 {
    let hundred = Decimal::from(100);
    let stepped = ((to_decimal(price) - hundred) / hundred).ceil() * hundred;
    to_f64(stepped)
}

/// One priced order line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    /// Effective per-unit price charged
    pub unit_price: f64,
    /// quantity x unit_price
    pub line_total: f64,
    /// quantity x normal price, regardless of bulk
    pub normal_total: f64,
    /// normal_total - line_total when bulk applied, else 0
    pub saving: f64,
}

/// Price a single line. Pure function of its inputs; no error conditions.
pub fn price_line(price: f64, price_bulk: Option<f64>, quantity: i32) -> PricedLine {
    let normal = to_decimal(price);
    let bulk = match price_bulk {
        Some(p) => to_decimal(p),
        None => to_decimal(bulk_fallback_price(price)),
    };
    let qty = Decimal::from(quantity);

    let uses_bulk = quantity >= BULK_MIN_QTY;
    let unit = if uses_bulk { bulk } else { normal };
    let line_total = unit * qty;
    let normal_total = normal * qty;
    let saving = if uses_bulk {
        (normal - bulk) * qty
    } else {
        Decimal::ZERO
    };

    PricedLine {
        unit_price: to_f64(unit),
        line_total: to_f64(line_total),
        normal_total: to_f64(normal_total),
        saving: to_f64(saving),
    }
}

/// Order-level totals folded from its priced lines
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quote {
    /// Sum of normal-price line totals
    pub subtotal: f64,
    /// Sum of per-line savings
    pub discount: f64,
    /// Sum of effective-price line totals; always subtotal - discount
    pub total: f64,
}

/// Fold priced lines into order totals
pub fn quote_lines(lines: &[PricedLine]) -> Quote {
    let mut subtotal = Decimal::ZERO;
    let mut discount = Decimal::ZERO;
    let mut total = Decimal::ZERO;

    for line in lines {
        subtotal += to_decimal(line.normal_total);
        discount += to_decimal(line.saving);
        total += to_decimal(line.line_total);
    }

    Quote {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        total: to_f64(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_fallback_price() {
        // ceil((1200 - 100) / 100) * 100 = 1100
        assert_eq!(bulk_fallback_price(1200.0), 1100.0);
        // non-multiples round up to the next hundred
        assert_eq!(bulk_fallback_price(1250.0), 1200.0);
        assert_eq!(bulk_fallback_price(1001.0), 1000.0);
        assert_eq!(bulk_fallback_price(150.0), 100.0);
    }

    #[test]
    fn test_threshold_boundary() {
        // quantity 2 -> normal price, quantity 3 -> bulk price
        let below = price_line(1200.0, None, 2);
        assert_eq!(below.unit_price, 1200.0);
        assert_eq!(below.line_total, 2400.0);
        assert_eq!(below.saving, 0.0);

        let at = price_line(1200.0, None, 3);
        assert_eq!(at.unit_price, 1100.0);
        assert_eq!(at.line_total, 3300.0);
        assert_eq!(at.normal_total, 3600.0);
        assert_eq!(at.saving, 300.0);
    }

    #[test]
    fn test_explicit_bulk_price_wins() {
        let line = price_line(1200.0, Some(1000.0), 3);
        assert_eq!(line.unit_price, 1000.0);
        assert_eq!(line.line_total, 3000.0);
        assert_eq!(line.saving, 600.0);

        // below threshold the override is ignored
        let line = price_line(1200.0, Some(1000.0), 1);
        assert_eq!(line.unit_price, 1200.0);
        assert_eq!(line.saving, 0.0);
    }

    #[test]
    fn test_quote_invariants() {
        let lines = [
            price_line(1200.0, None, 3),
            price_line(850.0, Some(700.0), 5),
            price_line(79.5, None, 1),
        ];
        let quote = quote_lines(&lines);

        let subtotal: f64 = lines.iter().map(|l| l.normal_total).sum();
        let total: f64 = lines.iter().map(|l| l.line_total).sum();
        assert_eq!(quote.subtotal, subtotal);
        assert_eq!(quote.total, total);
        // total == subtotal - discount, exactly
        assert_eq!(
            to_decimal(quote.total),
            to_decimal(quote.subtotal) - to_decimal(quote.discount)
        );
    }

    #[test]
    fn test_three_unit_order_totals() {
        // 3 units at price 1200, no override: total 3300, discount 300
        let quote = quote_lines(&[price_line(1200.0, None, 3)]);
        assert_eq!(
            quote,
            Quote {
                subtotal: 3600.0,
                discount: 300.0,
                total: 3300.0
            }
        );
    }

    #[test]
    fn test_fractional_prices_round_half_up() {
        let line = price_line(10.555, Some(9.995), 3);
        assert_eq!(line.unit_price, 10.0); // 9.995 rounds half-up
        assert_eq!(line.line_total, 29.99); // 9.995 * 3 = 29.985
    }
}
