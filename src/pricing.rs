use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Delivery is free from this subtotal upwards.
pub fn free_delivery_threshold() -> Decimal {
    Decimal::from(250)
}

/// Flat delivery rate below the free threshold.
pub fn flat_delivery_rate() -> Decimal {
    Decimal::from(15)
}

pub fn delivery_fee(subtotal: Decimal) -> Decimal {
    if subtotal >= free_delivery_threshold() {
        Decimal::ZERO
    } else {
        flat_delivery_rate()
    }
}

pub fn order_total(subtotal: Decimal) -> Decimal {
    subtotal + delivery_fee(subtotal)
}

/// Convert a decimal amount to minor currency units (grosze) for the
/// payment processor.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100)).round().to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn delivery_charged_below_threshold() {
        assert_eq!(delivery_fee(dec("200.00")), dec("15"));
        assert_eq!(order_total(dec("200.00")), dec("215.00"));
    }

    #[test]
    fn delivery_free_at_threshold() {
        assert_eq!(delivery_fee(dec("250.00")), Decimal::ZERO);
        assert_eq!(order_total(dec("300.00")), dec("300.00"));
    }

    #[test]
    fn delivery_free_just_above_threshold() {
        assert_eq!(delivery_fee(dec("250.01")), Decimal::ZERO);
    }

    #[test]
    fn minor_units_round_half_up() {
        assert_eq!(to_minor_units(dec("10.00")), Some(1000));
        assert_eq!(to_minor_units(dec("215.00")), Some(21500));
        assert_eq!(to_minor_units(dec("0.995")), Some(100));
    }
}
