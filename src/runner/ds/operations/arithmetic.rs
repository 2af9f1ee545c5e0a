//! Numeric operators with an integer fast path.
//!
//! Every fast path computes the exact integer result and re-canonicalizes it through
//! `JsNumberType::from_i64`, which rounds past 2^53 the same way a double operation would, so the
//! result never differs from the pure double computation.

use crate::runner::ds::operations::type_conversion::{number_to_int32, number_to_uint32};
use crate::runner::ds::value::JsNumberType;

pub fn add(a: &JsNumberType, b: &JsNumberType) -> JsNumberType {
    if let (JsNumberType::Integer(x), JsNumberType::Integer(y)) = (a, b) {
        if let Some(r) = x.checked_add(*y) {
            return JsNumberType::from_i64(r);
        }
    }
    JsNumberType::from_f64(a.to_f64() + b.to_f64())
}

pub fn subtract(a: &JsNumberType, b: &JsNumberType) -> JsNumberType {
    if let (JsNumberType::Integer(x), JsNumberType::Integer(y)) = (a, b) {
        if let Some(r) = x.checked_sub(*y) {
            return JsNumberType::from_i64(r);
        }
    }
    JsNumberType::from_f64(a.to_f64() - b.to_f64())
}

pub fn multiply(a: &JsNumberType, b: &JsNumberType) -> JsNumberType {
    if let (JsNumberType::Integer(x), JsNumberType::Integer(y)) = (a, b) {
        if let Some(r) = x.checked_mul(*y) {
            // 0 * -n is -0
            if r == 0 && (*x < 0 || *y < 0) {
                return JsNumberType::Float(-0.0);
            }
            return JsNumberType::from_i64(r);
        }
    }
    JsNumberType::from_f64(a.to_f64() * b.to_f64())
}

pub fn divide(a: &JsNumberType, b: &JsNumberType) -> JsNumberType {
    JsNumberType::from_f64(a.to_f64() / b.to_f64())
}

pub fn remainder(a: &JsNumberType, b: &JsNumberType) -> JsNumberType {
    if let (JsNumberType::Integer(x), JsNumberType::Integer(y)) = (a, b) {
        if *y != 0 {
            let r = x % y;
            if r == 0 && *x < 0 {
                return JsNumberType::Float(-0.0);
            }
            return JsNumberType::Integer(r);
        }
    }
    JsNumberType::from_f64(a.to_f64() % b.to_f64())
}

pub fn negate(a: &JsNumberType) -> JsNumberType {
    match a {
        JsNumberType::Integer(0) => JsNumberType::Float(-0.0),
        JsNumberType::Integer(i) => JsNumberType::Integer(-i),
        _ => JsNumberType::from_f64(-a.to_f64()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
    LeftShift,
    SignedRightShift,
    UnsignedRightShift,
}

pub fn bitwise(op: BitwiseOp, a: &JsNumberType, b: &JsNumberType) -> JsNumberType {
    let x = number_to_int32(a);
    let shift = number_to_uint32(b) & 0x1F;
    let r: i64 = match op {
        BitwiseOp::And => (x & number_to_int32(b)) as i64,
        BitwiseOp::Or => (x | number_to_int32(b)) as i64,
        BitwiseOp::Xor => (x ^ number_to_int32(b)) as i64,
        BitwiseOp::LeftShift => x.wrapping_shl(shift) as i64,
        BitwiseOp::SignedRightShift => (x >> shift) as i64,
        BitwiseOp::UnsignedRightShift => (number_to_uint32(a) >> shift) as i64,
    };
    JsNumberType::Integer(r)
}

pub fn bitwise_not(a: &JsNumberType) -> JsNumberType {
    JsNumberType::Integer(!number_to_int32(a) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn n(v: f64) -> JsNumberType {
        JsNumberType::from_f64(v)
    }

    #[test]
    fn signed_zero_results() {
        assert_eq!(multiply(&n(-3.0), &n(0.0)), n(-0.0));
        assert_eq!(remainder(&n(-4.0), &n(2.0)), n(-0.0));
        assert_eq!(negate(&n(0.0)), n(-0.0));
        assert_eq!(add(&n(-0.0), &n(-0.0)), n(-0.0));
        assert_eq!(add(&n(-0.0), &n(0.0)), n(0.0));
    }

    #[test]
    fn overflow_promotes_to_double() {
        let big = JsNumberType::Integer(9_007_199_254_740_992);
        assert_eq!(add(&big, &n(1.0)), n(9_007_199_254_740_992.0 + 1.0));
        assert_eq!(multiply(&big, &big), n(9_007_199_254_740_992.0 * 9_007_199_254_740_992.0));
    }

    #[test]
    fn shifts_mask_the_count() {
        assert_eq!(bitwise(BitwiseOp::LeftShift, &n(1.0), &n(33.0)), n(2.0));
        assert_eq!(bitwise(BitwiseOp::UnsignedRightShift, &n(-1.0), &n(0.0)), n(4294967295.0));
        assert_eq!(bitwise(BitwiseOp::SignedRightShift, &n(-8.0), &n(1.0)), n(-4.0));
        assert_eq!(bitwise_not(&n(5.0)), n(-6.0));
    }

    proptest! {
        #[test]
        fn integer_path_matches_double_path(
            x in -(1i64 << 53)..(1i64 << 53),
            y in -(1i64 << 53)..(1i64 << 53),
        ) {
            let (a, b) = (JsNumberType::Integer(x), JsNumberType::Integer(y));
            let (fa, fb) = (x as f64, y as f64);
            prop_assert_eq!(add(&a, &b), n(fa + fb));
            prop_assert_eq!(subtract(&a, &b), n(fa - fb));
            prop_assert_eq!(multiply(&a, &b), n(fa * fb));
            prop_assert_eq!(remainder(&a, &b), n(fa % fb));
        }
    }
}
