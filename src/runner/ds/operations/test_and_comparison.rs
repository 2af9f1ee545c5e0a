use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::ds::operations::type_conversion::{
    primitive_to_number, to_primitive, PreferredType,
};
use crate::runner::plugin::types::EvalContext;

fn number_equals(a: &JsNumberType, b: &JsNumberType) -> bool {
    match (a, b) {
        (JsNumberType::Integer(x), JsNumberType::Integer(y)) => x == y,
        _ => a.to_f64() == b.to_f64(),
    }
}

/// SameValue: like `===` except `NaN` equals itself and `+0` differs from `-0`.
pub fn same_value(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(x), JsValue::Number(y)) => x == y,
        _ => strict_equality_comparison(a, b),
    }
}

/// The `===` operator.
pub fn strict_equality_comparison(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => true,
        (JsValue::Boolean(x), JsValue::Boolean(y)) => x == y,
        (JsValue::String(x), JsValue::String(y)) => x == y,
        (JsValue::Number(x), JsValue::Number(y)) => number_equals(x, y),
        (JsValue::Object(x), JsValue::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// The `==` operator.
///
/// Same-type operands compare like `===`; `null` and `undefined` equal each other only;
/// numbers and strings compare numerically; a boolean is converted to a number first; an object
/// compared with a number or string is converted with `ToPrimitive` and compared again.
pub fn abstract_equality_comparison(
    ctx: &mut EvalContext,
    a: &JsValue,
    b: &JsValue,
) -> Result<bool, JErrorType> {
    Ok(match (a, b) {
        (JsValue::Undefined | JsValue::Null, JsValue::Undefined | JsValue::Null) => true,
        (JsValue::Undefined | JsValue::Null, _) | (_, JsValue::Undefined | JsValue::Null) => false,
        (JsValue::Number(x), JsValue::String(_)) => number_equals(x, &primitive_to_number(b)),
        (JsValue::String(_), JsValue::Number(y)) => number_equals(&primitive_to_number(a), y),
        (JsValue::Boolean(_), _) => {
            let x = JsValue::Number(primitive_to_number(a));
            return abstract_equality_comparison(ctx, &x, b);
        }
        (_, JsValue::Boolean(_)) => {
            let y = JsValue::Number(primitive_to_number(b));
            return abstract_equality_comparison(ctx, a, &y);
        }
        (JsValue::Object(_), JsValue::Number(_) | JsValue::String(_)) => {
            let x = to_primitive(ctx, a, PreferredType::Default)?;
            return abstract_equality_comparison(ctx, &x, b);
        }
        (JsValue::Number(_) | JsValue::String(_), JsValue::Object(_)) => {
            let y = to_primitive(ctx, b, PreferredType::Default)?;
            return abstract_equality_comparison(ctx, a, &y);
        }
        _ => strict_equality_comparison(a, b),
    })
}

/// `x < y`. Returns `None` when either side is `NaN` (the "undefined" outcome, which every
/// relational operator treats as false). `left_first` controls which operand is converted to a
/// primitive first, since conversion can have side effects.
pub fn abstract_relational_comparison(
    ctx: &mut EvalContext,
    x: &JsValue,
    y: &JsValue,
    left_first: bool,
) -> Result<Option<bool>, JErrorType> {
    let (px, py) = if left_first {
        let px = to_primitive(ctx, x, PreferredType::Number)?;
        let py = to_primitive(ctx, y, PreferredType::Number)?;
        (px, py)
    } else {
        let py = to_primitive(ctx, y, PreferredType::Number)?;
        let px = to_primitive(ctx, x, PreferredType::Number)?;
        (px, py)
    };
    if let (JsValue::String(sx), JsValue::String(sy)) = (&px, &py) {
        return Ok(Some(sx < sy));
    }
    let nx = primitive_to_number(&px);
    let ny = primitive_to_number(&py);
    Ok(number_less_than(&nx, &ny))
}

pub fn number_less_than(x: &JsNumberType, y: &JsNumberType) -> Option<bool> {
    match (x, y) {
        (JsNumberType::Integer(a), JsNumberType::Integer(b)) => Some(a < b),
        (JsNumberType::NaN, _) | (_, JsNumberType::NaN) => None,
        _ => Some(x.to_f64() < y.to_f64()),
    }
}
