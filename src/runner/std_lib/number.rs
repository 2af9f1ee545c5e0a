//! Number built-in.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::operations::type_conversion::{number_to_string, to_integer, to_number};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string_object::PrimitiveObject;
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Number built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let number = BuiltInObject::new("Number")
        .with_prototype(WellKnownIntrinsics::NumberPrototype)
        .with_split_constructor(number_call, Some(number_construct), 1)
        .add_property("MAX_VALUE", JsValue::from_f64(f64::MAX))
        .add_property("MIN_VALUE", JsValue::from_f64(f64::from_bits(1)))
        .add_property("NaN", JsValue::Number(JsNumberType::NaN))
        .add_property(
            "POSITIVE_INFINITY",
            JsValue::Number(JsNumberType::PositiveInfinity),
        )
        .add_property(
            "NEGATIVE_INFINITY",
            JsValue::Number(JsNumberType::NegativeInfinity),
        )
        .add_method("toString", number_to_string_method, 1)
        .add_method("valueOf", number_value_of, 0)
        .add_method("toFixed", number_to_fixed, 1);

    registry.register_object(number);
}

fn number_of_args(ctx: &mut EvalContext, args: &[JsValue]) -> Result<JsNumberType, JErrorType> {
    match args.first() {
        None => Ok(JsNumberType::Integer(0)),
        Some(v) => to_number(ctx, v),
    }
}

/// The number a Number method operates on: a number primitive or a Number wrapper.
fn this_number_value(this: &JsValue, method: &str) -> Result<f64, JErrorType> {
    let value = match this {
        JsValue::Number(n) => Some(n.to_f64()),
        JsValue::Object(o) => match o.borrow().as_primitive().map(|p| p.primitive_value()) {
            Some(JsValue::Number(n)) => Some(n.to_f64()),
            _ => None,
        },
        _ => None,
    };
    value.ok_or_else(|| {
        JErrorType::TypeError(format!(
            "Number.prototype.{} requires that 'this' be a Number",
            method
        ))
    })
}

/// Number(value)
fn number_call(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Number(number_of_args(ctx, &args)?))
}

/// new Number(value)
fn number_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let value = number_of_args(ctx, &args)?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::NumberPrototype);
    let wrapper = PrimitiveObject::new(JsValue::Number(value), Some(proto));
    Ok(JsValue::Object(
        ObjectType::Primitive(wrapper).into_js_object_type(),
    ))
}

/// Number.prototype.toString(radix)
fn number_to_string_method(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let x = this_number_value(&this, "toString")?;
    let radix = match arg(&args, 0) {
        JsValue::Undefined => 10.0,
        v => to_integer(to_number(ctx, &v)?.to_f64()),
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(JErrorType::RangeError(
            "toString() radix must be between 2 and 36".to_string(),
        ));
    }
    let rendered = if radix == 10.0 {
        number_to_string(x)
    } else {
        number_to_radix_string(x, radix as u32)
    };
    Ok(JsValue::String(JsString::from(rendered)))
}

/// Digits of `x` in base `radix`, with at most 52 fractional digits.
pub(crate) fn number_to_radix_string(x: f64, radix: u32) -> String {
    if !x.is_finite() {
        return number_to_string(x);
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let r = radix as f64;
    let magnitude = x.abs();
    let mut integer = magnitude.trunc();
    let mut fraction = magnitude - integer;

    let mut int_digits = Vec::new();
    if integer == 0.0 {
        int_digits.push('0');
    }
    while integer >= 1.0 {
        let digit = (integer % r) as u32;
        int_digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        integer = ((integer - digit as f64) / r).trunc();
    }
    int_digits.reverse();

    let mut out = String::new();
    if x < 0.0 {
        out.push('-');
    }
    out.extend(int_digits);
    if fraction > 0.0 {
        out.push('.');
        let mut emitted = 0;
        while fraction > 0.0 && emitted < 52 {
            fraction *= r;
            let digit = fraction.trunc();
            fraction -= digit;
            out.push(std::char::from_digit(digit as u32, radix).unwrap_or('0'));
            emitted += 1;
        }
    }
    out
}

/// Number.prototype.valueOf
fn number_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from_f64(this_number_value(&this, "valueOf")?))
}

/// Number.prototype.toFixed(digits)
fn number_to_fixed(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let x = this_number_value(&this, "toFixed")?;
    let digits = to_integer(to_number(ctx, &arg(&args, 0))?.to_f64());
    if !(0.0..=100.0).contains(&digits) {
        return Err(JErrorType::RangeError(
            "toFixed() digits argument must be between 0 and 100".to_string(),
        ));
    }
    Ok(JsValue::String(JsString::from(to_fixed(x, digits as usize))))
}

/// Fixed-point rendering; exact halves round away from zero.
pub(crate) fn to_fixed(x: f64, digits: usize) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.abs() >= 1e21 {
        return number_to_string(x);
    }
    // Every finite double has an exact decimal expansion well within 1100 places.
    let exact = format!("{:.1100}", x.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac_part.as_bytes();
    let mut kept: Vec<u8> = int_part.bytes().chain(frac[..digits].iter().copied()).collect();
    if frac.get(digits).map_or(false, |d| *d >= b'5') {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }
    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if x < 0.0 {
        out.push('-');
    }
    out.push_str(&String::from_utf8_lossy(&kept[..split]));
    if digits > 0 {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(&kept[split..]));
    }
    out
}
