use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::{JsObjectType, ObjectType};
use crate::runner::ds::object_property::{keys, PropertyKey};
use crate::runner::ds::operations::object::get;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string_object::PrimitiveObject;
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::eval::function::call_function;
use crate::runner::plugin::types::EvalContext;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";

/// Result of the `typeof` operator.
pub fn get_type(a: &JsValue) -> &'static str {
    match a {
        JsValue::Undefined => TYPE_STR_UNDEFINED,
        JsValue::Null => TYPE_STR_OBJECT,
        JsValue::Boolean(_) => TYPE_STR_BOOLEAN,
        JsValue::String(_) => TYPE_STR_STRING,
        JsValue::Number(_) => TYPE_STR_NUMBER,
        JsValue::Object(o) => {
            if o.borrow().is_callable() {
                TYPE_STR_FUNCTION
            } else {
                TYPE_STR_OBJECT
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    String,
    Number,
}

/// Converts an object to a primitive by trying `valueOf`/`toString` (in hint order) and taking
/// the first primitive result. Both methods may run script code.
pub fn to_primitive(
    ctx: &mut EvalContext,
    v: &JsValue,
    preferred_type: PreferredType,
) -> Result<JsValue, JErrorType> {
    let o = match v {
        JsValue::Object(o) => o,
        _ => return Ok(v.clone()),
    };
    let order = match preferred_type {
        PreferredType::String => [keys::to_string(), keys::value_of()],
        PreferredType::Default | PreferredType::Number => [keys::value_of(), keys::to_string()],
    };
    for method_name in order.iter() {
        let method = get(ctx, o, method_name)?;
        if method.is_callable() {
            let result = call_function(ctx, &method, v.clone(), Vec::new())?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Err(JErrorType::TypeError(
        "Cannot convert object to primitive value".to_string(),
    ))
}

pub fn to_boolean(v: &JsValue) -> bool {
    match v {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::Number(n) => match n {
            JsNumberType::Integer(i) => *i != 0,
            JsNumberType::Float(f) => *f != 0.0,
            JsNumberType::NaN => false,
            JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => true,
        },
        JsValue::String(s) => !s.is_empty(),
        JsValue::Object(_) => true,
    }
}

pub fn to_number(ctx: &mut EvalContext, v: &JsValue) -> Result<JsNumberType, JErrorType> {
    match v {
        JsValue::Object(_) => {
            let pv = to_primitive(ctx, v, PreferredType::Number)?;
            Ok(primitive_to_number(&pv))
        }
        _ => Ok(primitive_to_number(v)),
    }
}

/// `ToNumber` for values already known to be primitive. Objects yield `NaN`.
pub fn primitive_to_number(v: &JsValue) -> JsNumberType {
    match v {
        JsValue::Undefined => JsNumberType::NaN,
        JsValue::Null => JsNumberType::Integer(0),
        JsValue::Boolean(b) => JsNumberType::Integer(if *b { 1 } else { 0 }),
        JsValue::Number(n) => *n,
        JsValue::String(s) => JsNumberType::from_f64(string_to_number(s)),
        JsValue::Object(_) => JsNumberType::NaN,
    }
}

pub fn to_string(ctx: &mut EvalContext, v: &JsValue) -> Result<JsString, JErrorType> {
    match v {
        JsValue::Object(_) => {
            let pv = to_primitive(ctx, v, PreferredType::String)?;
            Ok(primitive_to_string(&pv))
        }
        _ => Ok(primitive_to_string(v)),
    }
}

pub fn primitive_to_string(v: &JsValue) -> JsString {
    match v {
        JsValue::Undefined => JsString::from(TYPE_STR_UNDEFINED),
        JsValue::Null => JsString::from(TYPE_STR_NULL),
        JsValue::Boolean(b) => JsString::from(if *b { "true" } else { "false" }),
        JsValue::String(s) => s.clone(),
        JsValue::Number(n) => match n {
            JsNumberType::Integer(i) => JsString::from(i.to_string()),
            _ => JsString::from(number_to_string(n.to_f64())),
        },
        JsValue::Object(_) => JsString::from("[object Object]"),
    }
}

pub fn to_object(ctx: &mut EvalContext, v: &JsValue) -> Result<JsObjectType, JErrorType> {
    let proto = match v {
        JsValue::Undefined | JsValue::Null => {
            return Err(JErrorType::TypeError(format!(
                "Cannot convert {} to object",
                v
            )));
        }
        JsValue::Object(o) => return Ok(o.clone()),
        JsValue::Boolean(_) => WellKnownIntrinsics::BooleanPrototype,
        JsValue::Number(_) => WellKnownIntrinsics::NumberPrototype,
        JsValue::String(_) => WellKnownIntrinsics::StringPrototype,
    };
    let proto = ctx.realm.get_intrinsics_value(proto);
    Ok(ObjectType::Primitive(PrimitiveObject::new(v.clone(), Some(proto))).into_js_object_type())
}

pub fn to_property_key(ctx: &mut EvalContext, v: &JsValue) -> Result<PropertyKey, JErrorType> {
    match v {
        JsValue::Number(JsNumberType::Integer(i)) if *i >= 0 && *i < u32::MAX as i64 => {
            Ok(PropertyKey::Int(*i as u32))
        }
        JsValue::String(s) => Ok(PropertyKey::from(s.clone())),
        _ => Ok(PropertyKey::from(to_string(ctx, v)?)),
    }
}

/// `ToInteger`: truncation toward zero, `NaN` becomes `0`.
pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else if n.is_infinite() {
        n
    } else {
        n.trunc()
    }
}

pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let m = n.trunc() % 4_294_967_296.0;
    let m = if m < 0.0 { m + 4_294_967_296.0 } else { m };
    m as u32
}

pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

pub fn number_to_int32(n: &JsNumberType) -> i32 {
    match n {
        JsNumberType::Integer(i) => *i as i32,
        _ => to_int32(n.to_f64()),
    }
}

pub fn number_to_uint32(n: &JsNumberType) -> u32 {
    match n {
        JsNumberType::Integer(i) => *i as u32,
        _ => to_uint32(n.to_f64()),
    }
}

/// Shortest string that reads back as the same double.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format(n).to_string()
}

fn is_js_whitespace(c: u16) -> bool {
    matches!(
        c,
        0x09 | 0x0A | 0x0B | 0x0C | 0x0D | 0x20 | 0xA0 | 0x1680 | 0x2000..=0x200A
            | 0x2028 | 0x2029 | 0x202F | 0x205F | 0x3000 | 0xFEFF
    )
}

/// Strips leading and trailing whitespace and line terminators.
pub fn trim_js_whitespace(s: &JsString) -> JsString {
    let units = s.units();
    let start = units.iter().position(|c| !is_js_whitespace(*c));
    match start {
        None => JsString::empty(),
        Some(start) => {
            let end = units.iter().rposition(|c| !is_js_whitespace(*c)).map_or(start, |e| e + 1);
            s.substring(start, end)
        }
    }
}

fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    value
}

fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

/// `ToNumber` applied to a string: the StringNumericLiteral grammar, `NaN` when it does not
/// match.
pub fn string_to_number(s: &JsString) -> f64 {
    let trimmed = trim_js_whitespace(s).to_string();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.as_str() {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let lower_prefix = trimmed.get(..2).map(|p| p.to_ascii_lowercase());
    match lower_prefix.as_deref() {
        Some("0x") => return parse_radix_digits(&trimmed[2..], 16),
        Some("0o") => return parse_radix_digits(&trimmed[2..], 8),
        Some("0b") => return parse_radix_digits(&trimmed[2..], 2),
        _ => {}
    }
    if is_decimal_literal(&trimmed) {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> f64 {
        string_to_number(&JsString::from(s))
    }

    #[test]
    fn string_to_number_grammar() {
        assert_eq!(num(""), 0.0);
        assert_eq!(num("  \n42\t"), 42.0);
        assert_eq!(num("-1.5e3"), -1500.0);
        assert_eq!(num(".5"), 0.5);
        assert_eq!(num("5."), 5.0);
        assert_eq!(num("0x1F"), 31.0);
        assert_eq!(num("0b101"), 5.0);
        assert_eq!(num("-Infinity"), f64::NEG_INFINITY);
        assert!(num("inf").is_nan());
        assert!(num("NaN").is_nan());
        assert!(num("1e").is_nan());
        assert!(num("12px").is_nan());
        assert!(num("-0x10").is_nan());
        assert!(num(".").is_nan());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(123456789012345680000.0), "123456789012345680000");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn int32_wraps_modulo_2_pow_32() {
        assert_eq!(to_int32(4294967296.0 + 5.0), 5);
        assert_eq!(to_int32(2147483648.0), -2147483648);
        assert_eq!(to_uint32(-1.0), 4294967295);
        assert_eq!(to_int32(-1.5), -1);
        assert_eq!(to_int32(1e20), 1661992960);
        assert_eq!(to_uint32(f64::NAN), 0);
    }
}
