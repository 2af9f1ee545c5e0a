//! Global value properties and functions: `undefined`, `NaN`, `Infinity`, `isNaN`, `isFinite`,
//! `parseInt`, `parseFloat` and `eval`.

use crate::parser::JsParser;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::operations::type_conversion::{to_int32, to_number, to_string, trim_js_whitespace};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::eval::statement::evaluate_eval_code;
use crate::runner::plugin::registry::{BuiltInRegistry, GlobalValueKind};
use crate::runner::plugin::types::{BuiltInFn, EvalContext};

use super::arg;

/// Register the global values and functions with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    registry.register_global_value("undefined", JsValue::Undefined, GlobalValueKind::Constant);
    registry.register_global_value(
        "NaN",
        JsValue::Number(JsNumberType::NaN),
        GlobalValueKind::Constant,
    );
    registry.register_global_value(
        "Infinity",
        JsValue::Number(JsNumberType::PositiveInfinity),
        GlobalValueKind::Constant,
    );
    registry.register_global_function("isNaN", BuiltInFn::Native(global_is_nan), 1);
    registry.register_global_function("isFinite", BuiltInFn::Native(global_is_finite), 1);
    registry.register_global_function("parseInt", BuiltInFn::Native(global_parse_int), 2);
    registry.register_global_function("parseFloat", BuiltInFn::Native(global_parse_float), 1);
    registry.register_global_function("eval", BuiltInFn::Native(global_eval), 1);
}

/// isNaN(value)
fn global_is_nan(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let n = to_number(ctx, &arg(&args, 0))?;
    Ok(JsValue::Boolean(n.is_nan()))
}

/// isFinite(value)
fn global_is_finite(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let n = to_number(ctx, &arg(&args, 0))?;
    Ok(JsValue::Boolean(n.is_finite()))
}

/// parseInt(string, radix)
fn global_parse_int(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let input = to_string(ctx, &arg(&args, 0))?;
    let radix = to_number(ctx, &arg(&args, 1))?;
    Ok(JsValue::from_f64(parse_int(&input, to_int32(radix.to_f64()))))
}

pub(crate) fn parse_int(input: &JsString, radix: i32) -> f64 {
    let text = trim_js_whitespace(input).to_string();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text.as_str()),
    };
    let mut radix = radix;
    let mut strip_prefix = true;
    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return f64::NAN;
        }
        if radix != 16 {
            strip_prefix = false;
        }
    } else {
        radix = 10;
    }
    let mut digits = rest;
    if strip_prefix && (digits.starts_with("0x") || digits.starts_with("0X")) {
        digits = &digits[2..];
        radix = 16;
    }
    let mut value = 0.0f64;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c.to_digit(radix as u32) {
            Some(d) => {
                value = value * radix as f64 + d as f64;
                seen_digit = true;
            }
            None => break,
        }
    }
    if !seen_digit {
        return f64::NAN;
    }
    if negative {
        -value
    } else {
        value
    }
}

/// parseFloat(string)
fn global_parse_float(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let input = to_string(ctx, &arg(&args, 0))?;
    Ok(JsValue::from_f64(parse_float(&input)))
}

/// Longest prefix of the trimmed input that is a decimal literal, or `NaN`.
pub(crate) fn parse_float(input: &JsString) -> f64 {
    let text = trim_js_whitespace(input).to_string();
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    if text[i..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digit_count = i - digits_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digit_count += j - i - 1;
        if digit_count > 0 {
            i = j;
        }
    }
    if digit_count == 0 {
        return f64::NAN;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exponent_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exponent_start {
            i = j;
        }
    }
    text[..i].parse::<f64>().unwrap_or(f64::NAN)
}

/// eval(source): indirect eval. The source runs as a program in the global scope; anything other
/// than a string is returned as it is.
fn global_eval(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let source = match arg(&args, 0) {
        JsValue::String(s) => s.to_string(),
        other => return Ok(other),
    };
    let program = JsParser::parse_to_ast_from_str(&source)
        .map_err(|e| JErrorType::SyntaxError(e.variant.message().to_string()))?;
    tracing::trace!(statements = program.body.len(), "evaluating eval code");
    evaluate_eval_code(&program, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> JsString {
        JsString::from(v)
    }

    #[test]
    fn parse_int_prefixes_and_radix() {
        assert_eq!(parse_int(&s("  42px"), 0), 42.0);
        assert_eq!(parse_int(&s("0x1f"), 0), 31.0);
        assert_eq!(parse_int(&s("0x1f"), 16), 31.0);
        assert_eq!(parse_int(&s("0x1f"), 10), 0.0);
        assert_eq!(parse_int(&s("-101"), 2), -5.0);
        assert!(parse_int(&s("z"), 10).is_nan());
        assert!(parse_int(&s("1"), 37).is_nan());
    }

    #[test]
    fn parse_float_takes_the_longest_prefix() {
        assert_eq!(parse_float(&s("3.25abc")), 3.25);
        assert_eq!(parse_float(&s(" -.5e1x")), -5.0);
        assert_eq!(parse_float(&s("1e")), 1.0);
        assert_eq!(parse_float(&s("5.")), 5.0);
        assert_eq!(parse_float(&s("-Infinityx")), f64::NEG_INFINITY);
        assert!(parse_float(&s(".")).is_nan());
        assert!(parse_float(&s("abc")).is_nan());
    }
}
