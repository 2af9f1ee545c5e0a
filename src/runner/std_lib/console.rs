//! Console built-in object.
//!
//! Provides console.log, console.error, console.warn, and console.info methods. Arguments are
//! rendered with `ToString`, so objects print through their own `toString`.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

/// Register the console object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let console = BuiltInObject::new("console")
        .add_static_method("log", console_log, 0)
        .add_static_method("error", console_error, 0)
        .add_static_method("warn", console_warn, 0)
        .add_static_method("info", console_info, 0);

    registry.register_object(console);
}

/// Format all arguments for console output.
fn format_args(ctx: &mut EvalContext, args: &[JsValue]) -> Result<String, JErrorType> {
    let mut parts = Vec::with_capacity(args.len());
    for a in args {
        parts.push(to_string(ctx, a)?.to_string());
    }
    Ok(parts.join(" "))
}

/// console.log - Log to stdout.
fn console_log(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    println!("{}", format_args(ctx, &args)?);
    Ok(JsValue::Undefined)
}

/// console.error - Log to stderr.
fn console_error(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    eprintln!("{}", format_args(ctx, &args)?);
    Ok(JsValue::Undefined)
}

/// console.warn - Log warning to stderr.
fn console_warn(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    eprintln!("Warning: {}", format_args(ctx, &args)?);
    Ok(JsValue::Undefined)
}

/// console.info - Log info to stdout (same as log).
fn console_info(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    println!("{}", format_args(ctx, &args)?);
    Ok(JsValue::Undefined)
}
