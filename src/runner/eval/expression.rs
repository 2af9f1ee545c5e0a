//! Expression evaluation.
//!
//! Most expressions evaluate straight to a value. References are only built where the caller
//! needs a location: assignment targets, `++`/`--`, `delete`, `typeof` of a bare name and the
//! callee of a call (to discover its receiver). Plain member reads go through `get_v` directly.

use std::rc::Rc;

use crate::parser::ast::{
    AssignmentOperator, BinaryOperator, ExpressionType, FunctionData, IdentifierData,
    LiteralData, LiteralType, LogicalOperator, MemberExpressionType, NumberLiteralType,
    PropertyData, PropertyValue, UnaryOperator, UpdateOperator,
};
use crate::runner::ds::array_object::array_create;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{object_create, object_create_with_class, JsObjectType, ObjectClass};
use crate::runner::ds::object_property::{
    keys, PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::arithmetic::{self, BitwiseOp};
use crate::runner::ds::operations::object::{
    create_data_property, delete_property, get_v, has_property, ordinary_has_instance,
};
use crate::runner::ds::operations::test_and_comparison::{
    abstract_equality_comparison, abstract_relational_comparison, strict_equality_comparison,
};
use crate::runner::ds::operations::type_conversion::{
    get_type, to_boolean, to_number, to_object, to_primitive, to_property_key, to_string,
    PreferredType,
};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::scope::{Scope, ScopeKind};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::plugin::types::EvalContext;

use super::function::{call_function, construct, make_function};
use super::types::{Reference, ReferenceBase, ReferenceResult, ValueResult};

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),
        ExpressionType::Identifier(id) => resolve_identifier(id, ctx)?.get_value(ctx),
        ExpressionType::ThisExpression { .. } => ctx.this_value(),
        ExpressionType::ArrayExpression { elements, .. } => evaluate_array_literal(elements, ctx),
        ExpressionType::ObjectExpression { properties, .. } => {
            evaluate_object_literal(properties, ctx)
        }
        ExpressionType::FunctionExpression(data) => evaluate_function_expression(data, ctx),
        ExpressionType::UnaryExpression {
            operator, argument, ..
        } => evaluate_unary_expression(*operator, argument, ctx),
        ExpressionType::UpdateExpression {
            operator,
            argument,
            prefix,
            ..
        } => evaluate_update_expression(*operator, argument, *prefix, ctx),
        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
            ..
        } => {
            let l = evaluate_expression(left, ctx)?;
            let r = evaluate_expression(right, ctx)?;
            apply_binary_operator(*operator, &l, &r, ctx)
        }
        ExpressionType::AssignmentExpression {
            operator,
            left,
            right,
            ..
        } => evaluate_assignment_expression(*operator, left, right, ctx),
        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
            ..
        } => {
            let l = evaluate_expression(left, ctx)?;
            let short_circuit = match operator {
                LogicalOperator::And => !to_boolean(&l),
                LogicalOperator::Or => to_boolean(&l),
            };
            if short_circuit {
                Ok(l)
            } else {
                evaluate_expression(right, ctx)
            }
        }
        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
            ..
        } => {
            if to_boolean(&evaluate_expression(test, ctx)?) {
                evaluate_expression(consequent, ctx)
            } else {
                evaluate_expression(alternate, ctx)
            }
        }
        ExpressionType::CallExpression {
            callee, arguments, ..
        } => evaluate_call_expression(callee, arguments, ctx),
        ExpressionType::NewExpression {
            callee, arguments, ..
        } => {
            let constructor = evaluate_expression(callee, ctx)?;
            let args = evaluate_arguments(arguments, ctx)?;
            if !is_constructor(&constructor) {
                return Err(JErrorType::TypeError(format!(
                    "{} is not a constructor",
                    describe_expression(callee)
                )));
            }
            construct(ctx, &constructor, args)
        }
        ExpressionType::SequenceExpression { expressions, .. } => {
            let mut value = JsValue::Undefined;
            for e in expressions {
                value = evaluate_expression(e, ctx)?;
            }
            Ok(value)
        }
        ExpressionType::MemberExpression(member) => {
            let (base, key) = evaluate_member_parts(member, ctx)?;
            get_v(ctx, &base, &key)
        }
    }
}

/// Evaluates an assignment target, `delete` operand or callee to a reference.
pub fn evaluate_reference(expr: &ExpressionType, ctx: &mut EvalContext) -> ReferenceResult {
    match expr {
        ExpressionType::Identifier(id) => resolve_identifier(id, ctx),
        ExpressionType::MemberExpression(member) => {
            let (base, key) = evaluate_member_parts(member, ctx)?;
            Ok(Reference::property(base, key, ctx.is_strict()))
        }
        _ => Err(JErrorType::Internal(format!(
            "expression cannot be used as a reference: {}",
            describe_expression(expr)
        ))),
    }
}

/// Walks the scope chain for `id`, innermost first.
pub fn resolve_identifier(id: &IdentifierData, ctx: &mut EvalContext) -> ReferenceResult {
    let strict = ctx.is_strict();
    let key = id.key();
    let scope = ctx.current_scope()?;
    Ok(match scope.lookup(&key) {
        Some(found) => Reference::environment(found, key, strict),
        None => Reference::unresolvable(key, strict),
    })
}

fn evaluate_member_parts(
    member: &MemberExpressionType,
    ctx: &mut EvalContext,
) -> Result<(JsValue, PropertyKey), JErrorType> {
    match member {
        MemberExpressionType::SimpleMemberExpression {
            object, property, ..
        } => {
            let base = evaluate_expression(object, ctx)?;
            Ok((base, property.key()))
        }
        MemberExpressionType::ComputedMemberExpression {
            object, property, ..
        } => {
            let base = evaluate_expression(object, ctx)?;
            let key_value = evaluate_expression(property, ctx)?;
            if base.is_nullish() {
                return Err(JErrorType::TypeError(format!(
                    "Cannot read property '{}' of {}",
                    key_value, base
                )));
            }
            let key = to_property_key(ctx, &key_value)?;
            Ok((base, key))
        }
    }
}

fn evaluate_literal(lit: &LiteralData) -> JsValue {
    match &lit.value {
        LiteralType::StringLiteral(s) => JsValue::String(s.clone()),
        LiteralType::BooleanLiteral(b) => JsValue::Boolean(*b),
        LiteralType::NullLiteral => JsValue::Null,
        LiteralType::NumberLiteral(NumberLiteralType::IntegerLiteral(i)) => JsValue::from_i64(*i),
        LiteralType::NumberLiteral(NumberLiteralType::FloatLiteral(f)) => JsValue::from_f64(*f),
    }
}

fn evaluate_array_literal(
    elements: &[Option<ExpressionType>],
    ctx: &mut EvalContext,
) -> ValueResult {
    let array = array_create(0, Some(ctx.intrinsic(WellKnownIntrinsics::ArrayPrototype)));
    for (i, element) in elements.iter().enumerate() {
        if let Some(e) = element {
            let value = evaluate_expression(e, ctx)?;
            create_data_property(&array, PropertyKey::from(i as u32), value);
        }
    }
    // Trailing holes still count towards the length.
    array.borrow_mut().as_js_object_mut().define_own_property(
        keys::length(),
        PropertyDescriptorSetter::value_only(JsValue::from_i64(elements.len() as i64)),
    );
    Ok(JsValue::Object(array))
}

fn evaluate_object_literal(properties: &[PropertyData], ctx: &mut EvalContext) -> ValueResult {
    let object = object_create(Some(ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype)));
    for property in properties {
        let desc = match &property.value {
            PropertyValue::Init(e) => {
                let value = evaluate_expression(e, ctx)?;
                PropertyDescriptorSetter::new_from_property_descriptor(
                    PropertyDescriptor::new_data(value, true, true, true),
                )
            }
            PropertyValue::Get(data) => PropertyDescriptorSetter {
                get: Some(JsValue::Object(closure(data, ctx)?)),
                enumerable: Some(true),
                configurable: Some(true),
                ..Default::default()
            },
            PropertyValue::Set(data) => PropertyDescriptorSetter {
                set: Some(JsValue::Object(closure(data, ctx)?)),
                enumerable: Some(true),
                configurable: Some(true),
                ..Default::default()
            },
        };
        object
            .borrow_mut()
            .as_js_object_mut()
            .define_own_property(property.key.clone(), desc);
    }
    Ok(JsValue::Object(object))
}

fn closure(data: &Rc<FunctionData>, ctx: &mut EvalContext) -> Result<JsObjectType, JErrorType> {
    let scope = ctx.current_scope()?;
    Ok(make_function(ctx, data, Some(scope)))
}

/// A named function expression sees its own name through an extra scope node holding a
/// read-only binding.
fn evaluate_function_expression(data: &Rc<FunctionData>, ctx: &mut EvalContext) -> ValueResult {
    let id = match &data.id {
        Some(id) => id,
        None => return Ok(JsValue::Object(closure(data, ctx)?)),
    };
    let scope = ctx.current_scope()?;
    let name_object = object_create_with_class(ObjectClass::Declarative, None);
    let name_scope = Scope::push(&scope, name_object.clone(), ScopeKind::FunctionName);
    let function = make_function(ctx, data, Some(name_scope));
    name_object.borrow_mut().as_js_object_mut().define_own_property(
        id.key(),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::Object(function.clone()),
            false,
            false,
            false,
        )),
    );
    Ok(JsValue::Object(function))
}

fn evaluate_unary_expression(
    operator: UnaryOperator,
    argument: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    match operator {
        UnaryOperator::TypeOf => {
            if let ExpressionType::Identifier(id) = argument {
                let reference = resolve_identifier(id, ctx)?;
                if reference.is_unresolvable() {
                    return Ok(JsValue::from_str("undefined"));
                }
                let value = reference.get_value(ctx)?;
                return Ok(JsValue::from_str(get_type(&value)));
            }
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::from_str(get_type(&value)))
        }
        UnaryOperator::Delete => evaluate_delete(argument, ctx),
        UnaryOperator::Void => {
            evaluate_expression(argument, ctx)?;
            Ok(JsValue::Undefined)
        }
        UnaryOperator::LogicalNot => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::Boolean(!to_boolean(&value)))
        }
        UnaryOperator::Plus => {
            let value = evaluate_expression(argument, ctx)?;
            Ok(JsValue::Number(to_number(ctx, &value)?))
        }
        UnaryOperator::Minus => {
            let value = evaluate_expression(argument, ctx)?;
            let n = to_number(ctx, &value)?;
            Ok(JsValue::Number(arithmetic::negate(&n)))
        }
        UnaryOperator::BitwiseNot => {
            let value = evaluate_expression(argument, ctx)?;
            let n = to_number(ctx, &value)?;
            Ok(JsValue::Number(arithmetic::bitwise_not(&n)))
        }
    }
}

fn evaluate_delete(argument: &ExpressionType, ctx: &mut EvalContext) -> ValueResult {
    let reference = match argument {
        ExpressionType::Identifier(_) | ExpressionType::MemberExpression(_) => {
            evaluate_reference(argument, ctx)?
        }
        _ => {
            evaluate_expression(argument, ctx)?;
            return Ok(JsValue::Boolean(true));
        }
    };
    let deleted = match &reference.base {
        ReferenceBase::Unresolvable => true,
        ReferenceBase::Value(base) => {
            let object = to_object(ctx, base)?;
            delete_property(&object, &reference.name, reference.strict)?
        }
        ReferenceBase::Environment(scope) => {
            delete_property(&scope.variable_object, &reference.name, false)?
        }
    };
    Ok(JsValue::Boolean(deleted))
}

fn evaluate_update_expression(
    operator: UpdateOperator,
    argument: &ExpressionType,
    prefix: bool,
    ctx: &mut EvalContext,
) -> ValueResult {
    let reference = evaluate_reference(argument, ctx)?;
    let old_value = reference.get_value(ctx)?;
    let old_number = to_number(ctx, &old_value)?;
    let one = JsNumberType::Integer(1);
    let new_number = match operator {
        UpdateOperator::PlusPlus => arithmetic::add(&old_number, &one),
        UpdateOperator::MinusMinus => arithmetic::subtract(&old_number, &one),
    };
    reference.put_value(ctx, JsValue::Number(new_number))?;
    Ok(JsValue::Number(if prefix { new_number } else { old_number }))
}

fn evaluate_assignment_expression(
    operator: AssignmentOperator,
    left: &ExpressionType,
    right: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    let reference = evaluate_reference(left, ctx)?;
    let value = match operator.binary_operator() {
        None => evaluate_expression(right, ctx)?,
        Some(op) => {
            let current = reference.get_value(ctx)?;
            let r = evaluate_expression(right, ctx)?;
            apply_binary_operator(op, &current, &r, ctx)?
        }
    };
    reference.put_value(ctx, value.clone())?;
    Ok(value)
}

fn evaluate_arguments(
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
) -> Result<Vec<JsValue>, JErrorType> {
    let mut values = Vec::with_capacity(arguments.len());
    for a in arguments {
        values.push(evaluate_expression(a, ctx)?);
    }
    Ok(values)
}

fn evaluate_call_expression(
    callee: &ExpressionType,
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
) -> ValueResult {
    let (function, this_value) = match callee {
        ExpressionType::Identifier(_) | ExpressionType::MemberExpression(_) => {
            let reference = evaluate_reference(callee, ctx)?;
            let function = reference.get_value(ctx)?;
            (function, reference.this_for_call())
        }
        _ => (evaluate_expression(callee, ctx)?, JsValue::Undefined),
    };
    let args = evaluate_arguments(arguments, ctx)?;
    if !function.is_callable() {
        return Err(JErrorType::TypeError(format!(
            "{} is not a function",
            describe_expression(callee)
        )));
    }
    call_function(ctx, &function, this_value, args)
}

fn is_constructor(v: &JsValue) -> bool {
    match v {
        JsValue::Object(o) => o
            .borrow()
            .as_function()
            .map_or(false, |f| f.is_constructor()),
        _ => false,
    }
}

/// Source-like rendering of a callee for error messages.
fn describe_expression(expr: &ExpressionType) -> String {
    match expr {
        ExpressionType::Identifier(id) => id.name.to_string(),
        ExpressionType::ThisExpression { .. } => "this".to_string(),
        ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
            object,
            property,
            ..
        }) => format!("{}.{}", describe_expression(object), property.name),
        ExpressionType::MemberExpression(MemberExpressionType::ComputedMemberExpression {
            object,
            ..
        }) => format!("{}[...]", describe_expression(object)),
        ExpressionType::CallExpression { callee, .. } => {
            format!("{}(...)", describe_expression(callee))
        }
        ExpressionType::Literal(lit) => evaluate_literal(lit).to_string(),
        _ => "expression".to_string(),
    }
}

/// Applies a binary operator to already evaluated operands.
pub fn apply_binary_operator(
    operator: BinaryOperator,
    l: &JsValue,
    r: &JsValue,
    ctx: &mut EvalContext,
) -> ValueResult {
    let numeric = |f: fn(&JsNumberType, &JsNumberType) -> JsNumberType,
                   ctx: &mut EvalContext|
     -> ValueResult {
        let a = to_number(ctx, l)?;
        let b = to_number(ctx, r)?;
        Ok(JsValue::Number(f(&a, &b)))
    };
    let bitwise = |op: BitwiseOp, ctx: &mut EvalContext| -> ValueResult {
        let a = to_number(ctx, l)?;
        let b = to_number(ctx, r)?;
        Ok(JsValue::Number(arithmetic::bitwise(op, &a, &b)))
    };
    match operator {
        BinaryOperator::Add => add_values(l, r, ctx),
        BinaryOperator::Subtract => numeric(arithmetic::subtract, ctx),
        BinaryOperator::Multiply => numeric(arithmetic::multiply, ctx),
        BinaryOperator::Divide => numeric(arithmetic::divide, ctx),
        BinaryOperator::Modulo => numeric(arithmetic::remainder, ctx),
        BinaryOperator::BitwiseAnd => bitwise(BitwiseOp::And, ctx),
        BinaryOperator::BitwiseOr => bitwise(BitwiseOp::Or, ctx),
        BinaryOperator::BitwiseXor => bitwise(BitwiseOp::Xor, ctx),
        BinaryOperator::BitwiseLeftShift => bitwise(BitwiseOp::LeftShift, ctx),
        BinaryOperator::BitwiseRightShift => bitwise(BitwiseOp::SignedRightShift, ctx),
        BinaryOperator::BitwiseUnsignedRightShift => bitwise(BitwiseOp::UnsignedRightShift, ctx),
        BinaryOperator::LooselyEqual => Ok(JsValue::Boolean(abstract_equality_comparison(
            ctx, l, r,
        )?)),
        BinaryOperator::LooselyUnequal => Ok(JsValue::Boolean(!abstract_equality_comparison(
            ctx, l, r,
        )?)),
        BinaryOperator::StrictlyEqual => Ok(JsValue::Boolean(strict_equality_comparison(l, r))),
        BinaryOperator::StrictlyUnequal => Ok(JsValue::Boolean(!strict_equality_comparison(l, r))),
        BinaryOperator::LessThan => {
            let result = abstract_relational_comparison(ctx, l, r, true)?;
            Ok(JsValue::Boolean(result == Some(true)))
        }
        BinaryOperator::GreaterThan => {
            let result = abstract_relational_comparison(ctx, r, l, false)?;
            Ok(JsValue::Boolean(result == Some(true)))
        }
        BinaryOperator::LessThanEqual => {
            let result = abstract_relational_comparison(ctx, r, l, false)?;
            Ok(JsValue::Boolean(result == Some(false)))
        }
        BinaryOperator::GreaterThanEqual => {
            let result = abstract_relational_comparison(ctx, l, r, true)?;
            Ok(JsValue::Boolean(result == Some(false)))
        }
        BinaryOperator::In => {
            let object = match r {
                JsValue::Object(o) => o.clone(),
                _ => {
                    return Err(JErrorType::TypeError(format!(
                        "Cannot use 'in' operator to search for '{}' in {}",
                        l, r
                    )));
                }
            };
            let key = to_property_key(ctx, l)?;
            Ok(JsValue::Boolean(has_property(&object, &key)))
        }
        BinaryOperator::InstanceOf => Ok(JsValue::Boolean(ordinary_has_instance(ctx, r, l)?)),
    }
}

/// `+`: string concatenation when either primitive operand is a string, numeric addition
/// otherwise.
fn add_values(l: &JsValue, r: &JsValue, ctx: &mut EvalContext) -> ValueResult {
    let lprim = to_primitive(ctx, l, PreferredType::Default)?;
    let rprim = to_primitive(ctx, r, PreferredType::Default)?;
    if matches!(lprim, JsValue::String(_)) || matches!(rprim, JsValue::String(_)) {
        let ls = to_string(ctx, &lprim)?;
        let rs = to_string(ctx, &rprim)?;
        return Ok(JsValue::String(ls.concat(&rs)));
    }
    let a = to_number(ctx, &lprim)?;
    let b = to_number(ctx, &rprim)?;
    Ok(JsValue::Number(arithmetic::add(&a, &b)))
}
