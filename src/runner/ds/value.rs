use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::operations::type_conversion::{
    number_to_string, TYPE_STR_NULL, TYPE_STR_UNDEFINED,
};

/// Largest magnitude for which every integer is exactly representable as a double.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_992;

pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    String(JsString),
    Number(JsNumberType),
    Object(JsObjectType),
}
impl JsValue {
    pub fn from_f64(n: f64) -> Self {
        JsValue::Number(JsNumberType::from_f64(n))
    }

    pub fn from_i64(n: i64) -> Self {
        JsValue::Number(JsNumberType::from_i64(n))
    }

    pub fn from_str(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    pub fn as_object(&self) -> Option<&JsObjectType> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// True for objects that can be the target of a call.
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(o) => o.borrow().is_callable(),
            _ => false,
        }
    }
}
impl Clone for JsValue {
    fn clone(&self) -> Self {
        match self {
            JsValue::Undefined => JsValue::Undefined,
            JsValue::String(d) => JsValue::String(d.clone()),
            JsValue::Boolean(d) => JsValue::Boolean(*d),
            JsValue::Null => JsValue::Null,
            JsValue::Number(d) => JsValue::Number(*d),
            JsValue::Object(o) => JsValue::Object(o.clone()),
        }
    }
}
impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "{}", TYPE_STR_UNDEFINED),
            JsValue::Null => write!(f, "{}", TYPE_STR_NULL),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::String(s) => write!(f, "{}", s),
            JsValue::Number(n) => write!(f, "{}", n),
            JsValue::Object(o) => match o.try_borrow() {
                Ok(o) => write!(f, "[object {}]", o.as_js_object().class()),
                Err(_) => write!(f, "[object Object]"),
            },
        }
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "JsValue::Undefined"),
            JsValue::Null => write!(f, "JsValue::Null"),
            JsValue::Boolean(b) => write!(f, "JsValue::Boolean({})", b),
            JsValue::String(s) => write!(f, "JsValue::String({:?})", s),
            JsValue::Number(n) => write!(f, "JsValue::Number({:?})", n),
            JsValue::Object(o) => match o.try_borrow() {
                Ok(o) => write!(f, "JsValue::Object({})", o.as_js_object().class()),
                Err(_) => write!(f, "JsValue::Object(...)"),
            },
        }
    }
}

/// Structural equality for host code and tests: numbers compare with SameValue (so `NaN` equals
/// `NaN` and `0` differs from `-0`), objects by identity. Script-level `===` lives in
/// `operations::test_and_comparison`.
impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A double with an integer sub-representation.
///
/// Values are kept canonical: `Integer` holds every integral value with magnitude up to 2^53
/// except `-0`, the non-finite values have their own variants, and everything else is `Float`.
/// Because of that each double has exactly one representation, so integer fast paths never become
/// observable.
#[derive(Debug, Clone, Copy)]
pub enum JsNumberType {
    Integer(i64),
    Float(f64),
    NaN,
    PositiveInfinity,
    NegativeInfinity,
}
impl JsNumberType {
    pub fn from_f64(n: f64) -> Self {
        if n.is_nan() {
            JsNumberType::NaN
        } else if n == f64::INFINITY {
            JsNumberType::PositiveInfinity
        } else if n == f64::NEG_INFINITY {
            JsNumberType::NegativeInfinity
        } else if n.fract() == 0.0
            && n.abs() <= MAX_SAFE_INTEGER as f64
            && !(n == 0.0 && n.is_sign_negative())
        {
            JsNumberType::Integer(n as i64)
        } else {
            JsNumberType::Float(n)
        }
    }

    pub fn from_i64(n: i64) -> Self {
        if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n) {
            JsNumberType::Integer(n)
        } else {
            JsNumberType::from_f64(n as f64)
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            JsNumberType::Integer(i) => *i as f64,
            JsNumberType::Float(f) => *f,
            JsNumberType::NaN => f64::NAN,
            JsNumberType::PositiveInfinity => f64::INFINITY,
            JsNumberType::NegativeInfinity => f64::NEG_INFINITY,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, JsNumberType::NaN)
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, JsNumberType::Integer(_) | JsNumberType::Float(_))
    }
}
impl Display for JsNumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", number_to_string(self.to_f64()))
    }
}
impl PartialEq for JsNumberType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsNumberType::Integer(a), JsNumberType::Integer(b)) => a == b,
            (JsNumberType::NaN, JsNumberType::NaN) => true,
            _ => self.to_f64().to_bits() == other.to_f64().to_bits(),
        }
    }
}
