use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runner::ds::object::JsObjectType;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";

#[derive(Clone)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    String(String),
    Number(f64),
    Object(JsObjectType),
}

impl JsValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsObjectType> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Is this the empty string or a nullish value? Handlers use this to
    /// skip transcoding of absent addresses.
    pub fn is_empty_or_nullish(&self) -> bool {
        match self {
            JsValue::String(s) => s.is_empty(),
            v => v.is_nullish(),
        }
    }

    /// ToString, as far as host natives need it.
    pub fn to_js_string(&self) -> String {
        match self {
            JsValue::Undefined => TYPE_STR_UNDEFINED.to_string(),
            JsValue::Null => TYPE_STR_NULL.to_string(),
            JsValue::Boolean(b) => b.to_string(),
            JsValue::String(s) => s.clone(),
            JsValue::Number(n) => format_number(*n),
            JsValue::Object(o) => format!("[object {}]", (**o).borrow().class_name()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::String(s) => write!(f, "\"{}\"", s),
            JsValue::Boolean(b) => write!(f, "bool({})", b),
            v => write!(f, "{}", v.to_js_string()),
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
            JsValue::Object(o) => write!(f, "JsValue::Object({})", (**o).borrow().class_name()),
        }
    }
}

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

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.to_string())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<JsObjectType> for JsValue {
    fn from(o: JsObjectType) -> Self {
        JsValue::Object(o)
    }
}
