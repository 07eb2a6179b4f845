use std::fmt;
use std::fmt::{Display, Formatter};

use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    Int(u32),
    Str(String),
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::Str(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::Str(s)
    }
}

impl Display for PropertyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Int(i) => write!(f, "{}", i),
            PropertyKey::Str(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    Data {
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<JsObjectType>,
        set: Option<JsObjectType>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    /// Plain writable, enumerable, configurable data property.
    pub fn data(value: JsValue) -> Self {
        PropertyDescriptor::Data {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Data property shaped like an interface operation or a global binding:
    /// writable and configurable but hidden from enumeration.
    pub fn hidden(value: JsValue) -> Self {
        PropertyDescriptor::Data {
            value,
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    pub fn accessor(get: Option<JsObjectType>, set: Option<JsObjectType>) -> Self {
        PropertyDescriptor::Accessor {
            get,
            set,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { enumerable, .. } => *enumerable,
            PropertyDescriptor::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { configurable, .. } => *configurable,
            PropertyDescriptor::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_data_descriptor(&self) -> bool {
        matches!(self, PropertyDescriptor::Data { .. })
    }

    pub fn value(&self) -> Option<&JsValue> {
        match self {
            PropertyDescriptor::Data { value, .. } => Some(value),
            PropertyDescriptor::Accessor { .. } => None,
        }
    }

    /// Same shape and attributes, new value. Only meaningful for data
    /// descriptors; accessors are returned as-is.
    pub fn with_value(&self, new_value: JsValue) -> Self {
        match self {
            PropertyDescriptor::Data {
                writable,
                enumerable,
                configurable,
                ..
            } => PropertyDescriptor::Data {
                value: new_value,
                writable: *writable,
                enumerable: *enumerable,
                configurable: *configurable,
            },
            accessor => accessor.clone(),
        }
    }
}
