use std::cell::RefCell;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectType};
use crate::runner::ds::value::JsValue;

/// Native `[[Call]]` behavior: receives `this` and the argument list.
pub type NativeCallFn = Rc<dyn Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType>>;

/// Native `[[Construct]]` behavior: receives the argument list and returns
/// the constructed object.
pub type NativeConstructFn = Rc<dyn Fn(Vec<JsValue>) -> Result<JsValue, JErrorType>>;

/// Plain function pointer form of [`NativeCallFn`], used by host interface
/// tables.
pub type NativeFn = fn(this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType>;

pub struct FunctionObjectBase {
    pub name: String,
    pub call: Option<NativeCallFn>,
    pub construct: Option<NativeConstructFn>,
}

/// Wraps a closure as [`NativeCallFn`]. Going through this helper lets the
/// closure's parameter types be inferred.
pub fn native<F>(f: F) -> NativeCallFn
where
    F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + 'static,
{
    Rc::new(f)
}

/// Wraps a closure as [`NativeConstructFn`].
pub fn native_constructor<F>(f: F) -> NativeConstructFn
where
    F: Fn(Vec<JsValue>) -> Result<JsValue, JErrorType> + 'static,
{
    Rc::new(f)
}

pub fn new_native_function(name: &str, call: NativeCallFn) -> JsObjectType {
    new_function_object(name, Some(call), None)
}

pub fn new_function_object(
    name: &str,
    call: Option<NativeCallFn>,
    construct: Option<NativeConstructFn>,
) -> JsObjectType {
    Rc::new(RefCell::new(JsObject::new(
        "Function",
        None,
        ObjectType::Function(FunctionObjectBase {
            name: name.to_string(),
            call,
            construct,
        }),
    )))
}

pub fn function_name(f: &JsObjectType) -> String {
    f.borrow()
        .as_function()
        .map(|b| b.name.clone())
        .unwrap_or_default()
}

/// `[[Call]]`. The closure is cloned out first so no borrow of `f` is held
/// while native code runs.
pub fn call_function(f: &JsObjectType, this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let call = {
        let o = f.borrow();
        match o.as_function() {
            Some(FunctionObjectBase { call: Some(call), .. }) => call.clone(),
            Some(FunctionObjectBase { name, .. }) => {
                return Err(JErrorType::TypeError(format!(
                    "Class constructor {} cannot be invoked without 'new'",
                    name
                )))
            }
            None => {
                return Err(JErrorType::TypeError(format!(
                    "{} is not a function",
                    o.class_name()
                )))
            }
        }
    };
    call(this, args)
}

/// `[[Construct]]`.
pub fn construct_function(f: &JsObjectType, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let construct = {
        let o = f.borrow();
        match o.as_function() {
            Some(FunctionObjectBase {
                construct: Some(construct),
                ..
            }) => construct.clone(),
            Some(FunctionObjectBase { name, .. }) => {
                return Err(JErrorType::TypeError(format!("{} is not a constructor", name)))
            }
            None => {
                return Err(JErrorType::TypeError(format!(
                    "{} is not a constructor",
                    o.class_name()
                )))
            }
        }
    };
    construct(args)
}

pub fn call_value(f: &JsValue, this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    match f {
        JsValue::Object(o) => call_function(o, this, args),
        other => Err(JErrorType::TypeError(format!("{} is not a function", other.to_js_string()))),
    }
}
