//! Per-invocation contexts handed to handlers. A context lives for exactly
//! one intercepted call, get or set.

use std::cell::Cell;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{call_function, construct_function};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;

fn arg_at(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or(JsValue::Undefined)
}

fn put_arg(args: &mut Vec<JsValue>, index: usize, value: JsValue) {
    if index >= args.len() {
        args.resize(index + 1, JsValue::Undefined);
    }
    args[index] = value;
}

/// Marks `failed` when an original run from inside a handler raised.
fn track<T>(failed: &Cell<bool>, result: Result<T, JErrorType>) -> Result<T, JErrorType> {
    if result.is_err() {
        failed.set(true);
    }
    result
}

/// Context of an intercepted method call.
pub struct ApplyContext {
    /// Receiver of the call.
    pub this: JsValue,
    /// Arguments; changes made here reach the original on fallthrough.
    pub args: Vec<JsValue>,
    original: JsObjectType,
    returned: Option<JsValue>,
    original_failed: Cell<bool>,
}

impl ApplyContext {
    pub(crate) fn new(original: JsObjectType, this: JsValue, args: Vec<JsValue>) -> Self {
        ApplyContext {
            this,
            args,
            original,
            returned: None,
            original_failed: Cell::new(false),
        }
    }

    /// Calls the original with the current receiver and arguments.
    pub fn call(&self) -> Result<JsValue, JErrorType> {
        track(&self.original_failed, call_function(&self.original, &self.this, self.args.clone()))
    }

    /// Calls the original with an explicit receiver and arguments.
    pub fn call_with(&self, this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        track(&self.original_failed, call_function(&self.original, this, args))
    }

    /// Short-circuits the call: `value` is returned to the caller and the
    /// original is not run.
    pub fn return_value(&mut self, value: JsValue) {
        self.returned = Some(value);
    }

    pub fn has_returned(&self) -> bool {
        self.returned.is_some()
    }

    pub fn arg(&self, index: usize) -> JsValue {
        arg_at(&self.args, index)
    }

    pub fn arg_str(&self, index: usize) -> String {
        self.arg(index).to_js_string()
    }

    pub fn set_arg(&mut self, index: usize, value: JsValue) {
        put_arg(&mut self.args, index, value)
    }

    pub fn original(&self) -> &JsObjectType {
        &self.original
    }

    pub(crate) fn original_failed(&self) -> bool {
        self.original_failed.get()
    }

    pub(crate) fn finish(self) -> Result<JsValue, JErrorType> {
        match self.returned {
            Some(value) => Ok(value),
            None => call_function(&self.original, &self.this, self.args),
        }
    }
}

/// Context of an intercepted `new` expression.
pub struct ConstructContext {
    /// Constructor arguments; changes made here reach the real constructor.
    pub args: Vec<JsValue>,
    original: JsObjectType,
    returned: Option<JsValue>,
    original_failed: Cell<bool>,
}

impl ConstructContext {
    pub(crate) fn new(original: JsObjectType, args: Vec<JsValue>) -> Self {
        ConstructContext {
            args,
            original,
            returned: None,
            original_failed: Cell::new(false),
        }
    }

    /// Runs the real constructor with the current arguments.
    pub fn construct(&self) -> Result<JsValue, JErrorType> {
        track(&self.original_failed, construct_function(&self.original, self.args.clone()))
    }

    pub(crate) fn original_failed(&self) -> bool {
        self.original_failed.get()
    }

    pub fn return_value(&mut self, value: JsValue) {
        self.returned = Some(value);
    }

    pub fn has_returned(&self) -> bool {
        self.returned.is_some()
    }

    pub fn arg(&self, index: usize) -> JsValue {
        arg_at(&self.args, index)
    }

    pub fn set_arg(&mut self, index: usize, value: JsValue) {
        put_arg(&mut self.args, index, value)
    }

    pub(crate) fn finish(self) -> Result<JsValue, JErrorType> {
        match self.returned {
            Some(value) => Ok(value),
            None => construct_function(&self.original, self.args),
        }
    }
}

/// Context of an intercepted property get or set.
pub struct AccessorContext {
    /// Object the property was read from or written to.
    pub this: JsValue,
    getter: Option<JsObjectType>,
    setter: Option<JsObjectType>,
    original_failed: Cell<bool>,
}

impl AccessorContext {
    pub(crate) fn new(this: JsValue, getter: Option<JsObjectType>, setter: Option<JsObjectType>) -> Self {
        AccessorContext {
            this,
            getter,
            setter,
            original_failed: Cell::new(false),
        }
    }

    /// Runs the original getter on `this`. `undefined` when there is none.
    pub fn get(&self) -> Result<JsValue, JErrorType> {
        match &self.getter {
            Some(getter) => track(&self.original_failed, call_function(getter, &self.this, Vec::new())),
            None => Ok(JsValue::Undefined),
        }
    }

    /// Runs the original setter on `this`. A no-op when there is none.
    pub fn set(&self, value: JsValue) -> Result<(), JErrorType> {
        match &self.setter {
            Some(setter) => track(&self.original_failed, call_function(setter, &self.this, vec![value]).map(|_| ())),
            None => Ok(()),
        }
    }

    pub(crate) fn original_failed(&self) -> bool {
        self.original_failed.get()
    }

    pub fn has_original_getter(&self) -> bool {
        self.getter.is_some()
    }
}
