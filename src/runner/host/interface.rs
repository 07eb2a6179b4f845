//! Builder for host interfaces: an interface object exposed on the global,
//! its prototype, and the operations and attributes defined on that
//! prototype.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{
    native, native_constructor, new_function_object, new_native_function, NativeConstructFn, NativeFn,
};
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::PropertyDescriptor;
use crate::runner::ds::realm::Realm;
use crate::runner::ds::value::JsValue;

use super::{CONSTRUCTOR_KEY, PROTOTYPE_KEY};

pub struct InterfaceBuilder {
    /// Interface name, also the global binding name.
    name: String,

    /// Interface whose prototype this one's prototype inherits from.
    parent: Option<String>,

    /// Operations on the prototype.
    methods: Vec<(String, NativeFn)>,

    /// Attributes on the prototype: getter and optional setter.
    accessors: Vec<(String, NativeFn, Option<NativeFn>)>,

    /// `[[Construct]]` of the interface object. Without one, `new` throws.
    constructor: Option<NativeConstructFn>,

    /// Named constructors (`Audio`) reuse another interface's prototype
    /// instead of getting their own.
    shared_prototype: Option<String>,
}

impl InterfaceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceBuilder {
            name: name.into(),
            parent: None,
            methods: Vec::new(),
            accessors: Vec::new(),
            constructor: None,
            shared_prototype: None,
        }
    }

    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.methods.push((name.into(), func));
        self
    }

    pub fn add_accessor(mut self, name: impl Into<String>, get: NativeFn, set: Option<NativeFn>) -> Self {
        self.accessors.push((name.into(), get, set));
        self
    }

    pub fn with_constructor(mut self, constructor: NativeConstructFn) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn sharing_prototype_of(mut self, interface: impl Into<String>) -> Self {
        self.shared_prototype = Some(interface.into());
        self
    }

    /// Creates the interface in `realm` and returns its prototype object.
    pub fn install(self, realm: &Realm) -> Result<JsObjectType, JErrorType> {
        let owns_prototype = self.shared_prototype.is_none();
        let proto = match &self.shared_prototype {
            Some(interface) => interface_prototype(realm, interface)?,
            None => {
                let parent_proto = match &self.parent {
                    Some(parent) => Some(interface_prototype(realm, parent)?),
                    None => None,
                };
                object_create(&format!("{}.prototype", self.name), parent_proto)
            }
        };

        for (name, func) in self.methods {
            let f = new_native_function(&name, native(func));
            proto
                .borrow_mut()
                .define_own_property(name.as_str().into(), PropertyDescriptor::data(JsValue::Object(f)));
        }
        for (name, get, set) in self.accessors {
            let getter = new_native_function(&format!("get {}", name), native(get));
            let setter = set.map(|s| new_native_function(&format!("set {}", name), native(s)));
            proto
                .borrow_mut()
                .define_own_property(name.as_str().into(), PropertyDescriptor::accessor(Some(getter), setter));
        }

        let interface_name = self.name.clone();
        let call = native(move |_this, _args| {
            Err(JErrorType::TypeError(format!(
                "Failed to construct '{}': Please use the 'new' operator",
                interface_name
            )))
        });
        let construct = self
            .constructor
            .unwrap_or_else(|| native_constructor(|_args| Err(JErrorType::TypeError("Illegal constructor".to_string()))));
        let interface = new_function_object(&self.name, Some(call), Some(construct));

        interface.borrow_mut().define_own_property(
            PROTOTYPE_KEY.clone(),
            PropertyDescriptor::Data {
                value: JsValue::Object(proto.clone()),
                writable: false,
                enumerable: false,
                configurable: false,
            },
        );
        if owns_prototype {
            proto.borrow_mut().define_own_property(
                CONSTRUCTOR_KEY.clone(),
                PropertyDescriptor::hidden(JsValue::Object(interface.clone())),
            );
        }
        realm.define_global(&self.name, JsValue::Object(interface));
        Ok(proto)
    }
}

/// `prototype` of an interface already installed in `realm`.
pub fn interface_prototype(realm: &Realm, name: &str) -> Result<JsObjectType, JErrorType> {
    let interface = match realm.lookup_global(name) {
        Some(JsValue::Object(o)) => o,
        _ => return Err(JErrorType::ReferenceError(format!("{} is not defined", name))),
    };
    let proto = interface.borrow().get_own_property(&PROTOTYPE_KEY).cloned();
    match proto {
        Some(PropertyDescriptor::Data {
            value: JsValue::Object(p),
            ..
        }) => Ok(p),
        _ => Err(JErrorType::TypeError(format!("{} has no prototype object", name))),
    }
}
