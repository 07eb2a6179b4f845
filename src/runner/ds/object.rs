use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{call_function, FunctionObjectBase};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::value::JsValue;

pub type JsObjectType = Rc<RefCell<JsObject>>;

pub enum ObjectType {
    Ordinary,
    Function(FunctionObjectBase),
    Array(Vec<JsValue>),
}

pub struct ObjectBase {
    properties: HashMap<PropertyKey, PropertyDescriptor>,
    is_extensible: bool,
    prototype: Option<JsObjectType>,
}
impl ObjectBase {
    pub fn new(prototype: Option<JsObjectType>) -> Self {
        ObjectBase {
            properties: HashMap::new(),
            is_extensible: true,
            prototype,
        }
    }
}

/// A host object. Besides its property table it carries internal slots:
/// named, ordered storage that natives use and page code cannot see.
pub struct JsObject {
    class_name: String,
    object_base: ObjectBase,
    internal_slots: Vec<(String, JsValue)>,
    kind: ObjectType,
}

impl JsObject {
    pub fn new(class_name: impl Into<String>, prototype: Option<JsObjectType>, kind: ObjectType) -> Self {
        JsObject {
            class_name: class_name.into(),
            object_base: ObjectBase::new(prototype),
            internal_slots: Vec::new(),
            kind,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn kind(&self) -> &ObjectType {
        &self.kind
    }

    pub fn as_function(&self) -> Option<&FunctionObjectBase> {
        match &self.kind {
            ObjectType::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.as_function().map(|f| f.call.is_some()).unwrap_or(false)
    }

    pub fn is_constructor(&self) -> bool {
        self.as_function()
            .map(|f| f.construct.is_some())
            .unwrap_or(false)
    }

    pub fn array_values(&self) -> Option<&[JsValue]> {
        match &self.kind {
            ObjectType::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn get_prototype_of(&self) -> Option<JsObjectType> {
        self.object_base.prototype.clone()
    }

    /// Replaces the prototype. Refuses non-extensible objects; cycle checks
    /// are done by [`set_prototype_of`] which can see the object's own `Rc`.
    fn replace_prototype(&mut self, prototype: Option<JsObjectType>) -> bool {
        if !self.object_base.is_extensible {
            return false;
        }
        self.object_base.prototype = prototype;
        true
    }

    pub fn is_extensible(&self) -> bool {
        self.object_base.is_extensible
    }

    pub fn prevent_extensions(&mut self) -> bool {
        self.object_base.is_extensible = false;
        true
    }

    pub fn get_own_property(&self, property: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.object_base.properties.get(property)
    }

    /// Installs `descriptor` under `property`. An existing non-configurable
    /// property is never replaced, and a non-extensible object gets no new
    /// properties.
    pub fn define_own_property(&mut self, property: PropertyKey, descriptor: PropertyDescriptor) -> bool {
        match self.object_base.properties.get(&property) {
            Some(current) if !current.is_configurable() => {
                // Only a value update on a writable data property is allowed.
                match (current, &descriptor) {
                    (
                        PropertyDescriptor::Data { writable: true, .. },
                        PropertyDescriptor::Data { .. },
                    ) => {
                        let updated = current.with_value(descriptor.value().cloned().unwrap_or(JsValue::Undefined));
                        self.object_base.properties.insert(property, updated);
                        true
                    }
                    _ => false,
                }
            }
            Some(_) => {
                self.object_base.properties.insert(property, descriptor);
                true
            }
            None => {
                if self.is_extensible() {
                    self.object_base.properties.insert(property, descriptor);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Integer keys ascending, then string keys in lexical order.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut keys: Vec<PropertyKey> = self.object_base.properties.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn internal_slot(&self, name: &str) -> Option<&JsValue> {
        self.internal_slots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn set_internal_slot(&mut self, name: &str, value: JsValue) {
        match self.internal_slots.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.internal_slots.push((name.to_string(), value)),
        }
    }

    pub fn remove_internal_slot(&mut self, name: &str) -> Option<JsValue> {
        let idx = self.internal_slots.iter().position(|(n, _)| n == name)?;
        Some(self.internal_slots.remove(idx).1)
    }

    /// Slot names in insertion order.
    pub fn internal_slot_names(&self) -> Vec<&str> {
        self.internal_slots.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]", self.class_name)
    }
}

pub fn object_create(class_name: &str, prototype: Option<JsObjectType>) -> JsObjectType {
    Rc::new(RefCell::new(JsObject::new(class_name, prototype, ObjectType::Ordinary)))
}

pub fn array_create(values: Vec<JsValue>) -> JsObjectType {
    Rc::new(RefCell::new(JsObject::new("Array", None, ObjectType::Array(values))))
}

pub fn same_object(a: &JsObjectType, b: &JsObjectType) -> bool {
    Rc::ptr_eq(a, b)
}

/// Sets the prototype of `o`, refusing to create a circular chain.
pub fn set_prototype_of(o: &JsObjectType, prototype: Option<JsObjectType>) -> bool {
    let mut p = prototype.clone();
    while let Some(some_p) = p {
        if same_object(&some_p, o) {
            // To prevent circular chain
            return false;
        }
        p = (*some_p).borrow().get_prototype_of();
    }
    o.borrow_mut().replace_prototype(prototype)
}

/// Walks the prototype chain for `property`, returning the object that owns
/// it together with a copy of its descriptor. No borrow outlives the call.
pub fn find_property(o: &JsObjectType, property: &PropertyKey) -> Option<(JsObjectType, PropertyDescriptor)> {
    let mut current = Some(o.clone());
    while let Some(obj) = current {
        let (found, next) = {
            let borrowed = (*obj).borrow();
            (
                borrowed.get_own_property(property).cloned(),
                borrowed.get_prototype_of(),
            )
        };
        if let Some(pd) = found {
            return Some((obj, pd));
        }
        current = next;
    }
    None
}

/// `[[Get]]`: data properties yield their value, accessors run their getter
/// with `receiver` as `this`.
pub fn get(o: &JsObjectType, property: &PropertyKey, receiver: &JsValue) -> Result<JsValue, JErrorType> {
    match find_property(o, property) {
        None => Ok(JsValue::Undefined),
        Some((_, pd)) => match pd {
            PropertyDescriptor::Data { value, .. } => Ok(value),
            PropertyDescriptor::Accessor { get, .. } => match get {
                None => Ok(JsValue::Undefined),
                Some(getter) => call_function(&getter, receiver, Vec::new()),
            },
        },
    }
}

/// `[[Set]]`. Returns `Ok(false)` when the assignment is silently refused
/// (read-only data property, accessor without setter, non-object receiver).
pub fn set(o: &JsObjectType, property: PropertyKey, value: JsValue, receiver: &JsValue) -> Result<bool, JErrorType> {
    match find_property(o, &property) {
        Some((_, PropertyDescriptor::Accessor { set, .. })) => match set {
            None => Ok(false),
            Some(setter) => {
                call_function(&setter, receiver, vec![value])?;
                Ok(true)
            }
        },
        Some((_, PropertyDescriptor::Data { writable: false, .. })) => Ok(false),
        _ => match receiver {
            JsValue::Object(target) => {
                let mut target = target.borrow_mut();
                let descriptor = match target.get_own_property(&property) {
                    Some(PropertyDescriptor::Accessor { .. }) => return Ok(false),
                    Some(existing) => existing.with_value(value),
                    None => PropertyDescriptor::data(value),
                };
                Ok(target.define_own_property(property, descriptor))
            }
            _ => Ok(false),
        },
    }
}

/// Convenience `[[Get]]` with the object itself as receiver.
pub fn get_named(o: &JsObjectType, name: &str) -> Result<JsValue, JErrorType> {
    get(o, &PropertyKey::from(name), &JsValue::Object(o.clone()))
}

/// Convenience `[[Set]]` with the object itself as receiver.
pub fn set_named(o: &JsObjectType, name: &str, value: JsValue) -> Result<bool, JErrorType> {
    set(o, PropertyKey::from(name), value, &JsValue::Object(o.clone()))
}
