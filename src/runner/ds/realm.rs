use std::fmt;
use std::fmt::{Display, Formatter};

use uuid::Uuid;

use crate::runner::ds::object::{find_property, object_create, JsObjectType};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RealmId(Uuid);

impl RealmId {
    pub fn new() -> Self {
        RealmId(Uuid::new_v4())
    }
}

impl Default for RealmId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RealmId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hyphenated())
    }
}

/// One browsing context's native object graph. Realms never share objects:
/// every frame gets its own global and its own interface objects.
pub struct Realm {
    id: RealmId,
    global: JsObjectType,
}

impl Realm {
    pub fn new() -> Self {
        Realm {
            id: RealmId::new(),
            global: object_create("Window", None),
        }
    }

    pub fn id(&self) -> &RealmId {
        &self.id
    }

    pub fn global(&self) -> &JsObjectType {
        &self.global
    }

    pub fn global_this(&self) -> JsValue {
        JsValue::Object(self.global.clone())
    }

    /// Defines a global binding the way interface objects are exposed:
    /// writable, configurable, not enumerable.
    pub fn define_global(&self, name: &str, value: JsValue) -> bool {
        self.global
            .borrow_mut()
            .define_own_property(PropertyKey::from(name), PropertyDescriptor::hidden(value))
    }

    /// Data value of a global binding, without running any getter.
    pub fn lookup_global(&self, name: &str) -> Option<JsValue> {
        match find_property(&self.global, &PropertyKey::from(name)) {
            Some((_, PropertyDescriptor::Data { value, .. })) => Some(value),
            _ => None,
        }
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}
