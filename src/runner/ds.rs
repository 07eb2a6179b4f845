//! Realm-scoped object model: values, objects, property descriptors,
//! native function objects and the realm that owns them.

pub mod error;
pub mod function_object;
pub mod object;
pub mod object_property;
pub mod realm;
pub mod value;
