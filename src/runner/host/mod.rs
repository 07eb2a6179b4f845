//! DOM-shaped native interfaces for a realm.
//!
//! This is the native surface overrides get installed on: `Node`,
//! `Element`, `HTMLElement`, `HTMLAnchorElement`, `HTMLAreaElement`,
//! `HTMLMediaElement`, `HTMLAudioElement`, the `Audio` constructor and a
//! `document` with `createElement`. It is not a DOM implementation; there is
//! no tree, only elements with attributes and a base URL.

pub mod document;
pub mod html_element;
pub mod interface;
pub mod node;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{call_value, construct_function};
use crate::runner::ds::object::{get, get_named, JsObjectType};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::realm::Realm;
use crate::runner::ds::value::JsValue;

lazy_static! {
    pub static ref PROTOTYPE_KEY: PropertyKey = PropertyKey::Str("prototype".to_string());
    pub static ref CONSTRUCTOR_KEY: PropertyKey = PropertyKey::Str("constructor".to_string());
    static ref DOCUMENT_KEY: PropertyKey = PropertyKey::Str("document".to_string());
}

/// Install every host interface into `realm`, with `document_url` as the
/// document's address. Returns the document.
pub fn install_host_interfaces(realm: &Realm, document_url: &str) -> Result<JsObjectType, JErrorType> {
    node::register(realm)?;
    let document = document::create(realm, document_url)?;
    html_element::register(realm, &document)?;
    document::add_create_element(realm, &document)?;
    Ok(document)
}

/// `document.createElement(tag)` as page code would run it, so overrides on
/// the way are observed.
pub fn create_element(realm: &Realm, tag: &str) -> Result<JsObjectType, JErrorType> {
    let global = realm.global();
    let document = get(global, &DOCUMENT_KEY, &realm.global_this())?;
    let document = match document {
        JsValue::Object(d) => d,
        _ => return Err(JErrorType::ReferenceError("document is not defined".to_string())),
    };
    match call_method(&document, "createElement", vec![JsValue::from(tag)])? {
        JsValue::Object(element) => Ok(element),
        other => Err(JErrorType::TypeError(format!(
            "createElement returned {}",
            other.to_js_string()
        ))),
    }
}

/// `new <name>(...args)` against the realm's current global binding.
pub fn construct_global(realm: &Realm, name: &str, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    match get_named(realm.global(), name)? {
        JsValue::Object(constructor) => construct_function(&constructor, args),
        _ => Err(JErrorType::ReferenceError(format!("{} is not defined", name))),
    }
}

/// `receiver.name(...args)`.
pub fn call_method(receiver: &JsObjectType, name: &str, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let this = JsValue::Object(receiver.clone());
    let method = get(receiver, &PropertyKey::from(name), &this)?;
    call_value(&method, &this, args)
}
