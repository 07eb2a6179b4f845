//! `Node` and `Element`.
//!
//! Attributes live in internal slots named `attr:<name>`, so their order is
//! insertion order and page code cannot reach them except through the
//! attribute operations.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{array_create, JsObjectType};
use crate::runner::ds::realm::Realm;
use crate::runner::ds::value::JsValue;

use super::interface::InterfaceBuilder;

pub const ATTR_SLOT_PREFIX: &str = "attr:";
pub const BASE_URI_SLOT: &str = "baseURI";
pub const LOCAL_NAME_SLOT: &str = "localName";

const DEFAULT_BASE_URI: &str = "about:blank";

/// Register `Node` and `Element` in `realm`.
pub fn register(realm: &Realm) -> Result<(), JErrorType> {
    InterfaceBuilder::new("Node")
        .add_accessor("baseURI", node_base_uri, None)
        .install(realm)?;

    InterfaceBuilder::new("Element")
        .inherits("Node")
        .add_accessor("tagName", element_tag_name, None)
        .add_method("getAttribute", element_get_attribute)
        .add_method("setAttribute", element_set_attribute)
        .add_method("hasAttribute", element_has_attribute)
        .add_method("removeAttribute", element_remove_attribute)
        .add_method("getAttributeNames", element_get_attribute_names)
        .install(realm)?;
    Ok(())
}

/// The receiver as an object, or the `TypeError` a host would raise.
pub(crate) fn this_object(this: &JsValue) -> Result<JsObjectType, JErrorType> {
    match this {
        JsValue::Object(o) => Ok(o.clone()),
        _ => Err(JErrorType::TypeError("Illegal invocation".to_string())),
    }
}

fn attr_slot(name: &str) -> String {
    format!("{}{}", ATTR_SLOT_PREFIX, name.to_ascii_lowercase())
}

fn require_args(operation: &str, args: &[JsValue], required: usize) -> Result<(), JErrorType> {
    if args.len() < required {
        return Err(JErrorType::TypeError(format!(
            "Failed to execute '{}' on 'Element': {} argument{} required, but only {} present.",
            operation,
            required,
            if required == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

/// Attribute value read straight from the element's slots.
pub fn read_attribute(element: &JsObjectType, name: &str) -> Option<String> {
    element
        .borrow()
        .internal_slot(&attr_slot(name))
        .map(|v| v.to_js_string())
}

pub fn write_attribute(element: &JsObjectType, name: &str, value: &str) {
    element
        .borrow_mut()
        .set_internal_slot(&attr_slot(name), JsValue::from(value));
}

pub fn base_uri_of(node: &JsObjectType) -> String {
    node.borrow()
        .internal_slot(BASE_URI_SLOT)
        .map(|v| v.to_js_string())
        .unwrap_or_else(|| DEFAULT_BASE_URI.to_string())
}

fn node_base_uri(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let node = this_object(this)?;
    Ok(JsValue::from(base_uri_of(&node)))
}

fn element_tag_name(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let element = this_object(this)?;
    let local_name = element
        .borrow()
        .internal_slot(LOCAL_NAME_SLOT)
        .map(|v| v.to_js_string())
        .unwrap_or_default();
    Ok(JsValue::from(local_name.to_ascii_uppercase()))
}

fn element_get_attribute(this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    require_args("getAttribute", &args, 1)?;
    let element = this_object(this)?;
    Ok(match read_attribute(&element, &args[0].to_js_string()) {
        Some(value) => JsValue::from(value),
        None => JsValue::Null,
    })
}

fn element_set_attribute(this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    require_args("setAttribute", &args, 2)?;
    let element = this_object(this)?;
    write_attribute(&element, &args[0].to_js_string(), &args[1].to_js_string());
    Ok(JsValue::Undefined)
}

fn element_has_attribute(this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    require_args("hasAttribute", &args, 1)?;
    let element = this_object(this)?;
    Ok(JsValue::Boolean(read_attribute(&element, &args[0].to_js_string()).is_some()))
}

fn element_remove_attribute(this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    require_args("removeAttribute", &args, 1)?;
    let element = this_object(this)?;
    element
        .borrow_mut()
        .remove_internal_slot(&attr_slot(&args[0].to_js_string()));
    Ok(JsValue::Undefined)
}

fn element_get_attribute_names(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let element = this_object(this)?;
    let names: Vec<JsValue> = element
        .borrow()
        .internal_slot_names()
        .into_iter()
        .filter_map(|slot| slot.strip_prefix(ATTR_SLOT_PREFIX))
        .map(JsValue::from)
        .collect();
    Ok(JsValue::Object(array_create(names)))
}
