//! The realm's `document`.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{native, new_native_function};
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::PropertyDescriptor;
use crate::runner::ds::realm::{Realm, RealmId};
use crate::runner::ds::value::JsValue;

use super::html_element::{interface_for_tag, new_element};
use super::interface::interface_prototype;
use super::node::{base_uri_of, BASE_URI_SLOT};

pub const URL_SLOT: &str = "URL";

/// Create `document` with `document_url` as its address and base URL.
/// `Node` must already be installed.
pub fn create(realm: &Realm, document_url: &str) -> Result<JsObjectType, JErrorType> {
    let node_proto = interface_prototype(realm, "Node")?;
    let document = object_create("HTMLDocument", Some(node_proto));
    {
        let mut d = document.borrow_mut();
        d.set_internal_slot(URL_SLOT, JsValue::from(document_url));
        d.set_internal_slot(BASE_URI_SLOT, JsValue::from(document_url));
    }
    realm.define_global("document", JsValue::Object(document.clone()));
    Ok(document)
}

/// Adds `document.createElement`. The element interfaces must already be
/// installed; their prototypes are captured here.
pub fn add_create_element(realm: &Realm, document: &JsObjectType) -> Result<(), JErrorType> {
    let mut protos: Vec<(&'static str, JsObjectType)> = Vec::new();
    for name in &["HTMLElement", "HTMLAnchorElement", "HTMLAreaElement", "HTMLAudioElement"] {
        protos.push((*name, interface_prototype(realm, name)?));
    }
    let realm_id: RealmId = realm.id().clone();

    let create_element = new_native_function(
        "createElement",
        native(move |this, args| {
            let doc = match this {
                JsValue::Object(o) => o.clone(),
                _ => return Err(JErrorType::TypeError("Illegal invocation".to_string())),
            };
            let tag = match args.first() {
                Some(v) if !v.is_undefined() => v.to_js_string().to_ascii_lowercase(),
                _ => {
                    return Err(JErrorType::TypeError(
                        "Failed to execute 'createElement' on 'Document': 1 argument required, but only 0 present."
                            .to_string(),
                    ))
                }
            };
            let interface = interface_for_tag(&tag);
            let proto = protos
                .iter()
                .find(|(name, _)| *name == interface)
                .map(|(_, p)| p.clone())
                .ok_or_else(|| JErrorType::ReferenceError(format!("{} is not defined in realm {}", interface, realm_id)))?;
            Ok(JsValue::Object(new_element(&proto, &tag, &base_uri_of(&doc))))
        }),
    );
    document.borrow_mut().define_own_property(
        "createElement".into(),
        PropertyDescriptor::data(JsValue::Object(create_element)),
    );
    Ok(())
}
