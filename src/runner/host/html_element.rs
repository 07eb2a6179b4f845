//! HTML element interfaces whose attributes carry addresses.

use url::Url;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::native_constructor;
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::realm::Realm;
use crate::runner::ds::value::JsValue;

use super::interface::InterfaceBuilder;
use super::node::{base_uri_of, read_attribute, this_object, write_attribute, BASE_URI_SLOT, LOCAL_NAME_SLOT};

/// Register `HTMLElement` and the address-bearing element interfaces, plus
/// the `Audio` named constructor.
pub fn register(realm: &Realm, document: &JsObjectType) -> Result<(), JErrorType> {
    InterfaceBuilder::new("HTMLElement").inherits("Element").install(realm)?;

    // Anchor and area each get their own accessor functions.
    for name in &["HTMLAnchorElement", "HTMLAreaElement"] {
        InterfaceBuilder::new(*name)
            .inherits("HTMLElement")
            .add_accessor("href", hyperlink_href_get, Some(hyperlink_href_set))
            .add_accessor("protocol", hyperlink_protocol, None)
            .add_accessor("host", hyperlink_host, None)
            .add_accessor("hostname", hyperlink_hostname, None)
            .add_accessor("port", hyperlink_port, None)
            .add_accessor("pathname", hyperlink_pathname, None)
            .add_accessor("search", hyperlink_search, None)
            .add_accessor("hash", hyperlink_hash, None)
            .add_accessor("origin", hyperlink_origin, None)
            .install(realm)?;
    }

    InterfaceBuilder::new("HTMLMediaElement")
        .inherits("HTMLElement")
        .add_accessor("src", media_src_get, Some(media_src_set))
        .install(realm)?;
    let audio_proto = InterfaceBuilder::new("HTMLAudioElement")
        .inherits("HTMLMediaElement")
        .install(realm)?;

    install_audio_constructor(realm, document, audio_proto)
}

/// `new Audio(src?)`: an `audio` element with `preload="auto"` and, when
/// given, a `src` attribute.
fn install_audio_constructor(realm: &Realm, document: &JsObjectType, audio_proto: JsObjectType) -> Result<(), JErrorType> {
    let document = document.clone();
    let construct = native_constructor(move |args| {
        let element = new_element(&audio_proto, "audio", &base_uri_of(&document));
        write_attribute(&element, "preload", "auto");
        if let Some(src) = args.first() {
            if !src.is_undefined() {
                write_attribute(&element, "src", &src.to_js_string());
            }
        }
        Ok(JsValue::Object(element))
    });
    InterfaceBuilder::new("Audio")
        .sharing_prototype_of("HTMLAudioElement")
        .with_constructor(construct)
        .install(realm)?;
    Ok(())
}

/// Interface name backing a tag, for the tags this host knows.
pub fn interface_for_tag(tag: &str) -> &'static str {
    match tag {
        "a" => "HTMLAnchorElement",
        "area" => "HTMLAreaElement",
        "audio" => "HTMLAudioElement",
        _ => "HTMLElement",
    }
}

pub fn new_element(proto: &JsObjectType, tag: &str, base_uri: &str) -> JsObjectType {
    let class_name = proto
        .borrow()
        .class_name()
        .trim_end_matches(".prototype")
        .to_string();
    let element = object_create(&class_name, Some(proto.clone()));
    {
        let mut e = element.borrow_mut();
        e.set_internal_slot(LOCAL_NAME_SLOT, JsValue::from(tag));
        e.set_internal_slot(BASE_URI_SLOT, JsValue::from(base_uri));
    }
    element
}

/// Value of an address attribute resolved against the element's base URL.
/// Unresolvable values come back as written; a missing attribute is `""`.
fn resolved_attribute(element: &JsObjectType, name: &str) -> String {
    let raw = match read_attribute(element, name) {
        Some(raw) => raw,
        None => return String::new(),
    };
    match Url::parse(&base_uri_of(element)).and_then(|base| base.join(&raw)) {
        Ok(url) => url.to_string(),
        Err(_) => raw,
    }
}

fn hyperlink_url(this: &JsValue) -> Result<Option<Url>, JErrorType> {
    let element = this_object(this)?;
    let href = resolved_attribute(&element, "href");
    Ok(Url::parse(&href).ok())
}

fn hyperlink_href_get(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let element = this_object(this)?;
    Ok(JsValue::from(resolved_attribute(&element, "href")))
}

fn hyperlink_href_set(this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let element = this_object(this)?;
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    write_attribute(&element, "href", &value.to_js_string());
    Ok(JsValue::Undefined)
}

fn url_part(this: &JsValue, part: fn(&Url) -> String) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from(hyperlink_url(this)?.map(|u| part(&u)).unwrap_or_default()))
}

fn with_prefix(prefix: &str, s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("{}{}", prefix, s)
    }
}

fn host_of(u: &Url) -> String {
    match (u.host_str(), u.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

fn hyperlink_protocol(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, |u| format!("{}:", u.scheme()))
}

fn hyperlink_host(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, host_of)
}

fn hyperlink_hostname(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, |u| u.host_str().unwrap_or_default().to_string())
}

fn hyperlink_port(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, |u| u.port().map(|p| p.to_string()).unwrap_or_default())
}

fn hyperlink_pathname(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, |u| u.path().to_string())
}

fn hyperlink_search(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, |u| with_prefix("?", u.query().unwrap_or_default()))
}

fn hyperlink_hash(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, |u| with_prefix("#", u.fragment().unwrap_or_default()))
}

fn hyperlink_origin(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    url_part(this, |u| u.origin().ascii_serialization())
}

fn media_src_get(this: &JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let element = this_object(this)?;
    Ok(JsValue::from(resolved_attribute(&element, "src")))
}

fn media_src_set(this: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let element = this_object(this)?;
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    write_attribute(&element, "src", &value.to_js_string());
    Ok(JsValue::Undefined)
}
