//! Registration of handler sets against native members of one realm.

use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use super::context::{AccessorContext, ApplyContext, ConstructContext};
use super::descriptor_cache::{CacheEntry, CapturedMember, DescriptorCache, TargetKey};
use super::types::{AccessorHandlers, ApplyHandler, ConstructHandler, HandlerSet, OverrideKind, SetOutcome};
use crate::parser::TargetPath;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::{
    call_function, construct_function, function_name, native, native_constructor, new_function_object, new_native_function,
};
use crate::runner::ds::object::{get, JsObjectType};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::realm::Realm;
use crate::runner::ds::value::JsValue;

#[derive(Debug, Error, PartialEq)]
pub enum HookError {
    /// A target that cannot be intercepted: bad path, missing object or
    /// member, or a member of the wrong shape.
    #[error("cannot intercept `{target}`: {reason}")]
    Configuration { target: String, reason: String },
    /// Raised by a captured native run through the registry.
    #[error(transparent)]
    Js(#[from] JErrorType),
}

fn config_error(target: &str, reason: impl Into<String>) -> HookError {
    HookError::Configuration {
        target: target.to_string(),
        reason: reason.into(),
    }
}

/// Installs overrides into one realm and remembers what they replaced.
pub struct InterceptionRegistry {
    realm: Rc<Realm>,
    cache: DescriptorCache,
}

impl InterceptionRegistry {
    pub fn new(realm: Rc<Realm>) -> Self {
        InterceptionRegistry {
            realm,
            cache: DescriptorCache::new(),
        }
    }

    pub fn realm(&self) -> &Rc<Realm> {
        &self.realm
    }

    /// Registers `handlers` on every target path. Stops at the first target
    /// that cannot be intercepted; the ones before it stay registered.
    /// Registering an already intercepted target does nothing.
    pub fn register<'a, I>(&self, targets: I, handlers: &HandlerSet) -> Result<(), HookError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for target in targets {
            let (path, holder) = self.resolve(target)?;
            let member = PropertyKey::from(path.member());
            self.install(&path.to_string(), holder, member, handlers)?;
        }
        Ok(())
    }

    /// Installs an accessor trap directly on `holder`. Unlike path targets
    /// the member may be missing; its original then reads as `undefined`
    /// and ignores writes.
    pub fn register_raw(&self, holder: &JsObjectType, member: &str, handlers: &AccessorHandlers) -> Result<(), HookError> {
        let label = format!("{}.{}", holder.borrow().class_name(), member);
        self.install(
            &label,
            holder.clone(),
            PropertyKey::from(member),
            &HandlerSet::RawAccessor(handlers.clone()),
        )
    }

    pub fn is_registered(&self, target: &str) -> bool {
        match self.resolve(target) {
            Ok((path, holder)) => self
                .cache
                .contains(&TargetKey::new(&holder, &PropertyKey::from(path.member()))),
            Err(_) => false,
        }
    }

    pub fn registered_count(&self) -> usize {
        self.cache.len()
    }

    /// Labels of intercepted targets, sorted.
    pub fn registered_targets(&self) -> Vec<String> {
        self.cache.labels()
    }

    /// Runs the pre-interception getter of `target` against `receiver`. For
    /// a target that is not intercepted the current getter is used.
    pub fn original_get(&self, target: &str, receiver: &JsValue) -> Result<JsValue, HookError> {
        let (path, holder) = self.resolve(target)?;
        let member = PropertyKey::from(path.member());
        if let Some(entry) = self.cache.get(&TargetKey::new(&holder, &member)) {
            return Ok(match &entry.original {
                CapturedMember::Accessor { get: Some(getter), .. } => call_function(getter, receiver, Vec::new())?,
                CapturedMember::Accessor { get: None, .. } | CapturedMember::Absent => JsValue::Undefined,
                CapturedMember::Method(f) | CapturedMember::Constructor(f) => JsValue::Object(f.clone()),
            });
        }
        let current = holder.borrow().get_own_property(&member).cloned();
        Ok(match current {
            Some(PropertyDescriptor::Accessor { get: Some(getter), .. }) => call_function(&getter, receiver, Vec::new())?,
            Some(PropertyDescriptor::Data { value, .. }) => value,
            _ => JsValue::Undefined,
        })
    }

    /// Calls the pre-interception implementation of a method target,
    /// bypassing every handler.
    pub fn call_native(&self, target: &str, receiver: &JsValue, args: Vec<JsValue>) -> Result<JsValue, HookError> {
        let (path, holder) = self.resolve(target)?;
        let member = PropertyKey::from(path.member());
        let function = match self.cache.get(&TargetKey::new(&holder, &member)) {
            Some(entry) => match entry.original.function() {
                Some(f) => f.clone(),
                None => return Err(config_error(target, "intercepted member is not callable")),
            },
            None => match get(&holder, &member, &JsValue::Object(holder.clone()))? {
                JsValue::Object(f) => f,
                other => {
                    return Err(config_error(
                        target,
                        format!("member is {}, not a function", other.to_js_string()),
                    ))
                }
            },
        };
        Ok(call_function(&function, receiver, args)?)
    }

    /// Parses `target` and walks every segment but the last from the global
    /// object, returning the holder of the member.
    fn resolve(&self, target: &str) -> Result<(TargetPath, JsObjectType), HookError> {
        let path = TargetPath::parse(target).map_err(|reason| config_error(target, reason))?;
        let mut holder = self.realm.global().clone();
        for segment in path.holder_segments() {
            let receiver = JsValue::Object(holder.clone());
            let next = get(&holder, &PropertyKey::from(segment.as_str()), &receiver)
                .map_err(|e| config_error(target, format!("reading `{}` raised {}", segment, e)))?;
            holder = match next {
                JsValue::Object(o) => o,
                JsValue::Undefined => return Err(config_error(target, format!("`{}` does not exist", segment))),
                other => {
                    return Err(config_error(
                        target,
                        format!("`{}` is {}, not an object", segment, other.to_js_string()),
                    ))
                }
            };
        }
        Ok((path, holder))
    }

    fn install(&self, label: &str, holder: JsObjectType, member: PropertyKey, handlers: &HandlerSet) -> Result<(), HookError> {
        let kind = handlers.kind();
        let key = TargetKey::new(&holder, &member);
        if self.cache.contains(&key) {
            trace!(realm = %self.realm.id(), target = %label, kind = %kind, "already intercepted, ignoring");
            return Ok(());
        }

        let (descriptor, extensible) = {
            let h = holder.borrow();
            (h.get_own_property(&member).cloned(), h.is_extensible())
        };
        let original = capture_original(label, &descriptor, kind, extensible)?;

        let entry = self.cache.capture(
            key,
            CacheEntry {
                label: label.to_string(),
                kind,
                holder: holder.clone(),
                member: member.clone(),
                original,
                descriptor: descriptor.clone(),
            },
        );

        let replacement = match handlers {
            HandlerSet::Method(handler) => method_replacement(&entry, handler, &descriptor),
            HandlerSet::Constructor(handler) => constructor_replacement(&entry, handler, &descriptor),
            HandlerSet::Accessor(handlers) | HandlerSet::RawAccessor(handlers) => {
                accessor_replacement(&entry, handlers, &descriptor)
            }
        };
        if !holder.borrow_mut().define_own_property(member, replacement) {
            // Shape and extensibility were checked by capture_original.
            return Err(config_error(label, "holder refused the replacement"));
        }
        debug!(realm = %self.realm.id(), target = %label, kind = %kind, "installed override");
        Ok(())
    }
}

/// Checks that the member's current shape fits `kind` and extracts what has
/// to be remembered about it.
fn capture_original(
    label: &str,
    descriptor: &Option<PropertyDescriptor>,
    kind: OverrideKind,
    extensible: bool,
) -> Result<CapturedMember, HookError> {
    let descriptor = match descriptor {
        Some(d) => d,
        None if kind == OverrideKind::RawAccessor && extensible => return Ok(CapturedMember::Absent),
        None if kind == OverrideKind::RawAccessor => {
            return Err(config_error(label, "member is missing and the holder is not extensible"))
        }
        None => return Err(config_error(label, "member does not exist")),
    };
    if !descriptor.is_configurable() {
        return Err(config_error(label, "member is not configurable"));
    }
    match (kind, descriptor) {
        (OverrideKind::Accessor, PropertyDescriptor::Accessor { get, set, .. })
        | (OverrideKind::RawAccessor, PropertyDescriptor::Accessor { get, set, .. }) => Ok(CapturedMember::Accessor {
            get: get.clone(),
            set: set.clone(),
        }),
        (OverrideKind::Accessor, _) | (OverrideKind::RawAccessor, _) => {
            Err(config_error(label, "member is a data property, not an accessor"))
        }
        (OverrideKind::Method, PropertyDescriptor::Data { value: JsValue::Object(f), .. }) if f.borrow().is_callable() => {
            Ok(CapturedMember::Method(f.clone()))
        }
        (OverrideKind::Method, _) => Err(config_error(label, "member is not a method")),
        (OverrideKind::Constructor, PropertyDescriptor::Data { value: JsValue::Object(f), .. })
            if f.borrow().is_constructor() =>
        {
            Ok(CapturedMember::Constructor(f.clone()))
        }
        (OverrideKind::Constructor, _) => Err(config_error(label, "member is not a constructor")),
    }
}

fn method_replacement(entry: &Rc<CacheEntry>, handler: &ApplyHandler, descriptor: &Option<PropertyDescriptor>) -> PropertyDescriptor {
    let name = entry.original.function().map(function_name).unwrap_or_default();
    let (entry_c, handler_c) = (entry.clone(), handler.clone());
    let replacement = new_native_function(
        &name,
        native(move |this, args| {
            let original = match entry_c.original.function() {
                Some(f) => f.clone(),
                None => return Err(JErrorType::TypeError(format!("{} is not a function", entry_c.label))),
            };
            let mut ctx = ApplyContext::new(original.clone(), this.clone(), args.clone());
            match handler_c(&mut ctx) {
                Ok(()) => ctx.finish(),
                Err(e) if ctx.original_failed() => Err(e),
                Err(e) => {
                    debug!(target = %entry_c.label, error = %e, "handler failed, running the original");
                    call_function(&original, this, args)
                }
            }
        }),
    );
    replace_value(descriptor, replacement)
}

fn constructor_replacement(
    entry: &Rc<CacheEntry>,
    handler: &ConstructHandler,
    descriptor: &Option<PropertyDescriptor>,
) -> PropertyDescriptor {
    let original = match entry.original.function() {
        Some(f) => f.clone(),
        None => return descriptor.clone().unwrap_or_else(|| PropertyDescriptor::hidden(JsValue::Undefined)),
    };
    let name = function_name(&original);

    // Calling without `new` keeps whatever the original does.
    let call_target = original.clone();
    let call = native(move |this, args| call_function(&call_target, this, args));

    let (entry_c, handler_c) = (entry.clone(), handler.clone());
    let construct = native_constructor(move |args| {
        let original = match entry_c.original.function() {
            Some(f) => f.clone(),
            None => return Err(JErrorType::TypeError(format!("{} is not a constructor", entry_c.label))),
        };
        let mut ctx = ConstructContext::new(original.clone(), args.clone());
        match handler_c(&mut ctx) {
            Ok(()) => ctx.finish(),
            Err(e) if ctx.original_failed() => Err(e),
            Err(e) => {
                debug!(target = %entry_c.label, error = %e, "handler failed, running the original");
                construct_function(&original, args)
            }
        }
    });

    let replacement = new_function_object(&name, Some(call), Some(construct));
    let mut own: Vec<(PropertyKey, PropertyDescriptor)> = Vec::new();
    {
        let o = original.borrow();
        for k in o.own_property_keys() {
            if let Some(d) = o.get_own_property(&k) {
                if d.is_data_descriptor() {
                    own.push((k.clone(), d.clone()));
                }
            }
        }
    }
    {
        let mut r = replacement.borrow_mut();
        for (k, d) in own {
            r.define_own_property(k, d);
        }
    }
    replace_value(descriptor, replacement)
}

fn accessor_replacement(
    entry: &Rc<CacheEntry>,
    handlers: &AccessorHandlers,
    descriptor: &Option<PropertyDescriptor>,
) -> PropertyDescriptor {
    let member = entry.member.to_string();

    let get = match &handlers.get {
        Some(handler) => {
            let (entry_c, handler_c) = (entry.clone(), handler.clone());
            Some(new_native_function(
                &format!("get {}", member),
                native(move |this, _args| {
                    let ctx = AccessorContext::new(this.clone(), entry_c.original.getter(), entry_c.original.setter());
                    match handler_c(&ctx) {
                        Ok(Some(value)) => Ok(value),
                        Ok(None) => ctx.get(),
                        Err(e) if ctx.original_failed() => Err(e),
                        Err(e) => {
                            debug!(target = %entry_c.label, error = %e, "get handler failed, running the original");
                            ctx.get()
                        }
                    }
                }),
            ))
        }
        None => entry.original.getter(),
    };

    let set = match &handlers.set {
        Some(handler) => {
            let (entry_c, handler_c) = (entry.clone(), handler.clone());
            Some(new_native_function(
                &format!("set {}", member),
                native(move |this, args| {
                    let ctx = AccessorContext::new(this.clone(), entry_c.original.getter(), entry_c.original.setter());
                    let value = args.into_iter().next().unwrap_or(JsValue::Undefined);
                    match handler_c(&ctx, value.clone()) {
                        Ok(SetOutcome::Fallthrough) => ctx.set(value)?,
                        Ok(SetOutcome::Handled) | Ok(SetOutcome::Suppress) => {}
                        Err(e) if ctx.original_failed() => return Err(e),
                        Err(e) => {
                            debug!(target = %entry_c.label, error = %e, "set handler failed, running the original");
                            ctx.set(value)?
                        }
                    }
                    Ok(JsValue::Undefined)
                }),
            ))
        }
        None => entry.original.setter(),
    };

    let enumerable = descriptor.as_ref().map(|d| d.is_enumerable()).unwrap_or(true);
    PropertyDescriptor::Accessor {
        get,
        set,
        enumerable,
        configurable: true,
    }
}

/// The intercepted descriptor with `replacement` as its value.
fn replace_value(descriptor: &Option<PropertyDescriptor>, replacement: JsObjectType) -> PropertyDescriptor {
    let value = JsValue::Object(replacement);
    match descriptor {
        Some(d) => d.with_value(value),
        None => PropertyDescriptor::hidden(value),
    }
}
