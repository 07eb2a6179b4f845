//! Tests for the interception registry.
//!
//! These tests install overrides into host realms and check what page code
//! observes through the replaced members.

extern crate trapdoor;

use std::cell::Cell;
use std::rc::Rc;

use trapdoor::runner::ds::error::JErrorType;
use trapdoor::runner::ds::function_object::{call_value, native, new_native_function};
use trapdoor::runner::ds::object::{get_named, object_create, same_object, set_named, JsObjectType};
use trapdoor::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use trapdoor::runner::ds::realm::Realm;
use trapdoor::runner::ds::value::JsValue;
use trapdoor::runner::hook::{AccessorHandlers, HandlerSet, HookError, InterceptionRegistry, SetOutcome};
use trapdoor::runner::host::{call_method, construct_global, create_element, install_host_interfaces};

fn setup() -> (Rc<Realm>, InterceptionRegistry) {
    let realm = Rc::new(Realm::new());
    install_host_interfaces(&realm, "https://site.test/dir/").unwrap();
    let registry = InterceptionRegistry::new(realm.clone());
    (realm, registry)
}

/// Global `counter` whose `bump` method counts its calls and echoes its
/// first argument.
fn install_counter(realm: &Realm) -> Rc<Cell<u32>> {
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let bump = new_native_function(
        "bump",
        native(move |_this, args| {
            seen.set(seen.get() + 1);
            Ok(args.first().cloned().unwrap_or(JsValue::Undefined))
        }),
    );
    let counter = object_create("Counter", None);
    counter
        .borrow_mut()
        .define_own_property(PropertyKey::from("bump"), PropertyDescriptor::data(JsValue::Object(bump)));
    realm.define_global("counter", JsValue::Object(counter));
    calls
}

fn counter(realm: &Realm) -> JsObjectType {
    realm.lookup_global("counter").unwrap().as_object().unwrap().clone()
}

fn attr(el: &JsObjectType, name: &str) -> JsValue {
    call_method(el, "getAttribute", vec![JsValue::from(name)]).unwrap()
}

fn configuration_reason(err: HookError) -> String {
    match err {
        HookError::Configuration { reason, .. } => reason,
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

// ==========================================================================
// Methods
// ==========================================================================

#[test]
fn test_method_fallthrough_sees_mutated_arguments() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Element.prototype.setAttribute"],
            &HandlerSet::method(|ctx| {
                let value = ctx.arg_str(1);
                ctx.set_arg(1, JsValue::from(format!("[{}]", value)));
                Ok(())
            }),
        )
        .unwrap();

    let el = create_element(&realm, "div").unwrap();
    call_method(&el, "setAttribute", vec![JsValue::from("title"), JsValue::from("hi")]).unwrap();
    assert_eq!(attr(&el, "title"), JsValue::from("[hi]"));
}

#[test]
fn test_method_short_circuit_skips_original() {
    let (realm, registry) = setup();
    let calls = install_counter(&realm);
    registry
        .register(
            ["counter.bump"],
            &HandlerSet::method(|ctx| {
                if ctx.arg_str(0) == "skip" {
                    ctx.return_value(JsValue::Undefined);
                    assert!(ctx.has_returned());
                }
                Ok(())
            }),
        )
        .unwrap();

    let c = counter(&realm);
    assert_eq!(call_method(&c, "bump", vec![JsValue::from("skip")]).unwrap(), JsValue::Undefined);
    assert_eq!(calls.get(), 0);
    assert_eq!(call_method(&c, "bump", vec![JsValue::from("go")]).unwrap(), JsValue::from("go"));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_method_call_through_returns_original_result() {
    let (realm, registry) = setup();
    let calls = install_counter(&realm);
    registry
        .register(
            ["counter.bump"],
            &HandlerSet::method(|ctx| {
                let result = ctx.call()?;
                ctx.return_value(JsValue::from(format!("{}!", result.to_js_string())));
                Ok(())
            }),
        )
        .unwrap();

    let c = counter(&realm);
    assert_eq!(call_method(&c, "bump", vec![JsValue::from("x")]).unwrap(), JsValue::from("x!"));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_call_with_uses_explicit_receiver() {
    let (realm, registry) = setup();
    let other = create_element(&realm, "span").unwrap();
    call_method(&other, "setAttribute", vec![JsValue::from("id"), JsValue::from("other")]).unwrap();
    let target = JsValue::Object(other.clone());
    registry
        .register(
            ["Element.prototype.getAttribute"],
            &HandlerSet::method(move |ctx| {
                if ctx.arg_str(0) == "mirror" {
                    let value = ctx.call_with(&target, vec![JsValue::from("id")])?;
                    ctx.return_value(value);
                }
                Ok(())
            }),
        )
        .unwrap();

    let el = create_element(&realm, "div").unwrap();
    assert_eq!(attr(&el, "mirror"), JsValue::from("other"));
}

#[test]
fn test_original_errors_propagate_unchanged() {
    let (realm, registry) = setup();
    registry
        .register(["Element.prototype.setAttribute"], &HandlerSet::method(|_ctx| Ok(())))
        .unwrap();
    let el = create_element(&realm, "div").unwrap();
    let err = call_method(&el, "setAttribute", vec![JsValue::from("only-name")]).unwrap_err();
    assert_eq!(
        err,
        JErrorType::TypeError(
            "Failed to execute 'setAttribute' on 'Element': 2 arguments required, but only 1 present.".to_string()
        )
    );
}

#[test]
fn test_replacement_keeps_function_name() {
    let (realm, registry) = setup();
    registry
        .register(["Element.prototype.getAttribute"], &HandlerSet::method(|_ctx| Ok(())))
        .unwrap();
    let el = create_element(&realm, "div").unwrap();
    let f = get_named(&el, "getAttribute").unwrap();
    let name = trapdoor::runner::ds::function_object::function_name(f.as_object().unwrap());
    assert_eq!(name, "getAttribute");
}

// ==========================================================================
// Registration rules
// ==========================================================================

#[test]
fn test_registration_is_idempotent() {
    let (realm, registry) = setup();
    let calls = install_counter(&realm);
    let first = HandlerSet::method(|ctx| {
        ctx.set_arg(0, JsValue::from("first"));
        Ok(())
    });
    let second = HandlerSet::method(|ctx| {
        ctx.set_arg(0, JsValue::from("second"));
        Ok(())
    });
    registry.register(["counter.bump"], &first).unwrap();
    let installed = get_named(&counter(&realm), "bump").unwrap();
    registry.register(["counter.bump"], &second).unwrap();
    registry.register(["counter.bump"], &first).unwrap();

    assert_eq!(registry.registered_count(), 1);
    assert_eq!(get_named(&counter(&realm), "bump").unwrap(), installed);
    let result = call_method(&counter(&realm), "bump", vec![JsValue::from("x")]).unwrap();
    assert_eq!(result, JsValue::from("first"));
    // One wrapper, one call of the original.
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_missing_targets_are_configuration_errors() {
    let (_realm, registry) = setup();
    let method = HandlerSet::method(|_ctx| Ok(()));
    for target in &["Nope.prototype.x", "Element.prototype.nope", "Element.nothing.getAttribute"] {
        let err = registry.register([*target], &method).unwrap_err();
        match err {
            HookError::Configuration { target: t, .. } => assert_eq!(&t, target),
            other => panic!("unexpected {:?}", other),
        }
    }
    assert_eq!(registry.registered_count(), 0);
}

#[test]
fn test_malformed_paths_are_configuration_errors() {
    let (_realm, registry) = setup();
    let method = HandlerSet::method(|_ctx| Ok(()));
    for target in &["", "Element..getAttribute", "Element.prototype.get-attribute", " Audio"] {
        assert!(matches!(
            registry.register([*target], &method),
            Err(HookError::Configuration { .. })
        ));
    }
}

#[test]
fn test_kind_mismatch_is_a_configuration_error() {
    let (_realm, registry) = setup();
    let reason = configuration_reason(
        registry
            .register(["HTMLAnchorElement.prototype.href"], &HandlerSet::method(|_ctx| Ok(())))
            .unwrap_err(),
    );
    assert!(reason.contains("not a method"), "{}", reason);

    let reason = configuration_reason(
        registry
            .register(
                ["Element.prototype.getAttribute"],
                &HandlerSet::accessor(AccessorHandlers::new()),
            )
            .unwrap_err(),
    );
    assert!(reason.contains("not an accessor"), "{}", reason);

    let reason = configuration_reason(
        registry
            .register(["Element.prototype.getAttribute"], &HandlerSet::constructor(|_ctx| Ok(())))
            .unwrap_err(),
    );
    assert!(reason.contains("not a constructor"), "{}", reason);
    assert_eq!(registry.registered_count(), 0);
}

#[test]
fn test_non_configurable_member_is_refused() {
    let (_realm, registry) = setup();
    let reason = configuration_reason(
        registry
            .register(["HTMLAnchorElement.prototype"], &HandlerSet::method(|_ctx| Ok(())))
            .unwrap_err(),
    );
    assert!(reason.contains("not configurable"), "{}", reason);
}

#[test]
fn test_multi_target_registration_stops_at_first_failure() {
    let (_realm, registry) = setup();
    let method = HandlerSet::method(|_ctx| Ok(()));
    let result = registry.register(
        [
            "Element.prototype.getAttribute",
            "Missing.prototype.x",
            "Element.prototype.hasAttribute",
        ],
        &method,
    );
    match result {
        Err(HookError::Configuration { target, .. }) => assert_eq!(target, "Missing.prototype.x"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(registry.is_registered("Element.prototype.getAttribute"));
    assert!(!registry.is_registered("Element.prototype.hasAttribute"));
}

#[test]
fn test_realms_are_independent() {
    let (realm_a, registry_a) = setup();
    let (realm_b, registry_b) = setup();
    registry_a
        .register(
            ["Element.prototype.getAttribute"],
            &HandlerSet::method(|ctx| {
                ctx.return_value(JsValue::from("hooked"));
                Ok(())
            }),
        )
        .unwrap();

    let a = create_element(&realm_a, "div").unwrap();
    let b = create_element(&realm_b, "div").unwrap();
    assert_eq!(attr(&a, "id"), JsValue::from("hooked"));
    assert_eq!(attr(&b, "id"), JsValue::Null);
    assert!(!registry_b.is_registered("Element.prototype.getAttribute"));
    assert_ne!(realm_a.id(), realm_b.id());
}

#[test]
fn test_raw_accessor_needs_extensible_holder_for_missing_member() {
    let (_realm, registry) = setup();
    let sealed = object_create("Sealed", None);
    assert!(sealed.borrow_mut().prevent_extensions());
    let handlers = AccessorHandlers::new().get(|_ctx| Ok(Some(JsValue::from("computed"))));

    let err = registry.register_raw(&sealed, "realHref", &handlers).unwrap_err();
    assert_eq!(configuration_reason(err), "member is missing and the holder is not extensible");
    assert!(get_named(&sealed, "realHref").unwrap().is_undefined());
    assert_eq!(registry.registered_count(), 0);

    let open = object_create("Open", None);
    registry.register_raw(&open, "realHref", &handlers).unwrap();
    assert_eq!(get_named(&open, "realHref").unwrap(), JsValue::from("computed"));
}

// ==========================================================================
// Accessors
// ==========================================================================

#[test]
fn test_get_handler_without_short_circuit_yields_original_value() {
    let (realm, registry) = setup();
    let seen = Rc::new(Cell::new(0));
    let counter = seen.clone();
    registry
        .register(
            ["HTMLAnchorElement.prototype.href"],
            &HandlerSet::accessor(AccessorHandlers::new().get(move |_ctx| {
                counter.set(counter.get() + 1);
                Ok(None)
            })),
        )
        .unwrap();

    let a = create_element(&realm, "a").unwrap();
    set_named(&a, "href", JsValue::from("page?x=1")).unwrap();
    assert_eq!(get_named(&a, "href").unwrap(), JsValue::from("https://site.test/dir/page?x=1"));
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_set_outcomes() {
    let (realm, registry) = setup();
    registry
        .register(
            ["HTMLAnchorElement.prototype.href"],
            &HandlerSet::accessor(AccessorHandlers::new().set(|ctx, value| {
                let value = value.to_js_string();
                Ok(if value.starts_with("blocked:") {
                    SetOutcome::Suppress
                } else if value.starts_with("upper:") {
                    ctx.set(JsValue::from(value.to_uppercase()))?;
                    SetOutcome::Handled
                } else {
                    SetOutcome::Fallthrough
                })
            })),
        )
        .unwrap();

    let a = create_element(&realm, "a").unwrap();
    assert!(set_named(&a, "href", JsValue::from("/plain")).unwrap());
    assert_eq!(attr(&a, "href"), JsValue::from("/plain"));

    // Suppressed writes still report success.
    assert!(set_named(&a, "href", JsValue::from("blocked:x")).unwrap());
    assert_eq!(attr(&a, "href"), JsValue::from("/plain"));

    assert!(set_named(&a, "href", JsValue::from("upper:y")).unwrap());
    assert_eq!(attr(&a, "href"), JsValue::from("UPPER:Y"));
}

#[test]
fn test_missing_setter_handler_keeps_original_setter() {
    let (realm, registry) = setup();
    registry
        .register(
            ["HTMLMediaElement.prototype.src"],
            &HandlerSet::accessor(AccessorHandlers::new().get(|_ctx| Ok(Some(JsValue::from("fixed"))))),
        )
        .unwrap();
    let audio = create_element(&realm, "audio").unwrap();
    set_named(&audio, "src", JsValue::from("a.mp3")).unwrap();
    assert_eq!(attr(&audio, "src"), JsValue::from("a.mp3"));
    assert_eq!(get_named(&audio, "src").unwrap(), JsValue::from("fixed"));
}

#[test]
fn test_original_get_bypasses_handlers() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Node.prototype.baseURI"],
            &HandlerSet::accessor(AccessorHandlers::new().get(|_ctx| Ok(Some(JsValue::from("https://real.test/"))))),
        )
        .unwrap();
    let el = create_element(&realm, "div").unwrap();
    let receiver = JsValue::Object(el.clone());
    assert_eq!(get_named(&el, "baseURI").unwrap(), JsValue::from("https://real.test/"));
    assert_eq!(
        registry.original_get("Node.prototype.baseURI", &receiver).unwrap(),
        JsValue::from("https://site.test/dir/")
    );
}

#[test]
fn test_call_native_bypasses_handlers() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Element.prototype.getAttribute"],
            &HandlerSet::method(|ctx| {
                ctx.return_value(JsValue::from("hooked"));
                Ok(())
            }),
        )
        .unwrap();
    let el = create_element(&realm, "div").unwrap();
    call_method(&el, "setAttribute", vec![JsValue::from("id"), JsValue::from("real")]).unwrap();

    assert_eq!(attr(&el, "id"), JsValue::from("hooked"));
    let real = registry
        .call_native("Element.prototype.getAttribute", &JsValue::Object(el.clone()), vec![JsValue::from("id")])
        .unwrap();
    assert_eq!(real, JsValue::from("real"));
    // Not intercepted: the current implementation is used.
    let has = registry
        .call_native("Element.prototype.hasAttribute", &JsValue::Object(el), vec![JsValue::from("id")])
        .unwrap();
    assert_eq!(has, JsValue::Boolean(true));
}

#[test]
fn test_handlers_may_reenter_the_same_object() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Element.prototype.getAttribute"],
            &HandlerSet::method(|ctx| {
                let this = ctx.this.clone();
                let el = this.as_object().unwrap();
                let has = call_method(el, "hasAttribute", vec![ctx.arg(0)])?;
                if has == JsValue::Boolean(false) {
                    ctx.return_value(JsValue::from(""));
                }
                Ok(())
            }),
        )
        .unwrap();
    let el = create_element(&realm, "div").unwrap();
    assert_eq!(attr(&el, "missing"), JsValue::from(""));
}

#[test]
fn test_raw_accessor_by_path_creates_missing_member() {
    let (realm, registry) = setup();
    registry
        .register(
            ["HTMLAnchorElement.prototype.text"],
            &HandlerSet::raw_accessor(AccessorHandlers::new().get(|ctx| {
                assert!(!ctx.has_original_getter());
                Ok(Some(JsValue::from("link text")))
            })),
        )
        .unwrap();
    let a = create_element(&realm, "a").unwrap();
    assert_eq!(get_named(&a, "text").unwrap(), JsValue::from("link text"));
    // No original setter: writes are dropped.
    set_named(&a, "text", JsValue::from("x")).unwrap();
    assert_eq!(get_named(&a, "text").unwrap(), JsValue::from("link text"));
}

// ==========================================================================
// Constructors
// ==========================================================================

#[test]
fn test_constructor_argument_mutation_reaches_real_constructor() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Audio"],
            &HandlerSet::constructor(|ctx| {
                ctx.set_arg(0, JsValue::from(format!("/proxied/{}", ctx.arg(0).to_js_string())));
                Ok(())
            }),
        )
        .unwrap();

    let audio = construct_global(&realm, "Audio", vec![JsValue::from("song.mp3")]).unwrap();
    let audio = audio.as_object().unwrap().clone();
    assert_eq!(attr(&audio, "src"), JsValue::from("/proxied/song.mp3"));
    assert_eq!(audio.borrow().class_name(), "HTMLAudioElement");
}

#[test]
fn test_constructor_short_circuit() {
    let (realm, registry) = setup();
    let replacement = object_create("Stub", None);
    let stub = replacement.clone();
    registry
        .register(
            ["Audio"],
            &HandlerSet::constructor(move |ctx| {
                ctx.return_value(JsValue::Object(stub.clone()));
                Ok(())
            }),
        )
        .unwrap();
    let built = construct_global(&realm, "Audio", vec![]).unwrap();
    assert!(same_object(built.as_object().unwrap(), &replacement));
}

#[test]
fn test_constructor_replacement_keeps_prototype_and_call_behavior() {
    let (realm, registry) = setup();
    let before = get_named(&global_object(&realm, "Audio"), "prototype").unwrap();
    registry
        .register(["Audio"], &HandlerSet::constructor(|_ctx| Ok(())))
        .unwrap();
    let audio_ctor = global_object(&realm, "Audio");
    assert_eq!(get_named(&audio_ctor, "prototype").unwrap(), before);

    let err = call_value(&JsValue::Object(audio_ctor), &JsValue::Undefined, vec![]).unwrap_err();
    assert!(matches!(err, JErrorType::TypeError(_)));
}

fn global_object(realm: &Realm, name: &str) -> JsObjectType {
    get_named(realm.global(), name).unwrap().as_object().unwrap().clone()
}

// ==========================================================================
// Handler failures
// ==========================================================================

fn handler_bug() -> JErrorType {
    JErrorType::TypeError("handler bug".to_string())
}

#[test]
fn test_failing_method_handler_runs_unmodified_original() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Element.prototype.setAttribute"],
            &HandlerSet::method(|ctx| {
                ctx.set_arg(1, JsValue::from("mangled"));
                ctx.return_value(JsValue::from("skipped"));
                Err(handler_bug())
            }),
        )
        .unwrap();
    registry
        .register(["Element.prototype.getAttribute"], &HandlerSet::method(|_ctx| Err(handler_bug())))
        .unwrap();

    let el = create_element(&realm, "div").unwrap();
    let result = call_method(&el, "setAttribute", vec![JsValue::from("title"), JsValue::from("kept")]).unwrap();
    assert!(result.is_undefined());
    assert_eq!(attr(&el, "title"), JsValue::from("kept"));
    assert_eq!(attr(&el, "missing"), JsValue::Null);
}

#[test]
fn test_original_error_through_call_still_surfaces() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Element.prototype.setAttribute"],
            &HandlerSet::method(|ctx| {
                let value = ctx.call()?;
                ctx.return_value(value);
                Ok(())
            }),
        )
        .unwrap();
    let el = create_element(&realm, "div").unwrap();
    let err = call_method(&el, "setAttribute", vec![JsValue::from("only-name")]).unwrap_err();
    assert!(matches!(err, JErrorType::TypeError(_)));
    assert_ne!(err, handler_bug());
}

#[test]
fn test_failing_accessor_handlers_fall_through() {
    let (realm, registry) = setup();
    registry
        .register(
            ["HTMLAnchorElement.prototype.href"],
            &HandlerSet::accessor(
                AccessorHandlers::new()
                    .get(|_ctx| Err(handler_bug()))
                    .set(|_ctx, _value| Err(handler_bug())),
            ),
        )
        .unwrap();

    let a = create_element(&realm, "a").unwrap();
    set_named(&a, "href", JsValue::from("next.html")).unwrap();
    assert_eq!(attr(&a, "href"), JsValue::from("next.html"));
    assert_eq!(get_named(&a, "href").unwrap(), JsValue::from("https://site.test/dir/next.html"));
}

#[test]
fn test_failing_constructor_handler_builds_real_object() {
    let (realm, registry) = setup();
    registry
        .register(
            ["Audio"],
            &HandlerSet::constructor(|ctx| {
                ctx.set_arg(0, JsValue::from("/mangled"));
                Err(handler_bug())
            }),
        )
        .unwrap();

    let audio = construct_global(&realm, "Audio", vec![JsValue::from("song.mp3")]).unwrap();
    let audio = audio.as_object().unwrap().clone();
    assert_eq!(audio.borrow().class_name(), "HTMLAudioElement");
    assert_eq!(attr(&audio, "src"), JsValue::from("song.mp3"));
}
