//! # trapdoor - client-side core of a web-content proxy
//!
//! Lets a page run inside a proxy origin as though it were still served
//! from its real origin. Two pieces do the work:
//!
//! - an interception framework that overrides accessors, methods and
//!   constructors on native host objects while keeping a path back to the
//!   original behavior
//! - a URL transcoder mapping real addresses to proxy addresses and back
//!
//! Both operate on a small realm-scoped JavaScript object model
//! ([`runner::ds`]) with DOM-shaped host interfaces ([`runner::host`]).
//!
//! ## Quick Start
//!
//! ### Transcoding addresses
//!
//! ```
//! use trapdoor::rewriter::{PlainCodec, ProxyEnvironment, UrlMeta, UrlRewriter};
//!
//! let env = ProxyEnvironment::new("https://proxy.test", "/service/");
//! let rewriter = UrlRewriter::new(env, Box::new(PlainCodec));
//! let meta = UrlMeta::for_document("https://site.test/docs/").unwrap();
//!
//! let proxied = rewriter.rewrite("guide.html#intro", &meta);
//! assert_eq!(
//!     proxied,
//!     "https://proxy.test/service/https%3A%2F%2Fsite.test%2Fdocs%2Fguide.html#intro"
//! );
//! assert_eq!(rewriter.unrewrite(&proxied), "https://site.test/docs/guide.html#intro");
//! ```
//!
//! ### Intercepting a native accessor
//!
//! ```
//! use std::rc::Rc;
//! use trapdoor::runner::ds::object::{get_named, set_named};
//! use trapdoor::runner::ds::realm::Realm;
//! use trapdoor::runner::ds::value::JsValue;
//! use trapdoor::runner::hook::{AccessorHandlers, HandlerSet, InterceptionRegistry};
//! use trapdoor::runner::host::{create_element, install_host_interfaces};
//!
//! let realm = Rc::new(Realm::new());
//! install_host_interfaces(&realm, "https://site.test/").unwrap();
//! let registry = InterceptionRegistry::new(realm.clone());
//!
//! registry
//!     .register(
//!         ["HTMLAnchorElement.prototype.href"],
//!         &HandlerSet::accessor(AccessorHandlers::new().get(|ctx| {
//!             let real = ctx.get()?;
//!             Ok(Some(JsValue::from(real.to_js_string().to_uppercase())))
//!         })),
//!     )
//!     .unwrap();
//!
//! let a = create_element(&realm, "a").unwrap();
//! set_named(&a, "href", JsValue::from("/x")).unwrap();
//! assert_eq!(get_named(&a, "href").unwrap(), JsValue::from("HTTPS://SITE.TEST/X"));
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG grammar for override target paths
//! - **[`runner`]** - Object model and interception
//!   - **[`runner::ds`]** - Values, objects, property descriptors, realms
//!   - **[`runner::hook`]** - Interception registry, descriptor cache, handler contexts
//!   - **[`runner::host`]** - Native host interfaces
//! - **[`rewriter`]** - URL transcoding, scheme classification, codecs
//! - **[`config`]** - Proxy configuration (TOML)

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod parser;
pub mod rewriter;
pub mod runner;
