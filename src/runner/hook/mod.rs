//! Interception of native members.
//!
//! An [`InterceptionRegistry`] belongs to one realm. Registering a
//! [`HandlerSet`] against a target path such as
//! `"HTMLAnchorElement.prototype.href"` captures the member's current
//! implementation into the realm's [`DescriptorCache`] and installs a
//! replacement that runs the handler on every invocation. The handler sees
//! a context bound to the captured original and decides between falling
//! through to it and short-circuiting.
//!
//! Targets are captured once. Registering the same target again, with any
//! handler set, leaves the first override in place, so "original" always
//! means the behavior from before interception.

mod context;
mod descriptor_cache;
mod registry;
mod types;

pub use context::{AccessorContext, ApplyContext, ConstructContext};
pub use descriptor_cache::{CacheEntry, CapturedMember, DescriptorCache, TargetKey};
pub use registry::{HookError, InterceptionRegistry};
pub use types::{
    AccessorHandlers, ApplyHandler, ConstructHandler, GetHandler, HandlerSet, OverrideKind, SetHandler, SetOutcome,
};
