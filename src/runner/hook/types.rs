//! Handler shapes accepted by the interception registry.

use std::fmt;
use std::rc::Rc;

use super::context::{AccessorContext, ApplyContext, ConstructContext};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;

/// Method handler. May rewrite `ctx.args` or short-circuit with
/// `ctx.return_value(..)`.
pub type ApplyHandler = Rc<dyn Fn(&mut ApplyContext) -> Result<(), JErrorType>>;

/// Constructor handler. Same contract as [`ApplyHandler`], run before the
/// real constructor.
pub type ConstructHandler = Rc<dyn Fn(&mut ConstructContext) -> Result<(), JErrorType>>;

/// Getter handler. `Ok(None)` falls through to the original getter.
pub type GetHandler = Rc<dyn Fn(&AccessorContext) -> Result<Option<JsValue>, JErrorType>>;

/// Setter handler, given the assigned value.
pub type SetHandler = Rc<dyn Fn(&AccessorContext, JsValue) -> Result<SetOutcome, JErrorType>>;

/// What a setter handler did with an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Pass the assigned value to the original setter.
    Fallthrough,
    /// The handler performed the write itself (usually through `ctx.set`).
    Handled,
    /// Report success to page code but do not write anything.
    Suppress,
}

/// Getter/setter pair for accessor overrides. Either side may be left out,
/// in which case the original getter or setter stays in place.
#[derive(Clone, Default)]
pub struct AccessorHandlers {
    pub get: Option<GetHandler>,
    pub set: Option<SetHandler>,
}

impl AccessorHandlers {
    pub fn new() -> Self {
        AccessorHandlers { get: None, set: None }
    }

    pub fn get<F>(mut self, f: F) -> Self
    where
        F: Fn(&AccessorContext) -> Result<Option<JsValue>, JErrorType> + 'static,
    {
        self.get = Some(Rc::new(f));
        self
    }

    pub fn set<F>(mut self, f: F) -> Self
    where
        F: Fn(&AccessorContext, JsValue) -> Result<SetOutcome, JErrorType> + 'static,
    {
        self.set = Some(Rc::new(f));
        self
    }
}

/// A handler set tagged with the invocation kind it intercepts.
#[derive(Clone)]
pub enum HandlerSet {
    /// Getter/setter override on an accessor property.
    Accessor(AccessorHandlers),
    /// Override of a callable data property.
    Method(ApplyHandler),
    /// Override of a constructible data property.
    Constructor(ConstructHandler),
    /// Accessor override installed straight on a holder; the member may be
    /// missing.
    RawAccessor(AccessorHandlers),
}

impl HandlerSet {
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut ApplyContext) -> Result<(), JErrorType> + 'static,
    {
        HandlerSet::Method(Rc::new(f))
    }

    pub fn constructor<F>(f: F) -> Self
    where
        F: Fn(&mut ConstructContext) -> Result<(), JErrorType> + 'static,
    {
        HandlerSet::Constructor(Rc::new(f))
    }

    pub fn accessor(handlers: AccessorHandlers) -> Self {
        HandlerSet::Accessor(handlers)
    }

    pub fn raw_accessor(handlers: AccessorHandlers) -> Self {
        HandlerSet::RawAccessor(handlers)
    }

    pub fn kind(&self) -> OverrideKind {
        match self {
            HandlerSet::Accessor(_) => OverrideKind::Accessor,
            HandlerSet::Method(_) => OverrideKind::Method,
            HandlerSet::Constructor(_) => OverrideKind::Constructor,
            HandlerSet::RawAccessor(_) => OverrideKind::RawAccessor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    Accessor,
    Method,
    Constructor,
    RawAccessor,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverrideKind::Accessor => "accessor",
            OverrideKind::Method => "method",
            OverrideKind::Constructor => "constructor",
            OverrideKind::RawAccessor => "raw accessor",
        };
        write!(f, "{}", name)
    }
}
