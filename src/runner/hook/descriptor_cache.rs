use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::types::OverrideKind;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};

/// Identity of an intercepted member: the holder object (by address) plus the
/// property name. The cache entry keeps the holder alive, so an address is
/// never reused while its key is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    holder: usize,
    member: PropertyKey,
}

impl TargetKey {
    pub fn new(holder: &JsObjectType, member: &PropertyKey) -> Self {
        TargetKey {
            holder: Rc::as_ptr(holder) as usize,
            member: member.clone(),
        }
    }
}

/// The implementation a member had before it was intercepted.
#[derive(Clone, Debug)]
pub enum CapturedMember {
    Method(JsObjectType),
    Constructor(JsObjectType),
    Accessor {
        get: Option<JsObjectType>,
        set: Option<JsObjectType>,
    },
    /// Raw traps may be installed where no property existed.
    Absent,
}

impl CapturedMember {
    pub fn getter(&self) -> Option<JsObjectType> {
        match self {
            CapturedMember::Accessor { get, .. } => get.clone(),
            _ => None,
        }
    }

    pub fn setter(&self) -> Option<JsObjectType> {
        match self {
            CapturedMember::Accessor { set, .. } => set.clone(),
            _ => None,
        }
    }

    pub fn function(&self) -> Option<&JsObjectType> {
        match self {
            CapturedMember::Method(f) | CapturedMember::Constructor(f) => Some(f),
            _ => None,
        }
    }
}

pub struct CacheEntry {
    pub label: String,
    pub kind: OverrideKind,
    pub holder: JsObjectType,
    pub member: PropertyKey,
    pub original: CapturedMember,
    /// Descriptor as it was before interception; `None` for absent members.
    pub descriptor: Option<PropertyDescriptor>,
}

/// Originals of every intercepted member of one realm. An entry is written
/// once, on first registration, and never replaced.
#[derive(Default)]
pub struct DescriptorCache {
    entries: RefCell<HashMap<TargetKey, Rc<CacheEntry>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        DescriptorCache {
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &TargetKey) -> Option<Rc<CacheEntry>> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &TargetKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Stores `entry` unless the target already has one; either way returns
    /// the entry that is in effect.
    pub fn capture(&self, key: TargetKey, entry: CacheEntry) -> Rc<CacheEntry> {
        self.entries
            .borrow_mut()
            .entry(key)
            .or_insert_with(|| Rc::new(entry))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Labels of all captured targets, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.borrow().values().map(|e| e.label.clone()).collect();
        labels.sort();
        labels
    }
}
