//! The process-wide registry of class and function descriptors.

use crate::func::StraightHasherBuilder;
use crate::meta::{Class, ClassInfo, Function, FunctionInfo};
use crate::Identifier;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;

#[derive(Default)]
struct ClassTable {
    by_name: AHashMap<Identifier, &'static ClassInfo>,
    by_type: AHashMap<TypeId, &'static ClassInfo>,
    order: Vec<&'static ClassInfo>,
}

#[derive(Default)]
struct FunctionTable {
    by_name: AHashMap<Identifier, Vec<&'static FunctionInfo>>,
    by_hash: HashMap<u64, &'static FunctionInfo, StraightHasherBuilder>,
    order: Vec<&'static FunctionInfo>,
}

/// The metaobject registry.
///
/// Descriptors are added once, during registration, and live for the rest of the process.
/// Lookups only take read locks and may run concurrently.
pub struct Registry {
    classes: RwLock<ClassTable>,
    functions: RwLock<FunctionTable>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry {
    classes: RwLock::new(ClassTable::default()),
    functions: RwLock::new(FunctionTable::default()),
});

impl Registry {
    /// Get the registry, creating it on first use.
    #[inline(always)]
    #[must_use]
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// All registered classes, in registration order.
    #[must_use]
    pub fn classes(&self) -> Vec<Class> {
        self.classes
            .read()
            .order
            .iter()
            .map(|&info| Class::from_info(info))
            .collect()
    }
    /// Number of registered classes.
    #[inline]
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.read().order.len()
    }
    /// All registered free functions, in registration order.
    #[must_use]
    pub fn functions(&self) -> Vec<Function> {
        self.functions
            .read()
            .order
            .iter()
            .map(|&info| Function::from_info(info))
            .collect()
    }
    /// Number of registered free functions.
    #[inline]
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.read().order.len()
    }

    #[inline]
    pub(crate) fn class_by_name(&self, name: &str) -> Option<&'static ClassInfo> {
        self.classes.read().by_name.get(name).copied()
    }
    #[inline]
    pub(crate) fn class_by_type(&self, type_id: TypeId) -> Option<&'static ClassInfo> {
        self.classes.read().by_type.get(&type_id).copied()
    }
    /// Add a closed class descriptor.
    ///
    /// If a class with the same type or name already exists, the existing descriptor is
    /// returned and the new one is discarded.
    pub(crate) fn insert_class(&self, info: &'static ClassInfo) -> &'static ClassInfo {
        let mut table = self.classes.write();

        let existing = table
            .by_type
            .get(&info.type_id())
            .or_else(|| table.by_name.get(info.name()))
            .copied();

        if let Some(existing) = existing {
            tracing::warn!(class = %info.name(), "class already registered");
            return existing;
        }

        table.by_name.insert(info.name().into(), info);
        table.by_type.insert(info.type_id(), info);
        table.order.push(info);
        info
    }

    #[inline]
    pub(crate) fn functions_named(&self, name: &str) -> Vec<&'static FunctionInfo> {
        self.functions
            .read()
            .by_name
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
    #[inline]
    pub(crate) fn function_by_hash(&self, hash: u64) -> Option<&'static FunctionInfo> {
        self.functions.read().by_hash.get(&hash).copied()
    }
    /// Add a function descriptor.
    ///
    /// A function with the same name and parameter types is only registered once; the
    /// existing descriptor is returned.
    pub(crate) fn insert_function(&self, info: &'static FunctionInfo) -> &'static FunctionInfo {
        let mut table = self.functions.write();

        if let Some(&existing) = table.by_hash.get(&info.hash()) {
            tracing::warn!(function = %info.signature(), "function already registered");
            return existing;
        }

        table
            .by_name
            .entry(info.name().into())
            .or_default()
            .push(info);
        table.by_hash.insert(info.hash(), info);
        table.order.push(info);
        info
    }
}
