//! Process-wide table of runtime type identities.
//!
//! Every concrete type that takes part in reflection may have an entry recording its
//! display name, category, equality and display operations, and its ancestors together
//! with the byte offset at which each ancestor is stored inside it. Answering "does a
//! value of type `A` have a safe view as type `B`" is a walk over this table.

use crate::types::number::{Float, Int};
use crate::{Identifier, SmartString};
use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::VecDeque;
use std::fmt;
use std::mem;

/// Equality operation on two values of the same registered type.
pub type EqualsFn = fn(&dyn Any, &dyn Any) -> bool;

/// Display operation on a value of a registered type.
pub type DisplayFn = fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result;

/// Restores the `&dyn Any` of a value of a known type from a pointer to its bytes.
pub type EraseFn = fn(*const u8) -> *const dyn Any;

/// Category of a stored value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[non_exhaustive]
pub enum TypeCategory {
    /// Plain-old-data: a `Copy` type with no invariants on its bytes.
    Pod,
    /// Integral number, including `bool` and `char`.
    Integral,
    /// Floating-point number.
    FloatingPoint,
    /// Pointer or shared reference.
    Pointer,
    /// Text string.
    String,
    /// None of the above.
    #[default]
    Other,
}

impl TypeCategory {
    /// Category of the built-in type `T`.
    ///
    /// Only [`Integral`][TypeCategory::Integral], [`FloatingPoint`][TypeCategory::FloatingPoint]
    /// and [`String`][TypeCategory::String] are inferred. [`Pod`][TypeCategory::Pod] and
    /// [`Pointer`][TypeCategory::Pointer] cannot be told apart from a [`TypeId`], so they are
    /// set explicitly with [`ClassBuilder::category`][crate::ClassBuilder::category]. Interfaces
    /// are registered as pointers. Everything else defaults to [`Other`][TypeCategory::Other].
    #[must_use]
    pub fn of<T: Any>() -> Self {
        let id = TypeId::of::<T>();

        if Int::is_int_type::<T>()
            || id == TypeId::of::<bool>()
            || id == TypeId::of::<char>()
        {
            Self::Integral
        } else if Float::is_float_type::<T>() {
            Self::FloatingPoint
        } else if id == TypeId::of::<String>()
            || id == TypeId::of::<SmartString>()
            || id == TypeId::of::<&'static str>()
        {
            Self::String
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pod => "plain-old-data",
            Self::Integral => "integral",
            Self::FloatingPoint => "floating-point",
            Self::Pointer => "pointer",
            Self::String => "string",
            Self::Other => "other",
        })
    }
}

/// An ancestor of a concrete type: a value of the ancestor's type stored in-line at a
/// fixed byte offset.
///
/// Create one with the [`ancestor!`][crate::ancestor] macro.
#[derive(Debug, Clone, Copy)]
pub struct Ancestor {
    derived: TypeId,
    type_id: TypeId,
    type_name: &'static str,
    offset: usize,
}

impl Ancestor {
    /// Describe the field of type `B` stored at `offset` inside `D`.
    ///
    /// `project` is never called; it only fixes the field type.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of a field of type `B` inside `D`, as computed by
    /// [`core::mem::offset_of!`]. The [`ancestor!`][crate::ancestor] macro guarantees this.
    #[inline]
    #[must_use]
    pub unsafe fn from_field<D: Any, B: Any>(project: fn(&D) -> &B, offset: usize) -> Self {
        let _ = project;

        Self {
            derived: TypeId::of::<D>(),
            type_id: TypeId::of::<B>(),
            type_name: type_name::<B>(),
            offset,
        }
    }
    /// Type identity of the derived type the offset belongs to.
    #[inline(always)]
    #[must_use]
    pub const fn derived_type_id(&self) -> TypeId {
        self.derived
    }
    /// Type identity of the ancestor.
    #[inline(always)]
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }
    /// Type name of the ancestor.
    #[inline(always)]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
    /// Byte offset of the ancestor inside the derived value.
    #[inline(always)]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

/// Describe a field of a struct as an ancestor of that struct.
///
/// The field must be stored in-line; its type becomes the ancestor type.
///
/// # Example
///
/// ```
/// use metaclass::ancestor;
///
/// struct Shape { sides: u32 }
/// struct Square { shape: Shape, length: f64 }
///
/// let base = ancestor!(Square, shape);
/// assert_eq!(base.type_id(), std::any::TypeId::of::<Shape>());
/// assert_eq!(base.offset(), std::mem::offset_of!(Square, shape));
/// ```
#[macro_export]
macro_rules! ancestor {
    ($derived:ty, $field:tt) => {{
        let project: fn(&$derived) -> &_ = |value| &value.$field;
        // SAFETY: the offset and the projected type refer to the same field.
        unsafe { $crate::Ancestor::from_field(project, ::core::mem::offset_of!($derived, $field)) }
    }};
}

/// Entry of the type table.
#[derive(Clone)]
pub struct TypeEntry {
    /// Registered (or standard) name of the type.
    pub name: Identifier,
    /// Category of the type.
    pub category: TypeCategory,
    /// Size in bytes.
    pub size: usize,
    /// Erasure function of the type.
    pub erase: EraseFn,
    /// Equality operation, if any.
    pub equals: Option<EqualsFn>,
    /// Display operation, if any.
    pub display: Option<DisplayFn>,
    /// Direct ancestors, in declaration order.
    pub ancestors: Vec<Ancestor>,
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("size", &self.size)
            .field("equals", &self.equals.is_some())
            .field("display", &self.display.is_some())
            .field("ancestors", &self.ancestors)
            .finish()
    }
}

static TYPES: Lazy<RwLock<AHashMap<TypeId, TypeEntry>>> =
    Lazy::new(|| RwLock::new(AHashMap::new()));

fn erase<T: Any>(ptr: *const u8) -> *const dyn Any {
    ptr as *const T as *const dyn Any
}

fn equals<T: Any + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn display<T: Any + fmt::Display>(value: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Display::fmt(value, f),
        None => f.write_str(type_name::<T>()),
    }
}

/// Map the name of a standard type into a friendly form.
#[must_use]
pub fn map_std_type_name(name: &str) -> &str {
    let name = name.trim();

    if name == type_name::<String>() || name == type_name::<SmartString>() {
        return "String";
    }
    if name == type_name::<&str>() {
        return "&str";
    }
    if name == type_name::<()>() {
        return "()";
    }

    name.strip_prefix("alloc::")
        .or_else(|| name.strip_prefix("core::"))
        .or_else(|| name.strip_prefix("std::"))
        .unwrap_or(name)
}

/// Modify the entry for `T`, creating it if absent.
pub fn with_entry_mut<T: Any, R>(f: impl FnOnce(&mut TypeEntry) -> R) -> R {
    let mut table = TYPES.write();
    let entry = table.entry(TypeId::of::<T>()).or_insert_with(|| TypeEntry {
        name: map_std_type_name(type_name::<T>()).into(),
        category: TypeCategory::of::<T>(),
        size: mem::size_of::<T>(),
        erase: erase::<T>,
        equals: None,
        display: None,
        ancestors: Vec::new(),
    });
    f(entry)
}

/// Register `T` under a name.
pub fn set_name<T: Any>(name: impl Into<Identifier>) {
    let name = name.into();
    with_entry_mut::<T, _>(|entry| entry.name = name);
}

/// Set the category of `T`.
pub fn set_category<T: Any>(category: TypeCategory) {
    with_entry_mut::<T, _>(|entry| entry.category = category);
}

/// Register the equality operation of `T`.
pub fn set_equality<T: Any + PartialEq>() {
    with_entry_mut::<T, _>(|entry| entry.equals = Some(equals::<T>));
}

/// Register the display operation of `T`.
pub fn set_display<T: Any + fmt::Display>() {
    with_entry_mut::<T, _>(|entry| entry.display = Some(display::<T>));
}

/// Record an ancestor of `T`. Duplicate ancestors are ignored.
///
/// Returns `false` if the ancestor was described for a type other than `T`.
pub fn add_ancestor<T: Any>(ancestor: Ancestor) -> bool {
    if ancestor.derived != TypeId::of::<T>() {
        return false;
    }
    with_entry_mut::<T, _>(|entry| {
        if entry.ancestors.iter().all(|a| a.type_id != ancestor.type_id) {
            entry.ancestors.push(ancestor);
        }
    });
    true
}

/// Get a copy of the entry of a type.
#[must_use]
pub fn entry(type_id: TypeId) -> Option<TypeEntry> {
    TYPES.read().get(&type_id).cloned()
}

/// Friendly name of a type: the registered name if any, otherwise the mapped standard name.
#[must_use]
pub fn display_name(type_id: TypeId, fallback: &'static str) -> Identifier {
    TYPES
        .read()
        .get(&type_id)
        .map(|entry| entry.name.clone())
        .unwrap_or_else(|| map_std_type_name(fallback).into())
}

/// Category of a registered type.
#[must_use]
pub fn category(type_id: TypeId) -> Option<TypeCategory> {
    TYPES.read().get(&type_id).map(|entry| entry.category)
}

/// Equality operation of a registered type.
#[must_use]
pub fn equality(type_id: TypeId) -> Option<EqualsFn> {
    TYPES.read().get(&type_id).and_then(|entry| entry.equals)
}

/// Erasure function of a registered type.
#[must_use]
pub fn erasure(type_id: TypeId) -> Option<EraseFn> {
    TYPES.read().get(&type_id).map(|entry| entry.erase)
}

/// Display operation of a registered type.
#[must_use]
pub fn display_fn(type_id: TypeId) -> Option<DisplayFn> {
    TYPES.read().get(&type_id).and_then(|entry| entry.display)
}

/// Direct ancestors of a type.
#[must_use]
pub fn ancestors(type_id: TypeId) -> Vec<Ancestor> {
    TYPES
        .read()
        .get(&type_id)
        .map(|entry| entry.ancestors.clone())
        .unwrap_or_default()
}

/// Layout search: find where a value of type `to` is stored inside a value of type `from`.
///
/// Walks the ancestry breadth first so that the nearest ancestor wins. Returns the byte
/// offset of the target inside the source.
#[must_use]
pub fn search(to: TypeId, from: TypeId) -> Option<usize> {
    let table = TYPES.read();
    let mut queue = VecDeque::from([(from, 0_usize)]);
    let mut seen = AHashSet::new();

    while let Some((type_id, offset)) = queue.pop_front() {
        if !seen.insert(type_id) {
            continue;
        }
        let Some(entry) = table.get(&type_id) else {
            continue;
        };

        for ancestor in &entry.ancestors {
            let offset = offset + ancestor.offset;

            if ancestor.type_id == to {
                return Some(offset);
            }
            queue.push_back((ancestor.type_id, offset));
        }
    }

    None
}
