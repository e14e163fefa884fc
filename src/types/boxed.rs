//! Heap holder backing boxed [`Dynamic`][crate::Dynamic] values.

use crate::func::{new_locked, Locked, SendSync};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::mem;

/// Capabilities of a heap-allocated value of an erased type.
pub trait Holder: SendSync {
    /// Borrow the held value.
    fn value_any(&self) -> &dyn Any;
    /// Mutably borrow the held value.
    fn value_any_mut(&mut self) -> &mut dyn Any;
    /// Unwrap the held value.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    /// Type identity of the held value.
    fn value_type_id(&self) -> TypeId;
    /// Type name of the held value.
    fn value_type_name(&self) -> &'static str;
    /// Size of the held value in bytes.
    fn size(&self) -> usize;
    /// Alignment of the held value in bytes.
    fn align(&self) -> usize;
    /// Can the held value be cloned?
    fn is_clonable(&self) -> bool;
    /// Deep-copy the held value into a new holder.
    ///
    /// Returns [`None`] if the type cannot be cloned.
    fn clone_holder(&self) -> Option<Box<dyn Holder>>;
    /// Overwrite the held value with a clone of `other`.
    ///
    /// Returns `false` if `other` is of a different type or the type cannot be cloned.
    fn assign(&mut self, other: &dyn Any) -> bool;
}

/// Holder of a value of type `T`.
pub struct Boxed<T> {
    value: T,
    clone: Option<fn(&T) -> T>,
}

impl<T: Any + SendSync> Boxed<T> {
    /// Hold a clonable value.
    #[inline(always)]
    #[must_use]
    pub fn new(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            value,
            clone: Some(T::clone),
        }
    }
    /// Hold a value that cannot be cloned.
    #[inline(always)]
    #[must_use]
    pub fn unclonable(value: T) -> Self {
        Self { value, clone: None }
    }
}

impl<T: Any + SendSync> Holder for Boxed<T> {
    #[inline(always)]
    fn value_any(&self) -> &dyn Any {
        &self.value
    }
    #[inline(always)]
    fn value_any_mut(&mut self) -> &mut dyn Any {
        &mut self.value
    }
    #[inline(always)]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.value)
    }
    #[inline(always)]
    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }
    #[inline(always)]
    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }
    #[inline(always)]
    fn size(&self) -> usize {
        mem::size_of::<T>()
    }
    #[inline(always)]
    fn align(&self) -> usize {
        mem::align_of::<T>()
    }
    #[inline(always)]
    fn is_clonable(&self) -> bool {
        self.clone.is_some()
    }
    fn clone_holder(&self) -> Option<Box<dyn Holder>> {
        let clone = self.clone?;

        Some(Box::new(Self {
            value: clone(&self.value),
            clone: self.clone,
        }))
    }
    fn assign(&mut self, other: &dyn Any) -> bool {
        match (self.clone, other.downcast_ref::<T>()) {
            (Some(clone), Some(value)) => {
                self.value = clone(value);
                true
            }
            _ => false,
        }
    }
}

/// Shared cell around a [`Holder`], with the type information of the held value kept
/// outside the lock so it can be inspected while the value is borrowed.
pub struct BoxedCell {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) size: usize,
    pub(crate) align: usize,
    pub(crate) clonable: bool,
    pub(crate) value: Locked<Box<dyn Holder>>,
}

impl BoxedCell {
    /// Wrap a holder.
    #[must_use]
    pub fn new(holder: Box<dyn Holder>) -> Self {
        Self {
            type_id: holder.value_type_id(),
            type_name: holder.value_type_name(),
            size: holder.size(),
            align: holder.align(),
            clonable: holder.is_clonable(),
            value: new_locked(holder),
        }
    }
}

impl fmt::Debug for BoxedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedCell")
            .field("type_name", &self.type_name)
            .field("size", &self.size)
            .field("clonable", &self.clonable)
            .finish_non_exhaustive()
    }
}
