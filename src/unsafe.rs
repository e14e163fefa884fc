//! A module containing all unsafe code.

use std::any::{Any, TypeId};
use std::mem;
use std::ptr;

/// Cast a type into another type, handing the value back if the types differ.
#[inline(always)]
pub fn unsafe_reify<A: Any, B: Any>(a: A) -> Result<B, A> {
    if TypeId::of::<B>() == TypeId::of::<A>() {
        // SAFETY: Just checked we have the right type. The source is forgotten right
        // after its bits are moved out.
        unsafe {
            let ret: B = ptr::read(&a as *const A as *const B);
            mem::forget(a);
            Ok(ret)
        }
    } else {
        Err(a)
    }
}

/// Cast a reference into a reference of another type.
///
/// Returns [`None`] unless both types are identical.
#[inline(always)]
#[must_use]
pub fn unsafe_cast_ref<A: Any, B: Any>(a: &A) -> Option<&B> {
    if TypeId::of::<B>() == TypeId::of::<A>() {
        // SAFETY: just checked whether we are pointing to the correct type
        Some(unsafe { &*(a as *const A as *const B) })
    } else {
        None
    }
}

/// Cast a mutable reference into a mutable reference of another type.
///
/// Returns [`None`] unless both types are identical.
#[inline(always)]
#[must_use]
pub fn unsafe_cast_mut<A: Any, B: Any>(a: &mut A) -> Option<&mut B> {
    if TypeId::of::<B>() == TypeId::of::<A>() {
        // SAFETY: just checked whether we are pointing to the correct type
        Some(unsafe { &mut *(a as *mut A as *mut B) })
    } else {
        None
    }
}

/// View an ancestor stored inside a value.
///
/// `offset` must come from the ancestry table of the value's concrete type, which only
/// records offsets produced by [`core::mem::offset_of!`] on a field of type `T`.
#[inline(always)]
#[must_use]
pub(crate) fn unsafe_view_at<T: Any>(value: &dyn Any, offset: usize) -> &T {
    let base = value as *const dyn Any as *const u8;
    // SAFETY: the offset points to a properly aligned, live field of type `T` inside
    // `value`, and the returned borrow is tied to the borrow of `value`.
    unsafe { &*(base.add(offset) as *const T) }
}

/// Mutable variant of [`unsafe_view_at`].
#[inline(always)]
#[must_use]
pub(crate) fn unsafe_view_at_mut<T: Any>(value: &mut dyn Any, offset: usize) -> &mut T {
    let base = value as *mut dyn Any as *mut u8;
    // SAFETY: see `unsafe_view_at`; exclusivity is inherited from `value`.
    unsafe { &mut *(base.add(offset) as *mut T) }
}

/// Re-erase an ancestor stored inside a value as a [`&dyn Any`][Any] of its own type.
///
/// `erase` must be the erasure function registered for the ancestor's type.
#[inline(always)]
#[must_use]
pub(crate) fn unsafe_erase_at(
    value: &dyn Any,
    offset: usize,
    erase: fn(*const u8) -> *const dyn Any,
) -> &dyn Any {
    let base = value as *const dyn Any as *const u8;
    // SAFETY: same contract as `unsafe_view_at`; `erase` restores the metadata of the
    // ancestor's concrete type without touching the data.
    unsafe { &*erase(base.add(offset)) }
}
