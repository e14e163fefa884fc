//! Module defining interfaces to native-Rust functions.

use crate::{Dynamic, ReflectResult};

/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(feature = "sync")]
pub trait SendSync: Send + Sync {}
/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(feature = "sync")]
impl<T: Send + Sync> SendSync for T {}

/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(not(feature = "sync"))]
pub trait SendSync {}
/// Trait that maps to `Send + Sync` only under the `sync` feature.
#[cfg(not(feature = "sync"))]
impl<T> SendSync for T {}

/// Immutable reference-counted container.
#[cfg(not(feature = "sync"))]
pub use std::rc::Rc as Shared;
/// Immutable reference-counted container.
#[cfg(feature = "sync")]
pub use std::sync::Arc as Shared;

/// Weak reference to a [`Shared`] container.
#[cfg(not(feature = "sync"))]
pub use std::rc::Weak as WeakShared;
/// Weak reference to a [`Shared`] container.
#[cfg(feature = "sync")]
pub use std::sync::Weak as WeakShared;

/// Synchronized shared object.
#[cfg(not(feature = "sync"))]
pub use std::cell::RefCell as Locked;
/// Synchronized shared object.
#[cfg(feature = "sync")]
pub use parking_lot::RwLock as Locked;

/// Read guard for synchronized shared object.
#[cfg(not(feature = "sync"))]
pub type ReadGuard<'a, T> = std::cell::Ref<'a, T>;
/// Read guard for synchronized shared object.
#[cfg(feature = "sync")]
pub type ReadGuard<'a, T> = parking_lot::RwLockReadGuard<'a, T>;

/// Lock guard for synchronized shared object.
#[cfg(not(feature = "sync"))]
pub type LockGuard<'a, T> = std::cell::RefMut<'a, T>;
/// Lock guard for synchronized shared object.
#[cfg(feature = "sync")]
pub type LockGuard<'a, T> = parking_lot::RwLockWriteGuard<'a, T>;

/// Create a new [`Locked`] object.
#[inline(always)]
#[must_use]
pub fn new_locked<T>(value: T) -> Locked<T> {
    Locked::new(value)
}

/// Read-lock a [`Locked`] resource.
///
/// Returns [`None`] if the resource is currently locked for write.
#[inline(always)]
#[must_use]
pub fn locked_read<T: ?Sized>(value: &Locked<T>) -> Option<ReadGuard<T>> {
    #[cfg(not(feature = "sync"))]
    return value.try_borrow().ok();

    #[cfg(feature = "sync")]
    return value.try_read();
}

/// Write-lock a [`Locked`] resource.
///
/// Returns [`None`] if the resource is currently locked.
#[inline(always)]
#[must_use]
pub fn locked_write<T: ?Sized>(value: &Locked<T>) -> Option<LockGuard<T>> {
    #[cfg(not(feature = "sync"))]
    return value.try_borrow_mut().ok();

    #[cfg(feature = "sync")]
    return value.try_write();
}

/// Read-lock a [`Locked`] resource, blocking while it is locked for write.
///
/// Without the `sync` feature, there is no other thread to wait for: the resource must
/// not be borrowed mutably by the caller.
#[inline(always)]
#[must_use]
pub fn shared_read_lock<T: ?Sized>(value: &Locked<T>) -> ReadGuard<T> {
    #[cfg(not(feature = "sync"))]
    return value.borrow();

    #[cfg(feature = "sync")]
    return value.read();
}

/// Write-lock a [`Locked`] resource, blocking while it is locked.
///
/// Without the `sync` feature, there is no other thread to wait for: the resource must
/// not be borrowed by the caller.
#[inline(always)]
#[must_use]
pub fn shared_write_lock<T: ?Sized>(value: &Locked<T>) -> LockGuard<T> {
    #[cfg(not(feature = "sync"))]
    return value.borrow_mut();

    #[cfg(feature = "sync")]
    return value.write();
}

/// A native function taking positional arguments only.
///
/// Descriptors live in the process-wide registry, so thunks are always `Send + Sync`.
pub type FnThunk = dyn Fn(&mut [Dynamic]) -> ReflectResult<Dynamic> + Send + Sync;

/// A native method borrowing its object immutably.
pub type FnConstMethod = dyn Fn(&Dynamic, &mut [Dynamic]) -> ReflectResult<Dynamic> + Send + Sync;

/// A native method borrowing its object mutably.
pub type FnMutMethod =
    dyn Fn(&mut Dynamic, &mut [Dynamic]) -> ReflectResult<Dynamic> + Send + Sync;

/// A proxy handler implementing one interface operation.
#[cfg(not(feature = "sync"))]
pub type FnHandler = dyn Fn(&mut [Dynamic]) -> ReflectResult<Dynamic>;
/// A proxy handler implementing one interface operation.
#[cfg(feature = "sync")]
pub type FnHandler = dyn Fn(&mut [Dynamic]) -> ReflectResult<Dynamic> + Send + Sync;

/// Bound invocation thunk of a method.
pub enum MethodThunk {
    /// Method taking `&self`.
    Const(Box<FnConstMethod>),
    /// Method taking `&mut self`.
    Mut(Box<FnMutMethod>),
    /// Associated function without an object.
    Static(Box<FnThunk>),
}

impl std::fmt::Debug for MethodThunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Const(..) => "MethodThunk::Const",
            Self::Mut(..) => "MethodThunk::Mut",
            Self::Static(..) => "MethodThunk::Static",
        })
    }
}
