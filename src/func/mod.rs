//! Module defining mechanisms to handle native function calls.

pub mod args;
pub mod hashing;
pub mod native;
pub mod register;

pub use args::FuncArgs;
pub use hashing::{calc_member_hash, get_hasher, StraightHasherBuilder};
pub use native::{
    locked_read, locked_write, new_locked, shared_read_lock, shared_write_lock, FnConstMethod,
    FnHandler, FnMutMethod, FnThunk, LockGuard, Locked, MethodThunk, ReadGuard, SendSync, Shared,
    WeakShared,
};
pub use register::{NativeConstructor, NativeFunction, NativeMethod};
