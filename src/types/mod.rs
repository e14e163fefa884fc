//! Module defining the dynamic value and the runtime type system.

pub mod boxed;
pub mod cache;
pub mod dynamic;
pub mod number;
pub mod type_info;

pub use cache::{CacheStats, CastEntry};
pub use dynamic::{AccessMode, Dynamic, Variant};
pub use number::{Float, Int, Number};
pub use type_info::{Ancestor, TypeCategory};
