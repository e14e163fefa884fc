//! # metaclass - runtime reflection for Rust
//!
//! `metaclass` lets a program describe its types at run-time and work with them without
//! knowing them at compile-time: look up a class by name, construct instances, read and
//! write attributes, call methods, and implement registered interfaces with closures.
//!
//! Types take part in reflection by being registered explicitly. Here is a quick example:
//!
//! ```
//! use metaclass::{register_class, Class, Dynamic, ReflectError};
//!
//! #[derive(Clone)]
//! struct Point { x: f64, y: f64 }
//!
//! fn main() -> Result<(), Box<ReflectError>> {
//!     register_class::<Point>("demo::Point")
//!         .constructor(|x: f64, y: f64| Point { x, y })
//!         .attribute("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x)
//!         .method("norm", |p: &Point| p.x.hypot(p.y));
//!
//!     let class = Class::lookup("demo::Point");
//!
//!     // Integers are converted to the `f64` parameters.
//!     let mut point = class.construct((3, 4))?;
//!
//!     let norm = class.method("norm")?.call(&mut point, ())?;
//!     assert_eq!(norm.cast::<f64>(), 5.0);
//!
//!     class.attribute("x")?.set(&mut point, 6.0)?;
//!     assert_eq!(point.cast::<Point>().x, 6.0);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Optional features
//!
//! | Feature | Description                                                                                                        |
//! | ------- | ------------------------------------------------------------------------------------------------------------------ |
//! | `sync`  | Restrict all values types to those that are `Send + Sync`. Under this feature, [`Dynamic`] and [`Proxy`] are `Send + Sync`. |
//!
//! ## Logging
//!
//! Registration and resolution events are reported through [`tracing`]: registrations at
//! `debug`, stub instantiation at `trace`, and ignored duplicate registrations at `warn`.

#![warn(missing_docs)]

pub mod api;
mod error;
pub mod func;
pub mod meta;
pub mod proxy;
mod r#unsafe;
pub mod types;

#[cfg(test)]
mod tests;

/// An identifier. Short names are stored in-line.
pub type Identifier = SmartString;

/// Alias to [`smartstring::SmartString`]`<`[`smartstring::LazyCompact`]`>`.
pub type SmartString = smartstring::SmartString<smartstring::LazyCompact>;

/// Alias to [`smallvec::SmallVec`]`<[T; 3]>`, which is a [`Vec`] backed by a small, inline,
/// fixed-size array when there are `<= 3` items stored.
///
/// Most reflected members take three parameters or fewer.
pub type StaticVec<T> = smallvec::SmallVec<[T; 3]>;

pub use api::{
    register_class, register_fn, register_type, register_unclonable_class, ClassBuilder,
    TypeBuilder,
};
pub use error::{ReflectError, ReflectResult};
pub use func::{calc_member_hash, FuncArgs, SendSync, Shared};
pub use meta::{
    overloads, overrides, Attribute, AttributeInfo, Class, ClassInfo, Constructor,
    ConstructorInfo, Function, FunctionInfo, Method, MethodInfo, Qualifiers, Registry, TypeSpec,
};
pub use proxy::{
    Interface, InterfaceRef, InterfaceStub, Proxy, ProxyLink, ProxyStub, StubFactory,
};
pub use types::{
    Ancestor, AccessMode, CacheStats, Dynamic, Float, Int, Number, TypeCategory, Variant,
};
