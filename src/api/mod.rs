//! Module defining the public registration API.

pub mod class_builder;
pub mod register;

pub use class_builder::ClassBuilder;
pub use register::{register_class, register_fn, register_type, register_unclonable_class, TypeBuilder};
