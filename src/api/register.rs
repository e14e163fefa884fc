//! Module that defines the public registration API.

use crate::api::class_builder::ClassBuilder;
use crate::func::{calc_member_hash, NativeFunction};
use crate::meta::{Function, FunctionInfo, Qualifiers, Registry, TypeSpec};
use crate::types::dynamic::Variant;
use crate::types::type_info;
use crate::{Ancestor, Dynamic, Identifier, TypeCategory};
use std::fmt;
use std::marker::PhantomData;

/// Start registering a clonable type as a class.
///
/// Values of the class are copied with [`Clone`].
///
/// # Example
///
/// ```
/// use metaclass::{register_class, Class};
///
/// #[derive(Clone, Default)]
/// struct Counter { count: i64 }
///
/// register_class::<Counter>("demo::Counter")
///     .default_constructor()
///     .method("get", |c: &Counter| c.count)
///     .method("bump", |c: &mut Counter, by: i64| c.count += by);
///
/// let class = Class::lookup("demo::Counter");
/// assert!(class.is_valid());
/// assert_eq!(class.methods().unwrap().len(), 2);
/// ```
#[must_use]
pub fn register_class<T: Variant + Clone>(name: impl Into<Identifier>) -> ClassBuilder<T> {
    ClassBuilder::new(name, Dynamic::from::<T>)
}

/// Start registering a type that cannot be cloned as a class.
///
/// Embedded values of the class fail with
/// [`ErrorNotCopyable`][crate::ReflectError::ErrorNotCopyable] when copied; references
/// to them can still be shared.
#[must_use]
pub fn register_unclonable_class<T: Variant>(name: impl Into<Identifier>) -> ClassBuilder<T> {
    ClassBuilder::new(name, Dynamic::from_unclonable::<T>)
}

/// Register a free function under a fully-qualified name.
///
/// Functions are told apart by name and parameter types: registering the same name with
/// other parameter types adds an overload, while registering an identical signature again
/// is ignored and returns the existing function.
///
/// The function may return a [`ReflectResult`][crate::ReflectResult] to report failures.
pub fn register_fn<A, R, X, F: NativeFunction<A, R, X>>(
    name: impl Into<Identifier>,
    func: F,
) -> Function {
    let name = name.into();
    let params = F::param_types();
    let hash = calc_member_hash(
        None,
        &name,
        params.iter().map(TypeSpec::type_id),
        Qualifiers::empty(),
    );

    let registry = Registry::global();

    if let Some(existing) = registry.function_by_hash(hash) {
        tracing::warn!(function = %existing.signature(), "function already registered");
        return Function::from_info(existing);
    }

    let info = registry.insert_function(Box::leak(Box::new(FunctionInfo {
        name,
        ret: F::return_type(),
        params,
        hash,
        thunk: func.into_thunk(),
    })));

    tracing::debug!(function = %info.signature(), "function registered");

    Function::from_info(info)
}

/// Register the run-time type information of `T` without making it a class.
///
/// Use this for types that only appear as values: parameters, return types or attributes.
///
/// # Example
///
/// ```
/// use metaclass::{register_type, Dynamic};
///
/// #[derive(Clone, PartialEq)]
/// struct Celsius(f64);
///
/// register_type::<Celsius>("units::Celsius").equality();
///
/// let a = Dynamic::from(Celsius(21.5));
/// let b = Dynamic::from(Celsius(21.5));
///
/// assert_eq!(a.display_type_name().as_str(), "units::Celsius");
/// assert!(a.equals(&b).unwrap());
/// ```
pub fn register_type<T: Variant>(name: impl Into<Identifier>) -> TypeBuilder<T> {
    type_info::set_name::<T>(name);
    TypeBuilder(PhantomData)
}

/// Builder of the run-time type information of a type.
pub struct TypeBuilder<T: Variant>(PhantomData<fn() -> T>);

impl<T: Variant> TypeBuilder<T> {
    /// Register the equality operation of `T`.
    pub fn equality(&mut self) -> &mut Self
    where
        T: PartialEq,
    {
        type_info::set_equality::<T>();
        self
    }
    /// Register the display operation of `T`.
    pub fn display(&mut self) -> &mut Self
    where
        T: fmt::Display,
    {
        type_info::set_display::<T>();
        self
    }
    /// Set the category of `T`.
    ///
    /// [`Pod`][TypeCategory::Pod] and [`Pointer`][TypeCategory::Pointer] are only ever
    /// set this way.
    pub fn category(&mut self, category: TypeCategory) -> &mut Self {
        type_info::set_category::<T>(category);
        self
    }
    /// Record an ancestor of `T`.
    ///
    /// An ancestor describing a field of another type is ignored.
    pub fn ancestor(&mut self, ancestor: Ancestor) -> &mut Self {
        if !type_info::add_ancestor::<T>(ancestor) {
            tracing::warn!(
                ancestor = ancestor.type_name(),
                "ancestor describes a field of another type; ignored"
            );
        }
        self
    }
}

impl<T: Variant> fmt::Debug for TypeBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeBuilder")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}
