//! Module that defines the [`ClassBuilder`] used to register a class.

use crate::func::{
    calc_member_hash, MethodThunk, NativeConstructor, NativeFunction, NativeMethod,
};
use crate::meta::attribute::{FnGetter, FnSetter};
use crate::meta::class::ClassState;
use crate::meta::{
    AttributeInfo, Class, ClassInfo, ConstructorInfo, MethodInfo, Qualifiers, Registry, TypeSpec,
};
use crate::proxy::StubFactory;
use crate::types::dynamic::Variant;
use crate::types::type_info;
use crate::{Ancestor, Dynamic, Identifier, StaticVec, TypeCategory};
use parking_lot::RwLockWriteGuard;
use std::any::TypeId;
use std::fmt;

/// Builder of the descriptor of a class.
///
/// Obtained from [`register_class`][crate::register_class] or
/// [`register_unclonable_class`][crate::register_unclonable_class]. The class is added to
/// the registry by [`build`][ClassBuilder::build], or when the builder is dropped.
///
/// Registering a type that is already registered yields a builder that ignores every
/// declaration and builds into the existing class.
///
/// # Example
///
/// ```
/// use metaclass::{ancestor, register_class, Class, Dynamic};
///
/// #[derive(Clone, PartialEq)]
/// struct Shape { sides: u32 }
///
/// #[derive(Clone)]
/// struct Square { shape: Shape, length: f64 }
///
/// register_class::<Shape>("demo::Shape")
///     .readonly_attribute("sides", |s: &Shape| &s.sides)
///     .equality()
///     .build();
///
/// let square = register_class::<Square>("demo::Square")
///     .base("demo::Shape", ancestor!(Square, shape))
///     .constructor(|length: f64| Square { shape: Shape { sides: 4 }, length })
///     .attribute("length", |s: &Square| &s.length, |s: &mut Square| &mut s.length)
///     .build();
///
/// let value = square.construct((2.5,)).unwrap();
///
/// // Inherited attribute, read through a view of the `Shape` inside the `Square`.
/// let sides = square.attribute("sides").unwrap().get(&value).unwrap();
/// assert_eq!(sides.cast::<u32>(), 4);
/// assert!(value.is::<Shape>());
/// ```
pub struct ClassBuilder<T: Variant> {
    info: &'static ClassInfo,
    fresh: bool,
    wrap: fn(T) -> Dynamic,
    class: Option<Class>,
}

impl<T: Variant> ClassBuilder<T> {
    /// Start registering `T` under a name.
    pub(crate) fn new(name: impl Into<Identifier>, wrap: fn(T) -> Dynamic) -> Self {
        let name = name.into();
        let registry = Registry::global();

        let existing = registry
            .class_by_type(TypeId::of::<T>())
            .or_else(|| registry.class_by_name(&name));

        if let Some(existing) = existing {
            tracing::warn!(class = %name, "class already registered");

            return Self {
                info: existing,
                fresh: false,
                wrap,
                class: Some(Class::from_info(existing)),
            };
        }

        type_info::set_name::<T>(name.clone());

        Self {
            info: Box::leak(Box::new(ClassInfo::new::<T>(name))),
            fresh: true,
            wrap,
            class: None,
        }
    }
    /// Lock the descriptor for modification, unless it is already closed.
    fn state(&self) -> Option<RwLockWriteGuard<'static, ClassState>> {
        if self.fresh {
            self.info.state_mut()
        } else {
            None
        }
    }
    /// Is this builder registering a new class?
    #[inline(always)]
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Declare a superclass stored in-line in `T`.
    ///
    /// The superclass does not have to be registered yet. Values of `T` can be viewed as the
    /// ancestor's type right away; the superclass' members are merged into this class once
    /// it is registered and resolved.
    ///
    /// Use the [`ancestor!`][crate::ancestor] macro to describe the field holding the base.
    pub fn base(&mut self, name: impl Into<Identifier>, ancestor: Ancestor) -> &mut Self {
        if !self.fresh {
            return self;
        }

        let name = name.into();

        if !type_info::add_ancestor::<T>(ancestor) {
            tracing::warn!(
                class = %self.info.name(),
                base = %name,
                "ancestor describes a field of another type; ignored"
            );
            return self;
        }

        self.inherits(name)
    }
    /// Declare a superclass by name only, without any in-line ancestor.
    ///
    /// This is how interfaces extend other interfaces.
    pub fn inherits(&mut self, name: impl Into<Identifier>) -> &mut Self {
        let name = name.into();

        if let Some(mut state) = self.state() {
            if !state.bases.contains(&name) {
                state.bases.push(name.clone());
                state.pending.push(name);
            }
        }
        self
    }
    /// Register a constructor.
    pub fn constructor<A, X, F: NativeConstructor<T, A, X>>(&mut self, func: F) -> &mut Self {
        if let Some(mut state) = self.state() {
            let info = Box::leak(Box::new(ConstructorInfo {
                class: self.info,
                params: F::param_types(),
                thunk: func.into_thunk(self.wrap),
            }));
            state.constructors.push(info);
        }
        self
    }
    /// Register the default constructor, built on [`Default`].
    pub fn default_constructor(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.constructor::<(), (), _>(T::default)
    }
    /// Register a method.
    ///
    /// A function taking `&T` first registers a const method; one taking `&mut T`
    /// registers a non-const method.
    pub fn method<A, R, X, F: NativeMethod<T, A, R, X>>(
        &mut self,
        name: impl Into<Identifier>,
        func: F,
    ) -> &mut Self {
        self.method_with(name, Qualifiers::empty(), func)
    }
    /// Register a method with extra qualifiers.
    ///
    /// Only [`VOLATILE`][Qualifiers::VOLATILE] is taken from `qualifiers`: constness always
    /// follows the receiver of the function.
    pub fn method_with<A, R, X, F: NativeMethod<T, A, R, X>>(
        &mut self,
        name: impl Into<Identifier>,
        qualifiers: Qualifiers,
        func: F,
    ) -> &mut Self {
        let mut qualifiers = qualifiers & Qualifiers::VOLATILE;
        if F::IS_CONST {
            qualifiers |= Qualifiers::CONST;
        }
        self.add_method(
            name.into(),
            F::return_type(),
            F::param_types(),
            qualifiers,
            func.into_thunk(),
        )
    }
    /// Register a static method, callable without an object.
    pub fn static_method<A, R, X, F: NativeFunction<A, R, X>>(
        &mut self,
        name: impl Into<Identifier>,
        func: F,
    ) -> &mut Self {
        self.add_method(
            name.into(),
            F::return_type(),
            F::param_types(),
            Qualifiers::STATIC,
            MethodThunk::Static(func.into_thunk()),
        )
    }
    fn add_method(
        &mut self,
        name: Identifier,
        ret: TypeSpec,
        params: StaticVec<TypeSpec>,
        qualifiers: Qualifiers,
        thunk: MethodThunk,
    ) -> &mut Self {
        if let Some(mut state) = self.state() {
            let hash = calc_member_hash(
                Some(TypeId::of::<T>()),
                &name,
                params.iter().map(TypeSpec::type_id),
                qualifiers,
            );
            let info = Box::leak(Box::new(MethodInfo {
                name,
                class: self.info,
                ret,
                params,
                qualifiers,
                hash,
                thunk,
            }));
            state.methods.push(info);
        }
        self
    }
    /// Register a read-write attribute.
    ///
    /// Values written are converted into `V` first.
    pub fn attribute<V: Variant + Clone>(
        &mut self,
        name: impl Into<Identifier>,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        let setter: Box<FnSetter> = Box::new(move |obj: &mut Dynamic, value: Dynamic| {
            let value = value.into_converted::<V>()?;
            obj.with_mut(|this: &mut T| *get_mut(this) = value)
        });
        self.add_attribute(name.into(), get, Some(setter))
    }
    /// Register a read-only attribute.
    pub fn readonly_attribute<V: Variant + Clone>(
        &mut self,
        name: impl Into<Identifier>,
        get: fn(&T) -> &V,
    ) -> &mut Self {
        self.add_attribute(name.into(), get, None)
    }
    fn add_attribute<V: Variant + Clone>(
        &mut self,
        name: Identifier,
        get: fn(&T) -> &V,
        setter: Option<Box<FnSetter>>,
    ) -> &mut Self {
        if let Some(mut state) = self.state() {
            let getter: Box<FnGetter> = Box::new(move |obj: &Dynamic| {
                obj.with_ref(|this: &T| Dynamic::from(get(this).clone()))
            });
            let info = Box::leak(Box::new(AttributeInfo {
                name,
                class: self.info,
                ty: TypeSpec::of::<V>(),
                getter,
                setter,
            }));
            state.attributes.push(info);
        }
        self
    }
    /// Register the equality operation of `T`, used by [`Dynamic::equals`].
    pub fn equality(&mut self) -> &mut Self
    where
        T: PartialEq,
    {
        if self.fresh {
            type_info::set_equality::<T>();
        }
        self
    }
    /// Register the display operation of `T`, used to stringify values.
    pub fn display(&mut self) -> &mut Self
    where
        T: fmt::Display,
    {
        if self.fresh {
            type_info::set_display::<T>();
        }
        self
    }
    /// Set the category of `T`.
    ///
    /// Needed for [`Pod`][TypeCategory::Pod] and [`Pointer`][TypeCategory::Pointer] types,
    /// which are never inferred.
    pub fn category(&mut self, category: TypeCategory) -> &mut Self {
        if self.fresh {
            type_info::set_category::<T>(category);
        }
        self
    }
    /// Mark the class as an interface, with the factory of its proxy stub.
    ///
    /// Normally called by [`reflect_interface!`][crate::reflect_interface].
    pub fn interface(&mut self, factory: StubFactory) -> &mut Self {
        if let Some(mut state) = self.state() {
            state.stub = Some(factory);
            type_info::set_category::<T>(TypeCategory::Pointer);
        }
        self
    }
    /// Close the descriptor and add the class to the registry.
    ///
    /// Calling this again returns the same handle.
    pub fn build(&mut self) -> Class {
        if let Some(class) = self.class {
            return class;
        }

        self.info.close();
        let info = Registry::global().insert_class(self.info);

        tracing::debug!(
            class = %info.name(),
            methods = info.own_methods().len(),
            constructors = info.constructors().len(),
            bases = info.declared_bases().len(),
            "class registered"
        );

        let class = Class::from_info(info);
        self.class = Some(class);
        class
    }
}

impl<T: Variant> Drop for ClassBuilder<T> {
    fn drop(&mut self) {
        self.build();
    }
}

impl<T: Variant> fmt::Debug for ClassBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("name", &self.info.name())
            .field("fresh", &self.fresh)
            .field("built", &self.class.is_some())
            .finish()
    }
}
