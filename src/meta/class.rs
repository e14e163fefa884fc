//! Class descriptors and the [`Class`] handle.

use crate::func::FuncArgs;
use crate::meta::{
    def_handle, Attribute, AttributeInfo, Constructor, ConstructorInfo, Method, MethodInfo,
    Registry,
};
use crate::proxy::StubFactory;
use crate::types::dynamic::Variant;
use crate::{Dynamic, Identifier, ReflectError, ReflectResult};
use once_cell::sync::Lazy;
use parking_lot::{ReentrantMutex, RwLock, RwLockWriteGuard};
use std::any::{type_name, TypeId};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Held while superclasses are being resolved.
static RESOLUTION: Lazy<ReentrantMutex<()>> = Lazy::new(|| ReentrantMutex::new(()));

/// Mutable part of a class descriptor.
#[derive(Default)]
pub(crate) struct ClassState {
    /// Methods declared on the class itself.
    pub methods: Vec<&'static MethodInfo>,
    /// Attributes declared on the class itself.
    pub attributes: Vec<&'static AttributeInfo>,
    /// Constructors. These are never inherited.
    pub constructors: Vec<&'static ConstructorInfo>,
    /// Names of the superclasses, in declaration order.
    pub bases: Vec<Identifier>,
    /// Names of the superclasses that are not resolved yet.
    pub pending: Vec<Identifier>,
    /// Stub factory of an interface.
    pub stub: Option<StubFactory>,
    /// Flattened lists must be rebuilt.
    dirty: bool,
    flat_methods: Vec<&'static MethodInfo>,
    flat_attributes: Vec<&'static AttributeInfo>,
    superclasses: Vec<&'static ClassInfo>,
}

fn push_unique<T>(list: &mut Vec<&'static T>, item: &'static T) {
    if !list.iter().any(|&x| ptr::eq(x, item)) {
        list.push(item);
    }
}

/// Descriptor of a registered class.
///
/// The descriptor is open while its class is being registered and closed forever after.
/// Superclasses named at registration are resolved lazily, whenever the class is looked up,
/// and their methods and attributes are then merged into the class.
pub struct ClassInfo {
    name: Identifier,
    type_id: TypeId,
    type_name: &'static str,
    open: AtomicBool,
    resolving: AtomicBool,
    state: RwLock<ClassState>,
}

impl ClassInfo {
    /// Create an open descriptor for `T`.
    pub(crate) fn new<T: Variant>(name: Identifier) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            open: AtomicBool::new(true),
            resolving: AtomicBool::new(false),
            state: RwLock::new(ClassState {
                dirty: true,
                ..ClassState::default()
            }),
        }
    }
    /// Modify an open descriptor.
    ///
    /// Returns [`None`] once the descriptor is closed.
    pub(crate) fn state_mut(&self) -> Option<RwLockWriteGuard<'_, ClassState>> {
        if !self.is_open() {
            return None;
        }
        let mut state = self.state.write();
        state.dirty = true;
        Some(state)
    }
    /// Close the descriptor.
    pub(crate) fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Fully-qualified name of the class.
    #[inline(always)]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Type identity of the class.
    #[inline(always)]
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }
    /// Rust name of the class type.
    #[inline(always)]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
    /// Is the descriptor still being registered?
    #[inline(always)]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
    /// Is the class an interface that a proxy can implement?
    #[inline]
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.state.read().stub.is_some()
    }
    #[inline]
    pub(crate) fn stub_factory(&self) -> Option<StubFactory> {
        self.state.read().stub
    }
    /// Are all superclasses resolved?
    #[must_use]
    pub fn is_resolved(&'static self) -> bool {
        self.resolve();
        !self.is_open() && self.state.read().pending.is_empty()
    }
    /// Names of the superclasses that are not registered (or not resolved) yet.
    #[must_use]
    pub fn unresolved_bases(&'static self) -> Vec<Identifier> {
        self.resolve();
        self.state.read().pending.clone()
    }
    /// Names of all declared superclasses, in declaration order.
    #[must_use]
    pub fn declared_bases(&self) -> Vec<Identifier> {
        self.state.read().bases.clone()
    }
    /// Methods, including inherited ones. Own methods come first.
    #[must_use]
    pub fn methods(&'static self) -> Vec<&'static MethodInfo> {
        self.resolve();
        self.state.read().flat_methods.clone()
    }
    /// Methods declared on the class itself.
    #[must_use]
    pub fn own_methods(&self) -> Vec<&'static MethodInfo> {
        self.state.read().methods.clone()
    }
    /// Attributes, including inherited ones. Own attributes come first.
    #[must_use]
    pub fn attributes(&'static self) -> Vec<&'static AttributeInfo> {
        self.resolve();
        self.state.read().flat_attributes.clone()
    }
    /// Constructors.
    #[must_use]
    pub fn constructors(&self) -> Vec<&'static ConstructorInfo> {
        self.state.read().constructors.clone()
    }
    /// Resolved superclasses, direct ones first, then their own superclasses.
    #[must_use]
    pub fn superclasses(&'static self) -> Vec<&'static ClassInfo> {
        self.resolve();
        self.state.read().superclasses.clone()
    }
    /// Is `other` a resolved superclass of this class?
    ///
    /// A class is not a subclass of itself.
    #[must_use]
    pub fn is_subclass_of(&'static self, other: &ClassInfo) -> bool {
        self.superclasses().iter().any(|&c| ptr::eq(c, other))
    }
    /// Human-readable declaration, e.g. `demo::Derived : demo::Base`.
    #[must_use]
    pub fn signature(&self) -> String {
        let bases = self.declared_bases();

        if bases.is_empty() {
            self.name.to_string()
        } else {
            format!("{} : {}", self.name, bases.join(", "))
        }
    }

    fn is_settled(&self) -> bool {
        let state = self.state.read();
        !state.dirty && state.pending.is_empty()
    }
    /// Try to resolve pending superclasses and rebuild the flattened member lists.
    ///
    /// A base is merged only once it is itself fully resolved, so the outcome does not
    /// depend on the order in which classes were registered.
    ///
    /// Resolution is serialized process-wide: a thread arriving while another one resolves
    /// waits for it and then sees its outcome. Re-entering a class that is being resolved
    /// on the same thread means a cycle, and leaves that class pending.
    pub(crate) fn resolve(&'static self) {
        if self.is_settled() || self.is_open() {
            return;
        }

        let _guard = RESOLUTION.lock();

        if self.is_settled() || self.resolving.swap(true, Ordering::AcqRel) {
            return;
        }

        let declared = self.state.read().bases.clone();
        let registry = Registry::global();
        let mut resolved = Vec::with_capacity(declared.len());
        let mut pending = Vec::new();

        for name in declared {
            match registry.class_by_name(&name) {
                Some(base) if !ptr::eq(base, self) && base.is_resolved() => resolved.push(base),
                _ => pending.push(name),
            }
        }

        let mut guard = self.state.write();
        let state = &mut *guard;
        let newly_resolved = state.pending.len().saturating_sub(pending.len());

        state.flat_methods.clone_from(&state.methods);
        state.flat_attributes.clone_from(&state.attributes);
        state.superclasses.clear();

        for &base in &resolved {
            let base_state = base.state.read();

            push_unique(&mut state.superclasses, base);
            for &class in &base_state.superclasses {
                push_unique(&mut state.superclasses, class);
            }
            for &method in &base_state.flat_methods {
                push_unique(&mut state.flat_methods, method);
            }
            for &attribute in &base_state.flat_attributes {
                push_unique(&mut state.flat_attributes, attribute);
            }
        }

        state.pending = pending;
        state.dirty = false;

        if newly_resolved > 0 {
            tracing::debug!(
                class = %self.name,
                resolved = newly_resolved,
                pending = state.pending.len(),
                "superclasses resolved"
            );
        }

        drop(guard);
        self.resolving.store(false, Ordering::Release);
    }
}

def_handle!(
    /// Handle to a registered class.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::{register_class, Class};
    ///
    /// #[derive(Clone)]
    /// struct Counter(u32);
    ///
    /// register_class::<Counter>("demo::Counter")
    ///     .constructor(|| Counter(0))
    ///     .method("get", |c: &Counter| c.0)
    ///     .method("bump", |c: &mut Counter| c.0 += 1)
    ///     .build();
    ///
    /// let class = Class::lookup("demo::Counter");
    /// let mut counter = class.construct(()).unwrap();
    ///
    /// class.method("bump").unwrap().call(&mut counter, ()).unwrap();
    /// let value = class.method("get").unwrap().call_const(&counter, ()).unwrap();
    /// assert_eq!(value.cast::<u32>(), 1);
    /// ```
    Class => ClassInfo, "class"
);

impl Class {
    fn resolved(info: Option<&'static ClassInfo>) -> Self {
        match info {
            Some(info) => {
                info.resolve();
                Self::from_info(info)
            }
            None => Self::default(),
        }
    }
    /// Look up a class by its fully-qualified name.
    ///
    /// Returns an invalid handle if no such class is registered.
    #[must_use]
    pub fn lookup(name: &str) -> Self {
        Self::resolved(Registry::global().class_by_name(name))
    }
    /// Look up a class by type identity.
    ///
    /// Returns an invalid handle if no such class is registered.
    #[must_use]
    pub fn lookup_type_id(type_id: TypeId) -> Self {
        Self::resolved(Registry::global().class_by_type(type_id))
    }
    /// Look up the class of `T`.
    #[inline]
    #[must_use]
    pub fn of<T: Variant>() -> Self {
        Self::lookup_type_id(TypeId::of::<T>())
    }
    /// Look up the class of the value held by a [`Dynamic`].
    #[inline]
    #[must_use]
    pub fn of_value(value: &Dynamic) -> Self {
        Self::lookup_type_id(value.type_id())
    }

    /// Fully-qualified name of the class.
    #[inline]
    pub fn name(&self) -> ReflectResult<&'static str> {
        Ok(self.info()?.name())
    }
    /// Type identity of the class.
    #[inline]
    pub fn type_id(&self) -> ReflectResult<TypeId> {
        Ok(self.info()?.type_id())
    }
    /// Methods, including inherited ones.
    pub fn methods(&self) -> ReflectResult<Vec<Method>> {
        Ok(self
            .info()?
            .methods()
            .into_iter()
            .map(Method::from_info)
            .collect())
    }
    /// Constructors.
    pub fn constructors(&self) -> ReflectResult<Vec<Constructor>> {
        Ok(self
            .info()?
            .constructors()
            .into_iter()
            .map(Constructor::from_info)
            .collect())
    }
    /// Attributes, including inherited ones.
    pub fn attributes(&self) -> ReflectResult<Vec<Attribute>> {
        Ok(self
            .info()?
            .attributes()
            .into_iter()
            .map(Attribute::from_info)
            .collect())
    }
    /// Resolved superclasses.
    pub fn superclasses(&self) -> ReflectResult<Vec<Class>> {
        Ok(self
            .info()?
            .superclasses()
            .into_iter()
            .map(Class::from_info)
            .collect())
    }

    /// Find the first method matching a predicate.
    ///
    /// Returns an invalid handle if none matches.
    pub fn find_method(&self, predicate: impl Fn(&MethodInfo) -> bool) -> ReflectResult<Method> {
        Ok(self
            .info()?
            .methods()
            .into_iter()
            .find(|m| predicate(m))
            .map(Method::from_info)
            .unwrap_or_default())
    }
    /// Find all methods matching a predicate.
    pub fn find_all_methods(
        &self,
        predicate: impl Fn(&MethodInfo) -> bool,
    ) -> ReflectResult<Vec<Method>> {
        Ok(self
            .info()?
            .methods()
            .into_iter()
            .filter(|m| predicate(m))
            .map(Method::from_info)
            .collect())
    }
    /// Find the first constructor matching a predicate.
    ///
    /// Returns an invalid handle if none matches.
    pub fn find_constructor(
        &self,
        predicate: impl Fn(&ConstructorInfo) -> bool,
    ) -> ReflectResult<Constructor> {
        Ok(self
            .info()?
            .constructors()
            .into_iter()
            .find(|c| predicate(c))
            .map(Constructor::from_info)
            .unwrap_or_default())
    }
    /// Find the first attribute matching a predicate.
    ///
    /// Returns an invalid handle if none matches.
    pub fn find_attribute(
        &self,
        predicate: impl Fn(&AttributeInfo) -> bool,
    ) -> ReflectResult<Attribute> {
        Ok(self
            .info()?
            .attributes()
            .into_iter()
            .find(|a| predicate(a))
            .map(Attribute::from_info)
            .unwrap_or_default())
    }
    /// Find the first superclass matching a predicate.
    ///
    /// Returns an invalid handle if none matches.
    pub fn find_superclass(&self, predicate: impl Fn(&ClassInfo) -> bool) -> ReflectResult<Class> {
        Ok(self
            .info()?
            .superclasses()
            .into_iter()
            .find(|c| predicate(c))
            .map(Class::from_info)
            .unwrap_or_default())
    }
    /// Get the first method with a given name.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorMemberNotFound`][ReflectError::ErrorMemberNotFound] if there is no
    /// such method.
    pub fn method(&self, name: &str) -> ReflectResult<Method> {
        let info = self.info()?;

        info.methods()
            .into_iter()
            .find(|m| m.name() == name)
            .map(Method::from_info)
            .ok_or_else(|| {
                ReflectError::ErrorMemberNotFound(format!("{}::{}", info.name(), name)).into()
            })
    }
    /// Get the attribute with a given name.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorMemberNotFound`][ReflectError::ErrorMemberNotFound] if there is no
    /// such attribute.
    pub fn attribute(&self, name: &str) -> ReflectResult<Attribute> {
        let info = self.info()?;

        info.attributes()
            .into_iter()
            .find(|a| a.name() == name)
            .map(Attribute::from_info)
            .ok_or_else(|| {
                ReflectError::ErrorMemberNotFound(format!("{}::{}", info.name(), name)).into()
            })
    }

    /// Is `other` a superclass of this class?
    pub fn is_subclass_of(&self, other: &Class) -> ReflectResult<bool> {
        Ok(self.info()?.is_subclass_of(other.info()?))
    }
    /// Is this class an interface that a proxy can implement?
    #[inline]
    pub fn is_interface(&self) -> ReflectResult<bool> {
        Ok(self.info()?.is_interface())
    }
    /// Are all superclasses of this class resolved?
    #[inline]
    pub fn is_resolved(&self) -> ReflectResult<bool> {
        Ok(self.info()?.is_resolved())
    }
    /// Names of the superclasses that are not resolved yet.
    #[inline]
    pub fn unresolved_bases(&self) -> ReflectResult<Vec<Identifier>> {
        Ok(self.info()?.unresolved_bases())
    }
    /// Get the constructor taking no arguments.
    ///
    /// Returns an invalid handle if the class has none.
    pub fn default_constructor(&self) -> ReflectResult<Constructor> {
        self.find_constructor(|c| c.arity() == 0)
    }
    /// Construct an instance with the first constructor accepting the arguments.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorMemberNotFound`][ReflectError::ErrorMemberNotFound] if no
    /// constructor takes that many arguments of those types.
    pub fn construct(&self, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let info = self.info()?;
        let mut args = args.into_vec();

        let constructor = info.constructors().into_iter().find(|c| {
            c.arity() == args.len() && c.params().iter().zip(args.iter()).all(|(p, a)| p.accepts(a))
        });

        match constructor {
            Some(constructor) => constructor.invoke(&mut args),
            None => {
                let types: Vec<_> = args.iter().map(|a| a.display_type_name()).collect();
                Err(ReflectError::ErrorMemberNotFound(format!(
                    "{}::{}({})",
                    info.name(),
                    crate::meta::signature::short_name(info.name()),
                    types.join(", ")
                ))
                .into())
            }
        }
    }
}
