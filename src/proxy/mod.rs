//! Module defining dynamic proxies: run-time implementations of registered interfaces
//! whose operations are dispatched to handler closures.
//!
//! An interface is a trait declared with [`reflect_interface!`][crate::reflect_interface].
//! The macro implements the trait for every [`ProxyStub`] by forwarding each operation into
//! the stub's [`ProxyLink`], declares a stub type, and registers the interface class
//! together with a factory for that stub. A stub of a derived interface forwards the
//! operations of its base interfaces too.
//!
//! Stubs own their proxy state through the [`ProxyLink`]; the state only keeps weak
//! references to its stubs. Dropping the last [`Proxy`] handle therefore keeps the state
//! alive for as long as a stub handed out by [`Proxy::reference`] is alive.

mod macros;

use crate::func::{
    new_locked, shared_read_lock, shared_write_lock, FnHandler, Locked, SendSync, Shared,
    StraightHasherBuilder, WeakShared,
};
use crate::meta::{Class, Method};
use crate::types::dynamic::Variant;
use crate::{Dynamic, ReflectError, ReflectResult};
use std::collections::HashMap;
use std::fmt;

/// The registered type of an interface `I`: a shared pointer to an implementation.
pub type InterfaceRef<I> = Shared<I>;

/// Creates a stub linked to a proxy.
///
/// Returns the stub as an [`InterfaceRef`] inside a [`Dynamic`], together with a weak
/// handle to it.
pub type StubFactory = fn(ProxyLink) -> (Dynamic, Box<dyn InterfaceStub>);

/// An interface trait object declared with [`reflect_interface!`][crate::reflect_interface].
pub trait Interface {
    /// Name of the registered interface class.
    const NAME: &'static str;
}

/// A stub forwarding interface operations into a proxy.
///
/// Every interface trait is implemented for every [`ProxyStub`].
pub trait ProxyStub: SendSync {
    /// Link to the proxy behind this stub.
    #[must_use]
    fn link(&self) -> &ProxyLink;
}

/// Weak handle to a live stub.
pub trait InterfaceStub: SendSync {
    /// Get the stub back as an [`InterfaceRef`] inside a [`Dynamic`], if it is still alive.
    #[must_use]
    fn upgrade(&self) -> Option<Dynamic>;
}

/// Weak handle to a stub implementing interface `I`.
pub struct WeakInterface<I: ?Sized>(WeakShared<I>);

impl<I: ?Sized + SendSync + 'static> InterfaceStub for WeakInterface<I>
where
    InterfaceRef<I>: Variant + Clone,
    WeakShared<I>: SendSync,
{
    #[inline]
    fn upgrade(&self) -> Option<Dynamic> {
        self.0.upgrade().map(Dynamic::from)
    }
}

/// Wrap a newly created stub for a [`StubFactory`].
#[must_use]
pub fn instantiate<I: ?Sized + SendSync + 'static>(
    stub: InterfaceRef<I>,
) -> (Dynamic, Box<dyn InterfaceStub>)
where
    InterfaceRef<I>: Variant + Clone,
    WeakShared<I>: SendSync,
{
    let weak = Shared::downgrade(&stub);
    (Dynamic::from(stub), Box::new(WeakInterface(weak)))
}

struct ProxyState {
    interfaces: Vec<Class>,
    handlers: Locked<HashMap<u64, Shared<FnHandler>, StraightHasherBuilder>>,
    stubs: Locked<Vec<(Class, Box<dyn InterfaceStub>)>>,
}

/// Link from a stub to the state of its proxy.
#[derive(Clone)]
pub struct ProxyLink(Shared<ProxyState>);

impl ProxyLink {
    /// Dispatch an operation to its handler.
    ///
    /// `hash` is the operation identity reported by [`Method::hash`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorNotImplemented`][ReflectError::ErrorNotImplemented] if no handler
    /// is registered for the operation, and otherwise with whatever the handler returns.
    pub fn call(&self, hash: u64, name: &str, args: &mut [Dynamic]) -> ReflectResult<Dynamic> {
        let handler = shared_read_lock(&self.0.handlers).get(&hash).cloned();

        match handler {
            Some(handler) => handler(args),
            None => Err(ReflectError::ErrorNotImplemented(name.into()).into()),
        }
    }
}

impl fmt::Debug for ProxyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProxyLink")
            .field(&self.0.interfaces)
            .finish()
    }
}

/// A dynamic proxy implementing one or more interfaces.
///
/// Cloning a [`Proxy`] yields another handle to the same proxy.
///
/// # Example
///
/// ```
/// use metaclass::{reflect_interface, Class, Dynamic, InterfaceRef, Proxy};
///
/// reflect_interface! {
///     pub trait Greeter as "demo::Greeter" {
///         fn greet(&self, name: String) -> String;
///     }
///     pub stub GreeterStub;
/// }
///
/// let class = GreeterStub::register();
/// let proxy = Proxy::new(&[class]).unwrap();
///
/// proxy
///     .add_implementation(&class.method("greet").unwrap(), |args: &mut [Dynamic]| {
///         Ok(Dynamic::from(format!("hello, {}", args[0])))
///     })
///     .unwrap();
///
/// let greeter = proxy.reference(&class).unwrap().cast::<InterfaceRef<dyn Greeter>>();
/// assert_eq!(greeter.greet("world".into()).unwrap(), "hello, world");
/// ```
#[derive(Clone)]
pub struct Proxy(Shared<ProxyState>);

impl Proxy {
    /// Create a proxy implementing a list of interfaces.
    ///
    /// # Errors
    ///
    /// * [`ErrorInvalidHandle`][ReflectError::ErrorInvalidHandle] if a class handle is invalid.
    /// * [`ErrorNotInterface`][ReflectError::ErrorNotInterface] if a class is not an interface.
    /// * [`ErrorUnresolvedBase`][ReflectError::ErrorUnresolvedBase] if a class still has
    ///   unresolved superclasses.
    pub fn new(interfaces: &[Class]) -> ReflectResult<Self> {
        for class in interfaces {
            let info = class.info()?;

            if !info.is_interface() {
                return Err(ReflectError::ErrorNotInterface(info.name().into()).into());
            }
            if let Some(base) = info.unresolved_bases().first() {
                return Err(
                    ReflectError::ErrorUnresolvedBase(info.name().into(), base.to_string()).into(),
                );
            }
        }

        tracing::debug!(interfaces = interfaces.len(), "proxy created");

        Ok(Self(Shared::new(ProxyState {
            interfaces: interfaces.to_vec(),
            handlers: new_locked(HashMap::default()),
            stubs: new_locked(Vec::new()),
        })))
    }
    /// Interfaces implemented by this proxy.
    #[inline]
    #[must_use]
    pub fn interfaces(&self) -> &[Class] {
        &self.0.interfaces
    }
    /// Is a method an operation of one of the interfaces of this proxy?
    fn implements(&self, method: &Method) -> ReflectResult<bool> {
        let class = method.class()?;

        for interface in &self.0.interfaces {
            if *interface == class || interface.is_subclass_of(&class)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
    /// Register the handler of an operation, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorMemberNotFound`][ReflectError::ErrorMemberNotFound] if the method
    /// is not an operation of any interface of this proxy.
    pub fn add_implementation(
        &self,
        method: &Method,
        handler: impl Fn(&mut [Dynamic]) -> ReflectResult<Dynamic> + SendSync + 'static,
    ) -> ReflectResult<()> {
        let info = method.info()?;

        if !self.implements(method)? {
            return Err(ReflectError::ErrorMemberNotFound(info.signature()).into());
        }

        let handler: Shared<FnHandler> = Shared::new(handler);

        shared_write_lock(&self.0.handlers).insert(info.hash(), handler);

        Ok(())
    }
    /// Does the proxy have a handler for an operation?
    #[must_use]
    pub fn has_implementation(&self, method: &Method) -> bool {
        let Ok(hash) = method.hash() else {
            return false;
        };

        shared_read_lock(&self.0.handlers).contains_key(&hash)
    }
    /// Get a value usable as an instance of one of the interfaces of this proxy.
    ///
    /// The value holds an [`InterfaceRef`] of the interface. While a stub handed out
    /// earlier is alive, the same stub is returned again.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorNotInterface`][ReflectError::ErrorNotInterface] if the class is not
    /// one of the interfaces of this proxy.
    pub fn reference(&self, class: &Class) -> ReflectResult<Dynamic> {
        let info = class.info()?;

        let factory = match info.stub_factory() {
            Some(factory) if self.0.interfaces.contains(class) => factory,
            _ => return Err(ReflectError::ErrorNotInterface(info.name().into()).into()),
        };

        let mut stubs = shared_write_lock(&self.0.stubs);

        if let Some(value) = stubs
            .iter()
            .filter(|(c, _)| c == class)
            .find_map(|(_, stub)| stub.upgrade())
        {
            return Ok(value);
        }

        let (value, stub) = factory(ProxyLink(self.0.clone()));

        stubs.retain(|(c, stub)| c != class && stub.upgrade().is_some());
        stubs.push((*class, stub));

        tracing::trace!(interface = %info.name(), "stub instantiated");

        Ok(value)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Proxy").field(&self.0.interfaces).finish()
    }
}
