use metaclass::{
    reflect_interface, register_class, Class, Dynamic, Interface, InterfaceRef, Proxy,
    ReflectError, Shared,
};

reflect_interface! {
    /// Binary integer operation.
    pub trait Multiplier as "proxy::Multiplier" {
        fn op(&self, a: i32, b: i32) -> i32;
        fn reset(&self) -> ();
    }
    pub stub MultiplierStub;
}

reflect_interface! {
    pub trait Named as "proxy::Named" {
        fn name(&self) -> String;
    }
    pub stub NamedStub;
}

// Declared but never registered.
reflect_interface! {
    pub trait Missing as "proxy::Missing" {
        fn pong(&self) -> ();
    }
    pub stub MissingStub;
}

reflect_interface! {
    pub trait Orphaned as "proxy::Orphaned" extends Missing {
        fn ping(&self) -> ();
    }
    pub stub OrphanedStub;
}

reflect_interface! {
    pub trait Labelled as "proxy::Labelled" extends Named {
        fn label(&self, width: usize) -> String;
    }
    pub stub LabelledStub;
}

fn multiplier_proxy() -> Result<(Class, Proxy), Box<ReflectError>> {
    let class = MultiplierStub::register();
    let proxy = Proxy::new(&[class])?;

    proxy.add_implementation(&class.method("op")?, |args: &mut [Dynamic]| {
        let a = args[0].convert::<i32>()?;
        let b = args[1].convert::<i32>()?;
        Ok(Dynamic::from(a * b))
    })?;

    Ok((class, proxy))
}

#[test]
fn test_proxy_dispatch() -> Result<(), Box<ReflectError>> {
    let (class, proxy) = multiplier_proxy()?;

    assert!(class.is_interface()?);
    assert!(proxy.has_implementation(&class.method("op")?));
    assert!(!proxy.has_implementation(&class.method("reset")?));

    let multiplier = proxy
        .reference(&class)?
        .cast::<InterfaceRef<dyn Multiplier>>();

    assert_eq!(multiplier.op(3, 5)?, 15);
    assert!(matches!(
        *multiplier.reset().unwrap_err(),
        ReflectError::ErrorNotImplemented(ref name) if name == "reset"
    ));

    // Through reflection.
    let value = proxy.reference(&class)?;
    let r = class.method("op")?.call_const(&value, (6, 7))?;
    assert_eq!(r.cast::<i32>(), 42);

    Ok(())
}

#[test]
fn test_proxy_replace_handler() -> Result<(), Box<ReflectError>> {
    let (class, proxy) = multiplier_proxy()?;
    let op = class.method("op")?;

    proxy.add_implementation(&op, |args: &mut [Dynamic]| {
        let a = args[0].convert::<i32>()?;
        let b = args[1].convert::<i32>()?;
        Ok(Dynamic::from(a + b))
    })?;

    let multiplier = proxy
        .reference(&class)?
        .cast::<InterfaceRef<dyn Multiplier>>();
    assert_eq!(multiplier.op(3, 5)?, 8);

    proxy.add_implementation(&class.method("reset")?, |_: &mut [Dynamic]| {
        Err("cannot reset".into())
    })?;
    assert!(matches!(
        *multiplier.reset().unwrap_err(),
        ReflectError::ErrorRuntime(..)
    ));

    Ok(())
}

#[test]
fn test_proxy_stub_identity() -> Result<(), Box<ReflectError>> {
    let (class, proxy) = multiplier_proxy()?;

    let a = proxy.reference(&class)?.cast::<InterfaceRef<dyn Multiplier>>();
    let b = proxy.reference(&class)?.cast::<InterfaceRef<dyn Multiplier>>();
    assert!(Shared::ptr_eq(&a, &b));

    // The stub keeps the proxy alive.
    drop(proxy);
    drop(b);
    assert_eq!(a.op(2, 21)?, 42);

    Ok(())
}

#[test]
fn test_proxy_multiple_interfaces() -> Result<(), Box<ReflectError>> {
    let multiplier = MultiplierStub::register();
    let named = NamedStub::register();
    let proxy = Proxy::new(&[multiplier, named])?;

    assert_eq!(proxy.interfaces(), [multiplier, named]);

    proxy.add_implementation(&named.method("name")?, |_: &mut [Dynamic]| {
        Ok(Dynamic::from("twice"))
    })?;

    let n = proxy.reference(&named)?.cast::<InterfaceRef<dyn Named>>();
    assert_eq!(n.name()?, "twice");

    let m = proxy
        .reference(&multiplier)?
        .cast::<InterfaceRef<dyn Multiplier>>();
    assert!(matches!(
        *m.op(1, 1).unwrap_err(),
        ReflectError::ErrorNotImplemented(..)
    ));

    Ok(())
}

#[test]
fn test_proxy_extended_interface() -> Result<(), Box<ReflectError>> {
    let named = NamedStub::register();
    let labelled = LabelledStub::register();

    assert!(labelled.is_resolved()?);
    assert!(labelled.is_subclass_of(&named)?);

    assert_eq!(labelled.methods()?.len(), 2);

    let proxy = Proxy::new(&[labelled])?;

    // Operations of base interfaces belong to the proxy too.
    proxy.add_implementation(&named.method("name")?, |_: &mut [Dynamic]| {
        Ok(Dynamic::from("base"))
    })?;
    assert!(proxy.has_implementation(&named.method("name")?));

    let l = proxy
        .reference(&labelled)?
        .cast::<InterfaceRef<dyn Labelled>>();

    // Inherited operations are forwarded through the derived stub.
    assert_eq!(l.name()?, "base");
    assert!(matches!(
        *l.label(8).unwrap_err(),
        ReflectError::ErrorNotImplemented(ref name) if name == "label"
    ));

    proxy.add_implementation(&labelled.method("label")?, |args: &mut [Dynamic]| {
        let width = args[0].convert::<usize>()?;
        Ok(Dynamic::from(format!("{:>width$}", "base")))
    })?;
    assert_eq!(l.label(6)?, "  base");

    // The inherited method is the base interface's own descriptor.
    assert_eq!(labelled.method("name")?, named.method("name")?);

    // Only the listed interfaces can be referenced.
    assert!(matches!(
        *proxy.reference(&named).unwrap_err(),
        ReflectError::ErrorNotInterface(..)
    ));

    Ok(())
}

#[derive(Debug, Clone)]
struct Plain;

#[test]
fn test_proxy_errors() -> Result<(), Box<ReflectError>> {
    let plain = register_class::<Plain>("proxy::Plain")
        .method("noop", |_: &Plain| ())
        .build();

    assert!(matches!(
        *Proxy::new(&[plain]).unwrap_err(),
        ReflectError::ErrorNotInterface(..)
    ));
    assert!(matches!(
        *Proxy::new(&[Class::default()]).unwrap_err(),
        ReflectError::ErrorInvalidHandle(..)
    ));

    let orphaned = OrphanedStub::register();
    assert!(matches!(
        *Proxy::new(&[orphaned]).unwrap_err(),
        ReflectError::ErrorUnresolvedBase(_, ref base) if base == "proxy::Missing"
    ));
    assert_eq!(<dyn Missing as Interface>::NAME, "proxy::Missing");

    let (class, proxy) = multiplier_proxy()?;

    // Methods of other classes cannot be implemented.
    assert!(matches!(
        *proxy
            .add_implementation(&plain.method("noop")?, |_: &mut [Dynamic]| Ok(Dynamic::empty()))
            .unwrap_err(),
        ReflectError::ErrorMemberNotFound(..)
    ));
    assert!(matches!(
        *proxy.reference(&plain).unwrap_err(),
        ReflectError::ErrorNotInterface(..)
    ));
    assert!(proxy.reference(&class).is_ok());

    Ok(())
}

#[cfg(feature = "sync")]
#[test]
fn test_proxy_concurrent_calls() -> Result<(), Box<ReflectError>> {
    let (class, proxy) = multiplier_proxy()?;
    let op = class.method("op")?;

    // Calls, new references and handler updates overlap without failing.
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let proxy = proxy.clone();
            std::thread::spawn(move || -> Result<(), Box<ReflectError>> {
                for n in 0..200 {
                    let multiplier = proxy
                        .reference(&class)?
                        .cast::<InterfaceRef<dyn Multiplier>>();
                    let r = multiplier.op(n, 2)?;
                    assert!(r == n * 2 || r == n + 2);

                    if i == 0 && n % 10 == 0 {
                        proxy.add_implementation(&op, |args: &mut [Dynamic]| {
                            let a = args[0].convert::<i32>()?;
                            let b = args[1].convert::<i32>()?;
                            Ok(Dynamic::from(a + b))
                        })?;
                    }
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        assert!(matches!(handle.join(), Ok(Ok(()))));
    }

    Ok(())
}
