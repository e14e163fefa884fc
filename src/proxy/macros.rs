//! The `reflect_interface!` macro.

/// Declare an interface trait that dynamic proxies can implement.
///
/// The macro expands into:
///
/// * the trait itself, each operation returning [`ReflectResult`][crate::ReflectResult]
///   of the declared return type, implemented for every [`ProxyStub`][crate::ProxyStub] by
///   forwarding the operation into the proxy;
/// * a stub struct holding the [`ProxyLink`][crate::ProxyLink];
/// * `register()` on the stub, which registers the interface class under the given name,
///   with one const method per operation, and returns its [`Class`][crate::Class] handle.
///
/// An interface may extend other interfaces declared with this macro:
/// `extends Base, ...` makes the base traits supertraits of the trait and the base
/// classes superclasses of the interface class. The stub then forwards the base
/// operations as well. Bases are looked up by name, so they may be registered before or
/// after the derived interface.
///
/// The registered type of the interface is [`InterfaceRef<dyn Trait>`][crate::InterfaceRef].
/// Operation parameters and return types must be clonable [`Variant`][crate::Variant]s.
///
/// # Example
///
/// ```
/// use metaclass::{reflect_interface, Dynamic, InterfaceRef, Proxy, ReflectError};
///
/// reflect_interface! {
///     /// Multiplies two numbers.
///     pub trait Multiplier as "demo::Multiplier" {
///         fn op(&self, a: i32, b: i32) -> i32;
///         fn reset(&self) -> ();
///     }
///     pub stub MultiplierStub;
/// }
///
/// let class = MultiplierStub::register();
/// let proxy = Proxy::new(&[class]).unwrap();
///
/// proxy
///     .add_implementation(&class.method("op").unwrap(), |args: &mut [Dynamic]| {
///         let a = args[0].convert::<i32>()?;
///         let b = args[1].convert::<i32>()?;
///         Ok(Dynamic::from(a * b))
///     })
///     .unwrap();
///
/// let multiplier = proxy.reference(&class).unwrap().cast::<InterfaceRef<dyn Multiplier>>();
///
/// assert_eq!(multiplier.op(3, 5).unwrap(), 15);
/// assert!(matches!(
///     *multiplier.reset().unwrap_err(),
///     ReflectError::ErrorNotImplemented(..)
/// ));
/// ```
#[macro_export]
macro_rules! reflect_interface {
    (
        $(#[$attr:meta])*
        $vis:vis trait $trait_name:ident as $class_name:literal $(extends $($base:ident),+)? {
            $(
                $(#[$op_attr:meta])*
                fn $op:ident(&self $(, $arg:ident : $arg_ty:ty)* $(,)?) -> $ret:ty;
            )*
        }
        $stub_vis:vis stub $stub:ident;
    ) => {
        $(#[$attr])*
        $vis trait $trait_name: $crate::SendSync $($(+ $base)+)? {
            $(
                $(#[$op_attr])*
                fn $op(&self $(, $arg: $arg_ty)*) -> $crate::ReflectResult<$ret>;
            )*
        }

        impl<S: $crate::ProxyStub> $trait_name for S {
            $(
                fn $op(&self $(, $arg: $arg_ty)*) -> $crate::ReflectResult<$ret> {
                    let hash = $crate::calc_member_hash(
                        ::core::option::Option::Some(::core::any::TypeId::of::<
                            $crate::InterfaceRef<dyn $trait_name>,
                        >()),
                        stringify!($op),
                        [$(::core::any::TypeId::of::<$arg_ty>()),*],
                        $crate::Qualifiers::CONST,
                    );

                    #[allow(unused_mut)]
                    let mut args = $crate::StaticVec::<$crate::Dynamic>::new();
                    $(args.push($crate::Dynamic::from($arg));)*

                    self.link()
                        .call(hash, stringify!($op), &mut args)?
                        .into_converted::<$ret>()
                }
            )*
        }

        impl $crate::Interface for dyn $trait_name {
            const NAME: &'static str = $class_name;
        }

        #[doc = concat!("Proxy stub implementing [`", stringify!($trait_name), "`].")]
        $stub_vis struct $stub {
            link: $crate::ProxyLink,
        }

        impl $crate::ProxyStub for $stub {
            #[inline(always)]
            fn link(&self) -> &$crate::ProxyLink {
                &self.link
            }
        }

        impl $stub {
            /// Register the interface class implemented by this stub.
            ///
            /// Registering again returns the existing class.
            $stub_vis fn register() -> $crate::Class {
                $crate::register_class::<$crate::InterfaceRef<dyn $trait_name>>($class_name)
                    $($(.inherits(<dyn $base as $crate::Interface>::NAME))+)?
                    $(
                        .method(
                            stringify!($op),
                            |this: &$crate::InterfaceRef<dyn $trait_name> $(, $arg: $arg_ty)*| {
                                <dyn $trait_name as $trait_name>::$op(&**this $(, $arg)*)
                            },
                        )
                    )*
                    .interface(Self::instantiate)
                    .build()
            }

            fn instantiate(
                link: $crate::ProxyLink,
            ) -> ($crate::Dynamic, ::std::boxed::Box<dyn $crate::InterfaceStub>) {
                let stub = $crate::InterfaceRef::new(Self { link });
                let stub: $crate::InterfaceRef<dyn $trait_name> = stub;
                $crate::proxy::instantiate(stub)
            }
        }
    };
}
