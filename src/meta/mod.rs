//! Module defining the metaobject registry: descriptors of registered classes and
//! functions, and the handles used to query and invoke them.

pub mod attribute;
pub mod class;
pub mod classify;
pub mod constructor;
pub mod function;
pub mod method;
pub mod registry;
pub mod signature;

pub use attribute::{Attribute, AttributeInfo};
pub use class::{Class, ClassInfo};
pub use classify::{overloads, overrides};
pub use constructor::{Constructor, ConstructorInfo};
pub use function::{Function, FunctionInfo};
pub use method::{Method, MethodInfo};
pub use registry::Registry;
pub use signature::TypeSpec;

bitflags::bitflags! {
    /// Qualifiers of a method, or of the caller of a method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Qualifiers: u8 {
        /// The object is only borrowed immutably.
        const CONST = 0b0000_0001;
        /// The object is volatile.
        const VOLATILE = 0b0000_0010;
        /// There is no object.
        const STATIC = 0b0000_0100;
    }
}

/// Define a handle type: a copyable, non-owning reference to a process-lifetime descriptor.
///
/// The default handle is invalid. Handles compare and hash by descriptor identity.
macro_rules! def_handle {
    ($(#[$attr:meta])* $handle:ident => $info:ty, $kind:literal) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Default)]
        pub struct $handle(Option<&'static $info>);

        impl $handle {
            #[inline(always)]
            #[must_use]
            pub(crate) const fn from_info(info: &'static $info) -> Self {
                Self(Some(info))
            }
            /// Is this handle valid?
            #[inline(always)]
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                self.0.is_some()
            }
            /// Get the descriptor behind this handle.
            ///
            /// # Errors
            ///
            /// Fails with [`ErrorInvalidHandle`][crate::ReflectError::ErrorInvalidHandle]
            /// if the handle is invalid.
            #[inline]
            pub fn info(&self) -> crate::ReflectResult<&'static $info> {
                self.0
                    .ok_or_else(|| crate::ReflectError::ErrorInvalidHandle($kind).into())
            }
        }

        impl PartialEq for $handle {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                match (self.0, other.0) {
                    (Some(a), Some(b)) => std::ptr::eq(a, b),
                    (None, None) => true,
                    _ => false,
                }
            }
        }

        impl Eq for $handle {}

        impl std::hash::Hash for $handle {
            #[inline]
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.0.map(|info| info as *const $info).hash(state);
            }
        }

        impl std::fmt::Display for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.0 {
                    Some(info) => f.write_str(&info.signature()),
                    None => write!(f, "<invalid {}>", $kind),
                }
            }
        }

        impl std::fmt::Debug for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($handle), self)
            }
        }
    };
}

pub(crate) use def_handle;
