//! Constructor descriptors and the [`Constructor`] handle.

use crate::func::{FnThunk, FuncArgs};
use crate::meta::{def_handle, signature, Class, ClassInfo, Qualifiers, TypeSpec};
use crate::{Dynamic, ReflectError, ReflectResult, StaticVec};
use std::fmt;

/// Descriptor of a registered constructor.
pub struct ConstructorInfo {
    pub(crate) class: &'static ClassInfo,
    pub(crate) params: StaticVec<TypeSpec>,
    pub(crate) thunk: Box<FnThunk>,
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConstructorInfo")
            .field(&self.signature())
            .finish()
    }
}

impl ConstructorInfo {
    /// Class constructed.
    #[inline(always)]
    #[must_use]
    pub fn class(&self) -> Class {
        Class::from_info(self.class)
    }
    /// Parameter types.
    #[inline(always)]
    #[must_use]
    pub fn params(&self) -> &[TypeSpec] {
        &self.params
    }
    /// Number of parameters.
    #[inline(always)]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
    /// Is this the default constructor?
    #[inline(always)]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.params.is_empty()
    }
    /// Human-readable signature, e.g. `demo::Point::Point(f64, f64)`.
    #[must_use]
    pub fn signature(&self) -> String {
        let name = self.class.name();
        let qualified = format!("{}::{}", name, signature::short_name(name));

        signature::render(None, &qualified, Some(&self.params), Qualifiers::empty())
    }

    pub(crate) fn invoke(&self, args: &mut [Dynamic]) -> ReflectResult<Dynamic> {
        if args.len() < self.arity() {
            return Err(ReflectError::ErrorArityMismatch(
                self.signature(),
                self.arity(),
                args.len(),
            )
            .into());
        }

        (self.thunk)(&mut args[..self.arity()])
    }
}

def_handle!(
    /// Handle to a registered constructor.
    Constructor => ConstructorInfo, "constructor"
);

impl Constructor {
    /// Construct a new instance.
    ///
    /// # Errors
    ///
    /// Fails on an invalid handle, with too few arguments, or if an argument does not
    /// convert to its parameter type.
    pub fn call(&self, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let mut args = args.into_vec();
        self.info()?.invoke(&mut args)
    }
    /// Class constructed.
    #[inline]
    pub fn class(&self) -> ReflectResult<Class> {
        Ok(self.info()?.class())
    }
    /// Number of parameters.
    #[inline]
    pub fn arity(&self) -> ReflectResult<usize> {
        Ok(self.info()?.arity())
    }
    /// Human-readable signature.
    #[inline]
    pub fn signature(&self) -> ReflectResult<String> {
        Ok(self.info()?.signature())
    }
}
