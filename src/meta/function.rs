//! Free function descriptors and the [`Function`] handle.

use crate::func::{FnThunk, FuncArgs};
use crate::meta::{def_handle, signature, Qualifiers, Registry, TypeSpec};
use crate::{Dynamic, Identifier, ReflectError, ReflectResult, StaticVec};
use std::fmt;

/// Descriptor of a registered free function.
pub struct FunctionInfo {
    pub(crate) name: Identifier,
    pub(crate) ret: TypeSpec,
    pub(crate) params: StaticVec<TypeSpec>,
    pub(crate) hash: u64,
    pub(crate) thunk: Box<FnThunk>,
}

impl fmt::Debug for FunctionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionInfo")
            .field("signature", &self.signature())
            .field("hash", &self.hash)
            .finish()
    }
}

impl FunctionInfo {
    /// Fully-qualified name of the function.
    #[inline(always)]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Return type.
    #[inline(always)]
    #[must_use]
    pub const fn return_type(&self) -> &TypeSpec {
        &self.ret
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
    /// Identity of the function: stable for the lifetime of the process.
    #[inline(always)]
    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }
    /// Human-readable signature, e.g. `f64 math::hypot(f64, f64)`.
    #[must_use]
    pub fn signature(&self) -> String {
        signature::render(
            Some(&self.ret),
            &self.name,
            Some(&self.params),
            Qualifiers::empty(),
        )
    }

    pub(crate) fn invoke(&self, args: &mut [Dynamic]) -> ReflectResult<Dynamic> {
        if args.len() < self.arity() {
            return Err(ReflectError::ErrorArityMismatch(
                self.name.to_string(),
                self.arity(),
                args.len(),
            )
            .into());
        }

        (self.thunk)(&mut args[..self.arity()])
    }
}

def_handle!(
    /// Handle to a registered free function.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::{register_fn, Function};
    ///
    /// register_fn("math::hypot", |x: f64, y: f64| x.hypot(y));
    ///
    /// let hypot = Function::lookup("math::hypot");
    /// assert_eq!(hypot.to_string(), "f64 math::hypot(f64, f64)");
    ///
    /// let r = hypot.call((3_i32, 4_i32)).unwrap();
    /// assert_eq!(r.cast::<f64>(), 5.0);
    /// ```
    Function => FunctionInfo, "function"
);

impl Function {
    /// Look up the first function registered under a name.
    ///
    /// Returns an invalid handle if there is none.
    #[must_use]
    pub fn lookup(name: &str) -> Self {
        Registry::global()
            .functions_named(name)
            .first()
            .map_or_else(Self::default, |&info| Self::from_info(info))
    }
    /// Find the first function registered under a name that matches a predicate.
    ///
    /// Returns an invalid handle if there is none.
    #[must_use]
    pub fn find(name: &str, predicate: impl Fn(&FunctionInfo) -> bool) -> Self {
        Registry::global()
            .functions_named(name)
            .into_iter()
            .find(|f| predicate(f))
            .map_or_else(Self::default, Self::from_info)
    }
    /// All overloads registered under a name, in registration order.
    #[must_use]
    pub fn find_all(name: &str) -> Vec<Self> {
        Registry::global()
            .functions_named(name)
            .into_iter()
            .map(Self::from_info)
            .collect()
    }
    /// Look up a function by its identity.
    #[must_use]
    pub fn lookup_hash(hash: u64) -> Self {
        Registry::global()
            .function_by_hash(hash)
            .map_or_else(Self::default, Self::from_info)
    }

    /// Call the function.
    ///
    /// # Errors
    ///
    /// Fails on an invalid handle, with too few arguments, or if an argument does not
    /// convert to its parameter type. Extra arguments are ignored.
    pub fn call(&self, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let mut args = args.into_vec();
        self.info()?.invoke(&mut args)
    }
    /// Name of the function.
    #[inline]
    pub fn name(&self) -> ReflectResult<&'static str> {
        Ok(self.info()?.name())
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
