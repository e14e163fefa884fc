//! Method descriptors and the [`Method`] handle.

use crate::func::{FuncArgs, MethodThunk};
use crate::meta::{classify, def_handle, signature, Class, ClassInfo, Qualifiers, TypeSpec};
use crate::{Dynamic, Identifier, ReflectError, ReflectResult, StaticVec};
use std::fmt;

/// Object a method is invoked on.
enum Target<'a> {
    /// No object.
    None,
    /// Immutably borrowed object.
    Shared(&'a Dynamic),
    /// Mutably borrowed object.
    Exclusive(&'a mut Dynamic),
}

/// Descriptor of a registered method.
pub struct MethodInfo {
    pub(crate) name: Identifier,
    pub(crate) class: &'static ClassInfo,
    pub(crate) ret: TypeSpec,
    pub(crate) params: StaticVec<TypeSpec>,
    pub(crate) qualifiers: Qualifiers,
    pub(crate) hash: u64,
    pub(crate) thunk: MethodThunk,
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("signature", &self.signature())
            .field("hash", &self.hash)
            .finish()
    }
}

impl MethodInfo {
    /// Name of the method.
    #[inline(always)]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Name of the method qualified by the name of its class.
    #[inline]
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.class.name(), self.name)
    }
    /// Class declaring the method.
    #[inline(always)]
    #[must_use]
    pub fn class(&self) -> Class {
        Class::from_info(self.class)
    }
    #[inline(always)]
    pub(crate) fn class_info(&self) -> &'static ClassInfo {
        self.class
    }
    /// Return type.
    #[inline(always)]
    #[must_use]
    pub const fn return_type(&self) -> &TypeSpec {
        &self.ret
    }
    /// Parameter types, not counting the object.
    #[inline(always)]
    #[must_use]
    pub fn params(&self) -> &[TypeSpec] {
        &self.params
    }
    /// Number of parameters, not counting the object.
    #[inline(always)]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
    /// Qualifiers.
    #[inline(always)]
    #[must_use]
    pub const fn qualifiers(&self) -> Qualifiers {
        self.qualifiers
    }
    /// Does the method only borrow its object immutably?
    #[inline(always)]
    #[must_use]
    pub const fn is_const(&self) -> bool {
        self.qualifiers.contains(Qualifiers::CONST)
    }
    /// Is the method callable on volatile objects?
    #[inline(always)]
    #[must_use]
    pub const fn is_volatile(&self) -> bool {
        self.qualifiers.contains(Qualifiers::VOLATILE)
    }
    /// Is the method an associated function without an object?
    #[inline(always)]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.qualifiers.contains(Qualifiers::STATIC)
    }
    /// Operation identity: stable for the lifetime of the process, and the key under which
    /// proxies register handlers for this method.
    #[inline(always)]
    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }
    /// Human-readable signature, e.g. `i32 demo::Calc::add(i32, i32) const`.
    #[must_use]
    pub fn signature(&self) -> String {
        signature::render(
            Some(&self.ret),
            &self.qualified_name(),
            Some(&self.params),
            self.qualifiers,
        )
    }

    /// Check whether a caller with the given qualifiers may invoke this method.
    fn check_qualifiers(&self, caller: Qualifiers) -> ReflectResult<()> {
        if self.is_static() {
            return Ok(());
        }
        if caller.contains(Qualifiers::STATIC) {
            return Err(ReflectError::ErrorMissingObject(self.signature()).into());
        }
        if caller.contains(Qualifiers::CONST) && !self.is_const() {
            return Err(ReflectError::ErrorQualifierViolation(
                self.signature(),
                "non-const method invoked on a const object".into(),
            )
            .into());
        }
        if caller.contains(Qualifiers::VOLATILE) && !self.is_volatile() {
            return Err(ReflectError::ErrorQualifierViolation(
                self.signature(),
                "non-volatile method invoked on a volatile object".into(),
            )
            .into());
        }
        Ok(())
    }

    fn invoke(
        &self,
        target: Target<'_>,
        mut caller: Qualifiers,
        args: &mut [Dynamic],
    ) -> ReflectResult<Dynamic> {
        match target {
            Target::Shared(obj) if obj.is_read_only() => caller |= Qualifiers::CONST,
            Target::Exclusive(ref obj) if obj.is_read_only() => caller |= Qualifiers::CONST,
            _ => (),
        }

        self.check_qualifiers(caller)?;

        if args.len() < self.arity() {
            return Err(ReflectError::ErrorArityMismatch(
                self.qualified_name(),
                self.arity(),
                args.len(),
            )
            .into());
        }

        // Extra arguments are ignored
        let args = &mut args[..self.arity()];

        match (&self.thunk, target) {
            (MethodThunk::Static(f), _) => f(args),
            (MethodThunk::Const(f), Target::Shared(obj)) => f(obj, args),
            (MethodThunk::Const(f), Target::Exclusive(obj)) => f(&*obj, args),
            (MethodThunk::Mut(f), Target::Exclusive(obj)) => f(obj, args),
            (MethodThunk::Mut(..), Target::Shared(..)) => {
                unreachable!("const callers are rejected by the qualifier check")
            }
            (_, Target::None) => unreachable!("static callers are rejected by the qualifier check"),
        }
    }
}

def_handle!(
    /// Handle to a registered method.
    Method => MethodInfo, "method"
);

impl Method {
    /// Call the method on a mutable object.
    ///
    /// A read-only object is treated as a const object.
    ///
    /// # Errors
    ///
    /// * [`ErrorInvalidHandle`][ReflectError::ErrorInvalidHandle] on an invalid handle.
    /// * [`ErrorQualifierViolation`][ReflectError::ErrorQualifierViolation] when invoking a
    ///   non-const method on a read-only object.
    /// * [`ErrorArityMismatch`][ReflectError::ErrorArityMismatch] when too few arguments are
    ///   passed. Extra arguments are ignored.
    /// * [`ErrorMismatchDataType`][ReflectError::ErrorMismatchDataType] when an argument does
    ///   not convert to its parameter type, with the argument index attached.
    pub fn call(&self, obj: &mut Dynamic, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let mut args = args.into_vec();
        self.info()?
            .invoke(Target::Exclusive(obj), Qualifiers::empty(), &mut args)
    }
    /// Call the method on a const object.
    ///
    /// # Errors
    ///
    /// As [`call`][Method::call]; only const (or static) methods can be invoked.
    pub fn call_const(&self, obj: &Dynamic, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let mut args = args.into_vec();
        self.info()?
            .invoke(Target::Shared(obj), Qualifiers::CONST, &mut args)
    }
    /// Call the method on a volatile object.
    ///
    /// # Errors
    ///
    /// As [`call`][Method::call]; only volatile (or static) methods can be invoked.
    pub fn call_volatile(&self, obj: &mut Dynamic, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let mut args = args.into_vec();
        self.info()?
            .invoke(Target::Exclusive(obj), Qualifiers::VOLATILE, &mut args)
    }
    /// Call the method on a const volatile object.
    ///
    /// # Errors
    ///
    /// As [`call`][Method::call]; only const volatile (or static) methods can be invoked.
    pub fn call_const_volatile(&self, obj: &Dynamic, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let mut args = args.into_vec();
        self.info()?.invoke(
            Target::Shared(obj),
            Qualifiers::CONST | Qualifiers::VOLATILE,
            &mut args,
        )
    }
    /// Call the method without an object.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorMissingObject`][ReflectError::ErrorMissingObject] if the method is
    /// not static, and otherwise as [`call`][Method::call].
    pub fn call_static(&self, args: impl FuncArgs) -> ReflectResult<Dynamic> {
        let mut args = args.into_vec();
        self.info()?
            .invoke(Target::None, Qualifiers::STATIC, &mut args)
    }

    /// Name of the method.
    #[inline]
    pub fn name(&self) -> ReflectResult<&'static str> {
        Ok(self.info()?.name())
    }
    /// Class declaring the method.
    #[inline]
    pub fn class(&self) -> ReflectResult<Class> {
        Ok(self.info()?.class())
    }
    /// Number of parameters, not counting the object.
    #[inline]
    pub fn arity(&self) -> ReflectResult<usize> {
        Ok(self.info()?.arity())
    }
    /// Qualifiers.
    #[inline]
    pub fn qualifiers(&self) -> ReflectResult<Qualifiers> {
        Ok(self.info()?.qualifiers())
    }
    /// Operation identity.
    #[inline]
    pub fn hash(&self) -> ReflectResult<u64> {
        Ok(self.info()?.hash())
    }
    /// Human-readable signature.
    #[inline]
    pub fn signature(&self) -> ReflectResult<String> {
        Ok(self.info()?.signature())
    }
    /// Does this method override `other`?
    ///
    /// See [`overrides`][classify::overrides].
    #[inline]
    pub fn overrides(&self, other: &Method) -> ReflectResult<bool> {
        Ok(classify::overrides(self.info()?, other.info()?))
    }
    /// Does this method overload `other`?
    ///
    /// See [`overloads`][classify::overloads].
    #[inline]
    pub fn overloads(&self, other: &Method) -> ReflectResult<bool> {
        Ok(classify::overloads(self.info()?, other.info()?))
    }
}
