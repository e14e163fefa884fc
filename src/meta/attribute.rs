//! Attribute descriptors and the [`Attribute`] handle.

use crate::meta::{def_handle, signature, Class, ClassInfo, Qualifiers, TypeSpec};
use crate::{Dynamic, Identifier, ReflectError, ReflectResult};
use std::fmt;

/// Reads an attribute out of an object.
pub type FnGetter = dyn Fn(&Dynamic) -> ReflectResult<Dynamic> + Send + Sync;

/// Writes a value into an attribute of an object.
pub type FnSetter = dyn Fn(&mut Dynamic, Dynamic) -> ReflectResult<()> + Send + Sync;

/// Descriptor of a registered attribute.
pub struct AttributeInfo {
    pub(crate) name: Identifier,
    pub(crate) class: &'static ClassInfo,
    pub(crate) ty: TypeSpec,
    pub(crate) getter: Box<FnGetter>,
    pub(crate) setter: Option<Box<FnSetter>>,
}

impl fmt::Debug for AttributeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttributeInfo")
            .field(&self.signature())
            .finish()
    }
}

impl AttributeInfo {
    /// Name of the attribute.
    #[inline(always)]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Class declaring the attribute.
    #[inline(always)]
    #[must_use]
    pub fn class(&self) -> Class {
        Class::from_info(self.class)
    }
    /// Type of the attribute.
    #[inline(always)]
    #[must_use]
    pub const fn type_spec(&self) -> &TypeSpec {
        &self.ty
    }
    /// Can the attribute only be read?
    #[inline(always)]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }
    /// Human-readable signature, e.g. `f64 demo::Point::x`.
    ///
    /// Read-only attributes are marked `const`.
    #[must_use]
    pub fn signature(&self) -> String {
        let qualifiers = if self.is_read_only() {
            Qualifiers::CONST
        } else {
            Qualifiers::empty()
        };
        let qualified = format!("{}::{}", self.class.name(), self.name);

        signature::render(Some(&self.ty), &qualified, None, qualifiers)
    }
}

def_handle!(
    /// Handle to a registered attribute.
    Attribute => AttributeInfo, "attribute"
);

impl Attribute {
    /// Read the attribute of an object.
    ///
    /// # Errors
    ///
    /// Fails on an invalid handle, or if the object is empty or not of the attribute's class.
    pub fn get(&self, obj: &Dynamic) -> ReflectResult<Dynamic> {
        (self.info()?.getter)(obj)
    }
    /// Write the attribute of an object.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorQualifierViolation`][ReflectError::ErrorQualifierViolation] if the
    /// attribute or the object is read-only, and with
    /// [`ErrorMismatchDataType`][ReflectError::ErrorMismatchDataType] if the value does not
    /// convert to the attribute's type.
    pub fn set(&self, obj: &mut Dynamic, value: impl Into<Dynamic>) -> ReflectResult<()> {
        let info = self.info()?;

        match info.setter {
            Some(ref setter) => setter(obj, value.into()),
            None => Err(ReflectError::ErrorQualifierViolation(
                info.signature(),
                "attribute is read-only".into(),
            )
            .into()),
        }
    }
    /// Name of the attribute.
    #[inline]
    pub fn name(&self) -> ReflectResult<&'static str> {
        Ok(self.info()?.name())
    }
    /// Class declaring the attribute.
    #[inline]
    pub fn class(&self) -> ReflectResult<Class> {
        Ok(self.info()?.class())
    }
    /// Human-readable signature.
    #[inline]
    pub fn signature(&self) -> ReflectResult<String> {
        Ok(self.info()?.signature())
    }
}
