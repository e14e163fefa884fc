//! Helper module which defines the [`Dynamic`] data type and the [`Variant`] trait.

use crate::func::{locked_read, locked_write, SendSync, Shared};
use crate::r#unsafe::{
    unsafe_cast_mut, unsafe_cast_ref, unsafe_erase_at, unsafe_reify, unsafe_view_at,
    unsafe_view_at_mut,
};
use crate::types::boxed::{Boxed, BoxedCell, Holder};
use crate::types::number::{coerce_number, is_arithmetic_type, Float, Int, Number};
use crate::types::{cache, type_info, TypeCategory};
use crate::{Identifier, ReflectError, ReflectResult, SmartString};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::mem;
use std::ptr;

mod private {
    use crate::func::SendSync;
    use std::any::Any;

    /// A sealed trait that prevents other crates from implementing [`Variant`][super::Variant].
    pub trait Sealed {}

    impl<T: Any + SendSync> Sealed for T {}
}

/// Trait to represent any type.
///
/// Currently, [`Variant`] is not [`Send`] nor [`Sync`], so it can practically be any type.
/// Turn on the `sync` feature to restrict it to only types that implement [`Send`] `+` [`Sync`].
#[cfg(not(feature = "sync"))]
pub trait Variant: Any + private::Sealed {
    /// Convert this [`Variant`] trait object to [`&dyn Any`][Any].
    #[must_use]
    fn as_any(&self) -> &dyn Any;

    /// Convert this [`Variant`] trait object to [`&mut dyn Any`][Any].
    #[must_use]
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Convert this [`Variant`] trait object to [`Box<dyn Any>`][Any].
    #[must_use]
    fn as_boxed_any(self: Box<Self>) -> Box<dyn Any>;

    /// Get the name of this type.
    #[must_use]
    fn type_name(&self) -> &'static str;
}

/// Trait to represent any type.
#[cfg(feature = "sync")]
pub trait Variant: Any + Send + Sync + private::Sealed {
    /// Convert this [`Variant`] trait object to [`&dyn Any`][Any].
    #[must_use]
    fn as_any(&self) -> &dyn Any;

    /// Convert this [`Variant`] trait object to [`&mut dyn Any`][Any].
    #[must_use]
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Convert this [`Variant`] trait object to [`Box<dyn Any>`][Any].
    #[must_use]
    fn as_boxed_any(self: Box<Self>) -> Box<dyn Any>;

    /// Get the name of this type.
    #[must_use]
    fn type_name(&self) -> &'static str;
}

impl<T: Any + SendSync> Variant for T {
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }
    #[inline(always)]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    #[inline(always)]
    fn as_boxed_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
    #[inline(always)]
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl dyn Variant {
    /// Is this [`Variant`] a specific type?
    #[inline(always)]
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        TypeId::of::<T>() == self.type_id()
    }
}

/// Modes of access.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Default)]
pub enum AccessMode {
    /// Mutable.
    #[default]
    ReadWrite,
    /// Immutable.
    ReadOnly,
}

impl AccessMode {
    /// Is the access type `ReadOnly`?
    #[inline(always)]
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

/// Dynamic type containing any value.
///
/// A [`Dynamic`] is either empty or holds exactly one value. Booleans, characters,
/// integers of every width, floats and strings are stored in-line; any other type is
/// boxed on the heap behind a reference-counted holder.
///
/// A [`Dynamic`] is not [`Clone`]. Copying a boxed value deep-copies it and fails for
/// types that cannot be cloned, so copies are made with [`try_clone`][Dynamic::try_clone].
pub struct Dynamic(pub(crate) Union);

/// Internal [`Dynamic`] representation.
pub enum Union {
    /// No value.
    Empty,
    /// A boolean value.
    Bool(bool, AccessMode),
    /// A [`char`] value.
    Char(char, AccessMode),
    /// An integer value of any width.
    Int(Int, AccessMode),
    /// A floating-point value.
    Float(Float, AccessMode),
    /// A string value, stored in-line when short.
    Str(SmartString, AccessMode),
    /// A boxed value owned by this [`Dynamic`].
    Boxed(Shared<BoxedCell>, AccessMode),
    /// A boxed value aliased from another [`Dynamic`].
    Reference(Shared<BoxedCell>, AccessMode),
}

impl Dynamic {
    /// A [`Dynamic`] containing no value.
    pub const EMPTY: Self = Self(Union::Empty);
    /// A [`Dynamic`] containing `true`.
    pub const TRUE: Self = Self(Union::Bool(true, AccessMode::ReadWrite));
    /// A [`Dynamic`] containing `false`.
    pub const FALSE: Self = Self(Union::Bool(false, AccessMode::ReadWrite));

    /// Create an empty [`Dynamic`].
    #[inline(always)]
    #[must_use]
    pub const fn empty() -> Self {
        Self::EMPTY
    }
    /// Create a [`Dynamic`] from any clonable type.
    ///
    /// # Notes
    ///
    /// Beware that you need to pass in a string as [`String`] or `&'static str`.
    /// A `&String` is stored as a boxed value of type `&String`.
    ///
    /// `()` creates an empty [`Dynamic`].
    ///
    /// # Examples
    ///
    /// ```
    /// use metaclass::Dynamic;
    ///
    /// let result = Dynamic::from(42_i64);
    /// assert_eq!(result.type_name(), "i64");
    /// assert_eq!(result.to_string(), "42");
    ///
    /// let result = Dynamic::from("hello");
    /// assert!(result.is_embedded());
    /// assert_eq!(result.to_string(), "hello");
    ///
    /// let result = Dynamic::from(());
    /// assert!(result.is_empty());
    /// ```
    #[must_use]
    pub fn from<T: Variant + Clone>(value: T) -> Self {
        Self::from_value(value, |v| Box::new(Boxed::new(v)))
    }
    /// Create a [`Dynamic`] from a type that cannot be cloned.
    ///
    /// Copying the resulting value with [`try_clone`][Dynamic::try_clone] fails with
    /// [`ErrorNotCopyable`][ReflectError::ErrorNotCopyable].
    #[must_use]
    pub fn from_unclonable<T: Variant>(value: T) -> Self {
        Self::from_value(value, |v| Box::new(Boxed::unclonable(v)))
    }
    fn from_value<T: Variant>(value: T, boxed: fn(T) -> Box<dyn Holder>) -> Self {
        let mode = AccessMode::ReadWrite;
        let any = &value as &dyn Any;

        if let Some(v) = Int::from_any(&value) {
            return Self(Union::Int(v, mode));
        }
        if let Some(v) = Float::from_any(&value) {
            return Self(Union::Float(v, mode));
        }
        if let Some(v) = any.downcast_ref::<bool>() {
            return Self(Union::Bool(*v, mode));
        }
        if let Some(v) = any.downcast_ref::<char>() {
            return Self(Union::Char(*v, mode));
        }
        if let Some(v) = any.downcast_ref::<&'static str>() {
            return Self(Union::Str((*v).into(), mode));
        }
        if any.is::<()>() {
            return Self::EMPTY;
        }

        let value = match unsafe_reify::<T, String>(value) {
            Ok(s) => return Self(Union::Str(s.into(), mode)),
            Err(v) => v,
        };
        let value = match unsafe_reify::<T, SmartString>(value) {
            Ok(s) => return Self(Union::Str(s, mode)),
            Err(v) => v,
        };

        Self(Union::Boxed(Shared::new(BoxedCell::new(boxed(value))), mode))
    }

    /// Is the value empty?
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.0, Union::Empty)
    }
    /// Is the value stored in-line?
    #[inline]
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(
            self.0,
            Union::Bool(..) | Union::Char(..) | Union::Int(..) | Union::Float(..) | Union::Str(..)
        )
    }
    /// Is the value boxed on the heap (owned or aliased)?
    #[inline]
    #[must_use]
    pub const fn is_boxed(&self) -> bool {
        matches!(self.0, Union::Boxed(..) | Union::Reference(..))
    }
    /// Does the value alias a boxed value created elsewhere?
    #[inline(always)]
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self.0, Union::Reference(..))
    }
    /// Get the [`AccessMode`] of the value. An empty value is always writable.
    #[must_use]
    pub const fn access_mode(&self) -> AccessMode {
        match self.0 {
            Union::Empty => AccessMode::ReadWrite,
            Union::Bool(_, mode)
            | Union::Char(_, mode)
            | Union::Int(_, mode)
            | Union::Float(_, mode)
            | Union::Str(_, mode)
            | Union::Boxed(_, mode)
            | Union::Reference(_, mode) => mode,
        }
    }
    /// Set the [`AccessMode`] of the value.
    pub fn set_access_mode(&mut self, typ: AccessMode) -> &mut Self {
        match &mut self.0 {
            Union::Empty => (),
            Union::Bool(_, mode)
            | Union::Char(_, mode)
            | Union::Int(_, mode)
            | Union::Float(_, mode)
            | Union::Str(_, mode)
            | Union::Boxed(_, mode)
            | Union::Reference(_, mode) => *mode = typ,
        }
        self
    }
    /// Is the value read-only (const)?
    #[inline(always)]
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.access_mode().is_read_only()
    }
    /// Make the value read-only.
    #[inline]
    #[must_use]
    pub fn into_read_only(mut self) -> Self {
        self.set_access_mode(AccessMode::ReadOnly);
        self
    }

    /// Get the [`TypeId`] of the value held by this [`Dynamic`].
    ///
    /// An empty value reports the type of `()`; strings report [`String`].
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        match &self.0 {
            Union::Empty => TypeId::of::<()>(),
            Union::Bool(..) => TypeId::of::<bool>(),
            Union::Char(..) => TypeId::of::<char>(),
            Union::Int(v, _) => v.type_id(),
            Union::Float(v, _) => v.type_id(),
            Union::Str(..) => TypeId::of::<String>(),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => cell.type_id,
        }
    }
    /// Get the name of the type of the value held by this [`Dynamic`].
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match &self.0 {
            Union::Empty => "()",
            Union::Bool(..) => "bool",
            Union::Char(..) => "char",
            Union::Int(v, _) => v.type_name(),
            Union::Float(v, _) => v.type_name(),
            Union::Str(..) => "String",
            Union::Boxed(cell, _) | Union::Reference(cell, _) => cell.type_name,
        }
    }
    /// Get the registered name of the type of the value, falling back to its Rust name.
    #[must_use]
    pub fn display_type_name(&self) -> Identifier {
        match self.0 {
            Union::Boxed(..) | Union::Reference(..) => {
                type_info::display_name(self.type_id(), self.type_name())
            }
            _ => self.type_name().into(),
        }
    }
    /// Get the [`TypeCategory`] of the value.
    #[must_use]
    pub fn category(&self) -> TypeCategory {
        match &self.0 {
            Union::Empty => TypeCategory::Other,
            Union::Bool(..) | Union::Char(..) | Union::Int(..) => TypeCategory::Integral,
            Union::Float(..) => TypeCategory::FloatingPoint,
            Union::Str(..) => TypeCategory::String,
            Union::Boxed(cell, _) | Union::Reference(cell, _) => {
                type_info::category(cell.type_id).unwrap_or_default()
            }
        }
    }
    /// Size in bytes of the value held. An empty value has size zero.
    #[must_use]
    pub fn size(&self) -> usize {
        match &self.0 {
            Union::Empty => 0,
            Union::Bool(..) => mem::size_of::<bool>(),
            Union::Char(..) => mem::size_of::<char>(),
            Union::Int(v, _) => v.size(),
            Union::Float(v, _) => v.size(),
            Union::Str(..) => mem::size_of::<String>(),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => cell.size,
        }
    }
    /// Alignment in bytes of the value held.
    #[must_use]
    pub fn align(&self) -> usize {
        match &self.0 {
            Union::Empty => 1,
            Union::Bool(..) => mem::align_of::<bool>(),
            Union::Char(..) => mem::align_of::<char>(),
            Union::Int(v, _) => v.align(),
            Union::Float(v, _) => v.align(),
            Union::Str(..) => mem::align_of::<String>(),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => cell.align,
        }
    }
    /// Pointer to the raw bytes of the value held.
    ///
    /// The pointer is null for an empty value, or for a boxed value that is currently
    /// borrowed mutably. It is only valid while this [`Dynamic`] is neither moved nor
    /// modified.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        match &self.0 {
            Union::Empty => ptr::null(),
            Union::Bool(v, _) => v as *const bool as *const u8,
            Union::Char(v, _) => v as *const char as *const u8,
            Union::Int(v, _) => v.as_ptr(),
            Union::Float(v, _) => v.as_ptr(),
            Union::Str(v, _) => v.as_ptr(),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => locked_read(&cell.value)
                .map_or(ptr::null(), |holder| {
                    holder.value_any() as *const dyn Any as *const u8
                }),
        }
    }

    /// Shared cell of a boxed value.
    #[inline]
    pub(crate) fn boxed_cell(&self) -> Option<&Shared<BoxedCell>> {
        match &self.0 {
            Union::Boxed(cell, _) | Union::Reference(cell, _) => Some(cell),
            _ => None,
        }
    }
    fn copy_embedded(&self) -> Option<Self> {
        Some(Self(match &self.0 {
            Union::Empty => Union::Empty,
            Union::Bool(v, mode) => Union::Bool(*v, *mode),
            Union::Char(v, mode) => Union::Char(*v, *mode),
            Union::Int(v, mode) => Union::Int(*v, *mode),
            Union::Float(v, mode) => Union::Float(*v, *mode),
            Union::Str(v, mode) => Union::Str(v.clone(), *mode),
            Union::Boxed(..) | Union::Reference(..) => return None,
        }))
    }

    /// Copy the value.
    ///
    /// In-line values are copied. A boxed value is deep-copied through its clone
    /// operation. A reference is copied as another reference to the same value.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorNotCopyable`][ReflectError::ErrorNotCopyable] if the boxed type
    /// cannot be cloned.
    pub fn try_clone(&self) -> ReflectResult<Self> {
        if let Some(value) = self.copy_embedded() {
            return Ok(value);
        }

        match &self.0 {
            Union::Boxed(cell, mode) => {
                let holder = locked_read(&cell.value).ok_or_else(|| self.locked_error())?;
                match holder.clone_holder() {
                    Some(copy) => Ok(Self(Union::Boxed(
                        Shared::new(BoxedCell::new(copy)),
                        *mode,
                    ))),
                    None => Err(ReflectError::ErrorNotCopyable(
                        self.display_type_name().into(),
                    )
                    .into()),
                }
            }
            Union::Reference(cell, mode) => Ok(Self(Union::Reference(cell.clone(), *mode))),
            _ => unreachable!("embedded values are copied above"),
        }
    }
    /// Create a value aliasing this one.
    ///
    /// For a boxed value, the result shares the same holder: changes made through either
    /// are visible through both. A reference to a reference aliases the original holder.
    /// In-line values are never shared, so the result is an independent copy.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::Dynamic;
    ///
    /// #[derive(Clone)]
    /// struct Counter(u32);
    ///
    /// let value = Dynamic::from(Counter(1));
    /// let mut alias = value.create_reference();
    ///
    /// alias.with_mut(|c: &mut Counter| c.0 += 1).unwrap();
    /// assert_eq!(value.with_ref(|c: &Counter| c.0).unwrap(), 2);
    /// ```
    #[must_use]
    pub fn create_reference(&self) -> Self {
        match &self.0 {
            Union::Boxed(cell, mode) | Union::Reference(cell, mode) => {
                Self(Union::Reference(cell.clone(), *mode))
            }
            _ => self.copy_embedded().unwrap_or_default(),
        }
    }

    fn no_value_error<T: Any>() -> Box<ReflectError> {
        ReflectError::ErrorNoValue(type_info::map_std_type_name(type_name::<T>()).into()).into()
    }
    fn mismatch_error<T: Any>(&self) -> Box<ReflectError> {
        ReflectError::ErrorMismatchDataType(
            type_info::display_name(TypeId::of::<T>(), type_name::<T>()).into(),
            self.display_type_name().into(),
            None,
        )
        .into()
    }
    fn locked_error(&self) -> Box<ReflectError> {
        ReflectError::ErrorValueLocked(self.display_type_name().into()).into()
    }

    /// Borrow the value as `&T` and run a closure on it.
    ///
    /// A boxed value can also be borrowed as any of its registered ancestors.
    ///
    /// # Errors
    ///
    /// Fails if the value is empty, is not a `T`, or is currently borrowed mutably.
    pub fn with_ref<T: Variant, R>(&self, f: impl FnOnce(&T) -> R) -> ReflectResult<R> {
        let view = match &self.0 {
            Union::Empty => return Err(Self::no_value_error::<T>()),
            Union::Bool(v, _) => unsafe_cast_ref::<_, T>(v),
            Union::Char(v, _) => unsafe_cast_ref::<_, T>(v),
            Union::Int(v, _) => v.view::<T>(),
            Union::Float(v, _) => v.view::<T>(),
            Union::Str(v, _) if TypeId::of::<T>() == TypeId::of::<String>() => {
                let text = v.to_string();
                return unsafe_cast_ref::<_, T>(&text)
                    .map(f)
                    .ok_or_else(|| self.mismatch_error::<T>());
            }
            Union::Str(v, _) => unsafe_cast_ref::<_, T>(v),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => {
                let holder = locked_read(&cell.value).ok_or_else(|| self.locked_error())?;
                let any = holder.value_any();

                if let Some(value) = any.downcast_ref::<T>() {
                    return Ok(f(value));
                }

                let entry = cache::resolve(TypeId::of::<T>(), cell.type_id);
                return if entry.possible {
                    Ok(f(unsafe_view_at::<T>(any, entry.offset)))
                } else {
                    Err(self.mismatch_error::<T>())
                };
            }
        };

        view.map(f).ok_or_else(|| self.mismatch_error::<T>())
    }
    /// Borrow the value as `&mut T` and run a closure on it.
    ///
    /// Changes made to an aliased boxed value are visible through every alias.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorQualifierViolation`][ReflectError::ErrorQualifierViolation] if the
    /// value is read-only, and otherwise as [`with_ref`][Dynamic::with_ref].
    pub fn with_mut<T: Variant, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> ReflectResult<R> {
        if self.is_read_only() {
            return Err(ReflectError::ErrorQualifierViolation(
                self.display_type_name().into(),
                "value is read-only".into(),
            )
            .into());
        }

        let mismatch = |this: &Self| this.mismatch_error::<T>();

        let view = match &mut self.0 {
            Union::Empty => return Err(Self::no_value_error::<T>()),
            Union::Bool(v, _) => unsafe_cast_mut::<_, T>(v),
            Union::Char(v, _) => unsafe_cast_mut::<_, T>(v),
            Union::Int(v, _) => v.view_mut::<T>(),
            Union::Float(v, _) => v.view_mut::<T>(),
            Union::Str(v, _) if TypeId::of::<T>() == TypeId::of::<String>() => {
                let mut text = v.to_string();
                let result = unsafe_cast_mut::<_, T>(&mut text).map(f);
                *v = text.into();
                return match result {
                    Some(r) => Ok(r),
                    None => Err(mismatch(self)),
                };
            }
            Union::Str(v, _) => unsafe_cast_mut::<_, T>(v),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => {
                let cell = cell.clone();
                let mut holder = locked_write(&cell.value).ok_or_else(|| self.locked_error())?;
                let any = holder.value_any_mut();

                if any.is::<T>() {
                    return any
                        .downcast_mut::<T>()
                        .map(f)
                        .ok_or_else(|| self.mismatch_error::<T>());
                }

                let entry = cache::resolve(TypeId::of::<T>(), cell.type_id);
                return if entry.possible {
                    Ok(f(unsafe_view_at_mut::<T>(any, entry.offset)))
                } else {
                    Err(self.mismatch_error::<T>())
                };
            }
        };

        match view {
            Some(value) => Ok(f(value)),
            None => Err(mismatch(self)),
        }
    }

    /// Is the value convertible to `T`?
    ///
    /// This holds if the value is a `T`, a boxed value having `T` as a registered ancestor,
    /// or a value that coerces to `T` (see [`convert`][Dynamic::convert]). Only an empty
    /// value is a `()`.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::Dynamic;
    ///
    /// let x = Dynamic::from(42_u8);
    ///
    /// assert!(x.is::<u8>());
    /// assert!(x.is::<f64>());
    /// assert!(!x.is::<()>());
    /// ```
    #[must_use]
    pub fn is<T: Variant>(&self) -> bool {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            return self.is_empty();
        }

        self.with_ref(|_: &T| ()).is_ok() || self.coerce::<T>().is_some()
    }
    /// Convert the value into `T`, copying it.
    ///
    /// The conversion tries, in order: the exact type, a registered ancestor (through the
    /// per-thread conversion cache), then numeric and string coercion: numbers convert
    /// between all arithmetic types when in range (floats truncate into integers), strings
    /// are parsed into numbers, and anything displayable converts into a [`String`].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorNoValue`][ReflectError::ErrorNoValue] on an empty value and with
    /// [`ErrorMismatchDataType`][ReflectError::ErrorMismatchDataType] if no conversion
    /// applies.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::Dynamic;
    ///
    /// let x = Dynamic::from(2.9_f64);
    ///
    /// assert_eq!(x.convert::<f64>().unwrap(), 2.9);
    /// assert_eq!(x.convert::<i32>().unwrap(), 2);
    /// assert_eq!(x.convert::<String>().unwrap(), "2.9");
    /// assert!(x.convert::<Vec<u8>>().is_err());
    /// ```
    pub fn convert<T: Variant + Clone>(&self) -> ReflectResult<T> {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            return match self.0 {
                Union::Empty => unsafe_reify(()).map_err(|_| self.mismatch_error::<T>()),
                _ => Err(self.mismatch_error::<T>()),
            };
        }

        match self.with_ref::<T, T>(T::clone) {
            Ok(value) => return Ok(value),
            Err(err) if err.is_type_mismatch() => (),
            Err(err) => return Err(err),
        }

        self.coerce::<T>()
            .ok_or_else(|| self.mismatch_error::<T>())
    }
    /// Convert the value into `T`, consuming it.
    ///
    /// A value of exactly type `T` is moved out without copying. Otherwise this behaves
    /// as [`convert`][Dynamic::convert].
    ///
    /// # Errors
    ///
    /// Same as [`convert`][Dynamic::convert].
    pub fn into_converted<T: Variant + Clone>(self) -> ReflectResult<T> {
        match self.take::<T>() {
            Ok(value) => Ok(value),
            Err(this) => this.convert::<T>(),
        }
    }
    /// Convert the [`Dynamic`] value into a specific type, consuming it.
    ///
    /// Only the exact type succeeds; no ancestor views or coercions are attempted.
    /// A shared boxed value is cloned out when possible.
    ///
    /// Returns [`None`] if types mismatched.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::Dynamic;
    ///
    /// let x = Dynamic::from(42_u32);
    ///
    /// assert_eq!(x.try_cast::<u32>().unwrap(), 42);
    /// ```
    #[must_use]
    pub fn try_cast<T: Variant>(self) -> Option<T> {
        self.take::<T>().ok()
    }
    /// Convert the [`Dynamic`] value into a specific type.
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::Dynamic;
    ///
    /// let x = Dynamic::from(42_u32);
    ///
    /// assert_eq!(x.cast::<u32>(), 42);
    /// ```
    #[must_use]
    pub fn cast<T: Variant + Clone>(self) -> T {
        let self_type_name = self.type_name();

        self.into_converted::<T>().unwrap_or_else(|err| {
            panic!(
                "cannot cast {} value to {}: {}",
                self_type_name,
                type_name::<T>(),
                err
            )
        })
    }
    fn take<T: Variant>(self) -> Result<T, Self> {
        match self.0 {
            Union::Empty => unsafe_reify(()).map_err(|_| Self::EMPTY),
            Union::Bool(v, mode) => unsafe_reify(v).map_err(|v| Self(Union::Bool(v, mode))),
            Union::Char(v, mode) => unsafe_reify(v).map_err(|v| Self(Union::Char(v, mode))),
            Union::Int(v, mode) => v.try_cast().ok_or(Self(Union::Int(v, mode))),
            Union::Float(v, mode) => v.try_cast().ok_or(Self(Union::Float(v, mode))),
            Union::Str(v, mode) if TypeId::of::<T>() == TypeId::of::<String>() => {
                unsafe_reify(v.to_string()).map_err(|_: String| Self(Union::Str(v, mode)))
            }
            Union::Str(v, mode) => unsafe_reify(v).map_err(|v| Self(Union::Str(v, mode))),
            Union::Boxed(cell, mode) if cell.type_id == TypeId::of::<T>() => {
                Self::take_boxed(cell).map_err(|cell| Self(Union::Boxed(cell, mode)))
            }
            Union::Reference(cell, mode) if cell.type_id == TypeId::of::<T>() => {
                Self::take_boxed(cell).map_err(|cell| Self(Union::Reference(cell, mode)))
            }
            union => Err(Self(union)),
        }
    }
    fn take_boxed<T: Variant>(cell: Shared<BoxedCell>) -> Result<T, Shared<BoxedCell>> {
        let holder = match Shared::try_unwrap(cell) {
            Ok(cell) => cell.value.into_inner(),
            Err(cell) => {
                let copy = locked_read(&cell.value).and_then(|holder| holder.clone_holder());
                match copy {
                    Some(copy) => copy,
                    None => return Err(cell),
                }
            }
        };

        match holder.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type identity checked by the caller"),
        }
    }

    /// Coerce the value into an arithmetic type or a string.
    pub(crate) fn coerce<T: Any>(&self) -> Option<T> {
        if TypeId::of::<T>() == TypeId::of::<String>() {
            return self.to_text().and_then(|s| unsafe_reify(s).ok());
        }
        if TypeId::of::<T>() == TypeId::of::<SmartString>() {
            return self
                .to_text()
                .and_then(|s| unsafe_reify(SmartString::from(s)).ok());
        }
        if is_arithmetic_type::<T>() {
            return self.as_number().and_then(coerce_number::<T>);
        }
        None
    }
    fn to_text(&self) -> Option<String> {
        match &self.0 {
            Union::Empty => None,
            Union::Boxed(cell, _) | Union::Reference(cell, _) => {
                type_info::display_fn(cell.type_id)?;
                Some(self.to_string())
            }
            _ => Some(self.to_string()),
        }
    }
    /// Coerce the value to the widest numeric types.
    ///
    /// Booleans and characters are integral; strings are parsed.
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match &self.0 {
            Union::Bool(v, _) => Some(Number::Int(*v as i128)),
            Union::Char(v, _) => Some(Number::Int(*v as u32 as i128)),
            Union::Int(v, _) => Some(v.as_number()),
            Union::Float(v, _) => Some(Number::Float(v.as_f64())),
            Union::Str(v, _) => Number::parse(v),
            Union::Empty | Union::Boxed(..) | Union::Reference(..) => None,
        }
    }
    /// Coerce the value to the widest integer.
    ///
    /// Returns the name of the actual type if the value is not numeric.
    pub fn as_int(&self) -> Result<i128, &'static str> {
        self.as_number()
            .and_then(Number::as_int)
            .ok_or_else(|| self.type_name())
    }
    /// Coerce the value to the widest float.
    ///
    /// Returns the name of the actual type if the value is not numeric.
    pub fn as_float(&self) -> Result<f64, &'static str> {
        self.as_number()
            .map(Number::as_float)
            .ok_or_else(|| self.type_name())
    }

    /// Overwrite the value in place with `other`, converting where needed.
    ///
    /// This is a best-effort operation used to mutate a value through an alias: it never
    /// fails loudly and returns `false` if nothing was assigned. In-line values keep their
    /// type and take a converted copy of `other`. A boxed value takes a clone of `other`
    /// (or of the part of `other` that is of its type), and every alias observes the
    /// change. An empty value becomes a copy of `other`.
    #[must_use]
    pub fn assign(&mut self, other: &Dynamic) -> bool {
        if self.is_read_only() {
            return false;
        }
        if self.is_empty() {
            return match other.try_clone() {
                Ok(mut value) => {
                    value.set_access_mode(AccessMode::ReadWrite);
                    *self = value;
                    true
                }
                Err(_) => false,
            };
        }

        match &mut self.0 {
            Union::Empty => false,
            Union::Bool(v, _) => other.convert::<bool>().map(|x| *v = x).is_ok(),
            Union::Char(v, _) => other.convert::<char>().map(|x| *v = x).is_ok(),
            Union::Int(v, _) => other.as_number().map_or(false, |n| v.store(n)),
            Union::Float(v, _) => other.as_number().map(|n| v.store(n)).is_some(),
            Union::Str(v, _) => other.to_text().map(|x| *v = x.into()).is_some(),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => match other.boxed_cell() {
                Some(source) if Shared::ptr_eq(cell, source) => true,
                Some(source) => {
                    let (Some(from), Some(mut to)) =
                        (locked_read(&source.value), locked_write(&cell.value))
                    else {
                        return false;
                    };
                    view_erased(from.value_any(), source.type_id, cell.type_id)
                        .map_or(false, |value| to.assign(value))
                }
                None => false,
            },
        }
    }

    /// Structural equality.
    ///
    /// Two empty values are equal, and an empty value never equals a non-empty one.
    /// Arithmetic values compare numerically. Boxed values compare with the equality
    /// operation registered for their type, viewing the more derived value as the other
    /// one's type; values of unrelated types are unequal.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorNotComparable`][ReflectError::ErrorNotComparable] if the boxed type
    /// has no registered equality operation.
    pub fn equals(&self, other: &Dynamic) -> ReflectResult<bool> {
        match (&self.0, &other.0) {
            (Union::Empty, Union::Empty) => Ok(true),
            (Union::Empty, _) | (_, Union::Empty) => Ok(false),
            (Union::Str(a, _), Union::Str(b, _)) => Ok(a == b),
            (Union::Str(..), _) | (_, Union::Str(..)) => Ok(false),
            (
                Union::Boxed(a, _) | Union::Reference(a, _),
                Union::Boxed(b, _) | Union::Reference(b, _),
            ) => boxed_equals(a, b),
            (Union::Boxed(..) | Union::Reference(..), _)
            | (_, Union::Boxed(..) | Union::Reference(..)) => Ok(false),
            _ => Ok(match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.num_eq(b),
                _ => false,
            }),
        }
    }
}

/// View a boxed value of type `from` as its ancestor of type `to`.
fn view_erased(value: &dyn Any, from: TypeId, to: TypeId) -> Option<&dyn Any> {
    if from == to {
        return Some(value);
    }

    let entry = cache::resolve(to, from);

    if entry.possible {
        let erase = type_info::erasure(to)?;
        Some(unsafe_erase_at(value, entry.offset, erase))
    } else {
        None
    }
}

fn boxed_equals(a: &Shared<BoxedCell>, b: &Shared<BoxedCell>) -> ReflectResult<bool> {
    let locked = |cell: &BoxedCell| -> Box<ReflectError> {
        ReflectError::ErrorValueLocked(type_info::display_name(cell.type_id, cell.type_name).into())
            .into()
    };
    let not_comparable = |cell: &BoxedCell| -> Box<ReflectError> {
        ReflectError::ErrorNotComparable(
            type_info::display_name(cell.type_id, cell.type_name).into(),
        )
        .into()
    };

    let lhs = locked_read(&a.value).ok_or_else(|| locked(a))?;
    let rhs = locked_read(&b.value).ok_or_else(|| locked(b))?;

    // The more derived value is viewed as the other one's type.
    if let Some(view) = view_erased(rhs.value_any(), b.type_id, a.type_id) {
        let eq = type_info::equality(a.type_id).ok_or_else(|| not_comparable(a))?;
        return Ok(eq(lhs.value_any(), view));
    }
    if let Some(view) = view_erased(lhs.value_any(), a.type_id, b.type_id) {
        let eq = type_info::equality(b.type_id).ok_or_else(|| not_comparable(b))?;
        return Ok(eq(view, rhs.value_any()));
    }

    Ok(false)
}

impl PartialEq for Dynamic {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        matches!(self.equals(other), Ok(true))
    }
}

impl Default for Dynamic {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Union::Empty => Ok(()),
            Union::Bool(v, _) => fmt::Display::fmt(v, f),
            Union::Char(v, _) => fmt::Display::fmt(v, f),
            Union::Int(v, _) => fmt::Display::fmt(v, f),
            Union::Float(v, _) => fmt::Display::fmt(v, f),
            Union::Str(v, _) => fmt::Display::fmt(v, f),
            Union::Boxed(cell, _) | Union::Reference(cell, _) => {
                match (type_info::display_fn(cell.type_id), locked_read(&cell.value)) {
                    (Some(display), Some(holder)) => display(holder.value_any(), f),
                    (_, None) => f.write_str("<locked>"),
                    (None, Some(_)) => write!(f, "<{}>", self.display_type_name()),
                }
            }
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Union::Empty => f.write_str("()"),
            Union::Char(v, _) => fmt::Debug::fmt(v, f),
            Union::Str(v, _) => fmt::Debug::fmt(v, f),
            Union::Reference(..) => write!(f, "&{}", self),
            _ => fmt::Display::fmt(self, f),
        }
    }
}

macro_rules! impl_from {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Dynamic {
                #[inline(always)]
                fn from(value: $t) -> Self {
                    Self::from_value(value, |v| Box::new(Boxed::new(v)))
                }
            }
        )+
    };
}

impl_from!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &'static str,
    SmartString,
);
