//! Embedded numeric payloads and numeric coercion.

use crate::r#unsafe::{unsafe_cast_mut, unsafe_cast_ref, unsafe_reify};
use num_traits::NumCast;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::mem;

/// Result of coercing a value to the widest numeric types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integral value (including `bool` and `char`).
    Int(i128),
    /// Integral value above [`i128::MAX`].
    UInt(u128),
    /// Floating-point value.
    Float(f64),
}

impl Number {
    /// Parse a number from text, preferring integers.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        text.parse::<i128>()
            .map(Self::Int)
            .or_else(|_| text.parse::<u128>().map(Self::UInt))
            .or_else(|_| text.parse::<f64>().map(Self::Float))
            .ok()
    }
    /// Get the value as the widest signed integer, truncating fractions.
    ///
    /// Returns [`None`] if the value does not fit.
    #[must_use]
    pub fn as_int(self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(v),
            Self::UInt(..) => None,
            Self::Float(v) => NumCast::from(v),
        }
    }
    /// Get the value as the widest float.
    #[must_use]
    pub fn as_float(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::UInt(v) => v as f64,
            Self::Float(v) => v,
        }
    }
    /// Numeric equality: integers compare exactly, anything else as [`f64`].
    #[must_use]
    pub fn num_eq(self, other: Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Int(..), Self::UInt(..)) | (Self::UInt(..), Self::Int(..)) => false,
            (a, b) => a.as_float() == b.as_float(),
        }
    }
}

macro_rules! def_int {
    ($($var:ident => $t:ty),+ $(,)?) => {
        /// An embedded integer of any width.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Int {
            $(
                #[doc = concat!("`", stringify!($t), "` value.")]
                $var($t),
            )+
        }

        impl Int {
            /// Wrap a value if its type is one of the embedded integer types.
            #[inline]
            #[must_use]
            pub fn from_any<T: Any>(value: &T) -> Option<Self> {
                let value = value as &dyn Any;
                $(
                    if let Some(v) = value.downcast_ref::<$t>() {
                        return Some(Self::$var(*v));
                    }
                )+
                None
            }
            /// Is `T` one of the embedded integer types?
            #[inline]
            #[must_use]
            pub fn is_int_type<T: Any>() -> bool {
                let id = TypeId::of::<T>();
                $(id == TypeId::of::<$t>())||+
            }
            /// Type identity of the payload.
            #[inline]
            #[must_use]
            pub fn type_id(&self) -> TypeId {
                match self {
                    $(Self::$var(..) => TypeId::of::<$t>(),)+
                }
            }
            /// Type name of the payload.
            #[inline]
            #[must_use]
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Self::$var(..) => type_name::<$t>(),)+
                }
            }
            /// Size of the payload in bytes.
            #[inline]
            #[must_use]
            pub fn size(&self) -> usize {
                match self {
                    $(Self::$var(..) => mem::size_of::<$t>(),)+
                }
            }
            /// Alignment of the payload in bytes.
            #[inline]
            #[must_use]
            pub fn align(&self) -> usize {
                match self {
                    $(Self::$var(..) => mem::align_of::<$t>(),)+
                }
            }
            /// Pointer to the raw bytes of the payload.
            #[inline]
            #[must_use]
            pub fn as_ptr(&self) -> *const u8 {
                match self {
                    $(Self::$var(v) => v as *const $t as *const u8,)+
                }
            }
            /// Widen the payload to a [`Number`], which holds every embedded width.
            #[inline]
            #[must_use]
            pub fn as_number(&self) -> Number {
                match *self {
                    $(
                        Self::$var(v) => {
                            i128::try_from(v).map_or(Number::UInt(v as u128), Number::Int)
                        }
                    )+
                }
            }
            /// Extract the payload if it is of type `T`.
            #[inline]
            #[must_use]
            pub fn try_cast<T: Any>(self) -> Option<T> {
                match self {
                    $(Self::$var(v) => unsafe_reify(v).ok(),)+
                }
            }
            /// Borrow the payload if it is of type `T`.
            #[inline]
            #[must_use]
            pub fn view<T: Any>(&self) -> Option<&T> {
                match self {
                    $(Self::$var(v) => unsafe_cast_ref(v),)+
                }
            }
            /// Mutably borrow the payload if it is of type `T`.
            #[inline]
            #[must_use]
            pub fn view_mut<T: Any>(&mut self) -> Option<&mut T> {
                match self {
                    $(Self::$var(v) => unsafe_cast_mut(v),)+
                }
            }
            /// Overwrite the payload with a number, keeping its width.
            ///
            /// Returns `false` if the number does not fit.
            #[must_use]
            pub fn store(&mut self, number: Number) -> bool {
                match self {
                    $(Self::$var(v) => match coerce_to::<$t>(number) {
                        Some(n) => {
                            *v = n;
                            true
                        }
                        None => false,
                    },)+
                }
            }
        }

        impl fmt::Display for Int {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$var(v) => fmt::Display::fmt(v, f),)+
                }
            }
        }
    };
}

def_int!(
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    Isize => isize,
    I128 => i128,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    Usize => usize,
    U128 => u128,
);

/// An embedded floating-point number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Float {
    /// Single precision.
    F32(f32),
    /// Double precision.
    F64(f64),
}

impl Float {
    /// Wrap a value if its type is one of the embedded float types.
    #[inline]
    #[must_use]
    pub fn from_any<T: Any>(value: &T) -> Option<Self> {
        let value = value as &dyn Any;

        if let Some(v) = value.downcast_ref::<f64>() {
            Some(Self::F64(*v))
        } else {
            value.downcast_ref::<f32>().map(|v| Self::F32(*v))
        }
    }
    /// Is `T` one of the embedded float types?
    #[inline]
    #[must_use]
    pub fn is_float_type<T: Any>() -> bool {
        let id = TypeId::of::<T>();
        id == TypeId::of::<f64>() || id == TypeId::of::<f32>()
    }
    /// Type identity of the payload.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::F32(..) => TypeId::of::<f32>(),
            Self::F64(..) => TypeId::of::<f64>(),
        }
    }
    /// Type name of the payload.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::F32(..) => "f32",
            Self::F64(..) => "f64",
        }
    }
    /// Size of the payload in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::F32(..) => mem::size_of::<f32>(),
            Self::F64(..) => mem::size_of::<f64>(),
        }
    }
    /// Alignment of the payload in bytes.
    #[inline]
    #[must_use]
    pub fn align(&self) -> usize {
        match self {
            Self::F32(..) => mem::align_of::<f32>(),
            Self::F64(..) => mem::align_of::<f64>(),
        }
    }
    /// Pointer to the raw bytes of the payload.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        match self {
            Self::F32(v) => v as *const f32 as *const u8,
            Self::F64(v) => v as *const f64 as *const u8,
        }
    }
    /// Widen the payload to [`f64`].
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::F32(v) => v as f64,
            Self::F64(v) => v,
        }
    }
    /// Extract the payload if it is of type `T`.
    #[inline]
    #[must_use]
    pub fn try_cast<T: Any>(self) -> Option<T> {
        match self {
            Self::F32(v) => unsafe_reify(v).ok(),
            Self::F64(v) => unsafe_reify(v).ok(),
        }
    }
    /// Borrow the payload if it is of type `T`.
    #[inline]
    #[must_use]
    pub fn view<T: Any>(&self) -> Option<&T> {
        match self {
            Self::F32(v) => unsafe_cast_ref(v),
            Self::F64(v) => unsafe_cast_ref(v),
        }
    }
    /// Mutably borrow the payload if it is of type `T`.
    #[inline]
    #[must_use]
    pub fn view_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Self::F32(v) => unsafe_cast_mut(v),
            Self::F64(v) => unsafe_cast_mut(v),
        }
    }
    /// Overwrite the payload with a number, keeping its precision.
    pub fn store(&mut self, number: Number) {
        match self {
            Self::F32(v) => *v = number.as_float() as f32,
            Self::F64(v) => *v = number.as_float(),
        }
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32(v) => fmt::Display::fmt(v, f),
            Self::F64(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Convert a number into a concrete numeric type, checking the range.
#[inline]
#[must_use]
fn coerce_to<T: NumCast>(number: Number) -> Option<T> {
    match number {
        Number::Int(v) => NumCast::from(v),
        Number::UInt(v) => NumCast::from(v),
        Number::Float(v) => NumCast::from(v),
    }
}

/// Coerce a number into `T` if `T` is an arithmetic type.
///
/// Integers are range-checked, floats truncate towards zero when stored into an
/// integer, and `bool` is `true` for any non-zero value.
#[must_use]
pub fn coerce_number<T: Any>(number: Number) -> Option<T> {
    macro_rules! coerce {
        ($($t:ty),+) => {
            $(
                if TypeId::of::<T>() == TypeId::of::<$t>() {
                    return unsafe_reify(coerce_to::<$t>(number)?).ok();
                }
            )+
        };
    }

    coerce!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, i128, u128);

    if TypeId::of::<T>() == TypeId::of::<bool>() {
        let value = match number {
            Number::Int(v) => v != 0,
            Number::UInt(..) => true,
            Number::Float(v) => v != 0.0,
        };
        return unsafe_reify(value).ok();
    }
    if TypeId::of::<T>() == TypeId::of::<char>() {
        let value = u32::try_from(number.as_int()?).ok().and_then(char::from_u32)?;
        return unsafe_reify(value).ok();
    }

    None
}

/// Is `T` a type that [`coerce_number`] can produce?
#[inline]
#[must_use]
pub fn is_arithmetic_type<T: Any>() -> bool {
    Int::is_int_type::<T>()
        || Float::is_float_type::<T>()
        || TypeId::of::<T>() == TypeId::of::<bool>()
        || TypeId::of::<T>() == TypeId::of::<char>()
}
