//! Module containing error definitions for reflective operations.

use std::error::Error;
use std::fmt;

/// Error raised by a reflective operation.
///
/// All errors are raised synchronously at the point of use. None of them is retried
/// automatically.
#[derive(Debug)]
#[non_exhaustive]
pub enum ReflectError {
    /// Value requested from an empty [`Dynamic`][crate::Dynamic].
    /// Wrapped value is the name of the requested type.
    ErrorNoValue(String),
    /// Operation on an uninitialized handle.
    /// Wrapped value is the kind of handle (`class`, `method` etc.).
    ErrorInvalidHandle(&'static str),
    /// Call with too few arguments.
    /// Wrapped values are the name of the member, the number of parameters required
    /// and the actual number of arguments passed.
    ErrorArityMismatch(String, usize, usize),
    /// Data type is incorrect.
    /// Wrapped values are the type requested, the type of the actual value and, for call
    /// arguments, the position of the offending argument.
    ErrorMismatchDataType(String, String, Option<usize>),
    /// Const, volatile or static qualification of the caller does not fit the member.
    /// Wrapped values are the name of the member and the reason.
    ErrorQualifierViolation(String, String),
    /// Non-static member invoked without an object.
    /// Wrapped value is the name of the member.
    ErrorMissingObject(String),
    /// Copy of a value whose type cannot be cloned.
    /// Wrapped value is the name of the type.
    ErrorNotCopyable(String),
    /// Equality test on a type without an equality operation.
    /// Wrapped value is the name of the type.
    ErrorNotComparable(String),
    /// Class still names superclasses that are not registered.
    /// Wrapped values are the name of the class and the first missing base.
    ErrorUnresolvedBase(String, String),
    /// Class is not a registered interface.
    /// Wrapped value is the name of the class.
    ErrorNotInterface(String),
    /// Proxy operation invoked with no registered handler.
    /// Wrapped value is the name of the operation.
    ErrorNotImplemented(String),
    /// Member does not exist.
    /// Wrapped value is the name of the member.
    ErrorMemberNotFound(String),
    /// Boxed value is currently borrowed in a conflicting way.
    /// Wrapped value is the name of the type.
    ErrorValueLocked(String),
    /// Run-time error raised by a registered function or proxy handler.
    /// Wrapped value is the error message.
    ErrorRuntime(String),
}

impl Error for ReflectError {}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErrorNoValue(t) => write!(f, "Empty value cannot be read as {}", t)?,
            Self::ErrorInvalidHandle(kind) => write!(f, "Operation on an invalid {} handle", kind)?,
            Self::ErrorArityMismatch(s, 0, _) => write!(f, "Member {} expects no arguments", s)?,
            Self::ErrorArityMismatch(s, 1, 0) => {
                write!(f, "Member {} expects one argument but none was given", s)?
            }
            Self::ErrorArityMismatch(s, 1, n) => {
                write!(f, "Member {} expects one argument but {} were given", s, n)?
            }
            Self::ErrorArityMismatch(s, need, 0) => {
                write!(f, "Member {} expects {} arguments but none was given", s, need)?
            }
            Self::ErrorArityMismatch(s, need, 1) => {
                write!(f, "Member {} expects {} arguments but only one was given", s, need)?
            }
            Self::ErrorArityMismatch(s, need, n) => write!(
                f,
                "Member {} expects {} arguments but only {} were given",
                s, need, n
            )?,
            Self::ErrorMismatchDataType(r, a, None) => {
                write!(f, "Data type incorrect: {} (expecting {})", a, r)?
            }
            Self::ErrorMismatchDataType(r, a, Some(index)) => write!(
                f,
                "Data type incorrect for argument #{}: {} (expecting {})",
                index + 1,
                a,
                r
            )?,
            Self::ErrorQualifierViolation(s, reason) => {
                write!(f, "Cannot invoke {}: {}", s, reason)?
            }
            Self::ErrorMissingObject(s) => write!(f, "Non-static member {} needs an object", s)?,
            Self::ErrorNotCopyable(t) => write!(f, "Type {} cannot be copied", t)?,
            Self::ErrorNotComparable(t) => write!(f, "Type {} has no equality operation", t)?,
            Self::ErrorUnresolvedBase(c, b) => {
                write!(f, "Class {} has unresolved superclass {}", c, b)?
            }
            Self::ErrorNotInterface(c) => write!(f, "Class {} is not an interface", c)?,
            Self::ErrorNotImplemented(s) => write!(f, "Operation {} is not implemented", s)?,
            Self::ErrorMemberNotFound(s) => write!(f, "Member not found: {}", s)?,
            Self::ErrorValueLocked(t) => write!(f, "Value of type {} is currently borrowed", t)?,
            Self::ErrorRuntime(s) if s.is_empty() => f.write_str("Runtime error")?,
            Self::ErrorRuntime(s) => write!(f, "Runtime error: {}", s)?,
        }

        Ok(())
    }
}

impl<T: AsRef<str>> From<T> for ReflectError {
    #[inline(never)]
    fn from(err: T) -> Self {
        Self::ErrorRuntime(err.as_ref().to_string())
    }
}

impl<T: AsRef<str>> From<T> for Box<ReflectError> {
    #[inline(always)]
    fn from(err: T) -> Self {
        ReflectError::ErrorRuntime(err.as_ref().to_string()).into()
    }
}

impl ReflectError {
    /// Is this a type mismatch?
    #[inline]
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::ErrorMismatchDataType(..))
    }
    /// Get the position of the call argument this error refers to, if any.
    #[inline]
    #[must_use]
    pub const fn argument_index(&self) -> Option<usize> {
        match self {
            Self::ErrorMismatchDataType(.., index) => *index,
            _ => None,
        }
    }
    /// Attach the position of a call argument to a type mismatch.
    ///
    /// Other errors are left untouched.
    #[inline]
    pub fn set_argument_index(&mut self, new_index: usize) -> &mut Self {
        if let Self::ErrorMismatchDataType(.., index) = self {
            *index = Some(new_index);
        }
        self
    }
    /// Consume the current error and return a new one with the argument position set.
    #[inline(always)]
    #[must_use]
    pub fn fill_argument_index(mut self: Box<Self>, new_index: usize) -> Box<Self> {
        if self.argument_index().is_none() {
            self.set_argument_index(new_index);
        }
        self
    }
}

/// Result of a reflective operation.
pub type ReflectResult<T> = Result<T, Box<ReflectError>>;
