//! Override and overload classification of methods.
//!
//! Both classifications are pure functions of resolved descriptors. Parameter types are
//! compared by type identity.

use crate::meta::{ClassInfo, MethodInfo, Qualifiers};
use std::ptr;

#[inline]
fn same_params(m1: &MethodInfo, m2: &MethodInfo) -> bool {
    m1.arity() == m2.arity()
        && m1
            .params()
            .iter()
            .zip(m2.params())
            .all(|(a, b)| a.type_id() == b.type_id())
}

#[inline]
fn related(c1: &'static ClassInfo, c2: &'static ClassInfo) -> bool {
    ptr::eq(c1, c2) || c1.is_subclass_of(c2) || c2.is_subclass_of(c1)
}

/// Does `m1` override `m2`?
///
/// Both methods must be non-static, share name, arity, const and volatile qualification
/// and parameter types, and `m1` must be declared on a subclass of the class of `m2`.
#[must_use]
pub fn overrides(m1: &MethodInfo, m2: &MethodInfo) -> bool {
    let cv = Qualifiers::CONST | Qualifiers::VOLATILE;

    !m1.is_static()
        && !m2.is_static()
        && m1.name() == m2.name()
        && (m1.qualifiers() & cv) == (m2.qualifiers() & cv)
        && same_params(m1, m2)
        && m1.class_info().is_subclass_of(m2.class_info())
}

/// Does `m1` overload `m2`?
///
/// Both methods must share a name and be declared on the same class or on classes related
/// by inheritance, but differ in qualifiers, arity or parameter types. A method never
/// overloads itself.
#[must_use]
pub fn overloads(m1: &MethodInfo, m2: &MethodInfo) -> bool {
    !ptr::eq(m1, m2)
        && m1.name() == m2.name()
        && related(m1.class_info(), m2.class_info())
        && (m1.qualifiers() != m2.qualifiers() || !same_params(m1, m2))
}
