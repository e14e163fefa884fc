//! Type spellings and human-readable signature rendering.

use crate::meta::Qualifiers;
use crate::types::dynamic::Variant;
use crate::types::type_info;
use crate::{Dynamic, Identifier};
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A parameter or return type of a registered member.
#[derive(Clone, Copy)]
pub struct TypeSpec {
    type_id: TypeId,
    type_name: &'static str,
    accepts: fn(&Dynamic) -> bool,
}

impl TypeSpec {
    /// Type specification of `T`.
    #[inline]
    #[must_use]
    pub fn of<T: Variant>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            accepts: Dynamic::is::<T>,
        }
    }
    /// Type identity token.
    #[inline(always)]
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }
    /// Rust name of the type.
    #[inline(always)]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
    /// Spelling of the type: its registered name, or its friendly standard name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Identifier {
        type_info::display_name(self.type_id, self.type_name)
    }
    /// Is this the unit type?
    #[inline(always)]
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.type_id == TypeId::of::<()>()
    }
    /// Can `value` be passed where this type is expected?
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &Dynamic) -> bool {
        (self.accepts)(value)
    }
}

impl PartialEq for TypeSpec {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeSpec {}

impl Hash for TypeSpec {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Render a parameter list, without the parentheses.
#[must_use]
pub(crate) fn params_list(params: &[TypeSpec]) -> String {
    params
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Last path segment of a fully-qualified name.
#[inline]
#[must_use]
pub(crate) fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Render a member signature.
///
/// `static` is a prefix; `const` and `volatile` are suffixes.
#[must_use]
pub(crate) fn render(
    ret: Option<&TypeSpec>,
    qualified_name: &str,
    params: Option<&[TypeSpec]>,
    qualifiers: Qualifiers,
) -> String {
    let mut text = String::new();

    if qualifiers.contains(Qualifiers::STATIC) {
        text.push_str("static ");
    }
    if let Some(ret) = ret {
        text.push_str(&ret.name());
        text.push(' ');
    }
    text.push_str(qualified_name);
    if let Some(params) = params {
        text.push('(');
        text.push_str(&params_list(params));
        text.push(')');
    }
    if !qualifiers.contains(Qualifiers::STATIC) {
        if qualifiers.contains(Qualifiers::CONST) {
            text.push_str(" const");
        }
        if qualifiers.contains(Qualifiers::VOLATILE) {
            text.push_str(" volatile");
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_method() {
        let params = [TypeSpec::of::<i32>(), TypeSpec::of::<i32>()];

        assert_eq!(
            render(
                Some(&TypeSpec::of::<i32>()),
                "demo::Calc::add",
                Some(&params),
                Qualifiers::CONST
            ),
            "i32 demo::Calc::add(i32, i32) const"
        );
        assert_eq!(
            render(
                Some(&TypeSpec::of::<String>()),
                "demo::Calc::name",
                Some(&[]),
                Qualifiers::STATIC | Qualifiers::CONST
            ),
            "static String demo::Calc::name()"
        );
        assert_eq!(
            render(Some(&TypeSpec::of::<f64>()), "demo::Point::x", None, Qualifiers::empty()),
            "f64 demo::Point::x"
        );
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("demo::Point"), "Point");
        assert_eq!(short_name("Point"), "Point");
    }
}
