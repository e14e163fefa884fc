//! Helper module which defines [`FuncArgs`] to make reflective calls easier.

#![allow(non_snake_case)]

use crate::types::dynamic::Variant;
use crate::{Dynamic, StaticVec};

/// Trait that represents positional arguments to a reflective call.
///
/// Any data type that can be converted into a [`Vec`]`<`[`Dynamic`]`>` can be used
/// as arguments to a call: tuples of clonable values, and vectors or arrays of [`Dynamic`].
pub trait FuncArgs {
    /// Parse function call arguments into a container.
    ///
    /// # Example
    ///
    /// ```
    /// use metaclass::{Dynamic, FuncArgs};
    ///
    /// // A struct containing function arguments
    /// struct Options {
    ///     pub foo: bool,
    ///     pub bar: String,
    ///     pub baz: i64,
    /// }
    ///
    /// impl FuncArgs for Options {
    ///     fn parse<ARGS: Extend<Dynamic>>(self, args: &mut ARGS) {
    ///         args.extend(Some(Dynamic::from(self.foo)));
    ///         args.extend(Some(Dynamic::from(self.bar)));
    ///         args.extend(Some(Dynamic::from(self.baz)));
    ///     }
    /// }
    ///
    /// let mut args: Vec<Dynamic> = Vec::new();
    /// Options { foo: true, bar: "hello".into(), baz: 42 }.parse(&mut args);
    ///
    /// assert_eq!(args.len(), 3);
    /// assert_eq!(args[2].convert::<i64>().unwrap(), 42);
    /// ```
    fn parse<ARGS: Extend<Dynamic>>(self, args: &mut ARGS);

    /// Collect the arguments into a [`StaticVec`].
    #[inline]
    #[must_use]
    fn into_vec(self) -> StaticVec<Dynamic>
    where
        Self: Sized,
    {
        let mut args = StaticVec::new();
        self.parse(&mut args);
        args
    }
}

impl FuncArgs for Vec<Dynamic> {
    #[inline]
    fn parse<ARGS: Extend<Dynamic>>(self, args: &mut ARGS) {
        args.extend(self);
    }
}

impl FuncArgs for StaticVec<Dynamic> {
    #[inline]
    fn parse<ARGS: Extend<Dynamic>>(self, args: &mut ARGS) {
        args.extend(self);
    }
}

impl<const N: usize> FuncArgs for [Dynamic; N] {
    #[inline]
    fn parse<ARGS: Extend<Dynamic>>(self, args: &mut ARGS) {
        args.extend(self);
    }
}

/// Macro to implement [`FuncArgs`] for tuples of standard types (each can be
/// converted into a [`Dynamic`]).
macro_rules! impl_args {
    ($($p:ident),*) => {
        impl<$($p: Variant + Clone),*> FuncArgs for ($($p,)*)
        {
            #[inline]
            #[allow(unused_variables)]
            fn parse<ARGS: Extend<Dynamic>>(self, args: &mut ARGS) {
                let ($($p,)*) = self;
                $(args.extend(Some(Dynamic::from($p)));)*
            }
        }

        impl_args!(@pop $($p),*);
    };
    (@pop) => {
    };
    (@pop $head:ident) => {
        impl_args!();
    };
    (@pop $head:ident $(, $tail:ident)+) => {
        impl_args!($($tail),*);
    };
}

impl_args!(A, B, C, D, E, F, G, H, J, K, L, M, N, P, Q, R);
