//! Module which defines the function registration mechanism.

#![allow(non_snake_case)]

use crate::func::native::{FnThunk, MethodThunk};
use crate::meta::TypeSpec;
use crate::types::dynamic::Variant;
use crate::{Dynamic, ReflectError, ReflectResult, StaticVec};
use std::iter::Enumerate;
use std::mem;
use std::slice::IterMut;

// These types are used to build a unique _marker_ tuple type for each combination
// of function parameter types in order to make each trait implementation unique.
// That is because stable Rust currently does not allow distinguishing implementations
// based purely on parameter types of traits (Fn, FnOnce and FnMut).
//
// For example:
//
// `NativeMethod<T, (Mut<T>, B, C), R, ()>`
//
// will have the function prototype constraint to:
//
// `FN: (&mut T, B, C) -> R`
//
// These types are not actually used anywhere.

/// Marker for a receiver taken as `&mut T`.
pub struct Mut<T>(T);
/// Marker for a receiver taken as `&T`.
pub struct Ref<T>(T);

/// Take the next positional argument and convert it into `T`.
///
/// The argument is consumed. A conversion failure is tagged with the argument position.
#[inline]
pub fn next_arg<T: Variant + Clone>(
    args: &mut Enumerate<IterMut<'_, Dynamic>>,
) -> ReflectResult<T> {
    match args.next() {
        Some((index, arg)) => mem::take(arg)
            .into_converted::<T>()
            .map_err(|err| err.fill_argument_index(index)),
        None => Err(ReflectError::ErrorArityMismatch("native call".into(), 1, 0).into()),
    }
}

/// Trait to turn a native function or closure into a positional-argument thunk.
pub trait NativeFunction<ARGS, RET, RESULT> {
    /// Get the number of parameters.
    #[must_use]
    fn arity() -> usize;
    /// Get the types of the parameters.
    #[must_use]
    fn param_types() -> StaticVec<TypeSpec>;
    /// Get the return type.
    #[must_use]
    fn return_type() -> TypeSpec;
    /// Convert into a thunk.
    #[must_use]
    fn into_thunk(self) -> Box<FnThunk>;
}

/// Trait to turn a native function or closure taking `&T` or `&mut T` first into a
/// method thunk of class `T`.
pub trait NativeMethod<T, ARGS, RET, RESULT> {
    /// Does the method only borrow its object immutably?
    const IS_CONST: bool;

    /// Get the number of parameters, not counting the object.
    #[must_use]
    fn arity() -> usize;
    /// Get the types of the parameters, not counting the object.
    #[must_use]
    fn param_types() -> StaticVec<TypeSpec>;
    /// Get the return type.
    #[must_use]
    fn return_type() -> TypeSpec;
    /// Convert into a thunk.
    #[must_use]
    fn into_thunk(self) -> MethodThunk;
}

/// Trait to turn a native function or closure producing a `T` into a constructor thunk.
pub trait NativeConstructor<T, ARGS, RESULT> {
    /// Get the number of parameters.
    #[must_use]
    fn arity() -> usize;
    /// Get the types of the parameters.
    #[must_use]
    fn param_types() -> StaticVec<TypeSpec>;
    /// Convert into a thunk wrapping each constructed value with `wrap`.
    #[must_use]
    fn into_thunk(self, wrap: fn(T) -> Dynamic) -> Box<FnThunk>;
}

macro_rules! count_params {
    () => { 0_usize };
    ($head:ident $($tail:ident)*) => { 1_usize + count_params!($($tail)*) };
}

macro_rules! def_register {
    () => {
        def_register!(imp);
    };
    (imp $($par:ident),*) => {
    //                     ^ function parameter generic type name (A, B, C etc.)

        impl<
            FN: Fn($($par),*) -> RET + Send + Sync + 'static,
            $($par: Variant + Clone,)*
            RET: Variant + Clone
        > NativeFunction<($($par,)*), RET, ()> for FN {
            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn return_type() -> TypeSpec { TypeSpec::of::<RET>() }
            #[inline(always)] fn into_thunk(self) -> Box<FnThunk> {
                Box::new(move |args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    // Call the function with each argument value
                    let r = self($($par),*);
                    Ok(Dynamic::from(r))
                })
            }
        }

        impl<
            FN: Fn($($par),*) -> ReflectResult<RET> + Send + Sync + 'static,
            $($par: Variant + Clone,)*
            RET: Variant + Clone
        > NativeFunction<($($par,)*), RET, ReflectResult<()>> for FN {
            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn return_type() -> TypeSpec { TypeSpec::of::<RET>() }
            #[inline(always)] fn into_thunk(self) -> Box<FnThunk> {
                Box::new(move |args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    self($($par),*).map(Dynamic::from)
                })
            }
        }

        impl<
            FN: Fn(&T $(, $par)*) -> RET + Send + Sync + 'static,
            T: Variant,
            $($par: Variant + Clone,)*
            RET: Variant + Clone
        > NativeMethod<T, (Ref<T>, $($par,)*), RET, ()> for FN {
            const IS_CONST: bool = true;

            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn return_type() -> TypeSpec { TypeSpec::of::<RET>() }
            #[inline(always)] fn into_thunk(self) -> MethodThunk {
                MethodThunk::Const(Box::new(move |obj: &Dynamic, args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    obj.with_ref(|this: &T| self(this $(, $par)*)).map(Dynamic::from)
                }))
            }
        }

        impl<
            FN: Fn(&T $(, $par)*) -> ReflectResult<RET> + Send + Sync + 'static,
            T: Variant,
            $($par: Variant + Clone,)*
            RET: Variant + Clone
        > NativeMethod<T, (Ref<T>, $($par,)*), RET, ReflectResult<()>> for FN {
            const IS_CONST: bool = true;

            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn return_type() -> TypeSpec { TypeSpec::of::<RET>() }
            #[inline(always)] fn into_thunk(self) -> MethodThunk {
                MethodThunk::Const(Box::new(move |obj: &Dynamic, args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    obj.with_ref(|this: &T| self(this $(, $par)*))?.map(Dynamic::from)
                }))
            }
        }

        impl<
            FN: Fn(&mut T $(, $par)*) -> RET + Send + Sync + 'static,
            T: Variant,
            $($par: Variant + Clone,)*
            RET: Variant + Clone
        > NativeMethod<T, (Mut<T>, $($par,)*), RET, ()> for FN {
            const IS_CONST: bool = false;

            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn return_type() -> TypeSpec { TypeSpec::of::<RET>() }
            #[inline(always)] fn into_thunk(self) -> MethodThunk {
                MethodThunk::Mut(Box::new(move |obj: &mut Dynamic, args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    obj.with_mut(|this: &mut T| self(this $(, $par)*)).map(Dynamic::from)
                }))
            }
        }

        impl<
            FN: Fn(&mut T $(, $par)*) -> ReflectResult<RET> + Send + Sync + 'static,
            T: Variant,
            $($par: Variant + Clone,)*
            RET: Variant + Clone
        > NativeMethod<T, (Mut<T>, $($par,)*), RET, ReflectResult<()>> for FN {
            const IS_CONST: bool = false;

            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn return_type() -> TypeSpec { TypeSpec::of::<RET>() }
            #[inline(always)] fn into_thunk(self) -> MethodThunk {
                MethodThunk::Mut(Box::new(move |obj: &mut Dynamic, args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    obj.with_mut(|this: &mut T| self(this $(, $par)*))?.map(Dynamic::from)
                }))
            }
        }

        impl<
            FN: Fn($($par),*) -> T + Send + Sync + 'static,
            T: Variant,
            $($par: Variant + Clone,)*
        > NativeConstructor<T, ($($par,)*), ()> for FN {
            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn into_thunk(self, wrap: fn(T) -> Dynamic) -> Box<FnThunk> {
                Box::new(move |args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    Ok(wrap(self($($par),*)))
                })
            }
        }

        impl<
            FN: Fn($($par),*) -> ReflectResult<T> + Send + Sync + 'static,
            T: Variant,
            $($par: Variant + Clone,)*
        > NativeConstructor<T, ($($par,)*), ReflectResult<()>> for FN {
            #[inline(always)] fn arity() -> usize { count_params!($($par)*) }
            #[inline] fn param_types() -> StaticVec<TypeSpec> {
                #[allow(unused_mut)]
                let mut types = StaticVec::new();
                $(types.push(TypeSpec::of::<$par>());)*
                types
            }
            #[inline(always)] fn into_thunk(self, wrap: fn(T) -> Dynamic) -> Box<FnThunk> {
                Box::new(move |args: &mut [Dynamic]| {
                    let _drain = &mut args.iter_mut().enumerate();
                    $(let $par = next_arg::<$par>(_drain)?;)*

                    self($($par),*).map(wrap)
                })
            }
        }
    };
    ($p0:ident $(, $p:ident)*) => {
        def_register!(imp $p0 $(, $p)*);
        def_register!($($p),*);
    };
}

def_register!(A, B, C, D, E, F, G, H, J, K, L, M);
