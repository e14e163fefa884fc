use metaclass::{
    register_type, AccessMode, Dynamic, ReflectError, SmartString, TypeCategory, Variant,
};
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq)]
struct Celsius(f64);

struct Socket {
    fd: i32,
}

#[test]
fn test_dynamic_scalars() -> Result<(), Box<ReflectError>> {
    let x = Dynamic::from(42_i32);

    assert!(x.is_embedded());
    assert!(!x.is_boxed());
    assert_eq!(x.type_name(), "i32");
    assert_eq!(x.category(), TypeCategory::Integral);
    assert_eq!(x.size(), 4);
    assert_eq!(x.convert::<i32>()?, 42);
    assert_eq!(x.convert::<u8>()?, 42);
    assert_eq!(x.convert::<f64>()?, 42.0);
    assert_eq!(x.convert::<String>()?, "42");

    let y = Dynamic::from(2.9_f64);
    assert_eq!(y.category(), TypeCategory::FloatingPoint);
    assert_eq!(y.convert::<i64>()?, 2);

    let s = Dynamic::from("12");
    assert!(s.is_embedded());
    assert_eq!(s.category(), TypeCategory::String);
    assert_eq!(s.convert::<i64>()?, 12);
    assert_eq!(s.convert::<String>()?, "12");

    assert_eq!(Dynamic::from(true).convert::<i32>()?, 1);
    assert_eq!(Dynamic::from('A').convert::<u32>()?, 65);

    Ok(())
}

fn round_trip<T: Variant + Clone + PartialEq + Debug>(value: T) -> Result<(), Box<ReflectError>> {
    let x = Dynamic::from(value.clone());

    assert!(x.is_embedded(), "{} is not embedded", x.type_name());
    assert!(x.is::<T>());
    assert_eq!(x.convert::<T>()?, value);
    assert_eq!(x.into_converted::<T>()?, value);

    Ok(())
}

#[test]
fn test_dynamic_round_trip() -> Result<(), Box<ReflectError>> {
    round_trip(-8_i8)?;
    round_trip(-16_i16)?;
    round_trip(-32_i32)?;
    round_trip(i64::MIN)?;
    round_trip(-1_isize)?;
    round_trip(i128::MIN)?;
    round_trip(u8::MAX)?;
    round_trip(16_u16)?;
    round_trip(u32::MAX)?;
    round_trip(u64::MAX)?;
    round_trip(usize::MAX)?;
    round_trip(u128::MAX)?;
    round_trip(1.5_f32)?;
    round_trip(-2.25_f64)?;
    round_trip(true)?;
    round_trip('λ')?;
    round_trip(String::from("hello"))?;
    round_trip(SmartString::from("short"))?;

    Ok(())
}

#[test]
fn test_dynamic_wide_integers() -> Result<(), Box<ReflectError>> {
    let x = Dynamic::from(5_i128);

    assert_eq!(x.type_name(), "i128");
    assert_eq!(x.category(), TypeCategory::Integral);
    assert_eq!(x.size(), 16);
    assert_eq!(x.convert::<i64>()?, 5);
    assert_eq!(x.as_int(), Ok(5));
    assert_eq!(x, Dynamic::from(5_i64));
    assert_eq!(Dynamic::from(5_u128).as_int(), Ok(5));

    // Above the signed range.
    let big = Dynamic::from(u128::MAX);
    assert!(big.as_int().is_err());
    assert_eq!(big.as_float(), Ok(u128::MAX as f64));
    assert!(!big.is::<i128>());
    assert!(matches!(
        *big.convert::<u64>().unwrap_err(),
        ReflectError::ErrorMismatchDataType(..)
    ));
    assert_eq!(big, Dynamic::from(u128::MAX));
    assert_ne!(big, Dynamic::from(-1_i128));
    assert_eq!(Dynamic::from(u128::MAX.to_string()).convert::<u128>()?, u128::MAX);

    let mut y = Dynamic::from(0_u128);
    assert!(y.assign(&Dynamic::from(7_i8)));
    assert_eq!(y.convert::<u128>()?, 7);
    assert!(!y.assign(&Dynamic::from(-1_i8)));

    Ok(())
}

#[test]
fn test_dynamic_empty() {
    let x = Dynamic::empty();

    assert!(x.is_empty());
    assert!(x.is::<()>());
    assert!(!x.is::<i32>());
    assert!(Dynamic::from(()).is_empty());

    assert!(matches!(
        *x.convert::<i32>().unwrap_err(),
        ReflectError::ErrorNoValue(..)
    ));
}

#[test]
fn test_dynamic_out_of_range() {
    let x = Dynamic::from(300_i32);

    assert!(matches!(
        *x.convert::<u8>().unwrap_err(),
        ReflectError::ErrorMismatchDataType(..)
    ));
    assert!(!x.is::<u8>());
    assert!(x.is::<u16>());
}

#[test]
fn test_dynamic_boxed() -> Result<(), Box<ReflectError>> {
    let mut x = Dynamic::from(vec![1, 2, 3]);

    assert!(x.is_boxed());
    assert!(!x.is_reference());
    assert!(x.is::<Vec<i32>>());
    assert!(!x.is::<String>());

    x.with_mut(|v: &mut Vec<i32>| v.push(4))?;
    assert_eq!(x.with_ref(|v: &Vec<i32>| v.len())?, 4);

    // A copy of an owned boxed value is deep.
    let y = x.try_clone()?;
    x.with_mut(|v: &mut Vec<i32>| v.clear())?;
    assert_eq!(y.cast::<Vec<i32>>(), vec![1, 2, 3, 4]);

    assert!(matches!(
        *x.convert::<Celsius>().unwrap_err(),
        ReflectError::ErrorMismatchDataType(..)
    ));

    Ok(())
}

#[test]
fn test_dynamic_boxed_payload() -> Result<(), Box<ReflectError>> {
    let x = Dynamic::from(Celsius(36.6));

    // The raw pointer addresses the payload, not its holder.
    let payload = x.with_ref(|c: &Celsius| c as *const Celsius as *const u8)?;
    assert_eq!(x.as_ptr(), payload);
    assert_eq!(x.size(), std::mem::size_of::<Celsius>());
    assert_eq!(x.with_ref(|c: &Celsius| c.0)?, 36.6);

    Ok(())
}

#[test]
fn test_dynamic_reference() -> Result<(), Box<ReflectError>> {
    let value = Dynamic::from(vec![1, 2, 3]);
    let mut alias = value.create_reference();

    assert!(alias.is_reference());

    alias.with_mut(|v: &mut Vec<i32>| v.push(4))?;
    assert_eq!(value.with_ref(|v: &Vec<i32>| v.len())?, 4);

    // A copy of a reference aliases the same value.
    let mut copy = alias.try_clone()?;
    assert!(copy.is_reference());
    copy.with_mut(|v: &mut Vec<i32>| v.push(5))?;
    assert_eq!(value.with_ref(|v: &Vec<i32>| v.len())?, 5);

    // References to embedded values are copies.
    let n = Dynamic::from(1_i32);
    let mut m = n.create_reference();
    assert!(!m.is_reference());
    m.with_mut(|v: &mut i32| *v = 2)?;
    assert_eq!(n.convert::<i32>()?, 1);

    Ok(())
}

#[test]
fn test_dynamic_not_copyable() -> Result<(), Box<ReflectError>> {
    let x = Dynamic::from_unclonable(Socket { fd: 3 });

    assert_eq!(x.with_ref(|s: &Socket| s.fd)?, 3);
    assert!(matches!(
        *x.try_clone().unwrap_err(),
        ReflectError::ErrorNotCopyable(..)
    ));

    // Aliasing never copies.
    let alias = x.create_reference();
    assert_eq!(alias.with_ref(|s: &Socket| s.fd)?, 3);
    assert!(alias.try_clone().is_ok());

    Ok(())
}

#[test]
fn test_dynamic_read_only() -> Result<(), Box<ReflectError>> {
    let mut x = Dynamic::from(vec![1]).into_read_only();

    assert!(x.is_read_only());
    assert_eq!(x.with_ref(|v: &Vec<i32>| v[0])?, 1);
    assert!(matches!(
        *x.with_mut(|v: &mut Vec<i32>| v.push(2)).unwrap_err(),
        ReflectError::ErrorQualifierViolation(..)
    ));

    x.set_access_mode(AccessMode::ReadWrite);
    x.with_mut(|v: &mut Vec<i32>| v.push(2))?;
    assert_eq!(x.with_ref(|v: &Vec<i32>| v.len())?, 2);

    Ok(())
}

#[test]
fn test_dynamic_equality() -> Result<(), Box<ReflectError>> {
    register_type::<Celsius>("test::Celsius").equality();

    assert!(Dynamic::from(1_i32).equals(&Dynamic::from(1.0_f64))?);
    assert!(!Dynamic::from(1_i32).equals(&Dynamic::from(2_u8))?);
    assert!(Dynamic::from("abc").equals(&Dynamic::from(String::from("abc")))?);
    assert!(!Dynamic::from("1").equals(&Dynamic::from(1))?);
    assert!(Dynamic::empty().equals(&Dynamic::empty())?);
    assert!(!Dynamic::empty().equals(&Dynamic::from(0))?);

    let a = Dynamic::from(Celsius(21.5));
    assert!(a.equals(&Dynamic::from(Celsius(21.5)))?);
    assert!(!a.equals(&Dynamic::from(Celsius(0.0)))?);
    assert!(!a.equals(&Dynamic::from(vec![1]))?);
    assert_eq!(a.display_type_name().as_str(), "test::Celsius");

    let b = Dynamic::from(vec![1]);
    assert!(matches!(
        *b.equals(&Dynamic::from(vec![1])).unwrap_err(),
        ReflectError::ErrorNotComparable(..)
    ));

    Ok(())
}

#[test]
fn test_dynamic_assign() -> Result<(), Box<ReflectError>> {
    let mut x = Dynamic::from(1_u8);
    assert!(x.assign(&Dynamic::from(7_i64)));
    assert_eq!(x.type_name(), "u8");
    assert_eq!(x.convert::<u8>()?, 7);

    let value = Dynamic::from(vec![1]);
    let mut alias = value.create_reference();
    assert!(alias.assign(&Dynamic::from(vec![9, 9])));
    assert_eq!(value.with_ref(|v: &Vec<i32>| v.clone())?, vec![9, 9]);

    let mut frozen = Dynamic::from(1).into_read_only();
    assert!(!frozen.assign(&Dynamic::from(2)));

    let mut empty = Dynamic::empty();
    assert!(empty.assign(&Dynamic::from("text")));
    assert_eq!(empty.convert::<String>()?, "text");

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Rgb(u8, u8, u8);

#[derive(Debug, Clone)]
struct Handle(Box<u32>);

#[derive(Debug, Clone)]
struct Opaque;

#[test]
fn test_dynamic_explicit_category() -> Result<(), Box<ReflectError>> {
    register_type::<Rgb>("test::Rgb").category(TypeCategory::Pod);
    register_type::<Handle>("test::Handle").category(TypeCategory::Pointer);
    register_type::<Opaque>("test::Opaque");

    assert_eq!(Dynamic::from(Rgb(1, 2, 3)).category(), TypeCategory::Pod);
    assert_eq!(
        Dynamic::from(Handle(Box::new(7))).category(),
        TypeCategory::Pointer
    );
    assert_eq!(Dynamic::from(Opaque).category(), TypeCategory::Other);
    assert_eq!(TypeCategory::of::<Rgb>(), TypeCategory::Other);

    Ok(())
}
