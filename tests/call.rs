use metaclass::{register_class, Class, Dynamic, Qualifiers, ReflectError, ReflectResult};

#[derive(Debug, Clone, Default)]
struct Calc {
    total: i64,
}

impl Calc {
    fn add(&self, a: i32, b: i32) -> i32 {
        a + b
    }
    fn accumulate(&mut self, x: i64) -> i64 {
        self.total += x;
        self.total
    }
    fn checked_div(&self, a: i64, b: i64) -> ReflectResult<i64> {
        if b == 0 {
            Err("division by zero".into())
        } else {
            Ok(a / b)
        }
    }
}

fn register_calc() -> Class {
    register_class::<Calc>("call::Calc")
        .default_constructor()
        .method("add", Calc::add)
        .method("accumulate", Calc::accumulate)
        .method("checked_div", Calc::checked_div)
        .method_with("peek", Qualifiers::VOLATILE, |c: &Calc| c.total)
        .method_with("poke", Qualifiers::VOLATILE, |c: &mut Calc, x: i64| c.total = x)
        .static_method("version", || 3_u8)
        .build()
}

#[test]
fn test_call_arity() -> Result<(), Box<ReflectError>> {
    let class = register_calc();
    let add = class.method("add")?;
    let mut calc = class.construct(())?;

    assert_eq!(add.call(&mut calc, (1, 2))?.cast::<i32>(), 3);

    let err = add.call(&mut calc, (1,)).unwrap_err();
    assert!(matches!(
        *err,
        ReflectError::ErrorArityMismatch(ref name, 2, 1) if name == "call::Calc::add"
    ));

    // Extra arguments are ignored.
    assert_eq!(add.call(&mut calc, (1, 2, 3))?.cast::<i32>(), 3);

    assert!(matches!(
        *add.call(&mut calc, ()).unwrap_err(),
        ReflectError::ErrorArityMismatch(_, 2, 0)
    ));

    Ok(())
}

#[test]
fn test_call_argument_index() -> Result<(), Box<ReflectError>> {
    let class = register_calc();
    let add = class.method("add")?;
    let calc = class.construct(())?;

    let err = add.call_const(&calc, ("x", 2)).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(err.argument_index(), Some(0));

    let err = add.call_const(&calc, (1, vec![2])).unwrap_err();
    assert_eq!(err.argument_index(), Some(1));

    // Strings holding numbers convert.
    assert_eq!(add.call_const(&calc, ("40", 2))?.cast::<i32>(), 42);

    // Out of range.
    let err = add.call_const(&calc, (1, i64::MAX)).unwrap_err();
    assert_eq!(err.argument_index(), Some(1));

    Ok(())
}

#[test]
fn test_call_const() -> Result<(), Box<ReflectError>> {
    let class = register_calc();
    let add = class.method("add")?;
    let accumulate = class.method("accumulate")?;

    let mut calc = class.construct(())?;
    assert_eq!(accumulate.call(&mut calc, (5,))?.cast::<i64>(), 5);
    assert_eq!(accumulate.call(&mut calc, (5,))?.cast::<i64>(), 10);

    assert!(matches!(
        *accumulate.call_const(&calc, (1,)).unwrap_err(),
        ReflectError::ErrorQualifierViolation(..)
    ));
    assert_eq!(add.call_const(&calc, (2, 2))?.cast::<i32>(), 4);

    // A read-only object only accepts const methods.
    let mut frozen = calc.into_read_only();
    assert!(matches!(
        *accumulate.call(&mut frozen, (1,)).unwrap_err(),
        ReflectError::ErrorQualifierViolation(..)
    ));
    assert_eq!(add.call(&mut frozen, (1, 1))?.cast::<i32>(), 2);

    Ok(())
}

#[test]
fn test_call_volatile() -> Result<(), Box<ReflectError>> {
    let class = register_calc();
    let add = class.method("add")?;
    let peek = class.method("peek")?;
    let poke = class.method("poke")?;

    assert_eq!(peek.qualifiers()?, Qualifiers::CONST | Qualifiers::VOLATILE);
    assert_eq!(poke.qualifiers()?, Qualifiers::VOLATILE);
    assert_eq!(peek.signature()?, "i64 call::Calc::peek() const volatile");

    let mut calc = class.construct(())?;

    poke.call_volatile(&mut calc, (7,))?;
    assert_eq!(peek.call_const_volatile(&calc, ())?.cast::<i64>(), 7);
    assert_eq!(peek.call_volatile(&mut calc, ())?.cast::<i64>(), 7);

    // Volatile methods remain callable on plain objects.
    assert_eq!(peek.call(&mut calc, ())?.cast::<i64>(), 7);

    assert!(matches!(
        *add.call_volatile(&mut calc, (1, 1)).unwrap_err(),
        ReflectError::ErrorQualifierViolation(..)
    ));
    assert!(matches!(
        *poke.call_const_volatile(&calc, (1,)).unwrap_err(),
        ReflectError::ErrorQualifierViolation(..)
    ));

    Ok(())
}

#[test]
fn test_call_static() -> Result<(), Box<ReflectError>> {
    let class = register_calc();
    let version = class.method("version")?;
    let add = class.method("add")?;

    assert_eq!(version.call_static(())?.cast::<u8>(), 3);

    // Static methods ignore the object.
    let mut calc = class.construct(())?;
    assert_eq!(version.call(&mut calc, ())?.cast::<u8>(), 3);
    assert_eq!(version.call_const(&calc, ())?.cast::<u8>(), 3);

    assert!(matches!(
        *add.call_static((1, 2)).unwrap_err(),
        ReflectError::ErrorMissingObject(..)
    ));

    Ok(())
}

#[test]
fn test_call_errors() -> Result<(), Box<ReflectError>> {
    let class = register_calc();
    let div = class.method("checked_div")?;
    let calc = class.construct(())?;

    assert_eq!(div.call_const(&calc, (9, 3))?.cast::<i64>(), 3);
    assert_eq!(div.signature()?, "i64 call::Calc::checked_div(i64, i64) const");

    let err = div.call_const(&calc, (1, 0)).unwrap_err();
    assert!(matches!(*err, ReflectError::ErrorRuntime(ref msg) if msg == "division by zero"));
    assert_eq!(err.to_string(), "Runtime error: division by zero");

    // Wrong object type.
    assert!(matches!(
        *div.call_const(&Dynamic::from(1), (1, 1)).unwrap_err(),
        ReflectError::ErrorMismatchDataType(..)
    ));
    assert!(matches!(
        *div.call_const(&Dynamic::empty(), (1, 1)).unwrap_err(),
        ReflectError::ErrorNoValue(..)
    ));

    Ok(())
}
