use metaclass::{ancestor, overloads, overrides, register_class, Class, Method, Qualifiers, ReflectError};

#[derive(Debug, Clone)]
struct Animal {
    legs: u32,
    food: i64,
}

#[derive(Debug, Clone)]
struct Dog {
    name: String,
    animal: Animal,
}

#[derive(Debug, Clone)]
struct Rock;

fn register_animals() -> (Class, Class, Class) {
    let animal = register_class::<Animal>("classify::Animal")
        .constructor(|legs: u32| Animal { legs, food: 0 })
        .method("speak", |_: &Animal| String::from("..."))
        .method("legs", |a: &Animal| a.legs)
        .method("feed", |a: &mut Animal, amount: i32| a.food += amount as i64)
        .static_method("kingdom", || "animalia")
        .build();

    let dog = register_class::<Dog>("classify::Dog")
        .base("classify::Animal", ancestor!(Dog, animal))
        .constructor(|name: String| Dog {
            name,
            animal: Animal { legs: 4, food: 0 },
        })
        .method("speak", |d: &Dog| format!("{} says woof", d.name))
        .method_with("speak", Qualifiers::VOLATILE, |d: &Dog| d.name.to_uppercase())
        .method("feed", |d: &mut Dog, amount: f64| d.animal.food += amount as i64)
        .static_method("kingdom", || "animalia")
        .build();

    let rock = register_class::<Rock>("classify::Rock")
        .method("speak", |_: &Rock| String::new())
        .build();

    (animal, dog, rock)
}

fn method(class: &Class, name: &str, pred: impl Fn(&metaclass::MethodInfo) -> bool) -> Method {
    class
        .find_method(|m| m.name() == name && pred(m))
        .unwrap_or_default()
}

#[test]
fn test_classify_overrides() -> Result<(), Box<ReflectError>> {
    let (animal, dog, rock) = register_animals();

    let animal_speak = method(&animal, "speak", |m| m.class() == animal);
    let dog_speak = method(&dog, "speak", |m| m.class() == dog && !m.is_volatile());
    let dog_speak_v = method(&dog, "speak", |m| m.is_volatile());
    let rock_speak = method(&rock, "speak", |_| true);

    assert!(dog_speak.overrides(&animal_speak)?);
    assert!(!animal_speak.overrides(&dog_speak)?);
    assert!(!dog_speak.overloads(&animal_speak)?);

    // Different qualifiers: an overload, not an override.
    assert!(!dog_speak_v.overrides(&animal_speak)?);
    assert!(dog_speak_v.overloads(&animal_speak)?);
    assert!(dog_speak_v.overloads(&dog_speak)?);

    // Unrelated classes.
    assert!(!rock_speak.overrides(&animal_speak)?);
    assert!(!rock_speak.overloads(&animal_speak)?);

    // Never with itself.
    assert!(!animal_speak.overrides(&animal_speak)?);
    assert!(!animal_speak.overloads(&animal_speak)?);

    assert!(matches!(
        *animal_speak.overrides(&Method::default()).unwrap_err(),
        ReflectError::ErrorInvalidHandle(..)
    ));

    Ok(())
}

#[test]
fn test_classify_overloads() -> Result<(), Box<ReflectError>> {
    let (animal, dog, _) = register_animals();

    let animal_feed = method(&animal, "feed", |m| m.class() == animal);
    let dog_feed = method(&dog, "feed", |m| m.class() == dog);

    assert!(dog_feed.overloads(&animal_feed)?);
    assert!(animal_feed.overloads(&dog_feed)?);
    assert!(!dog_feed.overrides(&animal_feed)?);

    // Static members never override.
    let animal_kingdom = method(&animal, "kingdom", |m| m.class() == animal);
    let dog_kingdom = method(&dog, "kingdom", |m| m.class() == dog);

    assert!(!dog_kingdom.overrides(&animal_kingdom)?);
    assert!(!dog_kingdom.overloads(&animal_kingdom)?);

    // The free functions agree with the handle methods.
    assert!(overloads(dog_feed.info()?, animal_feed.info()?));
    assert!(!overrides(dog_feed.info()?, animal_feed.info()?));

    Ok(())
}

#[test]
fn test_classify_inherited_members() -> Result<(), Box<ReflectError>> {
    let (animal, dog, _) = register_animals();

    assert!(dog.is_subclass_of(&animal)?);
    assert!(!animal.is_subclass_of(&dog)?);
    assert!(!dog.is_subclass_of(&dog)?);
    assert_eq!(dog.superclasses()?, [animal]);
    assert_eq!(dog.to_string(), "classify::Dog : classify::Animal");

    // Own methods first, then inherited ones.
    assert_eq!(dog.methods()?.len(), 4 + 4);
    assert_eq!(dog.find_all_methods(|m| m.name() == "speak")?.len(), 3);

    let mut rex = dog.construct(("Rex",))?;

    let legs = dog.find_method(|m| m.name() == "legs")?;
    assert_eq!(legs.class()?, animal);
    assert_eq!(legs.call_const(&rex, ())?.cast::<u32>(), 4);

    let animal_feed = method(&animal, "feed", |m| m.class() == animal);
    animal_feed.call(&mut rex, (3,))?;
    let dog_feed = method(&dog, "feed", |m| m.class() == dog);
    dog_feed.call(&mut rex, (2.5,))?;
    assert_eq!(rex.with_ref(|a: &Animal| a.food)?, 5);

    let speak = method(&dog, "speak", |m| m.class() == dog && !m.is_volatile());
    assert_eq!(speak.call_const(&rex, ())?.cast::<String>(), "Rex says woof");

    // Methods of an unrelated class cannot be reached.
    let rock = Class::lookup("classify::Rock");
    let rock_speak = method(&rock, "speak", |_| true);
    assert!(matches!(
        *rock_speak.call_const(&rex, ()).unwrap_err(),
        ReflectError::ErrorMismatchDataType(..)
    ));

    Ok(())
}
