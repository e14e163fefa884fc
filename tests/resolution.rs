use metaclass::{ancestor, register_class, Class, Dynamic, ReflectError};

fn names(class: &Class) -> Result<Vec<String>, Box<ReflectError>> {
    class
        .methods()?
        .iter()
        .map(|m| m.name().map(String::from))
        .collect()
}

fn pending(class: &Class) -> Result<Vec<String>, Box<ReflectError>> {
    Ok(class
        .unresolved_bases()?
        .iter()
        .map(|s| s.to_string())
        .collect())
}

#[derive(Debug, Clone)]
struct Root {
    id: u32,
}

#[derive(Debug, Clone)]
struct Branch {
    root: Root,
}

#[derive(Debug, Clone)]
struct Twig {
    branch: Branch,
}

#[test]
fn test_resolution_out_of_order() -> Result<(), Box<ReflectError>> {
    // Most derived first.
    let twig = register_class::<Twig>("resolution::Twig")
        .base("resolution::Branch", ancestor!(Twig, branch))
        .method("twig", |_: &Twig| 3)
        .build();

    assert!(!twig.is_resolved()?);
    assert_eq!(pending(&twig)?, ["resolution::Branch"]);
    assert_eq!(names(&twig)?, ["twig"]);
    assert!(twig.superclasses()?.is_empty());

    let branch = register_class::<Branch>("resolution::Branch")
        .base("resolution::Root", ancestor!(Branch, root))
        .method("branch", |_: &Branch| 2)
        .build();

    // The base is registered but not resolved yet: nothing is merged.
    assert!(!branch.is_resolved()?);
    assert!(!twig.is_resolved()?);
    assert_eq!(names(&twig)?, ["twig"]);

    let root = register_class::<Root>("resolution::Root")
        .method("root", |r: &Root| r.id)
        .build();

    assert!(root.is_resolved()?);
    assert!(branch.is_resolved()?);
    assert!(twig.is_resolved()?);
    assert!(pending(&twig)?.is_empty());

    assert_eq!(names(&branch)?, ["branch", "root"]);
    assert_eq!(names(&twig)?, ["twig", "branch", "root"]);
    assert_eq!(twig.superclasses()?, [branch, root]);
    assert!(twig.is_subclass_of(&root)?);

    assert!(matches!(
        *twig.construct(()).unwrap_err(),
        ReflectError::ErrorMemberNotFound(..)
    ));

    // Members of the root are usable on the leaf.
    let leaf = Dynamic::from(Twig {
        branch: Branch {
            root: Root { id: 42 },
        },
    });
    let id = twig.method("root")?.call_const(&leaf, ())?;
    assert_eq!(id.cast::<u32>(), 42);

    Ok(())
}

#[derive(Debug, Clone)]
struct Top;

#[derive(Debug, Clone)]
struct Bottom {
    top: Top,
}

#[test]
fn test_resolution_in_order() -> Result<(), Box<ReflectError>> {
    let top = register_class::<Top>("resolution::Top")
        .method("top", |_: &Top| ())
        .build();
    let bottom = register_class::<Bottom>("resolution::Bottom")
        .base("resolution::Top", ancestor!(Bottom, top))
        .method("bottom", |_: &Bottom| ())
        .build();

    assert!(bottom.is_resolved()?);
    assert_eq!(names(&bottom)?, ["bottom", "top"]);
    assert_eq!(bottom.superclasses()?, [top]);

    Ok(())
}

#[derive(Debug, Clone)]
struct Orphan;

#[derive(Debug, Clone)]
struct Ping;

#[derive(Debug, Clone)]
struct Pong;

#[test]
fn test_resolution_never_resolved() -> Result<(), Box<ReflectError>> {
    let orphan = register_class::<Orphan>("resolution::Orphan")
        .inherits("resolution::Nowhere")
        .method("orphan", |_: &Orphan| ())
        .build();

    assert!(!orphan.is_resolved()?);
    assert_eq!(pending(&orphan)?, ["resolution::Nowhere"]);
    assert_eq!(names(&orphan)?, ["orphan"]);

    // A cycle by name never resolves, and never loops.
    let ping = register_class::<Ping>("resolution::Ping")
        .inherits("resolution::Pong")
        .build();
    let pong = register_class::<Pong>("resolution::Pong")
        .inherits("resolution::Ping")
        .build();

    assert!(!ping.is_resolved()?);
    assert!(!pong.is_resolved()?);
    assert!(!ping.is_subclass_of(&pong)?);

    Ok(())
}

#[derive(Debug, Clone)]
struct Trunk {
    id: u32,
}

#[derive(Debug, Clone)]
struct Limb {
    trunk: Trunk,
}

#[derive(Debug, Clone)]
struct Leaf {
    limb: Limb,
}

#[test]
fn test_resolution_concurrent() -> Result<(), Box<ReflectError>> {
    register_class::<Leaf>("resolution::Leaf")
        .base("resolution::Limb", ancestor!(Leaf, limb))
        .method("leaf", |_: &Leaf| 3)
        .build();
    register_class::<Limb>("resolution::Limb")
        .base("resolution::Trunk", ancestor!(Limb, trunk))
        .method("limb", |_: &Limb| 2)
        .build();
    register_class::<Trunk>("resolution::Trunk")
        .method("trunk", |t: &Trunk| t.id)
        .build();

    // Every thread must observe the whole chain, whichever one resolves it.
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let name = if i % 2 == 0 {
                    "resolution::Leaf"
                } else {
                    "resolution::Limb"
                };
                Class::lookup(name).is_resolved()
            })
        })
        .collect();

    for handle in handles {
        assert!(matches!(handle.join(), Ok(Ok(true))));
    }

    let leaf = Class::lookup("resolution::Leaf");
    assert_eq!(names(&leaf)?, ["leaf", "limb", "trunk"]);

    Ok(())
}
