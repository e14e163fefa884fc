use metaclass::types::cache;
use metaclass::{ancestor, register_type, Dynamic, ReflectError};
use std::thread;

#[derive(Debug, Clone, PartialEq)]
struct Base {
    id: u32,
}

#[derive(Debug, Clone)]
struct Mid {
    tag: u8,
    base: Base,
}

#[derive(Debug, Clone)]
struct Leaf {
    name: String,
    mid: Mid,
}

#[derive(Debug, Clone)]
struct Unrelated;

fn register_hierarchy() {
    register_type::<Base>("cache::Base").equality();
    register_type::<Mid>("cache::Mid").ancestor(ancestor!(Mid, base));
    register_type::<Leaf>("cache::Leaf").ancestor(ancestor!(Leaf, mid));
}

fn leaf(id: u32) -> Leaf {
    Leaf {
        name: "leaf".into(),
        mid: Mid {
            tag: 1,
            base: Base { id },
        },
    }
}

#[test]
fn test_cache_ancestor_views() -> Result<(), Box<ReflectError>> {
    register_hierarchy();

    let mut value = Dynamic::from(leaf(7));

    assert!(value.is::<Mid>());
    assert!(value.is::<Base>());
    assert!(!value.is::<Unrelated>());

    assert_eq!(value.with_ref(|b: &Base| b.id)?, 7);
    assert_eq!(value.with_ref(|m: &Mid| m.tag)?, 1);
    assert_eq!(value.convert::<Base>()?, Base { id: 7 });

    value.with_mut(|b: &mut Base| b.id = 8)?;
    assert_eq!(value.with_ref(|l: &Leaf| l.mid.base.id)?, 8);
    assert_eq!(value.with_ref(|l: &Leaf| l.name.clone())?, "leaf");

    // The ancestor view is the more derived value seen as its base.
    assert!(Dynamic::from(Base { id: 8 }).equals(&value)?);

    // Views never go from base to derived.
    assert!(!Dynamic::from(Base { id: 8 }).is::<Leaf>());

    Ok(())
}

#[derive(Debug, Clone)]
struct Searched {
    base: Base,
}

#[test]
fn test_cache_searches_once() -> Result<(), Box<ReflectError>> {
    register_type::<Searched>("cache::Searched").ancestor(ancestor!(Searched, base));

    let value = Dynamic::from(Searched {
        base: Base { id: 1 },
    });

    let before = cache::stats();
    assert_eq!(value.with_ref(|b: &Base| b.id)?, 1);
    let first = cache::stats();
    assert_eq!(first.searches - before.searches, 1);

    for _ in 0..10 {
        assert_eq!(value.with_ref(|b: &Base| b.id)?, 1);
    }
    let later = cache::stats();
    assert_eq!(later.searches, first.searches);
    assert_eq!(later.hits - first.hits, 10);

    // Misses are cached too.
    assert!(value.with_ref(|_: &Unrelated| ()).is_err());
    let missed = cache::stats();
    assert_eq!(missed.searches - later.searches, 1);

    assert!(value.with_ref(|_: &Unrelated| ()).is_err());
    assert_eq!(cache::stats().searches, missed.searches);

    let entry = cache::lookup(
        std::any::TypeId::of::<Unrelated>(),
        std::any::TypeId::of::<Searched>(),
    );
    assert_eq!(entry, Some(cache::CastEntry::IMPOSSIBLE));

    Ok(())
}

#[derive(Debug, Clone)]
struct Late {
    value: i64,
}

#[derive(Debug, Clone)]
struct Host {
    late: Late,
}

#[test]
fn test_cache_miss_is_per_thread() -> Result<(), Box<ReflectError>> {
    let value = Dynamic::from(Host {
        late: Late { value: 5 },
    });

    assert!(!value.is::<Late>());

    register_type::<Host>("cache::Host").ancestor(ancestor!(Host, late));

    // The miss was recorded on this thread and is never invalidated.
    assert!(!value.is::<Late>());

    // Another thread searches afresh.
    let seen = thread::spawn(|| {
        let value = Dynamic::from(Host {
            late: Late { value: 5 },
        });
        value.with_ref(|l: &Late| l.value).ok()
    })
    .join()
    .expect("thread panicked");

    assert_eq!(seen, Some(5));

    Ok(())
}

#[derive(Debug, Clone)]
struct Pair {
    left: u32,
    right: u32,
}

#[test]
fn test_cache_unrelated_view() {
    let pair = Dynamic::from(Pair { left: 1, right: 2 });

    // Only registered ancestry can produce a view; the layout alone never does.
    assert!(matches!(
        *pair.with_ref(|v: &u64| *v).unwrap_err(),
        ReflectError::ErrorMismatchDataType(..)
    ));
    assert_eq!(
        cache::lookup(
            std::any::TypeId::of::<u64>(),
            std::any::TypeId::of::<Pair>()
        ),
        Some(cache::CastEntry::IMPOSSIBLE)
    );
    assert_eq!(pair.with_ref(|p: &Pair| p.left + p.right).ok(), Some(3));
}
