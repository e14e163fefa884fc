//! Module containing unit tests.
#![cfg(test)]

/// This test is to make sure no code changes increase the sizes of critical data structures.
#[test]
fn check_struct_sizes() {
    use crate::*;
    use std::mem::size_of;

    assert_eq!(size_of::<Class>(), size_of::<usize>());
    assert_eq!(size_of::<Method>(), size_of::<usize>());
    assert_eq!(size_of::<Attribute>(), size_of::<usize>());
    assert_eq!(size_of::<Constructor>(), size_of::<usize>());
    assert_eq!(size_of::<Function>(), size_of::<usize>());

    #[cfg(target_pointer_width = "64")]
    {
        assert!(size_of::<Dynamic>() <= 48);
        assert_eq!(size_of::<Option<Dynamic>>(), size_of::<Dynamic>());
        assert!(size_of::<Int>() <= 32);
        assert_eq!(size_of::<Float>(), 16);
    }
}
