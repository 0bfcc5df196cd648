//! Integration tests for the `block_pool` crate, exercising the public API only.

use std::cell::Cell;
use std::rc::Rc;

use block_pool::{
    DropPolicy, Error, FixedPool, GrowablePool, Handle, LocalPool, TaggedPool, TypedHandle,
    tagged_union,
};
use new_zealand::nz;

tagged_union! {
    #[derive(Debug)]
    enum Value {
        Int(i32),
        Text(String),
        Float(f64),
    }
}

#[test]
fn fixed_pool_never_exceeds_capacity() {
    let mut pool = FixedPool::<u32>::with_capacity(nz!(8)).unwrap();

    let handles: Vec<_> = (0..8).map(|i| pool.allocate(i).unwrap()).collect();

    assert_eq!(pool.allocated(), 8);
    assert!(pool.is_full());
    assert_eq!(pool.allocate(8), Err(Error::Exhausted { capacity: 8 }));
    assert_eq!(pool.allocated(), 8);
    assert_eq!(pool.size(), 8);

    for (expected, handle) in (0..8).zip(&handles) {
        assert_eq!(*pool.get(*handle).unwrap(), expected);
    }
}

#[test]
fn write_then_read_through_handle() {
    let mut pool = FixedPool::<[u8; 4]>::with_capacity(nz!(2)).unwrap();

    let handle = pool.allocate([0; 4]).unwrap();
    pool.get_mut(handle).unwrap().copy_from_slice(b"abcd");

    assert_eq!(pool.get(handle).unwrap(), b"abcd");
}

#[test]
fn freed_slots_are_reused_last_in_first_out() {
    let mut pool = FixedPool::<u32>::with_capacity(nz!(4)).unwrap();

    let a = pool.allocate(1).unwrap();
    let b = pool.allocate(2).unwrap();

    pool.free(a);
    pool.free(b);

    let first = pool.allocate(3).unwrap();
    let second = pool.allocate(4).unwrap();

    assert_eq!(first.index(), b.index());
    assert_eq!(second.index(), a.index());
}

#[test]
fn growth_from_ten_keeps_items() {
    let mut pool = GrowablePool::<u32>::with_capacity(nz!(10)).unwrap();

    let handles: Vec<_> = (0..10).map(|i| pool.allocate(i).unwrap()).collect();
    assert_eq!(pool.size(), 10);

    let eleventh = pool.allocate(10).unwrap();

    assert_eq!(pool.size(), 20);
    assert_eq!(pool.allocated(), 11);
    assert_eq!(pool.relocations(), 1);
    assert_eq!(*pool.get(eleventh).unwrap(), 10);

    for (expected, handle) in (0..10).zip(&handles) {
        assert_eq!(*pool.get(*handle).unwrap(), expected);
    }
}

#[test]
fn size_only_changes_by_doubling() {
    let mut pool = GrowablePool::<u8>::with_capacity(nz!(3)).unwrap();

    let mut sizes = vec![pool.size()];
    for _ in 0..50 {
        pool.allocate(0).unwrap();

        if pool.size() != *sizes.last().unwrap() {
            sizes.push(pool.size());
        }
    }

    assert_eq!(sizes, [3, 6, 12, 24, 48, 96]);
}

#[test]
fn use_after_free_is_detected_even_after_reuse() {
    let mut pool = FixedPool::<u32>::with_capacity(nz!(1)).unwrap();

    let handle = pool.allocate(0).unwrap();
    *pool.get_mut(handle).unwrap() = 42;
    pool.free(handle);

    assert_eq!(pool.get(handle), Err(Error::UseAfterFree { index: 0 }));

    let reused = pool.allocate(7).unwrap();
    assert_eq!(reused.index(), handle.index());

    assert_eq!(pool.get(handle), Err(Error::UseAfterFree { index: 0 }));
    assert!(!pool.is_valid(handle));
    assert_eq!(*pool.get(reused).unwrap(), 7);
}

#[test]
fn invalid_frees_change_nothing() {
    let mut pool = FixedPool::<u32>::with_capacity(nz!(2)).unwrap();
    let mut other = FixedPool::<u32>::with_capacity(nz!(2)).unwrap();

    let kept = pool.allocate(1).unwrap();
    let foreign = other.allocate(2).unwrap();

    pool.free(Handle::null());
    pool.free(foreign);
    assert_eq!(pool.allocated(), 1);

    assert_eq!(pool.take(Handle::null()), Err(Error::InvalidFree));
    assert_eq!(pool.take(foreign), Err(Error::InvalidFree));
    assert_eq!(pool.get(foreign), Err(Error::ForeignHandle));
    assert_eq!(pool.get(Handle::null()), Err(Error::NullHandle));

    // The pool keeps working normally.
    let next = pool.allocate(3).unwrap();
    assert_eq!(*pool.get(kept).unwrap(), 1);
    assert_eq!(*pool.get(next).unwrap(), 3);
    assert!(pool.is_full());
    assert_eq!(*other.get(foreign).unwrap(), 2);
}

#[test]
fn double_free_is_harmless() {
    let mut pool = GrowablePool::<String>::with_capacity(nz!(2)).unwrap();

    let handle = pool.allocate("once".to_string()).unwrap();
    pool.free(handle);
    pool.free(handle);

    assert!(pool.is_empty());
    assert_eq!(pool.take(handle), Err(Error::UseAfterFree { index: 0 }));

    let a = pool.allocate("a".to_string()).unwrap();
    let b = pool.allocate("b".to_string()).unwrap();
    assert_ne!(a.index(), b.index());
    assert_eq!(pool.size(), 2);
}

#[test]
fn tagged_pool_interleaves_types_across_relocation() {
    let mut pool = TaggedPool::<Value>::with_capacity(nz!(1)).unwrap();

    let mut expected = Vec::new();
    for i in 0..20_i32 {
        let int = pool.allocate(i).unwrap();
        let text = pool.allocate(i.to_string()).unwrap();
        let float = pool.allocate(f64::from(i) / 4.0).unwrap();
        expected.push((i, int, text, float));
    }

    assert_eq!(pool.allocated(), 60);
    assert_eq!(pool.size(), 64);

    for (i, int, text, float) in expected {
        assert_eq!(*pool.get(int).unwrap(), i);
        assert_eq!(*pool.get(text).unwrap(), i.to_string());
        assert_eq!(*pool.get(float).unwrap(), f64::from(i) / 4.0);
    }
}

#[test]
fn tagged_pool_rejects_wrong_variant() {
    let mut pool = TaggedPool::<Value>::with_capacity(nz!(2)).unwrap();

    let text = pool.allocate("hello".to_string()).unwrap();
    let as_int: TypedHandle<Value, i32> = text.retype();

    assert!(matches!(
        pool.get(as_int),
        Err(Error::InvalidVariant { found: "Text", .. })
    ));
    assert_eq!(pool.get(text).unwrap(), "hello");

    // Explicitly switching the slot to another variant drops the old value.
    assert_eq!(*pool.get_or_default(as_int).unwrap(), 0);
    assert!(pool.get(text).is_err());
    assert_eq!(pool.allocated(), 1);
}

struct Tracked(Rc<Cell<u32>>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn may_drop_items_drops_leftovers() {
    let dropped = Rc::new(Cell::new(0_u32));

    let mut pool = GrowablePool::builder()
        .capacity(nz!(2))
        .drop_policy(DropPolicy::MayDropItems)
        .build()
        .unwrap();

    for _ in 0..5 {
        pool.allocate(Tracked(Rc::clone(&dropped))).unwrap();
    }

    drop(pool);
    assert_eq!(dropped.get(), 5);
}

#[test]
#[should_panic]
fn must_not_drop_items_panics_on_leftovers() {
    let mut pool = FixedPool::<u32>::builder()
        .capacity(nz!(2))
        .drop_policy(DropPolicy::MustNotDropItems)
        .build()
        .unwrap();

    pool.allocate(1).unwrap();
    drop(pool);
}

#[test]
fn local_pool_frees_on_scope_exit() {
    let pool = LocalPool::<String>::with_capacity(nz!(1)).unwrap();

    {
        let a = pool.allocate("a".to_string()).unwrap();
        let b = pool.allocate("b".to_string()).unwrap();

        assert_eq!(pool.size(), 2);
        assert_eq!(a.with(String::len).unwrap(), 1);
        assert_eq!(b.with(Clone::clone).unwrap(), "b");
    }

    assert!(pool.is_empty());

    let kept = pool.allocate("kept".to_string()).unwrap().into_handle();
    assert_eq!(pool.allocated(), 1);

    let owned = pool.adopt(kept);
    assert_eq!(owned.take().unwrap(), "kept");
    assert!(pool.is_empty());
}
