use std::{
    mem,
    sync::atomic::{AtomicI32, AtomicU8, AtomicUsize, Ordering::SeqCst},
};

use concurrent_cell::{
    atomic::{AtomicI16, AtomicU32},
    guarded, lock_free, Atomic, Classify, Concurrent, ConcurrentAccess, Guarded,
};
use zerocopy::{Immutable, IntoBytes};

#[derive(Clone, Copy, Debug, Default, PartialEq, IntoBytes, Immutable)]
#[repr(C)]
struct Foo {
    foo: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Bar {
    bar: String,
}

#[derive(Clone, Copy, Debug, PartialEq, IntoBytes, Immutable)]
#[repr(C)]
struct Rgb(u8, u8, u8);

lock_free!(Foo => AtomicI32, Rgb => AtomicU32);
guarded!(Bar);

#[test]
fn supported() {
    assert!(i32::IS_LOCK_FREE);
    assert!(u64::IS_LOCK_FREE);
    assert!(usize::IS_LOCK_FREE);
    assert!(bool::IS_LOCK_FREE);
    assert!(<()>::IS_LOCK_FREE);
    assert!(f32::IS_LOCK_FREE);
    assert!(f64::IS_LOCK_FREE);
    assert!(char::IS_LOCK_FREE);
    assert!(<*mut u8>::IS_LOCK_FREE);
    assert!(Foo::IS_LOCK_FREE);
    assert!(Rgb::IS_LOCK_FREE);

    // AtomicU128 is unstable
    assert!(!u128::IS_LOCK_FREE);
    assert!(!String::IS_LOCK_FREE);
    assert!(!Vec::<u8>::IS_LOCK_FREE);
    assert!(!Option::<u8>::IS_LOCK_FREE);
    assert!(!Bar::IS_LOCK_FREE);
}

#[test]
fn representations() {
    let n: Atomic<i32> = Concurrent::<i32>::new(0);
    let _: &AtomicI32 = &n;
    let s: Guarded<String> = Concurrent::<String>::new(String::new());

    assert!(n.is_lock_free());
    assert!(!s.is_lock_free());

    // lock-free cells are exactly as large as their native atomic
    assert_eq!(mem::size_of::<Concurrent<i32>>(), mem::size_of::<AtomicI32>());
    assert_eq!(mem::size_of::<Concurrent<Foo>>(), mem::size_of::<AtomicI32>());
    assert_eq!(mem::size_of::<Concurrent<Rgb>>(), mem::size_of::<AtomicU32>());
    assert_eq!(mem::size_of::<Concurrent<()>>(), 0);
}

#[test]
fn native_api_is_reachable() {
    let n = Concurrent::<usize>::new(1);
    n.fetch_add(2, SeqCst);
    assert_eq!(n.fetch_or(8, SeqCst), 3);
    assert_eq!(n.load(), 11);
}

#[test]
fn exchange_returns_previous() {
    let a = Concurrent::<Foo>::new(Foo { foo: 1 });
    assert_eq!(a.exchange(Foo { foo: 2 }), Foo { foo: 1 });
    assert_eq!(a.exchange(Foo { foo: 3 }), Foo { foo: 2 });
    assert_eq!(a.load(), Foo { foo: 3 });

    let b = Concurrent::<Bar>::new(Bar { bar: "a".into() });
    assert_eq!(b.exchange(Bar { bar: "b".into() }).bar, "a");
    assert_eq!(b.exchange(Bar { bar: "c".into() }).bar, "b");
    assert_eq!(b.load().bar, "c");
}

#[test]
fn assign_returns_assigned() {
    let a = Concurrent::<char>::new('a');
    assert_eq!(a.assign('z'), 'z');
    assert_eq!(a.load(), 'z');

    let b = Concurrent::<String>::new("a".into());
    assert_eq!(b.assign("z".into()), "z");
    assert_eq!(b.load(), "z");
}

#[test]
fn narrow_types() {
    let mut a = Atomic::<Rgb>::new(Rgb(1, 2, 3));
    assert_eq!(a.exchange(Rgb(4, 5, 6)), Rgb(1, 2, 3));
    assert_eq!(a.apply_exclusive(|c| mem::replace(&mut c.1, 9)), 5);
    assert_eq!(a.load(), Rgb(4, 9, 6));

    a.get_mut().0 = 7;
    assert_eq!(a.into_inner(), Rgb(7, 9, 6));
}

#[test]
fn apply_both_ways() {
    let a = Concurrent::<f64>::new(1.0);
    assert_eq!(a.apply_shared(|v| *v * 2.0), 2.0);
    a.apply_exclusive(|v| *v += 0.5);
    assert_eq!(a.load(), 1.5);

    let b = Concurrent::<Vec<u8>>::new(vec![1, 2]);
    assert_eq!(b.apply_shared(|v| v.iter().sum::<u8>()), 3);
    b.apply_exclusive(|v| v.push(3));
    assert_eq!(b.load(), [1, 2, 3]);
}

#[test]
fn exclusive_borrows() {
    let mut a = Concurrent::<u16>::new(1);
    *a.get_mut() += 1;
    assert_eq!(a.into_inner(), 2);

    let mut b = Concurrent::<String>::new("a".into());
    b.get_mut().push('b');
    assert_eq!(b.into_inner(), "ab");
}

#[test]
fn take_and_release() {
    let a = Atomic::<u8>::new(5);
    assert_eq!(a.take(), 5);
    assert_eq!(a.load(), 0);

    let b = Concurrent::<Bar>::new(Bar { bar: "full".into() });
    assert_eq!(b.release().bar, "full");
    assert_eq!(b.load(), Bar::default());
}

#[test]
fn defaults_and_conversions() {
    assert_eq!(Atomic::<i16>::default().load(), 0);
    assert_eq!(Atomic::from(true).load(), true);
    assert_eq!(Guarded::<String>::default().load(), "");
    assert_eq!(Guarded::<String>::from("x".to_string()).load(), "x");
    assert_eq!(format!("{:?}", Atomic::<u8>::new(3)), "3");
}

#[test]
fn native_storage_only_for_native_values() {
    let n = Atomic::<i16>::new(4);
    let raw: &AtomicI16 = &n;
    raw.store(-3, SeqCst);
    assert_eq!(n.load(), -3);

    // storage of reinterpreted types is only written with valid values
    let c = Concurrent::<char>::new('a');
    assert_eq!(c.exchange('\u{10FFFF}'), 'a');
    assert_eq!(c.apply_exclusive(|c| mem::replace(c, 'z')), '\u{10FFFF}');
    assert!(char::from_u32(c.load() as u32).is_some());
    assert_eq!(c.into_inner(), 'z');
}

#[test]
fn custom_lock() {
    let a = Guarded::<u128, parking_lot::RawRwLock>::with_raw_lock(1);
    assert_eq!(a.exchange(2), 1);
}

fn generic_roundtrip<T>(first: T, second: T) -> (T, T)
where
    T: Classify + Clone,
{
    let cell = <Concurrent<T> as ConcurrentAccess<T>>::new(first);
    let prev = cell.exchange(second);
    (prev, cell.load())
}

#[test]
fn generic_code() {
    assert_eq!(generic_roundtrip(1u8, 2u8), (1, 2));
    assert_eq!(
        generic_roundtrip(String::from("a"), String::from("b")),
        ("a".to_string(), "b".to_string())
    );
    assert_eq!(
        generic_roundtrip(Foo { foo: 1 }, Foo { foo: 2 }),
        (Foo { foo: 1 }, Foo { foo: 2 })
    );
}

#[test]
fn drops_guarded() {
    static CNT: AtomicUsize = AtomicUsize::new(0);
    CNT.store(0, SeqCst);

    struct Dropper(u8);

    impl Dropper {
        fn new(val: u8) -> Dropper {
            CNT.fetch_add(1, SeqCst);
            Dropper(val)
        }
    }

    impl Drop for Dropper {
        fn drop(&mut self) {
            CNT.fetch_sub(1, SeqCst);
        }
    }

    let a = Guarded::new(Dropper::new(5));

    assert_eq!(a.exchange(Dropper::new(6)).0, 5);
    assert_eq!(CNT.load(SeqCst), 1);

    a.store(Dropper::new(2));
    assert_eq!(CNT.load(SeqCst), 1);

    assert_eq!(a.apply_shared(|d| d.0), 2);
    assert_eq!(CNT.load(SeqCst), 1);

    drop(a);
    assert_eq!(CNT.load(SeqCst), 0);
}

#[test]
fn raw_pointers() {
    static TARGET: AtomicU8 = AtomicU8::new(0);
    let p = &TARGET as *const AtomicU8 as *mut AtomicU8;

    let a = Concurrent::<*mut AtomicU8>::new(std::ptr::null_mut());
    assert!(a.exchange(p).is_null());
    assert_eq!(a.load(), p);
}

#[test]
fn const_pointers() {
    static TARGET: u32 = 7;
    let p: *const u32 = &TARGET;

    assert!(<*const u32>::IS_LOCK_FREE);
    assert_eq!(mem::size_of::<Concurrent<*const u32>>(), mem::size_of::<usize>());

    let a = Concurrent::<*const u32>::new(std::ptr::null());
    assert!(a.exchange(p).is_null());
    assert_eq!(a.load(), p);
    assert_eq!(a.apply_shared(|p| unsafe { **p }), 7);
    assert_eq!(a.into_inner(), p);
}
