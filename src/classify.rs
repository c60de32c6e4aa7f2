//! The capability classifier
//!
//! [`Classify`] maps every supported type onto exactly one representation,
//! either [`Atomic`] when the type is [`LockFree`], or [`Guarded`] otherwise.
//! The mapping is an associated type, so it is fixed per type at compile time
//! and carries no runtime tag.
//!
//! Types outside this crate opt in with [`lock_free!`] or [`guarded!`].
//!
//! [`lock_free!`]: crate::lock_free!
//! [`guarded!`]: crate::guarded!

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    sync::Arc,
};

use crate::{access::ConcurrentAccess, atomic::*, Atomic, Guarded};

/// A type which its [`LockFree::Storage`] can hold without any lock.
///
/// This is the Rust form of "trivially copyable with a native lock-free
/// atomic of the same width": `Copy` covers bitwise copy, copy and move
/// construction and assignment, and the `AtomicStorage` implementations only
/// exist for widths the target guarantees to be lock-free.
///
/// A `T` wider than its storage is rejected at compile time when the first
/// [`Atomic<T>`] is constructed.
///
/// # Safety
///
/// Every byte of `Self` must be initialized (no padding), and sharing bitwise
/// copies of `Self` between threads must be sound. [`lock_free!`] checks both
/// through `zerocopy::IntoBytes + Send + Sync` and is the preferred way to
/// implement this trait.
///
/// [`lock_free!`]: crate::lock_free!
pub unsafe trait LockFree: Copy + 'static {
    /// The native atomic the value is stored in.
    type Storage: AtomicStorage;
}

/// Selects the representation behind [`Concurrent<Self>`].
///
/// [`Concurrent<Self>`]: crate::Concurrent
pub trait Classify: Sized {
    /// [`Atomic<Self>`] or [`Guarded<Self>`].
    type Concurrent: ConcurrentAccess<Self>;

    /// `true` if the selected representation is lock-free.
    const IS_LOCK_FREE: bool = <Self::Concurrent as ConcurrentAccess<Self>>::IS_ALWAYS_LOCK_FREE;
}

/// Classifies types as lock-free, each backed by the given [`AtomicStorage`].
///
/// The types must be `Copy`, implement [`zerocopy::IntoBytes`] (so carry no
/// padding) and be `Send + Sync`. A type wider than its storage fails to
/// compile once it is first stored.
///
/// # Examples
///
/// ```
/// use concurrent_cell::{atomic::AtomicU64, lock_free, Classify, Concurrent};
/// use zerocopy::{Immutable, IntoBytes};
///
/// #[derive(Clone, Copy, Debug, PartialEq, IntoBytes, Immutable)]
/// #[repr(C)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// lock_free!(Point => AtomicU64);
///
/// assert!(Point::IS_LOCK_FREE);
/// let p = Concurrent::<Point>::new(Point { x: 1, y: 2 });
/// assert_eq!(p.exchange(Point { x: 3, y: 4 }), Point { x: 1, y: 2 });
/// ```
///
/// Oversized types are rejected at compile time:
///
/// ```compile_fail
/// use concurrent_cell::{atomic::AtomicU32, lock_free, Concurrent};
/// use zerocopy::{Immutable, IntoBytes};
///
/// #[derive(Clone, Copy, IntoBytes, Immutable)]
/// #[repr(C)]
/// struct Wide(u32, u32);
///
/// lock_free!(Wide => AtomicU32);
///
/// let _ = Concurrent::<Wide>::new(Wide(1, 2));
/// ```
#[macro_export]
macro_rules! lock_free {
    ($($t:ty => $storage:ty),+ $(,)?) => {$(
        const _: fn() = || {
            fn assert_lock_free_capable<T>()
            where
                T: ::core::marker::Copy
                    + $crate::__private::zerocopy::IntoBytes
                    + ::core::marker::Send
                    + ::core::marker::Sync
                    + 'static,
            {
            }
            assert_lock_free_capable::<$t>();
        };

        // The bounds above guarantee an initialized, shareable bit pattern
        unsafe impl $crate::LockFree for $t {
            type Storage = $storage;
        }

        impl $crate::Classify for $t {
            type Concurrent = $crate::Atomic<$t>;
        }
    )+};
}

/// Classifies types as guarded, backed by a reader/writer lock.
///
/// Generic types list their parameters first, in `<...>`.
///
/// # Examples
///
/// ```
/// use concurrent_cell::{guarded, Classify, Concurrent};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Bar {
///     bar: String,
/// }
///
/// struct Tagged<T> {
///     tag: u8,
///     value: T,
/// }
///
/// guarded!(Bar);
/// guarded!(<T> Tagged<T>);
///
/// assert!(!Bar::IS_LOCK_FREE);
/// assert!(!Tagged::<u8>::IS_LOCK_FREE);
///
/// let b = Concurrent::<Bar>::new(Bar { bar: "x".into() });
/// assert_eq!(b.apply_shared(|b| b.bar.len()), 1);
///
/// let t = Concurrent::<Tagged<u8>>::new(Tagged { tag: 1, value: 2 });
/// assert_eq!(t.apply_shared(|t| t.tag + t.value), 3);
/// ```
#[macro_export]
macro_rules! guarded {
    (<$($g:ident),+ $(,)?> $t:ty) => {
        impl<$($g),+> $crate::Classify for $t {
            type Concurrent = $crate::Guarded<$t>;
        }
    };
    ($($t:ty),+ $(,)?) => {$(
        impl $crate::Classify for $t {
            type Concurrent = $crate::Guarded<$t>;
        }
    )+};
}

macro_rules! native {
    ($($(#[$cfg:meta])* $t:ty => $storage:ty),+ $(,)?) => {$(
        $(#[$cfg])*
        unsafe impl LockFree for $t {
            type Storage = $storage;
        }

        $(#[$cfg])*
        impl Classify for $t {
            type Concurrent = Atomic<$t>;
        }
    )+};
}

native! {
    () => AtomicUnit,
    #[cfg(target_has_atomic = "8")] bool => AtomicBool,
    #[cfg(target_has_atomic = "8")] u8 => AtomicU8,
    #[cfg(target_has_atomic = "8")] i8 => AtomicI8,
    #[cfg(target_has_atomic = "16")] u16 => AtomicU16,
    #[cfg(target_has_atomic = "16")] i16 => AtomicI16,
    #[cfg(target_has_atomic = "32")] u32 => AtomicU32,
    #[cfg(target_has_atomic = "32")] i32 => AtomicI32,
    #[cfg(target_has_atomic = "32")] f32 => AtomicU32,
    #[cfg(target_has_atomic = "32")] char => AtomicU32,
    #[cfg(target_has_atomic = "64")] u64 => AtomicU64,
    #[cfg(target_has_atomic = "64")] i64 => AtomicI64,
    #[cfg(target_has_atomic = "64")] f64 => AtomicU64,
    #[cfg(target_has_atomic = "ptr")] usize => AtomicUsize,
    #[cfg(target_has_atomic = "ptr")] isize => AtomicIsize,
}

// `AtomicPtr<P>` is `Send + Sync` for every `P`. A `*mut P` is its own
// underlying value, a `*const P` has the same layout and any bit pattern.
#[cfg(target_has_atomic = "ptr")]
unsafe impl<P: 'static> LockFree for *mut P {
    type Storage = AtomicPtr<P>;
}

#[cfg(target_has_atomic = "ptr")]
impl<P: 'static> Classify for *mut P {
    type Concurrent = Atomic<*mut P>;
}

#[cfg(target_has_atomic = "ptr")]
unsafe impl<P: 'static> LockFree for *const P {
    type Storage = AtomicPtr<P>;
}

#[cfg(target_has_atomic = "ptr")]
impl<P: 'static> Classify for *const P {
    type Concurrent = Atomic<*const P>;
}

guarded!(String, u128, i128, &'static str);
guarded!(<T> Vec<T>);
guarded!(<T> VecDeque<T>);
guarded!(<T> Box<T>);
guarded!(<T> Arc<T>);
guarded!(<T> Option<T>);
guarded!(<T> BTreeSet<T>);
guarded!(<T> HashSet<T>);
guarded!(<K, V> BTreeMap<K, V>);
guarded!(<K, V> HashMap<K, V>);
