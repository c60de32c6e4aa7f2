//! This crate provides a thread-safe mutable memory location called
//! [`Concurrent<T>`], which picks the cheapest safe representation for `T`
//! at compile time.
//!
//! # How it Works
//!
//! Every supported type implements [`Classify`], which names exactly one
//! representation:
//!
//! * [`Atomic<T>`] when `T` is [`LockFree`], i.e. `Copy`, free of padding
//!   and no wider than a native atomic the target guarantees. Every operation
//!   is a single atomic instruction on that storage.
//! * [`Guarded<T>`] otherwise. The value sits behind a reader/writer lock,
//!   taken exclusively to mutate and shared to read.
//!
//! Both implement [`ConcurrentAccess`], so callers use the same `load`,
//! `store`, `exchange`, `apply_shared` and `apply_exclusive` no matter which
//! one backs their type. There is no runtime tag and no dynamic dispatch.
//!
//! ```
//! use concurrent_cell::Concurrent;
//!
//! let n = Concurrent::<i32>::new(0);
//! let s = Concurrent::<String>::new("hello".into());
//!
//! assert!(n.is_lock_free());
//! assert!(!s.is_lock_free());
//!
//! assert_eq!(n.exchange(1), 0);
//! assert_eq!(s.exchange("world".into()), "hello");
//! ```
//!
//! User types opt in with [`lock_free!`] or [`guarded!`].
#![deny(missing_docs)]

mod access;
pub mod atomic;
mod classify;
mod guarded;
mod lock_free;

pub use access::ConcurrentAccess;
pub use classify::{Classify, LockFree};
pub use guarded::{DefaultRawRwLock, Guarded};
pub use lock_free::Atomic;

/// The representation [`Classify`] selects for `T`.
pub type Concurrent<T> = <T as Classify>::Concurrent;

#[doc(hidden)]
pub mod __private {
    pub use zerocopy;
}
