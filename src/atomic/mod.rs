//! The [`AtomicStorage`] trait and the native atomics that implement it
//!
//! Only widths the target guarantees to be lock-free are implemented. A type
//! mapped onto a missing width fails to compile instead of silently falling
//! back to a lock.
#[cfg(target_has_atomic = "16")]
pub use core::sync::atomic::{AtomicI16, AtomicU16};
#[cfg(target_has_atomic = "32")]
pub use core::sync::atomic::{AtomicI32, AtomicU32};
#[cfg(target_has_atomic = "64")]
pub use core::sync::atomic::{AtomicI64, AtomicU64};
#[cfg(target_has_atomic = "8")]
pub use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU8};
#[cfg(target_has_atomic = "ptr")]
pub use core::sync::atomic::{AtomicIsize, AtomicPtr, AtomicUsize};
pub use core::sync::atomic::Ordering;

use Ordering::*;

/// A `()` type which can be safely shared between threads.
///
/// This type has the same in-memory representation as a [`()`]. Every
/// operation is trivially atomic since there is nothing to race on.
#[derive(Debug, Default)]
pub struct AtomicUnit {
    v: (),
}

impl From<()> for AtomicUnit {
    fn from(v: ()) -> Self {
        Self { v }
    }
}

impl AtomicUnit {
    /// Creates a new `AtomicUnit`.
    pub const fn new(v: ()) -> Self {
        AtomicUnit { v }
    }

    /// Consumes the atomic and returns the contained value.
    pub const fn into_inner(self) {
        self.v
    }

    /// Returns a mutable reference to the underlying [`()`].
    pub fn get_mut(&mut self) -> &mut () {
        &mut self.v
    }

    /// Loads a value from the unit.
    ///
    /// # Panics
    ///
    /// Panics if `order` is [`Release`] or [`AcqRel`].
    pub fn load(&self, order: Ordering) {
        match order {
            Release => panic!("there is no such thing as a release load"),
            AcqRel => panic!("there is no such thing as an acquire/release load"),
            _ => self.v,
        }
    }

    /// Stores a value into the unit.
    ///
    /// # Panics
    ///
    /// Panics if `order` is [`Acquire`] or [`AcqRel`].
    pub fn store(&self, _val: (), order: Ordering) {
        match order {
            Acquire => panic!("there is no such thing as an acquire store"),
            AcqRel => panic!("there is no such thing as an acquire/release store"),
            _ => self.v,
        }
    }

    /// Stores a value into the unit, returning the previous value.
    pub fn swap(&self, _val: (), _order: Ordering) {}

    /// Always succeeds, every `()` equals every other `()`.
    pub fn compare_exchange_weak(
        &self,
        _current: (),
        _new: (),
        _success: Ordering,
        _failure: Ordering,
    ) -> Result<(), ()> {
        Ok(())
    }
}

/// An atomic type which can be safely shared between threads and which holds
/// a plain [`AtomicStorage::Underlying`] value.
pub trait AtomicStorage: Sized + Send + Sync {
    /// The underlying non-atomic type. This has the same in-memory
    /// representation as `Self`.
    type Underlying: Copy + PartialEq;

    /// An underlying value initialized to zero.
    const ZERO: Self::Underlying;

    /// Creates a new `AtomicStorage` with the value `v`.
    fn new(v: Self::Underlying) -> Self;

    /// Consumes the atomic and returns the contained value.
    ///
    /// This is safe because passing `self` by value guarantees that no other threads are
    /// concurrently accessing the atomic data.
    fn into_inner(self) -> Self::Underlying;

    /// Returns a mutable reference to the underlying [`AtomicStorage::Underlying`].
    ///
    /// This is safe because the mutable reference guarantees that no other
    /// threads are concurrently accessing the atomic data.
    fn get_mut(&mut self) -> &mut Self::Underlying;

    /// Loads a value from the atomic.
    fn load(&self, order: Ordering) -> Self::Underlying;

    /// Stores a value into the atomic.
    fn store(&self, val: Self::Underlying, order: Ordering);

    /// Stores a value into the atomic, returning the previous value.
    fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;

    /// Stores `new` if the current value is bitwise equal to `current`.
    ///
    /// This function is allowed to spuriously fail even when the comparison
    /// succeeds. On failure the freshly observed value is returned.
    fn compare_exchange_weak(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying>;
}

macro_rules! impl_storage {
    (<$($g:ident)?> $t1:ty, $t2:ty, $z:expr) => {
impl $(<$g>)? AtomicStorage for $t1 {
    type Underlying = $t2;

    const ZERO: Self::Underlying = $z;

    fn new(val: Self::Underlying) -> Self {
        <$t1>::new(val)
    }

    fn into_inner(self) -> Self::Underlying {
        <$t1>::into_inner(self)
    }

    fn get_mut(&mut self) -> &mut Self::Underlying {
        <$t1>::get_mut(self)
    }

    fn load(&self, order: Ordering) -> Self::Underlying {
        <$t1>::load(self, order)
    }

    fn store(&self, val: Self::Underlying, order: Ordering) {
        <$t1>::store(self, val, order)
    }

    fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
        <$t1>::swap(self, val, order)
    }

    fn compare_exchange_weak(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying> {
        <$t1>::compare_exchange_weak(self, current, new, success, failure)
    }
}
    };
    ($t1:ty, $t2:ty, $z:expr) => { impl_storage!{<> $t1, $t2, $z} };
    ($t1:ty, $t2:ty) => { impl_storage!{<> $t1, $t2, 0} };
}

#[cfg(target_has_atomic = "ptr")]
impl_storage! {<P> AtomicPtr<P>, *mut P, core::ptr::null_mut::<P>()}
#[cfg(target_has_atomic = "ptr")]
impl_storage! {AtomicUsize, usize}
#[cfg(target_has_atomic = "ptr")]
impl_storage! {AtomicIsize, isize}
#[cfg(target_has_atomic = "64")]
impl_storage! {AtomicU64, u64}
#[cfg(target_has_atomic = "64")]
impl_storage! {AtomicI64, i64}
#[cfg(target_has_atomic = "32")]
impl_storage! {AtomicU32, u32}
#[cfg(target_has_atomic = "32")]
impl_storage! {AtomicI32, i32}
#[cfg(target_has_atomic = "16")]
impl_storage! {AtomicU16, u16}
#[cfg(target_has_atomic = "16")]
impl_storage! {AtomicI16, i16}
#[cfg(target_has_atomic = "8")]
impl_storage! {AtomicU8, u8}
#[cfg(target_has_atomic = "8")]
impl_storage! {AtomicI8, i8}
#[cfg(target_has_atomic = "8")]
impl_storage! {AtomicBool, bool, false}
impl_storage! {AtomicUnit, (), ()}
