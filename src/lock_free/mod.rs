//! The lock-free representation, [`Atomic`]
//!
//! Every operation is a single native atomic instruction on the storage
//! selected by [`LockFree::Storage`]. Values are moved in and out of the
//! storage bit-for-bit; since a [`LockFree`] type is `Copy` and has no
//! uninitialized bytes, a stored bit pattern always decodes to the value that
//! produced it.

use std::{
    fmt,
    marker::PhantomData,
    ops::Deref,
};

use tracing::trace;

use crate::{
    access::ConcurrentAccess,
    atomic::{AtomicStorage, Ordering::SeqCst},
    classify::LockFree,
};

mod transmute;

use transmute::{from_underlying, into_underlying, TransmuteUnderlying};

/// A lock-free thread-safe memory location holding a `T`.
///
/// `Atomic<T>` has the same in-memory representation as `T::Storage`. All
/// operations use [`SeqCst`] ordering.
///
/// When `T` is the storage's own underlying type (the machine integers,
/// `bool`, raw pointers and `()`), `Atomic<T>` dereferences to the native
/// atomic so its whole API (`fetch_add`, `fetch_or`, ...) stays reachable.
/// Other types keep their storage private, since it would accept bit patterns
/// which are not a valid `T`:
///
/// ```compile_fail
/// use concurrent_cell::{atomic::AtomicU32, Atomic};
///
/// let a = Atomic::new('a');
/// let raw: &AtomicU32 = &*a;
/// ```
///
/// # Examples
///
/// ```
/// use concurrent_cell::Concurrent;
///
/// let a = Concurrent::<u32>::new(7);
/// assert!(a.is_lock_free());
/// assert_eq!(a.exchange(8), 7);
/// a.fetch_add(2, std::sync::atomic::Ordering::SeqCst);
/// assert_eq!(a.load(), 10);
/// ```
#[repr(transparent)]
pub struct Atomic<T: LockFree> {
    /// Always holds a proper `T` value
    atomic: T::Storage,
    _marker: PhantomData<T>,
}

// `LockFree` promises bit copies of `T` may be shared across threads
unsafe impl<T: LockFree> Send for Atomic<T> {}
unsafe impl<T: LockFree> Sync for Atomic<T> {}

impl<T: LockFree> Atomic<T> {
    /// Always `true`.
    pub const IS_ALWAYS_LOCK_FREE: bool = true;

    /// Fails to compile if `T` does not fit `T::Storage`.
    const ASSERT_SUPPORTED: () = <TransmuteUnderlying<T, T::Storage>>::assert_size_matches();

    /// Fails to compile if `T` does not fit `T::Storage`, or if a reference to
    /// the storage's underlying value cannot be reborrowed as `&mut T`.
    const ASSERT_REF_SUPPORTED: () = <TransmuteUnderlying<T, T::Storage>>::assert_align_matches();

    /// Creates a new atomic initialized with `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use concurrent_cell::Atomic;
    ///
    /// let a = Atomic::new(1.5f32);
    /// assert_eq!(a.load(), 1.5);
    /// ```
    pub fn new(val: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::ASSERT_SUPPORTED;
        Atomic {
            atomic: T::Storage::new(into_underlying::<T, T::Storage>(val)),
            _marker: PhantomData,
        }
    }

    /// Always returns `true`.
    pub const fn is_lock_free(&self) -> bool {
        Self::IS_ALWAYS_LOCK_FREE
    }

    /// Loads the current value.
    pub fn load(&self) -> T {
        let val = self.atomic.load(SeqCst);

        // This is safe because `self.atomic` always holds a proper `T` value
        unsafe { from_underlying::<T, T::Storage>(val) }
    }

    /// Stores `val`, replacing the current value.
    pub fn store(&self, val: T) {
        self.atomic
            .store(into_underlying::<T, T::Storage>(val), SeqCst)
    }

    /// Stores `val` and returns it, mirroring an assignment expression.
    pub fn assign(&self, val: T) -> T {
        self.store(val);
        val
    }

    /// Stores `val` and returns the previous value, indivisibly.
    ///
    /// # Examples
    ///
    /// ```
    /// use concurrent_cell::Atomic;
    ///
    /// let a = Atomic::new('a');
    /// assert_eq!(a.exchange('b'), 'a');
    /// assert_eq!(a.exchange('c'), 'b');
    /// ```
    pub fn exchange(&self, val: T) -> T {
        let val = self
            .atomic
            .swap(into_underlying::<T, T::Storage>(val), SeqCst);

        // This is safe because `val` was swapped out of `self.atomic`
        unsafe { from_underlying::<T, T::Storage>(val) }
    }

    /// Runs `f` on a snapshot of the current value.
    pub fn apply_shared<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.load())
    }

    /// Runs `f` on a copy of the current value and publishes the result.
    ///
    /// If another thread changes the value before the copy is published, `f`
    /// runs again on the fresh value. Only the result of the run which was
    /// published is returned, so `f` should not have side effects outside of
    /// its argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use concurrent_cell::Atomic;
    ///
    /// let a = Atomic::new(2.0f64);
    /// let before = a.apply_exclusive(|v| {
    ///     let before = *v;
    ///     *v *= 4.0;
    ///     before
    /// });
    /// assert_eq!(before, 2.0);
    /// assert_eq!(a.load(), 8.0);
    /// ```
    pub fn apply_exclusive<F, R>(&self, mut f: F) -> R
    where
        F: FnMut(&mut T) -> R,
    {
        let mut curr = self.atomic.load(SeqCst);
        loop {
            // This is safe because `curr` is a copy of a proper `T` value
            let mut val = unsafe { from_underlying::<T, T::Storage>(curr) };
            let ret = f(&mut val);
            let new = into_underlying::<T, T::Storage>(val);
            match self.atomic.compare_exchange_weak(curr, new, SeqCst, SeqCst) {
                Ok(_) => return ret,
                Err(next) => {
                    trace!("apply_exclusive lost a compare-exchange race, retrying");
                    curr = next;
                }
            }
        }
    }

    /// Returns a mutable reference to the value.
    ///
    /// This is safe because the mutable reference guarantees that no other
    /// threads are concurrently accessing the atomic data.
    pub fn get_mut(&mut self) -> &mut T {
        #[allow(clippy::let_unit_value)]
        let () = Self::ASSERT_REF_SUPPORTED;
        let v = TransmuteUnderlying::<T, T::Storage>::from_mut(self.atomic.get_mut());

        // This is safe because `self.atomic` holds a proper `T` value and the
        // mutable borrow of `self` guarantees exclusive access.
        unsafe { v.get_mut_value() }
    }

    /// Consumes the atomic and returns the contained value.
    pub fn into_inner(self) -> T {
        let val = self.atomic.into_inner();

        // This is safe because `self` was passed by value and held a proper `T` value
        unsafe { from_underlying::<T, T::Storage>(val) }
    }
}

impl<T: LockFree + Default> Atomic<T> {
    /// Takes the value, leaving `Default::default()` in its place.
    ///
    /// # Examples
    ///
    /// ```
    /// use concurrent_cell::Atomic;
    ///
    /// let a = Atomic::new(5u16);
    ///
    /// assert_eq!(a.take(), 5);
    /// assert_eq!(a.into_inner(), 0);
    /// ```
    pub fn take(&self) -> T {
        self.exchange(T::default())
    }
}

impl<T> Deref for Atomic<T>
where
    T: LockFree,
    T::Storage: AtomicStorage<Underlying = T>,
{
    type Target = T::Storage;

    fn deref(&self) -> &T::Storage {
        &self.atomic
    }
}

impl<T: LockFree + fmt::Debug> fmt::Debug for Atomic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.load().fmt(f)
    }
}

impl<T: LockFree + Default> Default for Atomic<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: LockFree> From<T> for Atomic<T> {
    fn from(val: T) -> Self {
        Self::new(val)
    }
}

impl<T: LockFree> ConcurrentAccess<T> for Atomic<T> {
    const IS_ALWAYS_LOCK_FREE: bool = true;

    fn new(value: T) -> Self {
        Atomic::new(value)
    }

    fn load(&self) -> T
    where
        T: Clone,
    {
        Atomic::load(self)
    }

    fn store(&self, value: T) {
        Atomic::store(self, value)
    }

    fn exchange(&self, value: T) -> T {
        Atomic::exchange(self, value)
    }

    fn apply_shared<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        Atomic::apply_shared(self, f)
    }

    fn apply_exclusive<F, R>(&self, f: F) -> R
    where
        F: FnMut(&mut T) -> R,
    {
        Atomic::apply_exclusive(self, f)
    }

    fn get_mut(&mut self) -> &mut T {
        Atomic::get_mut(self)
    }

    fn into_inner(self) -> T {
        Atomic::into_inner(self)
    }
}
