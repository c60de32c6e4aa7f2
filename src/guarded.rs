//! The lock-protected representation, [`Guarded`]
//!
//! Used for every type which is not [`LockFree`]. A single reader/writer lock
//! serializes all access: mutation takes it exclusively, reads take it
//! shared. The value is never reachable outside of a critical section, reads
//! either clone it out or run a caller supplied closure under the lock.
//!
//! [`LockFree`]: crate::LockFree

use std::{fmt, mem};

use lock_api::{RawRwLock, RwLock};
use tracing::trace;

use crate::access::ConcurrentAccess;

/// The lock used by [`Guarded`] unless another is chosen.
pub type DefaultRawRwLock = parking_lot::RawRwLock;

/// A thread-safe memory location protected by a reader/writer lock.
///
/// Any [`lock_api::RawRwLock`] can stand in for the default `parking_lot`
/// lock through `R`.
///
/// `Guarded` is neither `Clone` nor `Copy`:
///
/// ```compile_fail
/// use concurrent_cell::Guarded;
///
/// let a = Guarded::new(String::from("hello"));
/// let b: Guarded<String> = a.clone();
/// ```
///
/// # Examples
///
/// ```
/// use concurrent_cell::Concurrent;
///
/// let s = Concurrent::<String>::new("hello".into());
/// assert!(!s.is_lock_free());
///
/// s.store("world".into());
/// assert_eq!(s.load(), "world");
/// assert_eq!(s.apply_shared(|s| s.len()), 5);
/// ```
pub struct Guarded<T, R: RawRwLock = DefaultRawRwLock> {
    lock: RwLock<R, T>,
}

impl<T> Guarded<T> {
    /// Creates a new cell holding `value`, protected by the default lock.
    pub fn new(value: T) -> Self {
        Self::with_raw_lock(value)
    }
}

impl<T, R: RawRwLock> Guarded<T, R> {
    /// Always `false`.
    pub const IS_ALWAYS_LOCK_FREE: bool = false;

    /// Creates a new cell holding `value`, protected by an `R`.
    ///
    /// Nothing can observe the cell before it is returned, so no lock is
    /// taken.
    pub fn with_raw_lock(value: T) -> Self {
        trace!(value = std::any::type_name::<T>(), "constructing guarded cell");
        Guarded {
            lock: RwLock::const_new(R::INIT, value),
        }
    }

    /// Always returns `false`.
    pub const fn is_lock_free(&self) -> bool {
        Self::IS_ALWAYS_LOCK_FREE
    }

    /// Replaces the value while holding the exclusive lock.
    ///
    /// The previous value is dropped before the lock is released.
    pub fn store(&self, value: T) {
        *self.lock.write() = value;
    }

    /// Replaces the value with `value`, returning the previous one.
    ///
    /// # Examples
    ///
    /// ```
    /// use concurrent_cell::Guarded;
    ///
    /// let a = Guarded::new(vec![1]);
    /// assert_eq!(a.exchange(vec![2]), [1]);
    /// assert_eq!(a.exchange(vec![3]), [2]);
    /// ```
    pub fn exchange(&self, value: T) -> T {
        mem::replace(&mut *self.lock.write(), value)
    }

    /// Runs `f` while holding the shared lock.
    ///
    /// Any number of `apply_shared` calls may run at the same time. A raw
    /// pointer into the value must not be returned, since it dangles once the
    /// lock is released. The result cannot keep a borrow of the value:
    ///
    /// ```compile_fail
    /// use concurrent_cell::Guarded;
    ///
    /// let a = Guarded::new(String::from("hello"));
    /// let escaped: &str = a.apply_shared(|s| s.as_str());
    /// ```
    pub fn apply_shared<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&T) -> U,
    {
        let guard = self.lock.read();
        f(&*guard)
    }

    /// Runs `f` while holding the exclusive lock.
    ///
    /// As with [`Guarded::apply_shared`], returning a raw pointer into the
    /// value is the caller's mistake. The result cannot keep a borrow of the
    /// value:
    ///
    /// ```compile_fail
    /// use concurrent_cell::Guarded;
    ///
    /// let a = Guarded::new(vec![1, 2, 3]);
    /// let escaped = a.apply_exclusive(|v| &mut v[0]);
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use concurrent_cell::Guarded;
    ///
    /// let a = Guarded::new(vec![1, 2]);
    /// let len = a.apply_exclusive(|v| {
    ///     v.push(3);
    ///     v.len()
    /// });
    /// assert_eq!(len, 3);
    /// ```
    pub fn apply_exclusive<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&mut T) -> U,
    {
        let mut guard = self.lock.write();
        f(&mut *guard)
    }

    /// Returns a mutable reference to the value.
    ///
    /// This is safe because the mutable borrow statically guarantees no
    /// other thread holds the lock.
    pub fn get_mut(&mut self) -> &mut T {
        self.lock.get_mut()
    }

    /// Consumes the cell and returns the value.
    pub fn into_inner(self) -> T {
        self.lock.into_inner()
    }
}

impl<T: Clone, R: RawRwLock> Guarded<T, R> {
    /// Clones the value out while holding the shared lock.
    pub fn load(&self) -> T {
        self.lock.read().clone()
    }

    /// Stores a clone of `value` and hands `value` back.
    pub fn assign(&self, value: T) -> T {
        self.store(value.clone());
        value
    }
}

impl<T: Default, R: RawRwLock> Guarded<T, R> {
    /// Moves the value out while holding the exclusive lock, leaving
    /// `T::default()` behind.
    ///
    /// # Examples
    ///
    /// ```
    /// use concurrent_cell::Guarded;
    ///
    /// let a = Guarded::new(String::from("drained"));
    /// assert_eq!(a.release(), "drained");
    /// assert_eq!(a.load(), "");
    /// ```
    pub fn release(&self) -> T {
        let value = mem::take(&mut *self.lock.write());
        trace!(value = std::any::type_name::<T>(), "released guarded value");
        value
    }
}

impl<T: Default, R: RawRwLock> Default for Guarded<T, R> {
    fn default() -> Self {
        Self::with_raw_lock(T::default())
    }
}

impl<T, R: RawRwLock> From<T> for Guarded<T, R> {
    fn from(value: T) -> Self {
        Self::with_raw_lock(value)
    }
}

impl<T: fmt::Debug, R: RawRwLock> fmt::Debug for Guarded<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lock.try_read() {
            Some(guard) => f.debug_tuple("Guarded").field(&&*guard).finish(),
            None => f
                .debug_tuple("Guarded")
                .field(&format_args!("<locked>"))
                .finish(),
        }
    }
}

impl<T, R: RawRwLock> ConcurrentAccess<T> for Guarded<T, R> {
    const IS_ALWAYS_LOCK_FREE: bool = false;

    fn new(value: T) -> Self {
        Guarded::with_raw_lock(value)
    }

    fn load(&self) -> T
    where
        T: Clone,
    {
        Guarded::load(self)
    }

    fn store(&self, value: T) {
        Guarded::store(self, value)
    }

    fn exchange(&self, value: T) -> T {
        Guarded::exchange(self, value)
    }

    fn apply_shared<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&T) -> U,
    {
        Guarded::apply_shared(self, f)
    }

    fn apply_exclusive<F, U>(&self, f: F) -> U
    where
        F: FnMut(&mut T) -> U,
    {
        Guarded::apply_exclusive(self, f)
    }

    fn get_mut(&mut self) -> &mut T {
        Guarded::get_mut(self)
    }

    fn into_inner(self) -> T {
        Guarded::into_inner(self)
    }
}

#[cfg(test)]
mod tests {
    use super::Guarded;

    #[test]
    fn debug_shows_value_or_locked() {
        let a = Guarded::new(String::from("x"));
        assert_eq!(format!("{:?}", a), "Guarded(\"x\")");

        a.apply_exclusive(|_| {
            assert_eq!(format!("{:?}", a), "Guarded(<locked>)");
        });
    }
}
