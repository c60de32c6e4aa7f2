//! The [`ConcurrentAccess`] trait, the operations every representation offers

/// Race-free access to a single `T`, shared by [`Atomic`] and [`Guarded`].
///
/// Generic code bounded on `T: Classify` reaches these operations through
/// [`Concurrent<T>`] without knowing which representation backs it.
///
/// # Reentrancy
///
/// Calling any operation on a [`Guarded`] cell from inside one of its own
/// `apply_shared` or `apply_exclusive` callbacks deadlocks. This is not
/// detected.
///
/// # Examples
///
/// ```
/// use concurrent_cell::{Classify, Concurrent, ConcurrentAccess};
///
/// fn bump<T: Classify + Clone>(cell: &Concurrent<T>, next: T) -> T {
///     cell.exchange(next)
/// }
///
/// let n = Concurrent::<i64>::new(1);
/// let s = Concurrent::<String>::new("a".into());
///
/// assert_eq!(bump(&n, 2i64), 1);
/// assert_eq!(bump(&s, String::from("b")), "a");
/// assert!(ConcurrentAccess::is_lock_free(&n));
/// assert!(!ConcurrentAccess::is_lock_free(&s));
/// ```
///
/// [`Atomic`]: crate::Atomic
/// [`Guarded`]: crate::Guarded
/// [`Concurrent<T>`]: crate::Concurrent
pub trait ConcurrentAccess<T>: Sized {
    /// `true` for every instance of a lock-free representation.
    const IS_ALWAYS_LOCK_FREE: bool;

    /// Creates a cell holding `value`.
    fn new(value: T) -> Self;

    /// Reports [`ConcurrentAccess::IS_ALWAYS_LOCK_FREE`].
    fn is_lock_free(&self) -> bool {
        Self::IS_ALWAYS_LOCK_FREE
    }

    /// Returns a copy of the current value.
    fn load(&self) -> T
    where
        T: Clone;

    /// Replaces the current value with `value`.
    fn store(&self, value: T);

    /// Stores a copy of `value` and hands `value` back.
    fn assign(&self, value: T) -> T
    where
        T: Clone,
    {
        self.store(value.clone());
        value
    }

    /// Replaces the current value with `value`, returning the previous one.
    fn exchange(&self, value: T) -> T;

    /// Runs `f` with shared access to the value and returns its result.
    ///
    /// The result cannot borrow from the value. It can still carry a raw
    /// pointer into the value, which the compiler does not catch; using such
    /// a pointer after `f` returns breaks this contract.
    fn apply_shared<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Runs `f` with exclusive access to the value and returns its result.
    ///
    /// Lock-free representations may run `f` more than once; only the run
    /// whose changes were published returns. The result cannot borrow from
    /// the value, and must not carry a raw pointer into it either.
    fn apply_exclusive<F, R>(&self, f: F) -> R
    where
        F: FnMut(&mut T) -> R;

    /// Returns a mutable reference to the value. No synchronization is
    /// needed since `&mut self` proves exclusive access.
    fn get_mut(&mut self) -> &mut T;

    /// Consumes the cell and returns the value.
    fn into_inner(self) -> T;
}
