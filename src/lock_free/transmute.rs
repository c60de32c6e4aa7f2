use std::mem::{align_of, size_of, ManuallyDrop};

use const_panic::concat_assert;

use crate::atomic::AtomicStorage;

/// Reinterprets a `T` as the plain value held by its atomic storage `A`.
///
/// A `T` smaller than `A::Underlying` only overwrites its own bytes, the
/// rest keep the zeroes written by [`TransmuteUnderlying::from_value`].
pub(crate) union TransmuteUnderlying<T, A: AtomicStorage> {
    value: ManuallyDrop<T>,
    underlying: A::Underlying,
}

impl<T: Copy, A: AtomicStorage> Clone for TransmuteUnderlying<T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Copy, A: AtomicStorage> Copy for TransmuteUnderlying<T, A> {}

impl<T, A: AtomicStorage> TransmuteUnderlying<T, A> {
    pub(crate) const SIZE: usize = size_of::<Self>();
    pub(crate) const UNDERLYING_SIZE: usize = size_of::<A::Underlying>();
    pub(crate) const SIZE_MATCHES: bool = Self::SIZE == Self::UNDERLYING_SIZE;

    const ALIGN: usize = align_of::<TransmuteUnderlying<T, A>>();
    const UNDERLYING_ALIGN: usize = align_of::<A::Underlying>();
    /// This is true if all references to `A::Underlying` are safely
    /// transmutable to a `TransmuteUnderlying<T, A>`.
    pub(crate) const ALIGN_MATCHES: bool = Self::UNDERLYING_ALIGN % Self::ALIGN == 0;

    pub(crate) const fn assert_size_matches() {
        concat_assert!(
            <TransmuteUnderlying<T, A>>::SIZE_MATCHES,
            "value type (size=",
            size_of::<T>(),
            ") overflowed its atomic storage (size=",
            <TransmuteUnderlying<T, A>>::UNDERLYING_SIZE,
            ")",
        );
    }

    pub(crate) const fn assert_align_matches() {
        Self::assert_size_matches();
        concat_assert!(
            <TransmuteUnderlying<T, A>>::ALIGN_MATCHES,
            "value type (align=",
            align_of::<T>(),
            ") is more strictly aligned than its atomic storage (align=",
            <TransmuteUnderlying<T, A>>::UNDERLYING_ALIGN,
            ")",
        );
    }

    pub(crate) fn from_value(val: T) -> Self {
        // zero the storage first so the bytes `T` does not cover are stable
        // across every value, keeping bitwise compare-exchange meaningful
        let mut v = TransmuteUnderlying {
            underlying: A::ZERO,
        };
        v.value = ManuallyDrop::new(val);
        v
    }

    pub(crate) const fn from_underlying(val: A::Underlying) -> Self {
        TransmuteUnderlying { underlying: val }
    }

    /// This is only safe to call when `self` was constructed from a proper `T` value
    pub(crate) unsafe fn value(self) -> T {
        ManuallyDrop::into_inner(self.value)
    }

    pub(crate) fn into_underlying(self) -> A::Underlying {
        // This is safe because `A::Underlying` is `Copy`
        // so we're just returning some POD
        unsafe { self.underlying }
    }

    pub(crate) fn from_mut(v: &mut A::Underlying) -> &mut Self {
        Self::assert_align_matches();
        // This is safe because the size and alignment of `Self` and `A::Underlying` match
        unsafe { &mut *(v as *mut A::Underlying as *mut Self) }
    }

    /// This is only safe to call when `self` was constructed from a proper `T` value
    pub(crate) unsafe fn get_mut_value(&mut self) -> &mut T {
        &mut self.value
    }
}

#[inline]
pub(crate) fn into_underlying<T, A: AtomicStorage>(val: T) -> A::Underlying {
    TransmuteUnderlying::<T, A>::from_value(val).into_underlying()
}

/// This is only safe to call when `val` was produced from a proper `T` value
#[inline]
pub(crate) unsafe fn from_underlying<T, A: AtomicStorage>(val: A::Underlying) -> T {
    TransmuteUnderlying::<T, A>::from_underlying(val).value()
}
