//! The exclusive-ownership handle.
//!
//! `Unique` is the single-owner counterpart to [`Shared`]: no control
//! block, no counters, no atomics. It carries its teardown routine
//! inline and runs it once when dropped or reset. Moving it is the only
//! way to transfer ownership; there is no clone.
//!
//! [`Shared`]: crate::Shared

use core::fmt;
use core::ptr;
use core::ptr::NonNull;

use crate::destroy::Destroyer;

/// Exclusive-ownership pointer with a pluggable teardown routine.
///
/// Nullable like [`Shared`]: the empty handle owns nothing. Promote to
/// shared ownership with `Shared::from`, which carries the stored
/// routine over.
///
/// [`Shared`]: crate::Shared
pub struct Unique<T>
where
    T: 'static,
{
    inner: Option<(NonNull<T>, Destroyer<T>)>,
}

unsafe impl<T> Send for Unique<T> where T: Send {}

unsafe impl<T> Sync for Unique<T> where T: Sync {}

impl<T> Unique<T> {
    /// The empty handle. Owns nothing; dropping it is a no-op.
    #[inline]
    pub const fn empty() -> Self {
        Unique { inner: None }
    }

    /// Allocates `value` on the heap and owns it with the default
    /// teardown.
    pub fn new(value: T) -> Self {
        Unique {
            inner: Some((NonNull::from(Box::leak(Box::new(value))), Destroyer::Boxed)),
        }
    }

    /// Adopts a raw allocation with the default teardown. Null yields
    /// the empty handle.
    ///
    /// # Safety
    ///
    /// A non-null `handle` must have come from `Box::into_raw` and must
    /// not be managed by anything else; this call takes ownership.
    pub unsafe fn from_raw(handle: *mut T) -> Self {
        match NonNull::new(handle) {
            Some(value) => Unique {
                inner: Some((value, Destroyer::Boxed)),
            },
            None => Unique::empty(),
        }
    }

    /// Adopts a raw allocation with a caller-supplied teardown routine.
    /// Null yields the empty handle and drops the routine unrun.
    ///
    /// # Safety
    ///
    /// A non-null `handle` must point to a live object that `destroy`
    /// knows how to tear down, and must not be managed by anything
    /// else; this call takes ownership.
    pub unsafe fn from_raw_with<F>(handle: *mut T, destroy: F) -> Self
    where
        F: FnOnce(*mut T) + Send + 'static,
    {
        match NonNull::new(handle) {
            Some(value) => Unique {
                inner: Some((value, Destroyer::custom(destroy))),
            },
            None => Unique::empty(),
        }
    }

    /// Borrows the owned object, or `None` when empty.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // Sole owner: the object lives exactly as long as this handle.
        self.inner
            .as_ref()
            .map(|(value, _)| unsafe { value.as_ref() })
    }

    /// Mutably borrows the owned object, or `None` when empty.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.inner
            .as_mut()
            .map(|(value, _)| unsafe { value.as_mut() })
    }

    /// The owned handle for identity purposes; null when empty.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        match &self.inner {
            Some((value, _)) => value.as_ptr(),
            None => ptr::null(),
        }
    }

    /// True for the empty handle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Relinquishes the handle without running the teardown and leaves
    /// this empty. The stored routine is discarded; the caller takes
    /// over the allocation. Null when empty.
    pub fn release(&mut self) -> *mut T {
        match self.inner.take() {
            Some((value, _destroy)) => value.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// Runs the teardown on the owned object (if any) and leaves this
    /// empty.
    pub fn reset(&mut self) {
        if let Some((value, destroy)) = self.inner.take() {
            unsafe { destroy.invoke(value) };
        }
    }

    /// Tears down the current object, then adopts `handle` with the
    /// default teardown as [`Unique::from_raw`] would.
    ///
    /// # Safety
    ///
    /// Same contract as [`Unique::from_raw`]. In particular `handle`
    /// must not be the handle this `Unique` currently owns.
    pub unsafe fn reset_raw(&mut self, handle: *mut T) {
        self.reset();
        *self = unsafe { Unique::from_raw(handle) };
    }

    /// Steals this handle's state, leaving it empty.
    #[inline]
    pub fn take(&mut self) -> Unique<T> {
        Unique {
            inner: self.inner.take(),
        }
    }

    /// Hands the payload to `Shared::from` without running teardown.
    pub(crate) fn into_parts(mut self) -> Option<(NonNull<T>, Destroyer<T>)> {
        self.inner.take()
    }
}

impl<T> Drop for Unique<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for Unique<T> {
    /// The empty handle.
    fn default() -> Self {
        Unique::empty()
    }
}

impl<T> fmt::Debug for Unique<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_tuple("Unique");
        if let Some(value) = self.get() {
            d.field(value);
        }
        d.finish()
    }
}
