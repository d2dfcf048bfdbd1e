//! Type-erased teardown routines for managed allocations.
//!
//! A `Destroyer` is stored once per managed object (in the control block,
//! or inline in `Unique`) and consumed when it runs. Taking `self` by
//! value is what makes the at-most-once contract structural: once a
//! routine has been invoked there is no value left to invoke again.

use core::ptr::NonNull;

/// Teardown routine for one managed allocation.
///
/// `Boxed` reclaims a handle that came from `Box::into_raw`, running the
/// pointee's own destructor. `Custom` runs a caller-supplied routine on
/// the raw handle; the routine owns all teardown, including freeing the
/// allocation if there is one.
///
/// Routines must be `Send`: the last release of a shared handle can
/// happen on any thread.
pub enum Destroyer<T: 'static> {
    Boxed,
    Custom(Box<dyn FnOnce(*mut T) + Send>),
}

impl<T> Destroyer<T> {
    /// Wraps a caller-supplied routine.
    #[inline]
    pub fn custom<F>(run: F) -> Self
    where
        F: FnOnce(*mut T) + Send + 'static,
    {
        Destroyer::Custom(Box::new(run))
    }

    /// True when the handle can be reclaimed as a `Box<T>`.
    #[inline]
    pub fn reclaims_box(&self) -> bool {
        matches!(self, Destroyer::Boxed)
    }

    /// Runs the teardown on `handle`, consuming the routine.
    ///
    /// # Safety
    ///
    /// `handle` must be the handle this routine was installed for, the
    /// pointee must still be live, and nothing may use the handle after
    /// this returns. For `Boxed`, the handle must have come from
    /// `Box::into_raw`.
    pub unsafe fn invoke(self, handle: NonNull<T>) {
        match self {
            Destroyer::Boxed => drop(unsafe { Box::from_raw(handle.as_ptr()) }),
            Destroyer::Custom(run) => run(handle.as_ptr()),
        }
    }
}
