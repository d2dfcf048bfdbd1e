//! The non-owning weak handle.
//!
//! A `Weak` observes an allocation without keeping the object alive. It
//! never dereferences its stored handle: the one path from a `Weak` to a
//! borrow of the object is [`Weak::upgrade`], which goes through the
//! control block's conditional increment and fails once the object is
//! gone.

use core::fmt;
use core::ptr;

use crate::block::Block;
use crate::shared::{Core, Shared};

/// Weak counterpart to [`Shared`]: shares the control block, not the
/// object. Existence of a `Weak` never prevents or delays destruction;
/// it only keeps the block itself allocated so expiry stays observable.
pub struct Weak<T>
where
    T: 'static,
{
    pub(crate) core: Option<Core<T>>,
}

unsafe impl<T> Send for Weak<T> where T: Send + Sync {}

unsafe impl<T> Sync for Weak<T> where T: Send + Sync {}

impl<T> Weak<T> {
    /// The empty weak handle; observes nothing and is always expired.
    #[inline]
    pub const fn new() -> Self {
        Weak { core: None }
    }

    /// Attempts to obtain a strong handle. Returns `None` iff the
    /// object has already been destroyed (or this handle is empty).
    ///
    /// On success the returned [`Shared`] manages the same object as
    /// the handle this `Weak` was created from, and the strong count
    /// went up by exactly one. The check and the increment are a single
    /// atomic step, so a concurrent last drop either loses (the upgrade
    /// holds a reference before the count can reach zero) or wins (the
    /// upgrade observes zero and fails); a destroyed object is never
    /// handed out.
    pub fn upgrade(&self) -> Option<Shared<T>> {
        let core = self.core?;
        if unsafe { core.block.as_ref() }.try_acquire_strong() {
            Some(Shared { core: Some(core) })
        } else {
            None
        }
    }

    /// True once the observed object has been destroyed. Empty handles
    /// are expired.
    #[inline]
    pub fn expired(&self) -> bool {
        self.strong_count() == 0
    }

    /// Number of strong handles still sharing the observed allocation;
    /// 0 once the object is gone. Advisory, like [`Shared::use_count`],
    /// except that 0 is final.
    #[inline]
    pub fn strong_count(&self) -> usize {
        match self.core {
            Some(core) => unsafe { core.block.as_ref() }.strong_count(),
            None => 0,
        }
    }

    /// The stored handle, for identity comparison only. The object it
    /// points at may already be destroyed: never dereference this,
    /// upgrade instead.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        match self.core {
            Some(core) => core.value.as_ptr(),
            None => ptr::null(),
        }
    }

    /// True for the empty weak handle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.is_none()
    }

    /// Releases this handle's claim on the block and leaves it empty.
    pub fn reset(&mut self) {
        if let Some(core) = self.core.take() {
            unsafe { Block::release_weak(core.block) };
        }
    }

    /// Steals this handle's state, leaving it empty. No counter traffic.
    #[inline]
    pub fn take(&mut self) -> Weak<T> {
        Weak {
            core: self.core.take(),
        }
    }
}

impl<T> Clone for Weak<T> {
    /// Another observer of the same allocation; the weak count goes up
    /// by one.
    fn clone(&self) -> Self {
        if let Some(core) = self.core {
            unsafe { core.block.as_ref() }.acquire_weak();
        }
        Weak { core: self.core }
    }
}

impl<T> Drop for Weak<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for Weak<T> {
    /// The empty weak handle.
    fn default() -> Self {
        Weak::new()
    }
}

impl<T> From<&Shared<T>> for Weak<T> {
    fn from(shared: &Shared<T>) -> Self {
        shared.downgrade()
    }
}

impl<T> fmt::Debug for Weak<T>
where
    T: fmt::Debug,
{
    /// Shows the value only while it is still upgradeable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_tuple("Weak");
        if let Some(shared) = self.upgrade() {
            if let Some(value) = shared.get() {
                d.field(value);
            }
        }
        d.finish()
    }
}
