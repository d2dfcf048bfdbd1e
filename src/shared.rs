//! The shared-ownership handle.
//!
//! A `Shared` is either empty or a (`handle`, `block`) pair; the
//! `Option<Core>` layout makes "handle is null iff block is absent" hold
//! by construction rather than by discipline.

use core::fmt;
use core::ptr;
use core::ptr::NonNull;

use crate::block::Block;
use crate::destroy::Destroyer;
use crate::unique::Unique;
use crate::weak::Weak;

/// The non-empty payload: managed handle plus its control block. Copied
/// freely inside the crate; every copy that escapes must have paid for
/// its reference first.
pub(crate) struct Core<T: 'static> {
    pub(crate) value: NonNull<T>,
    pub(crate) block: NonNull<Block<T>>,
}

// Manual impls: `Core` is a pair of pointers and copies regardless of `T`.
impl<T> Clone for Core<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Core<T> {}

/// Shared-ownership pointer to a heap allocation, with the counting kept
/// in a detached control block.
///
/// Cloning shares the allocation; the object is destroyed when the last
/// clone goes away, by the teardown routine supplied at construction.
/// Handles are nullable: an empty `Shared` owns nothing and every query
/// on it answers accordingly.
pub struct Shared<T>
where
    T: 'static,
{
    pub(crate) core: Option<Core<T>>,
}

unsafe impl<T> Send for Shared<T> where T: Send + Sync {}

unsafe impl<T> Sync for Shared<T> where T: Send + Sync {}

impl<T> Shared<T> {
    /// The empty handle. Owns nothing; dropping it is a no-op.
    #[inline]
    pub const fn empty() -> Self {
        Shared { core: None }
    }

    /// Allocates `value` on the heap and adopts it with the default
    /// teardown (the allocation is reclaimed and `value` dropped when
    /// the last strong handle goes away). Strong count starts at 1.
    pub fn new(value: T) -> Self {
        let handle = NonNull::from(Box::leak(Box::new(value)));
        Shared {
            core: Some(Core {
                value: handle,
                block: Block::allocate(Destroyer::Boxed),
            }),
        }
    }

    /// Adopts a raw allocation with the default teardown. A null handle
    /// yields the empty state without allocating a control block.
    ///
    /// # Safety
    ///
    /// A non-null `handle` must have come from `Box::into_raw` and must
    /// not be managed by anything else; this call takes ownership.
    pub unsafe fn from_raw(handle: *mut T) -> Self {
        match NonNull::new(handle) {
            Some(value) => Shared {
                core: Some(Core {
                    value,
                    block: Block::allocate(Destroyer::Boxed),
                }),
            },
            None => Shared::empty(),
        }
    }

    /// Adopts a raw allocation with a caller-supplied teardown routine.
    /// The routine owns all teardown, including freeing the allocation;
    /// it runs at most once, on whichever thread drops the last strong
    /// handle. A null handle yields the empty state and drops the
    /// routine unrun.
    ///
    /// # Safety
    ///
    /// A non-null `handle` must point to a live object that `destroy`
    /// knows how to tear down, and must not be managed by anything else;
    /// this call takes ownership.
    pub unsafe fn from_raw_with<F>(handle: *mut T, destroy: F) -> Self
    where
        F: FnOnce(*mut T) + Send + 'static,
    {
        match NonNull::new(handle) {
            Some(value) => Shared {
                core: Some(Core {
                    value,
                    block: Block::allocate(Destroyer::custom(destroy)),
                }),
            },
            None => Shared::empty(),
        }
    }

    /// Borrows the managed object, or `None` when empty.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // A non-empty handle holds a strong reference, so the object is
        // live for as long as this borrow can be.
        self.core
            .as_ref()
            .map(|core| unsafe { core.value.as_ref() })
    }

    /// The managed handle for identity purposes; null when empty.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        match self.core {
            Some(core) => core.value.as_ptr(),
            None => ptr::null(),
        }
    }

    /// True for the empty handle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.is_none()
    }

    /// Number of strong handles sharing this allocation; 0 when empty.
    ///
    /// Advisory: exact only when the caller knows no clone or drop is
    /// racing it.
    #[inline]
    pub fn use_count(&self) -> usize {
        match self.core {
            Some(core) => unsafe { core.block.as_ref() }.strong_count(),
            None => 0,
        }
    }

    /// Whether `this` and `other` manage the same object. Two empty
    /// handles compare equal.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.as_ptr() == other.as_ptr()
    }

    /// Creates a weak handle observing this allocation. Empty in, empty
    /// out.
    pub fn downgrade(&self) -> Weak<T> {
        if let Some(core) = self.core {
            unsafe { core.block.as_ref() }.acquire_weak();
            Weak { core: Some(core) }
        } else {
            Weak::new()
        }
    }

    /// Releases this handle's ownership and leaves it empty. The object
    /// is destroyed here iff this was the last strong handle.
    pub fn reset(&mut self) {
        if let Some(core) = self.core.take() {
            unsafe { Block::release_strong(core.block, core.value) };
        }
    }

    /// Releases current ownership, then adopts `handle` as
    /// [`Shared::from_raw`] would. Handing back the currently managed
    /// handle is recognized by identity and is a no-op: nothing is
    /// released, and the stored teardown routine stays in place.
    ///
    /// # Safety
    ///
    /// A `handle` this `Shared` does not already manage falls under the
    /// [`Shared::from_raw`] contract.
    pub unsafe fn reset_raw(&mut self, handle: *mut T) {
        if self.as_ptr() == handle as *const T {
            return;
        }
        self.reset();
        *self = unsafe { Shared::from_raw(handle) };
    }

    /// Steals this handle's state, leaving it empty. No counter traffic:
    /// ownership moves, it is not duplicated.
    #[inline]
    pub fn take(&mut self) -> Shared<T> {
        Shared {
            core: self.core.take(),
        }
    }

    /// Reclaims the value when this is the sole strong handle and the
    /// teardown is the default box reclaim; otherwise returns `self`
    /// unchanged. On success any weak handles are expired from this
    /// point on.
    ///
    /// A handle built with a custom teardown routine always refuses: the
    /// allocation's provenance is the routine's business, so the value
    /// cannot be moved out from under it.
    pub fn try_unwrap(mut self) -> Result<T, Shared<T>> {
        let Some(core) = self.core else {
            return Err(self);
        };
        {
            let block = unsafe { core.block.as_ref() };
            if !block.teardown_reclaims_box() || !block.try_retire_sole_strong() {
                return Err(self);
            }
        }
        // Sole holder retired the count: the object is ours, and weak
        // observers already see it as destroyed.
        self.core = None;
        let value = *unsafe { Box::from_raw(core.value.as_ptr()) };
        unsafe { Block::release_weak(core.block) };
        Ok(value)
    }
}

impl<T> Clone for Shared<T> {
    /// Shares the allocation; the strong count goes up by one.
    fn clone(&self) -> Self {
        if let Some(core) = self.core {
            unsafe { core.block.as_ref() }.acquire_strong();
        }
        Shared { core: self.core }
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for Shared<T> {
    /// The empty handle.
    fn default() -> Self {
        Shared::empty()
    }
}

impl<T> fmt::Debug for Shared<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_tuple("Shared");
        if let Some(value) = self.get() {
            d.field(value);
        }
        d.finish()
    }
}

impl<T> From<Unique<T>> for Shared<T> {
    /// Promotes exclusive ownership to shared, carrying the stored
    /// teardown routine into the new control block. An empty `Unique`
    /// becomes the empty `Shared`.
    fn from(owner: Unique<T>) -> Self {
        match owner.into_parts() {
            Some((value, destroy)) => Shared {
                core: Some(Core {
                    value,
                    block: Block::allocate(destroy),
                }),
            },
            None => Shared::empty(),
        }
    }
}
