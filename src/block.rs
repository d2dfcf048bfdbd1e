//! The control block: shared counting core behind `Shared` and `Weak`.
//!
//! One block exists per managed object. It holds the strong count, the
//! weak count, and the teardown routine, and every deallocation decision
//! in the crate is made here.
//!
//! Counter protocol
//! - `strong` counts live `Shared` handles. The 1 -> 0 transition is
//!   observed by exactly one releaser (a single atomic read-modify-write),
//!   and that releaser runs the teardown.
//! - `weak` counts live `Weak` handles, plus one ensemble unit held on
//!   behalf of all strong handles together. The unit is released only
//!   after the object is destroyed, so the block-free decision is a
//!   single 1 -> 0 transition on one counter. Deciding it by reading the
//!   two counters separately is not atomic: two racing releasers could
//!   each observe the other side still nonzero and neither would free
//!   the block, or interleave so both would.
//! - Once `strong` reaches zero it never increases again. Upgrades go
//!   through a compare-exchange that refuses zero, so the check and the
//!   increment are one atomic step.

use core::cell::UnsafeCell;
use core::ptr::NonNull;
use core::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use core::sync::atomic::{fence, AtomicUsize};

use crate::destroy::Destroyer;

/// Counts above this are treated as leak-driven overflow.
///
/// A count cannot legitimately get here: it would need more handles than
/// half the address space could hold. Follow `Rc` semantics and abort
/// rather than let a wrapped counter free live memory.
const MAX_COUNT: usize = usize::MAX / 2;

pub struct Block<T: 'static> {
    /// Live `Shared` handles.
    strong: AtomicUsize,
    /// Live `Weak` handles, plus the strong side's ensemble unit.
    weak: AtomicUsize,
    /// Teardown for the managed handle. Written at allocation, read and
    /// taken only by the releaser that observes `strong` go 1 -> 0.
    destroy: UnsafeCell<Option<Destroyer<T>>>,
}

impl<T> Block<T> {
    /// Allocates the block for a freshly adopted handle: one strong
    /// holder, no weak handles, the ensemble unit in place.
    pub fn allocate(destroy: Destroyer<T>) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Block {
            strong: AtomicUsize::new(1),
            weak: AtomicUsize::new(1),
            destroy: UnsafeCell::new(Some(destroy)),
        })))
    }

    /// Registers one more strong handle.
    ///
    /// Relaxed suffices for the increment: the caller clones an existing
    /// live handle, which already pins the count above zero.
    #[inline]
    pub fn acquire_strong(&self) {
        if self.strong.fetch_add(1, Relaxed) > MAX_COUNT {
            std::process::abort();
        }
    }

    /// Registers one more weak handle.
    #[inline]
    pub fn acquire_weak(&self) {
        if self.weak.fetch_add(1, Relaxed) > MAX_COUNT {
            std::process::abort();
        }
    }

    /// Snapshot of the strong count. Advisory: it can be stale by the
    /// time the caller looks at it. Zero is the one final answer, since
    /// a count that reached zero never rises again.
    #[inline]
    pub fn strong_count(&self) -> usize {
        self.strong.load(Relaxed)
    }

    /// Attempts to register a strong handle on behalf of an upgrade.
    /// Fails iff the count already reached zero.
    ///
    /// The zero check and the increment must be one atomic step. A plain
    /// `fetch_add` with a rollback on zero would publish a transient
    /// nonzero count that a concurrent upgrade could observe and win on,
    /// handing out a handle to a destroyed object.
    pub fn try_acquire_strong(&self) -> bool {
        let mut n = self.strong.load(Relaxed);
        loop {
            if n == 0 {
                return false;
            }
            if n > MAX_COUNT {
                std::process::abort();
            }
            match self.strong.compare_exchange_weak(n, n + 1, Acquire, Relaxed) {
                Ok(_) => return true,
                Err(seen) => n = seen,
            }
        }
    }

    /// Attempts to retire the sole strong handle without running the
    /// teardown, so the caller can reclaim the value itself. Fails when
    /// other strong handles exist. On success the object counts as
    /// destroyed: upgrades fail and `strong_count` reads zero, and the
    /// caller must finish with [`Block::release_weak`] on the ensemble
    /// unit once it has taken the value.
    #[inline]
    pub fn try_retire_sole_strong(&self) -> bool {
        self.strong.compare_exchange(1, 0, Acquire, Relaxed).is_ok()
    }

    /// True when the stored teardown is the plain box reclaim.
    ///
    /// Reading the slot here is sound: it is written once at allocation
    /// and not touched again until a release retires the last strong
    /// handle, which cannot happen while the caller still holds one.
    #[inline]
    pub fn teardown_reclaims_box(&self) -> bool {
        match unsafe { (*self.destroy.get()).as_ref() } {
            Some(d) => d.reclaims_box(),
            None => false,
        }
    }

    /// Releases one strong handle. The releaser that observes the
    /// 1 -> 0 transition runs the teardown on `handle`, then gives back
    /// the ensemble unit, which may free the block itself.
    ///
    /// The teardown runs before the ensemble unit is released, so a
    /// routine may drop `Weak` handles to this very block.
    ///
    /// # Safety
    ///
    /// `block` must be live and `handle` must be the managed handle all
    /// strong handles of this block share. The caller gives up its
    /// reference: the block may be gone when this returns.
    pub unsafe fn release_strong(block: NonNull<Self>, handle: NonNull<T>) {
        let old = unsafe { block.as_ref() }.strong.fetch_sub(1, Release);
        debug_assert!(old > 0, "strong count underflow");
        if old == 1 {
            // The Release decrement published this handle's last use of
            // the object; the fence acquires every other handle's, so the
            // teardown cannot run early.
            fence(Acquire);
            let destroy = unsafe { (*block.as_ref().destroy.get()).take() }
                .expect("teardown routine present until the last strong release");
            unsafe { destroy.invoke(handle) };
            unsafe { Self::release_weak(block) };
        }
    }

    /// Releases one weak handle (or the ensemble unit). The releaser
    /// that takes the counter to zero frees the block.
    ///
    /// # Safety
    ///
    /// `block` must be live. The caller gives up its reference: the
    /// block may be gone when this returns.
    pub unsafe fn release_weak(block: NonNull<Self>) {
        let old = unsafe { block.as_ref() }.weak.fetch_sub(1, Release);
        debug_assert!(old > 0, "weak count underflow");
        if old == 1 {
            fence(Acquire);
            drop(unsafe { Box::from_raw(block.as_ptr()) });
        }
    }
}
