//! splitrc: shared and weak ownership pointers over a detached,
//! atomically counted control block, plus a single-owner pointer with
//! the same pluggable teardown contract.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build the shared/weak pair in small, verifiable layers so
//!   each piece can be reasoned about independently.
//! - Layers:
//!   - Destroyer<T>: type-erased teardown routine, consumed when it
//!     runs; at-most-once by construction.
//!   - Block<T>: the counting core. Two atomic counters and the stored
//!     routine; every destruction and deallocation decision is made
//!     here, nowhere else.
//!   - Shared<T> / Weak<T>: public handles composed over the block
//!     protocol; Unique<T>: the exclusive pointer, no block at all.
//!
//! Constraints
//! - Thread-safe: every counter mutation is a single atomic
//!   read-modify-write; no locks, no blocking, no scheduling.
//! - Nullable: each handle type has an explicit empty state, and
//!   "handle is null iff block is absent" holds by construction
//!   (`Option<Core>`), not by discipline.
//! - `Send`/`Sync` iff `T: Send + Sync` for the counted handles: the
//!   last release may run the teardown on any thread.
//!
//! Why this split?
//! - Localize invariants: each layer has a small, precise contract.
//! - Minimize unsafe: all counter bookkeeping and deallocation is
//!   isolated in `block`; the handle types only uphold "non-empty
//!   implies live".
//! - Clear failure boundaries: the block never calls into user code
//!   except the stored teardown routine, at a point where the
//!   structure is already consistent.
//!
//! Counter protocol
//! - `strong` counts live Shared handles; the 1 -> 0 transition is a
//!   single atomic step observed by exactly one releaser, which runs
//!   the teardown.
//! - `weak` counts live Weak handles plus one ensemble unit held for
//!   all strong handles together, released only after the object is
//!   destroyed. The block-free decision is therefore a single 1 -> 0
//!   transition too; no path reads two counters and acts on the pair.
//! - Upgrading a Weak goes through a compare-exchange that refuses
//!   zero: a dead object is never resurrected, and there is no gap
//!   between the check and the increment.
//!
//! Overflow semantics
//! - Counter overflow aborts the process, matching `Rc`: a leak-driven
//!   wraparound must not turn into a premature free. Release-side
//!   underflow is a bug in this crate and is debug-asserted.
//!
//! Notes and non-goals
//! - Cycles between Shared handles leak; there is no cycle detection
//!   and no garbage collection. Break cycles with Weak.
//! - No custom allocator integration; allocations come from `Box`.
//! - No array handles or size tracking; a caller-supplied teardown
//!   routine covers exotic allocations.
//! - No intrusive counting: counts live in the detached block, never
//!   in `T`.
//! - Weak exposes no borrow of the object. `upgrade()` is the only
//!   path to one; `Weak::as_ptr` is identity-only.
//! - Public API surface is `Shared`, `Weak`, `Unique`; the block and
//!   routine layers are implementation details (exposed only under
//!   `bench_internal`, for benchmarks).

#[cfg(feature = "bench_internal")]
pub mod block;
#[cfg(not(feature = "bench_internal"))]
mod block;
#[cfg(feature = "bench_internal")]
pub mod destroy;
#[cfg(not(feature = "bench_internal"))]
mod destroy;
mod shared;
mod unique;
mod weak;

// Public surface
pub use shared::Shared;
pub use unique::Unique;
pub use weak::Weak;
