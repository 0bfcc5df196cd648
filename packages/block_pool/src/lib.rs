//! A fixed-block object pool with constant-time allocation and generation-checked handles.
//!
//! A pool reserves one contiguous buffer of equally sized slots up front. Vacant slots are
//! threaded into an intrusive free list, so allocating and freeing an item are both O(1) and
//! never touch the global allocator.
//!
//! # Key features
//!
//! - **Two growth policies**: a [`FixedPool`] never grows and reports [`Error::Exhausted`] when
//!   full; a [`GrowablePool`] doubles its buffer and moves its items across when it runs out.
//! - **Checked handles**: a [`Handle`] is a small `Copy` value that stays valid across growth.
//!   Using a handle after its item was freed, or with a pool that did not issue it, is reported
//!   as an [`Error`] instead of silently aliasing another item.
//! - **Multi-type storage**: a [`TaggedPool`] stores any member of a closed set of types declared
//!   with [`tagged_union!`].
//! - **Scope-managed items**: a [`LocalPool`] hands out [`Owned`] handles that free their item
//!   when dropped.
//! - **Drop policies**: choose whether a pool may drop items left in it ([`DropPolicy`]).
//!
//! # Handles and relocation
//!
//! A growable pool may move its items to a new buffer on any allocation, so the pool never hands
//! out references that outlive a single borrow of the pool. Handles address slots by index and
//! every access goes through the pool, which checks the handle first.
//!
//! # Example
//!
//! ```rust
//! use block_pool::{Error, FixedPool, GrowablePool};
//! use new_zealand::nz;
//!
//! let mut fixed = FixedPool::<u64>::with_capacity(nz!(1))?;
//!
//! let item = fixed.allocate(1)?;
//! assert_eq!(fixed.allocate(2), Err(Error::Exhausted { capacity: 1 }));
//!
//! fixed.free(item);
//! assert_eq!(fixed.get(item), Err(Error::UseAfterFree { index: 0 }));
//!
//! let mut growable = GrowablePool::<u64>::with_capacity(nz!(1))?;
//!
//! let first = growable.allocate(1)?;
//! let second = growable.allocate(2)?;
//!
//! // The pool doubled and moved `first` across; its handle still works.
//! assert_eq!(growable.size(), 2);
//! assert_eq!(*growable.get(first)?, 1);
//! assert_eq!(*growable.get(second)?, 2);
//! # Ok::<(), Error>(())
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber of its own. Relocations are
//! logged at debug level; ignored frees of invalid handles and destructive variant changes in a
//! [`TaggedPool`] are logged at trace level.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod arena;
mod builder;
mod drop_policy;
mod error;
mod free_list;
mod handle;
mod local;
mod policy;
mod pool;
mod slot;
mod tagged;

pub(crate) use arena::*;
pub use builder::*;
pub use drop_policy::*;
pub use error::*;
pub(crate) use free_list::*;
pub use handle::Handle;
pub use local::*;
pub use policy::*;
pub use pool::*;
pub(crate) use slot::*;
pub use tagged::*;

trait Sealed {}
