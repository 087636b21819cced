//! # Memory Management
//!
//! Linear pools and the handles that name their items.
//!
//! ## Design Philosophy
//!
//! - Items of one type live in one contiguous, growable block
//! - Callers hold indices, never pointers; references are resolved at the point of use
//! - Destruction is two-phase: `destroy` queues, `dispose` reclaims

mod handle;
mod pool;

pub use handle::{Identifier, OptionalView, PoolId, Reference, View};
pub use pool::{DestroyItems, Disposable, LinearPool, ReclaimPolicy, ResetItems};
