//! # Tessera Core
//!
//! Dense object pools with stable handles, and an entity/component
//! registry built on them.
//!
//! ## Architecture Rules
//!
//! 1. **Items of one type live in one contiguous block** - pools grow by doubling
//! 2. **Handles are indices** - [`Identifier`], [`View`] and [`Reference`] never borrow the pool
//! 3. **Destruction is deferred** - `destroy` queues, `dispose` reclaims
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{Component, World};
//!
//! #[derive(Default)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! let mut world = World::new();
//! world.register::<Health>()?;
//! let entity = world.create_entity()?;
//! world.add::<Health>(entity)?.0 = 100;
//! world.destroy_entity(entity)?;
//! world.dispose()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;
pub mod sync;

pub use config::{PoolConfig, WorldConfig};
pub use ecs::{
    Attached, Component, ComponentBase, ComponentData, ComponentKind, ComponentPool,
    ComponentTypeId, DisposeStats, DoNotDestroy, DoNotDuplicate, Entity, ErasedComponent, World,
};
pub use error::{EcsError, EcsResult, PoolError, PoolResult};
pub use memory::{
    DestroyItems, Disposable, Identifier, LinearPool, OptionalView, PoolId, ReclaimPolicy,
    Reference, ResetItems, View,
};
pub use sync::SharedWorld;
