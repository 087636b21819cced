//! # Entity Component System
//!
//! Entities are records in a [`LinearPool`](crate::LinearPool); components
//! live in per-type kinds that the [`World`] reaches through the
//! [`ComponentKind`] trait.
//!
//! ## Design Philosophy
//!
//! - Components of one type are stored densely by their kind
//! - Entities reference components by handle, never by pointer
//! - Removal and destruction are deferred to an explicit dispose pass

mod component;
mod entity;
mod kind;
mod markers;
mod storage;
mod world;

pub use component::{Attached, Component, ComponentBase, ComponentTypeId, ErasedComponent};
pub use entity::{ComponentData, Entity};
pub use kind::ComponentKind;
pub use markers::{DoNotDestroy, DoNotDuplicate};
pub use storage::ComponentPool;
pub use world::{DisposeStats, World};
