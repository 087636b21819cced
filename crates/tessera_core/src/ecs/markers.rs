//! # Marker Components
//!
//! Empty components that flag an entity for code that walks the world.
//! The registry stores them like any other kind and attaches no behavior;
//! a level loader or editor checks for them before tearing down or cloning
//! entities.

use super::component::Component;
use super::world::World;
use crate::error::EcsResult;

/// Flags an entity that must survive bulk teardown, such as the main camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoNotDestroy;

impl Component for DoNotDestroy {
    fn name() -> &'static str {
        "Do Not Destroy"
    }
}

/// Flags an entity that must not be cloned by editor-style duplication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoNotDuplicate;

impl Component for DoNotDuplicate {
    fn name() -> &'static str {
        "Do Not Duplicate"
    }
}

impl World {
    /// Registers the [`DoNotDestroy`] and [`DoNotDuplicate`] kinds.
    ///
    /// Both are copyable, so an entity carrying them can still go through
    /// [`World::duplicate`] when the caller decides to.
    ///
    /// # Errors
    ///
    /// See [`World::register_kind`].
    pub fn register_markers(&mut self) -> EcsResult<()> {
        let keep = self.component_pool::<DoNotDestroy>().copyable();
        let single = self.component_pool::<DoNotDuplicate>().copyable();
        self.register_pool(keep)?;
        self.register_pool(single)
    }
}
