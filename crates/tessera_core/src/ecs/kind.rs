//! # Component Kinds
//!
//! A kind owns every component of one type. The world never touches
//! component storage directly: it goes through this trait, which is what
//! lets each kind keep its own pool layout and teardown rules.

use std::any::Any;

use super::component::{short_type_name, ComponentBase, ComponentTypeId, ErasedComponent};
use super::entity::Entity;
use crate::error::{EcsError, EcsResult};
use crate::memory::Identifier;

/// Owner of one component type.
///
/// `copy` and `reset` are optional and report [`EcsError::Unsupported`]
/// unless the kind overrides them.
pub trait ComponentKind: Send + 'static {
    /// Type discriminator of the owned components.
    fn component_type(&self) -> ComponentTypeId;

    /// Unique component name, or `""` to stay out of the name registry.
    fn component_name(&self) -> &str;

    /// Allocates a new component for `entity`.
    ///
    /// # Errors
    ///
    /// Pool errors from the underlying storage.
    fn create(&mut self, entity: Identifier<Entity>) -> EcsResult<Identifier<ComponentBase>>;

    /// Queues a component for destruction in the kind's own pool.
    ///
    /// # Errors
    ///
    /// Pool errors from the underlying storage.
    fn destroy(&mut self, component: Identifier<ComponentBase>) -> EcsResult<()>;

    /// Resolves a component handle.
    fn component(&self, component: Identifier<ComponentBase>) -> Option<&dyn ErasedComponent>;

    /// Resolves a component handle mutably.
    fn component_mut(
        &mut self,
        component: Identifier<ComponentBase>,
    ) -> Option<&mut dyn ErasedComponent>;

    /// Deep-copies the data of `source` into `destination`.
    ///
    /// The destination keeps its entity back-reference.
    ///
    /// # Errors
    ///
    /// [`EcsError::Unsupported`] by default.
    fn copy(
        &mut self,
        source: Identifier<ComponentBase>,
        destination: Identifier<ComponentBase>,
    ) -> EcsResult<()> {
        let _ = (source, destination);
        Err(EcsError::Unsupported {
            component: short_type_name(self.component_name()).to_string(),
            operation: "copy",
        })
    }

    /// Resets a component's data; `full` asks for a complete reset rather
    /// than a partial one.
    ///
    /// # Errors
    ///
    /// [`EcsError::Unsupported`] by default.
    fn reset(&mut self, component: Identifier<ComponentBase>, full: bool) -> EcsResult<()> {
        let _ = (component, full);
        Err(EcsError::Unsupported {
            component: short_type_name(self.component_name()).to_string(),
            operation: "reset",
        })
    }

    /// Runs a dispose pass over the kind's pool. Returns reclaimed components.
    ///
    /// # Errors
    ///
    /// Pool errors from the underlying storage.
    fn dispose_components(&mut self) -> EcsResult<usize>;

    /// Drops every component. Used by world shutdown.
    ///
    /// # Errors
    ///
    /// Pool errors from the underlying storage.
    fn clear_components(&mut self) -> EcsResult<()> {
        Ok(())
    }

    /// Components allocated in the kind, pending ones included.
    fn component_count(&self) -> usize {
        0
    }

    /// Components queued for destruction but not yet reclaimed.
    fn pending_count(&self) -> usize {
        0
    }

    /// Upcast for downcasting to the concrete kind.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete kind.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
