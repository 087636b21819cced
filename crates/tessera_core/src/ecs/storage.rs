//! # Component Storage
//!
//! [`ComponentPool`] is the stock [`ComponentKind`]: one dense
//! [`LinearPool`] of [`Attached<C>`] items. Components are created
//! default-constructed and destroyed through [`Component::destroy`].
//!
//! ## Performance
//!
//! - Components of one type sit contiguously, so [`ComponentPool::iter`]
//!   is a linear scan
//! - Handles are plain indices; resolving one is a bounds check plus a
//!   generation compare

use std::any::Any;
use std::fmt;

use super::component::{
    short_type_name, Attached, Component, ComponentBase, ComponentTypeId, ErasedComponent,
};
use super::entity::Entity;
use super::kind::ComponentKind;
use crate::config::PoolConfig;
use crate::error::{EcsError, EcsResult};
use crate::memory::{Identifier, LinearPool};

/// Pool-backed owner of every component of type `C`.
pub struct ComponentPool<C: Component> {
    name: &'static str,
    pool: LinearPool<Attached<C>>,
    copy: Option<fn(&C) -> C>,
    reset: Option<fn(&mut C, bool)>,
}

impl<C: Component> ComponentPool<C> {
    /// Creates an empty pool named after [`Component::name`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates an empty pool sized by `config`.
    #[must_use]
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            name: C::name(),
            pool: LinearPool::with_config(config),
            copy: None,
            reset: None,
        }
    }

    /// Overrides the component name. An empty name keeps the kind out of
    /// the world's name registry.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Enables [`ComponentKind::copy`] through `Clone`.
    #[must_use]
    pub fn copyable(self) -> Self
    where
        C: Clone,
    {
        self.with_copy(C::clone)
    }

    /// Enables [`ComponentKind::copy`] with a custom deep-copy routine.
    #[must_use]
    pub fn with_copy(mut self, copy: fn(&C) -> C) -> Self {
        self.copy = Some(copy);
        self
    }

    /// Enables [`ComponentKind::reset`].
    #[must_use]
    pub fn with_reset(mut self, reset: fn(&mut C, bool)) -> Self {
        self.reset = Some(reset);
        self
    }

    /// Returns the underlying pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &LinearPool<Attached<C>> {
        &self.pool
    }

    /// Returns the underlying pool mutably.
    #[inline]
    pub fn pool_mut(&mut self) -> &mut LinearPool<Attached<C>> {
        &mut self.pool
    }

    /// Resolves a component handle to its data.
    #[inline]
    #[must_use]
    pub fn get(&self, component: Identifier<ComponentBase>) -> Option<&C> {
        self.pool.try_get(component.cast()).map(Attached::get)
    }

    /// Resolves a component handle to its data mutably.
    #[inline]
    pub fn get_mut(&mut self, component: Identifier<ComponentBase>) -> Option<&mut C> {
        self.pool.try_get_mut(component.cast()).map(Attached::get_mut)
    }

    /// Iterates allocated components with their entities.
    ///
    /// Components queued for destruction are still yielded until disposed.
    pub fn iter(&self) -> impl Iterator<Item = (Identifier<Entity>, &C)> {
        self.pool
            .iter()
            .map(|(_, attached)| (attached.entity(), attached.get()))
    }

    /// Mutable counterpart of [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Identifier<Entity>, &mut C)> {
        self.pool.iter_mut().map(|(_, attached)| {
            let entity = attached.entity();
            (entity, attached.get_mut())
        })
    }

    /// Number of allocated components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Returns true if no component is allocated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    fn unsupported(&self, operation: &'static str) -> EcsError {
        EcsError::Unsupported {
            component: short_type_name(self.name).to_string(),
            operation,
        }
    }
}

impl<C: Component> Default for ComponentPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> fmt::Debug for ComponentPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentPool")
            .field("name", &self.name)
            .field("pool", &self.pool)
            .field("copy", &self.copy.is_some())
            .field("reset", &self.reset.is_some())
            .finish()
    }
}

impl<C: Component> ComponentKind for ComponentPool<C> {
    fn component_type(&self) -> ComponentTypeId {
        ComponentTypeId::of::<C>()
    }

    fn component_name(&self) -> &str {
        self.name
    }

    fn create(&mut self, entity: Identifier<Entity>) -> EcsResult<Identifier<ComponentBase>> {
        let id = self
            .pool
            .create_with(|| Attached::attach(entity, C::default()))?;
        Ok(id.cast())
    }

    fn destroy(&mut self, component: Identifier<ComponentBase>) -> EcsResult<()> {
        self.pool.destroy(component.cast())?;
        Ok(())
    }

    fn component(&self, component: Identifier<ComponentBase>) -> Option<&dyn ErasedComponent> {
        self.pool
            .try_get(component.cast())
            .map(|attached| attached as &dyn ErasedComponent)
    }

    fn component_mut(
        &mut self,
        component: Identifier<ComponentBase>,
    ) -> Option<&mut dyn ErasedComponent> {
        self.pool
            .try_get_mut(component.cast())
            .map(|attached| attached as &mut dyn ErasedComponent)
    }

    fn copy(
        &mut self,
        source: Identifier<ComponentBase>,
        destination: Identifier<ComponentBase>,
    ) -> EcsResult<()> {
        let copy = self.copy.ok_or_else(|| self.unsupported("copy"))?;
        let (source, destination) = (source.cast(), destination.cast());
        self.pool.validate(source)?;
        self.pool.validate(destination)?;

        let data = copy(self.pool.get(source).get());
        *self.pool.get_mut(destination).get_mut() = data;
        Ok(())
    }

    fn reset(&mut self, component: Identifier<ComponentBase>, full: bool) -> EcsResult<()> {
        let reset = self.reset.ok_or_else(|| self.unsupported("reset"))?;
        let component = component.cast();
        self.pool.validate(component)?;
        reset(self.pool.get_mut(component).get_mut(), full);
        Ok(())
    }

    fn dispose_components(&mut self) -> EcsResult<usize> {
        let reclaimed = self.pool.dispose()?;
        if reclaimed > 0 {
            tracing::trace!(
                component = self.name,
                reclaimed,
                deferred = self.pool.garbage().len(),
                "disposed components"
            );
        }
        Ok(reclaimed)
    }

    fn clear_components(&mut self) -> EcsResult<()> {
        self.pool.clear(true)?;
        Ok(())
    }

    fn component_count(&self) -> usize {
        self.pool.len()
    }

    fn pending_count(&self) -> usize {
        self.pool.garbage().len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Health(u32);

    impl Component for Health {}

    #[derive(Default)]
    struct Locked {
        released: bool,
    }

    impl Component for Locked {
        fn destroy(&mut self) -> bool {
            self.released
        }
    }

    fn entity(index: u32) -> Identifier<Entity> {
        Identifier::new(index, 0)
    }

    #[test]
    fn test_create_stamps_entity() {
        let mut pool = ComponentPool::<Health>::new();
        let id = pool.create(entity(3)).unwrap();

        let erased = pool.component(id).unwrap();
        assert_eq!(erased.entity(), entity(3));
        assert_eq!(pool.get(id), Some(&Health(0)));
        assert_eq!(pool.component_name(), std::any::type_name::<Health>());
        assert_eq!(pool.component_count(), 1);
    }

    #[test]
    fn test_copy_requires_opt_in() {
        let mut pool = ComponentPool::<Health>::new();
        let a = pool.create(entity(1)).unwrap();
        let b = pool.create(entity(2)).unwrap();
        assert!(matches!(
            pool.copy(a, b),
            Err(EcsError::Unsupported { operation: "copy", .. })
        ));

        let mut pool = ComponentPool::<Health>::new().copyable();
        let a = pool.create(entity(1)).unwrap();
        let b = pool.create(entity(2)).unwrap();
        pool.get_mut(a).unwrap().0 = 42;
        pool.copy(a, b).unwrap();

        assert_eq!(pool.get(b), Some(&Health(42)));
        assert_eq!(pool.component(b).unwrap().entity(), entity(2));
    }

    #[test]
    fn test_reset_hook() {
        let mut pool = ComponentPool::<Health>::new()
            .with_reset(|health, full| health.0 = if full { 0 } else { health.0 / 2 });
        let id = pool.create(entity(1)).unwrap();
        pool.get_mut(id).unwrap().0 = 10;

        pool.reset(id, false).unwrap();
        assert_eq!(pool.get(id), Some(&Health(5)));
        pool.reset(id, true).unwrap();
        assert_eq!(pool.get(id), Some(&Health(0)));
    }

    #[test]
    fn test_dispose_waits_for_component_hook() {
        let mut pool = ComponentPool::<Locked>::new();
        let id = pool.create(entity(1)).unwrap();
        pool.destroy(id).unwrap();

        assert_eq!(pool.dispose_components().unwrap(), 0);
        assert_eq!(pool.pending_count(), 1);

        pool.get_mut(id).unwrap().released = true;
        assert_eq!(pool.dispose_components().unwrap(), 1);
        assert_eq!(pool.component_count(), 0);
    }

    #[test]
    fn test_iter_yields_entities() {
        let mut pool = ComponentPool::<Health>::new();
        for index in 1..=3 {
            let id = pool.create(entity(index)).unwrap();
            pool.get_mut(id).unwrap().0 = index * 10;
        }
        for (_, health) in pool.iter_mut() {
            health.0 += 1;
        }

        let collected: Vec<_> = pool.iter().map(|(e, h)| (e.index(), h.0)).collect();
        assert_eq!(collected, vec![(1, 11), (2, 21), (3, 31)]);
    }
}
