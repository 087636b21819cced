//! # ECS World
//!
//! The registry of component kinds and the coordinator of entities.
//!
//! Every structural change is deferred: destroying an entity or removing a
//! component only queues it, and [`World::dispose`] applies the queue at a
//! point the caller chooses (typically the end of a tick). Until then all
//! handles taken during the tick stay readable.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut world = World::new();
//! world.register::<Position>()?;
//!
//! let entity = world.create_entity()?;
//! world.add::<Position>(entity)?.x = 4.0;
//!
//! world.remove::<Position>(entity)?;
//! assert!(!world.has::<Position>(entity));
//! world.dispose()?;
//! ```

use std::any::type_name;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::component::{short_type_name, Component, ComponentBase, ComponentTypeId, ErasedComponent};
use super::entity::{ComponentData, Entity};
use super::kind::ComponentKind;
use super::storage::ComponentPool;
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};
use crate::memory::{Identifier, LinearPool, ResetItems};

type KindSlot = Option<Box<dyn ComponentKind>>;

/// Counts from one [`World::dispose`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisposeStats {
    /// Tombstoned components detached from their entities.
    pub removed_components: usize,
    /// Entity slots reclaimed.
    pub reclaimed_entities: usize,
    /// Component slots reclaimed across all kinds.
    pub reclaimed_components: usize,
}

/// Entity/component registry.
pub struct World {
    entities: LinearPool<Entity, ResetItems>,
    kinds: Vec<KindSlot>,
    kind_types: HashMap<ComponentTypeId, usize>,
    kind_names: HashMap<String, usize>,
    /// Removed components waiting for dispose, ordered by type then entity.
    garbage_components: BTreeSet<(ComponentTypeId, Identifier<Entity>)>,
    config: WorldConfig,
}

impl World {
    /// Creates an empty world with default sizing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world sized by `config`, after validating it.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if a capacity is zero.
    pub fn try_with_config(config: WorldConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Creates an empty world sized by `config`.
    ///
    /// The config is not validated: a zero capacity is treated as one. Use
    /// [`try_with_config`](Self::try_with_config) to reject it instead.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            entities: LinearPool::with_config(config.entity_pool()),
            kinds: Vec::new(),
            kind_types: HashMap::new(),
            kind_names: HashMap::new(),
            garbage_components: BTreeSet::new(),
            config,
        }
    }

    /// Returns the world configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // =========================================================================
    // Kind registry
    // =========================================================================

    /// Registers a component kind.
    ///
    /// # Errors
    ///
    /// - [`EcsError::KindAlreadyRegistered`] if another kind owns the type
    /// - [`EcsError::KindNameTaken`] if another kind uses the same non-empty name
    pub fn register_kind(&mut self, kind: Box<dyn ComponentKind>) -> EcsResult<()> {
        let component_type = kind.component_type();
        let name = kind.component_name().to_string();

        if self.kind_types.contains_key(&component_type) {
            return Err(EcsError::KindAlreadyRegistered {
                component: short_type_name(&name).to_string(),
            });
        }
        if !name.is_empty() && self.kind_names.contains_key(&name) {
            return Err(EcsError::KindNameTaken { name });
        }

        let slot = if let Some(slot) = self.kinds.iter().position(Option::is_none) {
            self.kinds[slot] = Some(kind);
            slot
        } else {
            self.kinds.push(Some(kind));
            self.kinds.len() - 1
        };

        self.kind_types.insert(component_type, slot);
        tracing::debug!(component = %name, %component_type, slot, "registered component kind");
        if !name.is_empty() {
            self.kind_names.insert(name, slot);
        }
        Ok(())
    }

    /// Registers a default [`ComponentPool`] for `C`, sized from the world config.
    ///
    /// # Errors
    ///
    /// See [`register_kind`](Self::register_kind).
    pub fn register<C: Component>(&mut self) -> EcsResult<()> {
        let pool = self.component_pool::<C>();
        self.register_pool(pool)
    }

    /// Registers a configured [`ComponentPool`].
    ///
    /// # Errors
    ///
    /// See [`register_kind`](Self::register_kind).
    pub fn register_pool<C: Component>(&mut self, pool: ComponentPool<C>) -> EcsResult<()> {
        self.register_kind(Box::new(pool))
    }

    /// Builds an unregistered [`ComponentPool`] sized from the world config,
    /// ready for builder calls such as [`ComponentPool::copyable`].
    #[must_use]
    pub fn component_pool<C: Component>(&self) -> ComponentPool<C> {
        ComponentPool::with_config(self.config.component_pool())
    }

    /// Unregisters the kind owning `component_type` and hands it back.
    ///
    /// # Errors
    ///
    /// - [`EcsError::KindNotRegistered`] if no kind owns the type
    /// - [`EcsError::KindInUse`] if any entity still carries the component
    pub fn unregister_kind(
        &mut self,
        component_type: ComponentTypeId,
    ) -> EcsResult<Box<dyn ComponentKind>> {
        let slot = self.kind_slot(component_type)?;

        let count = self
            .entities
            .iter()
            .filter(|(_, record)| record.find(component_type).is_some())
            .count();
        if count > 0 {
            return Err(EcsError::KindInUse {
                component: self.label(component_type),
                count,
            });
        }

        let kind = self.kinds[slot]
            .take()
            .ok_or_else(|| not_registered(component_type))?;
        self.kind_types.remove(&component_type);
        self.kind_names.remove(kind.component_name());

        tracing::debug!(component = kind.component_name(), %component_type, "unregistered component kind");
        Ok(kind)
    }

    /// Like [`unregister_kind`](Self::unregister_kind), returning `None` if
    /// the type is not registered or still in use.
    pub fn try_unregister_kind(
        &mut self,
        component_type: ComponentTypeId,
    ) -> Option<Box<dyn ComponentKind>> {
        self.unregister_kind(component_type).ok()
    }

    /// Returns true if a kind owns `component_type`.
    #[must_use]
    pub fn has_kind(&self, component_type: ComponentTypeId) -> bool {
        self.kind_types.contains_key(&component_type)
    }

    /// Returns the kind owning `component_type`.
    ///
    /// # Errors
    ///
    /// [`EcsError::KindNotRegistered`] if no kind owns the type.
    pub fn kind(&self, component_type: ComponentTypeId) -> EcsResult<&dyn ComponentKind> {
        self.try_kind(component_type)
            .ok_or_else(|| not_registered(component_type))
    }

    /// Returns the kind owning `component_type`, if any.
    #[must_use]
    pub fn try_kind(&self, component_type: ComponentTypeId) -> Option<&dyn ComponentKind> {
        let slot = *self.kind_types.get(&component_type)?;
        self.kinds.get(slot).and_then(Option::as_deref)
    }

    /// Returns the kind owning `component_type` mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::KindNotRegistered`] if no kind owns the type.
    pub fn kind_mut(&mut self, component_type: ComponentTypeId) -> EcsResult<&mut dyn ComponentKind> {
        let slot = self.kind_slot(component_type)?;
        kind_at_mut(&mut self.kinds, slot).ok_or_else(|| not_registered(component_type))
    }

    /// Looks a kind up by component name.
    #[must_use]
    pub fn kind_by_name(&self, name: &str) -> Option<&dyn ComponentKind> {
        let slot = *self.kind_names.get(name)?;
        self.kinds.get(slot).and_then(Option::as_deref)
    }

    /// Iterates registered kinds in registration slot order.
    pub fn kinds(&self) -> impl Iterator<Item = &dyn ComponentKind> {
        self.kinds.iter().filter_map(Option::as_deref)
    }

    /// Returns the [`ComponentPool`] registered for `C`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::KindNotRegistered`] if `C` has no kind
    /// - [`EcsError::TypeMismatch`] if the kind is not a `ComponentPool<C>`
    pub fn storage<C: Component>(&self) -> EcsResult<&ComponentPool<C>> {
        let kind = self
            .kind(ComponentTypeId::of::<C>())
            .map_err(named::<C>)?;
        kind.as_any()
            .downcast_ref::<ComponentPool<C>>()
            .ok_or_else(storage_mismatch::<C>)
    }

    /// Mutable counterpart of [`storage`](Self::storage).
    ///
    /// # Errors
    ///
    /// See [`storage`](Self::storage).
    pub fn storage_mut<C: Component>(&mut self) -> EcsResult<&mut ComponentPool<C>> {
        let kind = self
            .kind_mut(ComponentTypeId::of::<C>())
            .map_err(named::<C>)?;
        kind.as_any_mut()
            .downcast_mut::<ComponentPool<C>>()
            .ok_or_else(storage_mismatch::<C>)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity without components.
    ///
    /// # Errors
    ///
    /// Pool errors if the entity pool is poisoned.
    pub fn create_entity(&mut self) -> EcsResult<Identifier<Entity>> {
        Ok(self.entities.create_default()?)
    }

    /// Queues an entity for destruction. Its components are destroyed by
    /// the next dispose pass; until then it stays readable.
    ///
    /// # Errors
    ///
    /// Pool errors, [`PoolError::AlreadyDestroyed`](crate::PoolError::AlreadyDestroyed)
    /// on a second destroy.
    pub fn destroy_entity(&mut self, entity: Identifier<Entity>) -> EcsResult<()> {
        self.entities.destroy(entity)?;
        Ok(())
    }

    /// Returns true if the entity is allocated and not queued for destruction.
    #[must_use]
    pub fn is_alive(&self, entity: Identifier<Entity>) -> bool {
        self.entities.is_live(entity)
    }

    /// Number of allocated entities, queued ones included.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the entity pool.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &LinearPool<Entity, ResetItems> {
        &self.entities
    }

    /// Number of components attached to `entity`, removed-but-undisposed
    /// ones included. Zero for unknown entities.
    #[must_use]
    pub fn component_count(&self, entity: Identifier<Entity>) -> usize {
        self.entities.try_get(entity).map_or(0, Entity::len)
    }

    /// Components attached to `entity`, sorted by type.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] if the entity is not allocated.
    pub fn components(&self, entity: Identifier<Entity>) -> EcsResult<&[ComponentData]> {
        Ok(self.entity(entity)?.components())
    }

    fn entity(&self, entity: Identifier<Entity>) -> EcsResult<&Entity> {
        self.entities
            .try_get(entity)
            .ok_or(EcsError::EntityNotAlive {
                entity: entity.index(),
            })
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a new component of `component_type` to `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::KindNotRegistered`] if no kind owns the type
    /// - [`EcsError::EntityNotAlive`] if the entity is not live
    /// - [`EcsError::ComponentAlreadyAttached`] if the entity carries the type,
    ///   including a removed component that has not been disposed yet
    pub fn add_by_id(
        &mut self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> EcsResult<Identifier<ComponentBase>> {
        let slot = self.kind_slot(component_type)?;
        if !self.entities.is_live(entity) {
            return Err(EcsError::EntityNotAlive {
                entity: entity.index(),
            });
        }
        if self.entity(entity)?.find(component_type).is_some() {
            return Err(EcsError::ComponentAlreadyAttached {
                component: self.label(component_type),
                entity: entity.index(),
            });
        }

        let kind = kind_at_mut(&mut self.kinds, slot).ok_or_else(|| not_registered(component_type))?;
        let component = kind.create(entity)?;
        if let Some(erased) = kind.component_mut(component) {
            erased.set_entity(entity);
        }

        self.entities.get_mut(entity).insert(ComponentData {
            component_type,
            component,
            kind: slot,
        });
        Ok(component)
    }

    /// Attaches a new `C` to `entity` and returns it for initialization.
    ///
    /// If the owning kind stores something other than `C`, the new component
    /// is detached and destroyed again before the error is returned.
    ///
    /// # Errors
    ///
    /// See [`add_by_id`](Self::add_by_id); [`EcsError::TypeMismatch`] if the
    /// kind's components do not downcast to `C`.
    pub fn add<C: Component>(&mut self, entity: Identifier<Entity>) -> EcsResult<&mut C> {
        let component_type = ComponentTypeId::of::<C>();
        let component = self
            .add_by_id(entity, component_type)
            .map_err(named::<C>)?;

        let fits = self
            .get_by_id(entity, component_type)
            .is_ok_and(|erased| erased.downcast_ref::<C>().is_some());
        if !fits {
            self.detach(entity, component_type, component)?;
            return Err(type_mismatch::<C>());
        }
        self.get_mut::<C>(entity)
    }

    /// Undoes an [`add_by_id`](Self::add_by_id) that has not been observed yet.
    fn detach(
        &mut self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
        component: Identifier<ComponentBase>,
    ) -> EcsResult<()> {
        let slot = self.kind_slot(component_type)?;
        self.entities.get_mut(entity).remove(component_type);
        kind_at_mut(&mut self.kinds, slot)
            .ok_or_else(|| not_registered(component_type))?
            .destroy(component)
    }

    /// Removes a component. The data stays readable through the strict
    /// accessors until the next dispose pass; [`has_by_id`](Self::has_by_id)
    /// and the `try_` accessors report it absent immediately.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityNotAlive`] if the entity is not allocated
    /// - [`EcsError::ComponentNotAttached`] if the entity does not carry the type
    /// - [`EcsError::ComponentAlreadyRemoved`] on a second remove before dispose
    pub fn remove_by_id(
        &mut self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> EcsResult<()> {
        self.component_data(entity, component_type)?;
        if !self.garbage_components.insert((component_type, entity)) {
            return Err(EcsError::ComponentAlreadyRemoved {
                component: self.label(component_type),
                entity: entity.index(),
            });
        }
        Ok(())
    }

    /// Typed [`remove_by_id`](Self::remove_by_id).
    ///
    /// # Errors
    ///
    /// See [`remove_by_id`](Self::remove_by_id).
    pub fn remove<C: Component>(&mut self, entity: Identifier<Entity>) -> EcsResult<()> {
        self.remove_by_id(entity, ComponentTypeId::of::<C>())
            .map_err(named::<C>)
    }

    /// Returns true if `entity` carries `component_type` and it has not been removed.
    #[must_use]
    pub fn has_by_id(&self, entity: Identifier<Entity>, component_type: ComponentTypeId) -> bool {
        self.entities
            .try_get(entity)
            .is_some_and(|record| record.find(component_type).is_some())
            && !self.is_removed(entity, component_type)
    }

    /// Typed [`has_by_id`](Self::has_by_id).
    #[must_use]
    pub fn has<C: Component>(&self, entity: Identifier<Entity>) -> bool {
        self.has_by_id(entity, ComponentTypeId::of::<C>())
    }

    /// Returns true if the component is removed and waiting for dispose.
    #[must_use]
    pub fn is_removed(&self, entity: Identifier<Entity>, component_type: ComponentTypeId) -> bool {
        self.garbage_components.contains(&(component_type, entity))
    }

    /// Returns the component handle, removed-but-undisposed ones included.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] or [`EcsError::ComponentNotAttached`].
    pub fn get_id(
        &self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> EcsResult<Identifier<ComponentBase>> {
        Ok(self.component_data(entity, component_type)?.component)
    }

    /// Returns the component handle, or `None` if absent or removed.
    #[must_use]
    pub fn try_get_id(
        &self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> Option<Identifier<ComponentBase>> {
        if self.is_removed(entity, component_type) {
            return None;
        }
        self.get_id(entity, component_type).ok()
    }

    /// Resolves a component, removed-but-undisposed ones included.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`] or [`EcsError::ComponentNotAttached`].
    pub fn get_by_id(
        &self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> EcsResult<&dyn ErasedComponent> {
        let data = self.component_data(entity, component_type)?;
        self.kinds
            .get(data.kind)
            .and_then(Option::as_deref)
            .and_then(|kind| kind.component(data.component))
            .ok_or_else(|| stale_component(entity, component_type))
    }

    /// Mutable counterpart of [`get_by_id`](Self::get_by_id).
    ///
    /// # Errors
    ///
    /// See [`get_by_id`](Self::get_by_id).
    pub fn get_mut_by_id(
        &mut self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> EcsResult<&mut dyn ErasedComponent> {
        let data = *self.component_data(entity, component_type)?;
        kind_at_mut(&mut self.kinds, data.kind)
            .and_then(|kind| kind.component_mut(data.component))
            .ok_or_else(|| stale_component(entity, component_type))
    }

    /// Resolves a component, or `None` if absent or removed.
    #[must_use]
    pub fn try_get_by_id(
        &self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> Option<&dyn ErasedComponent> {
        if self.is_removed(entity, component_type) {
            return None;
        }
        self.get_by_id(entity, component_type).ok()
    }

    /// Mutable counterpart of [`try_get_by_id`](Self::try_get_by_id).
    pub fn try_get_mut_by_id(
        &mut self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> Option<&mut dyn ErasedComponent> {
        if self.is_removed(entity, component_type) {
            return None;
        }
        self.get_mut_by_id(entity, component_type).ok()
    }

    /// Typed [`get_by_id`](Self::get_by_id).
    ///
    /// # Errors
    ///
    /// See [`get_by_id`](Self::get_by_id); [`EcsError::TypeMismatch`] if the
    /// kind does not store `C`.
    pub fn get<C: Component>(&self, entity: Identifier<Entity>) -> EcsResult<&C> {
        self.get_by_id(entity, ComponentTypeId::of::<C>())
            .map_err(named::<C>)?
            .downcast_ref::<C>()
            .ok_or_else(type_mismatch::<C>)
    }

    /// Typed [`get_mut_by_id`](Self::get_mut_by_id).
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_mut<C: Component>(&mut self, entity: Identifier<Entity>) -> EcsResult<&mut C> {
        self.get_mut_by_id(entity, ComponentTypeId::of::<C>())
            .map_err(named::<C>)?
            .downcast_mut::<C>()
            .ok_or_else(type_mismatch::<C>)
    }

    /// Typed [`try_get_by_id`](Self::try_get_by_id).
    #[must_use]
    pub fn try_get<C: Component>(&self, entity: Identifier<Entity>) -> Option<&C> {
        self.try_get_by_id(entity, ComponentTypeId::of::<C>())?
            .downcast_ref::<C>()
    }

    /// Typed [`try_get_mut_by_id`](Self::try_get_mut_by_id).
    pub fn try_get_mut<C: Component>(&mut self, entity: Identifier<Entity>) -> Option<&mut C> {
        self.try_get_mut_by_id(entity, ComponentTypeId::of::<C>())?
            .downcast_mut::<C>()
    }

    /// Copies one component's data between entities that both carry the type.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotAttached`] if the source lacks the type
    /// - [`EcsError::DestinationNotAttached`] if the destination lacks it
    /// - [`EcsError::Unsupported`] if the kind cannot copy
    pub fn copy_by_id(
        &mut self,
        source: Identifier<Entity>,
        destination: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> EcsResult<()> {
        let from = self.component_data(source, component_type)?.component;
        let Some(to) = self.entity(destination)?.find(component_type).map(|d| d.component) else {
            return Err(EcsError::DestinationNotAttached {
                component: self.label(component_type),
                entity: destination.index(),
            });
        };
        self.kind_mut(component_type)?.copy(from, to)
    }

    /// Typed [`copy_by_id`](Self::copy_by_id).
    ///
    /// # Errors
    ///
    /// See [`copy_by_id`](Self::copy_by_id).
    pub fn copy<C: Component>(
        &mut self,
        source: Identifier<Entity>,
        destination: Identifier<Entity>,
    ) -> EcsResult<()> {
        self.copy_by_id(source, destination, ComponentTypeId::of::<C>())
            .map_err(named::<C>)
    }

    /// Resets a component through its kind's reset hook.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotAttached`], or [`EcsError::Unsupported`] if the
    /// kind cannot reset.
    pub fn reset_by_id(
        &mut self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
        full: bool,
    ) -> EcsResult<()> {
        let component = self.component_data(entity, component_type)?.component;
        self.kind_mut(component_type)?.reset(component, full)
    }

    /// Typed [`reset_by_id`](Self::reset_by_id).
    ///
    /// # Errors
    ///
    /// See [`reset_by_id`](Self::reset_by_id).
    pub fn reset<C: Component>(&mut self, entity: Identifier<Entity>, full: bool) -> EcsResult<()> {
        self.reset_by_id(entity, ComponentTypeId::of::<C>(), full)
            .map_err(named::<C>)
    }

    /// Creates a new entity carrying a copy of every component of `entity`.
    ///
    /// Components are duplicated in type order, so the copy's component list
    /// lines up with the source's. Removed-but-undisposed components are
    /// skipped. If a kind cannot copy, the partial duplicate is queued for
    /// destruction and the error returned.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotAlive`], [`EcsError::Unsupported`], or pool errors.
    pub fn duplicate(&mut self, entity: Identifier<Entity>) -> EcsResult<Identifier<Entity>> {
        let sources: Vec<ComponentData> = self
            .entity(entity)?
            .components()
            .iter()
            .filter(|data| !self.is_removed(entity, data.component_type))
            .copied()
            .collect();

        let duplicate = self.entities.create_default()?;
        for source in sources {
            if let Err(err) = self.duplicate_component(duplicate, source) {
                self.entities.destroy(duplicate)?;
                return Err(err);
            }
        }
        Ok(duplicate)
    }

    fn duplicate_component(
        &mut self,
        duplicate: Identifier<Entity>,
        source: ComponentData,
    ) -> EcsResult<()> {
        let kind = kind_at_mut(&mut self.kinds, source.kind)
            .ok_or_else(|| not_registered(source.component_type))?;

        let component = kind.create(duplicate)?;
        if let Some(erased) = kind.component_mut(component) {
            erased.set_entity(duplicate);
        }
        if let Err(err) = kind.copy(source.component, component) {
            kind.destroy(component)?;
            return Err(err);
        }

        self.entities.get_mut(duplicate).insert(ComponentData {
            component,
            ..source
        });
        Ok(())
    }

    // =========================================================================
    // Dispose
    // =========================================================================

    /// Detaches every removed component and queues it in its kind's pool.
    ///
    /// Returns the number of components detached.
    ///
    /// # Errors
    ///
    /// The first error reported by a kind; the remaining components are
    /// still processed.
    ///
    /// # Panics
    ///
    /// Panics if a removed component is no longer attached to its entity,
    /// which means the registry's bookkeeping is corrupted.
    pub fn dispose_garbage_components(&mut self) -> EcsResult<usize> {
        if self.garbage_components.is_empty() {
            return Ok(0);
        }

        let garbage = std::mem::take(&mut self.garbage_components);
        let mut result = Ok(garbage.len());
        for (component_type, entity) in garbage {
            let data = self
                .entities
                .try_get_mut(entity)
                .and_then(|record| record.remove(component_type));
            let Some(data) = data else {
                panic!(
                    "removed component {component_type} is not attached to entity {}",
                    entity.index()
                );
            };

            if let Some(kind) = kind_at_mut(&mut self.kinds, data.kind) {
                if let Err(err) = kind.destroy(data.component) {
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }
        result
    }

    /// Reclaims destroyed entities, queuing their remaining components in
    /// their kinds' pools. Returns the number of entities reclaimed.
    ///
    /// # Errors
    ///
    /// Pool errors; the first error reported by a kind.
    pub fn dispose_entities(&mut self) -> EcsResult<usize> {
        let kinds = &mut self.kinds;
        let tombstones = &mut self.garbage_components;
        let mut failure = None;

        let reclaimed = self.entities.dispose_with(|entity, record| {
            for data in record.take_components() {
                tombstones.remove(&(data.component_type, entity));
                if let Some(kind) = kind_at_mut(kinds, data.kind) {
                    if let Err(err) = kind.destroy(data.component) {
                        if failure.is_none() {
                            failure = Some(err);
                        }
                    }
                }
            }
            true
        })?;

        match failure {
            Some(err) => Err(err),
            None => Ok(reclaimed),
        }
    }

    /// Runs a dispose pass on every kind's pool. Returns components reclaimed.
    ///
    /// # Errors
    ///
    /// The first error reported by a kind.
    pub fn dispose_kind_components(&mut self) -> EcsResult<usize> {
        let mut reclaimed = 0;
        for kind in self.kinds.iter_mut().flatten() {
            reclaimed += kind.dispose_components()?;
        }
        Ok(reclaimed)
    }

    /// Applies every deferred change: removed components, then destroyed
    /// entities, then each kind's own pool.
    ///
    /// Items whose destroy hook is not ready stay queued for the next pass.
    ///
    /// # Errors
    ///
    /// The first error of any stage; later stages do not run.
    pub fn dispose(&mut self) -> EcsResult<DisposeStats> {
        let stats = DisposeStats {
            removed_components: self.dispose_garbage_components()?,
            reclaimed_entities: self.dispose_entities()?,
            reclaimed_components: self.dispose_kind_components()?,
        };

        let deferred = self.deferred_count();
        tracing::trace!(
            removed = stats.removed_components,
            entities = stats.reclaimed_entities,
            components = stats.reclaimed_components,
            deferred,
            "world dispose pass"
        );
        if deferred > self.config.deferred_warn_threshold {
            tracing::warn!(
                deferred,
                threshold = self.config.deferred_warn_threshold,
                "dispose left items waiting on their destroy hooks"
            );
        }
        Ok(stats)
    }

    /// Entities and components queued for destruction but not reclaimed yet.
    #[must_use]
    pub fn deferred_count(&self) -> usize {
        self.entities.garbage().len()
            + self
                .kinds
                .iter()
                .flatten()
                .map(|kind| kind.pending_count())
                .sum::<usize>()
    }

    /// Drops every entity and component. Kinds stay registered.
    ///
    /// # Errors
    ///
    /// Pool errors from the entity pool or any kind.
    pub fn clear(&mut self) -> EcsResult<()> {
        self.garbage_components.clear();
        self.entities.clear(false)?;
        for kind in self.kinds.iter_mut().flatten() {
            kind.clear_components()?;
        }
        tracing::debug!(kinds = self.kind_types.len(), "world cleared");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn kind_slot(&self, component_type: ComponentTypeId) -> EcsResult<usize> {
        self.kind_types
            .get(&component_type)
            .copied()
            .ok_or_else(|| not_registered(component_type))
    }

    fn component_data(
        &self,
        entity: Identifier<Entity>,
        component_type: ComponentTypeId,
    ) -> EcsResult<&ComponentData> {
        self.entity(entity)?
            .find(component_type)
            .ok_or_else(|| EcsError::ComponentNotAttached {
                component: self.label(component_type),
                entity: entity.index(),
            })
    }

    /// Component name for messages, the hashed type if the kind is unnamed.
    fn label(&self, component_type: ComponentTypeId) -> String {
        match self.try_kind(component_type) {
            Some(kind) if !kind.component_name().is_empty() => {
                short_type_name(kind.component_name()).to_string()
            }
            _ => component_type.to_string(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("kinds", &self.kind_types.len())
            .field("garbage_components", &self.garbage_components.len())
            .field("config", &self.config)
            .finish()
    }
}

fn kind_at_mut(kinds: &mut [KindSlot], slot: usize) -> Option<&mut dyn ComponentKind> {
    match kinds.get_mut(slot) {
        Some(Some(kind)) => Some(kind.as_mut()),
        _ => None,
    }
}

fn not_registered(component_type: ComponentTypeId) -> EcsError {
    EcsError::KindNotRegistered {
        type_name: component_type.to_string(),
    }
}

fn stale_component(entity: Identifier<Entity>, component_type: ComponentTypeId) -> EcsError {
    EcsError::ComponentNotAttached {
        component: component_type.to_string(),
        entity: entity.index(),
    }
}

/// Replaces the hashed type in a registration error with the Rust name of `C`.
fn named<C: Component>(err: EcsError) -> EcsError {
    match err {
        EcsError::KindNotRegistered { .. } => EcsError::KindNotRegistered {
            type_name: label::<C>(),
        },
        other => other,
    }
}

fn label<C: Component>() -> String {
    short_type_name(C::name()).to_string()
}

fn type_mismatch<C: Component>() -> EcsError {
    EcsError::TypeMismatch {
        component: label::<C>(),
        requested: type_name::<C>(),
    }
}

fn storage_mismatch<C: Component>() -> EcsError {
    EcsError::TypeMismatch {
        component: label::<C>(),
        requested: type_name::<ComponentPool<C>>(),
    }
}
