//! # Entity Records
//!
//! An entity is just the list of components attached to it. The list is kept
//! sorted by component type so lookups are a binary search and iteration
//! order is deterministic.

use super::component::{ComponentBase, ComponentTypeId};
use crate::memory::Identifier;

/// One attached component: its type, the kind that owns it and its handle
/// in that kind's pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentData {
    /// Component type discriminator.
    pub component_type: ComponentTypeId,
    /// Handle in the owning kind's pool.
    pub component: Identifier<ComponentBase>,
    pub(crate) kind: usize,
}

impl ComponentData {
    /// Registry slot of the owning kind.
    #[inline]
    #[must_use]
    pub const fn kind_slot(&self) -> usize {
        self.kind
    }
}

/// Entity record stored in the world's entity pool.
#[derive(Clone, Debug, Default)]
pub struct Entity {
    components: Vec<ComponentData>,
}

impl Entity {
    /// Attached components, sorted by type.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ComponentData] {
        &self.components
    }

    /// Number of attached components, tombstoned ones included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no component is attached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Finds the component of the given type.
    #[must_use]
    pub fn find(&self, component_type: ComponentTypeId) -> Option<&ComponentData> {
        self.position(component_type)
            .ok()
            .map(|index| &self.components[index])
    }

    fn position(&self, component_type: ComponentTypeId) -> Result<usize, usize> {
        self.components
            .binary_search_by(|data| data.component_type.cmp(&component_type))
    }

    /// Inserts at the sorted position. Returns false if the type is present.
    pub(crate) fn insert(&mut self, data: ComponentData) -> bool {
        match self.position(data.component_type) {
            Ok(_) => false,
            Err(index) => {
                self.components.insert(index, data);
                true
            }
        }
    }

    /// Removes the component of the given type, keeping the order of the rest.
    pub(crate) fn remove(&mut self, component_type: ComponentTypeId) -> Option<ComponentData> {
        self.position(component_type)
            .ok()
            .map(|index| self.components.remove(index))
    }

    pub(crate) fn take_components(&mut self) -> Vec<ComponentData> {
        std::mem::take(&mut self.components)
    }
}
