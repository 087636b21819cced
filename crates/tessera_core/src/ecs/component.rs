//! # Component System
//!
//! Components are plain data owned by a component kind. The registry only
//! ever sees them through type-erased handles and [`ErasedComponent`].

use std::any::{type_name, Any};
use std::fmt;
use std::hash::Hasher;
use std::ops::{Deref, DerefMut};

use siphasher::sip::SipHasher13;

use super::entity::Entity;
use crate::memory::{Disposable, Identifier};

/// Marker trait for component data.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Default)]
/// struct Position { x: f32, y: f32 }
///
/// impl Component for Position {}
/// ```
pub trait Component: Default + Send + 'static {
    /// Key in the world's name registry. Defaults to the full type path,
    /// so same-named types from different modules never collide. An empty
    /// name keeps the kind out of the registry.
    fn name() -> &'static str {
        type_name::<Self>()
    }

    /// Readiness hook run while the component waits in its pool's garbage.
    ///
    /// See [`Disposable::destroy`].
    fn destroy(&mut self) -> bool {
        true
    }
}

/// Strips the module path from a type name, keeping generic arguments.
/// Used for error messages.
pub(crate) fn short_type_name(full: &str) -> &str {
    let head = full.find('<').map_or(full, |generics| &full[..generics]);
    match head.rfind("::") {
        Some(separator) => &full[separator + 2..],
        None => full,
    }
}

/// Stable discriminator of a component type.
///
/// SipHash-1-3 of the Rust type name with fixed keys: identical across runs
/// of one build and cheap to sort, which keeps per-entity component arrays
/// ordered.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(u64);

impl ComponentTypeId {
    const KEY0: u64 = 0x7465_7373_6572_6121;
    const KEY1: u64 = 0x636f_6d70_6f6e_656e;

    /// Returns the discriminator of `C`.
    #[must_use]
    pub fn of<C: 'static>() -> Self {
        Self::from_name(type_name::<C>())
    }

    /// Hashes an arbitrary type name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut hasher = SipHasher13::new_with_keys(Self::KEY0, Self::KEY1);
        hasher.write(name.as_bytes());
        Self(hasher.finish())
    }

    /// Returns the raw hash.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({:016x})", self.0)
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Type-erased item type used in component identifiers crossing the kind boundary.
///
/// `Identifier<ComponentBase>` is cast back to the concrete item type by the
/// kind that issued it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComponentBase;

/// Pool item of a [`ComponentPool`](super::ComponentPool): the component data
/// plus the back-reference to its entity.
#[derive(Clone, Debug, Default)]
pub struct Attached<C> {
    entity: Identifier<Entity>,
    component: C,
}

impl<C> Attached<C> {
    /// Wraps component data that is not attached to any entity yet.
    #[must_use]
    pub fn new(component: C) -> Self {
        Self {
            entity: Identifier::NULL,
            component,
        }
    }

    pub(crate) fn attach(entity: Identifier<Entity>, component: C) -> Self {
        Self { entity, component }
    }

    /// Returns the owning entity.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Identifier<Entity> {
        self.entity
    }

    /// Returns the component data.
    #[inline]
    #[must_use]
    pub fn get(&self) -> &C {
        &self.component
    }

    /// Returns the component data mutably.
    #[inline]
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.component
    }

    /// Unwraps the component data.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.component
    }
}

impl<C> Deref for Attached<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.component
    }
}

impl<C> DerefMut for Attached<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.component
    }
}

impl<C: Component> Disposable for Attached<C> {
    fn destroy(&mut self) -> bool {
        self.component.destroy()
    }
}

/// Object-safe access to a component stored by any kind.
pub trait ErasedComponent: Any + Send {
    /// Returns the owning entity.
    fn entity(&self) -> Identifier<Entity>;

    /// Stamps the owning entity. Called by the registry when attaching.
    fn set_entity(&mut self, entity: Identifier<Entity>);

    /// Upcast for downcasting to the concrete item type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete item type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedComponent for Attached<C> {
    fn entity(&self) -> Identifier<Entity> {
        self.entity
    }

    fn set_entity(&mut self, entity: Identifier<Entity>) {
        self.entity = entity;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn ErasedComponent {
    /// Downcasts to the data of component type `C`.
    #[must_use]
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<Attached<C>>().map(Attached::get)
    }

    /// Mutable counterpart of [`downcast_ref`](Self::downcast_ref).
    pub fn downcast_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.as_any_mut()
            .downcast_mut::<Attached<C>>()
            .map(Attached::get_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Position {
        x: f32,
    }

    impl Component for Position {}

    #[derive(Default)]
    struct Named;

    impl Component for Named {
        fn name() -> &'static str {
            "Main Camera"
        }
    }

    #[test]
    fn test_type_id_is_stable() {
        assert_eq!(ComponentTypeId::of::<Position>(), ComponentTypeId::of::<Position>());
        assert_ne!(ComponentTypeId::of::<Position>(), ComponentTypeId::of::<Named>());
        assert_eq!(
            ComponentTypeId::of::<Position>(),
            ComponentTypeId::from_name(type_name::<Position>())
        );
    }

    #[test]
    fn test_component_names() {
        assert_eq!(Position::name(), type_name::<Position>());
        assert_eq!(short_type_name(Position::name()), "Position");
        assert_eq!(Named::name(), "Main Camera");
        assert_eq!(short_type_name("alloc::vec::Vec<core::primitive::u8>"), "Vec<core::primitive::u8>");
        assert_eq!(short_type_name("u32"), "u32");
    }

    #[test]
    fn test_erased_downcast() {
        let mut attached = Attached::new(Position { x: 1.5 });
        let erased: &mut dyn ErasedComponent = &mut attached;
        erased.set_entity(Identifier::new(4, 0));
        erased.downcast_mut::<Position>().unwrap().x = 2.5;

        assert!(erased.downcast_ref::<Named>().is_none());
        assert_eq!(attached.entity().index(), 4);
        assert!((attached.x - 2.5).abs() < f32::EPSILON);
    }
}
