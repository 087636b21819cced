//! # World Lifecycle Tests
//!
//! Deferred component removal, entity destruction, duplication and the
//! component kind contract, exercised through `World`.

use std::any::Any;

use tessera_core::{
    Attached, Component, ComponentBase, ComponentKind, ComponentTypeId, EcsError, EcsResult,
    Entity, ErasedComponent, Identifier, LinearPool, PoolError, World,
};

#[derive(Clone, Debug, Default, PartialEq)]
struct Position {
    x: i32,
    y: i32,
}

impl Component for Position {}

#[derive(Clone, Debug, Default, PartialEq)]
struct Velocity {
    dx: i32,
}

impl Component for Velocity {}

#[derive(Clone, Debug, Default, PartialEq)]
struct Score(u32);

impl Component for Score {}

#[derive(Clone, Debug, Default, PartialEq)]
struct Label(String);

impl Component for Label {}

/// Not copyable: its pool is registered without a copy routine.
#[derive(Debug, Default)]
struct Socket {
    open: bool,
}

impl Component for Socket {
    fn destroy(&mut self) -> bool {
        !self.open
    }
}

fn world() -> World {
    let mut world = World::new();
    let position = world.component_pool::<Position>().copyable();
    let velocity = world.component_pool::<Velocity>().copyable();
    let score = world.component_pool::<Score>().copyable();
    let label = world.component_pool::<Label>().copyable();

    world.register_pool(position).unwrap();
    world.register_pool(velocity).unwrap();
    world.register_pool(score).unwrap();
    world.register_pool(label).unwrap();
    world.register::<Socket>().unwrap();
    world
}

#[test]
fn removed_component_stays_readable_until_dispose() {
    let mut world = world();
    let entity = world.create_entity().unwrap();
    *world.add::<Position>(entity).unwrap() = Position { x: 1, y: 2 };
    world.add::<Velocity>(entity).unwrap().dx = 3;

    world.remove::<Velocity>(entity).unwrap();
    assert!(!world.has::<Velocity>(entity));
    assert!(world.has::<Position>(entity));
    assert_eq!(world.get::<Velocity>(entity).unwrap().dx, 3);
    assert!(world.try_get::<Velocity>(entity).is_none());
    assert!(world
        .try_get_id(entity, ComponentTypeId::of::<Velocity>())
        .is_none());

    assert_eq!(world.dispose_garbage_components().unwrap(), 1);
    assert!(!world.has::<Velocity>(entity));
    assert_eq!(
        world.get::<Velocity>(entity),
        Err(EcsError::ComponentNotAttached {
            component: "Velocity".to_string(),
            entity: entity.index(),
        })
    );
    assert_eq!(world.get::<Position>(entity).unwrap(), &Position { x: 1, y: 2 });
}

#[test]
fn second_remove_and_re_add() {
    let mut world = world();
    let entity = world.create_entity().unwrap();
    world.add::<Score>(entity).unwrap();

    world.remove::<Score>(entity).unwrap();
    assert!(matches!(
        world.remove::<Score>(entity),
        Err(EcsError::ComponentAlreadyRemoved { .. })
    ));
    assert!(matches!(
        world.add::<Score>(entity),
        Err(EcsError::ComponentAlreadyAttached { .. })
    ));
    assert!(world.is_removed(entity, ComponentTypeId::of::<Score>()));

    world.dispose().unwrap();
    assert!(matches!(
        world.remove::<Score>(entity),
        Err(EcsError::ComponentNotAttached { .. })
    ));
    world.add::<Score>(entity).unwrap().0 = 7;
    assert_eq!(world.get::<Score>(entity), Ok(&Score(7)));
}

#[test]
fn duplicate_yields_independent_copies() {
    let mut world = world();
    let source = world.create_entity().unwrap();
    world.add::<Score>(source).unwrap().0 = 5;
    world.add::<Label>(source).unwrap().0 = "x".to_string();

    let copy = world.duplicate(source).unwrap();
    assert_ne!(copy, source);
    assert_eq!(world.get::<Score>(copy), Ok(&Score(5)));
    assert_eq!(world.get::<Label>(copy), Ok(&Label("x".to_string())));

    world.get_mut::<Score>(copy).unwrap().0 = 6;
    assert_eq!(world.get::<Score>(source), Ok(&Score(5)));
    assert_eq!(world.get::<Score>(copy), Ok(&Score(6)));

    let source_types: Vec<_> = world
        .components(source)
        .unwrap()
        .iter()
        .map(|data| data.component_type)
        .collect();
    let copy_types: Vec<_> = world
        .components(copy)
        .unwrap()
        .iter()
        .map(|data| data.component_type)
        .collect();
    assert_eq!(source_types, copy_types);

    let erased = world
        .get_by_id(copy, ComponentTypeId::of::<Label>())
        .unwrap();
    assert_eq!(erased.entity(), copy);
}

#[test]
fn duplicate_skips_removed_components() {
    let mut world = world();
    let source = world.create_entity().unwrap();
    world.add::<Score>(source).unwrap();
    world.add::<Position>(source).unwrap();
    world.remove::<Position>(source).unwrap();

    let copy = world.duplicate(source).unwrap();
    assert!(world.has::<Score>(copy));
    assert!(!world.has::<Position>(copy));
    assert_eq!(world.component_count(copy), 1);
}

#[test]
fn failed_duplicate_is_rolled_back() {
    let mut world = world();
    let source = world.create_entity().unwrap();
    world.add::<Score>(source).unwrap();
    world.add::<Socket>(source).unwrap();

    let err = world.duplicate(source).unwrap_err();
    assert!(matches!(
        err,
        EcsError::Unsupported {
            operation: "copy",
            ..
        }
    ));

    world.dispose().unwrap();
    assert_eq!(world.entity_count(), 1);
    assert_eq!(world.storage::<Score>().unwrap().len(), 1);
    assert_eq!(world.storage::<Socket>().unwrap().len(), 1);
}

#[test]
fn destroyed_entity_releases_components_on_dispose() {
    let mut world = world();
    let entity = world.create_entity().unwrap();
    world.add::<Position>(entity).unwrap();
    world.add::<Socket>(entity).unwrap().open = true;

    world.destroy_entity(entity).unwrap();
    assert!(!world.is_alive(entity));
    assert!(world.get::<Position>(entity).is_ok());
    assert!(matches!(
        world.add::<Velocity>(entity),
        Err(EcsError::EntityNotAlive { .. })
    ));
    assert_eq!(
        world.destroy_entity(entity),
        Err(EcsError::Pool(PoolError::AlreadyDestroyed {
            index: entity.index()
        }))
    );

    let stats = world.dispose().unwrap();
    assert_eq!(stats.reclaimed_entities, 1);
    assert_eq!(stats.reclaimed_components, 1);
    assert_eq!(world.deferred_count(), 1);
    assert!(matches!(
        world.get::<Position>(entity),
        Err(EcsError::EntityNotAlive { .. })
    ));

    let sockets = world.storage_mut::<Socket>().unwrap();
    for (owner, socket) in sockets.iter_mut() {
        assert_eq!(owner, entity);
        socket.open = false;
    }
    let stats = world.dispose().unwrap();
    assert_eq!(stats.reclaimed_components, 1);
    assert_eq!(world.deferred_count(), 0);
    assert!(world.storage::<Socket>().unwrap().is_empty());
}

#[test]
fn removal_on_destroyed_entity_is_consumed_by_either_pass() {
    let mut world = world();
    let first = world.create_entity().unwrap();
    let second = world.create_entity().unwrap();
    for entity in [first, second] {
        world.add::<Velocity>(entity).unwrap();
        world.remove::<Velocity>(entity).unwrap();
        world.destroy_entity(entity).unwrap();
    }

    assert_eq!(world.dispose_entities().unwrap(), 2);
    assert_eq!(world.dispose_garbage_components().unwrap(), 0);
    assert_eq!(world.dispose_kind_components().unwrap(), 2);
}

#[test]
fn copy_between_entities() {
    let mut world = world();
    let source = world.create_entity().unwrap();
    let destination = world.create_entity().unwrap();
    *world.add::<Position>(source).unwrap() = Position { x: 4, y: 5 };

    assert!(matches!(
        world.copy::<Position>(source, destination),
        Err(EcsError::DestinationNotAttached { .. })
    ));
    assert!(matches!(
        world.copy::<Position>(destination, source),
        Err(EcsError::ComponentNotAttached { .. })
    ));

    world.add::<Position>(destination).unwrap();
    world.copy::<Position>(source, destination).unwrap();
    assert_eq!(world.get::<Position>(destination), Ok(&Position { x: 4, y: 5 }));
    assert_eq!(
        world
            .get_by_id(destination, ComponentTypeId::of::<Position>())
            .unwrap()
            .entity(),
        destination
    );
}

#[test]
fn reset_routes_to_the_kind() {
    let mut world = World::new();
    let pool = world
        .component_pool::<Score>()
        .with_reset(|score, full| score.0 = if full { 0 } else { score.0.min(10) });
    world.register_pool(pool).unwrap();
    world.register::<Label>().unwrap();

    let entity = world.create_entity().unwrap();
    world.add::<Score>(entity).unwrap().0 = 99;
    world.add::<Label>(entity).unwrap();

    world.reset::<Score>(entity, false).unwrap();
    assert_eq!(world.get::<Score>(entity), Ok(&Score(10)));
    world.reset::<Score>(entity, true).unwrap();
    assert_eq!(world.get::<Score>(entity), Ok(&Score(0)));

    assert!(matches!(
        world.reset::<Label>(entity, true),
        Err(EcsError::Unsupported {
            operation: "reset",
            ..
        })
    ));
}

#[test]
fn clear_keeps_kinds_registered() {
    let mut world = world();
    for _ in 0..10 {
        let entity = world.create_entity().unwrap();
        world.add::<Position>(entity).unwrap();
    }

    world.clear().unwrap();
    assert_eq!(world.entity_count(), 0);
    assert!(world.storage::<Position>().unwrap().is_empty());
    assert!(world.has_kind(ComponentTypeId::of::<Position>()));

    let entity = world.create_entity().unwrap();
    world.add::<Position>(entity).unwrap().x = 1;
    assert_eq!(world.get::<Position>(entity).unwrap().x, 1);
}

#[test]
fn entities_from_before_clear_stay_dead() {
    let mut world = world();
    let first = world.create_entity().unwrap();
    world.destroy_entity(first).unwrap();
    world.dispose().unwrap();
    let old = world.create_entity().unwrap();
    world.add::<Score>(old).unwrap().0 = 1;

    world.clear().unwrap();
    let fresh = world.create_entity().unwrap();
    world.add::<Score>(fresh).unwrap().0 = 2;
    assert_eq!(fresh.index(), old.index());

    assert!(!world.is_alive(old));
    assert!(world.is_alive(fresh));
    assert!(!world.has::<Score>(old));
    assert!(world.get::<Score>(old).is_err());
    assert!(world.add::<Velocity>(old).is_err());
    assert_eq!(world.get::<Score>(fresh), Ok(&Score(2)));
}

#[derive(Default)]
struct Marker;

impl Component for Marker {}

/// Hand-written kind: unnamed, counts creations, no copy support.
#[derive(Default)]
struct MarkerKind {
    pool: LinearPool<Attached<Marker>>,
    created: usize,
}

impl ComponentKind for MarkerKind {
    fn component_type(&self) -> ComponentTypeId {
        ComponentTypeId::of::<Marker>()
    }

    fn component_name(&self) -> &str {
        ""
    }

    fn create(&mut self, entity: Identifier<Entity>) -> EcsResult<Identifier<ComponentBase>> {
        self.created += 1;
        let id = self.pool.create(Attached::new(Marker))?;
        self.pool.get_mut(id).set_entity(entity);
        Ok(id.cast())
    }

    fn destroy(&mut self, component: Identifier<ComponentBase>) -> EcsResult<()> {
        Ok(self.pool.destroy(component.cast())?)
    }

    fn component(&self, component: Identifier<ComponentBase>) -> Option<&dyn ErasedComponent> {
        self.pool
            .try_get(component.cast())
            .map(|marker| marker as &dyn ErasedComponent)
    }

    fn component_mut(
        &mut self,
        component: Identifier<ComponentBase>,
    ) -> Option<&mut dyn ErasedComponent> {
        self.pool
            .try_get_mut(component.cast())
            .map(|marker| marker as &mut dyn ErasedComponent)
    }

    fn dispose_components(&mut self) -> EcsResult<usize> {
        Ok(self.pool.dispose()?)
    }

    fn component_count(&self) -> usize {
        self.pool.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn custom_kinds_plug_into_the_registry() {
    let mut world = World::new();
    world.register_kind(Box::<MarkerKind>::default()).unwrap();
    assert!(world.kind_by_name("").is_none());

    let entity = world.create_entity().unwrap();
    world.add::<Marker>(entity).unwrap();
    assert!(world.has::<Marker>(entity));
    assert!(matches!(
        world.storage::<Marker>(),
        Err(EcsError::TypeMismatch { .. })
    ));

    let marker = ComponentTypeId::of::<Marker>();
    let kind = world.kind(marker).unwrap();
    let created = kind
        .as_any()
        .downcast_ref::<MarkerKind>()
        .map(|kind| kind.created);
    assert_eq!(created, Some(1));

    assert!(matches!(
        world.duplicate(entity),
        Err(EcsError::Unsupported { .. })
    ));
    assert!(world.try_unregister_kind(marker).is_none());

    world.destroy_entity(entity).unwrap();
    world.dispose().unwrap();
    assert!(world.try_unregister_kind(marker).is_some());
    let entity = world.create_entity().unwrap();
    assert!(matches!(
        world.add::<Marker>(entity),
        Err(EcsError::KindNotRegistered { .. })
    ));
}

mod physics {
    #[derive(Debug, Default)]
    pub struct Body {
        pub mass: u32,
    }

    impl tessera_core::Component for Body {}
}

mod render {
    #[derive(Debug, Default)]
    pub struct Body {
        pub mesh: u32,
    }

    impl tessera_core::Component for Body {}
}

#[test]
fn same_short_name_in_different_modules() {
    let mut world = World::new();
    world.register::<physics::Body>().unwrap();
    world.register::<render::Body>().unwrap();
    assert!(world
        .kind_by_name(std::any::type_name::<physics::Body>())
        .is_some());
    assert!(world
        .kind_by_name(std::any::type_name::<render::Body>())
        .is_some());

    let entity = world.create_entity().unwrap();
    world.add::<physics::Body>(entity).unwrap().mass = 3;
    world.add::<render::Body>(entity).unwrap().mesh = 7;
    assert_eq!(world.get::<physics::Body>(entity).unwrap().mass, 3);
    assert_eq!(world.get::<render::Body>(entity).unwrap().mesh, 7);

    assert_eq!(
        world.register::<render::Body>(),
        Err(EcsError::KindAlreadyRegistered {
            component: "Body".to_string()
        })
    );
}
