//! # Error Types
//!
//! Every usage error the pools and the registry can report.
//!
//! Two layers, two enums:
//! - [`PoolError`] for slot-level misuse of a [`LinearPool`](crate::LinearPool)
//! - [`EcsError`] for registry-level misuse of a [`World`](crate::World)
//!
//! Both are fail-fast: they describe a bug in calling code, not a transient
//! condition. Lookups that are expected to miss have `try_` variants that
//! return `Option` or `bool` instead.

use thiserror::Error;

/// Errors raised by a linear pool or one of its handles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A null identifier was passed where a live item is required.
    #[error("null identifier")]
    NullIdentifier,

    /// The identifier points past the slots the pool has ever handed out.
    #[error("identifier out of bounds: index {index}, occupancy {occupancy}")]
    OutOfBounds {
        /// The 1-based index carried by the identifier.
        index: u32,
        /// Number of slots ever handed out.
        occupancy: u32,
    },

    /// The slot is on the free stack.
    #[error("item {index} is not allocated")]
    NotAllocated {
        /// The 1-based index carried by the identifier.
        index: u32,
    },

    /// The identifier was issued for an earlier occupant of the slot.
    #[error("stale identifier for item {index}: generation {expected}, slot is at {actual}")]
    StaleIdentifier {
        /// The 1-based index carried by the identifier.
        index: u32,
        /// Generation captured in the identifier.
        expected: u32,
        /// Generation currently stored in the slot.
        actual: u32,
    },

    /// The item is already queued for destruction.
    #[error("item {index} is already destroyed")]
    AlreadyDestroyed {
        /// The 1-based index carried by the identifier.
        index: u32,
    },

    /// The view outlived its item; re-fetch it from the pool.
    #[error("item {index} has been invalidated by the previous calls")]
    StaleView {
        /// The 1-based index carried by the view.
        index: u32,
    },

    /// The view was issued by a different pool.
    #[error("view belongs to another pool")]
    ForeignView,

    /// A structural mutation started while another one had not finished.
    #[error("{operation} of the item inside other {active} is not allowed")]
    MutationInProgress {
        /// The rejected operation.
        operation: &'static str,
        /// The operation that never completed.
        active: &'static str,
    },

    /// `clear(true)` was requested on a pool whose items have no destroy hook.
    #[error("item does not have destroy function")]
    NoDestroyHook,
}

/// Errors raised by the entity/component registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// No kind owns the requested component type.
    #[error("component is not registered by any kind: {type_name}")]
    KindNotRegistered {
        /// Name or discriminator of the component type.
        type_name: String,
    },

    /// Another kind already owns this component type.
    #[error("component {component} is already registered by another kind")]
    KindAlreadyRegistered {
        /// Component name.
        component: String,
    },

    /// Another kind already uses this component name.
    #[error("component name {name} is already registered by another kind")]
    KindNameTaken {
        /// The duplicated name.
        name: String,
    },

    /// The kind still has components attached to entities.
    #[error("kind {component} still owns {count} attached components")]
    KindInUse {
        /// Component name.
        component: String,
        /// Number of attached components.
        count: usize,
    },

    /// The entity does not carry the component.
    #[error("component {component} is not added to entity {entity}")]
    ComponentNotAttached {
        /// Component name.
        component: String,
        /// 1-based entity index.
        entity: u32,
    },

    /// The destination entity of a copy does not carry the component.
    #[error("component {component} is not added to destination entity {entity}")]
    DestinationNotAttached {
        /// Component name.
        component: String,
        /// 1-based index of the destination entity.
        entity: u32,
    },

    /// The entity already carries the component.
    #[error("component {component} is already added to entity {entity}")]
    ComponentAlreadyAttached {
        /// Component name.
        component: String,
        /// 1-based entity index.
        entity: u32,
    },

    /// The component is already tombstoned and waiting for dispose.
    #[error("component {component} of entity {entity} is already removed")]
    ComponentAlreadyRemoved {
        /// Component name.
        component: String,
        /// 1-based entity index.
        entity: u32,
    },

    /// The kind does not implement an optional hook.
    #[error("kind {component} does not support {operation}")]
    Unsupported {
        /// Component name.
        component: String,
        /// The missing hook.
        operation: &'static str,
    },

    /// A typed accessor was used with a type the kind does not store.
    #[error("kind {component} does not store {requested}")]
    TypeMismatch {
        /// Component name of the registered kind.
        component: String,
        /// Requested Rust type.
        requested: &'static str,
    },

    /// The entity is null, reclaimed or already queued for destruction.
    #[error("entity {entity} is not alive")]
    EntityNotAlive {
        /// 1-based entity index.
        entity: u32,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Slot-level misuse surfaced through the registry.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Result type for registry operations.
pub type EcsResult<T> = Result<T, EcsError>;
