//! # Shared World
//!
//! Pools and the registry are single-threaded structures. Sharing one world
//! between threads goes through a single coarse lock: every structural
//! mutation and every read happens under it, and unlocking is dropping the
//! guard.
//!
//! [`Reference`](crate::Reference) counters are the one piece that may be
//! cloned and dropped outside the lock.
//!
//! ```rust,ignore
//! let shared = SharedWorld::new(world);
//! let worker = shared.clone();
//! std::thread::spawn(move || {
//!     worker.with(|world| world.dispose()).unwrap();
//! });
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::ecs::World;

/// A [`World`] behind an `Arc<Mutex<_>>`. Clones share the same world.
#[derive(Clone, Debug, Default)]
pub struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    /// Moves `world` behind the lock.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Blocks until the world is available.
    pub fn lock(&self) -> MutexGuard<'_, World> {
        self.inner.lock()
    }

    /// Returns `None` instead of blocking if another thread holds the world.
    #[must_use]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, World>> {
        self.inner.try_lock()
    }

    /// Waits at most `timeout` for the world.
    #[must_use]
    pub fn try_lock_for(&self, timeout: Duration) -> Option<MutexGuard<'_, World>> {
        self.inner.try_lock_for(timeout)
    }

    /// Runs `f` with the world locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Number of handles sharing this world.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Takes the world back if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other handles exist.
    pub fn into_inner(self) -> Result<World, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<World> for SharedWorld {
    fn from(world: World) -> Self {
        Self::new(world)
    }
}
