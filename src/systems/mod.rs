//! ECS Systems for the fauna simulation.
//!
//! Systems contain the behavior logic that operates on components.
//!
//! ## Tick Order
//!
//! One tick runs as a strict chain:
//!
//! 1. `centroid_system` - refresh group centroids
//! 2. `flocking_system` - separation/alignment/cohesion from a snapshot
//! 3. `containment_system` - soft-bounds push
//! 4. `integration_system` - integrate flocks and schools
//! 5. `wander_system` - herd random walk, ground snap, reflection
//!
//! Every system walks groups in `GroupRegistry` order and skips groups whose
//! kind is switched off in `GroupToggles`.

pub mod centroid;
pub mod containment;
pub mod flocking;
pub mod movement;
pub mod wander;

pub use centroid::*;
pub use containment::*;
pub use flocking::*;
pub use movement::*;
pub use wander::*;

use bevy_ecs::prelude::*;

/// The schedule that advances the world by one tick.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            centroid_system,
            flocking_system,
            containment_system,
            integration_system,
            wander_system,
        )
            .chain(),
    );
    schedule
}
