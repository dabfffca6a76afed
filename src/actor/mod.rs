//! Actor data model and component store
//!
//! An actor is a pure composition of components plus a handful of settings
//! blocks:
//!
//! ```text
//! ActorDefinition
//! ├── extra_properties / animations / sprites / body / logic / in_game_type
//! └── components (ordered, per kind)
//!     ├── sprites:    source files + displacement + bake artifact cache
//!     ├── animations: cycles, frames, loop, callback
//!     ├── colliders:  shape + size + collision flags
//!     ├── wireframes: mesh/sphere/asterisk preview geometry
//!     ├── mutators:   behavior mutation (singleton)
//!     ├── children:   references to other actors
//!     └── sounds:     references to project sounds
//! ```
//!
//! Editing goes through `store::EditSession`; the consistency rules in
//! `consistency` are re-applied to every new snapshot.

pub mod component;
pub mod consistency;
pub mod defaults;
pub mod definition;
pub mod selection;
pub mod store;

pub use component::{
    AnimationComponent, Axis, AxisDelta, ChildComponent, ColliderComponent, ColliderShape,
    ComponentKind, ComponentRecord, Displacement, MutatorComponent, PixelVector, SoundComponent,
    SpriteComponent, SpriteImageData, Transparency, WireframeComponent, WireframeShape,
};
pub use consistency::{tile_count, WeightBand, MAX_FRAMES};
pub use defaults::{ComponentDefaults, DefaultsTable};
pub use definition::{ActorDefinition, Components};
pub use selection::Selection;
pub use store::{EditOutcome, EditSession, NotFoundError, SessionServices};
