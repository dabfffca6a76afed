//! Actor composition and sprite-baking core for a stereoscopic, tile-based
//! fantasy console editor.
//!
//! The editor shell (panels, dialogs, keybindings, file pickers, persistence)
//! lives outside this crate and talks to it through the collaborator traits in
//! [`services`], [`actor::defaults`], [`bake::convert`] and [`bake::compress`].
//!
//! # Module Organization
//!
//! - `actor` - the `ActorDefinition` data model, component store and
//!   consistency rules
//! - `bake` - the asynchronous sprite asset baking pipeline
//! - `rasterizer` - wireframe preview plotting and projection
//! - `services` - remaining collaborator seams (lookup, confirmation, progress)

pub mod actor;
pub mod bake;
pub mod rasterizer;
pub mod services;
