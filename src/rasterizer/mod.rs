//! Wireframe preview rasterizer
//!
//! Pure, stateless plotting used by the preview surface whenever wireframe
//! data changes: Bresenham line/circle plotters (with the console's
//! interlaced mode) and a perspective projector that sizes the preview from
//! the projected bounding box.
//!
//! # Module Organization
//!
//! - `surface` - the single-channel raster target
//! - `plot` - line and circle plotters
//! - `project` - segment types, projection and wireframe rendering

pub mod plot;
pub mod project;
pub mod surface;

pub use plot::{draw_circle, draw_line};
pub use project::{
    frame_points, project, render_wireframe, PreviewFrame, Segment, SegmentPoint,
    PROJECTION_SCALE,
};
pub use surface::PreviewSurface;
