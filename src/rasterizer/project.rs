//! Perspective projection and wireframe preview rendering
//!
//! Wireframe components are authored as 3-D segments with a per-point
//! parallax; the preview projects them onto a raster surface sized from the
//! bounding box of the projected endpoints.

use serde::{Deserialize, Serialize};

use crate::actor::component::{Displacement, WireframeComponent, WireframeShape};

use super::plot::{draw_circle, draw_line};
use super::surface::PreviewSurface;

/// Fixed eye-distance scale of the preview projector
pub const PROJECTION_SCALE: i32 = 512;

/// Blank border around framed previews, in pixels
const FRAME_MARGIN: i32 = 4;

/// A 3-D segment endpoint with a stereo parallax component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub parallax: i32,
}

impl SegmentPoint {
    pub fn new(x: i32, y: i32, z: i32, parallax: i32) -> Self {
        Self { x, y, z, parallax }
    }

    fn displaced(&self, displacement: &Displacement) -> SegmentPoint {
        SegmentPoint {
            x: self.x + displacement.x,
            y: self.y + displacement.y,
            z: self.z + displacement.z,
            parallax: self.parallax + displacement.parallax,
        }
    }
}

/// A 3-D line segment of a mesh wireframe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub from: SegmentPoint,
    pub to: SegmentPoint,
}

impl Segment {
    pub fn new(from: SegmentPoint, to: SegmentPoint) -> Self {
        Self { from, to }
    }
}

/// Project a segment endpoint onto the preview plane
///
/// `p' = round(p * K / (z + parallax + K))`. Returns `None` for points at or
/// behind the eye.
pub fn project(point: &SegmentPoint) -> Option<(i32, i32)> {
    let depth = point.z + point.parallax + PROJECTION_SCALE;
    if depth <= 0 {
        return None;
    }
    let k = PROJECTION_SCALE as f32 / depth as f32;
    let px = (point.x as f32 * k).round() as i32;
    let py = (point.y as f32 * k).round() as i32;
    Some((px, py))
}

/// Raster frame derived from the bounding box of projected endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewFrame {
    pub width: usize,
    pub height: usize,
    /// Projected coordinate mapped to surface x = 0
    pub offset_x: i32,
    /// Projected coordinate mapped to surface y = 0
    pub offset_y: i32,
}

impl PreviewFrame {
    pub fn surface(&self) -> PreviewSurface {
        PreviewSurface::new(self.width, self.height)
    }

    /// Map a projected point into surface coordinates
    pub fn to_surface(&self, point: (i32, i32)) -> (i32, i32) {
        (point.0 - self.offset_x, point.1 - self.offset_y)
    }
}

/// Frame a set of projected points with a margin on every side
pub fn frame_points(points: &[(i32, i32)]) -> PreviewFrame {
    if points.is_empty() {
        let side = (2 * FRAME_MARGIN + 1) as usize;
        return PreviewFrame {
            width: side,
            height: side,
            offset_x: -FRAME_MARGIN,
            offset_y: -FRAME_MARGIN,
        };
    }
    let min_x = points.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = points.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = points.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.1).max().unwrap_or(0);
    PreviewFrame {
        width: (max_x - min_x + 1 + 2 * FRAME_MARGIN) as usize,
        height: (max_y - min_y + 1 + 2 * FRAME_MARGIN) as usize,
        offset_x: min_x - FRAME_MARGIN,
        offset_y: min_y - FRAME_MARGIN,
    }
}

/// Render a wireframe component to a framed preview surface
pub fn render_wireframe(wireframe: &WireframeComponent) -> PreviewSurface {
    let shade = wireframe.color;
    match &wireframe.shape {
        WireframeShape::Mesh { segments } => {
            render_segments(segments, &wireframe.displacement, shade, wireframe.interlaced)
        }
        WireframeShape::Sphere { radius, draw_center } => {
            let center = SegmentPoint::default().displaced(&wireframe.displacement);
            let depth = center.z + center.parallax + PROJECTION_SCALE;
            let Some(projected_center) = project(&center) else {
                return frame_points(&[]).surface();
            };
            let projected_radius =
                (*radius as f32 * PROJECTION_SCALE as f32 / depth as f32).round() as i32;
            let (cx, cy) = projected_center;
            let corners = [
                (cx - projected_radius, cy - projected_radius),
                (cx + projected_radius, cy + projected_radius),
            ];
            let frame = frame_points(&corners);
            let mut surface = frame.surface();
            let (sx, sy) = frame.to_surface(projected_center);
            draw_circle(&mut surface, sx, sy, projected_radius, shade, wireframe.interlaced);
            if *draw_center {
                surface.set_pixel(sx, sy, shade);
            }
            surface
        }
        WireframeShape::Asterisk { length } => {
            let l = *length;
            let segments = [
                Segment::new(SegmentPoint::new(-l, 0, 0, 0), SegmentPoint::new(l, 0, 0, 0)),
                Segment::new(SegmentPoint::new(0, -l, 0, 0), SegmentPoint::new(0, l, 0, 0)),
                Segment::new(SegmentPoint::new(0, 0, -l, 0), SegmentPoint::new(0, 0, l, 0)),
            ];
            render_segments(&segments, &wireframe.displacement, shade, wireframe.interlaced)
        }
    }
}

fn render_segments(
    segments: &[Segment],
    displacement: &Displacement,
    shade: u8,
    interlaced: bool,
) -> PreviewSurface {
    // project every endpoint first; the frame needs the full bounding box
    let mut projected = Vec::with_capacity(segments.len());
    let mut points = Vec::with_capacity(segments.len() * 2);
    for segment in segments {
        let from = project(&segment.from.displaced(displacement));
        let to = project(&segment.to.displaced(displacement));
        if let (Some(from), Some(to)) = (from, to) {
            points.push(from);
            points.push(to);
            projected.push((from, to));
        }
    }

    let frame = frame_points(&points);
    let mut surface = frame.surface();
    for (from, to) in projected {
        let (x0, y0) = frame.to_surface(from);
        let (x1, y1) = frame.to_surface(to);
        draw_line(&mut surface, x0, y0, x1, y1, shade, interlaced);
    }
    surface
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_at_screen_plane_is_identity() {
        let point = SegmentPoint::new(100, -40, 0, 0);
        assert_eq!(project(&point), Some((100, -40)));
    }

    #[test]
    fn test_projection_shrinks_with_depth() {
        // z + parallax + K = 1024 halves the coordinates
        let point = SegmentPoint::new(100, 60, 512, 0);
        assert_eq!(project(&point), Some((50, 30)));

        // parallax participates in the divisor like z does
        let point = SegmentPoint::new(100, 60, 256, 256);
        assert_eq!(project(&point), Some((50, 30)));
    }

    #[test]
    fn test_projection_rejects_points_behind_the_eye() {
        let point = SegmentPoint::new(10, 10, -PROJECTION_SCALE, 0);
        assert_eq!(project(&point), None);
        let point = SegmentPoint::new(10, 10, -PROJECTION_SCALE - 64, 0);
        assert_eq!(project(&point), None);
    }

    #[test]
    fn test_frame_covers_projected_bounds() {
        let frame = frame_points(&[(-3, 2), (5, 10)]);
        assert_eq!(frame.offset_x, -3 - 4);
        assert_eq!(frame.offset_y, 2 - 4);
        assert_eq!(frame.width, (5 - (-3) + 1 + 8) as usize);
        assert_eq!(frame.height, (10 - 2 + 1 + 8) as usize);

        // both extremes land inside the surface
        let surface = frame.surface();
        let (x, y) = frame.to_surface((5, 10));
        assert!(x >= 0 && (x as usize) < surface.width);
        assert!(y >= 0 && (y as usize) < surface.height);
    }

    #[test]
    fn test_mesh_preview_draws_all_segments() {
        let wireframe = WireframeComponent {
            shape: WireframeShape::Mesh {
                segments: vec![Segment::new(
                    SegmentPoint::new(0, 0, 0, 0),
                    SegmentPoint::new(3, 0, 0, 0),
                )],
            },
            ..WireframeComponent::default()
        };
        let surface = render_wireframe(&wireframe);
        // 4-pixel line plus a 4-pixel margin on each side
        assert_eq!(surface.width, 4 + 8);
        assert_eq!(surface.lit_pixels().len(), 4);
    }

    #[test]
    fn test_sphere_preview_scales_radius_with_depth() {
        let wireframe = WireframeComponent {
            shape: WireframeShape::Sphere {
                radius: 10,
                draw_center: true,
            },
            displacement: Displacement {
                z: 512,
                ..Displacement::default()
            },
            ..WireframeComponent::default()
        };
        let surface = render_wireframe(&wireframe);
        // projected radius 5: circle fits a 19-pixel frame (2*5+1 + margins)
        assert_eq!(surface.width, 11 + 8);
        // center pixel is drawn
        let center = surface.lit_pixels();
        assert!(center.contains(&(9, 9)));
    }
}
