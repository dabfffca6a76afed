//! Primitive plotters
//!
//! Bresenham line and midpoint circle used by the wireframe preview. Both
//! support the console's interlaced mode: lines toggle visibility once per
//! visited pixel (the toggle persists across the whole line, starting lit),
//! circles toggle once per step so all 8 mirror points of a step share the
//! same visibility.

use super::surface::PreviewSurface;

/// Plot a line from `(x0, y0)` to `(x1, y1)`
pub fn draw_line(
    surface: &mut PreviewSurface,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    shade: u8,
    interlaced: bool,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;
    let mut lit = true;

    loop {
        if !interlaced || lit {
            surface.set_pixel(x, y, shade);
        }
        lit = !lit;

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Plot a circle of `radius` around `(cx, cy)`
pub fn draw_circle(
    surface: &mut PreviewSurface,
    cx: i32,
    cy: i32,
    radius: i32,
    shade: u8,
    interlaced: bool,
) {
    if radius < 0 {
        return;
    }
    if radius == 0 {
        surface.set_pixel(cx, cy, shade);
        return;
    }

    let mut x = 0;
    let mut y = radius;
    let mut d = 1 - radius;
    let mut lit = true;

    while x <= y {
        if !interlaced || lit {
            surface.set_pixel(cx + x, cy + y, shade);
            surface.set_pixel(cx - x, cy + y, shade);
            surface.set_pixel(cx + x, cy - y, shade);
            surface.set_pixel(cx - x, cy - y, shade);
            surface.set_pixel(cx + y, cy + x, shade);
            surface.set_pixel(cx - y, cy + x, shade);
            surface.set_pixel(cx + y, cy - x, shade);
            surface.set_pixel(cx - y, cy - x, shade);
        }
        lit = !lit;

        if d < 0 {
            d += 2 * x + 3;
        } else {
            d += 2 * (x - y) + 5;
            y -= 1;
        }
        x += 1;
    }
}
