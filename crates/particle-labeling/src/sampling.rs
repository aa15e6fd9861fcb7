//! Conversion of obstacle geometry into conflict particle positions
//!
//! The `walk_*` functions feed every generated position to a callback, so the labeler can
//! insert particles directly into its store while the public `sample_*` functions collect
//! the same positions into a list without touching any labeler state.

use geo::Coord;
use once_cell::sync::Lazy;

use crate::utils::LabelBox;

/// Smallest sampling distance accepted; smaller (or non-positive) values are raised to it
pub(crate) const MIN_RESOLUTION: f32 = 0.0001;

/// Table entries per degree
const ANGLE_SUBDIVISION: usize = 4;

/// Sine and cosine at quarter-degree steps over a full turn
struct TrigTable {
    sin: Vec<f32>,
    cos: Vec<f32>,
}

impl TrigTable {
    fn new() -> Self {
        let entries = 360 * ANGLE_SUBDIVISION;
        let radians = |i: usize| (i as f64 / ANGLE_SUBDIVISION as f64).to_radians();
        Self {
            sin: (0..entries).map(|i| radians(i).sin() as f32).collect(),
            cos: (0..entries).map(|i| radians(i).cos() as f32).collect(),
        }
    }

    /// Table index of an angle in degrees, truncated to the quarter-degree below
    #[inline]
    fn index(&self, degrees: f64) -> usize {
        ((degrees * ANGLE_SUBDIVISION as f64) as usize).min(self.sin.len() - 1)
    }

    #[inline]
    fn sin(&self, degrees: f64) -> f32 {
        self.sin[self.index(degrees)]
    }

    #[inline]
    fn cos(&self, degrees: f64) -> f32 {
        self.cos[self.index(degrees)]
    }
}

static TRIG: Lazy<TrigTable> = Lazy::new(TrigTable::new);

/// A raster whose non-empty pixels are obstacles
pub trait ConflictMap {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Packed `0xAARRGGBB` color at `(x, y)`; only called with in-bounds coordinates
    fn pixel(&self, x: u32, y: u32) -> u32;
}

/// Owned ARGB raster implementing [`ConflictMap`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterMap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RasterMap {
    /// Opaque white, the default "empty space" color
    pub const WHITE: u32 = 0xFFFF_FFFF;

    /// Create a raster filled with one color
    pub fn new(width: u32, height: u32, fill: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Wrap row-major pixels; `None` if the buffer does not match the size
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Set one pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    /// Fill a rectangle, clipped to the raster
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.pixels[py as usize * self.width as usize + px as usize] = color;
            }
        }
    }
}

impl ConflictMap for RasterMap {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Positions along the segment `(x1, y1)-(x2, y2)`, `resolution` apart
///
/// The segment length is rounded up to whole units; `ceil(length / resolution)` positions
/// are produced starting at the first endpoint. A zero-length segment produces nothing.
pub(crate) fn walk_line(x1: f32, y1: f32, x2: f32, y2: f32, resolution: f32, mut emit: impl FnMut(f32, f32)) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let length = (dx * dx + dy * dy).sqrt().ceil();
    if !(length > 0.0) || !length.is_finite() {
        return;
    }

    let step = resolution.max(MIN_RESOLUTION);
    let count = (length / step).ceil() as usize;
    let step_x = dx / length * step;
    let step_y = dy / length * step;

    for i in 0..count {
        emit(x1 + i as f32 * step_x, y1 + i as f32 * step_y);
    }
}

/// Positions filling a disc
///
/// Emits the center, a border ring at half-degree steps, then "beams" from the center
/// outwards. Each time the arc between neighbouring beams at the current ring would
/// exceed `resolution`, the angular step is halved and a rotated set of beams starts at
/// that ring, so the fill stays roughly `resolution` dense without recomputing sin/cos
/// per particle.
pub(crate) fn walk_circle(center_x: f32, center_y: f32, radius: f32, resolution: f32, mut emit: impl FnMut(f32, f32)) {
    let trig = &*TRIG;
    let step = resolution.max(MIN_RESOLUTION);
    let last_ring = (radius / step).floor() as usize;

    emit(center_x, center_y);

    // Border ring
    for i in (0..360 * ANGLE_SUBDIVISION).step_by(ANGLE_SUBDIVISION / 2) {
        emit(
            center_x + trig.cos[i] * radius,
            center_y + trig.sin[i] * radius,
        );
    }

    let mut angle_delta: f32 = 90.0;
    let mut start_angle: f64 = 0.0;
    let mut stop_angle: f64 = 360.0;
    let mut new_round = true;

    for ring in 0..last_ring {
        let secant = |delta: f32| 2.0 * ring as f32 * step * trig.sin(f64::from(delta / 2.0));

        while secant(angle_delta) > step {
            angle_delta /= 2.0;
            new_round = true;
        }

        if !new_round {
            continue;
        }

        let mut used_delta = angle_delta;
        if ring != 0 {
            // Rotate the new beams between the existing ones
            if ring == 1 {
                used_delta = angle_delta + angle_delta;
            }
            start_angle += f64::from(angle_delta);
            stop_angle = 360.0 + start_angle;
        }

        let mut angle = start_angle;
        while angle < stop_angle {
            let wrapped = angle % 360.0;
            let dx = trig.cos(wrapped) * step;
            let dy = trig.sin(wrapped) * step;

            let mut x = center_x + ring as f32 * dx;
            let mut y = center_y + ring as f32 * dy;
            emit(x, y);

            for _ in ring..last_ring {
                x += dx;
                y += dy;
                emit(x, y);
            }

            angle += f64::from(used_delta);
        }
        new_round = false;
    }
}

/// Number of `step`-spaced positions from `start` that stay below `end`
#[inline]
fn steps_below(start: f32, end: f32, step: f32) -> usize {
    if end > start {
        ((end - start) / step).ceil() as usize
    } else {
        0
    }
}

/// Positions covering the box `[left, right] × [top, bottom]`
///
/// A lattice with the given spacings starting at the top-left corner, plus samples on the
/// right and bottom edges and the bottom-right corner, so the far borders are always hit.
/// Positions are computed from integer indices, so the walk ends even where the spacing
/// is below the float precision of the coordinates.
pub(crate) fn walk_box(
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    h_resolution: f32,
    v_resolution: f32,
    mut emit: impl FnMut(f32, f32),
) {
    if !(left.is_finite() && right.is_finite() && top.is_finite() && bottom.is_finite()) {
        return;
    }
    let h_step = h_resolution.max(MIN_RESOLUTION);
    let v_step = v_resolution.max(MIN_RESOLUTION);
    let columns = steps_below(left, right, h_step);
    let rows = steps_below(top, bottom, v_step);

    for i in 0..columns {
        let x = left + i as f32 * h_step;
        for j in 0..rows {
            emit(x, top + j as f32 * v_step);
        }
    }

    for j in 0..rows {
        emit(right, top + j as f32 * v_step);
    }

    for i in 0..columns {
        emit(left + i as f32 * h_step, bottom);
    }

    emit(right, bottom);
}

/// The part of a filled circle inside `window`, for circles too large to walk whole
///
/// Border ring positions falling into the window, then a [`walk_box`] lattice over the
/// window keeping only positions on the disc.
pub(crate) fn walk_disc_section(
    center_x: f32,
    center_y: f32,
    radius: f32,
    resolution: f32,
    window: &LabelBox,
    mut emit: impl FnMut(f32, f32),
) {
    let trig = &*TRIG;
    for i in (0..360 * ANGLE_SUBDIVISION).step_by(ANGLE_SUBDIVISION / 2) {
        let x = center_x + trig.cos[i] * radius;
        let y = center_y + trig.sin[i] * radius;
        if window.contains_point(x, y) {
            emit(x, y);
        }
    }

    let radius_squared = f64::from(radius) * f64::from(radius);
    walk_box(
        window.left,
        window.right,
        window.top,
        window.bottom,
        resolution,
        resolution,
        |x, y| {
            let dx = f64::from(x) - f64::from(center_x);
            let dy = f64::from(y) - f64::from(center_y);
            if dx * dx + dy * dy <= radius_squared {
                emit(x, y);
            }
        },
    );
}

/// Pixel positions of every `resolution`-th pixel (both axes) that differs from
/// `empty_color`, limited to `max_width × max_height`
pub(crate) fn walk_map<M: ConflictMap + ?Sized>(
    map: &M,
    empty_color: u32,
    resolution: usize,
    max_width: u32,
    max_height: u32,
    mut emit: impl FnMut(u32, u32),
) {
    let step = resolution.max(1);
    let width = map.width().min(max_width);
    let height = map.height().min(max_height);

    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            if map.pixel(x, y) != empty_color {
                emit(x, y);
            }
        }
    }
}

#[inline]
fn collect(walk: impl FnOnce(&mut dyn FnMut(f32, f32))) -> Vec<Coord<f32>> {
    let mut out = Vec::new();
    walk(&mut |x, y| out.push(Coord { x, y }));
    out
}

/// Conflict particle positions for a line, one every `resolution` units
pub fn sample_line(x1: f32, y1: f32, x2: f32, y2: f32, resolution: f32) -> Vec<Coord<f32>> {
    collect(|emit| walk_line(x1, y1, x2, y2, resolution, emit))
}

/// [`sample_line`] with one particle per unit of length
pub fn sample_line_default(x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<Coord<f32>> {
    sample_line(x1, y1, x2, y2, 1.0)
}

/// Conflict particle positions for a filled circle, at most `resolution` apart
pub fn sample_circle(center_x: f32, center_y: f32, radius: f32, resolution: f32) -> Vec<Coord<f32>> {
    collect(|emit| walk_circle(center_x, center_y, radius, resolution, emit))
}

/// Conflict particle positions for a filled box with top-left corner `(x, y)`
pub fn sample_box(x: f32, y: f32, width: f32, height: f32, h_resolution: f32, v_resolution: f32) -> Vec<Coord<f32>> {
    collect(|emit| walk_box(x, x + width, y, y + height, h_resolution, v_resolution, emit))
}

/// Conflict particle positions for every `resolution`-th non-empty pixel of a raster
pub fn sample_map<M: ConflictMap + ?Sized>(map: &M, empty_color: u32, resolution: usize) -> Vec<Coord<f32>> {
    let mut out = Vec::new();
    walk_map(map, empty_color, resolution, u32::MAX, u32::MAX, |x, y| {
        out.push(Coord {
            x: x as f32,
            y: y as f32,
        });
    });
    out
}

/// [`sample_map`] treating white as empty space, sampling every pixel
pub fn sample_map_default<M: ConflictMap + ?Sized>(map: &M) -> Vec<Coord<f32>> {
    sample_map(map, RasterMap::WHITE, 1)
}
