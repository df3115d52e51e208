//! Layout math: where new nodes land and which transform frames all nodes.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::camera::{Point, Rect, Size, ViewportTransform};
use crate::consts::{MIN_FIT_EXTENT, MIN_SCALE};

/// Canvas-space point currently at the visual center of the viewport.
#[must_use]
pub fn insertion_point(transform: &ViewportTransform, viewport: Size) -> Point {
    transform.screen_to_canvas(viewport.center())
}

/// Top-left position for a node of `size` so that it is centered on `center`.
#[must_use]
pub fn centered_at(center: Point, size: Size) -> Point {
    Point::new(center.x - size.width * 0.5, center.y - size.height * 0.5)
}

/// Axis-aligned bounding box of `rects`, or `None` when there are none.
pub fn bounding_box<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// Transform that frames `bounds` inside `viewport` with `padding` on every side.
///
/// Never zooms in past 1x. Degenerate extents (a single point, a viewport
/// smaller than twice the padding) are floored at one unit instead of dividing
/// by zero, and the result never drops below the at-rest minimum scale.
#[must_use]
pub fn fit_transform(bounds: Rect, viewport: Size, padding: f64) -> ViewportTransform {
    let box_w = bounds.width.max(MIN_FIT_EXTENT);
    let box_h = bounds.height.max(MIN_FIT_EXTENT);
    let avail_w = (viewport.width - 2.0 * padding).max(MIN_FIT_EXTENT);
    let avail_h = (viewport.height - 2.0 * padding).max(MIN_FIT_EXTENT);

    let scale = (avail_w / box_w).min(avail_h / box_h).min(1.0).max(MIN_SCALE);

    let center = bounds.center();
    let view_center = viewport.center();
    ViewportTransform {
        translate_x: view_center.x - center.x * scale,
        translate_y: view_center.y - center.y * scale,
        scale,
    }
}
