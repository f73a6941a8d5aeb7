//! Static scene extents.
//!
//! Bounds are computed from base props only. Animated positions do not grow
//! the box; the fit transform stays constant for the whole playback so the
//! camera never chases moving shapes.

use kurbo::Rect;

use crate::{
    scene::Scene,
    shape::{ResolvedShape, resolve_layer},
    timeline::EvaluatedLayer,
};

/// Margin added on every side so auto-labels drawn above shapes survive the
/// fit transform.
pub const LABEL_PADDING: f64 = 30.0;

/// Extent of a single resolved shape, before padding. `None` when the shape
/// has no geometry (an empty curve).
pub fn shape_extent(shape: &ResolvedShape) -> Option<Rect> {
    let rect = match *shape {
        ResolvedShape::Circle { cx, cy, r } => Rect::new(cx - r, cy - r, cx + r, cy + r),
        ResolvedShape::Rectangle {
            x,
            y,
            width,
            height,
        } => Rect::new(x, y, x + width, y + height),
        ResolvedShape::Polygon { cx, cy, r, .. } => Rect::new(cx - r, cy - r, cx + r, cy + r),
        ResolvedShape::Star {
            cx,
            cy,
            outer_radius,
            ..
        } => Rect::new(
            cx - outer_radius,
            cy - outer_radius,
            cx + outer_radius,
            cy + outer_radius,
        ),
        ResolvedShape::Arrow { x, y, dx, dy } => {
            Rect::new(x.min(x + dx), y.min(y + dy), x.max(x + dx), y.max(y + dy))
        }
        ResolvedShape::Line { x1, y1, x2, y2 } => {
            Rect::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
        }
        ResolvedShape::Curve { ref points } => {
            let first = points.first()?;
            let mut rect = Rect::new(first.x, first.y, first.x, first.y);
            for p in &points[1..] {
                rect = rect.union_pt(*p);
            }
            rect
        }
        // Width is a rough estimate; exact text metrics are not known until
        // shaping, and the 30-unit padding absorbs the slack.
        ResolvedShape::Text { x, y, font_size, .. } => Rect::new(x, y, x + 100.0, y + font_size),
        ResolvedShape::Wave {
            x,
            y,
            width,
            amplitude,
            ..
        } => Rect::new(x, y - amplitude, x + width, y + amplitude),
        ResolvedShape::ParticleSystem { cx, cy, radius, .. }
        | ResolvedShape::Explosion { cx, cy, radius, .. }
        | ResolvedShape::EnergyField { cx, cy, radius, .. } => {
            Rect::new(cx - radius, cy - radius, cx + radius, cy + radius)
        }
    };
    rect.is_finite().then_some(rect)
}

/// Union of all layer extents at their base props, padded by
/// [`LABEL_PADDING`]. `None` when no layer contributes geometry, which
/// callers treat as "leave the viewport alone".
pub fn scene_bounds(scene: &Scene) -> Option<Rect> {
    let mut union: Option<Rect> = None;
    for layer in &scene.layers {
        let evaluated = EvaluatedLayer {
            id: layer.id.clone(),
            kind: layer.kind.clone(),
            label: layer.label.clone(),
            props: layer.canonical_props(),
        };
        let Some(resolved) = resolve_layer(&evaluated) else {
            continue;
        };
        let Some(extent) = shape_extent(&resolved.shape) else {
            continue;
        };
        union = Some(match union {
            Some(acc) => acc.union(extent),
            None => extent,
        });
    }
    union.map(|r| r.inflate(LABEL_PADDING, LABEL_PADDING))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::scene_from_json;

    #[test]
    fn circle_extent_is_center_plus_minus_radius() {
        let extent = shape_extent(&ResolvedShape::Circle {
            cx: 100.0,
            cy: 200.0,
            r: 50.0,
        })
        .unwrap();
        assert_eq!(extent, Rect::new(50.0, 150.0, 150.0, 250.0));
    }

    #[test]
    fn scene_bounds_pad_by_thirty() {
        let scene = scene_from_json(
            r#"{"id":"s","duration":1000,"layers":[
                {"id":"c","type":"circle","props":{"x":100,"y":200,"r":50},"animations":[]}
            ]}"#,
        )
        .unwrap();
        let bounds = scene_bounds(&scene).unwrap();
        assert_eq!(bounds, Rect::new(20.0, 120.0, 180.0, 280.0));
    }

    #[test]
    fn animated_props_do_not_grow_bounds() {
        let scene = scene_from_json(
            r#"{"id":"s","duration":2000,"layers":[
                {"id":"c","type":"circle","props":{"x":100,"y":100,"r":10},
                 "animations":[{"property":"r","from":10,"to":500,"start":0,"end":2000}]}
            ]}"#,
        )
        .unwrap();
        let bounds = scene_bounds(&scene).unwrap();
        assert_eq!(bounds, Rect::new(60.0, 60.0, 140.0, 140.0));
    }

    #[test]
    fn empty_scene_has_no_bounds() {
        let scene = scene_from_json(r#"{"id":"s","duration":1000,"layers":[]}"#).unwrap();
        assert!(scene_bounds(&scene).is_none());
    }

    #[test]
    fn unknown_and_empty_layers_are_ignored() {
        let scene = scene_from_json(
            r#"{"id":"s","duration":1000,"layers":[
                {"id":"b","type":"blob","props":{"x":9999,"y":9999},"animations":[]},
                {"id":"k","type":"curve","props":{"points":[]},"animations":[]},
                {"id":"l","type":"line","props":{"x1":0,"y1":0,"x2":10,"y2":10},"animations":[]}
            ]}"#,
        )
        .unwrap();
        let bounds = scene_bounds(&scene).unwrap();
        assert_eq!(bounds, Rect::new(-30.0, -30.0, 40.0, 40.0));
    }

    #[test]
    fn text_extent_uses_estimated_box() {
        let extent = shape_extent(&ResolvedShape::Text {
            x: 10.0,
            y: 20.0,
            content: "hi".into(),
            font_size: 16.0,
        })
        .unwrap();
        assert_eq!(extent, Rect::new(10.0, 20.0, 110.0, 36.0));
    }
}
