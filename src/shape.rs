//! Typed shape resolution.
//!
//! Evaluation leaves props as an untyped name-to-value map so animations can
//! target any numeric property. Before drawing, each layer is resolved into
//! exactly one [`ResolvedShape`] variant with its per-kind defaults applied,
//! which keeps the renderer dispatch exhaustive at compile time. Unknown
//! kinds resolve to `None` and are the caller's to skip.

use std::collections::BTreeMap;

use kurbo::Point;

use crate::{
    color::{Rgba8, parse_color},
    scene::PropValue,
    timeline::EvaluatedLayer,
};

/// Paint-and-effect props shared by every shape kind. Effect flags are
/// rich-mode hints; strict mode ignores them all except the geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    pub fill: Option<Rgba8>,
    pub stroke: Option<Rgba8>,
    pub stroke_width: f64,
    pub dash: Vec<f64>,
    pub palette: Vec<Rgba8>,
    pub glow: bool,
    pub gradient: bool,
    pub rounded: bool,
    pub bold: bool,
    pub outline: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedShape {
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Polygon {
        cx: f64,
        cy: f64,
        sides: u32,
        r: f64,
        rotation: f64,
    },
    Star {
        cx: f64,
        cy: f64,
        outer_radius: f64,
        inner_radius: f64,
        points: u32,
        rotation: f64,
    },
    Arrow {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Curve {
        points: Vec<Point>,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        font_size: f64,
    },
    Wave {
        x: f64,
        y: f64,
        width: f64,
        amplitude: f64,
        frequency: f64,
    },
    ParticleSystem {
        cx: f64,
        cy: f64,
        count: u32,
        radius: f64,
    },
    Explosion {
        cx: f64,
        cy: f64,
        radius: f64,
        particle_count: u32,
    },
    EnergyField {
        cx: f64,
        cy: f64,
        radius: f64,
        ring_count: u32,
    },
}

#[derive(Clone, Debug)]
pub struct ResolvedLayer {
    pub id: String,
    pub label: Option<String>,
    pub shape: ResolvedShape,
    pub style: Style,
}

type Props = BTreeMap<String, PropValue>;

fn num(props: &Props, key: &str, default: f64) -> f64 {
    props
        .get(key)
        .and_then(PropValue::as_number)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Ceiling for generator-supplied counts (particles, rings, vertices) so a
/// bad value cannot balloon a frame into billions of draw ops.
const MAX_COUNT: u32 = 512;

fn count(props: &Props, key: &str, default: u32, min: u32) -> u32 {
    let v = num(props, key, f64::from(default));
    (v.round().clamp(0.0, f64::from(MAX_COUNT)) as u32).max(min)
}

fn opt_color(props: &Props, key: &str) -> Option<Rgba8> {
    props
        .get(key)
        .and_then(PropValue::as_text)
        .and_then(parse_color)
}

/// Resolves an evaluated layer into its typed shape, or `None` when the
/// kind is unknown.
pub fn resolve_layer(layer: &EvaluatedLayer) -> Option<ResolvedLayer> {
    let props = &layer.props;
    let shape = resolve_shape(&layer.kind, props)?;

    // Paint defaults depend on the kind: closed shapes default to black
    // fill and stroke, open strokes to black stroke only, and circles and
    // rectangles draw nothing they were not given.
    let (default_fill, default_stroke, default_width) = match &shape {
        ResolvedShape::Circle { .. } | ResolvedShape::Rectangle { .. } => (None, None, 1.0),
        ResolvedShape::Polygon { .. } | ResolvedShape::Star { .. } => {
            (Some(Rgba8::BLACK), Some(Rgba8::BLACK), 1.0)
        }
        ResolvedShape::Line { .. } | ResolvedShape::Curve { .. } | ResolvedShape::Wave { .. } => {
            (None, Some(Rgba8::BLACK), 2.0)
        }
        ResolvedShape::Arrow { .. } => (None, Some(Rgba8::BLACK), num(props, "width", 2.0)),
        ResolvedShape::Text { .. } => (Some(Rgba8::BLACK), None, 1.0),
        ResolvedShape::ParticleSystem { .. } | ResolvedShape::Explosion { .. } => {
            (Some(Rgba8::BLACK), None, 1.0)
        }
        ResolvedShape::EnergyField { .. } => (None, Some(Rgba8::BLACK), 2.0),
    };

    let style = Style {
        fill: opt_color(props, "fill").or(default_fill),
        stroke: opt_color(props, "stroke").or(default_stroke),
        stroke_width: num(props, "strokeWidth", default_width),
        dash: props
            .get("dash")
            .and_then(PropValue::as_numbers)
            .map(|d| d.iter().copied().filter(|v| v.is_finite() && *v > 0.0).collect())
            .unwrap_or_default(),
        palette: props
            .get("palette")
            .and_then(PropValue::as_strings)
            .map(|names| names.iter().filter_map(|s| parse_color(s)).collect())
            .unwrap_or_default(),
        glow: flag(props, "glow"),
        gradient: flag(props, "gradient"),
        rounded: flag(props, "rounded"),
        bold: flag(props, "bold"),
        outline: flag(props, "outline"),
    };

    let label = layer
        .label
        .clone()
        .or_else(|| props.get("label").and_then(PropValue::as_text).map(String::from));

    Some(ResolvedLayer {
        id: layer.id.clone(),
        label,
        shape,
        style,
    })
}

fn flag(props: &Props, key: &str) -> bool {
    props.get(key).and_then(PropValue::as_bool).unwrap_or(false)
}

fn resolve_shape(kind: &str, props: &Props) -> Option<ResolvedShape> {
    let x = num(props, "x", 0.0);
    let y = num(props, "y", 0.0);

    let shape = match kind {
        "circle" => ResolvedShape::Circle {
            cx: x,
            cy: y,
            r: num(props, "r", 10.0),
        },
        "rectangle" => ResolvedShape::Rectangle {
            x,
            y,
            width: num(props, "width", 20.0),
            height: num(props, "height", 20.0),
        },
        "polygon" => ResolvedShape::Polygon {
            cx: x,
            cy: y,
            sides: count(props, "sides", 5, 3),
            r: num(props, "r", 40.0),
            rotation: num(props, "rotation", 0.0),
        },
        "star" => ResolvedShape::Star {
            cx: x,
            cy: y,
            outer_radius: num(props, "outerRadius", 40.0),
            inner_radius: num(props, "innerRadius", 20.0),
            points: count(props, "points", 5, 2),
            rotation: num(props, "rotation", 0.0),
        },
        "arrow" => ResolvedShape::Arrow {
            x,
            y,
            dx: num(props, "dx", 0.0),
            dy: num(props, "dy", 0.0),
        },
        "line" => ResolvedShape::Line {
            x1: num(props, "x1", 0.0),
            y1: num(props, "y1", 0.0),
            x2: num(props, "x2", 0.0),
            y2: num(props, "y2", 0.0),
        },
        "curve" => ResolvedShape::Curve {
            points: props
                .get("points")
                .and_then(PropValue::as_points)
                .map(|pts| pts.iter().map(|p| p.to_point()).collect())
                .unwrap_or_default(),
        },
        "text" => ResolvedShape::Text {
            x,
            y,
            content: props
                .get("text")
                .and_then(PropValue::as_text)
                .unwrap_or("")
                .to_string(),
            font_size: num(props, "fontSize", 16.0),
        },
        "wave" => ResolvedShape::Wave {
            x,
            y,
            width: num(props, "width", 200.0),
            amplitude: num(props, "amplitude", 20.0),
            frequency: num(props, "frequency", 0.02),
        },
        "particle-system" => ResolvedShape::ParticleSystem {
            cx: x,
            cy: y,
            count: count(props, "count", 12, 1),
            radius: num(props, "radius", 40.0),
        },
        "explosion" => ResolvedShape::Explosion {
            cx: x,
            cy: y,
            radius: num(props, "radius", 50.0),
            particle_count: count(props, "particleCount", 16, 1),
        },
        "energy-field" => ResolvedShape::EnergyField {
            cx: x,
            cy: y,
            radius: num(props, "radius", 50.0),
            ring_count: count(props, "ringCount", 4, 1),
        },
        _ => return None,
    };
    Some(shape)
}
