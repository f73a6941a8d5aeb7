//! Frame compilation: evaluated layers in, backend-agnostic draw ops out.
//!
//! Every shape becomes fill operations. Strokes (including dash patterns and
//! arrow heads) are expanded into fill outlines here with [`kurbo::stroke`],
//! so a backend only needs two verbs: fill a path, draw a text run. The
//! viewport fit is carried once on the plan instead of per op.

use kurbo::{
    Affine, BezPath, Cap, Circle, Join, Point, Rect, RoundedRect, Shape, Stroke, StrokeOpts,
};

use crate::{
    bounds::scene_bounds,
    color::Rgba8,
    render::{RenderSettings, StyleMode},
    scene::Scene,
    shape::{ResolvedLayer, ResolvedShape, Style, resolve_layer},
    timeline::{EvalOptions, eval_scene},
    viewport::fit_bounds,
};

const PATH_TOLERANCE: f64 = 0.1;
const STROKE_TOLERANCE: f64 = 0.25;
const ARROW_HEAD_LENGTH: f64 = 10.0;
const LABEL_FONT_SIZE: f64 = 10.0;
const GLOW_EXTRA_WIDTH: f64 = 8.0;

#[derive(Clone, Debug)]
pub struct FramePlan {
    pub width: u32,
    pub height: u32,
    pub background: Rgba8,
    /// Viewport fit, applied to every op.
    pub transform: Affine,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    FillPath {
        path: BezPath,
        color: Rgba8,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        size: f64,
        color: Rgba8,
        bold: bool,
        /// Center the run horizontally on `x` instead of starting there.
        centered: bool,
    },
}

/// Compiles one frame of the scene at `elapsed_ms`. Never fails: layers
/// that cannot be drawn are skipped with a warning so one bad layer cannot
/// take the frame down.
pub fn compile_frame(scene: &Scene, elapsed_ms: f64, settings: &RenderSettings) -> FramePlan {
    let opts = EvalOptions {
        hold_after_end: settings.hold_after_end,
    };
    let fit = fit_bounds(
        scene_bounds(scene),
        f64::from(settings.width),
        f64::from(settings.height),
    );

    let mut ops = Vec::new();
    for evaluated in eval_scene(scene, elapsed_ms, opts) {
        let Some(mut layer) = resolve_layer(&evaluated) else {
            tracing::warn!(layer = %evaluated.id, kind = %evaluated.kind, "unknown shape type, skipping layer");
            continue;
        };
        if settings.mode == StyleMode::Strict {
            enforce_strict(&mut layer.style, settings.foreground);
        }
        emit_layer(&mut ops, &layer, settings);
    }

    FramePlan {
        width: settings.width,
        height: settings.height,
        background: settings.background,
        transform: fit.to_affine(),
        ops,
    }
}

fn enforce_strict(style: &mut Style, fg: Rgba8) {
    style.fill = Some(fg);
    style.stroke = Some(fg);
    style.palette.clear();
    style.glow = false;
    style.gradient = false;
    style.rounded = false;
    style.bold = false;
    style.outline = false;
}

fn emit_layer(ops: &mut Vec<DrawOp>, layer: &ResolvedLayer, settings: &RenderSettings) {
    let style = &layer.style;
    match &layer.shape {
        ResolvedShape::Circle { cx, cy, r } => {
            if *r > 0.0 {
                let path = Circle::new((*cx, *cy), *r).to_path(PATH_TOLERANCE);
                emit_path(ops, &path, style);
            }
        }
        ResolvedShape::Rectangle {
            x,
            y,
            width,
            height,
        } => {
            if *width > 0.0 && *height > 0.0 {
                let rect = Rect::new(*x, *y, x + width, y + height);
                let path = if style.rounded {
                    RoundedRect::from_rect(rect, width.min(*height) * 0.2).to_path(PATH_TOLERANCE)
                } else {
                    rect.to_path(PATH_TOLERANCE)
                };
                emit_path(ops, &path, style);
            }
        }
        ResolvedShape::Polygon {
            cx,
            cy,
            sides,
            r,
            rotation,
        } => {
            let path = ring_path(*cx, *cy, *sides, |i| {
                (*r, rotation + f64::from(i) * std::f64::consts::TAU / f64::from(*sides))
            });
            emit_path(ops, &path, style);
        }
        ResolvedShape::Star {
            cx,
            cy,
            outer_radius,
            inner_radius,
            points,
            rotation,
        } => {
            let path = ring_path(*cx, *cy, points * 2, |i| {
                let radius = if i % 2 == 0 { *outer_radius } else { *inner_radius };
                (radius, rotation + f64::from(i) * std::f64::consts::PI / f64::from(*points))
            });
            emit_path(ops, &path, style);
        }
        ResolvedShape::Arrow { x, y, dx, dy } => {
            if let Some(stroke) = style.stroke {
                let tip = Point::new(x + dx, y + dy);
                let angle = dy.atan2(*dx);
                let mut path = BezPath::new();
                path.move_to((*x, *y));
                path.line_to(tip);
                for side in [-1.0, 1.0] {
                    let barb = angle + side * std::f64::consts::FRAC_PI_6;
                    path.move_to(tip);
                    path.line_to((
                        tip.x - ARROW_HEAD_LENGTH * barb.cos(),
                        tip.y - ARROW_HEAD_LENGTH * barb.sin(),
                    ));
                }
                emit_stroke(ops, &path, stroke, style.stroke_width, &[], style.glow);
            }
        }
        ResolvedShape::Line { x1, y1, x2, y2 } => {
            if let Some(stroke) = style.stroke {
                let mut path = BezPath::new();
                path.move_to((*x1, *y1));
                path.line_to((*x2, *y2));
                emit_stroke(ops, &path, stroke, style.stroke_width, &style.dash, style.glow);
            }
        }
        ResolvedShape::Curve { points } => {
            if points.len() >= 2 {
                let path = curve_path(points);
                emit_path(ops, &path, style);
            }
        }
        ResolvedShape::Text {
            x,
            y,
            content,
            font_size,
        } => {
            if !content.is_empty()
                && let Some(color) = style.fill
            {
                ops.push(DrawOp::Text {
                    x: *x,
                    y: *y,
                    content: content.clone(),
                    size: *font_size,
                    color,
                    bold: style.bold,
                    centered: false,
                });
            }
        }
        ResolvedShape::Wave {
            x,
            y,
            width,
            amplitude,
            frequency,
        } => {
            if *width > 0.0 {
                let mut path = BezPath::new();
                path.move_to((*x, *y));
                let mut i = 0.0;
                while i <= *width {
                    path.line_to((x + i, y + (i * frequency).sin() * amplitude));
                    i += 2.0;
                }
                if let Some(fill) = style.fill {
                    path.line_to((x + width, *y));
                    path.close_path();
                    push_fill(ops, path, fill);
                } else if let Some(stroke) = style.stroke {
                    emit_stroke(ops, &path, stroke, style.stroke_width, &[], style.glow);
                }
            }
        }
        ResolvedShape::ParticleSystem {
            cx,
            cy,
            count,
            radius,
        } => {
            let seed = stable_hash64(&layer.id);
            for k in 0..*count {
                let angle = unit(seed, u64::from(k) * 3) * std::f64::consts::TAU;
                // sqrt spreads particles uniformly over the disk area.
                let dist = unit(seed, u64::from(k) * 3 + 1).sqrt() * radius;
                let pr = 1.5 + 2.5 * unit(seed, u64::from(k) * 3 + 2);
                let color = particle_color(style, k);
                let Some(color) = color else { continue };
                let path = Circle::new((cx + angle.cos() * dist, cy + angle.sin() * dist), pr)
                    .to_path(PATH_TOLERANCE);
                if style.glow {
                    push_fill(ops, glow_halo(&path, 0.0), color.scale_alpha(0.25));
                }
                push_fill(ops, path, color);
            }
        }
        ResolvedShape::Explosion {
            cx,
            cy,
            radius,
            particle_count,
        } => {
            let seed = stable_hash64(&layer.id);
            if let Some(core) = style.fill {
                let path = Circle::new((*cx, *cy), radius * 0.15).to_path(PATH_TOLERANCE);
                push_fill(ops, path, core);
            }
            for k in 0..*particle_count {
                let angle = unit(seed, u64::from(k) * 3) * std::f64::consts::TAU;
                let dist = (0.35 + 0.6 * unit(seed, u64::from(k) * 3 + 1)) * radius;
                let pr = 1.5 + 3.0 * unit(seed, u64::from(k) * 3 + 2);
                let Some(color) = particle_color(style, k) else {
                    continue;
                };
                let path = Circle::new((cx + angle.cos() * dist, cy + angle.sin() * dist), pr)
                    .to_path(PATH_TOLERANCE);
                push_fill(ops, path, color);
            }
        }
        ResolvedShape::EnergyField {
            cx,
            cy,
            radius,
            ring_count,
        } => {
            if let Some(stroke) = style.stroke {
                for i in 1..=*ring_count {
                    let rr = radius * f64::from(i) / f64::from(*ring_count);
                    let ring = Circle::new((*cx, *cy), rr).to_path(PATH_TOLERANCE);
                    // Outer rings fade in rich mode; strict keeps them solid.
                    let color = if settings.mode == StyleMode::Rich {
                        stroke.scale_alpha(1.0 - 0.6 * f64::from(i - 1) / f64::from(*ring_count))
                    } else {
                        stroke
                    };
                    push_fill(
                        ops,
                        stroke_outline(&ring, style.stroke_width.max(1.0), &[]),
                        color,
                    );
                }
            }
        }
    }

    emit_label(ops, layer, settings);
}

/// Fill, effects and stroke for a closed path shape.
fn emit_path(ops: &mut Vec<DrawOp>, path: &BezPath, style: &Style) {
    let accent = style.fill.or(style.stroke);
    if style.glow
        && let Some(color) = accent
    {
        push_fill(
            ops,
            glow_halo(path, style.stroke_width),
            color.scale_alpha(0.25),
        );
    }
    if let Some(fill) = style.fill {
        push_fill(ops, path.clone(), fill);
        if style.gradient {
            push_fill(ops, inset_path(path, 0.55), fill.lighten(0.45));
        }
    }
    let stroke = style
        .stroke
        .or_else(|| style.outline.then_some(Rgba8::BLACK));
    if let Some(stroke) = stroke
        && style.stroke_width > 0.0
    {
        push_fill(
            ops,
            stroke_outline(path, style.stroke_width, &style.dash),
            stroke,
        );
    }
}

fn emit_stroke(
    ops: &mut Vec<DrawOp>,
    path: &BezPath,
    color: Rgba8,
    width: f64,
    dash: &[f64],
    glow: bool,
) {
    if width <= 0.0 {
        return;
    }
    if glow {
        push_fill(ops, glow_halo(path, width), color.scale_alpha(0.25));
    }
    push_fill(ops, stroke_outline(path, width, dash), color);
}

fn push_fill(ops: &mut Vec<DrawOp>, path: BezPath, color: Rgba8) {
    if color.a > 0 {
        ops.push(DrawOp::FillPath { path, color });
    }
}

fn stroke_outline(path: &BezPath, width: f64, dash: &[f64]) -> BezPath {
    let mut style = Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round);
    if !dash.is_empty() {
        style = style.with_dashes(0.0, dash.iter().copied());
    }
    kurbo::stroke(
        path.elements().iter().copied(),
        &style,
        &StrokeOpts::default(),
        STROKE_TOLERANCE,
    )
}

fn glow_halo(path: &BezPath, base_width: f64) -> BezPath {
    stroke_outline(path, base_width + GLOW_EXTRA_WIDTH, &[])
}

/// Shrinks a path about the center of its bounding box.
fn inset_path(path: &BezPath, factor: f64) -> BezPath {
    let center = path.bounding_box().center();
    let t = Affine::translate(center.to_vec2()) * Affine::scale(factor)
        * Affine::translate(-center.to_vec2());
    let mut out = path.clone();
    out.apply_affine(t);
    out
}

fn ring_path(cx: f64, cy: f64, n: u32, vertex: impl Fn(u32) -> (f64, f64)) -> BezPath {
    let mut path = BezPath::new();
    for i in 0..n {
        let (radius, angle) = vertex(i);
        let p = (cx + angle.cos() * radius, cy + angle.sin() * radius);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Quadratics through segment midpoints, the usual smooth-polyline trick.
fn curve_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for i in 1..points.len().saturating_sub(1) {
        let mid = points[i].midpoint(points[i + 1]);
        path.quad_to(points[i], mid);
    }
    path.line_to(points[points.len() - 1]);
    path
}

fn particle_color(style: &Style, k: u32) -> Option<Rgba8> {
    if !style.palette.is_empty() {
        return Some(style.palette[k as usize % style.palette.len()]);
    }
    style.fill.or(style.stroke)
}

fn emit_label(ops: &mut Vec<DrawOp>, layer: &ResolvedLayer, settings: &RenderSettings) {
    if settings.mode != StyleMode::Strict {
        return;
    }
    if matches!(layer.shape, ResolvedShape::Text { .. }) {
        return;
    }
    let text = layer
        .label
        .clone()
        .unwrap_or_else(|| prettify(&layer.id));
    if text.is_empty() {
        return;
    }
    let Some((x, y)) = label_anchor(&layer.shape) else {
        return;
    };
    ops.push(DrawOp::Text {
        x,
        y,
        content: text,
        size: LABEL_FONT_SIZE,
        color: settings.foreground,
        bold: false,
        centered: true,
    });
}

fn label_anchor(shape: &ResolvedShape) -> Option<(f64, f64)> {
    let anchor = match *shape {
        ResolvedShape::Circle { cx, cy, r } => (cx, cy - r - 12.0),
        ResolvedShape::Rectangle { x, y, width, .. } => (x + width / 2.0, y - 12.0),
        ResolvedShape::Polygon { cx, cy, r, .. } => (cx, cy - r - 12.0),
        ResolvedShape::Star {
            cx,
            cy,
            outer_radius,
            ..
        } => (cx, cy - outer_radius - 12.0),
        ResolvedShape::Arrow { x, y, dx, dy } => (x + dx / 2.0, y + dy / 2.0 - 8.0),
        ResolvedShape::Line { x1, y1, x2, y2 } => ((x1 + x2) / 2.0, (y1 + y2) / 2.0 - 8.0),
        ResolvedShape::Curve { ref points } => {
            let mid = points.get(points.len() / 2)?;
            (mid.x, mid.y - 8.0)
        }
        ResolvedShape::Wave {
            x,
            y,
            width,
            amplitude,
            ..
        } => (x + width / 2.0, y - amplitude - 12.0),
        ResolvedShape::ParticleSystem { cx, cy, radius, .. }
        | ResolvedShape::Explosion { cx, cy, radius, .. }
        | ResolvedShape::EnergyField { cx, cy, radius, .. } => (cx, cy - radius - 12.0),
        ResolvedShape::Text { .. } => return None,
    };
    Some(anchor)
}

/// Turns a layer id like `water_cycle-arrow` into "Water Cycle Arrow".
fn prettify(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for word in id.split(['_', '-', ' ']).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// FNV-1a, used to scatter particles deterministically per layer id.
fn stable_hash64(s: &str) -> u64 {
    let mut h = 0xCBF2_9CE4_8422_2325u64;
    for b in s.as_bytes() {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    h
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic value in [0, 1) for stream position `k` of `seed`.
fn unit(seed: u64, k: u64) -> f64 {
    let z = mix64(seed ^ k.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    (z >> 11) as f64 / (1u64 << 53) as f64
}
