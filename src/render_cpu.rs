//! CPU raster backend on top of `vello_cpu`.
//!
//! Paths arrive pre-stroked from the compile stage, so the only drawing
//! verbs here are path fills and glyph runs. Text is shaped with `parley`
//! against the system sans-serif family; shaped fonts are re-wrapped into
//! `vello_cpu` font data once per underlying blob and cached.

use std::collections::HashMap;

use parley::{
    Alignment, AlignmentOptions, FontContext, LayoutContext,
    style::{FontFamily, FontStack, GenericFamily, StyleProperty},
};

use crate::{
    color::Rgba8,
    compile::{DrawOp, FramePlan},
    error::{InkframeError, InkframeResult},
    render::{FrameRGBA, RenderBackend},
};

pub struct CpuBackend {
    font_cx: FontContext,
    layout_cx: LayoutContext<()>,
    font_cache: HashMap<u64, vello_cpu::peniko::FontData>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            font_cache: HashMap::new(),
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(&mut self, plan: &FramePlan) -> InkframeResult<FrameRGBA> {
        let width: u16 = plan
            .width
            .try_into()
            .map_err(|_| InkframeError::render("surface width exceeds u16"))?;
        let height: u16 = plan
            .height
            .try_into()
            .map_err(|_| InkframeError::render("surface height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        clear_pixmap(&mut pixmap, premul_rgba8(plan.background));

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        for op in &plan.ops {
            self.draw_op(&mut ctx, plan.transform, op);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.width,
            height: plan.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl CpuBackend {
    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, base: kurbo::Affine, op: &DrawOp) {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::FillPath { path, color } => {
                ctx.set_transform(affine_to_cpu(base));
                ctx.set_paint(paint_color(*color));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            DrawOp::Text {
                x,
                y,
                content,
                size,
                color,
                bold,
                centered,
            } => {
                self.draw_text(ctx, base, *x, *y, content, *size, *color, *bold, *centered);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        base: kurbo::Affine,
        x: f64,
        y: f64,
        content: &str,
        size: f64,
        color: Rgba8,
        bold: bool,
        centered: bool,
    ) {
        let size = if size.is_finite() { size.max(0.0) as f32 } else { 0.0 };
        if size == 0.0 {
            return;
        }

        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, content, 1.0, true);
        builder.push_default(StyleProperty::FontSize(size));
        builder.push_default(StyleProperty::FontStack(FontStack::from(
            FontFamily::Generic(GenericFamily::SansSerif),
        )));
        if bold {
            builder.push_default(StyleProperty::FontWeight(parley::FontWeight::BOLD));
        }

        let mut layout: parley::Layout<()> = builder.build(content);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let Some(line) = layout.lines().next() else {
            tracing::warn!("text produced no glyphs (no usable system font?), skipping");
            return;
        };
        let metrics = line.metrics();
        let ref_x = if centered {
            f64::from(metrics.advance) / 2.0
        } else {
            0.0
        };

        // Content (x, y) is the left (or center) end of the baseline.
        let transform =
            base * kurbo::Affine::translate(kurbo::Vec2::new(x - ref_x, y - f64::from(metrics.baseline)));
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint_color(color));

        for item in line.items() {
            let parley::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            // Rewrap the shaped font into vello_cpu font data, once per
            // underlying blob.
            let shaped = run.run().font();
            let key = shaped.data.id();
            let font = match self.font_cache.get(&key) {
                Some(cached) => cached.clone(),
                None => {
                    let converted = vello_cpu::peniko::FontData::new(
                        vello_cpu::peniko::Blob::from(shaped.data.as_ref().to_vec()),
                        shaped.index,
                    );
                    self.font_cache.insert(key, converted.clone());
                    converted
                }
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn paint_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn premul_rgba8(c: Rgba8) -> [u8; 4] {
    let af = u16::from(c.a) + 1;
    let premul = |ch: u8| -> u8 { ((u16::from(ch) * af) >> 8) as u8 };
    [premul(c.r), premul(c.g), premul(c.b), c.a]
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premul_is_exact_at_the_extremes() {
        assert_eq!(premul_rgba8(Rgba8::new(255, 255, 255, 255)), [255, 255, 255, 255]);
        assert_eq!(premul_rgba8(Rgba8::new(255, 128, 0, 0)), [0, 0, 0, 0]);
    }

    #[test]
    fn bezpath_conversion_preserves_element_count() {
        let mut path = kurbo::BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.quad_to((15.0, 5.0), (10.0, 10.0));
        path.curve_to((5.0, 15.0), (0.0, 15.0), (0.0, 10.0));
        path.close_path();
        let cpu = bezpath_to_cpu(&path);
        assert_eq!(cpu.elements().len(), path.elements().len());
    }
}
