use crate::{color::Rgba8, compile::FramePlan, error::InkframeResult};

/// One rendered frame: tightly packed premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// How layer styling is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleMode {
    /// Two-tone output: every fill and stroke is forced to the foreground
    /// color, effect flags are ignored, and non-text layers get auto-labels.
    #[default]
    Strict,
    /// Honors supplied colors, palettes and the glow/gradient/rounded/bold/
    /// outline flags.
    Rich,
}

/// Per-session rendering configuration.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub mode: StyleMode,
    pub background: Rgba8,
    pub foreground: Rgba8,
    /// Freeze animated properties at their `to` value past the animation
    /// window instead of reverting to the base prop.
    pub hold_after_end: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            mode: StyleMode::default(),
            background: Rgba8::WHITE,
            foreground: Rgba8::BLACK,
            hold_after_end: false,
        }
    }
}

pub trait RenderBackend {
    fn render_plan(&mut self, plan: &FramePlan) -> InkframeResult<FrameRGBA>;
}

pub fn create_backend() -> InkframeResult<Box<dyn RenderBackend>> {
    Ok(Box::new(crate::render_cpu::CpuBackend::new()))
}
