#![forbid(unsafe_code)]

//! Animated 2D scene rendering.
//!
//! A scene is a declarative JSON document of typed shape layers with
//! time-windowed property animations. The pipeline is evaluate (scene +
//! elapsed time to resolved props), compile (resolved layers to draw ops
//! under a viewport-fit transform) and render (draw ops to premultiplied
//! RGBA8 on the CPU). Playback is driven by host timestamps through
//! [`Player`].

pub mod bounds;
pub mod color;
pub mod compile;
pub mod easing;
pub mod error;
pub mod pipeline;
pub mod player;
pub mod render;
pub mod render_cpu;
pub mod scene;
pub mod shape;
pub mod timeline;
pub mod viewport;

pub use color::{ColorDef, Rgba8, parse_color};
pub use compile::{DrawOp, FramePlan, compile_frame};
pub use easing::Easing;
pub use error::{InkframeError, InkframeResult};
pub use pipeline::render_frame;
pub use player::{PlayState, Player, Tick};
pub use render::{FrameRGBA, RenderBackend, RenderSettings, StyleMode, create_backend};
pub use render_cpu::CpuBackend;
pub use scene::{
    Animation, Layer, PointDef, PropValue, Scene, parse_generator_payload, placeholder_scene,
    scene_from_json,
};
pub use shape::{ResolvedLayer, ResolvedShape, Style, resolve_layer};
pub use timeline::{EvalOptions, EvaluatedLayer, eval_layer_props, eval_scene};
pub use viewport::{FitTransform, fit_bounds};
