use crate::{
    compile::compile_frame,
    error::InkframeResult,
    render::{FrameRGBA, RenderBackend, RenderSettings},
    scene::Scene,
};

/// One-shot frame render: evaluate the scene at `elapsed_ms`, compile the
/// draw ops, execute them on `backend`.
///
/// The elapsed time is host time, not a frame index; callers stepping
/// offline pick their own cadence (the CLI uses the scene's advisory fps).
pub fn render_frame(
    scene: &Scene,
    elapsed_ms: f64,
    settings: &RenderSettings,
    backend: &mut dyn RenderBackend,
) -> InkframeResult<FrameRGBA> {
    let plan = compile_frame(scene, elapsed_ms, settings);
    backend.render_plan(&plan)
}
