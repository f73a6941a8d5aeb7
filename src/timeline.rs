//! Per-frame property evaluation.
//!
//! Animations are windows, not keyframe tracks: an animation only writes its
//! property while `start <= t <= end`, and outside that window the base prop
//! (or an earlier animation in array order) shows through again. Several
//! generators rely on that reversion to loop motion cheaply, so freezing at
//! `to` after the window is opt-in via [`EvalOptions::hold_after_end`].

use std::collections::BTreeMap;

use crate::{
    easing::Easing,
    scene::{Layer, PropValue, Scene},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct EvalOptions {
    /// When set, a finished animation keeps contributing its `to` value for
    /// `t > end` instead of reverting.
    pub hold_after_end: bool,
}

/// One layer with its props resolved at a point in time. Still untyped;
/// shape resolution happens after evaluation.
#[derive(Clone, Debug)]
pub struct EvaluatedLayer {
    pub id: String,
    pub kind: String,
    pub label: Option<String>,
    pub props: BTreeMap<String, PropValue>,
}

/// Resolves a single layer's props at `t_ms`. Pure: same inputs, same map.
pub fn eval_layer_props(
    layer: &Layer,
    t_ms: f64,
    opts: EvalOptions,
) -> BTreeMap<String, PropValue> {
    let mut props = layer.canonical_props();
    for anim in &layer.animations {
        let span = anim.end - anim.start;
        if span <= 0.0 {
            continue;
        }
        if t_ms >= anim.start && t_ms <= anim.end {
            let progress = (t_ms - anim.start) / span;
            let eased = Easing::from_name(anim.easing.as_deref()).apply(progress);
            let value = anim.from + (anim.to - anim.from) * eased;
            props.insert(anim.property.clone(), PropValue::Number(value));
        } else if opts.hold_after_end && t_ms > anim.end {
            props.insert(anim.property.clone(), PropValue::Number(anim.to));
        }
    }
    props
}

/// Evaluates every layer of the scene at `t_ms`, in document order.
#[tracing::instrument(skip(scene), fields(scene = %scene.id))]
pub fn eval_scene(scene: &Scene, t_ms: f64, opts: EvalOptions) -> Vec<EvaluatedLayer> {
    scene
        .layers
        .iter()
        .map(|layer| EvaluatedLayer {
            id: layer.id.clone(),
            kind: layer.kind.clone(),
            label: layer.label.clone(),
            props: eval_layer_props(layer, t_ms, opts),
        })
        .collect()
}
