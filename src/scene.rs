//! Scene data model and loading.
//!
//! A [`Scene`] is the wire contract with the scene generator: a flat list of
//! typed shape layers, each with a heterogeneous prop map and a list of
//! time-windowed property animations. The reader is deliberately tolerant
//! (unknown layer types and unknown props survive deserialization); only the
//! structural rules checked by [`Scene::validate`] reject a document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{InkframeError, InkframeResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    /// Total duration in milliseconds. Must be > 0.
    pub duration: f64,
    /// Advisory frame rate for offline stepping. Playback follows host
    /// timestamps, not this value.
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

fn default_fps() -> f64 {
    30.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    /// Shape kind, kept as a plain string so unknown kinds deserialize and
    /// can be skipped at draw time.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, PropValue>,
    #[serde(default)]
    pub animations: Vec<Animation>,
}

impl Layer {
    /// Base props with legacy aliases folded onto their canonical names:
    /// `color` backfills `fill` and `stroke`, `radius` backfills `r`.
    /// Explicit canonical keys always win.
    pub fn canonical_props(&self) -> BTreeMap<String, PropValue> {
        let mut props = self.props.clone();
        if let Some(color) = props.get("color").cloned() {
            if !props.contains_key("fill") {
                props.insert("fill".to_string(), color.clone());
            }
            if !props.contains_key("stroke") {
                props.insert("stroke".to_string(), color);
            }
        }
        if let Some(radius) = props.get("radius").cloned()
            && !props.contains_key("r")
        {
            props.insert("r".to_string(), radius);
        }
        props
    }
}

/// Interpolates one numeric property over a window of the scene. Only
/// contributes while `start <= t <= end`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Animation {
    pub property: String,
    pub from: f64,
    pub to: f64,
    /// Window start in milliseconds.
    #[serde(default)]
    pub start: f64,
    /// Window end in milliseconds. Must be strictly greater than `start`.
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    /// Informational tag from the generator ("orbit", "pulse", ...). Never
    /// affects evaluation.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One heterogeneous prop value. Untagged: the JSON shape decides the
/// variant, with scalar lists tried before point lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Numbers(Vec<f64>),
    Points(Vec<PointDef>),
    Strings(Vec<String>),
}

impl PropValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            PropValue::Numbers(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_points(&self) -> Option<&[PointDef]> {
        match self {
            PropValue::Points(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            PropValue::Strings(v) => Some(v),
            _ => None,
        }
    }
}

/// A 2D point as the generator writes it: `{"x": .., "y": ..}` or `[x, y]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointDef {
    Xy { x: f64, y: f64 },
    Pair([f64; 2]),
}

impl PointDef {
    pub fn to_point(self) -> kurbo::Point {
        match self {
            PointDef::Xy { x, y } => kurbo::Point::new(x, y),
            PointDef::Pair([x, y]) => kurbo::Point::new(x, y),
        }
    }
}

impl Scene {
    /// Structural validation applied before playback. Tolerated oddities
    /// (unknown layer kinds, missing props, unknown easing names) pass;
    /// a non-positive duration or an inverted animation window does not.
    pub fn validate(&self) -> InkframeResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(InkframeError::validation(format!(
                "scene '{}': duration must be a positive number of milliseconds",
                self.id
            )));
        }
        for layer in &self.layers {
            for anim in &layer.animations {
                if !anim.start.is_finite() || !anim.end.is_finite() {
                    return Err(InkframeError::validation(format!(
                        "layer '{}': animation of '{}' has a non-finite window",
                        layer.id, anim.property
                    )));
                }
                if anim.start >= anim.end {
                    return Err(InkframeError::validation(format!(
                        "layer '{}': animation of '{}' must have start < end (got {}..{})",
                        layer.id, anim.property, anim.start, anim.end
                    )));
                }
                if !anim.from.is_finite() || !anim.to.is_finite() {
                    return Err(InkframeError::validation(format!(
                        "layer '{}': animation of '{}' has non-finite endpoints",
                        layer.id, anim.property
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Strict JSON parse of a scene document.
pub fn scene_from_json(json: &str) -> InkframeResult<Scene> {
    serde_json::from_str(json).map_err(|e| InkframeError::serde(format!("parse scene JSON: {e}")))
}

/// Lenient parse of raw generator output. Generators wrap their JSON in
/// markdown fences or prose more often than not, so this tries, in order:
/// the text as-is, a ```json fence, any ``` fence, and finally the outermost
/// brace span. When nothing yields a scene it returns the placeholder rather
/// than an error.
pub fn parse_generator_payload(content: &str) -> Scene {
    if let Ok(scene) = scene_from_json(content) {
        return scene;
    }
    for fence in ["```json", "```"] {
        if let Some(body) = extract_fenced(content, fence)
            && let Ok(scene) = scene_from_json(body)
        {
            return scene;
        }
    }
    if let (Some(open), Some(close)) = (content.find('{'), content.rfind('}'))
        && open < close
        && let Ok(scene) = scene_from_json(&content[open..=close])
    {
        return scene;
    }
    tracing::warn!("generator payload did not contain a scene, using placeholder");
    placeholder_scene()
}

fn extract_fenced<'a>(content: &'a str, fence: &str) -> Option<&'a str> {
    let start = content.find(fence)? + fence.len();
    let rest = &content[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Minimal scene shown when the generator produced nothing usable.
pub fn placeholder_scene() -> Scene {
    Scene {
        id: "fallback_vis".to_string(),
        duration: 2000.0,
        fps: 30.0,
        layers: vec![Layer {
            id: "fallback_text".to_string(),
            kind: "text".to_string(),
            label: None,
            props: BTreeMap::from([
                ("x".to_string(), PropValue::Number(100.0)),
                ("y".to_string(), PropValue::Number(100.0)),
                ("text".to_string(), PropValue::Text("Visualization".to_string())),
                ("fontSize".to_string(), PropValue::Number(14.0)),
                ("fill".to_string(), PropValue::Text("#333".to_string())),
            ]),
            animations: vec![],
        }],
    }
}
