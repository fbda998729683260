//! Serialized scene-sample input, the JSON form of the scene walker's
//! `(identity, sample, snapshot)` stream. Used by the CLI and tests; live
//! hosts call [`Exporter::record_sample`](crate::export::Exporter::record_sample)
//! directly.

use std::io::Read;

use crate::{
    error::{RibwireError, RibwireResult},
    registry::ObjectIdentity,
    snapshot::Snapshot,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneInput {
    pub objects: Vec<SceneObject>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneObject {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Explicit per-sample snapshots, in sample order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<Snapshot>,

    /// Name of a registered generator to produce this object instead of
    /// explicit samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub generator_args: serde_json::Value,
}

impl SceneObject {
    pub fn identity(&self) -> ObjectIdentity {
        ObjectIdentity {
            path: self.path.clone(),
            instance: self.instance.clone(),
        }
    }
}

impl SceneInput {
    pub fn from_json_str(s: &str) -> RibwireResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| RibwireError::serde(format!("scene input: {e}")))
    }

    pub fn from_json_reader(reader: impl Read) -> RibwireResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| RibwireError::serde(format!("scene input: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scene_parses() {
        let scene = SceneInput::from_json_str(
            r#"{
                "objects": [
                    {
                        "path": "|fx|dust",
                        "generator": "dust",
                        "generator_args": { "count": 8 }
                    },
                    {
                        "path": "|geo|leaf",
                        "instance": "1",
                        "samples": [
                            { "topology": { "Particles": { "count": 2 } },
                              "params": { "slots": [] } }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.objects[1].identity().to_string(), "|geo|leaf#1");
        assert_eq!(scene.objects[1].samples.len(), 1);
    }

    #[test]
    fn malformed_scene_is_a_serde_error() {
        let err = SceneInput::from_json_str("{").unwrap_err();
        assert!(matches!(err, RibwireError::Serde(_)));
    }
}
