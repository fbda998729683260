//! The staged export pipeline: record samples into the registry, plan
//! motion per object, drive an [`Emitter`](crate::emit::Emitter).

use crate::{
    compare::{DEFAULT_EPSILON, snapshots_equal},
    emit::{Emitter, declaration_for},
    error::{RibwireError, RibwireResult},
    generator::GeneratorRegistry,
    param::DetailClass,
    registry::{ObjectIdentity, ObjectRegistry, RecordHandle},
    scene::SceneInput,
    snapshot::Snapshot,
};

/// Explicit per-export configuration. The original exporter kept these as
/// scene-wide globals; here the struct is threaded through every call.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExportConfig {
    /// Motion/deformation samples captured per object, at least 1.
    #[serde(default = "default_motion_samples")]
    pub motion_samples: usize,

    /// Float comparison tolerance for the static/animated decision.
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,

    /// Re-declare default texture coordinates facevarying on emission
    /// (renderer-dependent UV layout).
    #[serde(default)]
    pub face_varying_uvs: bool,

    /// Escape backslashes/quotes in string payloads.
    #[serde(default = "default_true")]
    pub escape_strings: bool,
}

fn default_motion_samples() -> usize {
    1
}

fn default_epsilon() -> f32 {
    DEFAULT_EPSILON
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            motion_samples: default_motion_samples(),
            epsilon: default_epsilon(),
            face_varying_uvs: false,
            escape_strings: true,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> RibwireResult<()> {
        if self.motion_samples == 0 {
            return Err(RibwireError::validation("motion_samples must be >= 1"));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(RibwireError::validation("epsilon must be finite and > 0"));
        }
        Ok(())
    }
}

/// Outcome of comparing an object's samples across the frame.
#[derive(Debug)]
pub enum MotionPlan<'a> {
    /// All samples compare equal; one suffices.
    Static(&'a Snapshot),
    /// Samples differ; every one must be emitted, in order.
    Animated(Vec<&'a Snapshot>),
}

impl MotionPlan<'_> {
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }
}

/// Owns the per-frame registry and drives record → plan → emit.
pub struct Exporter {
    config: ExportConfig,
    registry: ObjectRegistry,
    generators: GeneratorRegistry,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> RibwireResult<Self> {
        config.validate()?;
        let registry = ObjectRegistry::new(config.motion_samples)?;
        Ok(Self {
            config,
            registry,
            generators: GeneratorRegistry::new(),
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn generators_mut(&mut self) -> &mut GeneratorRegistry {
        &mut self.generators
    }

    /// Records one time sample for one object. The scene walker calls this
    /// for every object it visits, once per sample pass.
    #[tracing::instrument(skip(self, snapshot), fields(object = %identity))]
    pub fn record_sample(
        &mut self,
        identity: ObjectIdentity,
        sample_index: usize,
        snapshot: Snapshot,
    ) -> RibwireResult<RecordHandle> {
        snapshot.validate()?;
        self.registry.insert(identity, sample_index, snapshot)
    }

    /// Ingests a serialized scene: explicit samples directly, generated
    /// objects through the generator registry. A failing generator skips
    /// its object with a warning; siblings continue.
    pub fn ingest(&mut self, scene: &SceneInput) -> RibwireResult<Vec<RecordHandle>> {
        let mut handles = Vec::new();
        for object in &scene.objects {
            let identity = object.identity();
            if let Some(generator) = &object.generator {
                match self.generators.run(generator, &identity, &object.generator_args) {
                    Ok(snapshot) => {
                        handles.push(self.record_sample(identity, 0, snapshot)?);
                    }
                    Err(err) => {
                        tracing::warn!(object = %identity, %err, "generator failed, object skipped");
                    }
                }
                continue;
            }
            let mut last = None;
            for (sample_index, snapshot) in object.samples.iter().enumerate() {
                last = Some(self.record_sample(
                    identity.clone(),
                    sample_index,
                    snapshot.clone(),
                )?);
            }
            if let Some(handle) = last {
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    /// Decides static vs. animated for a recorded object by comparing each
    /// adjacent pair of filled samples under the configured epsilon.
    pub fn motion_plan(&self, handle: RecordHandle) -> RibwireResult<MotionPlan<'_>> {
        let record = self
            .registry
            .record(handle)
            .ok_or_else(|| RibwireError::validation("stale record handle"))?;
        // Sample 0 is the shutter-open capture; planning without it would
        // export late-sample geometry as if it were the whole frame.
        let Some(first) = record.sample(0) else {
            return Err(RibwireError::validation(format!(
                "object '{}' is missing sample 0",
                record.identity()
            )));
        };
        let samples: Vec<&Snapshot> = record.filled_samples().collect();
        let animated = samples
            .windows(2)
            .any(|w| !snapshots_equal(w[0], w[1], self.config.epsilon));
        if animated {
            Ok(MotionPlan::Animated(samples))
        } else {
            Ok(MotionPlan::Static(first))
        }
    }

    /// Emits one recorded object: a single parameter block when static, a
    /// motion block over every sample when animated.
    #[tracing::instrument(skip(self, emitter))]
    pub fn emit_object(
        &self,
        handle: RecordHandle,
        emitter: &mut dyn Emitter,
    ) -> RibwireResult<()> {
        let record = self
            .registry
            .record(handle)
            .ok_or_else(|| RibwireError::validation("stale record handle"))?;
        emitter.begin_object(record.identity(), record.kind())?;
        match self.motion_plan(handle)? {
            MotionPlan::Static(snapshot) => {
                self.emit_params(snapshot, emitter)?;
            }
            MotionPlan::Animated(samples) => {
                emitter.motion_begin(samples.len())?;
                for snapshot in samples {
                    self.emit_params(snapshot, emitter)?;
                }
                emitter.motion_end()?;
            }
        }
        emitter.end_object()
    }

    fn emit_params(
        &self,
        snapshot: &Snapshot,
        emitter: &mut dyn Emitter,
    ) -> RibwireResult<()> {
        for (slot, view) in snapshot.params.slots().iter().zip(snapshot.params.iter()) {
            let detail = if self.config.face_varying_uvs
                && slot.is_default_texture_coordinate()
            {
                DetailClass::FaceVarying
            } else {
                view.detail
            };
            let declaration = declaration_for(view.element_type, detail);
            emitter.parameter(&declaration, &view)?;
        }
        Ok(())
    }
}
