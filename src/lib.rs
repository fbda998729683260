#![forbid(unsafe_code)]

pub mod compare;
pub mod emit;
pub mod error;
pub mod export;
pub mod generator;
pub mod param;
pub mod registry;
pub mod scene;
pub mod snapshot;

pub use compare::{DEFAULT_EPSILON, snapshots_equal};
pub use emit::{Emitter, RibAsciiEmitter, declaration_for, escape_string};
pub use error::{RibwireError, RibwireResult};
pub use export::{ExportConfig, Exporter, MotionPlan};
pub use generator::{GeneratorRegistry, ObjectGenerator};
pub use param::{
    DetailClass, ElementType, ParameterSet, ParameterSlot, SlotData, SlotValues, SlotView,
};
pub use registry::{ObjectIdentity, ObjectRecord, ObjectRegistry, RecordHandle};
pub use scene::{SceneInput, SceneObject};
pub use snapshot::{MeshTopology, ObjectKind, Snapshot, Topology};
