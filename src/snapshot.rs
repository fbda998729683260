use crate::{
    error::{RibwireError, RibwireResult},
    param::{DetailClass, ParameterSet},
};

/// Closed set of geometric object kinds the exporter understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ObjectKind {
    Mesh,
    Subdivision,
    NurbsSurface,
    NurbsCurve,
    Particles,
    Light,
    Generated,
}

impl ObjectKind {
    pub fn kind_name(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::Subdivision => "subdivision",
            Self::NurbsSurface => "nurbs-surface",
            Self::NurbsCurve => "nurbs-curve",
            Self::Particles => "particles",
            Self::Light => "light",
            Self::Generated => "generated",
        }
    }
}

/// Polygon connectivity, shared by meshes and subdivision surfaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MeshTopology {
    pub face_vertex_counts: Vec<u32>,
    pub face_vertex_indices: Vec<u32>,
    pub point_count: u32,
}

impl MeshTopology {
    pub fn face_count(&self) -> usize {
        self.face_vertex_counts.len()
    }

    pub fn face_vertex_total(&self) -> usize {
        self.face_vertex_counts.iter().map(|&c| c as usize).sum()
    }
}

/// Kind-specific structural data for one object snapshot.
///
/// A tagged variant rather than a class hierarchy: the comparator and the
/// emitter both need exhaustive per-kind dispatch, and new kinds are rare.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Topology {
    Mesh(MeshTopology),
    Subdivision(MeshTopology),
    NurbsSurface {
        u_degree: u32,
        v_degree: u32,
        u_cv_count: u32,
        v_cv_count: u32,
        u_knots: Vec<f32>,
        v_knots: Vec<f32>,
    },
    NurbsCurve {
        cv_counts: Vec<u32>,
        order: u32,
        knots: Vec<f32>,
    },
    Particles {
        count: u32,
    },
    Light,
    Generated,
}

impl Topology {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Mesh(_) => ObjectKind::Mesh,
            Self::Subdivision(_) => ObjectKind::Subdivision,
            Self::NurbsSurface { .. } => ObjectKind::NurbsSurface,
            Self::NurbsCurve { .. } => ObjectKind::NurbsCurve,
            Self::Particles { .. } => ObjectKind::Particles,
            Self::Light => ObjectKind::Light,
            Self::Generated => ObjectKind::Generated,
        }
    }

    /// Expected element count for a detail class on this topology, when the
    /// topology pins one down.
    pub fn expected_count(&self, detail: DetailClass) -> Option<usize> {
        if detail == DetailClass::Constant {
            return Some(1);
        }
        match self {
            Self::Mesh(m) | Self::Subdivision(m) => match detail {
                DetailClass::Uniform => Some(m.face_count()),
                DetailClass::Varying | DetailClass::Vertex => Some(m.point_count as usize),
                DetailClass::FaceVarying | DetailClass::FaceVertex => {
                    Some(m.face_vertex_total())
                }
                DetailClass::Constant => Some(1),
            },
            Self::NurbsSurface {
                u_cv_count,
                v_cv_count,
                ..
            } => match detail {
                DetailClass::Vertex => {
                    Some(*u_cv_count as usize * *v_cv_count as usize)
                }
                _ => None,
            },
            Self::NurbsCurve { cv_counts, .. } => match detail {
                DetailClass::Uniform => Some(cv_counts.len()),
                DetailClass::Vertex => {
                    Some(cv_counts.iter().map(|&c| c as usize).sum())
                }
                _ => None,
            },
            Self::Particles { count } => match detail {
                DetailClass::Varying | DetailClass::Vertex => Some(*count as usize),
                _ => None,
            },
            Self::Light | Self::Generated => None,
        }
    }
}

/// One time-sample capture of an object: structural data plus its ordered
/// parameter set.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub topology: Topology,
    pub params: ParameterSet,
}

impl Snapshot {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            params: ParameterSet::new(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.topology.kind()
    }

    /// Checks every slot's element count against the topology, and float
    /// buffer lengths against their declared counts (deserialized slots
    /// bypass `configure`).
    pub fn validate(&self) -> RibwireResult<()> {
        for slot in self.params.slots() {
            let width = slot.element_type().float_width();
            if width > 0 && slot.floats().len() != slot.element_count() * width {
                return Err(RibwireError::validation(format!(
                    "slot '{}' has {} floats, expected {}",
                    slot.name(),
                    slot.floats().len(),
                    slot.element_count() * width
                )));
            }
            if let Some(expected) = self.topology.expected_count(slot.detail())
                && slot.element_count() != expected
            {
                return Err(RibwireError::validation(format!(
                    "slot '{}' ({} on {}) has {} elements, expected {expected}",
                    slot.name(),
                    slot.detail().detail_name(),
                    self.kind().kind_name(),
                    slot.element_count()
                )));
            }
        }
        Ok(())
    }
}
