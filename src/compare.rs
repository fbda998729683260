//! Structural snapshot equality with float tolerance.
//!
//! This comparison drives the exporter's core decision: if two time samples
//! of the same object compare equal, the object is static at that frame and
//! one sample suffices; any structural mismatch or any float outside the
//! tolerance means the object is animated and every sample must be emitted.

use crate::{
    param::{ParameterSet, SlotValues},
    snapshot::{Snapshot, Topology},
};

/// Tolerance used when none is configured. Kept at the original exporter's
/// value; render output depends on it.
pub const DEFAULT_EPSILON: f32 = 1e-4;

/// True iff the two snapshots describe the same kind of object with
/// identical structure and all float payloads within `epsilon`.
pub fn snapshots_equal(a: &Snapshot, b: &Snapshot, epsilon: f32) -> bool {
    if a.kind() != b.kind() {
        return false;
    }
    topologies_equal(&a.topology, &b.topology, epsilon)
        && parameter_sets_equal(&a.params, &b.params, epsilon)
}

fn topologies_equal(a: &Topology, b: &Topology, epsilon: f32) -> bool {
    match (a, b) {
        (Topology::Mesh(ma), Topology::Mesh(mb))
        | (Topology::Subdivision(ma), Topology::Subdivision(mb)) => {
            ma.point_count == mb.point_count
                && ma.face_vertex_counts == mb.face_vertex_counts
                && ma.face_vertex_indices == mb.face_vertex_indices
        }
        (
            Topology::NurbsSurface {
                u_degree: uda,
                v_degree: vda,
                u_cv_count: uca,
                v_cv_count: vca,
                u_knots: uka,
                v_knots: vka,
            },
            Topology::NurbsSurface {
                u_degree: udb,
                v_degree: vdb,
                u_cv_count: ucb,
                v_cv_count: vcb,
                u_knots: ukb,
                v_knots: vkb,
            },
        ) => {
            uda == udb
                && vda == vdb
                && uca == ucb
                && vca == vcb
                && floats_within(uka, ukb, epsilon)
                && floats_within(vka, vkb, epsilon)
        }
        (
            Topology::NurbsCurve {
                cv_counts: ca,
                order: oa,
                knots: ka,
            },
            Topology::NurbsCurve {
                cv_counts: cb,
                order: ob,
                knots: kb,
            },
        ) => ca == cb && oa == ob && floats_within(ka, kb, epsilon),
        (Topology::Particles { count: ca }, Topology::Particles { count: cb }) => ca == cb,
        (Topology::Light, Topology::Light) => true,
        (Topology::Generated, Topology::Generated) => true,
        _ => false,
    }
}

fn parameter_sets_equal(a: &ParameterSet, b: &ParameterSet, epsilon: f32) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(sa, sb)| {
        sa.name == sb.name
            && sa.element_type == sb.element_type
            && sa.detail == sb.detail
            && sa.element_count == sb.element_count
            && match (sa.values, sb.values) {
                (SlotValues::Floats(fa), SlotValues::Floats(fb)) => {
                    floats_within(fa, fb, epsilon)
                }
                (SlotValues::Text(ta), SlotValues::Text(tb)) => ta == tb,
                _ => false,
            }
    })
}

fn floats_within(a: &[f32], b: &[f32], epsilon: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        param::{DetailClass, ElementType, ParameterSlot},
        snapshot::MeshTopology,
    };

    fn quad(z: f32) -> Snapshot {
        let mut snap = Snapshot::new(Topology::Mesh(MeshTopology {
            face_vertex_counts: vec![4],
            face_vertex_indices: vec![0, 1, 2, 3],
            point_count: 4,
        }));
        let mut p =
            ParameterSlot::with_count("P", ElementType::Point, DetailClass::Vertex, 4).unwrap();
        p.set_triple(0, [0.0, 0.0, z]).unwrap();
        p.set_triple(1, [1.0, 0.0, z]).unwrap();
        p.set_triple(2, [1.0, 1.0, z]).unwrap();
        p.set_triple(3, [0.0, 1.0, z]).unwrap();
        snap.params.append(p);
        snap
    }

    #[test]
    fn identical_snapshots_compare_equal() {
        assert!(snapshots_equal(&quad(0.0), &quad(0.0), DEFAULT_EPSILON));
    }

    #[test]
    fn translated_points_compare_unequal() {
        // Unit square moved by (0, 0, 1): far outside tolerance, animated.
        assert!(!snapshots_equal(&quad(0.0), &quad(1.0), DEFAULT_EPSILON));
    }

    #[test]
    fn sub_epsilon_jitter_compares_equal() {
        assert!(snapshots_equal(&quad(0.0), &quad(5e-5), DEFAULT_EPSILON));
        assert!(!snapshots_equal(&quad(0.0), &quad(2e-4), DEFAULT_EPSILON));
    }

    #[test]
    fn kind_mismatch_is_never_equal() {
        let mesh = quad(0.0);
        let mut subdiv = quad(0.0);
        let Topology::Mesh(m) = mesh.topology.clone() else {
            unreachable!()
        };
        subdiv.topology = Topology::Subdivision(m);
        assert!(!snapshots_equal(&mesh, &subdiv, DEFAULT_EPSILON));
    }

    #[test]
    fn structural_mismatch_is_never_equal() {
        let a = quad(0.0);
        let mut b = quad(0.0);
        let Topology::Mesh(m) = &mut b.topology else {
            unreachable!()
        };
        m.face_vertex_indices = vec![0, 1, 3, 2];
        assert!(!snapshots_equal(&a, &b, DEFAULT_EPSILON));
    }

    #[test]
    fn string_payloads_compare_exactly() {
        let mut a = Snapshot::new(Topology::Light);
        let mut sa =
            ParameterSlot::with_count("shader", ElementType::String, DetailClass::Constant, 1)
                .unwrap();
        sa.set_string("spotlight").unwrap();
        a.params.append(sa);

        let mut b = a.clone();
        assert!(snapshots_equal(&a, &b, DEFAULT_EPSILON));

        b.params = ParameterSet::new();
        let mut sb =
            ParameterSlot::with_count("shader", ElementType::String, DetailClass::Constant, 1)
                .unwrap();
        sb.set_string("pointlight").unwrap();
        b.params.append(sb);
        assert!(!snapshots_equal(&a, &b, DEFAULT_EPSILON));
    }
}
