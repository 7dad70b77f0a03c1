//! Property-based tests for the exchange value types.

use proptest::prelude::*;

use cadx_types::*;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_coord() -> impl Strategy<Value = f64> {
    -1.0e4f64..1.0e4
}

fn arb_point() -> impl Strategy<Value = Point3d> {
    (arb_coord(), arb_coord(), arb_coord()).prop_map(|(x, y, z)| Point3d::new(x, y, z))
}

fn arb_vec() -> impl Strategy<Value = Vec3> {
    (arb_coord(), arb_coord(), arb_coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,12}"
}

fn arb_topo() -> impl Strategy<Value = SubTopology> {
    (arb_id(), -1i32..64).prop_map(|(id, index)| SubTopology::new(id, index))
}

fn arb_reference() -> impl Strategy<Value = ReferenceEntity> {
    prop_oneof![
        (arb_id(), arb_point(), arb_vec(), arb_vec())
            .prop_map(|(id, o, x, n)| ReferenceEntity::DatumPlane(DatumPlaneRef::new(id, o, x, n, None))),
        arb_id().prop_map(ReferenceEntity::datum_axis),
        arb_id().prop_map(ReferenceEntity::datum_point),
        arb_id().prop_map(ReferenceEntity::whole_sketch),
        (arb_topo(), arb_vec(), arb_point()).prop_map(|(t, n, c)| ReferenceEntity::face(t, n, c)),
        (arb_topo(), arb_point(), arb_point(), arb_point())
            .prop_map(|(t, s, e, m)| ReferenceEntity::edge(t, s, e, m)),
        (arb_topo(), arb_point()).prop_map(|(t, p)| ReferenceEntity::vertex(t, p)),
        (arb_topo(), arb_id()).prop_map(|(t, l)| ReferenceEntity::sketch_segment(t, l)),
    ]
}

// ---------------------------------------------------------------------------
// 1. Triple text form round-trips through Display and FromStr
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn triple_text_round_trip(p in arb_point()) {
        let text = p.to_string();
        let back: Point3d = text.parse().unwrap();
        prop_assert_eq!(back, p);
    }
}

// ---------------------------------------------------------------------------
// 2. Normalizing a non-degenerate vector yields unit length
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn normalized_has_unit_length(v in arb_vec()) {
        prop_assume!(!v.is_degenerate());
        let n = v.normalized();
        prop_assert!((n.length() - 1.0).abs() < 1e-9, "length {}", n.length());
        prop_assert!(n.is_parallel_to(&v));
    }
}

// ---------------------------------------------------------------------------
// 3. Parallelism is symmetric and holds for any non-zero scaling
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn parallel_is_symmetric(a in arb_vec(), b in arb_vec()) {
        prop_assert_eq!(a.is_parallel_to(&b), b.is_parallel_to(&a));
    }

    #[test]
    fn scaled_vectors_are_parallel(v in arb_vec(), k in prop_oneof![-100.0f64..-0.01, 0.01f64..100.0]) {
        prop_assume!(!v.is_degenerate() && !(v * k).is_degenerate());
        prop_assert!(v.is_parallel_to(&(v * k)));
    }
}

// ---------------------------------------------------------------------------
// 4. Reference accessors agree with the family of the kind
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn accessors_follow_family(r in arb_reference()) {
        match r.family() {
            ReferenceFamily::Feature => {
                prop_assert!(r.target_feature_id().is_some());
                prop_assert!(r.parent_feature_id().is_none());
                prop_assert!(r.topology_index().is_none());
                prop_assert_eq!(r.referenced_feature_id(), r.target_feature_id().unwrap());
            }
            ReferenceFamily::SubTopology => {
                prop_assert!(r.target_feature_id().is_none());
                prop_assert!(r.topology_index().is_some());
                prop_assert_eq!(r.referenced_feature_id(), r.parent_feature_id().unwrap());
            }
        }
        prop_assert_eq!(r.kind().family(), r.family());
        prop_assert_eq!(r.origin().is_some(), r.kind() == ReferenceKind::DatumPlane);
        prop_assert_eq!(r.position().is_some(), r.kind() == ReferenceKind::Vertex);
        prop_assert_eq!(r.mid_point().is_some(), r.kind() == ReferenceKind::Edge);
        prop_assert_eq!(r.segment_local_id().is_some(), r.kind() == ReferenceKind::SketchSegment);
    }
}

// ---------------------------------------------------------------------------
// 5. Sequential IDs never repeat
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn sequential_ids_are_unique(n in 1usize..200) {
        let ids = IdGenerator::sequential("F");
        let mut seen = std::collections::HashSet::new();
        for _ in 0..n {
            prop_assert!(seen.insert(ids.next_id()));
        }
    }
}
