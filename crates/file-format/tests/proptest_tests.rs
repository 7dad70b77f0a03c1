//! Property-based tests for the XML encoding.

use proptest::prelude::*;

use cadx_types::*;
use feature_graph::*;
use file_format::registry::{decode_reference, encode_reference};
use file_format::{decode_model, encode_model, xml};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_coord() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), -1.0e6f64..1.0e6, -1.0f64..1.0]
}

fn arb_point() -> impl Strategy<Value = Point3d> {
    (arb_coord(), arb_coord(), arb_coord()).prop_map(|(x, y, z)| Point3d::new(x, y, z))
}

fn arb_vec() -> impl Strategy<Value = Vec3> {
    (arb_coord(), arb_coord(), arb_coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_id() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_-]{0,8}"
}

fn arb_topo() -> impl Strategy<Value = SubTopology> {
    (arb_id(), -1i32..500).prop_map(|(id, index)| SubTopology::new(id, index))
}

fn arb_reference() -> impl Strategy<Value = ReferenceEntity> {
    prop_oneof![
        (arb_id(), arb_point(), arb_vec(), arb_vec(), arb_vec()).prop_map(
            |(id, origin, x_dir, normal, y_dir)| ReferenceEntity::DatumPlane(DatumPlaneRef::new(
                id,
                origin,
                x_dir,
                normal,
                Some(y_dir)
            ))
        ),
        arb_id().prop_map(ReferenceEntity::datum_axis),
        arb_id().prop_map(ReferenceEntity::datum_point),
        arb_id().prop_map(ReferenceEntity::whole_sketch),
        (arb_topo(), arb_vec(), arb_point(), arb_vec(), arb_vec()).prop_map(
            |(topo, normal, centroid, u, v)| match ReferenceEntity::face(topo, normal, centroid) {
                ReferenceEntity::Face(face) => ReferenceEntity::Face(face.with_uv(u, v)),
                other => other,
            }
        ),
        (arb_topo(), arb_point(), arb_point(), arb_point())
            .prop_map(|(topo, s, e, m)| ReferenceEntity::edge(topo, s, e, m)),
        (arb_topo(), arb_point()).prop_map(|(topo, p)| ReferenceEntity::vertex(topo, p)),
        (arb_topo(), "[A-Z][0-9]{0,3}")
            .prop_map(|(topo, local)| ReferenceEntity::sketch_segment(topo, local)),
    ]
}

/// A sketch with uniquely named lines and circles, plus an extrude of it.
fn arb_model() -> impl Strategy<Value = UnifiedModel> {
    let segment = prop_oneof![
        (arb_point(), arb_point()).prop_map(|(a, b)| SegmentGeometry::Line { start: a, end: b }),
        (arb_point(), 0.001f64..1.0e4).prop_map(|(center, radius)| SegmentGeometry::Circle {
            center,
            radius
        }),
    ];
    (
        "[ -~]{0,16}",
        prop::collection::vec((segment, any::<bool>()), 0..8),
        0.001f64..1.0e4,
        any::<bool>(),
    )
        .prop_map(|(name, segments, depth, suppressed)| {
            let mut sketch = Sketch::default();
            for (i, (geometry, construction)) in segments.into_iter().enumerate() {
                if let Ok(mut segment) = SketchSegment::new(format!("G{i}"), geometry) {
                    segment.construction = construction;
                    let _ = sketch.add_segment(segment);
                }
            }

            let mut model = UnifiedModel::new(UnitSystem::Centimeter, name.clone());
            let _ = model.add_feature(Feature::with_id("S1", name, sketch));
            if let Ok(blind) = EndCondition::blind(depth) {
                if let Ok(extrude) = Extrude::new(ProfileLink::to("S1"), Vec3::Z, BooleanOp::Boss, blind) {
                    let _ = model.add_feature(Feature::with_id("E1", "Extrude", extrude).suppressed(suppressed));
                }
            }
            model
        })
}

// ---------------------------------------------------------------------------
// 1. Every reference survives a trip through document text
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn reference_survives_text(reference in arb_reference()) {
        let element = encode_reference("ReferenceEntity", &reference);
        let text = xml::write(&element, 2).unwrap();
        let decoded = decode_reference(&xml::parse(&text).unwrap()).unwrap();
        prop_assert_eq!(decoded, reference);
    }
}

// ---------------------------------------------------------------------------
// 2. Models round-trip and re-encode to identical text
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn model_round_trips(model in arb_model()) {
        let text = encode_model(&model).unwrap();
        let loaded = decode_model(&text).unwrap();
        prop_assert_eq!(&loaded, &model);
        prop_assert_eq!(encode_model(&loaded).unwrap(), text);
    }
}
