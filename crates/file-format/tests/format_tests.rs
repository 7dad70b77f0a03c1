use approx::assert_relative_eq;
use cadx_types::standard::{standard_plane, AXIS_Z, ORIGIN, PLANE_XY};
use cadx_types::{
    ConstraintKind, DatumPlaneRef, Point3d, ReferenceEntity, ReferenceKind, SketchConstraint,
    SketchSegment, SubTopology, UnitSystem, Vec3,
};
use feature_graph::{
    BooleanOp, DraftOption, EndCondition, Extrude, Feature, ProfileLink, Revolve, RevolveAngle,
    RevolveAxis, Sketch, ThinWallOption, UnifiedModel,
};
use file_format::registry::{decode_reference, encode_reference};
use file_format::{
    decode_json, decode_model, encode_json, encode_model, load_model, save_model, xml, LoadError,
    LoadOptions, SaveOptions,
};

// ── Helper Functions ─────────────────────────────────────────────────────

fn p(x: f64, y: f64, z: f64) -> Point3d {
    Point3d::new(x, y, z)
}

fn xy_plane() -> ReferenceEntity {
    standard_plane(PLANE_XY).unwrap()
}

fn make_profile_sketch(id: &str) -> Feature {
    let sketch = Sketch::new(Some(xy_plane()))
        .with_segment(SketchSegment::line("L1", p(0.0, 0.0, 0.0), p(100.0, 0.0, 0.0)).unwrap())
        .unwrap()
        .with_segment(SketchSegment::circle("C1", p(50.0, 25.0, 0.0), 15.0).unwrap())
        .unwrap();
    Feature::with_id(id, format!("Sketch {id}"), sketch)
}

fn make_blind_extrude(id: &str, profile: &str, depth: f64) -> Feature {
    let extrude = Extrude::new(
        ProfileLink::to(profile),
        Vec3::Z,
        BooleanOp::Boss,
        EndCondition::blind(depth).unwrap(),
    )
    .unwrap();
    Feature::with_id(id, format!("Extrude {id}"), extrude)
}

/// Sketch S1 plus Extrude E1, the reference scenario.
fn make_simple_model() -> UnifiedModel {
    let mut model = UnifiedModel::new(UnitSystem::Millimeter, "Bracket");
    model.add_feature(make_profile_sketch("S1")).unwrap();
    model.add_feature(make_blind_extrude("E1", "S1", 20.0)).unwrap();
    model
}

/// Every feature kind and most optional parts in one model.
fn make_rich_model() -> UnifiedModel {
    let mut model = make_simple_model();

    let mut sketch = Sketch::new(Some(ReferenceEntity::DatumPlane(DatumPlaneRef::new(
        "E1",
        p(0.0, 0.0, 20.0),
        Vec3::X,
        Vec3::Z,
        None,
    ))));
    sketch
        .add_segment(SketchSegment::line("AX", p(0.0, 0.0, 20.0), p(0.0, 10.0, 20.0)).unwrap().as_construction())
        .unwrap();
    sketch
        .add_segment(SketchSegment::arc("A1", p(5.0, 5.0, 20.0), 2.5, 0.0, 1.5, true).unwrap())
        .unwrap();
    sketch
        .add_segment(SketchSegment::point("P1", p(1.0, 2.0, 20.0)).unwrap())
        .unwrap();
    sketch
        .add_constraint(SketchConstraint::new(ConstraintKind::Vertical, vec!["AX".into()]).unwrap())
        .unwrap();
    sketch
        .add_constraint(SketchConstraint::dimensional(vec!["A1".into()], 2.5).unwrap())
        .unwrap();
    model
        .add_feature(Feature::with_id("S2", "Top sketch", sketch).with_external_id("ext-s2"))
        .unwrap();

    let top_face = ReferenceEntity::face(SubTopology::new("E1", 4), Vec3::Z, p(50.0, 25.0, 20.0));
    let cut = Extrude::new(
        ProfileLink::to("S2"),
        Vec3::new(0.0, 0.0, -2.0),
        BooleanOp::Cut,
        EndCondition::up_to_face(top_face, 1.5).unwrap().flipped(true),
    )
    .unwrap()
    .with_end_condition2(EndCondition::through_all().with_flip_material_side(true))
    .with_draft(DraftOption::new(2.0, true).unwrap())
    .with_thin_wall(ThinWallOption::new(0.5, true, false).unwrap());
    model
        .add_feature(Feature::with_id("E2", "Pocket", cut).suppressed(true))
        .unwrap();

    let revolve = Revolve::new(
        ProfileLink::to("S2"),
        RevolveAxis::sketch_segment("AX").unwrap(),
        RevolveAngle::TwoWay {
            primary: 90.0,
            secondary: 45.0,
        },
    )
    .unwrap();
    model.add_feature(Feature::with_id("R1", "Boss revolve", revolve)).unwrap();

    let revolve = Revolve::new(
        ProfileLink::to("S1"),
        RevolveAxis::Reference(ReferenceEntity::datum_axis(AXIS_Z)),
        RevolveAngle::Symmetric { total: 180.0 },
    )
    .unwrap();
    model.add_feature(Feature::with_id("R2", "Around Z", revolve)).unwrap();

    let revolve = Revolve::new(
        ProfileLink::to("S1"),
        RevolveAxis::explicit(p(0.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)).unwrap(),
        RevolveAngle::Single { angle: 360.0 },
    )
    .unwrap();
    model.add_feature(Feature::with_id("R3", "Explicit", revolve)).unwrap();

    let to_origin = Extrude::new(
        ProfileLink::to("S1"),
        Vec3::Z,
        BooleanOp::Merge,
        EndCondition::up_to_vertex(ReferenceEntity::datum_point(ORIGIN), 0.0).unwrap(),
    )
    .unwrap();
    model.add_feature(Feature::with_id("E3", "To origin", to_origin)).unwrap();

    model
}

/// One reference of each kind, all pointing at features of [`make_rich_model`].
fn one_reference_of_each_kind() -> Vec<ReferenceEntity> {
    let topo = |index| SubTopology::new("E1", index);
    vec![
        ReferenceEntity::DatumPlane(DatumPlaneRef::new(
            "E1",
            p(1.0, 2.0, 3.0),
            Vec3::X,
            Vec3::Z,
            Some(Vec3::Y),
        )),
        ReferenceEntity::datum_axis(AXIS_Z),
        ReferenceEntity::datum_point(ORIGIN),
        ReferenceEntity::whole_sketch("S1"),
        ReferenceEntity::face(topo(3), Vec3::new(0.0, 1.0, 0.0), p(0.5, 0.25, 0.125)),
        ReferenceEntity::edge(topo(7), p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(5.0, 0.0, 0.0)),
        ReferenceEntity::vertex(topo(2), p(-1.5, 2.0, 1e-3)),
        ReferenceEntity::sketch_segment(SubTopology::new("S1", 0), "C1"),
    ]
}

// ── Save ─────────────────────────────────────────────────────────────────

#[test]
fn save_writes_declaration_and_header() {
    let text = encode_model(&make_simple_model()).unwrap();
    assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(text.contains(
        r#"<UnifiedModel UnitSystem="Millimeter" ModelName="Bracket" FeatureCount="2">"#
    ));
}

#[test]
fn save_writes_features_in_list_order() {
    let text = encode_model(&make_rich_model()).unwrap();
    let root = xml::parse(&text).unwrap();
    let ids: Vec<_> = root
        .children_named("Feature")
        .filter_map(|f| f.attr("ID"))
        .collect();
    assert_eq!(ids, ["S1", "E1", "S2", "E2", "R1", "R2", "R3", "E3"]);
}

#[test]
fn save_uses_canonical_tokens() {
    let text = encode_model(&make_rich_model()).unwrap();
    assert!(text.contains(r#"Operation="BOSS""#));
    assert!(text.contains(r#"Operation="Cut""#));
    assert!(text.contains(r#"Operation="Merge""#));
    assert!(text.contains(r#"<ProfileSketchID Value="S1"/>"#));
    assert!(text.contains(r#"<EndCondition1 Type="Blind" Depth="20""#));
    assert!(text.contains(r#"Type="UpToFace""#));
    assert!(text.contains(r#"HasOffset="true""#));
    assert!(text.contains(r#"Suppressed="true""#));
    assert!(text.contains(r#"ExternalID="ext-s2""#));
    assert!(text.contains(r#"<Constraint Type="8" Dimension="2.5" Entities="A1"/>"#));
    assert!(text.contains(r#"<Segment Type="Line" LocalID="AX" Construction="true""#));
}

#[test]
fn save_writes_revolve_axis_kinds() {
    let root = xml::parse(&encode_model(&make_rich_model()).unwrap()).unwrap();
    let axis_kind = |id: &str| {
        let feature = root
            .children_named("Feature")
            .find(|f| f.attr("ID") == Some(id))
            .unwrap();
        let axis = feature.child("Axis").unwrap();
        (
            feature.attr("AngleKind").unwrap().to_string(),
            axis.attr("Kind").unwrap().to_string(),
        )
    };
    assert_eq!(axis_kind("R1"), ("1".to_string(), "0".to_string()));
    assert_eq!(axis_kind("R2"), ("2".to_string(), "2".to_string()));
    assert_eq!(axis_kind("R3"), ("0".to_string(), "1".to_string()));
}

#[test]
fn save_empty_model() {
    let model = UnifiedModel::new(UnitSystem::Inch, "");
    let text = encode_model(&model).unwrap();
    let loaded = decode_model(&text).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(loaded.unit, UnitSystem::Inch);
}

// ── Load ─────────────────────────────────────────────────────────────────

#[test]
fn load_reference_scenario() {
    let text = encode_model(&make_simple_model()).unwrap();
    let loaded = decode_model(&text).unwrap();

    assert_eq!(loaded.len(), 2);
    let extrude = loaded.get("E1").unwrap().as_extrude().unwrap();
    assert_relative_eq!(extrude.end_condition.depth().unwrap(), 20.0, epsilon = 1e-6);
    assert!(extrude.profile.is_linked());
    let profile = loaded.profile_sketch(&extrude.profile).unwrap();
    assert_eq!(profile.segments.len(), 2);
}

#[test]
fn load_round_trip_rich_model() {
    let model = make_rich_model();
    let loaded = decode_model(&encode_model(&model).unwrap()).unwrap();
    assert_eq!(loaded, model);
    assert!(loaded.validate().is_valid);
    assert_eq!(loaded.get_by_external_id("ext-s2").unwrap().id(), "S2");
}

#[test]
fn load_save_load_save_is_byte_identical() {
    let first = encode_model(&make_rich_model()).unwrap();
    let second = encode_model(&decode_model(&first).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn load_keeps_whitespace_in_local_ids() {
    let sketch = Sketch::new(Some(xy_plane()))
        .with_segment(SketchSegment::line(" L1", p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0)).unwrap())
        .unwrap()
        .with_segment(SketchSegment::line("L2 ", p(0.0, 5.0, 0.0), p(10.0, 5.0, 0.0)).unwrap())
        .unwrap()
        .with_constraint(
            SketchConstraint::new(ConstraintKind::Parallel, vec![" L1".into(), "L2 ".into()]).unwrap(),
        )
        .unwrap();
    let mut model = UnifiedModel::new(UnitSystem::Meter, "spaced");
    model.add_feature(Feature::with_id("S1", "Sketch", sketch)).unwrap();
    assert!(model.validate().is_valid);

    let loaded = decode_model(&encode_model(&model).unwrap()).unwrap();
    let constraint = &loaded.sketch("S1").unwrap().constraints[0];
    assert_eq!(constraint.entities, vec![" L1".to_string(), "L2 ".to_string()]);
    assert!(loaded.validate().is_valid);
    assert_eq!(loaded, model);
}

#[test]
fn load_resolves_forward_profile_references() {
    let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<UnifiedModel UnitSystem="Meter" ModelName="fwd" FeatureCount="2">
  <Feature Type="Extrude" ID="E1" Name="early" Suppressed="false" Operation="BOSS">
    <ProfileSketchID Value="S1"/>
    <Direction Value="(0,0,1)"/>
    <EndCondition1 Type="Blind" Depth="5" Offset="0" HasOffset="false" Flip="false" FlipMaterialSide="false"/>
  </Feature>
  <Feature Type="Sketch" ID="S1" Name="late" Suppressed="false">
    <Segments>
      <Segment Type="Circle" LocalID="C1" Construction="false" Center="(0,0,0)" Radius="1"/>
    </Segments>
    <Constraints/>
  </Feature>
</UnifiedModel>
"#;
    let model = decode_model(doc).unwrap();
    let extrude = model.get("E1").unwrap().as_extrude().unwrap();
    assert_eq!(model.feature_id_of(&extrude.profile), Some("S1"));
    assert!(model.validate().is_valid);
}

#[test]
fn load_reports_missing_profile() {
    let doc = r#"<UnifiedModel>
  <Feature Type="Revolve" ID="R1" Name="r" ProfileSketchID="NOPE" AngleKind="0" PrimaryAngle="360" SecondaryAngle="0">
    <Axis Kind="1" RefLocalID="" Origin="(0,0,0)" Direction="(0,0,1)"/>
  </Feature>
</UnifiedModel>"#;
    assert_eq!(
        decode_model(doc).unwrap_err(),
        LoadError::UnresolvedReference {
            id: "NOPE".into(),
            referrer: "R1".into()
        }
    );
}

#[test]
fn load_accepts_digit_booleans_and_any_case_tokens() {
    let doc = r#"<UnifiedModel UnitSystem="millimeter">
  <Feature Type="sketch" ID="S1" Name="s" Suppressed="1">
    <ReferencePlane Type="PLANE" TargetFeatureID="STD_DATUM_XY" Origin="(0,0,0)" XDir="(1,0,0)" Normal="(0,0,1)"/>
  </Feature>
  <Feature Type="Extrude" ID="E1" Name="e" Suppressed="0" Operation="cut">
    <ProfileSketchID Value="S1"/>
    <Direction Value="(0,0,1)"/>
    <EndCondition1 Type="throughall" Flip="1"/>
  </Feature>
</UnifiedModel>"#;
    let model = decode_model(doc).unwrap();
    assert_eq!(model.unit, UnitSystem::Millimeter);
    assert!(model.get("S1").unwrap().suppressed);
    let extrude = model.get("E1").unwrap().as_extrude().unwrap();
    assert_eq!(extrude.operation, BooleanOp::Cut);
    assert!(extrude.end_condition.flip);
    let plane = model.sketch("S1").unwrap().reference_plane.as_ref().unwrap();
    assert_eq!(plane.y_dir(), Some(Vec3::Y));
}

#[test]
fn load_rejects_unknown_tags() {
    let cases = [
        r#"<UnifiedModel><Feature Type="Loft" ID="X"/></UnifiedModel>"#,
        r#"<UnifiedModel><Feature Type="Sketch" ID="S"><Segments><Segment Type="Spline" LocalID="a"/></Segments></Feature></UnifiedModel>"#,
        r#"<UnifiedModel><Feature Type="Sketch" ID="S"><ReferencePlane Type="Feature" TargetFeatureID="x"/></Feature></UnifiedModel>"#,
        r#"<UnifiedModel><Feature Type="Sketch" ID="S"><Constraints><Constraint Type="42" Entities=""/></Constraints></Feature></UnifiedModel>"#,
        r#"<UnifiedModel UnitSystem="Cubit"/>"#,
        r#"<Model/>"#,
        "not xml at all <",
    ];
    for doc in cases {
        assert!(
            matches!(decode_model(doc), Err(LoadError::MalformedDocument(_))),
            "expected MalformedDocument for {doc}"
        );
    }
}

#[test]
fn load_rejects_missing_required_attributes() {
    let doc = r#"<UnifiedModel>
  <Feature Type="Sketch" ID="S1"/>
  <Feature Type="Extrude" ID="E1" Operation="BOSS">
    <ProfileSketchID Value="S1"/>
    <Direction Value="(0,0,1)"/>
    <EndCondition1 Type="Blind"/>
  </Feature>
</UnifiedModel>"#;
    let err = decode_model(doc).unwrap_err();
    let LoadError::MalformedDocument(message) = err else {
        panic!("expected MalformedDocument, got {err:?}");
    };
    assert!(message.contains("Depth"), "{message}");
}

#[test]
fn load_keeps_invalid_identity_for_validation() {
    let doc = r#"<UnifiedModel>
  <Feature Type="Sketch" ID="" Name="a"/>
  <Feature Type="Sketch" ID="" Name="b"/>
</UnifiedModel>"#;
    let model = decode_model(doc).unwrap();
    assert_eq!(model.len(), 2);
    let report = model.validate();
    assert!(!report.is_valid);
    assert!(report.errors.len() >= 2);
}

// ── Reference Symmetry ───────────────────────────────────────────────────

#[test]
fn every_reference_kind_survives_text() {
    let refs = one_reference_of_each_kind();
    let kinds: Vec<_> = refs.iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, ReferenceKind::ALL);

    for reference in refs {
        let element = encode_reference("ReferenceEntity", &reference);
        let text = xml::write(&element, 0).unwrap();
        let decoded = decode_reference(&xml::parse(&text).unwrap()).unwrap();
        assert_eq!(decoded, reference, "kind {}", reference.kind());
    }
}

#[test]
fn every_reference_kind_survives_a_model() {
    let mut model = make_rich_model();
    for (i, reference) in one_reference_of_each_kind().into_iter().enumerate() {
        let revolve = Revolve::new(
            ProfileLink::to("S1"),
            RevolveAxis::Reference(reference),
            RevolveAngle::Single { angle: 10.0 },
        )
        .unwrap();
        model
            .add_feature(Feature::with_id(format!("RX{i}"), "ref", revolve))
            .unwrap();
    }
    let loaded = decode_model(&encode_model(&model).unwrap()).unwrap();
    assert_eq!(loaded, model);
}

// ── Paths ────────────────────────────────────────────────────────────────

#[test]
fn save_and_load_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bracket.xml");
    let model = make_rich_model();

    let outcome = save_model(&model, &path, &SaveOptions::default());
    assert!(outcome.success, "{:?}", outcome.message);
    assert!(outcome.message.is_none());
    assert!(!dir.path().join(".bracket.xml.tmp").exists());

    let mut loaded = UnifiedModel::default();
    let outcome = load_model(&mut loaded, &path, &LoadOptions::default());
    assert!(outcome.success, "{:?}", outcome.message);
    assert_eq!(loaded, model);
}

#[test]
fn non_atomic_save_writes_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m.xml");
    let outcome = save_model(&make_simple_model(), &path, &SaveOptions::xml().with_atomic(false));
    assert!(outcome.success);
    assert!(std::fs::read_to_string(&path).unwrap().contains("UnifiedModel"));
}

#[test]
fn save_into_missing_directory_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("m.xml");
    let outcome = save_model(&make_simple_model(), &path, &SaveOptions::default());
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("no-such-dir"));
    assert!(!path.exists());
}

#[test]
fn failed_load_leaves_model_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.xml");
    std::fs::write(&bad, "<UnifiedModel><Feature Type=\"Loft\"/></UnifiedModel>").unwrap();

    let mut model = make_simple_model();
    let before = model.clone();

    let outcome = load_model(&mut model, &bad, &LoadOptions::default());
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("malformed"));
    assert_eq!(model, before);

    let outcome = load_model(&mut model, dir.path().join("missing.xml"), &LoadOptions::default());
    assert!(!outcome.success);
    assert_eq!(model, before);
}

// ── JSON ─────────────────────────────────────────────────────────────────

#[test]
fn json_round_trip_rich_model() {
    let model = make_rich_model();
    let text = encode_json(&model, 2).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["format"], "cadx-json");
    assert_eq!(parsed["version"], 1);
    assert_eq!(parsed["features"].as_array().unwrap().len(), model.len());

    assert_eq!(decode_json(&text).unwrap(), model);
}

#[test]
fn json_save_and_load_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bracket.json");
    let model = make_rich_model();

    assert!(save_model(&model, &path, &SaveOptions::json()).success);
    let mut loaded = UnifiedModel::default();
    assert!(load_model(&mut loaded, &path, &LoadOptions::json()).success);
    assert_eq!(loaded, model);

    // The XML reader does not accept JSON.
    let mut other = UnifiedModel::default();
    assert!(!load_model(&mut other, &path, &LoadOptions::xml()).success);
    assert!(other.is_empty());
}
