//! Reference scenarios shared by integration tests.
//!
//! Every fixture is built through `UnifiedModel::add_feature`, so a fixture
//! that returns `Ok` is a fully linked, valid model.

use cadx_types::standard::{AXIS_Z, ORIGIN};
use cadx_types::{
    DatumPlaneRef, Point3d, ReferenceEntity, SketchSegment, SubTopology, UnitSystem, Vec3,
};
use feature_graph::{
    BooleanOp, DraftOption, EndCondition, Extrude, Feature, ProfileLink, Revolve, RevolveAngle,
    RevolveAxis, Sketch, ThinWallOption, UnifiedModel,
};

use crate::helpers::{
    circle_sketch, edge_of, face_of, rect_sketch, vertex_of, xy_plane, HarnessError,
};

fn blind_extrude(profile: &str, depth: f64) -> Result<Extrude, HarnessError> {
    Ok(Extrude::new(
        ProfileLink::to(profile),
        Vec3::Z,
        BooleanOp::Boss,
        EndCondition::blind(depth)?,
    )?)
}

/// Sketch `S1` on the XY plane (line `L1` and circle `C1`) extruded 20 units
/// by `E1`.
pub fn sketch_and_extrude() -> Result<UnifiedModel, HarnessError> {
    let sketch = Sketch::new(Some(xy_plane()))
        .with_segment(SketchSegment::line(
            "L1",
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(100.0, 0.0, 0.0),
        )?)?
        .with_segment(SketchSegment::circle("C1", Point3d::new(50.0, 25.0, 0.0), 15.0)?)?;

    let mut model = UnifiedModel::new(UnitSystem::Millimeter, "Sketch and extrude");
    model.add_feature(Feature::with_id("S1", "Sketch1", sketch))?;
    model.add_feature(Feature::with_id("E1", "Extrude1", blind_extrude("S1", 20.0)?))?;
    Ok(model)
}

/// A plate with a pocket cut down to its top face and a revolved boss.
///
/// Covers both extrude directions, a second end condition, draft, thin wall,
/// suppression, external IDs and a sketch-segment revolve axis.
pub fn plate_with_pocket() -> Result<UnifiedModel, HarnessError> {
    let mut model = UnifiedModel::new(UnitSystem::Inch, "Plate");

    model.add_feature(
        Feature::with_id("plate-sketch", "Plate outline", rect_sketch(0.0, 0.0, 8.0, 4.0)?)
            .with_external_id("ext:101"),
    )?;
    model.add_feature(
        Feature::with_id("plate", "Plate", blind_extrude("plate-sketch", 0.5)?)
            .with_external_id("ext:102"),
    )?;

    let top = face_of("plate", 1, Vec3::Z, Point3d::new(4.0, 2.0, 0.5));
    let pocket_sketch = Sketch::new(Some(xy_plane())).with_segment(SketchSegment::circle(
        "C1",
        Point3d::new(2.0, 2.0, 0.0),
        0.75,
    )?)?;
    model.add_feature(Feature::with_id("pocket-sketch", "Pocket outline", pocket_sketch))?;

    let pocket = Extrude::new(
        ProfileLink::to("pocket-sketch"),
        Vec3::Z,
        BooleanOp::Cut,
        EndCondition::up_to_face(top, -0.25)?,
    )?
    .with_end_condition2(EndCondition::mid_plane(0.1)?.flipped(true))
    .with_draft(DraftOption::new(3.0, false)?)
    .with_thin_wall(ThinWallOption::new(0.05, false, true)?);
    model.add_feature(Feature::with_id("pocket", "Pocket", pocket))?;

    let boss_sketch = Sketch::new(Some(xy_plane()))
        .with_segment(
            SketchSegment::line("axis", Point3d::new(6.0, 0.0, 0.0), Point3d::new(6.0, 4.0, 0.0))?
                .as_construction(),
        )?
        .with_segment(SketchSegment::arc(
            "A1",
            Point3d::new(6.0, 2.0, 0.0),
            1.0,
            -std::f64::consts::FRAC_PI_2,
            std::f64::consts::FRAC_PI_2,
            false,
        )?)?;
    model.add_feature(Feature::with_id("boss-sketch", "Boss profile", boss_sketch))?;

    let boss = Revolve::new(
        ProfileLink::to("boss-sketch"),
        RevolveAxis::sketch_segment("axis")?,
        RevolveAngle::Single { angle: 360.0 },
    )?;
    model.add_feature(Feature::with_id("boss", "Boss", boss).suppressed(true))?;
    Ok(model)
}

/// One feature per reference kind, each holding a reference of that kind.
///
/// Sketch, face, edge, vertex and segment references point at `S1`/`E1`;
/// the axis and point references use standard datums.
pub fn every_reference_kind() -> Result<UnifiedModel, HarnessError> {
    let mut model = sketch_and_extrude()?;
    model.name = "Every reference kind".to_string();

    let top = face_of("E1", 1, Vec3::Z, Point3d::new(50.0, 25.0, 20.0));
    let on_top = ReferenceEntity::DatumPlane(DatumPlaneRef::new(
        "E1",
        Point3d::new(0.0, 0.0, 20.0),
        Vec3::X,
        Vec3::Z,
        None,
    ));
    model.add_feature(Feature::with_id(
        "S2",
        "On top",
        circle_sketch(10.0, 10.0, 2.0).map(|mut s| {
            s.reference_plane = Some(on_top);
            s
        })?,
    ))?;

    let up_to_face = Extrude::new(
        ProfileLink::to("S2"),
        Vec3::Z,
        BooleanOp::Merge,
        EndCondition::up_to_face(top, 0.0)?,
    )?;
    model.add_feature(Feature::with_id("X-face", "Up to face", up_to_face))?;

    let corner = vertex_of("E1", 0, Point3d::new(0.0, 0.0, 20.0));
    let up_to_vertex = Extrude::new(
        ProfileLink::to("S2"),
        Vec3::Z,
        BooleanOp::Boss,
        EndCondition::up_to_vertex(corner, 1.0)?,
    )?
    .with_end_condition2(EndCondition::up_to_vertex(ReferenceEntity::datum_point(ORIGIN), 0.0)?);
    model.add_feature(Feature::with_id("X-vertex", "Up to vertex", up_to_vertex))?;

    let axes = [
        ("X-axis", ReferenceEntity::datum_axis(AXIS_Z)),
        (
            "X-edge",
            edge_of("E1", 3, Point3d::new(0.0, 0.0, 0.0), Point3d::new(0.0, 0.0, 20.0)),
        ),
        ("X-sketch", ReferenceEntity::whole_sketch("S1")),
        (
            "X-segment",
            ReferenceEntity::sketch_segment(SubTopology::new("S1", 0), "L1"),
        ),
    ];
    for (id, axis) in axes {
        let revolve = Revolve::new(
            ProfileLink::to("S1"),
            RevolveAxis::Reference(axis),
            RevolveAngle::TwoWay {
                primary: 30.0,
                secondary: 15.0,
            },
        )?;
        model.add_feature(Feature::with_id(id, id, revolve))?;
    }
    Ok(model)
}

/// Every fixture, named.
pub fn all_scenarios() -> Result<Vec<(&'static str, UnifiedModel)>, HarnessError> {
    Ok(vec![
        ("sketch_and_extrude", sketch_and_extrude()?),
        ("plate_with_pocket", plate_with_pocket()?),
        ("every_reference_kind", every_reference_kind()?),
    ])
}
