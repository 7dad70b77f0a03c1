//! Helper functions: error type, reference constructors, profile builders,
//! round-trip drivers.

use std::path::Path;

use cadx_types::standard::PLANE_XY;
use cadx_types::{
    ConstraintKind, DatumPlaneRef, Point3d, ReferenceEntity, SketchConstraint, SketchSegment,
    SubTopology, Vec3,
};
use feature_graph::{Sketch, UnifiedModel};
use file_format::{
    decode_json, decode_model, encode_json, encode_model, load_model, save_model, LoadOptions,
    SaveOptions, SerializationFormat,
};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("feature not found: {id}")]
    FeatureNotFound { id: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("model error: {0}")]
    Model(#[from] feature_graph::ModelError),

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] cadx_types::InvalidArgument),

    #[error("save failed: {0}")]
    Save(String),

    #[error("load failed: {0}")]
    Load(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Reference Constructors ──────────────────────────────────────────────────

/// The standard XY plane as a fully populated datum-plane reference.
pub fn xy_plane() -> ReferenceEntity {
    ReferenceEntity::DatumPlane(DatumPlaneRef::new(
        PLANE_XY,
        Point3d::ORIGIN,
        Vec3::X,
        Vec3::Z,
        None,
    ))
}

/// A face of `feature` facing `normal`, fingerprinted by its centroid.
pub fn face_of(feature: &str, index: i32, normal: Vec3, centroid: Point3d) -> ReferenceEntity {
    ReferenceEntity::face(SubTopology::new(feature, index), normal, centroid)
}

/// A straight edge of `feature` from `start` to `end`.
pub fn edge_of(feature: &str, index: i32, start: Point3d, end: Point3d) -> ReferenceEntity {
    ReferenceEntity::edge(
        SubTopology::new(feature, index),
        start,
        end,
        start.midpoint(&end),
    )
}

pub fn vertex_of(feature: &str, index: i32, position: Point3d) -> ReferenceEntity {
    ReferenceEntity::vertex(SubTopology::new(feature, index), position)
}

// ── Profile Builders ────────────────────────────────────────────────────────

/// Axis-aligned rectangle on the XY plane with corner `(x, y)`.
///
/// Lines are `B`, `R`, `T`, `L` (bottom, right, top, left) and carry
/// horizontal/vertical constraints plus a width dimension on `B`.
pub fn rect_sketch(x: f64, y: f64, w: f64, h: f64) -> Result<Sketch, HarnessError> {
    let p0 = Point3d::new(x, y, 0.0);
    let p1 = Point3d::new(x + w, y, 0.0);
    let p2 = Point3d::new(x + w, y + h, 0.0);
    let p3 = Point3d::new(x, y + h, 0.0);

    let sketch = Sketch::new(Some(xy_plane()))
        .with_segment(SketchSegment::line("B", p0, p1)?)?
        .with_segment(SketchSegment::line("R", p1, p2)?)?
        .with_segment(SketchSegment::line("T", p2, p3)?)?
        .with_segment(SketchSegment::line("L", p3, p0)?)?
        .with_constraint(SketchConstraint::new(
            ConstraintKind::Horizontal,
            vec!["B".into(), "T".into()],
        )?)?
        .with_constraint(SketchConstraint::new(
            ConstraintKind::Vertical,
            vec!["L".into(), "R".into()],
        )?)?
        .with_constraint(SketchConstraint::dimensional(vec!["B".into()], w)?)?;
    Ok(sketch)
}

/// A single circle `C1` on the XY plane.
pub fn circle_sketch(cx: f64, cy: f64, r: f64) -> Result<Sketch, HarnessError> {
    let sketch = Sketch::new(Some(xy_plane()))
        .with_segment(SketchSegment::circle("C1", Point3d::new(cx, cy, 0.0), r)?)?;
    Ok(sketch)
}

// ── Round-Trip Drivers ──────────────────────────────────────────────────────

/// Encode to XML text and decode again.
pub fn xml_round_trip(model: &UnifiedModel) -> Result<UnifiedModel, HarnessError> {
    let text = encode_model(model).map_err(|e| HarnessError::Save(e.to_string()))?;
    decode_model(&text).map_err(|e| HarnessError::Load(e.to_string()))
}

/// Encode to JSON text and decode again.
pub fn json_round_trip(model: &UnifiedModel) -> Result<UnifiedModel, HarnessError> {
    let text = encode_json(model, 2).map_err(|e| HarnessError::Save(e.to_string()))?;
    decode_json(&text).map_err(|e| HarnessError::Load(e.to_string()))
}

/// Save under `dir` and load into a fresh model through the path-level API.
pub fn file_round_trip(
    model: &UnifiedModel,
    dir: &Path,
    format: SerializationFormat,
) -> Result<UnifiedModel, HarnessError> {
    let (path, save, load) = match format {
        SerializationFormat::Xml => (dir.join("model.xml"), SaveOptions::xml(), LoadOptions::xml()),
        SerializationFormat::Json => (dir.join("model.json"), SaveOptions::json(), LoadOptions::json()),
    };

    let outcome = save_model(model, &path, &save);
    if !outcome.success {
        return Err(HarnessError::Save(outcome.message.unwrap_or_default()));
    }

    let mut loaded = UnifiedModel::default();
    let outcome = load_model(&mut loaded, &path, &load);
    if !outcome.success {
        return Err(HarnessError::Load(outcome.message.unwrap_or_default()));
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_sketch_has_four_constrained_lines() {
        let sketch = rect_sketch(0.0, 0.0, 10.0, 5.0).unwrap();
        assert_eq!(sketch.segments.len(), 4);
        assert_eq!(sketch.constraints.len(), 3);
        assert_eq!(sketch.constraints[2].value, Some(10.0));
    }

    #[test]
    fn degenerate_profiles_are_rejected() {
        assert!(matches!(
            rect_sketch(0.0, 0.0, f64::NAN, 5.0),
            Err(HarnessError::InvalidArgument(_))
        ));
        assert!(circle_sketch(0.0, 0.0, -1.0).is_err());
    }

    #[test]
    fn edge_midpoint_is_derived() {
        let edge = edge_of("E1", 0, Point3d::ORIGIN, Point3d::new(4.0, 0.0, 0.0));
        assert_eq!(edge.mid_point(), Some(Point3d::new(2.0, 0.0, 0.0)));
    }
}
