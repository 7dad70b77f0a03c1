//! Rich assertion helpers with diagnostic output.
//!
//! Every failure lists each difference found (not just the first) followed
//! by a report of the model under test.

use approx::relative_eq;

use cadx_types::{ReferenceEntity, SketchSegment};
use feature_graph::{
    EndCondition, Extrude, Feature, FeatureKind, ProfileLink, Revolve, Sketch, UnifiedModel,
};
use file_format::encode_model;

use crate::helpers::HarnessError;
use crate::report::ModelReport;

/// Relative tolerance for scalar fields (depths, radii, angles).
pub const SCALAR_TOLERANCE: f64 = 1e-9;

fn scalar_eq(a: f64, b: f64) -> bool {
    relative_eq!(a, b, epsilon = SCALAR_TOLERANCE, max_relative = SCALAR_TOLERANCE)
}

/// Collects differences under a path prefix such as `feature[1] E1`.
struct Diff {
    found: Vec<String>,
}

impl Diff {
    fn check<T: PartialEq + std::fmt::Debug>(&mut self, path: &str, what: &str, a: &T, b: &T) {
        if a != b {
            self.found
                .push(format!("{path}: {what}: expected {a:?}, got {b:?}"));
        }
    }

    fn scalar(&mut self, path: &str, what: &str, a: f64, b: f64) {
        if !scalar_eq(a, b) {
            self.found
                .push(format!("{path}: {what}: expected {a}, got {b}"));
        }
    }

    fn opt_scalar(&mut self, path: &str, what: &str, a: Option<f64>, b: Option<f64>) {
        match (a, b) {
            (Some(a), Some(b)) => self.scalar(path, what, a, b),
            (None, None) => {}
            _ => self.check(path, what, &a, &b),
        }
    }
}

/// List every difference between two models. Empty means equivalent.
///
/// Profile links are compared by the feature ID they name in their own
/// model, so a linked model and its reloaded copy compare equal.
pub fn model_differences(expected: &UnifiedModel, actual: &UnifiedModel) -> Vec<String> {
    let mut diff = Diff { found: Vec::new() };
    diff.check("model", "unit", &expected.unit, &actual.unit);
    diff.check("model", "name", &expected.name, &actual.name);
    diff.check("model", "feature count", &expected.len(), &actual.len());

    for (index, (a, b)) in expected.features().iter().zip(actual.features()).enumerate() {
        let path = format!("feature[{index}] {}", a.id());
        compare_feature(&mut diff, &path, expected, a, actual, b);
    }
    diff.found
}

fn compare_feature(
    diff: &mut Diff,
    path: &str,
    expected: &UnifiedModel,
    a: &Feature,
    actual: &UnifiedModel,
    b: &Feature,
) {
    diff.check(path, "id", &a.id(), &b.id());
    diff.check(path, "name", &a.name, &b.name);
    diff.check(path, "external id", &a.external_id, &b.external_id);
    diff.check(path, "suppressed", &a.suppressed, &b.suppressed);
    diff.check(path, "type", &a.kind.type_name(), &b.kind.type_name());

    match (&a.kind, &b.kind) {
        (FeatureKind::Sketch(x), FeatureKind::Sketch(y)) => compare_sketch(diff, path, x, y),
        (FeatureKind::Extrude(x), FeatureKind::Extrude(y)) => {
            compare_profile(diff, path, expected, &x.profile, actual, &y.profile);
            compare_extrude(diff, path, x, y);
        }
        (FeatureKind::Revolve(x), FeatureKind::Revolve(y)) => {
            compare_profile(diff, path, expected, &x.profile, actual, &y.profile);
            compare_revolve(diff, path, x, y);
        }
        _ => {}
    }
}

fn compare_profile(
    diff: &mut Diff,
    path: &str,
    expected: &UnifiedModel,
    a: &ProfileLink,
    actual: &UnifiedModel,
    b: &ProfileLink,
) {
    diff.check(
        path,
        "profile",
        &expected.feature_id_of(a),
        &actual.feature_id_of(b),
    );
    diff.check(path, "profile linked", &a.is_linked(), &b.is_linked());
}

fn compare_reference(
    diff: &mut Diff,
    path: &str,
    what: &str,
    a: Option<&ReferenceEntity>,
    b: Option<&ReferenceEntity>,
) {
    diff.check(path, what, &a, &b);
}

fn compare_sketch(diff: &mut Diff, path: &str, a: &Sketch, b: &Sketch) {
    compare_reference(
        diff,
        path,
        "reference plane",
        a.reference_plane.as_ref(),
        b.reference_plane.as_ref(),
    );
    diff.check(path, "segment count", &a.segments.len(), &b.segments.len());
    for (x, y) in a.segments.iter().zip(&b.segments) {
        compare_segment(diff, &format!("{path} segment {}", x.local_id), x, y);
    }
    diff.check(path, "constraint count", &a.constraints.len(), &b.constraints.len());
    for (i, (x, y)) in a.constraints.iter().zip(&b.constraints).enumerate() {
        let path = format!("{path} constraint[{i}]");
        diff.check(&path, "kind", &x.kind, &y.kind);
        diff.check(&path, "entities", &x.entities, &y.entities);
        diff.opt_scalar(&path, "value", x.value, y.value);
    }
}

fn compare_segment(diff: &mut Diff, path: &str, a: &SketchSegment, b: &SketchSegment) {
    use cadx_types::SegmentGeometry as G;

    diff.check(path, "local id", &a.local_id, &b.local_id);
    diff.check(path, "construction", &a.construction, &b.construction);
    match (&a.geometry, &b.geometry) {
        (G::Line { start: s1, end: e1 }, G::Line { start: s2, end: e2 }) => {
            diff.check(path, "start", s1, s2);
            diff.check(path, "end", e1, e2);
        }
        (
            G::Circle {
                center: c1,
                radius: r1,
            },
            G::Circle {
                center: c2,
                radius: r2,
            },
        ) => {
            diff.check(path, "center", c1, c2);
            diff.scalar(path, "radius", *r1, *r2);
        }
        (
            G::Arc {
                center: c1,
                radius: r1,
                start_angle: s1,
                end_angle: e1,
                clockwise: w1,
            },
            G::Arc {
                center: c2,
                radius: r2,
                start_angle: s2,
                end_angle: e2,
                clockwise: w2,
            },
        ) => {
            diff.check(path, "center", c1, c2);
            diff.scalar(path, "radius", *r1, *r2);
            diff.scalar(path, "start angle", *s1, *s2);
            diff.scalar(path, "end angle", *e1, *e2);
            diff.check(path, "clockwise", w1, w2);
        }
        (G::Point { position: p1 }, G::Point { position: p2 }) => {
            diff.check(path, "position", p1, p2);
        }
        (x, y) => diff.check(path, "segment kind", &x.kind(), &y.kind()),
    }
}

fn compare_end_condition(diff: &mut Diff, path: &str, a: &EndCondition, b: &EndCondition) {
    diff.check(path, "type", &a.condition_type(), &b.condition_type());
    diff.opt_scalar(path, "depth", a.depth(), b.depth());
    diff.opt_scalar(path, "offset", a.offset().map(|o| o.0), b.offset().map(|o| o.0));
    diff.check(path, "has offset", &a.offset().map(|o| o.1), &b.offset().map(|o| o.1));
    diff.check(path, "flip", &a.flip, &b.flip);
    diff.check(path, "flip material side", &a.flip_material_side, &b.flip_material_side);
    compare_reference(diff, path, "reference", a.reference(), b.reference());
}

fn compare_extrude(diff: &mut Diff, path: &str, a: &Extrude, b: &Extrude) {
    diff.check(path, "direction", &a.direction, &b.direction);
    diff.check(path, "operation", &a.operation, &b.operation);
    compare_end_condition(
        diff,
        &format!("{path} end condition 1"),
        &a.end_condition,
        &b.end_condition,
    );
    match (&a.end_condition2, &b.end_condition2) {
        (Some(x), Some(y)) => compare_end_condition(diff, &format!("{path} end condition 2"), x, y),
        (x, y) => diff.check(path, "end condition 2 present", &x.is_some(), &y.is_some()),
    }
    match (&a.draft, &b.draft) {
        (Some(x), Some(y)) => {
            diff.scalar(path, "draft angle", x.angle, y.angle);
            diff.check(path, "draft outward", &x.outward, &y.outward);
        }
        (x, y) => diff.check(path, "draft present", &x.is_some(), &y.is_some()),
    }
    match (&a.thin_wall, &b.thin_wall) {
        (Some(x), Some(y)) => {
            diff.scalar(path, "thin wall thickness", x.thickness, y.thickness);
            diff.check(path, "thin wall one sided", &x.one_sided, &y.one_sided);
            diff.check(path, "thin wall covered", &x.covered, &y.covered);
        }
        (x, y) => diff.check(path, "thin wall present", &x.is_some(), &y.is_some()),
    }
}

fn compare_revolve(diff: &mut Diff, path: &str, a: &Revolve, b: &Revolve) {
    diff.check(path, "axis", &a.axis, &b.axis);
    diff.check(path, "angle kind", &a.angle.ordinal(), &b.angle.ordinal());
    diff.scalar(path, "primary angle", a.angle.primary(), b.angle.primary());
    diff.scalar(path, "secondary angle", a.angle.secondary(), b.angle.secondary());
}

/// Assert two models describe the same feature tree within tolerance.
pub fn assert_models_equivalent(
    expected: &UnifiedModel,
    actual: &UnifiedModel,
    ctx: &str,
) -> Result<(), HarnessError> {
    let differences = model_differences(expected, actual);
    if differences.is_empty() {
        return Ok(());
    }
    Err(HarnessError::AssertionFailed {
        detail: format!(
            "[{ctx}] {} difference(s):\n  {}\n\n{}",
            differences.len(),
            differences.join("\n  "),
            ModelReport::from_model(actual).to_text(),
        ),
    })
}

/// Assert the model passes validation with no errors.
pub fn assert_valid(model: &UnifiedModel, ctx: &str) -> Result<(), HarnessError> {
    let report = model.validate();
    if report.is_valid {
        return Ok(());
    }
    let errors: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
    Err(HarnessError::AssertionFailed {
        detail: format!(
            "[{ctx}] expected a valid model, got {} error(s):\n  {}",
            errors.len(),
            errors.join("\n  "),
        ),
    })
}

/// Assert that a feature with `id` exists and is of `type_name`.
pub fn assert_feature_type(
    model: &UnifiedModel,
    id: &str,
    type_name: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    let feature = model
        .get(id)
        .ok_or_else(|| HarnessError::FeatureNotFound { id: id.to_string() })?;
    if feature.kind.type_name() == type_name {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] feature {id}: expected {type_name}, got {}",
                feature.kind.type_name()
            ),
        })
    }
}

/// Assert that encoding `model` twice through a load gives identical text.
pub fn assert_save_idempotent(model: &UnifiedModel, ctx: &str) -> Result<(), HarnessError> {
    let first = encode_model(model).map_err(|e| HarnessError::Save(e.to_string()))?;
    let reloaded = crate::helpers::xml_round_trip(model)?;
    let second = encode_model(&reloaded).map_err(|e| HarnessError::Save(e.to_string()))?;
    if first == second {
        return Ok(());
    }
    let line = first
        .lines()
        .zip(second.lines())
        .position(|(a, b)| a != b)
        .map(|i| i + 1)
        .unwrap_or_else(|| first.lines().count().min(second.lines().count()) + 1);
    Err(HarnessError::AssertionFailed {
        detail: format!("[{ctx}] second save differs from the first at line {line}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sketch_and_extrude;

    #[test]
    fn identical_models_have_no_differences() {
        let model = sketch_and_extrude().unwrap();
        assert!(model_differences(&model, &model.clone()).is_empty());
    }

    #[test]
    fn every_difference_is_reported() {
        let model = sketch_and_extrude().unwrap();
        let mut other = model.clone();
        other.name = "renamed".into();
        other.set_suppressed("E1", true).unwrap();

        let differences = model_differences(&model, &other);
        assert_eq!(differences.len(), 2, "{differences:?}");
        assert!(differences[0].contains("name"));
        assert!(differences[1].contains("feature[1] E1: suppressed"));

        let err = assert_models_equivalent(&model, &other, "ctx").unwrap_err();
        assert!(err.to_string().contains("[ctx] 2 difference(s)"));
    }

    #[test]
    fn tiny_scalar_drift_is_tolerated() {
        assert!(scalar_eq(20.0, 20.0 + 1e-12));
        assert!(!scalar_eq(20.0, 20.001));
    }
}
