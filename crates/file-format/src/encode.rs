use tracing::{debug, instrument};

use cadx_types::{SegmentGeometry, SketchConstraint, SketchSegment, LOCAL_ID_SEPARATOR};
use feature_graph::{
    EndCondition, Extrude, Feature, FeatureKind, Revolve, RevolveAxis, Sketch, UnifiedModel,
};

use crate::errors::SaveError;
use crate::registry::encode_reference;
use crate::vocab::{bool_token, end_condition_token, number, operation_token};
use crate::xml::{self, Element};

/// Name of the document's root element.
pub const ROOT_ELEMENT: &str = "UnifiedModel";

/// Encode `model` as an indented XML document.
pub fn encode_model(model: &UnifiedModel) -> Result<String, SaveError> {
    encode_model_with_indent(model, 2)
}

/// Encode `model` with `indent` spaces per level (`0` for a single line).
#[instrument(skip(model), fields(features = model.len()))]
pub fn encode_model_with_indent(model: &UnifiedModel, indent: usize) -> Result<String, SaveError> {
    let root = model_to_element(model)?;
    xml::write(&root, indent).map_err(|e| SaveError::Write(e.to_string()))
}

/// Build the document tree for `model`. Features are written in list order.
pub fn model_to_element(model: &UnifiedModel) -> Result<Element, SaveError> {
    let mut root = Element::new(ROOT_ELEMENT)
        .with_attr("UnitSystem", model.unit.token())
        .with_attr("ModelName", model.name.as_str())
        .with_attr("FeatureCount", model.len().to_string());

    for feature in model.features() {
        root.push(encode_feature(model, feature)?);
        debug!(id = feature.id(), kind = feature.kind.type_name(), "feature encoded");
    }
    Ok(root)
}

fn encode_feature(model: &UnifiedModel, feature: &Feature) -> Result<Element, SaveError> {
    let mut element = Element::new("Feature")
        .with_attr("Type", feature.kind.type_name())
        .with_attr("ID", feature.id())
        .with_attr("Name", feature.name.as_str())
        .with_attr("Suppressed", bool_token(feature.suppressed));
    if let Some(external_id) = &feature.external_id {
        element.set_attr("ExternalID", external_id.as_str());
    }

    match &feature.kind {
        FeatureKind::Sketch(sketch) => encode_sketch(sketch, &mut element),
        FeatureKind::Extrude(extrude) => encode_extrude(model, feature, extrude, &mut element)?,
        FeatureKind::Revolve(revolve) => encode_revolve(model, feature, revolve, &mut element)?,
    }
    Ok(element)
}

/// The sketch ID a profile link stands for; a link into nowhere cannot be
/// written.
fn profile_id<'a>(model: &'a UnifiedModel, feature: &'a Feature) -> Result<&'a str, SaveError> {
    feature
        .kind
        .profile()
        .and_then(|link| model.feature_id_of(link))
        .ok_or_else(|| {
            SaveError::Write(format!(
                "feature {} has a profile link that names no feature",
                feature.id()
            ))
        })
}

// ── Sketch ───────────────────────────────────────────────────────────────

fn encode_sketch(sketch: &Sketch, element: &mut Element) {
    if let Some(plane) = &sketch.reference_plane {
        element.push(encode_reference("ReferencePlane", plane));
    }

    let mut segments = Element::new("Segments");
    for segment in &sketch.segments {
        segments.push(encode_segment(segment));
    }
    element.push(segments);

    let mut constraints = Element::new("Constraints");
    for constraint in &sketch.constraints {
        constraints.push(encode_constraint(constraint));
    }
    element.push(constraints);
}

fn encode_segment(segment: &SketchSegment) -> Element {
    let mut element = Element::new("Segment")
        .with_attr("Type", segment.kind().token())
        .with_attr("LocalID", segment.local_id.as_str())
        .with_attr("Construction", bool_token(segment.construction));

    match &segment.geometry {
        SegmentGeometry::Line { start, end } => {
            element.set_attr("Start", start.to_string());
            element.set_attr("End", end.to_string());
        }
        SegmentGeometry::Circle { center, radius } => {
            element.set_attr("Center", center.to_string());
            element.set_attr("Radius", number(*radius));
        }
        SegmentGeometry::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        } => {
            element.set_attr("Center", center.to_string());
            element.set_attr("Radius", number(*radius));
            element.set_attr("StartAngle", number(*start_angle));
            element.set_attr("EndAngle", number(*end_angle));
            element.set_attr("Clockwise", bool_token(*clockwise));
        }
        SegmentGeometry::Point { position } => {
            element.set_attr("Position", position.to_string());
        }
    }
    element
}

fn encode_constraint(constraint: &SketchConstraint) -> Element {
    let separator = LOCAL_ID_SEPARATOR.to_string();
    Element::new("Constraint")
        .with_attr("Type", constraint.kind.ordinal().to_string())
        .with_attr("Dimension", number(constraint.value.unwrap_or(0.0)))
        .with_attr("Entities", constraint.entities.join(separator.as_str()))
}

// ── Extrude ──────────────────────────────────────────────────────────────

fn encode_extrude(
    model: &UnifiedModel,
    feature: &Feature,
    extrude: &Extrude,
    element: &mut Element,
) -> Result<(), SaveError> {
    element.set_attr("Operation", operation_token(extrude.operation));

    element.push(Element::new("ProfileSketchID").with_attr("Value", profile_id(model, feature)?));
    element.push(Element::new("Direction").with_attr("Value", extrude.direction.to_string()));
    element.push(encode_end_condition("EndCondition1", &extrude.end_condition));
    if let Some(ec) = &extrude.end_condition2 {
        element.push(encode_end_condition("EndCondition2", ec));
    }
    if let Some(draft) = &extrude.draft {
        element.push(
            Element::new("Draft")
                .with_attr("Angle", number(draft.angle))
                .with_attr("Outward", bool_token(draft.outward)),
        );
    }
    if let Some(thin) = &extrude.thin_wall {
        element.push(
            Element::new("ThinWall")
                .with_attr("Thickness", number(thin.thickness))
                .with_attr("OneSided", bool_token(thin.one_sided))
                .with_attr("Covered", bool_token(thin.covered)),
        );
    }
    Ok(())
}

fn encode_end_condition(name: &str, ec: &EndCondition) -> Element {
    let (offset, has_offset) = ec.offset().unwrap_or((0.0, false));
    let mut element = Element::new(name)
        .with_attr("Type", end_condition_token(ec.condition_type()))
        .with_attr("Depth", number(ec.depth().unwrap_or(0.0)))
        .with_attr("Offset", number(offset))
        .with_attr("HasOffset", bool_token(has_offset))
        .with_attr("Flip", bool_token(ec.flip))
        .with_attr("FlipMaterialSide", bool_token(ec.flip_material_side));
    if let Some(reference) = ec.reference() {
        element.push(encode_reference("ReferenceEntity", reference));
    }
    element
}

// ── Revolve ──────────────────────────────────────────────────────────────

fn encode_revolve(
    model: &UnifiedModel,
    feature: &Feature,
    revolve: &Revolve,
    element: &mut Element,
) -> Result<(), SaveError> {
    element.set_attr("ProfileSketchID", profile_id(model, feature)?);
    element.set_attr("AngleKind", revolve.angle.ordinal().to_string());
    element.set_attr("PrimaryAngle", number(revolve.angle.primary()));
    element.set_attr("SecondaryAngle", number(revolve.angle.secondary()));

    let mut axis = Element::new("Axis").with_attr("Kind", revolve.axis.ordinal().to_string());
    match &revolve.axis {
        RevolveAxis::SketchSegment { local_id } => {
            axis.set_attr("RefLocalID", local_id.as_str());
        }
        RevolveAxis::Explicit { origin, direction } => {
            axis.set_attr("RefLocalID", "");
            axis.set_attr("Origin", origin.to_string());
            axis.set_attr("Direction", direction.to_string());
        }
        RevolveAxis::Reference(reference) => {
            axis.set_attr("RefLocalID", "");
            axis.push(encode_reference("ReferenceEntity", reference));
        }
    }
    element.push(axis);
    Ok(())
}
