use tracing::{debug, instrument, warn};

use cadx_types::{
    ConstraintKind, InvalidArgument, SegmentGeometry, SketchConstraint, SketchSegment,
    LOCAL_ID_SEPARATOR,
};
use feature_graph::{
    DraftOption, EndCondition, EndConditionKind, EndConditionType, Extrude, Feature, FeatureKind,
    ProfileLink, Revolve, RevolveAngle, RevolveAxis, Sketch, ThinWallOption, UnifiedModel,
};

use crate::encode::ROOT_ELEMENT;
use crate::errors::LoadError;
use crate::registry::decode_reference;
use crate::vocab::{
    opt_bool, req_bool, req_end_condition, req_f64, req_i32, req_operation, req_point, req_u32,
    req_unit, req_vec, required,
};
use crate::xml::{self, Element};

fn invalid(element: &Element, err: InvalidArgument) -> LoadError {
    LoadError::malformed(format!("<{}>: {err}", element.name))
}

fn required_child<'a>(element: &'a Element, name: &str) -> Result<&'a Element, LoadError> {
    element.child(name).ok_or_else(|| {
        LoadError::malformed(format!("<{}> is missing child <{name}>", element.name))
    })
}

/// Decode an XML document into a model.
///
/// Features are appended in document order without identity checks, so a
/// document with empty or repeated IDs still loads and can be inspected with
/// [`UnifiedModel::validate`]. Profile links are bound once every feature is
/// in place, which lets a feature name a sketch that appears later in the
/// document.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn decode_model(text: &str) -> Result<UnifiedModel, LoadError> {
    let root = xml::parse(text).map_err(|e| LoadError::MalformedDocument(e.to_string()))?;
    model_from_element(&root)
}

/// Decode an already-parsed document tree.
pub fn model_from_element(root: &Element) -> Result<UnifiedModel, LoadError> {
    if root.name != ROOT_ELEMENT {
        return Err(LoadError::malformed(format!(
            "root element is <{}>, expected <{ROOT_ELEMENT}>",
            root.name
        )));
    }

    let unit = match root.attr("UnitSystem") {
        Some(_) => req_unit(root, "UnitSystem")?,
        None => Default::default(),
    };
    let name = root.attr("ModelName").unwrap_or_default();
    let mut model = UnifiedModel::new(unit, name);

    for (index, element) in root.children_named("Feature").enumerate() {
        let feature = decode_feature(element).map_err(|err| match err {
            LoadError::MalformedDocument(reason) => LoadError::MalformedDocument(format!(
                "feature #{index} ({:?}): {reason}",
                element.attr("ID").unwrap_or_default()
            )),
            other => other,
        })?;
        debug!(index, id = feature.id(), kind = feature.kind.type_name(), "feature decoded");
        model.insert_unchecked(feature);
    }

    if root.attr("FeatureCount").is_some() {
        let declared = req_u32(root, "FeatureCount")? as usize;
        if declared != model.len() {
            warn!(declared, actual = model.len(), "FeatureCount does not match document");
        }
    }

    model.relink_profiles()?;
    Ok(model)
}

fn decode_feature(element: &Element) -> Result<Feature, LoadError> {
    let type_name = required(element, "Type")?;
    let kind = if type_name.eq_ignore_ascii_case("Sketch") {
        FeatureKind::Sketch(decode_sketch(element)?)
    } else if type_name.eq_ignore_ascii_case("Extrude") {
        FeatureKind::Extrude(decode_extrude(element)?)
    } else if type_name.eq_ignore_ascii_case("Revolve") {
        FeatureKind::Revolve(decode_revolve(element)?)
    } else {
        return Err(LoadError::malformed(format!("unknown feature type {type_name:?}")));
    };

    let mut feature = Feature::with_id(
        element.attr("ID").unwrap_or_default(),
        element.attr("Name").unwrap_or_default(),
        kind,
    )
    .suppressed(opt_bool(element, "Suppressed")?);
    if let Some(external_id) = element.attr("ExternalID") {
        feature = feature.with_external_id(external_id);
    }
    Ok(feature)
}

// ── Sketch ───────────────────────────────────────────────────────────────

fn decode_sketch(element: &Element) -> Result<Sketch, LoadError> {
    let reference_plane = element
        .child("ReferencePlane")
        .map(decode_reference)
        .transpose()?;
    let mut sketch = Sketch::new(reference_plane);

    // Duplicate local IDs and unknown constraint participants are left for
    // validation to report.
    if let Some(segments) = element.child("Segments") {
        for segment in segments.children_named("Segment") {
            sketch.segments.push(decode_segment(segment)?);
        }
    }
    if let Some(constraints) = element.child("Constraints") {
        for constraint in constraints.children_named("Constraint") {
            sketch.constraints.push(decode_constraint(constraint)?);
        }
    }
    Ok(sketch)
}

fn decode_segment(element: &Element) -> Result<SketchSegment, LoadError> {
    let type_name = required(element, "Type")?;
    let geometry = match type_name.to_ascii_lowercase().as_str() {
        "line" => SegmentGeometry::Line {
            start: req_point(element, "Start")?,
            end: req_point(element, "End")?,
        },
        "circle" => SegmentGeometry::Circle {
            center: req_point(element, "Center")?,
            radius: req_f64(element, "Radius")?,
        },
        "arc" => SegmentGeometry::Arc {
            center: req_point(element, "Center")?,
            radius: req_f64(element, "Radius")?,
            start_angle: req_f64(element, "StartAngle")?,
            end_angle: req_f64(element, "EndAngle")?,
            clockwise: opt_bool(element, "Clockwise")?,
        },
        "point" => SegmentGeometry::Point {
            position: req_point(element, "Position")?,
        },
        _ => {
            return Err(LoadError::malformed(format!(
                "unknown segment type {type_name:?}"
            )))
        }
    };

    let mut segment = SketchSegment::new(required(element, "LocalID")?, geometry)
        .map_err(|e| invalid(element, e))?;
    segment.construction = opt_bool(element, "Construction")?;
    Ok(segment)
}

fn decode_constraint(element: &Element) -> Result<SketchConstraint, LoadError> {
    let ordinal = req_i32(element, "Type")?;
    let kind = ConstraintKind::from_ordinal(ordinal).ok_or_else(|| {
        LoadError::malformed(format!("unknown constraint type {ordinal}"))
    })?;
    let entities: Vec<String> = element
        .attr("Entities")
        .unwrap_or_default()
        .split(LOCAL_ID_SEPARATOR)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    let constraint = if kind == ConstraintKind::Dimensional {
        SketchConstraint::dimensional(entities, req_f64(element, "Dimension")?)
    } else {
        SketchConstraint::new(kind, entities)
    };
    constraint.map_err(|e| invalid(element, e))
}

// ── Extrude ──────────────────────────────────────────────────────────────

fn decode_extrude(element: &Element) -> Result<Extrude, LoadError> {
    let profile = required(required_child(element, "ProfileSketchID")?, "Value")?;
    let direction = req_vec(required_child(element, "Direction")?, "Value")?;
    let operation = match element.attr("Operation") {
        Some(_) => req_operation(element, "Operation")?,
        None => Default::default(),
    };

    let draft = element
        .child("Draft")
        .map(|e| {
            DraftOption::new(req_f64(e, "Angle")?, opt_bool(e, "Outward")?).map_err(|err| invalid(e, err))
        })
        .transpose()?;
    let thin_wall = element
        .child("ThinWall")
        .map(|e| {
            ThinWallOption::new(
                req_f64(e, "Thickness")?,
                opt_bool(e, "OneSided")?,
                opt_bool(e, "Covered")?,
            )
            .map_err(|err| invalid(e, err))
        })
        .transpose()?;

    // Built field by field so the stored direction is kept exactly as
    // written; the validity check below still rejects a zero vector.
    let extrude = Extrude {
        profile: ProfileLink::to(profile),
        direction,
        operation,
        end_condition: decode_end_condition(required_child(element, "EndCondition1")?)?,
        end_condition2: element
            .child("EndCondition2")
            .map(decode_end_condition)
            .transpose()?,
        draft,
        thin_wall,
    };
    extrude.validate().map_err(|e| invalid(element, e))?;
    Ok(extrude)
}

fn decode_end_condition(element: &Element) -> Result<EndCondition, LoadError> {
    let condition = match req_end_condition(element, "Type")? {
        EndConditionType::Blind => EndCondition::blind(req_f64(element, "Depth")?),
        EndConditionType::MidPlane => EndCondition::mid_plane(req_f64(element, "Depth")?),
        EndConditionType::ThroughAll => Ok(EndCondition::through_all()),
        EndConditionType::UpToNext => Ok(EndCondition::up_to_next()),
        EndConditionType::ThroughAllBothSides => Ok(EndCondition::through_all_both_sides()),
        kind @ (EndConditionType::UpToFace | EndConditionType::UpToVertex) => {
            let reference = decode_reference(required_child(element, "ReferenceEntity")?)?;
            let offset = match element.attr("Offset") {
                Some(_) => req_f64(element, "Offset")?,
                None => 0.0,
            };
            if kind == EndConditionType::UpToFace {
                EndCondition::up_to_face(reference, offset)
            } else {
                EndCondition::up_to_vertex(reference, offset)
            }
        }
    };
    let mut condition = condition.map_err(|e| invalid(element, e))?;

    if element.attr("HasOffset").is_some() {
        let flag = req_bool(element, "HasOffset")?;
        if let EndConditionKind::UpToFace { has_offset, .. }
        | EndConditionKind::UpToVertex { has_offset, .. } = &mut condition.kind
        {
            *has_offset = flag;
        }
    }

    Ok(condition
        .flipped(opt_bool(element, "Flip")?)
        .with_flip_material_side(opt_bool(element, "FlipMaterialSide")?))
}

// ── Revolve ──────────────────────────────────────────────────────────────

fn decode_revolve(element: &Element) -> Result<Revolve, LoadError> {
    let profile = required(element, "ProfileSketchID")?;
    let primary = req_f64(element, "PrimaryAngle")?;
    let angle = match req_i32(element, "AngleKind")? {
        0 => RevolveAngle::Single { angle: primary },
        1 => RevolveAngle::TwoWay {
            primary,
            secondary: req_f64(element, "SecondaryAngle")?,
        },
        2 => RevolveAngle::Symmetric { total: primary },
        other => {
            return Err(LoadError::malformed(format!("unknown revolve angle kind {other}")))
        }
    };

    let axis_element = required_child(element, "Axis")?;
    let axis = match req_i32(axis_element, "Kind")? {
        0 => RevolveAxis::SketchSegment {
            local_id: required(axis_element, "RefLocalID")?.to_string(),
        },
        1 => RevolveAxis::Explicit {
            origin: req_point(axis_element, "Origin")?,
            direction: req_vec(axis_element, "Direction")?,
        },
        2 => RevolveAxis::Reference(decode_reference(required_child(
            axis_element,
            "ReferenceEntity",
        )?)?),
        other => return Err(LoadError::malformed(format!("unknown revolve axis kind {other}"))),
    };

    let revolve = Revolve {
        profile: ProfileLink::to(profile),
        axis,
        angle,
    };
    revolve.validate().map_err(|e| invalid(element, e))?;
    Ok(revolve)
}
