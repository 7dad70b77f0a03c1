//! Text tokens for enumerations and scalars in the XML format.
//!
//! Writers always emit the canonical spelling. Readers match case-insensitively
//! and reject anything they do not recognise.

use std::str::FromStr;

use cadx_types::{Point3d, UnitSystem, Vec3};
use feature_graph::{BooleanOp, EndConditionType};

use crate::errors::LoadError;
use crate::xml::Element;

pub fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn operation_token(op: BooleanOp) -> &'static str {
    match op {
        BooleanOp::Boss => "BOSS",
        BooleanOp::Cut => "Cut",
        BooleanOp::Merge => "Merge",
    }
}

pub fn parse_operation(text: &str) -> Option<BooleanOp> {
    match text.trim().to_ascii_lowercase().as_str() {
        "boss" => Some(BooleanOp::Boss),
        "cut" => Some(BooleanOp::Cut),
        "merge" => Some(BooleanOp::Merge),
        _ => None,
    }
}

pub fn end_condition_token(kind: EndConditionType) -> &'static str {
    match kind {
        EndConditionType::Blind => "Blind",
        EndConditionType::ThroughAll => "ThroughAll",
        EndConditionType::UpToNext => "UpToNext",
        EndConditionType::UpToFace => "UpToFace",
        EndConditionType::UpToVertex => "UpToVertex",
        EndConditionType::MidPlane => "MidPlane",
        EndConditionType::ThroughAllBothSides => "ThroughAllBothSides",
    }
}

pub fn parse_end_condition(text: &str) -> Option<EndConditionType> {
    let text = text.trim();
    EndConditionType::ALL
        .into_iter()
        .find(|kind| end_condition_token(*kind).eq_ignore_ascii_case(text))
}

/// Shortest round-trippable decimal form of a float.
pub fn number(value: f64) -> String {
    value.to_string()
}

// ── Attribute readers ────────────────────────────────────────────────────

/// Required attribute text.
pub fn required<'a>(element: &'a Element, key: &str) -> Result<&'a str, LoadError> {
    element.attr(key).ok_or_else(|| {
        LoadError::malformed(format!("<{}> is missing attribute {key}", element.name))
    })
}

fn parse_with<T>(element: &Element, key: &str, text: &str, what: &str, parsed: Option<T>) -> Result<T, LoadError> {
    parsed.ok_or_else(|| {
        LoadError::malformed(format!(
            "<{}> attribute {key}={text:?} is not a valid {what}",
            element.name
        ))
    })
}

fn parse_from_str<T: FromStr>(element: &Element, key: &str, what: &str) -> Result<T, LoadError> {
    let text = required(element, key)?;
    parse_with(element, key, text, what, text.trim().parse::<T>().ok())
}

pub fn req_f64(element: &Element, key: &str) -> Result<f64, LoadError> {
    parse_from_str(element, key, "number")
}

pub fn req_i32(element: &Element, key: &str) -> Result<i32, LoadError> {
    parse_from_str(element, key, "integer")
}

pub fn req_u32(element: &Element, key: &str) -> Result<u32, LoadError> {
    parse_from_str(element, key, "count")
}

pub fn req_point(element: &Element, key: &str) -> Result<Point3d, LoadError> {
    parse_from_str(element, key, "point triple")
}

pub fn req_vec(element: &Element, key: &str) -> Result<Vec3, LoadError> {
    parse_from_str(element, key, "vector triple")
}

pub fn opt_vec(element: &Element, key: &str) -> Result<Option<Vec3>, LoadError> {
    match element.attr(key) {
        Some(_) => req_vec(element, key).map(Some),
        None => Ok(None),
    }
}

pub fn req_bool(element: &Element, key: &str) -> Result<bool, LoadError> {
    let text = required(element, key)?;
    parse_with(element, key, text, "boolean", parse_bool(text))
}

/// Boolean attribute that defaults to `false` when absent.
pub fn opt_bool(element: &Element, key: &str) -> Result<bool, LoadError> {
    match element.attr(key) {
        Some(_) => req_bool(element, key),
        None => Ok(false),
    }
}

pub fn req_unit(element: &Element, key: &str) -> Result<UnitSystem, LoadError> {
    parse_from_str(element, key, "unit system")
}

pub fn req_operation(element: &Element, key: &str) -> Result<BooleanOp, LoadError> {
    let text = required(element, key)?;
    parse_with(element, key, text, "boolean operation", parse_operation(text))
}

pub fn req_end_condition(element: &Element, key: &str) -> Result<EndConditionType, LoadError> {
    let text = required(element, key)?;
    parse_with(element, key, text, "end condition type", parse_end_condition(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_accept_digits() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn operation_tokens() {
        assert_eq!(operation_token(BooleanOp::Boss), "BOSS");
        assert_eq!(parse_operation("boss"), Some(BooleanOp::Boss));
        assert_eq!(parse_operation("CUT"), Some(BooleanOp::Cut));
        assert_eq!(parse_operation("Subtract"), None);
    }

    #[test]
    fn end_condition_tokens_round_trip() {
        for kind in EndConditionType::ALL {
            assert_eq!(parse_end_condition(end_condition_token(kind)), Some(kind));
        }
        assert_eq!(parse_end_condition("throughall"), Some(EndConditionType::ThroughAll));
        assert_eq!(parse_end_condition("Sideways"), None);
    }

    #[test]
    fn missing_and_bad_attributes_are_malformed() {
        let e = Element::new("Segment").with_attr("Radius", "abc");
        assert!(matches!(req_f64(&e, "Radius"), Err(LoadError::MalformedDocument(_))));
        assert!(matches!(req_f64(&e, "Depth"), Err(LoadError::MalformedDocument(_))));
        assert_eq!(opt_bool(&e, "Flip"), Ok(false));
    }

    #[test]
    fn numbers_round_trip_exactly() {
        for v in [0.0, 20.0, 0.1, -1.5e-7, 123456.789] {
            assert_eq!(number(v).parse::<f64>().unwrap(), v);
        }
        assert_eq!(number(20.0), "20");
    }
}
