use std::collections::HashSet;
use std::fmt;

use cadx_types::ConstraintKind;

use crate::model::UnifiedModel;
use crate::resolve;
use crate::types::{Feature, FeatureHandle, FeatureKind, ProfileLink, Sketch};

/// One problem found by [`UnifiedModel::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Position of the offending feature, or `None` for model-wide issues.
    pub feature: Option<FeatureHandle>,
    /// ID of the offending feature (may be empty).
    pub feature_id: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.feature {
            Some(handle) => write!(
                f,
                "feature #{} ({:?}): {}",
                handle.index(),
                self.feature_id,
                self.message
            ),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Aggregated result of checking a whole model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

struct Collector<'a> {
    handle: FeatureHandle,
    feature: &'a Feature,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Collector<'_> {
    fn issue(&self, message: String) -> ValidationIssue {
        ValidationIssue {
            feature: Some(self.handle),
            feature_id: self.feature.id().to_string(),
            message,
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let issue = self.issue(message.into());
        self.errors.push(issue);
    }

    fn warn(&mut self, message: impl Into<String>) {
        let issue = self.issue(message.into());
        self.warnings.push(issue);
    }
}

pub(crate) fn validate_model(model: &UnifiedModel) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_ids = HashSet::new();
    let mut seen_external = HashSet::new();

    for (index, feature) in model.features().iter().enumerate() {
        let mut c = Collector {
            handle: FeatureHandle(index),
            feature,
            errors: Vec::new(),
            warnings: Vec::new(),
        };

        check_identity(model, &mut c, &mut seen_ids, &mut seen_external);
        check_local(&mut c);
        check_links(model, &mut c);

        report.errors.append(&mut c.errors);
        report.warnings.append(&mut c.warnings);
    }

    report.is_valid = report.errors.is_empty();
    report
}

fn check_identity<'a>(
    model: &UnifiedModel,
    c: &mut Collector<'a>,
    seen_ids: &mut HashSet<&'a str>,
    seen_external: &mut HashSet<&'a str>,
) {
    let feature = c.feature;
    let id = feature.id();

    if id.is_empty() {
        c.error("feature ID is empty");
    } else if !seen_ids.insert(id) {
        c.error(format!("duplicate feature ID {id:?}"));
    } else if !model.is_indexed_at(id, c.handle) {
        c.error(format!("ID index does not point at feature {id:?}"));
    }

    if let Some(external_id) = feature.external_id.as_deref() {
        if external_id.is_empty() {
            c.warn("external ID is present but empty");
        } else if !seen_external.insert(external_id) {
            c.error(format!("duplicate external ID {external_id:?}"));
        } else if !model.is_external_indexed_at(external_id, c.handle) {
            c.error(format!(
                "external ID index does not point at feature {external_id:?}"
            ));
        }
    }

    if feature.name.is_empty() {
        c.warn("feature name is empty");
    }
}

fn check_local(c: &mut Collector<'_>) {
    let feature = c.feature;
    match &feature.kind {
        FeatureKind::Sketch(sketch) => check_sketch(c, sketch),
        FeatureKind::Extrude(extrude) => {
            if let Err(e) = extrude.validate() {
                c.error(e.to_string());
            }
        }
        FeatureKind::Revolve(revolve) => {
            if let Err(e) = revolve.validate() {
                c.error(e.to_string());
            }
        }
    }
}

fn check_sketch(c: &mut Collector<'_>, sketch: &Sketch) {
    let mut local_ids = HashSet::new();
    for segment in &sketch.segments {
        if segment.local_id.is_empty() {
            c.error("sketch segment has an empty local ID");
        } else if !local_ids.insert(segment.local_id.as_str()) {
            c.error(format!("duplicate segment local ID {:?}", segment.local_id));
        }
        if let Err(e) = segment.geometry.validate() {
            c.error(format!("segment {:?}: {e}", segment.local_id));
        }
    }

    for constraint in &sketch.constraints {
        for participant in &constraint.entities {
            if !local_ids.contains(participant.as_str()) {
                c.error(format!(
                    "{:?} constraint names unknown segment {participant:?}",
                    constraint.kind
                ));
            }
        }
        let dimensional = constraint.kind == ConstraintKind::Dimensional;
        if dimensional != constraint.value.is_some() {
            c.error(format!(
                "{:?} constraint {} a value",
                constraint.kind,
                if dimensional { "is missing" } else { "must not carry" }
            ));
        }
    }
}

fn check_links(model: &UnifiedModel, c: &mut Collector<'_>) {
    let feature = c.feature;

    for (context, reference) in feature.kind.references() {
        if let Err(e) = resolve::check_reference(model, reference, context) {
            c.error(e.to_string());
        }
    }

    let Some(link) = feature.kind.profile() else {
        return;
    };
    if let ProfileLink::Pending { feature_id } = link {
        c.error(format!("profile {feature_id:?} is not linked"));
        return;
    }

    match resolve::resolve_profile(model, link, feature.id()) {
        Ok(handle) => {
            if let FeatureKind::Revolve(revolve) = &feature.kind {
                if let Err(e) = resolve::check_revolve_axis(model, revolve, handle) {
                    c.error(e.to_string());
                }
            }
            let profile_suppressed = model.feature(handle).is_some_and(|p| p.suppressed);
            if profile_suppressed && !feature.suppressed {
                c.warn(format!(
                    "uses suppressed profile sketch {:?}",
                    model.feature_id_of(link).unwrap_or_default()
                ));
            }
        }
        Err(e) => c.error(e.to_string()),
    }
}
