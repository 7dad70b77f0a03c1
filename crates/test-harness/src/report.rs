//! Structured text reports of a model, attached to assertion failures.

use std::fmt;

use feature_graph::{EndCondition, FeatureKind, ProfileLink, RevolveAxis, UnifiedModel};

/// A complete model report with all sections.
pub struct ModelReport {
    pub model_name: String,
    pub unit: String,
    pub feature_entries: Vec<FeatureEntry>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// A single feature's report entry.
pub struct FeatureEntry {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub op_type: String,
    pub detail: String,
    pub suppressed: bool,
    pub references: Vec<String>,
}

impl ModelReport {
    pub fn from_model(model: &UnifiedModel) -> Self {
        let feature_entries = model
            .features()
            .iter()
            .enumerate()
            .map(|(index, feature)| FeatureEntry {
                index,
                id: feature.id().to_string(),
                name: feature.name.clone(),
                op_type: feature.kind.type_name().to_string(),
                detail: describe_feature(model, &feature.kind),
                suppressed: feature.suppressed,
                references: feature
                    .kind
                    .references()
                    .into_iter()
                    .map(|(label, r)| {
                        format!("{label}: {} -> {}", r.kind(), r.referenced_feature_id())
                    })
                    .collect(),
            })
            .collect();

        let validation = model.validate();
        Self {
            model_name: model.name.clone(),
            unit: model.unit.to_string(),
            feature_entries,
            errors: validation.errors.iter().map(|e| e.to_string()).collect(),
            warnings: validation.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Model Report: \"{}\" ({}) ===\n\n",
            self.model_name, self.unit
        ));

        let suppressed_count = self.feature_entries.iter().filter(|e| e.suppressed).count();
        out.push_str(&format!(
            "Feature Tree ({} features, {} suppressed, {} errors):\n",
            self.feature_entries.len(),
            suppressed_count,
            self.errors.len(),
        ));
        for entry in &self.feature_entries {
            let sup = if entry.suppressed { " [SUPPRESSED]" } else { "" };
            out.push_str(&format!(
                "  [{}] {} {} \"{}\"{}\n",
                entry.index, entry.op_type, entry.id, entry.name, sup,
            ));
            if !entry.detail.is_empty() {
                out.push_str(&format!("      {}\n", entry.detail));
            }
            for reference in &entry.references {
                out.push_str(&format!("      Ref {}\n", reference));
            }
        }

        if self.errors.is_empty() {
            out.push_str("\nErrors: none\n");
        } else {
            out.push_str(&format!("\nErrors ({}):\n", self.errors.len()));
            for e in &self.errors {
                out.push_str(&format!("  {}\n", e));
            }
        }
        if !self.warnings.is_empty() {
            out.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for w in &self.warnings {
                out.push_str(&format!("  {}\n", w));
            }
        }
        out
    }
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

fn describe_end_condition(ec: &EndCondition) -> String {
    let mut text = format!("{:?}", ec.condition_type());
    if let Some(depth) = ec.depth() {
        text.push_str(&format!(" depth={:.3}", depth));
    }
    if let Some((offset, true)) = ec.offset() {
        text.push_str(&format!(" offset={:.3}", offset));
    }
    if ec.flip {
        text.push_str(" flipped");
    }
    text
}

fn profile<'a>(model: &'a UnifiedModel, link: &'a ProfileLink) -> &'a str {
    model.feature_id_of(link).unwrap_or("<unlinked>")
}

/// Describe a feature's parameters in a human-readable way.
fn describe_feature(model: &UnifiedModel, kind: &FeatureKind) -> String {
    match kind {
        FeatureKind::Sketch(sketch) => format!(
            "Segments: {} ({} construction) | Constraints: {}",
            sketch.segments.len(),
            sketch.segments.iter().filter(|s| s.construction).count(),
            sketch.constraints.len(),
        ),
        FeatureKind::Extrude(extrude) => {
            let mut text = format!(
                "Profile: {} | {:?} | dir={} | end1: {}",
                profile(model, &extrude.profile),
                extrude.operation,
                extrude.direction,
                describe_end_condition(&extrude.end_condition),
            );
            if let Some(ec) = &extrude.end_condition2 {
                text.push_str(&format!(" | end2: {}", describe_end_condition(ec)));
            }
            if let Some(draft) = &extrude.draft {
                text.push_str(&format!(" | draft={:.1}deg", draft.angle));
            }
            if let Some(thin) = &extrude.thin_wall {
                text.push_str(&format!(" | thin={:.3}", thin.thickness));
            }
            text
        }
        FeatureKind::Revolve(revolve) => {
            let axis = match &revolve.axis {
                RevolveAxis::SketchSegment { local_id } => format!("segment {local_id}"),
                RevolveAxis::Explicit { origin, direction } => format!("{origin} along {direction}"),
                RevolveAxis::Reference(r) => format!("{} {}", r.kind(), r.referenced_feature_id()),
            };
            format!(
                "Profile: {} | axis: {} | angle={:.1}deg",
                profile(model, &revolve.profile),
                axis,
                revolve.angle.primary(),
            )
        }
    }
}
