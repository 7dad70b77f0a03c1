//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail rather than
//! panicking, so one pass can collect every failure.

use std::collections::HashSet;

use feature_graph::UnifiedModel;
use file_format::{decode_model, encode_model};

use crate::assertions::model_differences;
use crate::helpers::json_round_trip;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
        }
    }
}

// ── Identity Oracles ────────────────────────────────────────────────────────

/// Every non-empty ID is unique and the ID index agrees with the list.
pub fn check_index_consistency(model: &UnifiedModel) -> OracleVerdict {
    let mut seen = HashSet::new();
    for (i, feature) in model.features().iter().enumerate() {
        if feature.id().is_empty() {
            continue;
        }
        if !seen.insert(feature.id()) {
            return OracleVerdict::fail(
                "index_consistency",
                format!("ID {:?} appears more than once", feature.id()),
            );
        }
        if model.index_of(feature.id()) != Some(i) {
            return OracleVerdict::fail(
                "index_consistency",
                format!(
                    "ID {:?} is at position {i} but indexed at {:?}",
                    feature.id(),
                    model.index_of(feature.id())
                ),
            );
        }
    }
    OracleVerdict::pass(
        "index_consistency",
        format!("{} features indexed", seen.len()),
    )
}

/// Validation reports no errors.
pub fn check_validation_clean(model: &UnifiedModel) -> OracleVerdict {
    let report = model.validate();
    if report.is_valid {
        OracleVerdict::pass(
            "validation_clean",
            format!("0 errors, {} warnings", report.warnings.len()),
        )
    } else {
        OracleVerdict::fail(
            "validation_clean",
            format!(
                "{} errors, first: {}",
                report.errors.len(),
                report
                    .errors
                    .first()
                    .map(|e| e.to_string())
                    .unwrap_or_default()
            ),
        )
    }
}

// ── Persistence Oracles ─────────────────────────────────────────────────────

/// Save then load through XML yields an equivalent model.
pub fn check_xml_round_trip(model: &UnifiedModel) -> OracleVerdict {
    let loaded = match encode_model(model)
        .map_err(|e| e.to_string())
        .and_then(|text| decode_model(&text).map_err(|e| e.to_string()))
    {
        Ok(loaded) => loaded,
        Err(e) => return OracleVerdict::fail("xml_round_trip", e),
    };
    verdict_from_differences("xml_round_trip", model_differences(model, &loaded))
}

/// Save then load through JSON yields an equivalent model.
pub fn check_json_round_trip(model: &UnifiedModel) -> OracleVerdict {
    match json_round_trip(model) {
        Ok(loaded) => verdict_from_differences("json_round_trip", model_differences(model, &loaded)),
        Err(e) => OracleVerdict::fail("json_round_trip", e.to_string()),
    }
}

/// Save, Load, Save produces byte-identical documents.
pub fn check_save_idempotent(model: &UnifiedModel) -> OracleVerdict {
    let result = encode_model(model).map_err(|e| e.to_string()).and_then(|first| {
        let loaded = decode_model(&first).map_err(|e| e.to_string())?;
        let second = encode_model(&loaded).map_err(|e| e.to_string())?;
        Ok((first, second))
    });
    match result {
        Ok((first, second)) if first == second => OracleVerdict::pass(
            "save_idempotent",
            format!("{} bytes, identical", first.len()),
        ),
        Ok((first, second)) => OracleVerdict::fail(
            "save_idempotent",
            format!("first save {} bytes, second {} bytes", first.len(), second.len()),
        ),
        Err(e) => OracleVerdict::fail("save_idempotent", e),
    }
}

fn verdict_from_differences(name: &str, differences: Vec<String>) -> OracleVerdict {
    if differences.is_empty() {
        OracleVerdict::pass(name, "equivalent".to_string())
    } else {
        OracleVerdict::fail(
            name,
            format!("{} difference(s): {}", differences.len(), differences.join("; ")),
        )
    }
}

// ── Composite ───────────────────────────────────────────────────────────────

/// Run every model oracle.
pub fn run_all_model_checks(model: &UnifiedModel) -> Vec<OracleVerdict> {
    vec![
        check_index_consistency(model),
        check_validation_clean(model),
        check_xml_round_trip(model),
        check_json_round_trip(model),
        check_save_idempotent(model),
    ]
}
