use serde::{Deserialize, Serialize};
use tracing::instrument;

use cadx_types::UnitSystem;
use feature_graph::{Feature, UnifiedModel};

use crate::errors::{LoadError, SaveError};

/// Format identifier stored in every JSON document.
pub const JSON_FORMAT: &str = "cadx-json";

/// Current JSON document version.
pub const JSON_VERSION: u32 = 1;

/// Top-level JSON structure. Profile links are stored by feature ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDocument {
    pub format: String,
    pub version: u32,
    #[serde(default)]
    pub unit: UnitSystem,
    #[serde(default)]
    pub name: String,
    pub features: Vec<Feature>,
}

/// Serialize `model` as JSON with `indent` spaces per level (`0` for compact
/// output).
#[instrument(skip(model), fields(features = model.len()))]
pub fn encode_json(model: &UnifiedModel, indent: usize) -> Result<String, SaveError> {
    let document = JsonDocument {
        format: JSON_FORMAT.to_string(),
        version: JSON_VERSION,
        unit: model.unit,
        name: model.name.clone(),
        features: model.portable_features(),
    };

    if indent == 0 {
        return serde_json::to_string(&document).map_err(|e| SaveError::Write(e.to_string()));
    }

    let indent = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|e| SaveError::Write(e.to_string()))?;
    let mut text = String::from_utf8(buffer).map_err(|e| SaveError::Write(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Deserialize a JSON document, checking its format identifier and version
/// before any feature is touched.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn decode_json(text: &str) -> Result<UnifiedModel, LoadError> {
    let document: JsonDocument =
        serde_json::from_str(text).map_err(|e| LoadError::MalformedDocument(e.to_string()))?;

    if document.format != JSON_FORMAT {
        return Err(LoadError::UnknownFormat(document.format));
    }
    if document.version > JSON_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: document.version,
            supported_version: JSON_VERSION,
        });
    }

    let mut model = UnifiedModel::new(document.unit, document.name);
    for (index, feature) in document.features.into_iter().enumerate() {
        feature.kind.validate().map_err(|e| {
            LoadError::MalformedDocument(format!("feature #{index} ({:?}): {e}", feature.id()))
        })?;
        model.insert_unchecked(feature);
    }
    model.relink_profiles()?;
    Ok(model)
}
