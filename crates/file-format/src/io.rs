//! Path-level save and load.
//!
//! [`save_model`] and [`load_model`] report through an [`Outcome`] and never
//! fail outright; [`try_save`] and [`try_load`] are the same operations with
//! typed errors.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use feature_graph::UnifiedModel;

use crate::decode::decode_model;
use crate::encode::encode_model_with_indent;
use crate::errors::{LoadError, SaveError};
use crate::json::{decode_json, encode_json};
use crate::options::{LoadOptions, SaveOptions, SerializationFormat};

/// Success flag plus a message describing what went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    /// `None` on success.
    pub message: Option<String>,
}

impl Outcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

impl<E: std::fmt::Display> From<Result<(), E>> for Outcome {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Outcome::ok(),
            Err(err) => Outcome::failed(err.to_string()),
        }
    }
}

/// Write `model` to `path` in the format chosen by `options`.
#[instrument(skip(model, path, options), fields(path = %path.as_ref().display(), format = %options.format))]
pub fn save_model(model: &UnifiedModel, path: impl AsRef<Path>, options: &SaveOptions) -> Outcome {
    let path = path.as_ref();
    match try_save(model, path, options) {
        Ok(()) => {
            info!(features = model.len(), path = %path.display(), "model saved");
            Outcome::ok()
        }
        Err(err) => {
            warn!(error = %err, "save failed");
            Outcome::failed(err.to_string())
        }
    }
}

/// Replace the contents of `model` with the document at `path`. On failure
/// `model` is left exactly as it was.
#[instrument(skip(model, path, options), fields(path = %path.as_ref().display(), format = %options.format))]
pub fn load_model(model: &mut UnifiedModel, path: impl AsRef<Path>, options: &LoadOptions) -> Outcome {
    let path = path.as_ref();
    match try_load(path, options) {
        Ok(loaded) => {
            info!(features = loaded.len(), path = %path.display(), "model loaded");
            *model = loaded;
            Outcome::ok()
        }
        Err(err) => {
            warn!(error = %err, "load failed");
            Outcome::failed(err.to_string())
        }
    }
}

pub fn try_save(model: &UnifiedModel, path: &Path, options: &SaveOptions) -> Result<(), SaveError> {
    let text = match options.format {
        SerializationFormat::Xml => encode_model_with_indent(model, options.indent)?,
        SerializationFormat::Json => encode_json(model, options.indent)?,
    };

    if !options.atomic {
        return fs::write(path, text)
            .map_err(|e| SaveError::Io(format!("{}: {e}", path.display())));
    }

    let temp = temp_sibling(path)?;
    if let Err(e) = fs::write(&temp, text) {
        let _ = fs::remove_file(&temp);
        return Err(SaveError::Io(format!("{}: {e}", temp.display())));
    }
    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        SaveError::Io(format!("{}: {e}", path.display()))
    })
}

pub fn try_load(path: &Path, options: &LoadOptions) -> Result<UnifiedModel, LoadError> {
    let text = fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;
    match options.format {
        SerializationFormat::Xml => decode_model(&text),
        SerializationFormat::Json => decode_json(&text),
    }
}

/// `dir/.name.tmp` next to `path`.
fn temp_sibling(path: &Path) -> Result<PathBuf, SaveError> {
    let name = path
        .file_name()
        .ok_or_else(|| SaveError::Io(format!("{} does not name a file", path.display())))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}
