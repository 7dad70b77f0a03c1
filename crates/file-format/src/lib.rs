//! Persistence for [`feature_graph::UnifiedModel`].
//!
//! The primary format is an attribute-based XML document. Cross-feature
//! links are stored as feature IDs and rebuilt after every feature has been
//! read, so documents may name a profile sketch before defining it. A JSON
//! rendition of the same model is available through [`SerializationFormat`].

pub mod decode;
pub mod encode;
pub mod errors;
pub mod io;
pub mod json;
pub mod options;
pub mod registry;
pub mod vocab;
pub mod xml;

pub use decode::{decode_model, model_from_element};
pub use encode::{encode_model, encode_model_with_indent, model_to_element, ROOT_ELEMENT};
pub use errors::{LoadError, SaveError};
pub use io::{load_model, save_model, try_load, try_save, Outcome};
pub use json::{decode_json, encode_json, JsonDocument, JSON_FORMAT, JSON_VERSION};
pub use options::{LoadOptions, SaveOptions, SerializationFormat};
