use std::fmt;

/// On-disk encoding of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SerializationFormat {
    /// Attribute-based XML document rooted at `<UnifiedModel>`.
    #[default]
    Xml,
    /// serde JSON document tagged with a format identifier and version.
    Json,
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationFormat::Xml => write!(f, "xml"),
            SerializationFormat::Json => write!(f, "json"),
        }
    }
}

/// Configuration for [`crate::save_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    pub format: SerializationFormat,
    /// Spaces per nesting level; `0` writes everything on one line.
    pub indent: usize,
    /// Write to a sibling temporary file, then rename it over the target.
    pub atomic: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            format: SerializationFormat::Xml,
            indent: 2,
            atomic: true,
        }
    }
}

impl SaveOptions {
    pub fn xml() -> Self {
        Self::default()
    }

    pub fn json() -> Self {
        Self {
            format: SerializationFormat::Json,
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }
}

/// Configuration for [`crate::load_model`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub format: SerializationFormat,
}

impl LoadOptions {
    pub fn xml() -> Self {
        Self::default()
    }

    pub fn json() -> Self {
        Self {
            format: SerializationFormat::Json,
        }
    }
}
