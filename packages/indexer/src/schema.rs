//! Class schema definitions sent to the store.

use serde::{Deserialize, Serialize};

/// A class definition as the store's `/schema` endpoint accepts and returns it.
///
/// Fields the store adds on its own (vectorizer, index config, ...) are
/// ignored when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchema {
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// A single class property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: vec![data_type.into()],
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Property holding the source document name.
pub const NAME_PROPERTY: &str = "name";

/// Property holding the chunk's sequence number within its document.
pub const CHUNK_NUMBER_PROPERTY: &str = "chunk_number";

/// Property holding the chunk text.
pub const CONTENT_PROPERTY: &str = "content";

/// The class chunk objects are stored in.
#[must_use]
pub fn chunks_class_schema(class: &str) -> ClassSchema {
    ClassSchema {
        class: class.to_string(),
        description: Some("A class to store document chunks".to_string()),
        properties: vec![
            Property::new(NAME_PROPERTY, "string")
                .with_description("The name of the document"),
            Property::new(CHUNK_NUMBER_PROPERTY, "int")
                .with_description("The chunk number within the document"),
            Property::new(CONTENT_PROPERTY, "text")
                .with_description("The content of the chunk"),
        ],
    }
}
