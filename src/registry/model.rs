//! Step and field definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of input a field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Date,
    File,
    Select,
    Radio,
    Email,
    Number,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::File => "file",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Email => "email",
            Self::Number => "number",
        };
        write!(f, "{s}")
    }
}

/// A selectable option for `select` / `radio` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    /// String or number.
    pub value: serde_json::Value,
}

/// One input of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique within its step.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

impl FieldDefinition {
    /// A field with no placeholder and no options.
    pub fn new(name: &str, kind: FieldKind, label: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: label.to_string(),
            required,
            placeholder: String::new(),
            options: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }
}

/// How a step's record collapses into one display string on the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayProjection {
    /// Join several fields; `None` unless every one of them is filled.
    Join {
        fields: Vec<String>,
        #[serde(default = "default_separator")]
        separator: String,
    },
    /// The raw value of a single field.
    Field { name: String },
    /// The display name of an uploaded file.
    FileName {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<String>,
    },
}

fn default_separator() -> String {
    " ".to_string()
}

/// Summary presentation of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySpec {
    pub label: String,
    pub display: DisplayProjection,
    /// Shown when any required field of the step is empty.
    pub error_message: String,
}

/// An immutable step of the funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub slug: String,
    /// 1-based position in the traversal order.
    pub ordinal: u32,
    pub title: String,
    pub fields: Vec<FieldDefinition>,
    /// Rule tokens per field name, e.g. `{"first_name": ["required", "min:2"]}`.
    #[serde(default)]
    pub validation: BTreeMap<String, Vec<String>>,
    pub summary: SummarySpec,
}

impl StepDefinition {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` is a declared field of this step.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Rule tokens declared for a field (empty if none).
    pub fn rules_for(&self, name: &str) -> &[String] {
        self.validation.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn file_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.kind == FieldKind::File)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_display_matches_serde() {
        let kinds = [
            FieldKind::Text,
            FieldKind::Date,
            FieldKind::File,
            FieldKind::Select,
            FieldKind::Radio,
            FieldKind::Email,
            FieldKind::Number,
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(format!("\"{kind}\""), json);
        }
    }

    #[test]
    fn field_serializes_kind_as_type() {
        let field = FieldDefinition::new("first_name", FieldKind::Text, "First name", true)
            .with_placeholder("Your first name");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["required"], true);
        assert_eq!(json["placeholder"], "Your first name");
        assert!(json.get("options").is_none());
    }

    #[test]
    fn field_defaults_when_deserializing() {
        let field: FieldDefinition =
            serde_json::from_str(r#"{"name": "x", "type": "date", "label": "X"}"#).unwrap();
        assert!(!field.required);
        assert!(field.placeholder.is_empty());
        assert!(field.options.is_none());
    }

    #[test]
    fn join_projection_defaults_separator() {
        let p: DisplayProjection =
            serde_json::from_str(r#"{"kind": "join", "fields": ["a", "b"]}"#).unwrap();
        assert_eq!(
            p,
            DisplayProjection::Join {
                fields: vec!["a".into(), "b".into()],
                separator: " ".into()
            }
        );
    }
}
