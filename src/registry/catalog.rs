//! The built-in registration catalog.

use std::collections::BTreeMap;

use super::model::{DisplayProjection, FieldDefinition, FieldKind, StepDefinition, SummarySpec};
use super::StepRegistry;

/// Summary title of the built-in catalog.
pub const SUMMARY_TITLE: &str = "Your registration summary";

/// Display name used when a picture was submitted without any file name.
pub const DEFAULT_PICTURE_NAME: &str = "photo.jpg";

fn rules(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(field, tokens)| {
            (
                field.to_string(),
                tokens.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

/// The four reference steps: personal information, birthdate, picture, address.
pub fn builtin_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition {
            slug: "personal_information".into(),
            ordinal: 1,
            title: "Personal information".into(),
            fields: vec![
                FieldDefinition::new("first_name", FieldKind::Text, "First name", true)
                    .with_placeholder("Your first name"),
                FieldDefinition::new("last_name", FieldKind::Text, "Last name", true)
                    .with_placeholder("Your last name"),
            ],
            validation: rules(&[
                ("first_name", &["required", "min:2"]),
                ("last_name", &["required", "min:2"]),
            ]),
            summary: SummarySpec {
                label: "Personal information".into(),
                display: DisplayProjection::Join {
                    fields: vec!["first_name".into(), "last_name".into()],
                    separator: " ".into(),
                },
                error_message: "First or last name missing".into(),
            },
        },
        StepDefinition {
            slug: "birthdate".into(),
            ordinal: 2,
            title: "Date of birth".into(),
            fields: vec![FieldDefinition::new(
                "birthdate",
                FieldKind::Date,
                "Date of birth",
                true,
            )],
            validation: rules(&[("birthdate", &["required", "minAge:18"])]),
            summary: SummarySpec {
                label: "Date of birth".into(),
                display: DisplayProjection::Field {
                    name: "birthdate".into(),
                },
                error_message: "Date of birth missing".into(),
            },
        },
        StepDefinition {
            slug: "picture".into(),
            ordinal: 3,
            title: "Profile picture".into(),
            fields: vec![FieldDefinition::new(
                "picture",
                FieldKind::File,
                "Profile picture",
                true,
            )],
            validation: rules(&[("picture", &["required", "fileType:jpg,png", "maxSize:2MB"])]),
            summary: SummarySpec {
                label: "Profile picture".into(),
                display: DisplayProjection::FileName {
                    field: "picture".into(),
                    fallback: Some(DEFAULT_PICTURE_NAME.into()),
                },
                error_message: "Picture missing".into(),
            },
        },
        StepDefinition {
            slug: "address".into(),
            ordinal: 4,
            title: "Address".into(),
            fields: vec![
                FieldDefinition::new("address", FieldKind::Text, "Address", true)
                    .with_placeholder("Your address"),
            ],
            validation: rules(&[("address", &["required", "complete"])]),
            summary: SummarySpec {
                label: "Address".into(),
                display: DisplayProjection::Field {
                    name: "address".into(),
                },
                error_message: "Address incomplete".into(),
            },
        },
    ]
}

impl StepRegistry {
    /// Registry holding the built-in catalog.
    pub fn builtin() -> Self {
        Self::new(SUMMARY_TITLE, builtin_steps()).expect("built-in catalog is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_four_contiguous_steps() {
        let registry = StepRegistry::builtin();
        assert_eq!(registry.len(), 4);
        for (i, step) in registry.ordered().iter().enumerate() {
            assert_eq!(step.ordinal as usize, i + 1);
        }
    }

    #[test]
    fn builtin_rule_keys_are_field_names() {
        let registry = StepRegistry::builtin();
        for step in registry.ordered() {
            for key in step.validation.keys() {
                assert!(step.has_field(key), "{} has rules for unknown {key}", step.slug);
            }
        }
    }

    #[test]
    fn picture_is_the_only_file_step() {
        let registry = StepRegistry::builtin();
        let file_steps: Vec<_> = registry
            .ordered()
            .iter()
            .filter(|s| s.file_fields().next().is_some())
            .map(|s| s.slug.as_str())
            .collect();
        assert_eq!(file_steps, ["picture"]);
    }

    #[test]
    fn picture_rules_keep_declaration_order() {
        let registry = StepRegistry::builtin();
        let step = registry.get("picture").unwrap();
        assert_eq!(
            step.rules_for("picture"),
            ["required", "fileType:jpg,png", "maxSize:2MB"]
        );
        assert!(step.rules_for("nothing").is_empty());
    }
}
