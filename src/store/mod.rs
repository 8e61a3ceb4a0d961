//! Step store: mutable holder of submitted step data.

pub mod memory;
pub mod traits;

use serde_json::Value;

use crate::registry::StepDefinition;
use crate::values;

pub use memory::InMemoryStepStore;
pub use traits::StepStore;

/// Field name → submitted value.
pub type FieldData = serde_json::Map<String, Value>;

/// Reserved derived key holding the display name of an uploaded file.
pub const FILE_NAME_KEY: &str = "fileName";

/// Merge `partial` into `record` and attach derived fields.
///
/// Each key present in `partial` replaces the stored one; other keys are kept.
/// For every file-typed field carried by `partial`, `fileName` is set from the
/// value's nested `name`, or else from a `fileName` sent alongside it.
pub fn merge_record(record: &mut FieldData, step: &StepDefinition, partial: FieldData) {
    let derived_name = partial
        .get(FILE_NAME_KEY)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    let mut new_upload = false;
    let mut file_name = None;
    for field in step.file_fields() {
        let Some(incoming) = partial.get(&field.name) else {
            continue;
        };
        if values::is_blank(incoming) {
            continue;
        }
        new_upload = true;
        file_name = match incoming {
            Value::Object(map) => map
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| derived_name.clone()),
            _ => derived_name.clone(),
        };
    }

    for (key, value) in partial {
        if key != FILE_NAME_KEY {
            record.insert(key, value);
        }
    }

    match file_name {
        Some(name) => {
            record.insert(FILE_NAME_KEY.to_string(), Value::String(name));
        }
        // A fresh upload without a usable name must not inherit the old one.
        None if new_upload => {
            record.remove(FILE_NAME_KEY);
        }
        None => {}
    }
}
