//! Merging of configuration documents
//!
//! Documents are folded from the root parent down to the most derived file,
//! so the overlay side of every merge is the more specific configuration.

use serde_json::{Map, Value};

/// How a record's data is folded into the document built so far
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Nested objects merge key by key, everything else is replaced
    #[default]
    Recursive,
    /// Section-level merge as declared by a `Parent_Config` block
    Sectioned {
        /// Sections the overlay replaces wholesale
        override_full_sections: Vec<String>,
        /// Concatenate arrays (and shallow-merge objects) inside sections
        merge_array_settings: bool,
    },
}

impl MergeStrategy {
    pub fn merge(
        &self,
        base: Map<String, Value>,
        overlay: Map<String, Value>,
    ) -> Map<String, Value> {
        match self {
            MergeStrategy::Recursive => merge_recursive(base, overlay),
            MergeStrategy::Sectioned {
                override_full_sections,
                merge_array_settings,
            } => merge_sections(base, overlay, override_full_sections, *merge_array_settings),
        }
    }
}

/// Overlay `overlay` onto `base`.
///
/// Keys missing from the overlay are kept, objects present on both sides are
/// merged recursively and any other overlay value (arrays included) replaces
/// the base value.
pub fn merge_recursive(
    mut base: Map<String, Value>,
    overlay: Map<String, Value>,
) -> Map<String, Value> {
    for (key, overlay_value) in overlay {
        match (base.get_mut(&key), overlay_value) {
            (Some(Value::Object(base_section)), Value::Object(overlay_section)) => {
                let merged = merge_recursive(std::mem::take(base_section), overlay_section);
                *base_section = merged;
            }
            (_, overlay_value) => {
                base.insert(key, overlay_value);
            }
        }
    }
    base
}

fn merge_sections(
    mut base: Map<String, Value>,
    overlay: Map<String, Value>,
    override_full_sections: &[String],
    merge_array_settings: bool,
) -> Map<String, Value> {
    for (section, overlay_section) in overlay {
        let replace_whole = override_full_sections.iter().any(|s| *s == section);
        match (base.get_mut(&section), overlay_section) {
            (Some(Value::Object(base_section)), Value::Object(overlay_section))
                if !replace_whole =>
            {
                for (key, overlay_value) in overlay_section {
                    match (base_section.get_mut(&key), overlay_value) {
                        (Some(Value::Array(parent)), Value::Array(child))
                            if merge_array_settings =>
                        {
                            parent.extend(child);
                        }
                        (Some(Value::Object(parent)), Value::Object(child))
                            if merge_array_settings =>
                        {
                            parent.extend(child);
                        }
                        (_, overlay_value) => {
                            base_section.insert(key, overlay_value);
                        }
                    }
                }
            }
            (_, overlay_section) => {
                base.insert(section, overlay_section);
            }
        }
    }
    base
}
