//! Field layout for text-format dictionary entries (the CSV format
//! `loadDictionary`/user-dictionary text files are parsed with), following
//! ko-dic's custom field list.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub version: String,
    custom_fields: Vec<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>, version: impl Into<String>, custom_fields: Vec<String>) -> Self {
        Schema {
            name: name.into(),
            version: version.into(),
            custom_fields,
        }
    }

    pub fn get_custom_fields(&self) -> &[String] {
        &self.custom_fields
    }

    pub fn get_field_index(&self, field_name: &str) -> Option<usize> {
        match field_name {
            "surface" => Some(0),
            "left_id" => Some(1),
            "right_id" => Some(2),
            "cost" => Some(3),
            _ => self
                .custom_fields
                .iter()
                .position(|f| f == field_name)
                .map(|i| i + 4),
        }
    }

    /// Field layout of the bundled dictionary, mirroring ko-dic's 8 custom
    /// fields (pos_tag/meaning/presence_absence/reading/type/first_pos/
    /// last_pos/expression).
    pub fn default_ko() -> Self {
        Schema::new(
            "KIWI-DIC",
            "1.0.0",
            vec![
                "pos_tag".to_string(),
                "sense_id".to_string(),
                "combine_socket".to_string(),
                "reading".to_string(),
                "type".to_string(),
                "lm_morpheme_id".to_string(),
                "group_id".to_string(),
                "user_score".to_string(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_common_and_custom_fields() {
        let schema = Schema::default_ko();
        assert_eq!(schema.get_field_index("surface"), Some(0));
        assert_eq!(schema.get_field_index("pos_tag"), Some(4));
        assert_eq!(schema.get_field_index("group_id"), Some(10));
        assert_eq!(schema.get_field_index("nonexistent"), None);
    }
}
