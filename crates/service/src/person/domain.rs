use serde::{Deserialize, Serialize};

pub type Person = models::person::Model;

/// Write payload for create and update. Any `id` in the body is ignored;
/// missing names decode as empty and fail validation later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PersonInput {
    #[serde(default, rename = "firstname", alias = "first_name")]
    pub first_name: String,
    #[serde(default, rename = "lastname", alias = "last_name")]
    pub last_name: String,
}

impl PersonInput {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self { first_name: first_name.into(), last_name: last_name.into() }
    }

    /// Combine with an existing id into the record that would be written.
    pub fn into_person(self, id: i32) -> Person {
        Person { id, first_name: self.first_name, last_name: self.last_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_wire_names_and_column_aliases() {
        let a: PersonInput = serde_json::from_str(r#"{"firstname":"Rob","lastname":"Pike"}"#).unwrap();
        let b: PersonInput = serde_json::from_str(r#"{"first_name":"Rob","last_name":"Pike"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, PersonInput::new("Rob", "Pike"));
    }

    #[test]
    fn ignores_id_and_defaults_missing_fields() {
        let p: PersonInput = serde_json::from_str(r#"{"id": 99, "firstname":"Ken","Thompson":"Burge"}"#).unwrap();
        assert_eq!(p.first_name, "Ken");
        assert_eq!(p.last_name, "");
    }
}
