pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn error_body_serializes_under_error_key() {
        let body = types::ErrorBody::new("fields are empty");
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v, serde_json::json!({"error": "fields are empty"}));
    }
}
