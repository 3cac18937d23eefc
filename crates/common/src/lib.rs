pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn success_response_serializes_flag() {
        let body = serde_json::to_value(types::SuccessResponse::ok()).unwrap();
        assert_eq!(body, serde_json::json!({"success": true}));
    }
}
