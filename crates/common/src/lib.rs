//! Cross-cutting helpers shared by the workspace crates: logging setup,
//! runtime directory checks, response envelopes and metrics encoding.

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
    fn success_envelope_shape() {
        let body = serde_json::to_value(types::ApiResponse::success(vec![1, 2])).expect("serialize");
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"][1], 2);
    }
}
