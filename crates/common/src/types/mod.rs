use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Success envelope returned by every JSON endpoint: `{ "status": "success", "data": ... }`.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { status: "success", data }
    }
}
