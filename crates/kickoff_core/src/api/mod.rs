pub mod json_api;

pub use json_api::{handle_request_json, ApiError, ApiRequest, ApiResponse, API_VERSION};
