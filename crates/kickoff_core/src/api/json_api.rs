//! JSON API for engine operations
//!
//! Transport-agnostic request/response layer for whatever HTTP or IPC front
//! end sits on top. Every request names an `op`; player operations carry the
//! caller's signed `token`, which is the only source of the acting identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::AthleteId;
use crate::engine::GameEngine;
use crate::error::{ErrorKind, GameError};
use crate::models::{OwnedAthleteId, PlayerId};
use crate::store::GameStore;

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self { code: code.to_string(), message: message.to_string() }
    }
}

impl From<&GameError> for ApiError {
    fn from(err: &GameError) -> Self {
        Self::new(err.code(), &err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ApiRequest {
    Register { name: String },
    Draw { token: String },
    Equip { token: String, owned_id: OwnedAthleteId },
    Unequip { token: String, owned_id: OwnedAthleteId },
    Upgrade { token: String, athlete_id: AthleteId, power_level: u32 },
    Sell { token: String, owned_id: OwnedAthleteId },
    PlayMatch { token: String, opponent_id: PlayerId },
    PlayRanked { token: String },
    Profile { token: String },
    Owned { token: String },
    Team { token: String },
    Ranking,
}

impl ApiRequest {
    fn name(&self) -> &'static str {
        match self {
            ApiRequest::Register { .. } => "register",
            ApiRequest::Draw { .. } => "draw",
            ApiRequest::Equip { .. } => "equip",
            ApiRequest::Unequip { .. } => "unequip",
            ApiRequest::Upgrade { .. } => "upgrade",
            ApiRequest::Sell { .. } => "sell",
            ApiRequest::PlayMatch { .. } => "play_match",
            ApiRequest::PlayRanked { .. } => "play_ranked",
            ApiRequest::Profile { .. } => "profile",
            ApiRequest::Owned { .. } => "owned",
            ApiRequest::Team { .. } => "team",
            ApiRequest::Ranking => "ranking",
        }
    }
}

/// Handle one JSON request and return a JSON `ApiResponse`.
pub fn handle_request_json<S: GameStore>(engine: &GameEngine<S>, request_json: &str) -> String {
    let request: ApiRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => {
            warn!("Rejected malformed request: {}", e);
            let error = ApiError::new("BAD_REQUEST", &format!("Invalid request JSON: {e}"));
            return to_json(&ApiResponse::<Value>::error(error));
        }
    };

    let op = request.name();
    to_json(&respond(op, dispatch(engine, request)))
}

/// Why a dispatched request produced no data.
#[derive(Debug)]
enum Failure {
    Game(GameError),
    Encode(serde_json::Error),
}

impl From<GameError> for Failure {
    fn from(err: GameError) -> Self {
        Failure::Game(err)
    }
}

fn respond(op: &str, outcome: Result<Value, Failure>) -> ApiResponse<Value> {
    match outcome {
        Ok(data) => ApiResponse::success(data),
        Err(Failure::Game(err)) => {
            match err.kind() {
                ErrorKind::Internal | ErrorKind::Transient => warn!(op, "Request failed: {}", err),
                _ => debug!(op, "Request rejected: {}", err),
            }
            ApiResponse::error(ApiError::from(&err))
        }
        Err(Failure::Encode(e)) => {
            warn!(op, "Failed to encode response: {}", e);
            ApiResponse::error(ApiError::new("INTERNAL", &format!("Failed to encode response: {e}")))
        }
    }
}

fn dispatch<S: GameStore>(engine: &GameEngine<S>, request: ApiRequest) -> Result<Value, Failure> {
    match request {
        ApiRequest::Register { name } => to_value(engine.register(&name)?),
        ApiRequest::Draw { token } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.draw(&player)?)
        }
        ApiRequest::Equip { token, owned_id } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.equip(&player, owned_id)?)
        }
        ApiRequest::Unequip { token, owned_id } => {
            let player = engine.authenticate(&token)?;
            engine.unequip(&player, owned_id)?;
            Ok(Value::Object(Default::default()))
        }
        ApiRequest::Upgrade { token, athlete_id, power_level } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.upgrade(&player, athlete_id, power_level)?)
        }
        ApiRequest::Sell { token, owned_id } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.sell(&player, owned_id)?)
        }
        ApiRequest::PlayMatch { token, opponent_id } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.play_match(&player, opponent_id)?)
        }
        ApiRequest::PlayRanked { token } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.play_ranked(&player)?)
        }
        ApiRequest::Profile { token } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.profile(player.id())?)
        }
        ApiRequest::Owned { token } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.owned(player.id())?)
        }
        ApiRequest::Team { token } => {
            let player = engine.authenticate(&token)?;
            to_value(engine.team(player.id())?)
        }
        ApiRequest::Ranking => to_value(engine.ranking()?),
    }
}

fn to_value<T: Serialize>(data: T) -> Result<Value, Failure> {
    serde_json::to_value(data).map_err(Failure::Encode)
}

fn to_json<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        serde_json::json!({
            "success": false,
            "error": { "code": "INTERNAL", "message": e.to_string() },
            "schema_version": API_VERSION,
        })
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::GameConfig;
    use serde_json::json;

    fn engine() -> GameEngine {
        let config = GameConfig { token_secret: "api".into(), ..GameConfig::seeded(11) };
        GameEngine::in_memory(config, Catalog::starter()).unwrap()
    }

    fn call(engine: &GameEngine, request: Value) -> Value {
        serde_json::from_str(&handle_request_json(engine, &request.to_string())).unwrap()
    }

    fn register(engine: &GameEngine, name: &str) -> String {
        let resp = call(engine, json!({"op": "register", "name": name}));
        assert_eq!(resp["success"], true);
        resp["data"]["token"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_draw_equip_flow() {
        let engine = engine();
        let token = register(&engine, "api user");

        let drawn = call(&engine, json!({"op": "draw", "token": token}));
        assert_eq!(drawn["success"], true);
        assert_eq!(drawn["data"]["remaining_cash"], 900);
        assert_eq!(drawn["schema_version"], API_VERSION);
        let owned_id = drawn["data"]["athlete"]["id"].clone();

        let equipped = call(&engine, json!({"op": "equip", "token": token, "owned_id": owned_id}));
        assert_eq!(equipped["success"], true);
        assert!(equipped["data"]["attribute_total"].as_u64().unwrap() > 0);

        let team = call(&engine, json!({"op": "team", "token": token}));
        assert_eq!(team["data"].as_array().unwrap().len(), 1);

        let again = call(&engine, json!({"op": "equip", "token": token, "owned_id": owned_id}));
        assert_eq!(again["success"], false);
        assert_eq!(again["error"]["code"], "ALREADY_EQUIPPED");

        let removed = call(&engine, json!({"op": "unequip", "token": token, "owned_id": owned_id}));
        assert_eq!(removed["success"], true);
        assert_eq!(removed["data"], json!({}));
    }

    #[test]
    fn test_bad_token() {
        let engine = engine();
        let resp = call(&engine, json!({"op": "draw", "token": "1.nope"}));

        assert_eq!(resp["success"], false);
        assert_eq!(resp["error"]["code"], "UNAUTHORIZED");
    }

    #[test]
    fn test_malformed_request() {
        let engine = engine();
        let raw = handle_request_json(&engine, "{not json");
        let resp: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(resp["success"], false);
        assert_eq!(resp["error"]["code"], "BAD_REQUEST");

        let unknown = call(&engine, json!({"op": "teleport"}));
        assert_eq!(unknown["error"]["code"], "BAD_REQUEST");
    }

    #[test]
    fn test_match_with_incomplete_roster() {
        let engine = engine();
        let token = register(&engine, "a");
        register(&engine, "b");

        let resp = call(&engine, json!({"op": "play_match", "token": token, "opponent_id": 2}));
        assert_eq!(resp["error"]["code"], "ROSTER_INCOMPLETE");

        let ranked = call(&engine, json!({"op": "play_ranked", "token": token}));
        assert_eq!(ranked["error"]["code"], "ROSTER_INCOMPLETE");
    }

    #[test]
    fn test_encode_failure_is_internal_error() {
        // Non-string map keys cannot be encoded as JSON objects.
        let unencodable: std::collections::HashMap<(u32, u32), u32> = [((1, 2), 3)].into();

        let resp = respond("owned", to_value(unencodable));
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.error.unwrap().code, "INTERNAL");
    }

    #[test]
    fn test_ranking() {
        let engine = engine();
        register(&engine, "a");
        register(&engine, "b");

        let resp = call(&engine, json!({"op": "ranking"}));
        let table = resp["data"].as_array().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0]["score"], 1000);
        assert_eq!(table[0]["win_rate"], 0.0);
    }
}
