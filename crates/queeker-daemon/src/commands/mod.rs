//! IPC command handlers.
//!
//! Each submodule implements the commands for one resource. Handlers decode
//! their params, call the engine, and return the response envelope as JSON.

pub mod likes;
pub mod posts;
pub mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use queeker_engine::RequestContext;
use queeker_types::ApiResponse;

use crate::rpc::RpcError;

type Result = std::result::Result<Value, RpcError>;

/// Decode `params` into `T`. Absent params decode like `{}`.
fn parse_params<T: DeserializeOwned>(params: &Value) -> std::result::Result<T, RpcError> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(&e.to_string()))
}

/// Request context from the optional `session_token` param.
fn context(session_token: Option<String>) -> RequestContext {
    RequestContext { session_token }
}

fn envelope<T: Serialize>(response: ApiResponse<T>) -> Result {
    serde_json::to_value(response).map_err(|e| RpcError::internal_error(&e.to_string()))
}
