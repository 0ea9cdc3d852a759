//! `/v1/chat` handlers, routed by namespace.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde_json::{Map, Value};

use super::param;
use crate::context::{RequestCtx, Scope};
use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::services::chat::{GetChatReq, ListChatsReq};
use crate::state::AppState;
use crate::status::Status;
use crate::validation::{non_empty, parse_pagination, require_uuid};

/// Stamp the caller's scope onto a pass-through body.
fn scoped_body(body: Value, scope: &Scope, ctx: &RequestCtx) -> ApiResult<Map<String, Value>> {
    let Value::Object(mut body) = body else {
        return Err(ApiError::bad_request("request body must be a JSON object"));
    };
    body.insert("project_id".into(), Value::String(scope.project_id.clone()));
    body.insert(
        "environment_id".into(),
        Value::String(scope.environment_id.clone()),
    );
    body.insert("user_id".into(), Value::String(ctx.user_id().to_string()));
    Ok(body)
}

fn body_project_id(body: &Value) -> Option<&str> {
    body.get("project_id").and_then(Value::as_str).and_then(non_empty)
}

/// `POST /v1/chat`
pub async fn create_chat(
    State(state): State<AppState>,
    ctx: RequestCtx,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    let scope = ctx.scope(body_project_id(&body))?;
    let bundle = state.nodes.by_namespace(&ctx.namespace)?;

    let chat = bundle
        .chat
        .create_chat(Value::Object(scoped_body(body, &scope, &ctx)?))
        .await?;

    Ok(handle_response(Status::Created, chat))
}

/// `GET /v1/chat`
pub async fn list_chats(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let pagination = parse_pagination(&params, &state.config.http)?;
    let scope = ctx.scope(None)?;
    let bundle = state.nodes.by_namespace(&ctx.namespace)?;

    let chats = bundle
        .chat
        .list_chats(ListChatsReq {
            project_id: scope.project_id,
            environment_id: scope.environment_id,
            user_id: ctx.user_id().to_string(),
            search: param(&params, &["search"]).unwrap_or_default().to_string(),
            limit: pagination.limit,
            offset: pagination.offset,
        })
        .await?;

    Ok(handle_response(Status::Ok, chats))
}

/// `GET /v1/chat/:chat_id`
pub async fn get_chat(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(chat_id): Path<String>,
) -> ApiResult<Response> {
    require_uuid("chat_id", &chat_id)?;
    let scope = ctx.scope(None)?;
    let bundle = state.nodes.by_namespace(&ctx.namespace)?;

    let chat = bundle
        .chat
        .get_chat(GetChatReq {
            chat_id,
            project_id: scope.project_id,
            environment_id: scope.environment_id,
        })
        .await?;

    Ok(handle_response(Status::Ok, chat))
}

/// `POST /v1/chat/:chat_id/message`
pub async fn send_message(
    State(state): State<AppState>,
    ctx: RequestCtx,
    Path(chat_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    require_uuid("chat_id", &chat_id)?;
    let scope = ctx.scope(body_project_id(&body))?;
    let bundle = state.nodes.by_namespace(&ctx.namespace)?;

    let mut message = scoped_body(body, &scope, &ctx)?;
    message.insert("chat_id".into(), Value::String(chat_id));
    let reply = bundle.chat.send_message(Value::Object(message)).await?;

    Ok(handle_response(Status::Created, reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, Principal};
    use crate::context::RequestSeed;
    use serde_json::json;

    const USER: &str = "8d5f5a47-8f3c-4d0e-b2a2-0b2e7f6c9e11";

    fn ctx() -> RequestCtx {
        let principal = Principal::Bearer(Claims {
            user_id: USER.into(),
            ..Default::default()
        });
        RequestCtx::build(principal, RequestSeed::default(), None, "u-code").unwrap()
    }

    #[test]
    fn test_scoped_body_overrides_ids() {
        let scope = Scope {
            project_id: "p".into(),
            environment_id: "e".into(),
        };
        let body = json!({"title": "Support", "project_id": "spoofed"});
        let scoped = scoped_body(body, &scope, &ctx()).unwrap();
        assert_eq!(scoped["title"], "Support");
        assert_eq!(scoped["project_id"], "p");
        assert_eq!(scoped["environment_id"], "e");
        assert_eq!(scoped["user_id"], USER);
    }

    #[test]
    fn test_scoped_body_requires_object() {
        let scope = Scope {
            project_id: "p".into(),
            environment_id: "e".into(),
        };
        let err = scoped_body(json!(["x"]), &scope, &ctx()).unwrap_err();
        assert_eq!(err.status(), Status::BadRequest);
    }
}
