//! One-time-code delivery and verification.

use axum::{extract::State, response::Response};
use serde::Deserialize;

use crate::context::RequestCtx;
use crate::response::{handle_response, ApiError, ApiResult, JsonBody};
use crate::services::sms::{RecipientKind, SendSmsReq, VerifyOtpReq};
use crate::state::AppState;
use crate::status::Status;
use crate::validation::{is_valid_email, is_valid_phone, non_empty, require_uuid};

const DEFAULT_OTP_LENGTH: u32 = 6;

#[derive(Debug, Deserialize)]
pub struct SendOtpBody {
    pub recipient: String,
    #[serde(default, rename = "type")]
    pub kind: RecipientKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub otp_length: Option<u32>,
    #[serde(default)]
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    pub sms_id: String,
    pub otp: String,
}

fn check_recipient(kind: RecipientKind, recipient: &str) -> ApiResult<()> {
    let valid = match kind {
        RecipientKind::Phone => is_valid_phone(recipient),
        RecipientKind::Email => is_valid_email(recipient),
    };
    if valid {
        Ok(())
    } else {
        let what = match kind {
            RecipientKind::Phone => "phone number",
            RecipientKind::Email => "email",
        };
        Err(ApiError::invalid_argument(format!("recipient is not a valid {what}")))
    }
}

/// `POST /v1/sms/send`
pub async fn send_otp(
    State(state): State<AppState>,
    ctx: RequestCtx,
    JsonBody(body): JsonBody<SendOtpBody>,
) -> ApiResult<Response> {
    check_recipient(body.kind, body.recipient.trim())?;
    let scope = ctx.scope(non_empty(&body.project_id))?;
    let bundle = state.nodes.by_namespace(&ctx.namespace)?;

    let sent = bundle
        .sms
        .send(SendSmsReq {
            recipient: body.recipient.trim().to_string(),
            kind: body.kind,
            text: body.text,
            otp_length: body.otp_length.unwrap_or(DEFAULT_OTP_LENGTH),
            project_id: scope.project_id,
            environment_id: scope.environment_id,
        })
        .await?;

    Ok(handle_response(Status::Created, sent))
}

/// `POST /v1/sms/verify`
pub async fn verify_otp(
    State(state): State<AppState>,
    ctx: RequestCtx,
    JsonBody(body): JsonBody<VerifyOtpBody>,
) -> ApiResult<Response> {
    require_uuid("sms_id", &body.sms_id)?;
    if body.otp.trim().is_empty() {
        return Err(ApiError::invalid_argument("otp is required"));
    }
    let bundle = state.nodes.by_namespace(&ctx.namespace)?;

    let verified = bundle
        .sms
        .verify(VerifyOtpReq {
            sms_id: body.sms_id,
            otp: body.otp.trim().to_string(),
        })
        .await?;

    Ok(handle_response(Status::Ok, verified))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_recipient() {
        assert!(check_recipient(RecipientKind::Phone, "+998901234567").is_ok());
        assert!(check_recipient(RecipientKind::Email, "ops@example.com").is_ok());

        let err = check_recipient(RecipientKind::Phone, "ops@example.com").unwrap_err();
        assert_eq!(err.status(), Status::InvalidArgument);
        assert_eq!(err.message(), "recipient is not a valid phone number");

        let err = check_recipient(RecipientKind::Email, "+998901234567").unwrap_err();
        assert_eq!(err.message(), "recipient is not a valid email");
    }

    #[test]
    fn test_send_body_defaults_to_phone() {
        let body: SendOtpBody = serde_json::from_str(r#"{"recipient": "+998901234567"}"#).unwrap();
        assert_eq!(body.kind, RecipientKind::Phone);
        assert_eq!(body.otp_length, None);

        let body: SendOtpBody =
            serde_json::from_str(r#"{"recipient": "a@b.co", "type": "EMAIL"}"#).unwrap();
        assert_eq!(body.kind, RecipientKind::Email);
    }
}
