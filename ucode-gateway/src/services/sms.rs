//! SMS / one-time-code service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tonic::Status;

use crate::grpc::pb::sms_service as pb;
use crate::grpc::structs::struct_to_object;
use crate::grpc::GrpcClient;

const SEND: &str = "/sms_service.SmsService/Send";
const CONFIRM_OTP: &str = "/sms_service.SmsService/ConfirmOtp";

/// Channel a one-time code is delivered through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientKind {
    #[default]
    Phone,
    Email,
}

impl RecipientKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "PHONE",
            Self::Email => "EMAIL",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendSmsReq {
    pub recipient: String,
    pub kind: RecipientKind,
    pub text: String,
    pub otp_length: u32,
    pub project_id: String,
    pub environment_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendSmsRes {
    #[serde(default)]
    pub sms_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyOtpReq {
    pub sms_id: String,
    pub otp: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsService: Send + Sync {
    async fn send(&self, request: SendSmsReq) -> Result<SendSmsRes, Status>;

    async fn verify(&self, request: VerifyOtpReq) -> Result<Value, Status>;
}

pub struct GrpcSmsService {
    client: GrpcClient,
}

impl GrpcSmsService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SmsService for GrpcSmsService {
    async fn send(&self, request: SendSmsReq) -> Result<SendSmsRes, Status> {
        let request = pb::SendSmsReq {
            recipient: request.recipient,
            kind: request.kind.as_str().to_string(),
            text: request.text,
            otp_length: request.otp_length,
            project_id: request.project_id,
            environment_id: request.environment_id,
        };
        let reply: pb::SendSmsRes = self.client.unary(SEND, request).await?;
        Ok(SendSmsRes {
            sms_id: reply.sms_id,
        })
    }

    async fn verify(&self, request: VerifyOtpReq) -> Result<Value, Status> {
        let request = pb::ConfirmOtpReq {
            sms_id: request.sms_id,
            otp: request.otp,
        };
        let reply: prost_types::Struct = self.client.unary(CONFIRM_OTP, request).await?;
        Ok(struct_to_object(Some(reply)))
    }
}
