//! Chat service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tonic::Status;

use crate::grpc::pb::chat_service as pb;
use crate::grpc::structs::{object_to_struct, struct_to_object};
use crate::grpc::GrpcClient;

const CREATE_CHAT: &str = "/chat_service.ChatService/CreateChat";
const GET_CHAT_LIST: &str = "/chat_service.ChatService/GetChatList";
const GET_CHAT: &str = "/chat_service.ChatService/GetChatByChatId";
const SEND_MESSAGE: &str = "/chat_service.ChatService/SendMessage";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListChatsReq {
    pub project_id: String,
    pub environment_id: String,
    pub user_id: String,
    pub search: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetChatReq {
    pub chat_id: String,
    pub project_id: String,
    pub environment_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn create_chat(&self, chat: Value) -> Result<Value, Status>;

    async fn list_chats(&self, request: ListChatsReq) -> Result<Value, Status>;

    async fn get_chat(&self, request: GetChatReq) -> Result<Value, Status>;

    async fn send_message(&self, message: Value) -> Result<Value, Status>;
}

pub struct GrpcChatService {
    client: GrpcClient,
}

impl GrpcChatService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatService for GrpcChatService {
    async fn create_chat(&self, chat: Value) -> Result<Value, Status> {
        let reply: prost_types::Struct =
            self.client.unary(CREATE_CHAT, object_to_struct(chat)?).await?;
        Ok(struct_to_object(Some(reply)))
    }

    async fn list_chats(&self, request: ListChatsReq) -> Result<Value, Status> {
        let request = pb::GetChatListReq {
            project_id: request.project_id,
            environment_id: request.environment_id,
            user_id: request.user_id,
            search: request.search,
            limit: request.limit,
            offset: request.offset,
        };
        let reply: prost_types::Struct = self.client.unary(GET_CHAT_LIST, request).await?;
        Ok(struct_to_object(Some(reply)))
    }

    async fn get_chat(&self, request: GetChatReq) -> Result<Value, Status> {
        let request = pb::GetChatByChatIdReq {
            chat_id: request.chat_id,
            project_id: request.project_id,
            environment_id: request.environment_id,
        };
        let reply: prost_types::Struct = self.client.unary(GET_CHAT, request).await?;
        Ok(struct_to_object(Some(reply)))
    }

    async fn send_message(&self, message: Value) -> Result<Value, Status> {
        let reply: prost_types::Struct = self
            .client
            .unary(SEND_MESSAGE, object_to_struct(message)?)
            .await?;
        Ok(struct_to_object(Some(reply)))
    }
}
