//! Transcoder service client.

use async_trait::async_trait;
use serde_json::Value;
use tonic::Status;

use crate::grpc::structs::{object_to_struct, struct_to_object};
use crate::grpc::GrpcClient;

const CREATE_PIPELINE: &str = "/transcoder_service.PipelineService/CreatePipeline";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscoderService: Send + Sync {
    /// Queue a transcoding pipeline for an uploaded video.
    async fn create_pipeline(&self, pipeline: Value) -> Result<Value, Status>;
}

pub struct GrpcTranscoderService {
    client: GrpcClient,
}

impl GrpcTranscoderService {
    pub fn new(client: GrpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscoderService for GrpcTranscoderService {
    async fn create_pipeline(&self, pipeline: Value) -> Result<Value, Status> {
        let reply: prost_types::Struct = self
            .client
            .unary(CREATE_PIPELINE, object_to_struct(pipeline)?)
            .await?;
        Ok(struct_to_object(Some(reply)))
    }
}
