//! Downstream gRPC transport.
//!
//! One lazily connected [`Channel`] per backend endpoint. Calls are unary,
//! carry a deadline, and encode protobuf messages from [`pb`] with
//! [`ProstCodec`].

pub mod pb;
pub mod structs;

use std::time::Duration;

use http::uri::PathAndQuery;
use tonic::codec::ProstCodec;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;
use ucode_common::{Error, GrpcConfig};

/// A unary client bound to one backend endpoint.
#[derive(Debug, Clone)]
pub struct GrpcClient {
    channel: Channel,
    timeout: Duration,
}

impl GrpcClient {
    /// Build a client without dialing; the first call connects.
    pub fn connect_lazy(address: &str, config: &GrpcConfig) -> Result<Self, Error> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let channel = Endpoint::from_shared(address.to_string())
            .map_err(|e| Error::Config(format!("invalid gRPC endpoint '{address}': {e}")))?
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(timeout)
            .connect_lazy();

        Ok(Self { channel, timeout })
    }

    /// Issue a unary call on `path` (`/package.Service/Method`).
    pub async fn unary<Req, Res>(&self, path: &'static str, message: Req) -> Result<Res, Status>
    where
        Req: prost::Message + 'static,
        Res: prost::Message + Default + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;

        let mut request = tonic::Request::new(message);
        request.set_timeout(self.timeout);

        tracing::debug!(method = path, "gRPC call");
        let response = grpc
            .unary(
                request,
                PathAndQuery::from_static(path),
                ProstCodec::<Req, Res>::default(),
            )
            .await
            .map_err(|status| {
                tracing::debug!(method = path, code = ?status.code(), "gRPC call failed");
                status
            })?;

        Ok(response.into_inner())
    }
}
