//! DefinitionService gRPC implementation.
//!
//! Every call forks its own [`Context`] from the shared root, decodes its
//! arguments, runs the wrapped [`Service`], and encodes the result.
//! Classified errors become structured statuses. Panics raised by the
//! service are not caught and abort the call.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::Instrument;
use uuid::Uuid;

use crate::context::Context;
use crate::grpc::codec;
use crate::proto::datapb::Data;
use crate::proto::servicepb::definition_service_server::DefinitionService;
use crate::proto::servicepb::{EmptyRequest, InvokeRequest, MetadataResponse, StateRequest};
use crate::service::Service;
use crate::types::{Error, Result};
use crate::value::Value;

/// DefinitionService implementation wrapping a [`Service`].
pub struct DefinitionServer<S> {
    root: Arc<Context>,
    service: Arc<S>,
}

impl<S: Service> DefinitionServer<S> {
    pub fn new(root: Context, service: Arc<S>) -> Self {
        Self::with_shared_root(Arc::new(root), service)
    }

    pub fn with_shared_root(root: Arc<Context>, service: Arc<S>) -> Self {
        Self { root, service }
    }

    pub fn root(&self) -> &Context {
        &self.root
    }

    async fn identity_data(&self, mut ctx: Context) -> Result<Data> {
        let identifier = self.service.identifier(&mut ctx).await?;
        Ok(codec::encode(&Value::from(identifier)))
    }

    async fn invoke_data(&self, mut ctx: Context, req: InvokeRequest) -> Result<Data> {
        let arguments = match codec::decode_opt(&ctx, req.arguments.as_ref())? {
            Value::Array(arguments) => arguments,
            other => {
                return Err(Error::invalid_argument_shape(
                    "invoke",
                    "Array",
                    other.type_label(),
                ))
            }
        };

        tracing::debug!(
            identifier = %req.identifier,
            method = %req.method,
            arity = arguments.len(),
            "invoking"
        );
        let result = self
            .service
            .invoke(&mut ctx, &req.identifier, &req.method, arguments)
            .await?;
        Ok(codec::encode(&result))
    }

    async fn metadata_response(&self, mut ctx: Context) -> Result<MetadataResponse> {
        let (type_set, definitions) = self.service.metadata(&mut ctx).await?;
        let definitions = Value::Array(definitions.into_iter().map(Value::from).collect());

        Ok(MetadataResponse {
            typeset: Some(codec::encode(&Value::from(type_set))),
            definitions: Some(codec::encode(&definitions)),
        })
    }

    async fn state_data(&self, mut ctx: Context, req: StateRequest) -> Result<Data> {
        let input = match codec::decode_opt(&ctx, req.input.as_ref())? {
            Value::Hash(input) => input,
            other => {
                return Err(Error::invalid_argument_shape(
                    "state",
                    "Hash",
                    other.type_label(),
                ))
            }
        };

        let result = self
            .service
            .state(&mut ctx, &req.identifier, input)
            .await?;
        Ok(codec::encode(&result))
    }
}

/// Run one call inside its own span and map a classified failure to a status.
async fn dispatch<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T>>,
) -> std::result::Result<Response<T>, Status> {
    let span = tracing::debug_span!("call", operation, call_id = %Uuid::new_v4());
    call.instrument(span)
        .await
        .map(Response::new)
        .map_err(|err| reject(operation, err))
}

fn reject(operation: &'static str, err: Error) -> Status {
    match err.issue_code() {
        Some(code) => tracing::debug!(operation, code, error = %err, "call rejected"),
        None => tracing::warn!(operation, error = %err, "call failed"),
    }
    err.to_grpc_status()
}

impl<S> fmt::Debug for DefinitionServer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionServer")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[tonic::async_trait]
impl<S: Service> DefinitionService for DefinitionServer<S> {
    async fn identity(
        &self,
        _request: Request<EmptyRequest>,
    ) -> std::result::Result<Response<Data>, Status> {
        dispatch("identity", self.identity_data(self.root.fork())).await
    }

    async fn invoke(
        &self,
        request: Request<InvokeRequest>,
    ) -> std::result::Result<Response<Data>, Status> {
        let req = request.into_inner();
        dispatch("invoke", self.invoke_data(self.root.fork(), req)).await
    }

    async fn metadata(
        &self,
        _request: Request<EmptyRequest>,
    ) -> std::result::Result<Response<MetadataResponse>, Status> {
        dispatch("metadata", self.metadata_response(self.root.fork())).await
    }

    async fn state(
        &self,
        request: Request<StateRequest>,
    ) -> std::result::Result<Response<Data>, Status> {
        let req = request.into_inner();
        dispatch("state", self.state_data(self.root.fork(), req)).await
    }
}
