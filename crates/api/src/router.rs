//! Message router
//!
//! Maps an extension message to a command. Anything that can be answered
//! without I/O (liveness, unknown actions, undecodable payloads) comes back
//! as [`Dispatch::Immediate`]; everything else as a [`Dispatch::Deferred`]
//! future the transport drives to completion.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use classbatch_domain::Result;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::commands;
use crate::context::AppContext;
use crate::protocol::{Request, Response};

/// Extension actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Authenticate,
    GetCourses,
    GetUserInfo,
    BatchCreateAssignment,
    BatchUploadMaterial,
    UploadFiles,
    TestConnection,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Authenticate,
        Action::GetCourses,
        Action::GetUserInfo,
        Action::BatchCreateAssignment,
        Action::BatchUploadMaterial,
        Action::UploadFiles,
        Action::TestConnection,
    ];

    /// Wire name, matched case-sensitively.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Authenticate => "authenticate",
            Action::GetCourses => "getCourses",
            Action::GetUserInfo => "getUserInfo",
            Action::BatchCreateAssignment => "batchCreateAssignment",
            Action::BatchUploadMaterial => "batchUploadMaterial",
            Action::UploadFiles => "uploadFiles",
            Action::TestConnection => "testConnection",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a message will be answered
pub enum Dispatch {
    Immediate(Response),
    /// A response will follow.
    Deferred(BoxFuture<'static, Response>),
}

impl Dispatch {
    pub fn is_immediate(&self) -> bool {
        matches!(self, Dispatch::Immediate(_))
    }

    /// Drive the dispatch to its response.
    pub async fn resolve(self) -> Response {
        match self {
            Dispatch::Immediate(response) => response,
            Dispatch::Deferred(future) => future.await,
        }
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Immediate(response) => f.debug_tuple("Immediate").field(response).finish(),
            Dispatch::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Routes extension messages to command handlers
pub struct MessageRouter {
    ctx: Arc<AppContext>,
}

impl MessageRouter {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Dispatch a raw JSON message.
    pub fn dispatch_value(&self, message: Value) -> Dispatch {
        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.dispatch(request),
            Err(err) => {
                warn!(error = %err, "Malformed message");
                Dispatch::Immediate(Response::failure(format!("Invalid message: {err}")))
            }
        }
    }

    /// Dispatch and wait for the response.
    pub async fn handle(&self, message: Value) -> Response {
        self.dispatch_value(message).resolve().await
    }

    pub fn dispatch(&self, request: Request) -> Dispatch {
        let Request { action, data, request_id } = request;

        let Some(action) = Action::parse(&action) else {
            warn!(action = %action, "Unknown action");
            return Dispatch::Immediate(Response::failure("Unknown action").with_request_id(request_id));
        };
        debug!(%action, "Dispatching message");

        match action {
            Action::TestConnection => Dispatch::Immediate(
                Response::success(&commands::test_connection()).with_request_id(request_id),
            ),
            Action::Authenticate => {
                self.defer(action, request_id, |ctx| async move { commands::authenticate(&ctx).await })
            }
            Action::GetCourses => {
                self.defer(action, request_id, |ctx| async move { commands::get_courses(&ctx).await })
            }
            Action::GetUserInfo => {
                self.defer(action, request_id, |ctx| async move { commands::get_user_info(&ctx).await })
            }
            Action::BatchCreateAssignment => match decode(data) {
                Ok(payload) => self.defer(action, request_id, |ctx| async move {
                    commands::batch_create_assignment(&ctx, payload).await
                }),
                Err(response) => Dispatch::Immediate(response.with_request_id(request_id)),
            },
            Action::BatchUploadMaterial => match decode(data) {
                Ok(payload) => self.defer(action, request_id, |ctx| async move {
                    commands::batch_upload_material(&ctx, payload).await
                }),
                Err(response) => Dispatch::Immediate(response.with_request_id(request_id)),
            },
            Action::UploadFiles => match decode(data) {
                Ok(payload) => self.defer(action, request_id, |ctx| async move {
                    commands::upload_files(&ctx, payload).await
                }),
                Err(response) => Dispatch::Immediate(response.with_request_id(request_id)),
            },
        }
    }

    fn defer<F, Fut, T>(&self, action: Action, request_id: Option<Value>, handler: F) -> Dispatch
    where
        F: FnOnce(Arc<AppContext>) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Serialize,
    {
        let span = info_span!("message", %action, message_id = %Uuid::new_v4());
        let command = handler(Arc::clone(&self.ctx));
        Dispatch::Deferred(Box::pin(
            async move { Response::from_result(command.await).with_request_id(request_id) }
                .instrument(span),
        ))
    }
}

/// Missing `data` decodes like `{}` so the error names the missing field.
fn decode<T: DeserializeOwned>(data: Option<Value>) -> std::result::Result<T, Response> {
    let data = data.unwrap_or_else(|| Value::Object(Map::new()));
    serde_json::from_value(data).map_err(|err| Response::failure(format!("Invalid payload: {err}")))
}
