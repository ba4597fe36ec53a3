//! Request dispatch.
//!
//! [`Dispatcher::serve`] runs one request through the whole pipeline:
//!
//! 1. session sync and a fresh [`RequestContext`]
//! 2. before-phase interceptors; stop if one returns `false`
//! 3. route lookup, then [`Dispatcher::invoke`] or a negotiated 404
//! 4. translation of the dispatch error into a response
//! 5. after-phase interceptors
//!
//! Error translation:
//!
//! | Dispatch result | Response |
//! |-----------------|----------|
//! | `StatusError` 401 | `301` redirect to `/` |
//! | other `StatusError` | that status, message as plain-text body |
//! | anything else | logged at `warn`, response left as is |

use std::sync::Arc;

use bytes::Bytes;
use heron_core::{
    HandlerError, Request, RequestContext, ResponseWriter, ServerContext, SessionStore, StatusError,
};
use heron_extract::{DispatchError, DispatchParts, Output};
use heron_telemetry::metrics::{record_request, InFlightGuard};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::{debug, warn};

use crate::handler::HandlerDescriptor;
use crate::tree::HandlerTree;

const NOT_FOUND_HTML: &str = "Page not found";
const NOT_FOUND_TEXT: &str = "Not Found";

/// The frozen request pipeline shared by every connection.
pub struct Dispatcher {
    tree: HandlerTree,
    context: Arc<dyn ServerContext>,
    sessions: Arc<dyn SessionStore>,
}

impl Dispatcher {
    /// Freezes `tree` for serving.
    pub fn new(
        tree: HandlerTree,
        context: Arc<dyn ServerContext>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            tree,
            context,
            sessions,
        }
    }

    /// Returns the handler tree.
    #[must_use]
    pub fn tree(&self) -> &HandlerTree {
        &self.tree
    }

    /// Returns the server-wide context.
    #[must_use]
    pub fn context(&self) -> &Arc<dyn ServerContext> {
        &self.context
    }

    /// Returns the session store.
    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Serves one request, writing into `resp`.
    pub async fn serve(&self, resp: &ResponseWriter, req: &Request) {
        let session = self.sessions.sync(resp, req);
        let ctx = RequestContext::new(Arc::clone(&self.context), session);
        let chain = self.tree.chain();

        if !chain.run_before(&ctx, resp, req).await {
            return;
        }

        debug!(
            request_id = %ctx.request_id(),
            method = %req.method(),
            path = %req.path_and_query(),
            "dispatching request"
        );

        match self.tree.lookup(req.method(), req.path()) {
            Some(descriptor) => {
                if let Err(err) = self.invoke(&ctx, resp, req, descriptor).await {
                    answer_error(resp, err);
                }
            }
            None => not_found(resp, req),
        }

        chain.run_after(&ctx, resp, req).await;
    }

    /// Binds, invokes and serializes one handler.
    ///
    /// Every output is serialized in declared order; the first present
    /// error is returned once all outputs are processed.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BodyDecode`] without invoking the handler if
    /// a payload parameter cannot be decoded, or the handler's first error.
    pub async fn invoke(
        &self,
        ctx: &RequestContext,
        resp: &ResponseWriter,
        req: &Request,
        descriptor: &HandlerDescriptor,
    ) -> Result<(), DispatchError> {
        let parts = DispatchParts::new(ctx.clone(), resp.clone(), req.clone());
        let outputs = descriptor.call(parts).await?;

        let mut result = Ok(());
        for output in outputs {
            match output {
                Output::Template(name) => render_template(ctx, resp, &name),
                Output::Error(err) => {
                    if result.is_ok() {
                        result = Err(DispatchError::Handler(err));
                    }
                }
                Output::Structured(encoded) => {
                    resp.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    match encoded {
                        Ok(body) => resp.write(&body),
                        Err(message) => {
                            debug!(error = %message, "failed to encode structured output");
                            resp.write(message.as_bytes());
                        }
                    }
                }
                Output::Raw(bytes) => resp.write(&bytes),
            }
        }
        result
    }

    /// Serves a transport-level request and returns the finished response.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let _in_flight = InFlightGuard::new();
        let req = Request::from(req);
        let resp = ResponseWriter::new();

        let started = std::time::Instant::now();
        self.serve(&resp, &req).await;
        let response = resp.into_response().map(Full::new);

        record_request(req.method().as_str(), response.status().as_u16(), started.elapsed());
        response
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

fn render_template(ctx: &RequestContext, resp: &ResponseWriter, name: &str) {
    match ctx.server().render_template(name, &ctx.data()) {
        Ok(body) => {
            resp.set_header(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
            resp.write(&body);
        }
        Err(err) => {
            debug!(template = %name, error = %err, "template render failed, redirecting");
            resp.redirect(name, StatusCode::FOUND);
        }
    }
}

fn answer_error(resp: &ResponseWriter, err: DispatchError) {
    match err {
        DispatchError::Handler(HandlerError::Status(status)) => answer_status(resp, &status),
        other => warn!(error = %other, "request failed"),
    }
}

fn answer_status(resp: &ResponseWriter, status: &StatusError) {
    if status.code() == StatusCode::UNAUTHORIZED {
        resp.redirect("/", StatusCode::MOVED_PERMANENTLY);
    } else {
        resp.error(status.message(), status.code());
    }
}

fn not_found(resp: &ResponseWriter, req: &Request) {
    let wants_html = req
        .header(ACCEPT)
        .is_some_and(|accept| accept.contains("text/html"));
    let message = if wants_html { NOT_FOUND_HTML } else { NOT_FOUND_TEXT };
    resp.error(message, StatusCode::NOT_FOUND);
}
