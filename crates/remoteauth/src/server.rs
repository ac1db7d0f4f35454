//! HTTP ext-authz front end.
//!
//! Every request that reaches the server is treated as a check: its headers are
//! the attributes of the request being authorized. An allowed check answers 200
//! with the injected headers, which the proxy copies onto the upstream request.
//! Anything else answers with a denial status.

use std::future::Future;

use axum::Router;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;

use crate::http::remote_auth::{self, AuthorizationRequest, AuthorizationVerdict, RemoteAuth};
use crate::http::{HeaderMap, StatusCode};
use crate::*;

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

/// Answer to give when the authorization service could not produce a verdict.
#[apply(schema!)]
#[derive(Default, Copy, PartialEq, Eq)]
pub enum FailureMode {
	Allow,
	#[default]
	Deny,
	DenyWithStatus(u16),
}

impl FailureMode {
	fn respond(&self, error: &remote_auth::Error) -> Response {
		match self {
			FailureMode::Allow => {
				debug!(%error, "allowing request due to failure mode");
				StatusCode::OK.into_response()
			},
			FailureMode::Deny => StatusCode::FORBIDDEN.into_response(),
			FailureMode::DenyWithStatus(code) => {
				let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::FORBIDDEN);
				(status, "Authorization service unavailable").into_response()
			},
		}
	}
}

#[derive(Debug)]
struct ServerState {
	auth: RemoteAuth,
	failure_mode: FailureMode,
}

pub fn router(auth: RemoteAuth, failure_mode: FailureMode) -> Router {
	Router::new()
		.route("/healthz", get(healthz))
		.fallback(check)
		.with_state(Arc::new(ServerState { auth, failure_mode }))
}

async fn healthz() -> &'static str {
	"ok"
}

async fn check(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
	let req = AuthorizationRequest::from_header_map(&headers);
	match state.auth.authorize(&req).await {
		Ok(verdict @ AuthorizationVerdict::Allowed(_)) => {
			let mut resp = StatusCode::OK.into_response();
			verdict.apply(resp.headers_mut());
			resp
		},
		Ok(AuthorizationVerdict::Denied) => StatusCode::FORBIDDEN.into_response(),
		Err(e) => {
			warn!(error = %e, "authorization check failed");
			state.failure_mode.respond(&e)
		},
	}
}

/// Serve checks on `listener` until `shutdown` resolves.
pub async fn serve(
	listener: TcpListener,
	router: Router,
	shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown)
		.await?;
	Ok(())
}
