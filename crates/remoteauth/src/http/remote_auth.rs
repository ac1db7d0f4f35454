use ::http::header::COOKIE;
use itertools::Itertools;
use tracing::Instrument;

use crate::attributes;
use crate::client::Client;
use crate::config::Config;
use crate::http::forward::select_forwarded_headers;
use crate::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use crate::*;

#[cfg(test)]
#[path = "remote_auth_tests.rs"]
mod tests;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// The check could not be built or sent, or the response could not be read.
	#[error("authorization request failed: {0}")]
	Transport(#[from] reqwest::Error),
	/// The service allowed the request, but the body is not a JSON object.
	#[error("invalid authorization response body: {0}")]
	Decode(#[from] serde_json::Error),
}

/// The inbound request being authorized, as seen by the proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationRequest {
	pub headers: HashMap<String, String>,
}

impl AuthorizationRequest {
	pub fn new(headers: HashMap<String, String>) -> Self {
		Self { headers }
	}

	/// Flatten an HTTP header map. Repeated headers are joined with `, `, except
	/// cookies which are joined with `; `. Values that are not visible ASCII are dropped.
	pub fn from_header_map(hm: &HeaderMap) -> Self {
		let headers = hm
			.keys()
			.filter_map(|name| {
				let values: Vec<&str> = hm
					.get_all(name)
					.iter()
					.filter_map(|v| v.to_str().ok())
					.collect();
				if values.is_empty() {
					return None;
				}
				let sep = if *name == COOKIE { "; " } else { ", " };
				Some((name.as_str().to_string(), values.join(sep)))
			})
			.collect();
		Self { headers }
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).map(String::as_str)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationVerdict {
	Denied,
	/// Headers to inject into the authorized request. Order carries no meaning.
	Allowed(Vec<(HeaderName, String)>),
}

impl AuthorizationVerdict {
	pub fn is_allowed(&self) -> bool {
		matches!(self, AuthorizationVerdict::Allowed(_))
	}

	pub fn headers(&self) -> &[(HeaderName, String)] {
		match self {
			AuthorizationVerdict::Allowed(headers) => headers,
			AuthorizationVerdict::Denied => &[],
		}
	}

	/// Write the injected headers into `hm`. Existing values for those names are
	/// replaced; if the verdict carries a name more than once, every value is kept.
	pub fn apply(&self, hm: &mut HeaderMap) {
		for (name, _) in self.headers() {
			hm.remove(name);
		}
		for (name, value) in self.headers() {
			let Ok(hv) = HeaderValue::from_str(value) else {
				warn!(header = %name, "invalid header value from authorization service, skipping");
				continue;
			};
			hm.append(name.clone(), hv);
		}
	}
}

/// Delegates authorization decisions to a remote HTTP service.
///
/// Holds no per-request state: clones share the configuration and the
/// connection pool, and any number of checks may run concurrently.
#[derive(Clone, Debug)]
pub struct RemoteAuth {
	config: Arc<Config>,
	client: Client,
}

impl RemoteAuth {
	pub fn new(config: Config) -> Result<Self, Error> {
		Ok(Self::with_client(config, Client::new()?))
	}

	pub fn with_client(config: Config, client: Client) -> Self {
		info!(
			auth_url = %config.authorization_url,
			forward_request_headers = ?config.forwarded_header_names,
			request_id_header = ?config.correlation_header_name,
			response_headers = ?config.attribute_to_header,
			"configured remote authorization"
		);
		Self {
			config: Arc::new(config),
			client,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Run one check against the authorization service.
	///
	/// Exactly one outbound request is made. A 200 response allows the request;
	/// any other status denies it. Dropping the returned future aborts the
	/// outbound call.
	pub async fn authorize(
		&self,
		req: &AuthorizationRequest,
	) -> Result<AuthorizationVerdict, Error> {
		let span = match self.request_id(req) {
			Some(request_id) => tracing::info_span!("remote_auth", request_id),
			None => tracing::info_span!("remote_auth"),
		};
		self.check(req).instrument(span).await
	}

	fn request_id<'a>(&self, req: &'a AuthorizationRequest) -> Option<&'a str> {
		let name = self.config.correlation_header_name.as_deref()?;
		req.header(name)
	}

	async fn check(&self, req: &AuthorizationRequest) -> Result<AuthorizationVerdict, Error> {
		let forwarded = select_forwarded_headers(&req.headers, &self.config.forwarded_header_names);
		trace!(
			url = %self.config.authorization_url,
			headers = %forwarded.keys().join(","),
			"sending authorization request"
		);
		let check_req = self
			.client
			.build_get(&self.config.authorization_url, to_header_map(forwarded))?;

		let resp = match self.client.call(check_req).await {
			Ok(resp) => resp,
			Err(e) => {
				error!(error = %e, "unexpected error from authorization service");
				return Err(e.into());
			},
		};

		let status = resp.status();
		if status != StatusCode::OK {
			info!(
				status = status.as_u16(),
				"unsuccessful response from authorization service, denying access"
			);
			return Ok(AuthorizationVerdict::Denied);
		}

		let body = resp.bytes().await.inspect_err(|e| {
			error!(error = %e, "failed to read authorization response body");
		})?;
		let body = attributes::decode_body(&body).inspect_err(|e| {
			error!(error = %e, "unexpected error while extracting response headers");
		})?;
		let headers = attributes::extract_response_headers(&body, &self.config.attribute_to_header);
		info!(
			response_headers = %headers.iter().map(|(k, _)| k.as_str()).join(","),
			"successful response from authorization service, allowing request"
		);
		debug!(response_headers = ?headers, "injected headers");
		Ok(AuthorizationVerdict::Allowed(headers))
	}
}

fn to_header_map(headers: HashMap<String, String>) -> HeaderMap {
	let mut hm = HeaderMap::with_capacity(headers.len());
	for (name, value) in headers {
		let Ok(hn) = HeaderName::from_bytes(name.as_bytes()) else {
			warn!(header = %name, "invalid forwarded header name, skipping");
			continue;
		};
		let Ok(mut hv) = HeaderValue::from_str(&value) else {
			warn!(header = %name, "invalid forwarded header value, skipping");
			continue;
		};
		// Forwarded headers are usually credentials
		hv.set_sensitive(true);
		hm.insert(hn, hv);
	}
	hm
}
