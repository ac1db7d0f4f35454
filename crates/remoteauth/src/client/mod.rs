use std::fmt::Debug;

use url::Url;

use crate::http::HeaderMap;

const USER_AGENT: &str = concat!("remoteauth/", env!("CARGO_PKG_VERSION"));

/// Outbound HTTP client used for authorization calls.
///
/// Clones share one connection pool, so a single client can serve any number of
/// concurrent checks.
#[derive(Clone)]
pub struct Client {
	inner: reqwest::Client,
}

impl Debug for Client {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Client").finish()
	}
}

impl Client {
	pub fn new() -> Result<Self, reqwest::Error> {
		let inner = reqwest::Client::builder()
			.user_agent(USER_AGENT)
			// A redirect is an answer from the authorization service, not something to chase.
			.redirect(reqwest::redirect::Policy::none())
			.build()?;
		Ok(Self { inner })
	}

	/// Build a bodiless GET to `url` carrying exactly `headers`.
	pub fn build_get(&self, url: &Url, headers: HeaderMap) -> Result<reqwest::Request, reqwest::Error> {
		self.inner.get(url.clone()).headers(headers).build()
	}

	pub async fn call(&self, req: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
		self.inner.execute(req).await
	}
}
