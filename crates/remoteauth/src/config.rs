use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use remoteauth_core::telemetry;
use serde_with::DisplayFromStr;
use url::Url;

use crate::http::HeaderName;
use crate::server::FailureMode;
use crate::*;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// The configuration has the wrong shape or holds invalid values.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("failed to parse configuration: {0}")]
	Parse(#[from] yamlviajson::Error),
	#[error("invalid authUrl {url:?}: {source}")]
	InvalidUrl { url: String, source: url::ParseError },
	#[error("authUrl {0:?} must use http or https")]
	UnsupportedScheme(String),
	#[error("attribute {attribute:?} is mapped to both {first} and {second}")]
	DuplicateAttribute {
		attribute: String,
		first: HeaderName,
		second: HeaderName,
	},
}

/// Remote authorization settings as written in a config file.
#[apply(schema!)]
#[derive(Default, PartialEq, Eq)]
pub struct LocalRemoteAuth {
	/// URL of the authorization service. Every check is a GET to exactly this URL.
	pub auth_url: String,
	/// Inbound request headers to send with the check. Names are matched exactly.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub forward_request_headers: Vec<String>,
	/// Inbound header holding a request id, used to correlate logs. Empty disables it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_id_header: Option<String>,
	/// Headers to set on allowed requests, mapped to the response attribute they are read from.
	#[serde(default, skip_serializing_if = "HashMap::is_empty")]
	#[serde_as(as = "HashMap<DisplayFromStr, _>")]
	pub response_headers: HashMap<HeaderName, String>,
}

/// Validated remote authorization settings. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub authorization_url: Url,
	pub forwarded_header_names: HashSet<String>,
	pub correlation_header_name: Option<String>,
	/// Response attribute to the header it is injected as. Attribute names are case-sensitive.
	pub attribute_to_header: HashMap<String, HeaderName>,
}

impl Config {
	pub fn new(authorization_url: Url) -> Self {
		Self {
			authorization_url,
			forwarded_header_names: HashSet::new(),
			correlation_header_name: None,
			attribute_to_header: HashMap::new(),
		}
	}

	/// Configured inbound header names that cannot match a request built with
	/// `AuthorizationRequest::from_header_map`, which always yields lowercase names.
	/// Matching stays exact; these are only reported.
	pub fn unmatchable_header_names(&self) -> Vec<&str> {
		self
			.forwarded_header_names
			.iter()
			.map(String::as_str)
			.chain(self.correlation_header_name.as_deref())
			.filter(|name| name.bytes().any(|b| b.is_ascii_uppercase()))
			.sorted()
			.dedup()
			.collect()
	}
}

impl TryFrom<LocalRemoteAuth> for Config {
	type Error = Error;

	fn try_from(raw: LocalRemoteAuth) -> Result<Self, Self::Error> {
		let authorization_url = Url::parse(&raw.auth_url).map_err(|source| Error::InvalidUrl {
			url: raw.auth_url.clone(),
			source,
		})?;
		if !matches!(authorization_url.scheme(), "http" | "https") {
			return Err(Error::UnsupportedScheme(raw.auth_url));
		}

		let mut attribute_to_header: HashMap<String, HeaderName> = HashMap::new();
		// Sorted so the reported conflict does not depend on hash order.
		for (header, attribute) in raw
			.response_headers
			.into_iter()
			.sorted_by(|a, b| a.0.as_str().cmp(b.0.as_str()))
		{
			if let Some(first) = attribute_to_header.get(&attribute) {
				return Err(Error::DuplicateAttribute {
					attribute,
					first: first.clone(),
					second: header,
				});
			}
			attribute_to_header.insert(attribute, header);
		}

		let cfg = Config {
			authorization_url,
			forwarded_header_names: raw
				.forward_request_headers
				.into_iter()
				.filter(|h| !h.is_empty())
				.collect(),
			correlation_header_name: raw.request_id_header.filter(|h| !h.is_empty()),
			attribute_to_header,
		};
		for name in cfg.unmatchable_header_names() {
			warn!(
				header = name,
				"header name is not lowercase and will never match a request received over HTTP"
			);
		}
		Ok(cfg)
	}
}

/// Parse the remote authorization settings on their own (YAML or JSON).
pub fn parse_remote_auth(contents: &str) -> Result<Config, Error> {
	let raw: LocalRemoteAuth = yamlviajson::from_str(contents)?;
	Config::try_from(raw)
}

/// Settings for the standalone server, as written in a config file.
#[apply(schema!)]
pub struct LocalConfig {
	#[serde(default = "default_listen_addr")]
	pub listen_addr: SocketAddr,
	/// What to answer when the authorization service cannot produce a verdict.
	#[serde(default)]
	pub failure_mode: FailureMode,
	#[serde(default)]
	pub logging: telemetry::Config,
	pub remote_auth: LocalRemoteAuth,
}

fn default_listen_addr() -> SocketAddr {
	SocketAddr::from(([0, 0, 0, 0], 9001))
}

#[derive(Debug, Clone)]
pub struct AppConfig {
	pub listen_addr: SocketAddr,
	pub failure_mode: FailureMode,
	pub logging: telemetry::Config,
	pub remote_auth: Config,
}

pub fn parse_config(contents: &str) -> anyhow::Result<AppConfig> {
	let raw: LocalConfig = yamlviajson::from_str(contents).map_err(Error::Parse)?;
	let remote_auth =
		Config::try_from(raw.remote_auth).context("invalid remoteAuth configuration")?;
	Ok(AppConfig {
		listen_addr: raw.listen_addr,
		failure_mode: raw.failure_mode,
		logging: raw.logging,
		remote_auth,
	})
}

pub async fn load_config(path: impl AsRef<Path>) -> anyhow::Result<AppConfig> {
	let contents = fs_err::tokio::read_to_string(path.as_ref()).await?;
	parse_config(&contents).with_context(|| format!("loading {}", path.as_ref().display()))
}
