pub use std::collections::{HashMap, HashSet};
pub use std::sync::Arc;
pub use std::time::Duration;

pub use macro_rules_attribute::apply;
pub use tracing::{debug, error, info, trace, warn};

/// Shared serde setup for configuration types: camelCase keys, unknown keys rejected.
macro_rules! schema {
	($item:item) => {
		#[serde_with::serde_as]
		#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
		#[serde(rename_all = "camelCase", deny_unknown_fields)]
		$item
	};
}

pub mod app;
pub mod attributes;
pub mod client;
pub mod config;
pub mod http;
pub mod serdes;
pub mod server;

pub use crate::config::Config;
pub use crate::serdes::yamlviajson;
pub use crate::http::remote_auth::{
	AuthorizationRequest, AuthorizationVerdict, Error, RemoteAuth,
};
