use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(serde::Serialize, serde::Deserialize, Default, Copy, Eq, PartialEq, Clone, Debug)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub enum Format {
	#[default]
	Plain,
	Json,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
	#[serde(default)]
	pub format: Format,
	/// Default filter directives. `RUST_LOG`, when set, takes precedence.
	#[serde(default = "default_filter")]
	pub filter: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			format: Format::default(),
			filter: default_filter(),
		}
	}
}

fn default_filter() -> String {
	"info".to_string()
}

/// Install the global subscriber. Fails if one was already installed.
pub fn setup_logging(cfg: &Config) -> anyhow::Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(f) => f,
		Err(_) => EnvFilter::try_new(&cfg.filter)?,
	};
	let registry = tracing_subscriber::registry().with(filter);
	match cfg.format {
		Format::Plain => registry.with(fmt::layer()).try_init()?,
		Format::Json => registry
			.with(fmt::layer().json().flatten_event(true).with_current_span(true))
			.try_init()?,
	}
	Ok(())
}

pub mod testing {
	use std::sync::Once;

	use tracing_subscriber::prelude::*;
	use tracing_subscriber::{EnvFilter, fmt};

	static INIT: Once = Once::new();

	/// Route logs through the test harness writer so they only show up for failing tests.
	pub fn setup_test_logging() {
		INIT.call_once(|| {
			let filter =
				EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
			// Another harness may have installed a subscriber already; that's fine.
			let _ = tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_test_writer())
				.try_init();
		});
	}
}
