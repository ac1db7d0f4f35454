/// YAML input decoded through `serde_json::Value`.
///
/// serde_yaml only accepts externally tagged enums written as YAML tags
/// (`!denyWithStatus 503`). Going through JSON accepts the map form
/// (`denyWithStatus: 503`) as well, and keeps YAML and JSON input identical.
pub mod yamlviajson {
	use serde::Serialize;
	use serde::de::DeserializeOwned;

	#[derive(thiserror::Error, Debug)]
	pub enum Error {
		#[error("{0}")]
		Yaml(#[from] serde_yaml::Error),
		#[error("{0}")]
		Json(#[from] serde_json::Error),
	}

	pub fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, Error> {
		let value: serde_json::Value = serde_yaml::from_str(s)?;
		Ok(serde_json::from_value(value)?)
	}

	pub fn to_string<T: Serialize>(value: &T) -> Result<String, Error> {
		let value = serde_json::to_value(value)?;
		Ok(serde_yaml::to_string(&value)?)
	}

	#[cfg(test)]
	mod tests {
		use assert_matches::assert_matches;

		use super::*;
		use crate::server::FailureMode;

		#[test]
		fn externally_tagged_map_form() {
			let mode: FailureMode = from_str("denyWithStatus: 503").unwrap();
			assert_eq!(mode, FailureMode::DenyWithStatus(503));
			let mode: FailureMode = from_str(r#"{"denyWithStatus": 429}"#).unwrap();
			assert_eq!(mode, FailureMode::DenyWithStatus(429));
		}

		#[test]
		fn roundtrip_keeps_map_form() {
			let yaml = to_string(&FailureMode::DenyWithStatus(503)).unwrap();
			assert_eq!(yaml.trim(), "denyWithStatus: 503");
			assert_eq!(
				from_str::<FailureMode>(&yaml).unwrap(),
				FailureMode::DenyWithStatus(503)
			);
		}

		#[test]
		fn errors_keep_their_source() {
			assert_matches!(from_str::<FailureMode>("a: [b"), Err(Error::Yaml(_)));
			assert_matches!(from_str::<FailureMode>("sometimes"), Err(Error::Json(_)));
		}
	}
}
