use crate::*;

/// Select the inbound headers that may be sent to the authorization service.
///
/// Only names present in `allow_list` are kept, compared exactly (no case folding).
pub fn select_forwarded_headers(
	inbound: &HashMap<String, String>,
	allow_list: &HashSet<String>,
) -> HashMap<String, String> {
	allow_list
		.iter()
		.filter_map(|name| {
			inbound
				.get(name)
				.map(|value| (name.clone(), value.clone()))
		})
		.collect()
}
