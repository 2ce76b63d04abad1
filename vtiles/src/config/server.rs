use serde::Deserialize;

pub const DEFAULT_IP: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
	/// IP to bind to. Default: 0.0.0.0
	pub ip: Option<String>,

	/// TCP port to bind to. Default: 8080
	pub port: Option<u16>,

	/// Public URL the server is reachable at, used in logs and in `info.json`.
	pub base_url: Option<String>,

	/// Never re-encode tiles into a compression the container does not store them in.
	pub minimal_recompression: Option<bool>,
}

impl ServerConfig {
	pub fn override_optional_ip(&mut self, ip: &Option<String>) {
		if ip.is_some() {
			self.ip = ip.clone();
		}
	}
	pub fn override_optional_port(&mut self, port: &Option<u16>) {
		if port.is_some() {
			self.port = *port;
		}
	}
	pub fn override_optional_base_url(&mut self, base_url: &Option<String>) {
		if base_url.is_some() {
			self.base_url = base_url.clone();
		}
	}
	pub fn override_optional_minimal_recompression(&mut self, minimal_recompression: &Option<bool>) {
		if minimal_recompression.is_some() {
			self.minimal_recompression = *minimal_recompression;
		}
	}

	pub fn ip(&self) -> &str {
		self.ip.as_deref().unwrap_or(DEFAULT_IP)
	}

	pub fn port(&self) -> u16 {
		self.port.unwrap_or(DEFAULT_PORT)
	}

	/// Configured base URL without trailing slash, or one built from ip and port.
	pub fn base_url(&self) -> String {
		match &self.base_url {
			Some(url) => url.trim_end_matches('/').to_owned(),
			None => format!("http://{}:{}", self.ip(), self.port()),
		}
	}

	pub fn minimal_recompression(&self) -> bool {
		self.minimal_recompression.unwrap_or(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = ServerConfig::default();
		assert_eq!(config.ip(), "0.0.0.0");
		assert_eq!(config.port(), 8080);
		assert_eq!(config.base_url(), "http://0.0.0.0:8080");
		assert!(!config.minimal_recompression());
	}

	#[test]
	fn overrides_only_apply_when_set() {
		let mut config = ServerConfig {
			ip: Some("127.0.0.1".into()),
			port: Some(3000),
			base_url: Some("https://tiles.example.org/".into()),
			minimal_recompression: Some(true),
		};

		config.override_optional_ip(&None);
		config.override_optional_port(&Some(4000));
		config.override_optional_base_url(&None);
		config.override_optional_minimal_recompression(&Some(false));

		assert_eq!(config.ip(), "127.0.0.1");
		assert_eq!(config.port(), 4000);
		assert_eq!(config.base_url(), "https://tiles.example.org");
		assert!(!config.minimal_recompression());
	}
}
