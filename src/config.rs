//! Explicit client configuration passed at construction time.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError, session::DEFAULT_STORAGE_KEY};

/// Environment variable overriding the base endpoint in [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "CRM_API_BASE_URL";
/// Environment variable overriding the default timeout (milliseconds).
pub const TIMEOUT_MS_ENV: &str = "CRM_API_TIMEOUT_MS";
/// Base endpoint used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";
/// Timeout applied to calls that do not set their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
/// Refresh endpoint, relative to the base endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "auth/refresh";

/// Immutable settings shared by every call a [`Client`](crate::client::Client) makes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Root every relative request path is joined onto. Always ends with `/`.
	pub base_endpoint: Url,
	/// Timeout for calls that do not override it.
	pub default_timeout: Duration,
	/// Path of the cookie-authenticated refresh exchange, relative to the base endpoint.
	pub refresh_path: String,
	/// Key the credential is mirrored under in the persistent store.
	pub storage_key: String,
	/// Treat a string `access_token` field in any successful JSON object response as a
	/// session update.
	pub capture_response_credentials: bool,
}
impl ClientConfig {
	/// Builds a configuration with defaults for everything but the base endpoint.
	pub fn new(base_endpoint: Url) -> Result<Self, ConfigError> {
		Ok(Self {
			base_endpoint: normalize_base(base_endpoint)?,
			default_timeout: DEFAULT_TIMEOUT,
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			storage_key: DEFAULT_STORAGE_KEY.into(),
			capture_response_credentials: true,
		})
	}

	/// Parses `base_endpoint` and builds a configuration from it.
	pub fn parse(base_endpoint: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(base_endpoint)
			.map_err(|source| ConfigError::UnparsableBaseEndpoint { source })?;

		Self::new(url)
	}

	/// Loads [`BASE_URL_ENV`] and [`TIMEOUT_MS_ENV`], falling back to the defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let base = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty());
		let mut config = Self::parse(base.as_deref().unwrap_or(DEFAULT_BASE_URL).trim())?;

		if let Some(raw) = lookup(TIMEOUT_MS_ENV).filter(|v| !v.trim().is_empty()) {
			let millis = raw
				.trim()
				.parse::<u64>()
				.map_err(|_| ConfigError::InvalidTimeout { value: raw.clone() })?;

			config.default_timeout = Duration::from_millis(millis);
		}

		Ok(config)
	}

	/// Overrides the default timeout.
	pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
		self.default_timeout = timeout;

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the persistent storage key.
	pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
		self.storage_key = key.into();

		self
	}

	/// Enables or disables implicit credential capture from response bodies.
	pub fn with_response_credential_capture(mut self, enabled: bool) -> Self {
		self.capture_response_credentials = enabled;

		self
	}

	/// Resolves a relative request path against the base endpoint.
	///
	/// Leading slashes are ignored so `"/customers"` and `"customers"` both land under the
	/// base path instead of replacing it. Absolute URLs and `..` segments that climb above
	/// the base path are rejected: the bearer credential is only ever sent to the base.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let url = self.base_endpoint.join(path.trim_start_matches('/')).map_err(|source| {
			ConfigError::InvalidPath { path: path.to_owned(), source: Some(source) }
		})?;

		if url.origin() != self.base_endpoint.origin()
			|| !url.path().starts_with(self.base_endpoint.path())
		{
			return Err(ConfigError::InvalidPath { path: path.to_owned(), source: None });
		}

		Ok(url)
	}

	/// Absolute URL of the refresh exchange.
	pub fn refresh_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.refresh_path)
	}
}

fn normalize_base(mut url: Url) -> Result<Url, ConfigError> {
	if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
		return Err(ConfigError::InvalidBaseEndpoint { url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
		move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v).to_owned())
	}

	#[test]
	fn base_endpoint_gains_trailing_slash() {
		let config =
			ClientConfig::parse("https://crm.example.com/api/v1").expect("Base should parse.");

		assert_eq!(config.base_endpoint.as_str(), "https://crm.example.com/api/v1/");
		assert_eq!(
			config.endpoint("/customers/42").expect("Path should join.").as_str(),
			"https://crm.example.com/api/v1/customers/42"
		);
		assert_eq!(
			config.refresh_endpoint().expect("Refresh path should join.").as_str(),
			"https://crm.example.com/api/v1/auth/refresh"
		);
	}

	#[test]
	fn paths_escaping_the_base_are_rejected() {
		let config =
			ClientConfig::parse("https://crm.example.com/api").expect("Base should parse.");

		for path in [
			"https://attacker.example.net/steal",
			"http://crm.example.com/api/customers",
			"../admin",
			"customers/../../admin",
			"%2e%2e/admin",
			"mailto:ops@example.com",
		] {
			let err = config.endpoint(path).expect_err("Escaping path should be rejected.");

			assert!(
				matches!(err, ConfigError::InvalidPath { source: None, .. }),
				"{path} should escape the base: {err:?}."
			);
		}

		assert_eq!(
			config.endpoint("customers/../orders?page=2").expect("Path should join.").as_str(),
			"https://crm.example.com/api/orders?page=2"
		);
		assert_eq!(
			config.endpoint("//crm.example.com/customers").expect("Path should join.").as_str(),
			"https://crm.example.com/api/crm.example.com/customers"
		);
	}

	#[test]
	fn non_http_base_is_rejected() {
		let err =
			ClientConfig::parse("file:///tmp/api").expect_err("File URLs are not endpoints.");

		assert!(matches!(err, ConfigError::InvalidBaseEndpoint { .. }));
		assert!(matches!(
			ClientConfig::parse("/api").expect_err("Relative roots cannot be parsed."),
			ConfigError::UnparsableBaseEndpoint { .. }
		));
	}

	#[test]
	fn env_lookup_applies_overrides_and_defaults() {
		let defaults = ClientConfig::from_lookup(lookup(&[])).expect("Defaults should load.");

		assert_eq!(defaults.base_endpoint.as_str(), DEFAULT_BASE_URL);
		assert_eq!(defaults.refresh_path, DEFAULT_REFRESH_PATH);
		assert!(defaults.capture_response_credentials);
		assert_eq!(defaults.default_timeout, Duration::from_millis(15_000));

		let custom = ClientConfig::from_lookup(lookup(&[
			(BASE_URL_ENV, "https://crm.internal/api"),
			(TIMEOUT_MS_ENV, " 2500 "),
		]))
		.expect("Overrides should load.");

		assert_eq!(custom.base_endpoint.as_str(), "https://crm.internal/api/");
		assert_eq!(custom.default_timeout, Duration::from_millis(2_500));

		let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_MS_ENV, "soon")]))
			.expect_err("Non-numeric timeout should be rejected.");

		assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
	}
}
