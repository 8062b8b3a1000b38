use std::collections::HashMap;

use azcheck_core::{AppError, AppResult, NonEmptyString};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::compute_ports::{ClientSecretCredentials, SecretProvider};

/// Configuration map key holding the YAML document.
pub const YAML_CONFIGURATION_KEY: &str = "yaml";

#[derive(Debug, Default, Deserialize)]
struct RawCheckConfiguration {
    #[serde(default)]
    subscriptionid: String,
    #[serde(default)]
    clientid: String,
    #[serde(default)]
    tenantid: String,
}

/// Decoded and validated plugin configuration.
#[derive(Debug, Clone)]
pub struct CheckConfiguration {
    subscription_id: NonEmptyString,
    client_id: NonEmptyString,
    tenant_id: NonEmptyString,
    client_secret: SecretString,
}

impl CheckConfiguration {
    /// Decodes the `yaml` entry of the host configuration map and pairs it
    /// with the out-of-band client secret.
    ///
    /// Fails before any network call when the YAML is absent or malformed, or
    /// when the subscription id, client id, tenant id or secret is empty.
    pub fn decode(
        configuration: &HashMap<String, String>,
        secrets: &dyn SecretProvider,
    ) -> AppResult<Self> {
        let yaml = configuration.get(YAML_CONFIGURATION_KEY).ok_or_else(|| {
            AppError::Configuration(format!(
                "'{YAML_CONFIGURATION_KEY}' parameter is missing"
            ))
        })?;

        let raw: RawCheckConfiguration = serde_yaml::from_str(yaml).map_err(|error| {
            AppError::Configuration(format!("failed to parse configuration YAML: {error}"))
        })?;

        debug!(
            subscription_id = %raw.subscriptionid,
            client_id = %raw.clientid,
            tenant_id = %raw.tenantid,
            "decoded plugin configuration"
        );

        let client_secret = secrets
            .client_secret()
            .filter(|secret| !secret.expose_secret().trim().is_empty());

        let client_id = required("clientid", raw.clientid)?;
        let tenant_id = required("tenantid", raw.tenantid)?;
        let client_secret = client_secret.ok_or_else(|| {
            AppError::Configuration("AZURE_CLIENT_SECRET is not set".to_owned())
        })?;
        let subscription_id = required("subscriptionid", raw.subscriptionid)?;

        Ok(Self {
            subscription_id,
            client_id,
            tenant_id,
            client_secret,
        })
    }

    /// Returns the subscription id.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        self.subscription_id.as_str()
    }

    /// Returns the application (client) id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    /// Returns the tenant id.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        self.tenant_id.as_str()
    }

    /// Returns explicit client-secret credentials for the check phase.
    #[must_use]
    pub fn client_secret_credentials(&self) -> ClientSecretCredentials {
        ClientSecretCredentials {
            tenant_id: self.tenant_id.as_str().to_owned(),
            client_id: self.client_id.as_str().to_owned(),
            client_secret: self.client_secret.clone(),
        }
    }
}

fn required(key: &str, value: String) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value)
        .map_err(|_| AppError::Configuration(format!("'{key}' must be set in configuration YAML")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use azcheck_core::AppError;
    use secrecy::{ExposeSecret, SecretString};

    use super::{CheckConfiguration, YAML_CONFIGURATION_KEY};
    use crate::compute_ports::SecretProvider;

    struct FixedSecret(Option<&'static str>);

    impl SecretProvider for FixedSecret {
        fn client_secret(&self) -> Option<SecretString> {
            self.0.map(|secret| SecretString::from(secret.to_owned()))
        }
    }

    fn configuration(yaml: &str) -> HashMap<String, String> {
        HashMap::from([(YAML_CONFIGURATION_KEY.to_owned(), yaml.to_owned())])
    }

    const VALID_YAML: &str = "subscriptionid: sub-1\nclientid: client-1\ntenantid: tenant-1\n";

    #[test]
    fn decodes_all_values() {
        let config = CheckConfiguration::decode(
            &configuration(VALID_YAML),
            &FixedSecret(Some("s3cret")),
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.subscription_id(), "sub-1");
        assert_eq!(config.client_id(), "client-1");
        assert_eq!(config.tenant_id(), "tenant-1");
        let credentials = config.client_secret_credentials();
        assert_eq!(credentials.client_secret.expose_secret(), "s3cret");
    }

    #[test]
    fn ignores_unknown_keys() {
        let yaml = format!("{VALID_YAML}region: westeurope\n");
        let result = CheckConfiguration::decode(&configuration(&yaml), &FixedSecret(Some("s")));
        assert!(result.is_ok());
    }

    #[test]
    fn missing_yaml_entry_is_configuration_error() {
        let result = CheckConfiguration::decode(&HashMap::new(), &FixedSecret(Some("s")));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn malformed_yaml_is_configuration_error() {
        let result = CheckConfiguration::decode(
            &configuration("subscriptionid: [unterminated"),
            &FixedSecret(Some("s")),
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn each_missing_value_fails_independently() {
        let cases = [
            ("subscriptionid: ''\nclientid: c\ntenantid: t\n", Some("s")),
            ("subscriptionid: s\nclientid: ''\ntenantid: t\n", Some("s")),
            ("subscriptionid: s\nclientid: c\ntenantid: ''\n", Some("s")),
            ("subscriptionid: s\nclientid: c\n", Some("s")),
            (VALID_YAML, None),
            (VALID_YAML, Some("  ")),
        ];

        for (yaml, secret) in cases {
            let result = CheckConfiguration::decode(&configuration(yaml), &FixedSecret(secret));
            assert!(
                matches!(result, Err(AppError::Configuration(_))),
                "expected configuration error for {yaml:?} / {secret:?}"
            );
        }
    }
}
