use std::env;

use azcheck_application::SecretProvider;
use secrecy::SecretString;

/// Environment variable holding the service-principal secret.
pub const AZURE_CLIENT_SECRET_ENV: &str = "AZURE_CLIENT_SECRET";

/// Reads the client secret from process environment on every call.
#[derive(Debug, Clone)]
pub struct EnvironmentSecretProvider {
    variable: String,
}

impl EnvironmentSecretProvider {
    /// Creates a provider reading `AZURE_CLIENT_SECRET`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_variable(AZURE_CLIENT_SECRET_ENV)
    }

    /// Creates a provider reading the given variable.
    #[must_use]
    pub fn with_variable(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl Default for EnvironmentSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for EnvironmentSecretProvider {
    fn client_secret(&self) -> Option<SecretString> {
        env::var(&self.variable)
            .ok()
            .filter(|value| !value.is_empty())
            .map(SecretString::from)
    }
}
