use std::fs;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::account::{
    validate_address as check_address, AccountSettings, PaymasterSettings, TransferSettings,
};
use crate::passkey::PasskeySettings;

/// Assertions always require user verification
const REQUIRED_USER_VERIFICATION: &str = "required";

/// Attestation conveyance preferences a credential provider understands
const ATTESTATION_PREFERENCES: &[&str] = &["none", "indirect", "direct", "enterprise"];

/// Minimum challenge length accepted by `AppSettings::validate`
const MIN_CHALLENGE_LENGTH: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub passkeys: PasskeySettings,
    pub account: AccountSettings,
    pub transfer: TransferSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// A setting that failed validation
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid setting {field}: {reason}")]
pub struct SettingsError {
    pub field: &'static str,
    pub reason: String,
}

impl SettingsError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl AppSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - The resulting settings fail validation
    /// - Logger initialization fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        let settings = Self::load_without_logger()?;

        // The logger filter comes from the effective settings
        Self::logger_builder(&settings.logging).try_init()?;
        log::debug!("Effective settings: {settings:?}");
        Ok(settings)
    }

    /// Load and validate settings without touching the global logger
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed, or the
    /// resulting settings fail validation.
    pub fn load_without_logger() -> Result<Self, Box<dyn std::error::Error>> {
        // Load base settings from TOML or defaults
        let mut settings = Self::load_base_settings()?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut settings);

        settings.validate()?;
        Ok(settings)
    }

    /// Logger builder filtering by `logging.level` (`RUST_LOG` syntax)
    #[must_use]
    pub fn logger_builder(logging: &LoggingSettings) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&logging.level);
        builder
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `SAFE_PASSKEYS_CONFIG_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            let toml_content = fs::read_to_string(&default_config_path)?;
            settings = basic_toml::from_str(&toml_content)?;
            log::info!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(config_dir) = std::env::var("SAFE_PASSKEYS_CONFIG_DIR") {
            let config_path = std::path::Path::new(&config_dir).join("Settings.toml");
            if config_path.exists() {
                let toml_content = fs::read_to_string(&config_path)?;
                settings = basic_toml::from_str(&toml_content)?;
                log::info!("✓ Overriding settings from {}", config_path.display());
            } else {
                log::info!(
                    "ℹ SAFE_PASSKEYS_CONFIG_DIR set but no Settings.toml found at: {}",
                    config_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_passkey_env_overrides(&mut settings.passkeys);
        Self::apply_account_env_overrides(&mut settings.account);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for passkey settings
    fn apply_passkey_env_overrides(passkey_settings: &mut PasskeySettings) {
        if let Ok(storage_dir) = std::env::var("PASSKEY_STORAGE_DIR") {
            passkey_settings.storage_dir = storage_dir;
        }
        if let Ok(storage_key) = std::env::var("PASSKEY_STORAGE_KEY") {
            passkey_settings.storage_key = storage_key;
        }
        if let Ok(rp_name) = std::env::var("PASSKEY_RP_NAME") {
            passkey_settings.rp_name = rp_name;
        }
    }

    /// Apply environment overrides for account settings
    fn apply_account_env_overrides(account_settings: &mut AccountSettings) {
        if let Ok(rpc_url) = std::env::var("RPC_URL") {
            account_settings.rpc_url = rpc_url;
        }
        if let Ok(bundler_url) = std::env::var("BUNDLER_URL") {
            account_settings.bundler_url = bundler_url;
        }
        if let Ok(chain_name) = std::env::var("CHAIN_NAME") {
            account_settings.chain_name = chain_name;
        }

        let paymaster_url = std::env::var("PAYMASTER_URL").ok();
        let paymaster_address = std::env::var("PAYMASTER_ADDRESS").ok();
        if let Some(paymaster) = account_settings.paymaster.as_mut() {
            if let Some(url) = paymaster_url {
                paymaster.paymaster_url = url;
            }
            if let Some(address) = paymaster_address {
                paymaster.paymaster_address = address;
            }
        } else if let (Some(paymaster_url), Some(paymaster_address)) =
            (paymaster_url, paymaster_address)
        {
            // A paymaster is only enabled from the environment when fully specified
            account_settings.paymaster = Some(PaymasterSettings {
                is_sponsored: true,
                paymaster_address,
                paymaster_url,
            });
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Check endpoint URLs, addresses and numeric bounds
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        Self::validate_url("account.rpc_url", &self.account.rpc_url)?;
        Self::validate_url("account.bundler_url", &self.account.bundler_url)?;

        if self.account.threshold == 0 {
            return Err(SettingsError::new("account.threshold", "must be at least 1"));
        }
        for owner in &self.account.owners {
            Self::validate_address("account.owners", owner)?;
        }

        if let Some(paymaster) = &self.account.paymaster {
            Self::validate_url("account.paymaster.paymaster_url", &paymaster.paymaster_url)?;
            Self::validate_address(
                "account.paymaster.paymaster_address",
                &paymaster.paymaster_address,
            )?;
        }

        Self::validate_address("transfer.usdc_token_address", &self.transfer.usdc_token_address)?;

        if self.passkeys.challenge_length < MIN_CHALLENGE_LENGTH {
            return Err(SettingsError::new(
                "passkeys.challenge_length",
                format!("must be at least {MIN_CHALLENGE_LENGTH} bytes"),
            ));
        }
        if self.passkeys.storage_key.is_empty() {
            return Err(SettingsError::new("passkeys.storage_key", "must not be empty"));
        }
        if self.passkeys.user_verification != REQUIRED_USER_VERIFICATION {
            return Err(SettingsError::new(
                "passkeys.user_verification",
                format!("must be '{REQUIRED_USER_VERIFICATION}'"),
            ));
        }
        if !ATTESTATION_PREFERENCES.contains(&self.passkeys.attestation.as_str()) {
            return Err(SettingsError::new(
                "passkeys.attestation",
                format!("must be one of {}", ATTESTATION_PREFERENCES.join(", ")),
            ));
        }

        Ok(())
    }

    fn validate_url(field: &'static str, value: &str) -> Result<(), SettingsError> {
        let url = Url::parse(value).map_err(|e| SettingsError::new(field, e.to_string()))?;
        if matches!(url.scheme(), "http" | "https") {
            Ok(())
        } else {
            Err(SettingsError::new(field, "must be an http(s) URL"))
        }
    }

    fn validate_address(field: &'static str, value: &str) -> Result<(), SettingsError> {
        check_address(value)
            .map_err(|_| SettingsError::new(field, format!("'{value}' is not an address")))
    }
}
