pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::adapters::hcaptcha::DEFAULT_SITEVERIFY_ENDPOINT;
use crate::adapters::resend::DEFAULT_RESEND_ENDPOINT;
use crate::adapters::RetryPolicy;
use crate::config::file::FileConfig;
use crate::core::rate_limit::RateLimitConfig;
use crate::utils::error::{Result, SubmitError};
use crate::utils::validation::{
    check_email, validate_non_empty_string, validate_positive_number, validate_url, Validate,
};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_FROM_ADDRESS: &str = "Contact Form <onboarding@resend.dev>";

#[derive(Debug, Clone, Parser)]
#[command(name = "formgate")]
#[command(about = "Contact/RFP form submission relay")]
pub struct Cli {
    #[arg(long, help = "Path to an optional TOML settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Listen address (overrides the settings file)")]
    pub bind: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs for log collectors")]
    pub json_logs: bool,
}

/// Fully resolved runtime configuration.
///
/// Secrets come from the environment only; everything else layers defaults,
/// then the settings file, then CLI flags. Loading fails fast on a missing
/// credential, before the listener binds.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub hcaptcha_secret: String,
    pub hcaptcha_site_key: String,
    pub resend_api_key: String,
    pub contact_email: String,
    pub from_address: String,
    pub hcaptcha_endpoint: String,
    pub resend_endpoint: String,
    pub outbound_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub rate_limit: RateLimitConfig,
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| SubmitError::config(format!("{name} must be set")))
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::from_sources(cli, file)
    }

    fn from_sources(cli: &Cli, file: FileConfig) -> Result<Self> {
        let server = file.server.unwrap_or_default();
        let providers = file.providers.unwrap_or_default();
        let outbound = file.outbound.unwrap_or_default();

        let mut rate_limit = RateLimitConfig::default();
        if let Some(section) = file.rate_limit {
            if let Some(v) = section.max_requests {
                rate_limit.max_requests = v;
            }
            if let Some(v) = section.window_secs {
                rate_limit.window_secs = v;
            }
            if let Some(v) = section.cleanup_interval {
                rate_limit.cleanup_interval = v;
            }
            if let Some(v) = section.max_tracked_keys {
                rate_limit.max_tracked_keys = v;
            }
        }

        let config = Self {
            bind_addr: cli
                .bind
                .clone()
                .or(server.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            hcaptcha_secret: required_env("HCAPTCHA_SECRET")?,
            hcaptcha_site_key: required_env("HCAPTCHA_SITE_KEY")?,
            resend_api_key: required_env("RESEND_API_KEY")?,
            contact_email: required_env("CONTACT_EMAIL")?,
            from_address: providers
                .from_address
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            hcaptcha_endpoint: providers
                .hcaptcha_endpoint
                .unwrap_or_else(|| DEFAULT_SITEVERIFY_ENDPOINT.to_string()),
            resend_endpoint: providers
                .resend_endpoint
                .unwrap_or_else(|| DEFAULT_RESEND_ENDPOINT.to_string()),
            outbound_timeout_secs: outbound.timeout_secs.unwrap_or(10),
            retry_attempts: outbound.retry_attempts.unwrap_or(2),
            retry_base_delay_ms: outbound.retry_base_delay_ms.unwrap_or(250),
            rate_limit,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("HCAPTCHA_SECRET", &self.hcaptcha_secret)?;
        validate_non_empty_string("HCAPTCHA_SITE_KEY", &self.hcaptcha_site_key)?;
        validate_non_empty_string("RESEND_API_KEY", &self.resend_api_key)?;
        validate_url("providers.hcaptcha_endpoint", &self.hcaptcha_endpoint)?;
        validate_url("providers.resend_endpoint", &self.resend_endpoint)?;
        check_email("CONTACT_EMAIL", &self.contact_email)
            .map_err(|e| SubmitError::config(e.to_string()))?;
        validate_positive_number(
            "rate_limit.max_requests",
            self.rate_limit.max_requests as usize,
            1,
        )?;
        validate_positive_number("rate_limit.window_secs", self.rate_limit.window_secs as usize, 1)?;
        validate_positive_number("outbound.timeout_secs", self.outbound_timeout_secs as usize, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            bind_addr: DEFAULT_BIND.to_string(),
            hcaptcha_secret: "0xsecret".to_string(),
            hcaptcha_site_key: "site-key".to_string(),
            resend_api_key: "re_key".to_string(),
            contact_email: "owner@example.com".to_string(),
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            hcaptcha_endpoint: DEFAULT_SITEVERIFY_ENDPOINT.to_string(),
            resend_endpoint: DEFAULT_RESEND_ENDPOINT.to_string(),
            outbound_timeout_secs: 10,
            retry_attempts: 2,
            retry_base_delay_ms: 250,
            rate_limit: RateLimitConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let mut config = valid_config();
        config.hcaptcha_endpoint = "not-a-url".to_string();
        assert!(matches!(
            config.validate(),
            Err(SubmitError::Config { .. })
        ));
    }

    #[test]
    fn test_bad_contact_email_rejected() {
        let mut config = valid_config();
        config.contact_email = "not-an-email".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut config = valid_config();
        config.rate_limit.max_requests = 0;
        assert!(config.validate().is_err());
    }

    // Credential tests mutate process-global environment variables, so they
    // serialize on this lock to stay independent of test thread count.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_load_fails_fast_then_succeeds_with_credentials() {
        let _guard = ENV_LOCK.lock().unwrap();
        let cli = Cli {
            config: None,
            bind: None,
            verbose: false,
            json_logs: false,
        };

        for var in [
            "HCAPTCHA_SECRET",
            "HCAPTCHA_SITE_KEY",
            "RESEND_API_KEY",
            "CONTACT_EMAIL",
        ] {
            std::env::remove_var(var);
        }
        assert!(matches!(
            AppConfig::load(&cli),
            Err(SubmitError::Config { .. })
        ));

        std::env::set_var("HCAPTCHA_SECRET", "0xsecret");
        std::env::set_var("HCAPTCHA_SITE_KEY", "site-key");
        std::env::set_var("RESEND_API_KEY", "re_key");
        std::env::set_var("CONTACT_EMAIL", "owner@example.com");

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);

        for var in [
            "HCAPTCHA_SECRET",
            "HCAPTCHA_SITE_KEY",
            "RESEND_API_KEY",
            "CONTACT_EMAIL",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_cli_bind_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let cli = Cli {
            config: None,
            bind: Some("127.0.0.1:9999".to_string()),
            verbose: false,
            json_logs: false,
        };
        let file = FileConfig::from_toml_str("[server]\nbind = \"0.0.0.0:3000\"\n").unwrap();

        // from_sources reads the environment; make the secrets present
        std::env::set_var("HCAPTCHA_SECRET", "0xsecret");
        std::env::set_var("HCAPTCHA_SITE_KEY", "site-key");
        std::env::set_var("RESEND_API_KEY", "re_key");
        std::env::set_var("CONTACT_EMAIL", "owner@example.com");

        let config = AppConfig::from_sources(&cli, file).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9999");

        for var in [
            "HCAPTCHA_SECRET",
            "HCAPTCHA_SITE_KEY",
            "RESEND_API_KEY",
            "CONTACT_EMAIL",
        ] {
            std::env::remove_var(var);
        }
    }
}
