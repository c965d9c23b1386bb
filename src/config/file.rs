use crate::utils::error::{Result, SubmitError};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML settings file for everything that is not a secret.
/// Secrets stay in the environment; `${VAR}` references inside the file are
/// substituted from the environment before parsing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerSection>,
    pub providers: Option<ProvidersSection>,
    pub rate_limit: Option<RateLimitSection>,
    pub outbound: Option<OutboundSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersSection {
    pub hcaptcha_endpoint: Option<String>,
    pub resend_endpoint: Option<String>,
    pub from_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateLimitSection {
    pub max_requests: Option<u32>,
    pub window_secs: Option<u64>,
    pub cleanup_interval: Option<u64>,
    pub max_tracked_keys: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutboundSection {
    pub timeout_secs: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SubmitError::config(format!(
                "cannot read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed)
            .map_err(|e| SubmitError::config(format!("TOML parsing error: {e}")))
    }
}

/// Replaces `${VAR_NAME}` references with the environment value; unknown
/// variables are left as-is so the TOML error points at them.
fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{var_name}}}"))
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_config() {
        let toml_content = r#"
[server]
bind = "127.0.0.1:9090"

[rate_limit]
max_requests = 3
window_secs = 30

[outbound]
timeout_secs = 5
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.unwrap().bind.as_deref(), Some("127.0.0.1:9090"));
        let rl = config.rate_limit.unwrap();
        assert_eq!(rl.max_requests, Some(3));
        assert_eq!(rl.window_secs, Some(30));
        assert_eq!(config.outbound.unwrap().timeout_secs, Some(5));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FORMGATE_TEST_BIND", "0.0.0.0:3000");

        let toml_content = r#"
[server]
bind = "${FORMGATE_TEST_BIND}"
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.unwrap().bind.as_deref(), Some("0.0.0.0:3000"));

        std::env::remove_var("FORMGATE_TEST_BIND");
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = FileConfig::from_toml_str("[server\nbind = ");
        assert!(matches!(result, Err(SubmitError::Config { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[providers]\nfrom_address = \"Forms <forms@example.com>\"\n")
            .unwrap();

        let config = FileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.providers.unwrap().from_address.as_deref(),
            Some("Forms <forms@example.com>")
        );
    }
}
