//! Final configuration resolution.
//!
//! Every configurable value is resolved exactly once, at startup, from
//! three layered sources: an explicit command-line value wins, then a value
//! from the configuration file, then the built-in default. The result is an
//! immutable [`Settings`] snapshot passed by reference to everything else;
//! no component reads configuration from anywhere but the snapshot.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use super::types::FileConfig;

const DEFAULT_HOST: &str = "http://localhost";
const DEFAULT_PORT: u16 = 15672;
const DEFAULT_VHOST: &str = "%2F"; // the URL-encoded root vhost
const DEFAULT_USERNAME: &str = "guest";
const DEFAULT_PASSWORD: &str = "guest";
const DEFAULT_MAX_WORKERS: usize = 1;

/// Header fields tried, in order, when auto-detecting a source queue.
fn default_source_queue_fields() -> Vec<String> {
    vec![
        "NServiceBus.FailedQ".to_string(),
        "NServiceBus.OriginatingAddress".to_string(),
    ]
}

/// Runtime, diagnostic, audit and error headers stripped before a message
/// is republished.
fn default_remove_fields() -> Vec<String> {
    [
        // Runtime headers
        "NServiceBus.FLRetries",
        "NServiceBus.Retries",
        // Diagnostic headers
        "$.diagnostics.originating.hostid",
        "$.diagnostics.hostdisplayname",
        "$.diagnostics.hostid",
        "$.diagnostics.license.expired",
        // Audit headers
        "NServiceBus.Version",
        "NServiceBus.TimeSent",
        "NServiceBus.EnclosedMessageTypes",
        "NServiceBus.ProcessingStarted",
        "NServiceBus.ProcessingEnded",
        "NServiceBus.OriginatingAddress",
        "NServiceBus.ProcessingEndpoint",
        "NServiceBus.ProcessingMachine",
        // Error headers
        "NServiceBus.FailedQ",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

/// What the batch publisher does when a single item fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop taking new work after the first failure (legacy behaviour).
    FailFast,

    /// Attempt every item and aggregate the failures in the final report.
    KeepGoing,
}

/// Values supplied explicitly on the command line. `None` (or `false` for a
/// flag) means "not supplied" and defers to the file and then the default.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub vhost: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub simulate: bool,
    pub verbose: bool,
    pub silent: bool,
    pub keep_going: bool,
    pub max_workers: Option<usize>,
    pub source_queue_fields: Option<Vec<String>>,
    pub remove_fields: Option<Vec<String>>,
}

/// The immutable configuration snapshot read by every component.
#[derive(Clone, Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub vhost: String,
    pub username: String,
    pub password: String,
    pub simulate: bool,
    pub verbose: bool,
    pub silent: bool,
    pub max_workers: usize,
    pub failure_policy: FailurePolicy,
    pub source_queue_fields: Vec<String>,
    pub remove_fields: Vec<String>,
}

impl Settings {
    /// Basic-auth header value derived from the resolved credentials.
    pub fn auth_header(&self) -> String {
        let credentials = BASE64.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", credentials)
    }
}

/// Resolves the final settings from the command line, the configuration
/// file, and the built-in defaults, independently for every field.
pub fn resolve(overrides: Overrides, file: FileConfig) -> Settings {
    let failure_policy = if overrides.keep_going
        || file.general.keep_going.unwrap_or(false)
    {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::FailFast
    };

    Settings {
        host: overrides
            .host
            .or(file.broker.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: overrides.port.or(file.broker.port).unwrap_or(DEFAULT_PORT),
        vhost: overrides
            .vhost
            .or(file.broker.vhost)
            .unwrap_or_else(|| DEFAULT_VHOST.to_string()),
        username: overrides
            .username
            .or(file.broker.username)
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
        password: overrides
            .password
            .or(file.broker.password)
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        simulate: overrides.simulate || file.general.simulate.unwrap_or(false),
        verbose: overrides.verbose || file.general.verbose.unwrap_or(false),
        silent: overrides.silent || file.general.silent.unwrap_or(false),
        max_workers: overrides
            .max_workers
            .or(file.general.max_workers)
            .unwrap_or(DEFAULT_MAX_WORKERS),
        failure_policy,
        source_queue_fields: overrides
            .source_queue_fields
            .or(file.messages.source_queue_fields)
            .unwrap_or_else(default_source_queue_fields),
        remove_fields: overrides
            .remove_fields
            .or(file.messages.remove_fields)
            .unwrap_or_else(default_remove_fields),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_file_config_from_string;

    #[test]
    fn test_defaults_apply_when_nothing_is_supplied() {
        let settings = resolve(Overrides::default(), FileConfig::default());

        assert_eq!(settings.host, "http://localhost");
        assert_eq!(settings.port, 15672);
        assert_eq!(settings.vhost, "%2F");
        assert_eq!(settings.username, "guest");
        assert_eq!(settings.password, "guest");
        assert_eq!(settings.max_workers, 1);
        assert!(!settings.simulate);
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
        assert_eq!(settings.source_queue_fields[0], "NServiceBus.FailedQ");
        assert!(
            settings
                .remove_fields
                .contains(&"NServiceBus.Retries".to_string())
        );
    }

    #[test]
    fn test_command_line_beats_config_file() {
        let file = load_file_config_from_string(
            "[broker]\nhost = \"http://from-file\"\nport = 1000\n",
        )
        .unwrap();
        let overrides = Overrides {
            host: Some("http://from-cli".to_string()),
            ..Overrides::default()
        };

        let settings = resolve(overrides, file);

        // The host comes from the command line, the port from the file:
        // each field resolves independently.
        assert_eq!(settings.host, "http://from-cli");
        assert_eq!(settings.port, 1000);
    }

    #[test]
    fn test_config_file_beats_defaults() {
        let file = load_file_config_from_string(
            "[broker]\nusername = \"operator\"\n\n[general]\nmax_workers = 8\n",
        )
        .unwrap();

        let settings = resolve(Overrides::default(), file);

        assert_eq!(settings.username, "operator");
        assert_eq!(settings.password, "guest");
        assert_eq!(settings.max_workers, 8);
    }

    #[test]
    fn test_message_shape_lists_resolve_from_file() {
        let file = load_file_config_from_string(
            "[messages]\nsource_queue_fields = [\"SourceQueue\"]\nremove_fields = [\"X\"]\n",
        )
        .unwrap();

        let settings = resolve(Overrides::default(), file);

        assert_eq!(settings.source_queue_fields, vec!["SourceQueue"]);
        assert_eq!(settings.remove_fields, vec!["X"]);
    }

    #[test]
    fn test_keep_going_flag_selects_policy() {
        let overrides = Overrides {
            keep_going: true,
            ..Overrides::default()
        };
        let settings = resolve(overrides, FileConfig::default());
        assert_eq!(settings.failure_policy, FailurePolicy::KeepGoing);

        let file = load_file_config_from_string("[general]\nkeep_going = true\n").unwrap();
        let settings = resolve(Overrides::default(), file);
        assert_eq!(settings.failure_policy, FailurePolicy::KeepGoing);
    }

    #[test]
    fn test_auth_header_is_derived_from_credentials() {
        let settings = resolve(Overrides::default(), FileConfig::default());
        // guest:guest, the broker's built-in account
        assert_eq!(settings.auth_header(), "Basic Z3Vlc3Q6Z3Vlc3Q=");
    }
}
