//! Configuration Type Definitions
//!
//! Structures deserialised from the optional TOML configuration file.
//! Every field is optional: a value that is absent here falls through to
//! the command line and then to the built-in default during resolution.
//!
//! # Example Structure
//!
//! ```toml
//! [general]
//! simulate = false
//! max_workers = 4
//!
//! [broker]
//! host = "http://rabbit.internal"
//! port = 15672
//! username = "operator"
//! password = "secret"
//!
//! [messages]
//! source_queue_fields = ["NServiceBus.FailedQ"]
//! remove_fields = ["NServiceBus.Retries", "NServiceBus.FLRetries"]
//! ```

use serde::Deserialize;

/// Root of the configuration file.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct FileConfig {
    /// General behaviour: simulate, verbosity, worker count
    #[serde(default)]
    pub general: GeneralSection,

    /// Broker connection values
    #[serde(default)]
    pub broker: BrokerSection,

    /// Message shape: header candidates and scrub list
    #[serde(default)]
    pub messages: MessagesSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GeneralSection {
    /// Report what would be published without calling the broker
    pub simulate: Option<bool>,

    /// Enable verbose output
    pub verbose: Option<bool>,

    /// Suppress everything except errors
    pub silent: Option<bool>,

    /// Maximum number of concurrent publish workers for batch operations
    pub max_workers: Option<usize>,

    /// Attempt every file in a batch instead of stopping at the first failure
    pub keep_going: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BrokerSection {
    /// Broker host URL, scheme included (e.g. "http://localhost")
    pub host: Option<String>,

    /// Management API port
    pub port: Option<u16>,

    /// Virtual host, already URL-encoded (the root vhost is "%2F")
    pub vhost: Option<String>,

    pub username: Option<String>,

    pub password: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct MessagesSection {
    /// Header fields tried, in order, to auto-detect a message's source queue
    pub source_queue_fields: Option<Vec<String>>,

    /// Header fields scrubbed from a message before it is republished
    pub remove_fields: Option<Vec<String>>,
}
