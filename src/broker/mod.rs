pub mod client;

pub use client::{BrokerClient, Publish, PublishOutcome};
