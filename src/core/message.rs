//! Message-level helpers built on the document operations.

use serde_json::Value;

use super::document;
use super::error::TransferError;

/// Determines the queue a message originally came from.
///
/// Each candidate header field is tried in the configured order; the first
/// one that yields a string value wins. Header values carry the queue name
/// optionally suffixed with `@host`, so only the first `@`-segment is kept.
pub fn resolve_source_queue(message: &Value, candidates: &[String]) -> Option<String> {
    for field in candidates {
        let matches = document::find_field_values(message, field);

        if let Some(Value::String(value)) = matches.first() {
            let queue = value.split('@').next().unwrap_or(value);
            tracing::debug!("Determined the source queue to be {}", queue);
            return Some(queue.to_string());
        }
    }

    None
}

/// Picks the destination queue for a message: the explicit one when given,
/// otherwise auto-detected from the message headers.
pub fn resolve_destination(
    message: &Value,
    explicit: Option<&str>,
    candidates: &[String],
) -> Result<String, TransferError> {
    if let Some(queue) = explicit {
        return Ok(queue.to_string());
    }

    resolve_source_queue(message, candidates).ok_or_else(|| {
        TransferError::DestinationQueueUnresolved {
            tried: candidates.to_vec(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_source_queue_strips_host_suffix() {
        let message = json!({
            "properties": {
                "headers": {"SourceQueue": "orders.retry@host1"}
            }
        });
        let queue = resolve_source_queue(&message, &candidates(&["SourceQueue"]));
        assert_eq!(queue.as_deref(), Some("orders.retry"));
    }

    #[test]
    fn test_source_queue_without_host_suffix() {
        let message = json!({"headers": {"SourceQueue": "orders.retry"}});
        let queue = resolve_source_queue(&message, &candidates(&["SourceQueue"]));
        assert_eq!(queue.as_deref(), Some("orders.retry"));
    }

    #[test]
    fn test_candidates_are_tried_in_order() {
        let message = json!({
            "headers": {
                "Fallback": "second.queue",
                "Preferred": "first.queue"
            }
        });
        let queue =
            resolve_source_queue(&message, &candidates(&["Preferred", "Fallback"]));
        assert_eq!(queue.as_deref(), Some("first.queue"));
    }

    #[test]
    fn test_non_string_candidate_is_skipped() {
        let message = json!({
            "headers": {"Broken": 17, "Working": "orders@host"}
        });
        let queue =
            resolve_source_queue(&message, &candidates(&["Broken", "Working"]));
        assert_eq!(queue.as_deref(), Some("orders"));
    }

    #[test]
    fn test_explicit_destination_wins() {
        let message = json!({"headers": {"SourceQueue": "detected"}});
        let destination =
            resolve_destination(&message, Some("explicit"), &candidates(&["SourceQueue"]))
                .unwrap();
        assert_eq!(destination, "explicit");
    }

    #[test]
    fn test_unresolved_destination_reports_tried_fields() {
        let message = json!({"payload": 1});
        let tried = candidates(&["First", "Second"]);
        let error = resolve_destination(&message, None, &tried).unwrap_err();

        match error {
            TransferError::DestinationQueueUnresolved { tried } => {
                assert_eq!(tried, vec!["First", "Second"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
