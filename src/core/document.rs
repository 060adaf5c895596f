//! Generic operations over nested JSON documents.
//!
//! Broker messages are schemaless: a message is an arbitrary object whose
//! values may be scalars, nested objects, or arrays of objects. The two
//! operations here are the building blocks for destination auto-detection
//! (`find_field_values`) and header scrubbing (`remove_fields`).

use serde_json::{Map, Value};

/// Collects every value stored under `field` anywhere in the document.
///
/// The walk is depth-first, left-to-right: a matching key contributes its
/// value (without descending into it), any other object value is recursed
/// into, and object elements of arrays are recursed into as well. Scalars
/// and non-object array elements are ignored.
pub fn find_field_values(document: &Value, field: &str) -> Vec<Value> {
    let mut found = Vec::new();
    if let Value::Object(map) = document {
        collect_field_values(map, field, &mut found);
    }
    found
}

fn collect_field_values(map: &Map<String, Value>, field: &str, found: &mut Vec<Value>) {
    for (key, value) in map {
        if key == field {
            found.push(value.clone());
        } else if let Value::Object(nested) = value {
            collect_field_values(nested, field, found);
        } else if let Value::Array(items) = value {
            for item in items {
                if let Value::Object(nested) = item {
                    collect_field_values(nested, field, found);
                }
            }
        }
    }
}

/// Removes every key named in `fields` from the document.
///
/// Keys are removed at the top level and inside every nested object
/// reachable through objects. Array elements are not descended into;
/// `find_field_values` is the only operation that looks inside arrays.
/// Applying the same field list twice is a no-op the second time.
pub fn remove_fields(document: &mut Value, fields: &[String]) {
    if let Value::Object(map) = document {
        for field in fields {
            map.remove(field);
        }

        for value in map.values_mut() {
            if value.is_object() {
                remove_fields(value, fields);
            }
        }
    }
}
