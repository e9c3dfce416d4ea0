// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use serde_json::json;

/// Generate a pool of client identifiers (forwarded addresses).
pub fn generate_clients(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = (i >> 16) & 0xFF;
            let b = (i >> 8) & 0xFF;
            let c = i & 0xFF;
            format!("10.{a}.{b}.{c}")
        })
        .collect()
}

/// A well-formed submission that passes validation.
pub fn valid_submission(i: usize) -> String {
    json!({
        "subject": format!("Report #{i}"),
        "sender": format!("sender{i}@example.com"),
        "recipients": [format!("team{}@example.org", i % 7)],
        "cc": [],
        "body": "Weekly numbers attached inline."
    })
    .to_string()
}

/// A well-formed submission with bad addresses.
pub fn invalid_submission(i: usize) -> String {
    json!({
        "subject": "Hi",
        "sender": format!("spoofed-{i}"),
        "recipients": ["victim@example.org", "broken@"],
        "body": "hello"
    })
    .to_string()
}

/// Bodies that must fail before validation even runs.
pub fn generate_malformed_payloads() -> Vec<&'static str> {
    vec![
        "",
        "null",
        "[]",
        "{",
        r#"{"subject": ["array"]}"#,
        r#"{"recipients": {"to": "a@b.com"}}"#,
        r#"{"subject": "Hi", "sender": "a@b.com", "recipients": ["c@d.com"], "body": "x", "headers": {}}"#,
    ]
}

/// Generate various Content-Type values for bypass testing.
pub fn generate_content_types() -> Vec<Option<&'static str>> {
    vec![
        // Valid
        Some("application/json"),
        Some("application/json; charset=utf-8"),
        Some("APPLICATION/JSON"), // Case variation
        // Invalid - should be rejected
        Some("text/plain"),
        Some("multipart/form-data"),
        Some("application/x-www-form-urlencoded"),
        Some("application/jsonp"),
        Some("text/json"),
        None,      // Missing
        Some(""),  // Empty
        Some("   "), // Whitespace
    ]
}

/// Classify a Content-Type as valid or invalid.
pub fn is_valid_content_type(ct: Option<&str>) -> bool {
    match ct {
        Some(s) => {
            let normalized = s.split(';').next().unwrap_or("").trim().to_lowercase();
            normalized == "application/json"
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_clients() {
        let clients = generate_clients(256);
        assert_eq!(clients.len(), 256);
        let unique: std::collections::HashSet<_> = clients.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_content_type_classification() {
        assert!(is_valid_content_type(Some("application/json")));
        assert!(is_valid_content_type(Some("application/json; charset=utf-8")));
        assert!(!is_valid_content_type(Some("text/json")));
        assert!(!is_valid_content_type(None));
    }
}
