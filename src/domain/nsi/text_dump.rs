use serde::Serialize;

/// Renders a protocol document as indented JSON for logs and query summaries.
pub fn to_text<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable document: {}>", e))
}

/// Logs a protocol document at debug level under a banner.
pub fn show_message<T: Serialize>(header: &str, value: &T) {
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("**** {} ****\n{}\n", header, to_text(value));
    }
}
