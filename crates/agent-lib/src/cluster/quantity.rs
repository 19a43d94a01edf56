//! Kubernetes resource-quantity parsing
//!
//! The metrics API reports usage as quantity strings ("156340991n",
//! "12500Ki"). CPU normalizes to millicores, memory to bytes.

use super::ClusterError;

/// Binary and decimal memory suffixes; two-character suffixes first so
/// "Mi" is not misread as "M".
const MEMORY_UNITS: &[(&str, i64)] = &[
    ("Ki", 1 << 10),
    ("Mi", 1 << 20),
    ("Gi", 1 << 30),
    ("Ti", 1 << 40),
    ("Pi", 1 << 50),
    ("k", 1_000),
    ("M", 1_000_000),
    ("G", 1_000_000_000),
    ("T", 1_000_000_000_000),
];

/// Parse a CPU quantity into millicores
pub fn cpu_millis(quantity: &str) -> Result<i64, ClusterError> {
    let q = quantity.trim();

    if let Some(v) = q.strip_suffix('n') {
        return parse_int(v, quantity).map(|n| n / 1_000_000);
    }
    if let Some(v) = q.strip_suffix('u') {
        return parse_int(v, quantity).map(|n| n / 1_000);
    }
    if let Some(v) = q.strip_suffix('m') {
        return parse_int(v, quantity);
    }

    // Bare value is whole (possibly fractional) cores
    q.parse::<f64>()
        .map(|cores| (cores * 1_000.0).round() as i64)
        .map_err(|_| ClusterError::BadQuantity(quantity.to_string()))
}

/// Parse a memory quantity into bytes
pub fn memory_bytes(quantity: &str) -> Result<i64, ClusterError> {
    let q = quantity.trim();

    for (suffix, scale) in MEMORY_UNITS {
        if let Some(v) = q.strip_suffix(suffix) {
            return parse_int(v, quantity).map(|n| n * scale);
        }
    }

    parse_int(q, quantity)
}

fn parse_int(v: &str, original: &str) -> Result<i64, ClusterError> {
    v.parse::<i64>()
        .map_err(|_| ClusterError::BadQuantity(original.to_string()))
}
