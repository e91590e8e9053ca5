use crate::constants::{LOOP_DETECTION_MAX_UNIQUE_TOOLS, LOOP_DETECTION_MIN_REPEATS, LOOP_DETECTION_WINDOW};
use crate::state::ToolInvocationRecord;
use std::collections::{HashMap, HashSet};

/// Within the last [`LOOP_DETECTION_WINDOW`] tool invocations: if there are
/// at most [`LOOP_DETECTION_MAX_UNIQUE_TOOLS`] distinct tool names and at
/// least [`LOOP_DETECTION_MIN_REPEATS`] of them share a result fingerprint,
/// the agent is spinning (spec §4.J).
pub fn loop_detected(history: &[ToolInvocationRecord]) -> bool {
    if history.len() < LOOP_DETECTION_WINDOW {
        return false;
    }
    let window = &history[history.len() - LOOP_DETECTION_WINDOW..];

    let unique_names: HashSet<&str> = window.iter().map(|r| r.name.as_str()).collect();
    if unique_names.len() > LOOP_DETECTION_MAX_UNIQUE_TOOLS {
        return false;
    }

    let mut fingerprint_counts: HashMap<&str, usize> = HashMap::new();
    for record in window {
        *fingerprint_counts.entry(record.fingerprint.as_str()).or_insert(0) += 1;
    }
    fingerprint_counts.values().any(|&count| count >= LOOP_DETECTION_MIN_REPEATS)
}
