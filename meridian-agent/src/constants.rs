//! Safety-limit and cadence constants named in spec §4.J, carried over from
//! the original qna graph's magic-number constants verbatim.

pub const MAX_ITERATIONS: u32 = 15;
pub const MAX_TOOLS_PER_ITERATION: usize = 5;
pub const MAX_TOOL_RETRIES: u32 = 2;

pub const MAX_CONTEXT_CHARS: usize = 100_000;
pub const TRUNCATED_TOOL_OUTPUT_CHARS: usize = 2_500;

pub const LOOP_DETECTION_WINDOW: usize = 5;
pub const LOOP_DETECTION_MAX_UNIQUE_TOOLS: usize = 2;
pub const LOOP_DETECTION_MIN_REPEATS: usize = 3;

pub const COMPLEX_HISTORY_DEPTH: usize = 12;
pub const SIMPLE_HISTORY_DEPTH: usize = 6;

pub const STREAMING_CHUNK_DELAY_MS: u64 = 10;
pub const STREAMING_FALLBACK_DELAY_MS: u64 = 20;
