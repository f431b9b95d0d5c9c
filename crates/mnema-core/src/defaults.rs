//! Default values and environment variable names shared across crates.

// ─── Provider endpoints ────────────────────────────────────────────────────

/// Base URL for the Gemini generative language API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Base URL for the Tavily search API.
pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Base URL for Cloudflare Workers AI (transcription).
pub const WORKERS_AI_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Base URL for the public Wikipedia APIs (study widget proxy).
pub const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";

// ─── Models ────────────────────────────────────────────────────────────────

/// Primary (higher-quality) generation model for study-material synthesis.
pub const PRIMARY_GEN_MODEL: &str = "gemini-1.5-pro";

/// First fallback model when the primary is quota-limited.
pub const FALLBACK_GEN_MODEL: &str = "gemini-1.5-flash";

/// Second, lighter fallback model.
pub const LIGHT_FALLBACK_GEN_MODEL: &str = "gemini-1.5-flash-8b";

/// Fast model for short auxiliary calls (topic extraction, OCR, quizzes).
pub const FAST_GEN_MODEL: &str = "gemini-1.5-flash";

// ─── Generation parameters ─────────────────────────────────────────────────

/// Temperature for study-material and quiz synthesis.
pub const SYNTHESIS_TEMPERATURE: f32 = 0.7;

/// Output token budget for study-material and quiz synthesis.
pub const SYNTHESIS_MAX_OUTPUT_TOKENS: u32 = 4000;

/// Temperature for research-topic extraction (low randomness).
pub const TOPIC_TEMPERATURE: f32 = 0.3;

/// Output token budget for research-topic extraction.
pub const TOPIC_MAX_OUTPUT_TOKENS: u32 = 150;

/// Temperature for image text extraction (near-deterministic).
pub const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Output token budget for image text extraction.
pub const EXTRACTION_MAX_OUTPUT_TOKENS: u32 = 2048;

// ─── Enrichment ────────────────────────────────────────────────────────────

/// Maximum number of research topics actually searched per note.
pub const TOPIC_LIMIT: usize = 2;

/// Raw results requested per search (only the synthesized answer is kept).
pub const SEARCH_MAX_RESULTS: u32 = 3;

// ─── Timeouts ──────────────────────────────────────────────────────────────

/// Per-request timeout for outbound provider calls (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Upper bound on a single pipeline stage (seconds).
pub const STAGE_TIMEOUT_SECS: u64 = 180;

/// Upper bound on a whole note-processing run (seconds). A run that
/// exceeds this must still leave the note in a terminal status.
pub const PIPELINE_TIMEOUT_SECS: u64 = 420;

// ─── Quiz generation ───────────────────────────────────────────────────────

/// Exact number of questions a generated quiz must contain.
pub const QUIZ_QUESTION_COUNT: usize = 10;

// ─── Environment variable names ────────────────────────────────────────────

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_API_KEY_SECONDARY: &str = "GEMINI_API_KEY_SECONDARY";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const ENV_TAVILY_BASE_URL: &str = "TAVILY_BASE_URL";
pub const ENV_CF_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const ENV_CF_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
pub const ENV_WORKERS_AI_BASE_URL: &str = "WORKERS_AI_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MNEMA_REQUEST_TIMEOUT_SECS";
pub const ENV_STAGE_TIMEOUT_SECS: &str = "MNEMA_STAGE_TIMEOUT_SECS";
pub const ENV_PIPELINE_TIMEOUT_SECS: &str = "MNEMA_PIPELINE_TIMEOUT_SECS";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
