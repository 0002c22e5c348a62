// Defaults shared by the CLI, the orchestrator and the panel.
// Environment overrides (INSIGHTHUB_MODEL, INSIGHTHUB_BASE_URL) are bound on
// the command-line flags, so they rank above the settings file.

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.95;

pub const GREETING: &str = "Hello! I'm your knowledge base assistant. Ask me anything about your notes on Salesforce, Machine Learning, SQL, or any other subject in this repository.";

/// Returned when the model answers without any text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "I'm sorry, I couldn't process that request.";

/// Returned when the remote call fails for any reason.
pub const ERROR_FALLBACK: &str =
    "An error occurred while communicating with the AI. Please ensure your API key is valid.";

pub const PANEL_TITLE: &str = "AI Knowledge Explorer";
pub const INPUT_PLACEHOLDER: &str = "Ask about your subjects...";
pub const PANEL_FOOTER: &str = "AI-generated summaries may vary. Please verify key technical details.";

pub const LOG_FILE_NAME: &str = "insighthub.log";
