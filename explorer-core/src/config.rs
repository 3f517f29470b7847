//! Application configuration from environment variables.
//!
//! Everything is resolved once by the application shell and handed to the
//! components that need it.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::Latency;
use crate::storage::FileStore;

/// Feature flag name for the meal planner.
pub const PLANNER_FLAG: &str = "planner";

/// Environment variable holding the feature flag string.
pub const FEATURE_FLAGS_VAR: &str = "RECIPE_EXPLORER_FEATURE_FLAGS";

/// What a flag string says about one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue {
    On,
    Off,
    /// Mentioned with a value we can't interpret.
    Ambiguous,
}

impl FlagValue {
    fn from_text(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "enabled" => FlagValue::On,
            "false" | "0" | "no" | "off" | "disabled" => FlagValue::Off,
            _ => FlagValue::Ambiguous,
        }
    }

    fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Bool(true) => FlagValue::On,
            JsonValue::Bool(false) => FlagValue::Off,
            JsonValue::Number(n) => match n.as_f64() {
                Some(n) if n == 0.0 => FlagValue::Off,
                Some(_) => FlagValue::On,
                None => FlagValue::Ambiguous,
            },
            JsonValue::String(s) => FlagValue::from_text(s),
            _ => FlagValue::Ambiguous,
        }
    }
}

/// Parsed feature flags.
///
/// Accepted forms:
/// - a JSON object: `{"planner": false}`
/// - comma/whitespace-separated tokens: `planner=off, search`
///
/// A bare token turns a feature on; `!name`, `-name` and `no-name` turn it off.
/// Features that are absent or ambiguous are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    flags: HashMap<String, FlagValue>,
}

impl FeatureFlags {
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Self::default();
        }

        if raw.starts_with('{') {
            if let Ok(JsonValue::Object(object)) = serde_json::from_str::<JsonValue>(raw) {
                let flags = object
                    .iter()
                    .map(|(k, v)| (normalize_name(k), FlagValue::from_json(v)))
                    .collect();
                return Self { flags };
            }
            tracing::debug!(raw, "feature flags look like JSON but don't parse, reading as tokens");
        }

        let mut flags = HashMap::new();
        for token in raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let (name, value) = match token.split_once('=') {
                Some((name, value)) => (name, FlagValue::from_text(value)),
                None => parse_bare_token(token),
            };
            let name = normalize_name(name);
            if !name.is_empty() {
                flags.insert(name, value);
            }
        }
        Self { flags }
    }

    /// Read flags from `RECIPE_EXPLORER_FEATURE_FLAGS`.
    pub fn from_env() -> Self {
        Self::parse(env::var(FEATURE_FLAGS_VAR).ok().as_deref())
    }

    pub fn value(&self, name: &str) -> Option<FlagValue> {
        self.flags.get(&normalize_name(name)).copied()
    }

    /// Whether a feature is enabled. Only an explicit "off" disables it.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.value(name) != Some(FlagValue::Off)
    }

    pub fn planner_enabled(&self) -> bool {
        self.is_enabled(PLANNER_FLAG)
    }
}

fn parse_bare_token(token: &str) -> (&str, FlagValue) {
    for prefix in ["!", "-", "no-"] {
        if let Some(name) = token.strip_prefix(prefix) {
            return (name, FlagValue::Off);
        }
    }
    (token, FlagValue::On)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feature_flags: FeatureFlags,
    /// Backend base URL, empty when unset. Data is served locally either way.
    pub api_base_url: String,
    /// Directory for persisted favorites and meal plan.
    pub data_dir: PathBuf,
    pub latency: Latency,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `RECIPE_EXPLORER_FEATURE_FLAGS`: feature flag string (see [`FeatureFlags`])
    /// - `RECIPE_EXPLORER_API_BASE`: backend base URL
    /// - `RECIPE_EXPLORER_BACKEND_URL`: fallback for the base URL
    /// - `RECIPE_EXPLORER_DATA_DIR`: storage directory (default: "~/.recipe-explorer")
    /// - `RECIPE_EXPLORER_LATENCY_MS`: simulated latency for every call
    ///   (default: 250 ms for lists, 180 ms for lookups; 0 disables)
    pub fn from_env() -> Self {
        let api_base_url = env::var("RECIPE_EXPLORER_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env::var("RECIPE_EXPLORER_BACKEND_URL").ok())
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/')
            .to_string();

        let data_dir = env::var("RECIPE_EXPLORER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| FileStore::default_dir());

        let latency = env::var("RECIPE_EXPLORER_LATENCY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(|ms| Latency {
                list: Duration::from_millis(ms),
                lookup: Duration::from_millis(ms),
            })
            .unwrap_or_default();

        Self {
            feature_flags: FeatureFlags::from_env(),
            api_base_url,
            data_dir,
            latency,
        }
    }
}
