use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_LANG_ID: u32 = 29;
const DEFAULT_TIMEZONE: &str = "America/Bogota";
const DEFAULT_USER_COUNTRY_ID: u32 = 170;
const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// What to do when one round request fails after discovery succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundFailurePolicy {
    /// Propagate the first failure; rounds already fetched are dropped.
    #[default]
    Abort,
    /// Record the failure and keep going with the remaining rounds.
    KeepPartial,
}

#[derive(Debug, Clone)]
pub struct Scores365Config {
    pub lang_id: u32,
    pub timezone: String,
    pub user_country_id: u32,
    pub request_delay: Duration,
    pub on_round_failure: RoundFailurePolicy,
    pub http_timeout: Duration,
}

impl Default for Scores365Config {
    fn default() -> Self {
        Self {
            lang_id: DEFAULT_LANG_ID,
            timezone: DEFAULT_TIMEZONE.to_string(),
            user_country_id: DEFAULT_USER_COUNTRY_ID,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            on_round_failure: RoundFailurePolicy::Abort,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Scores365Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable or out-of-range
    /// values fall back to the defaults; delay and timeout are clamped.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let lang_id = parse_var::<u32>(&var, "SCORES365_LANG_ID").unwrap_or(DEFAULT_LANG_ID);
        let timezone = var("SCORES365_TIMEZONE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let user_country_id = parse_var::<u32>(&var, "SCORES365_USER_COUNTRY_ID")
            .unwrap_or(DEFAULT_USER_COUNTRY_ID);
        let delay_ms = parse_var::<u64>(&var, "SCORES365_REQUEST_DELAY_MS")
            .unwrap_or(DEFAULT_REQUEST_DELAY_MS)
            .clamp(0, 10_000);
        let on_round_failure = if parse_bool(var("SCORES365_KEEP_PARTIAL"), false) {
            RoundFailurePolicy::KeepPartial
        } else {
            RoundFailurePolicy::Abort
        };
        let timeout_secs = parse_var::<u64>(&var, "HTTP_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .clamp(1, 120);

        Self {
            lang_id,
            timezone,
            user_country_id,
            request_delay: Duration::from_millis(delay_ms),
            on_round_failure,
            http_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_round_failure(mut self, policy: RoundFailurePolicy) -> Self {
        self.on_round_failure = policy;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Query parameters every 365Scores web endpoint expects.
    pub fn base_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("appTypeId", "5".to_string()),
            ("langId", self.lang_id.to_string()),
            ("timezoneName", self.timezone.clone()),
            ("userCountryId", self.user_country_id.to_string()),
        ]
    }
}

pub(crate) fn parse_var<T: FromStr>(var: impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
