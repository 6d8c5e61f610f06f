use crate::error::EdgeError;
use crate::models::League;
use crate::utils::edge_analysis::RankingPolicy;
use crate::utils::probability::ModelParams;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com/v4/sports";
pub const DEFAULT_REGION: &str = "us";
pub const DEFAULT_BOOKMAKERS: &str = "draftkings,fanduel";
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;
const MIN_TIMEOUT_SECS: u64 = 20;
const MAX_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_DAYS_AHEAD: u32 = 2;
pub const MAX_DAYS_AHEAD: u32 = 7;

/// The bookmakers whose moneyline prices are requested, by provider key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmakerSet(Vec<String>);

impl BookmakerSet {
    /// Parse a comma separated list such as `draftkings,fanduel`
    pub fn parse(list: &str) -> Self {
        let mut keys: Vec<String> = Vec::new();
        for key in list.split(',') {
            let key = key.trim().to_lowercase();
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self(keys)
    }

    /// Like `parse`, but a list naming no bookmaker is a config error
    pub fn parse_non_empty(list: &str, source: &str) -> Result<Self, EdgeError> {
        let set = Self::parse(list);
        if set.is_empty() {
            return Err(EdgeError::Config(format!("{source} names no bookmakers")));
        }
        Ok(set)
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An empty set places no restriction on bookmakers
    pub fn contains(&self, key: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|k| k.eq_ignore_ascii_case(key))
    }

    /// Value for the `bookmakers` query parameter
    pub fn query_value(&self) -> String {
        self.0.join(",")
    }
}

impl Default for BookmakerSet {
    fn default() -> Self {
        Self::parse(DEFAULT_BOOKMAKERS)
    }
}

/// Fixed request options sent with every odds call
#[derive(Debug, Clone)]
pub struct OddsApiSettings {
    pub base_url: String,
    pub region: String,
    pub bookmakers: BookmakerSet,
    pub timeout: Duration,
}

impl Default for OddsApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            region: DEFAULT_REGION.to_string(),
            bookmakers: BookmakerSet::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Process-wide settings, read once at startup
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Fallback credential when the operator has not pasted one
    pub default_api_key: Option<String>,
    pub odds_api: OddsApiSettings,
}

impl AppConfig {
    /// Read the `ODDS_*` environment variables. The binary loads `.env` first.
    pub fn from_env() -> Result<Self, EdgeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, EdgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let timeout_secs = match non_empty("ODDS_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                EdgeError::Config(format!("ODDS_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bookmakers = match non_empty("ODDS_BOOKMAKERS") {
            Some(raw) => BookmakerSet::parse_non_empty(&raw, "ODDS_BOOKMAKERS")?,
            None => BookmakerSet::default(),
        };

        Ok(Self {
            default_api_key: non_empty("ODDS_API_KEY").map(|key| key.trim().to_string()),
            odds_api: OddsApiSettings {
                base_url: non_empty("ODDS_API_BASE_URL")
                    .map(|url| url.trim().trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                region: non_empty("ODDS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                bookmakers,
                timeout: Duration::from_secs(
                    timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
                ),
            },
        })
    }
}

/// Options for one operator-triggered run
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub leagues: Vec<&'static League>,
    pub model: ModelParams,
    pub policy: RankingPolicy,
    /// Calendar days after today whose midnight closes the kickoff window
    pub days_ahead: u32,
    /// Lines from other bookmakers are ignored
    pub bookmakers: BookmakerSet,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            leagues: crate::models::LEAGUES.iter().collect(),
            model: ModelParams::default(),
            policy: RankingPolicy::default(),
            days_ahead: DEFAULT_DAYS_AHEAD,
            bookmakers: BookmakerSet::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.default_api_key, None);
        assert_eq!(config.odds_api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.odds_api.region, "us");
        assert_eq!(config.odds_api.bookmakers.query_value(), "draftkings,fanduel");
        assert_eq!(config.odds_api.timeout, Duration::from_secs(25));
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ODDS_API_KEY", " abc123 "),
            ("ODDS_API_BASE_URL", "http://127.0.0.1:9000/v4/sports/"),
            ("ODDS_BOOKMAKERS", "DraftKings, betmgm,draftkings"),
            ("ODDS_TIMEOUT_SECS", "90"),
        ]))
        .unwrap();
        assert_eq!(config.default_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.odds_api.base_url, "http://127.0.0.1:9000/v4/sports");
        assert_eq!(config.odds_api.bookmakers.keys(), ["draftkings", "betmgm"]);
        assert_eq!(config.odds_api.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_bad_timeout_is_a_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("ODDS_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, EdgeError::Config(_)));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = AppConfig::from_lookup(lookup(&[("ODDS_API_KEY", "   ")])).unwrap();
        assert_eq!(config.default_api_key, None);
    }

    #[test]
    fn test_bookmaker_set_membership() {
        let set = BookmakerSet::parse("draftkings");
        assert!(set.contains("DraftKings"));
        assert!(!set.contains("fanduel"));
        assert!(BookmakerSet::parse(" , ").contains("anything"));
    }

    #[test]
    fn test_empty_bookmaker_list_is_rejected() {
        assert!(matches!(
            BookmakerSet::parse_non_empty(" , ", "--bookmakers"),
            Err(EdgeError::Config(msg)) if msg.contains("--bookmakers")
        ));
        assert!(BookmakerSet::parse_non_empty("", "--bookmakers").is_err());
        assert_eq!(
            BookmakerSet::parse_non_empty("betmgm", "--bookmakers")
                .unwrap()
                .keys(),
            ["betmgm"]
        );

        let err = AppConfig::from_lookup(lookup(&[("ODDS_BOOKMAKERS", ",")])).unwrap_err();
        assert!(matches!(err, EdgeError::Config(_)));
    }
}
