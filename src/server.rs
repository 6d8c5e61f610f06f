use crate::api::odds_api::{ApiUsage, OddsApiClient};
use crate::config::{AppConfig, ScanConfig, DEFAULT_DAYS_AHEAD, MAX_DAYS_AHEAD};
use crate::error::EdgeError;
use crate::models::{find_league, League, LEAGUES};
use crate::scan_edges;
use crate::utils::edge_analysis::RankingPolicy;
use crate::utils::presenter::{present, DisplayFilter, TableRow, DEFAULT_PLAY_THRESHOLD};
use crate::utils::probability::ModelParams;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{error, info};

const HOME_ADVANTAGE_RANGE: (f64, f64) = (0.0, 0.20);
const ROSTER_DELTA_RANGE: (f64, f64) = (-0.30, 0.30);
const PLAY_THRESHOLD_RANGE: (f64, f64) = (0.0, 20.0);
const MIN_EDGE_RANGE: (f64, f64) = (-100.0, 100.0);

// Custom filters for formatting
mod filters {
    pub fn format_percent(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.1}%", value))
    }

    pub fn format_edge(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:+.2}%", value))
    }

    pub fn format_odds(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.2}", value))
    }
}

/// Everything the operator can set on the panel
#[derive(Debug, Clone, PartialEq)]
pub struct RunForm {
    pub leagues: Vec<&'static League>,
    pub model: ModelParams,
    pub policy: RankingPolicy,
    pub days_ahead: u32,
    pub filter: DisplayFilter,
    pub api_key: Option<String>,
}

impl Default for RunForm {
    fn default() -> Self {
        Self {
            leagues: LEAGUES.iter().collect(),
            model: ModelParams::default(),
            policy: RankingPolicy::default(),
            days_ahead: DEFAULT_DAYS_AHEAD,
            filter: DisplayFilter::default(),
            api_key: None,
        }
    }
}

impl RunForm {
    /// Read urlencoded form pairs. `league` may repeat; unknown keys are ignored.
    /// Numbers outside the slider ranges are clamped, unparseable ones fall back to defaults.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let defaults = Self::default();
        let value = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.trim())
        };
        let number = |name: &str, default: f64, (low, high): (f64, f64)| {
            value(name)
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|n| n.is_finite())
                .map(|n| n.clamp(low, high))
                .unwrap_or(default)
        };

        let leagues = pairs
            .iter()
            .filter(|(key, _)| key == "league")
            .filter_map(|(_, league_key)| find_league(league_key.trim()))
            .collect();

        Self {
            leagues,
            model: ModelParams {
                home_advantage: number(
                    "home_advantage",
                    defaults.model.home_advantage,
                    HOME_ADVANTAGE_RANGE,
                ),
                roster_delta: number(
                    "roster_delta",
                    defaults.model.roster_delta,
                    ROSTER_DELTA_RANGE,
                ),
            },
            policy: value("policy")
                .and_then(RankingPolicy::parse)
                .unwrap_or(defaults.policy),
            days_ahead: value("days_ahead")
                .and_then(|raw| raw.parse::<u32>().ok())
                .map(|days| days.clamp(1, MAX_DAYS_AHEAD))
                .unwrap_or(defaults.days_ahead),
            filter: DisplayFilter {
                search: value("search").unwrap_or_default().to_string(),
                min_edge: value("min_edge")
                    .and_then(|raw| raw.parse::<f64>().ok())
                    .filter(|n| n.is_finite())
                    .map(|n| n.clamp(MIN_EDGE_RANGE.0, MIN_EDGE_RANGE.1)),
                positive_only: value("positive_only").is_some(),
                play_threshold: number(
                    "play_threshold",
                    DEFAULT_PLAY_THRESHOLD,
                    PLAY_THRESHOLD_RANGE,
                ),
            },
            api_key: value("api_key")
                .filter(|key| !key.is_empty())
                .map(str::to_string),
        }
    }

    fn scan_config(&self, config: &AppConfig) -> ScanConfig {
        ScanConfig {
            leagues: self.leagues.clone(),
            model: self.model,
            policy: self.policy,
            days_ahead: self.days_ahead,
            bookmakers: config.odds_api.bookmakers.clone(),
        }
    }
}

/// Shared state: settings plus the credential pasted during this session
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    session_key: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            session_key: Arc::new(RwLock::new(None)),
        }
    }

    /// Submitted key wins and is remembered, then the session key, then the environment
    async fn resolve_key(&self, submitted: Option<String>) -> Option<String> {
        if let Some(key) = submitted {
            *self.session_key.write().await = Some(key.clone());
            return Some(key);
        }
        if let Some(key) = self.session_key.read().await.clone() {
            return Some(key);
        }
        self.config.default_api_key.clone()
    }

    async fn has_key(&self) -> bool {
        self.session_key.read().await.is_some() || self.config.default_api_key.is_some()
    }
}

struct LeagueOption {
    key: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    league_options: Vec<LeagueOption>,
    home_advantage: f64,
    roster_delta: f64,
    play_threshold: f64,
    min_edge: String,
    positive_only: bool,
    days_ahead: u32,
    max_days_ahead: u32,
    best_only: bool,
    search: String,
    has_key: bool,
    error: String,
    message: String,
    has_results: bool,
    show_draw_column: bool,
    rows: Vec<TableRow>,
    usage: String,
}

impl IndexTemplate {
    fn new(form: &RunForm, has_key: bool) -> Self {
        Self {
            league_options: LEAGUES
                .iter()
                .map(|league| LeagueOption {
                    key: league.key,
                    label: league.label,
                    selected: form.leagues.iter().any(|l| l.key == league.key),
                })
                .collect(),
            home_advantage: form.model.home_advantage,
            roster_delta: form.model.roster_delta,
            play_threshold: form.filter.play_threshold,
            min_edge: form
                .filter
                .min_edge
                .map(|edge| edge.to_string())
                .unwrap_or_default(),
            positive_only: form.filter.positive_only,
            days_ahead: form.days_ahead,
            max_days_ahead: MAX_DAYS_AHEAD,
            best_only: form.policy == RankingPolicy::BestOnly,
            search: form.filter.search.clone(),
            has_key,
            error: String::new(),
            message: "Pick leagues and sliders, then press Run Model to fetch moneyline odds and compute edges.".to_string(),
            has_results: false,
            show_draw_column: false,
            rows: Vec::new(),
            usage: String::new(),
        }
    }
}

fn usage_text(usage: Option<ApiUsage>) -> String {
    match usage {
        Some(ApiUsage {
            remaining: Some(remaining),
            used,
        }) => match used {
            Some(used) => format!("API requests remaining: {} (used: {})", remaining, used),
            None => format!("API requests remaining: {}", remaining),
        },
        _ => String::new(),
    }
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

async fn index(State(state): State<AppState>) -> impl IntoResponse {
    HtmlTemplate(IndexTemplate::new(&RunForm::default(), state.has_key().await))
}

async fn run(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    let form = RunForm::from_pairs(&pairs);
    let api_key = state.resolve_key(form.api_key.clone()).await;
    let mut page = IndexTemplate::new(&form, state.has_key().await);

    let client = match api_key
        .ok_or(EdgeError::MissingCredential)
        .and_then(|key| OddsApiClient::new(key, state.config.odds_api.clone()))
    {
        Ok(client) => client,
        Err(e) => {
            page.error = e.to_string();
            page.message = String::new();
            return HtmlTemplate(page);
        }
    };

    info!(
        "Run: {} leagues, policy {}, home advantage {:.2}, roster delta {:+.2}",
        form.leagues.len(),
        form.policy.as_str(),
        form.model.home_advantage,
        form.model.roster_delta
    );

    match scan_edges(&client, &form.scan_config(&state.config), Utc::now()).await {
        Ok(report) => {
            let presentation = present(&report.records, &form.filter);
            page.message = presentation.message;
            page.has_results = !presentation.rows.is_empty();
            page.show_draw_column = presentation.show_draw_column;
            page.rows = presentation.rows;
            page.usage = usage_text(report.usage);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            page.error = e.to_string();
            page.message = String::new();
        }
    }

    HtmlTemplate(page)
}

/// Build the panel router. `static_dir` holds the stylesheet.
pub fn router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .nest_service("/static", ServeDir::new(static_dir))
        .route("/", get(index))
        .route("/run", post(run))
        .with_state(state)
}
