use chrono::{DateTime, Utc};
use serde::Serialize;

/// Provider sport keys with this prefix settle three ways (home/draw/away)
const DRAW_ELIGIBLE_PREFIX: &str = "soccer_";

/// A competition the operator can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct League {
    pub label: &'static str,
    /// The Odds API sport key
    pub key: &'static str,
}

impl League {
    /// Leagues whose moneyline market carries a draw outcome
    pub fn is_draw_eligible(&self) -> bool {
        self.key.starts_with(DRAW_ELIGIBLE_PREFIX)
    }
}

pub static LEAGUES: &[League] = &[
    // Soccer
    League { label: "EPL", key: "soccer_epl" },
    League { label: "La Liga", key: "soccer_spain_la_liga" },
    League { label: "Serie A", key: "soccer_italy_serie_a" },
    League { label: "Bundesliga", key: "soccer_germany_bundesliga" },
    League { label: "Ligue 1", key: "soccer_france_ligue_one" },
    League { label: "UCL", key: "soccer_uefa_champs_league" },
    League { label: "UEL", key: "soccer_uefa_europa_league" },
    League { label: "UECL", key: "soccer_uefa_europa_conference_league" },
    // US majors
    League { label: "NBA", key: "basketball_nba" },
    League { label: "NFL", key: "americanfootball_nfl" },
    League { label: "NHL", key: "icehockey_nhl" },
    League { label: "MLB", key: "baseball_mlb" },
    // European and Latin American basketball
    League { label: "EuroLeague", key: "basketball_euroleague" },
    League { label: "EuroCup", key: "basketball_eurocup" },
    League { label: "Spain ACB", key: "basketball_spain_liga_acb" },
    League { label: "Italy Lega A", key: "basketball_italy_lega_a" },
    League { label: "Germany BBL", key: "basketball_germany_bbl" },
    League { label: "France LNB", key: "basketball_france_lnb" },
    League { label: "Argentina Liga Nacional", key: "basketball_argentina_liga_nacional" },
    League { label: "Brazil NBB", key: "basketball_brazil_nbb" },
    // Table tennis
    League { label: "TT Elite Series", key: "table-tennis_tt-elite-series" },
];

/// Look up a league in the static catalog by its provider key
pub fn find_league(key: &str) -> Option<&'static League> {
    LEAGUES.iter().find(|league| league.key == key)
}

/// Side of a moneyline market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "Home",
            Outcome::Away => "Away",
            Outcome::Draw => "Draw",
        }
    }
}

/// One bookmaker price for one outcome, in decimal odds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub outcome: Outcome,
    pub price: f64,
}

impl Quote {
    /// Decimal odds must be finite and positive to be priced at all
    pub fn is_usable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Every quote a single bookmaker posted for a fixture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookLine {
    pub bookmaker: String,
    pub quotes: Vec<Quote>,
}

impl BookLine {
    pub fn price(&self, outcome: Outcome) -> Option<f64> {
        self.quotes
            .iter()
            .find(|quote| quote.outcome == outcome)
            .map(|quote| quote.price)
    }

    pub fn usable_price(&self, outcome: Outcome) -> Option<f64> {
        self.quotes
            .iter()
            .find(|quote| quote.outcome == outcome && quote.is_usable())
            .map(|quote| quote.price)
    }
}

/// A scheduled match with its bookmaker lines
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    pub league: &'static League,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub lines: Vec<BookLine>,
}

impl Fixture {
    /// Display name for the side an outcome refers to
    pub fn team_for(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Home => &self.home_team,
            Outcome::Away => &self.away_team,
            Outcome::Draw => "Draw",
        }
    }

    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Probability per outcome. `draw` is `None` for two-way markets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub home: f64,
    pub away: f64,
    pub draw: Option<f64>,
}

impl Distribution {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => Some(self.home),
            Outcome::Away => Some(self.away),
            Outcome::Draw => self.draw,
        }
    }

    pub fn total(&self) -> f64 {
        self.home + self.away + self.draw.unwrap_or(0.0)
    }
}
