use crate::models::{BookLine, Distribution, Fixture, Outcome};
use crate::utils::probability::{implied_distribution, model_distribution, ModelParams};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

const OUTCOME_ORDER: [Outcome; 3] = [Outcome::Home, Outcome::Away, Outcome::Draw];

/// How many rows a fixture contributes to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RankingPolicy {
    /// One row per priced side per bookmaker
    PerOutcome,
    /// One row per fixture: the side with the largest edge
    #[default]
    BestOnly,
}

impl RankingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingPolicy::PerOutcome => "per_outcome",
            RankingPolicy::BestOnly => "best_only",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "per_outcome" => Some(RankingPolicy::PerOutcome),
            "best_only" => Some(RankingPolicy::BestOnly),
            _ => None,
        }
    }
}

/// Model vs market comparison for one side of a fixture at one bookmaker
#[derive(Debug, Clone, Serialize)]
pub struct EdgeRecord {
    pub league_label: &'static str,
    pub league_key: &'static str,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub bookmaker: String,
    pub outcome: Outcome,
    pub pick_team: String,
    pub odds: f64,
    pub model_prob: f64,
    pub implied_prob: f64,
    /// (model - implied) in percentage points
    pub edge_pct: f64,
    /// Lowest priced side on this bookmaker's line
    pub market_favorite: String,
    pub market_favorite_prob: f64,
    /// Home or away, whichever the model rates higher. Never the draw.
    pub model_favorite: String,
    pub model_favorite_prob: f64,
    pub model_opponent_prob: f64,
    pub model_draw_prob: Option<f64>,
}

impl EdgeRecord {
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Pick team with its price, e.g. "Arsenal (1.80)"
    pub fn pick_description(&self) -> String {
        format!("{} ({:.2})", self.pick_team, self.odds)
    }

    /// Format the record as a readable string
    pub fn format(&self) -> String {
        format!(
            "[{}] {} | Pick: {} on {} | Edge: {:+.2}% | Model: {:.1}% | Implied: {:.1}%",
            self.league_label,
            self.matchup(),
            self.pick_description(),
            self.bookmaker,
            self.edge_pct,
            self.model_prob * 100.0,
            self.implied_prob * 100.0
        )
    }
}

/// Edge records for every priced side of every bookmaker line of a fixture
pub fn fixture_edges(fixture: &Fixture, params: &ModelParams) -> Vec<EdgeRecord> {
    let draw_eligible = fixture.league.is_draw_eligible();
    let model = model_distribution(params, draw_eligible);

    fixture
        .lines
        .iter()
        .flat_map(|line| line_edges(fixture, line, &model, draw_eligible))
        .collect()
}

fn line_edges(
    fixture: &Fixture,
    line: &BookLine,
    model: &Distribution,
    draw_eligible: bool,
) -> Vec<EdgeRecord> {
    let implied = implied_distribution(line, draw_eligible);

    let (market_favorite, market_favorite_prob) = market_favorite(line, &implied, draw_eligible)
        .map(|outcome| {
            (
                fixture.team_for(outcome).to_string(),
                implied.get(outcome).unwrap_or(0.0),
            )
        })
        .unwrap_or_default();

    let (model_favorite, model_favorite_prob, model_opponent_prob) = if model.home >= model.away {
        (fixture.home_team.clone(), model.home, model.away)
    } else {
        (fixture.away_team.clone(), model.away, model.home)
    };

    let mut records = Vec::new();
    for outcome in OUTCOME_ORDER {
        let Some(odds) = line.usable_price(outcome) else {
            continue;
        };
        let (Some(model_prob), Some(implied_prob)) = (model.get(outcome), implied.get(outcome))
        else {
            continue;
        };

        records.push(EdgeRecord {
            league_label: fixture.league.label,
            league_key: fixture.league.key,
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            commence_time: fixture.commence_time,
            bookmaker: line.bookmaker.clone(),
            outcome,
            pick_team: fixture.team_for(outcome).to_string(),
            odds,
            model_prob,
            implied_prob,
            edge_pct: (model_prob - implied_prob) * 100.0,
            market_favorite: market_favorite.clone(),
            market_favorite_prob,
            model_favorite: model_favorite.clone(),
            model_favorite_prob,
            model_opponent_prob,
            model_draw_prob: model.draw,
        });
    }
    records
}

/// Lowest decimal price wins; earlier sides win ties
fn market_favorite(line: &BookLine, implied: &Distribution, draw_eligible: bool) -> Option<Outcome> {
    let mut favorite: Option<(Outcome, f64)> = None;
    for outcome in OUTCOME_ORDER {
        if outcome == Outcome::Draw && !draw_eligible {
            continue;
        }
        if implied.get(outcome).is_none() {
            continue;
        }
        let Some(price) = line.usable_price(outcome) else {
            continue;
        };
        if favorite.map_or(true, |(_, best)| price < best) {
            favorite = Some((outcome, price));
        }
    }
    favorite.map(|(outcome, _)| outcome)
}

/// Apply the ranking policy to one fixture
pub fn rank_fixture(fixture: &Fixture, params: &ModelParams, policy: RankingPolicy) -> Vec<EdgeRecord> {
    let records = fixture_edges(fixture, params);
    match policy {
        RankingPolicy::PerOutcome => records,
        RankingPolicy::BestOnly => best_edge(records).into_iter().collect(),
    }
}

/// The record with the largest edge; the first one wins ties
fn best_edge(records: Vec<EdgeRecord>) -> Option<EdgeRecord> {
    let mut best: Option<EdgeRecord> = None;
    for record in records {
        match &best {
            Some(current) if record.edge_pct <= current.edge_pct => {}
            _ => best = Some(record),
        }
    }
    best
}

/// Sort by edge (descending), then model probability (descending). Stable.
pub fn sort_by_edge(records: &mut [EdgeRecord]) {
    records.sort_by(|a, b| {
        b.edge_pct
            .partial_cmp(&a.edge_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.model_prob
                    .partial_cmp(&a.model_prob)
                    .unwrap_or(Ordering::Equal)
            })
    });
}
