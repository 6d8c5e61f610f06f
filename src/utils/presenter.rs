use crate::utils::edge_analysis::EdgeRecord;
use serde::Serialize;

pub const DEFAULT_PLAY_THRESHOLD: f64 = 5.0;

/// Operator-side filters applied after ranking
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFilter {
    /// Case-insensitive substring over teams, league, pick and favourites
    pub search: String,
    /// Hide rows whose edge is below this many percentage points
    pub min_edge: Option<f64>,
    pub positive_only: bool,
    /// Edge (percentage points) at or above which a row is a Play
    pub play_threshold: f64,
}

impl Default for DisplayFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            min_edge: None,
            positive_only: false,
            play_threshold: DEFAULT_PLAY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    Play,
    Pass,
}

impl Recommendation {
    pub fn for_edge(edge_pct: f64, threshold: f64) -> Self {
        if edge_pct >= threshold {
            Recommendation::Play
        } else {
            Recommendation::Pass
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Play => "Play",
            Recommendation::Pass => "Pass",
        }
    }
}

/// Colour band of an edge cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeBand {
    Positive,
    Neutral,
    Negative,
}

impl EdgeBand {
    pub fn classify(edge_pct: f64, threshold: f64) -> Self {
        if edge_pct >= threshold {
            EdgeBand::Positive
        } else if edge_pct < 0.0 {
            EdgeBand::Negative
        } else {
            EdgeBand::Neutral
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            EdgeBand::Positive => "edge-positive",
            EdgeBand::Neutral => "edge-neutral",
            EdgeBand::Negative => "edge-negative",
        }
    }
}

/// One rendered table row. Percentages are in percentage points.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub league: String,
    pub start_utc: String,
    pub matchup: String,
    pub home_team: String,
    pub away_team: String,
    pub side: String,
    pub pick: String,
    pub bookmaker: String,
    pub odds: f64,
    pub model_pct: f64,
    pub implied_pct: f64,
    pub edge_pct: f64,
    pub market_favorite: String,
    pub market_favorite_pct: f64,
    pub model_favorite: String,
    pub model_favorite_pct: f64,
    pub model_opponent_pct: f64,
    pub model_draw: String,
    pub recommendation: Recommendation,
    pub recommendation_label: &'static str,
    pub band_class: &'static str,
}

impl TableRow {
    fn from_record(record: &EdgeRecord, play_threshold: f64) -> Self {
        let recommendation = Recommendation::for_edge(record.edge_pct, play_threshold);
        Self {
            league: record.league_label.to_string(),
            start_utc: record.commence_time.format("%Y-%m-%d %H:%M").to_string(),
            matchup: record.matchup(),
            home_team: record.home_team.clone(),
            away_team: record.away_team.clone(),
            side: record.outcome.label().to_string(),
            pick: record.pick_description(),
            bookmaker: record.bookmaker.clone(),
            odds: record.odds,
            model_pct: record.model_prob * 100.0,
            implied_pct: record.implied_prob * 100.0,
            edge_pct: record.edge_pct,
            market_favorite: record.market_favorite.clone(),
            market_favorite_pct: record.market_favorite_prob * 100.0,
            model_favorite: record.model_favorite.clone(),
            model_favorite_pct: record.model_favorite_prob * 100.0,
            model_opponent_pct: record.model_opponent_prob * 100.0,
            model_draw: record
                .model_draw_prob
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_default(),
            recommendation,
            recommendation_label: recommendation.label(),
            band_class: EdgeBand::classify(record.edge_pct, play_threshold).css_class(),
        }
    }
}

/// Filtered rows plus the message shown above the table
#[derive(Debug, Clone, Serialize)]
pub struct Presentation {
    pub rows: Vec<TableRow>,
    pub message: String,
    pub play_count: usize,
    /// Only when some row comes from a draw-eligible league
    pub show_draw_column: bool,
}

pub fn matches_search(record: &EdgeRecord, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [
        record.league_label.to_string(),
        record.home_team.clone(),
        record.away_team.clone(),
        record.matchup(),
        record.pick_description(),
        record.market_favorite.clone(),
        record.model_favorite.clone(),
        record.bookmaker.clone(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&query))
}

fn passes(record: &EdgeRecord, filter: &DisplayFilter) -> bool {
    if filter.positive_only && record.edge_pct <= 0.0 {
        return false;
    }
    if let Some(min_edge) = filter.min_edge {
        if record.edge_pct < min_edge {
            return false;
        }
    }
    matches_search(record, &filter.search)
}

/// Filter and label ranked records. Input order is preserved.
pub fn present(records: &[EdgeRecord], filter: &DisplayFilter) -> Presentation {
    let rows: Vec<TableRow> = records
        .iter()
        .filter(|record| passes(record, filter))
        .map(|record| TableRow::from_record(record, filter.play_threshold))
        .collect();

    let play_count = rows
        .iter()
        .filter(|row| row.recommendation == Recommendation::Play)
        .count();
    let show_draw_column = rows.iter().any(|row| !row.model_draw.is_empty());

    let message = if records.is_empty() {
        "No eligible games found (or odds not posted yet) for the selected leagues and time window."
            .to_string()
    } else if rows.is_empty() {
        format!(
            "No results match the current filters ({} hidden).",
            records.len()
        )
    } else {
        format!(
            "Found {} result{} ({} marked Play at edge \u{2265} {:.1}%).",
            rows.len(),
            if rows.len() == 1 { "" } else { "s" },
            play_count,
            filter.play_threshold
        )
    };

    Presentation {
        rows,
        message,
        play_count,
        show_draw_column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{find_league, BookLine, Fixture, Outcome, Quote};
    use crate::utils::edge_analysis::{rank_fixture, sort_by_edge, RankingPolicy};
    use crate::utils::probability::ModelParams;
    use chrono::{TimeZone, Utc};

    fn mk(league: &str, home: &str, away: &str, prices: &[(Outcome, f64)]) -> Fixture {
        Fixture {
            league: find_league(league).unwrap(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            commence_time: Utc.with_ymd_and_hms(2025, 10, 17, 19, 0, 0).unwrap(),
            lines: vec![BookLine {
                bookmaker: "DraftKings".to_string(),
                quotes: prices
                    .iter()
                    .map(|&(outcome, price)| Quote { outcome, price })
                    .collect(),
            }],
        }
    }

    fn records() -> Vec<EdgeRecord> {
        let fixtures = [
            mk(
                "soccer_epl",
                "Arsenal",
                "Chelsea",
                &[(Outcome::Home, 1.80), (Outcome::Away, 2.10), (Outcome::Draw, 3.50)],
            ),
            mk(
                "basketball_nba",
                "Los Angeles Lakers",
                "Boston Celtics",
                &[(Outcome::Home, 1.90), (Outcome::Away, 1.90)],
            ),
        ];
        let mut records: Vec<EdgeRecord> = fixtures
            .iter()
            .flat_map(|f| rank_fixture(f, &ModelParams::default(), RankingPolicy::PerOutcome))
            .collect();
        sort_by_edge(&mut records);
        records
    }

    #[test]
    fn test_bands_and_recommendations() {
        assert_eq!(EdgeBand::classify(5.0, 5.0), EdgeBand::Positive);
        assert_eq!(EdgeBand::classify(4.99, 5.0), EdgeBand::Neutral);
        assert_eq!(EdgeBand::classify(0.0, 5.0), EdgeBand::Neutral);
        assert_eq!(EdgeBand::classify(-0.01, 5.0), EdgeBand::Negative);
        assert_eq!(Recommendation::for_edge(5.0, 5.0), Recommendation::Play);
        assert_eq!(Recommendation::for_edge(4.9, 5.0), Recommendation::Pass);
    }

    #[test]
    fn test_present_labels_rows() {
        let records = records();
        let presentation = present(&records, &DisplayFilter::default());
        assert_eq!(presentation.rows.len(), 5);
        assert!(presentation.show_draw_column);

        let top = &presentation.rows[0];
        assert_eq!(top.pick, "Arsenal (1.80)");
        assert_eq!(top.recommendation_label, "Play");
        assert_eq!(top.band_class, "edge-positive");
        assert_eq!(top.start_utc, "2025-10-17 19:00");
        assert_eq!(top.model_draw, "10.0%");

        let last = presentation.rows.last().unwrap();
        assert_eq!(last.recommendation, Recommendation::Pass);
        assert_eq!(last.band_class, "edge-negative");
        assert!(presentation.message.starts_with("Found 5 results"));
    }

    #[test]
    fn test_search_matches_teams_and_league() {
        let records = records();
        let filter = DisplayFilter {
            search: "lakers".to_string(),
            ..DisplayFilter::default()
        };
        let presentation = present(&records, &filter);
        assert_eq!(presentation.rows.len(), 2);
        assert!(!presentation.show_draw_column);

        let filter = DisplayFilter {
            search: " EPL ".to_string(),
            ..DisplayFilter::default()
        };
        assert_eq!(present(&records, &filter).rows.len(), 3);
    }

    #[test]
    fn test_edge_filters() {
        let records = records();
        let positive = present(
            &records,
            &DisplayFilter {
                positive_only: true,
                ..DisplayFilter::default()
            },
        );
        assert!(positive.rows.iter().all(|row| row.edge_pct > 0.0));

        let strong = present(
            &records,
            &DisplayFilter {
                min_edge: Some(5.0),
                ..DisplayFilter::default()
            },
        );
        assert!(strong.rows.iter().all(|row| row.edge_pct >= 5.0));
        assert_eq!(strong.play_count, strong.rows.len());
    }

    #[test]
    fn test_empty_messages() {
        let empty = present(&[], &DisplayFilter::default());
        assert!(empty.rows.is_empty());
        assert!(empty.message.starts_with("No eligible games"));

        let filtered = present(
            &records(),
            &DisplayFilter {
                search: "real madrid".to_string(),
                ..DisplayFilter::default()
            },
        );
        assert!(filtered.message.starts_with("No results match"));
    }
}
