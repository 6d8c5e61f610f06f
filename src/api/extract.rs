use crate::config::BookmakerSet;
use crate::models::{BookLine, Fixture, League, Outcome, Quote};
use crate::utils::time_window::TimeWindow;
use serde::Deserialize;
use tracing::debug;

const MONEYLINE_MARKET: &str = "h2h";

/// One fixture as The Odds API returns it
#[derive(Debug, Deserialize)]
struct OddsApiGame {
    #[serde(default)]
    home_team: String,
    #[serde(default)]
    away_team: String,
    #[serde(default)]
    commence_time: String,
    #[serde(default)]
    bookmakers: Vec<OddsApiBookmaker>,
}

#[derive(Debug, Deserialize)]
struct OddsApiBookmaker {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    markets: Vec<OddsApiMarket>,
}

#[derive(Debug, Deserialize)]
struct OddsApiMarket {
    #[serde(default)]
    key: String,
    #[serde(default)]
    outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Deserialize)]
struct OddsApiOutcome {
    #[serde(default)]
    name: String,
    price: f64,
}

/// Build a `Fixture` from one raw board entry.
///
/// Returns `None` when the entry is malformed, kicks off outside `window`,
/// or no requested bookmaker prices both the home and the away side.
pub fn extract_fixture(
    league: &'static League,
    raw: &serde_json::Value,
    window: &TimeWindow,
    bookmakers: &BookmakerSet,
) -> Option<Fixture> {
    let game = match OddsApiGame::deserialize(raw) {
        Ok(game) => game,
        Err(e) => {
            debug!("{}: skipping malformed fixture: {}", league.key, e);
            return None;
        }
    };

    if game.home_team.trim().is_empty() || game.away_team.trim().is_empty() {
        debug!("{}: skipping fixture without team names", league.key);
        return None;
    }

    let Some(commence_time) = window.admit(&game.commence_time) else {
        debug!(
            "{}: {} vs {} at {:?} is outside the kickoff window",
            league.key, game.home_team, game.away_team, game.commence_time
        );
        return None;
    };

    let lines: Vec<BookLine> = game
        .bookmakers
        .iter()
        .filter(|bookmaker| bookmakers.contains(&bookmaker.key))
        .filter_map(|bookmaker| book_line(league, &game, bookmaker))
        .collect();

    if lines.is_empty() {
        debug!(
            "{}: {} vs {} has no usable home/away prices",
            league.key, game.home_team, game.away_team
        );
        return None;
    }

    Some(Fixture {
        league,
        home_team: game.home_team,
        away_team: game.away_team,
        commence_time,
        lines,
    })
}

/// Moneyline quotes of a single bookmaker, kept only if home and away are usable
fn book_line(
    league: &League,
    game: &OddsApiGame,
    bookmaker: &OddsApiBookmaker,
) -> Option<BookLine> {
    let market = bookmaker
        .markets
        .iter()
        .find(|market| market.key == MONEYLINE_MARKET)?;

    let mut quotes: Vec<Quote> = Vec::new();
    for outcome in &market.outcomes {
        let Some(side) = classify_outcome(&outcome.name, game, league.is_draw_eligible()) else {
            continue;
        };
        if quotes.iter().any(|quote| quote.outcome == side) {
            continue;
        }
        quotes.push(Quote {
            outcome: side,
            price: outcome.price,
        });
    }

    let line = BookLine {
        bookmaker: bookmaker_display_name(&bookmaker.key, &bookmaker.title),
        quotes,
    };

    if line.usable_price(Outcome::Home).is_none() || line.usable_price(Outcome::Away).is_none() {
        return None;
    }
    Some(line)
}

/// Map an outcome label to a side of the fixture. An exact name wins over
/// containment, so nested names such as "Real Madrid" and "Real Madrid
/// Castilla" each keep their own side.
fn classify_outcome(label: &str, game: &OddsApiGame, draw_eligible: bool) -> Option<Outcome> {
    let home_exact = names_equal(label, &game.home_team);
    let away_exact = names_equal(label, &game.away_team);
    if home_exact {
        Some(Outcome::Home)
    } else if away_exact {
        Some(Outcome::Away)
    } else if names_match(label, &game.home_team) {
        Some(Outcome::Home)
    } else if names_match(label, &game.away_team) {
        Some(Outcome::Away)
    } else if draw_eligible && label.trim().eq_ignore_ascii_case("draw") {
        Some(Outcome::Draw)
    } else {
        None
    }
}

fn names_equal(label: &str, team: &str) -> bool {
    let label = label.trim();
    !label.is_empty() && label.to_lowercase() == team.trim().to_lowercase()
}

/// Case-insensitive containment in either direction, so "Lakers" matches
/// "Los Angeles Lakers" and vice versa
pub fn names_match(label: &str, team: &str) -> bool {
    let label = label.trim().to_lowercase();
    let team = team.trim().to_lowercase();
    if label.is_empty() || team.is_empty() {
        return false;
    }
    label.contains(&team) || team.contains(&label)
}

/// Feed title when present, otherwise the key title-cased
pub fn bookmaker_display_name(key: &str, title: &str) -> String {
    if !title.trim().is_empty() {
        return title.trim().to_string();
    }
    match key {
        "fanduel" | "fan_duel" => "FanDuel".to_string(),
        "draftkings" => "DraftKings".to_string(),
        _ => key
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
