use crate::models::{BookLine, Distribution, Outcome};
use serde::Serialize;

/// Probability reserved for the draw in three-way markets
pub const DRAW_PROBABILITY: f64 = 0.10;

/// Scale applied to the home nudge before the logistic transform
const LOGISTIC_SCALE: f64 = 2.0;

/// Operator-tuned inputs of the home-advantage model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParams {
    /// Baseline nudge toward the home side
    pub home_advantage: f64,
    /// Manual roster/injury adjustment, positive favours home
    pub roster_delta: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            home_advantage: 0.10,
            roster_delta: 0.0,
        }
    }
}

/// Convert decimal odds to a raw implied probability.
/// Non-positive or non-finite prices carry no probability.
pub fn implied_probability(decimal_odds: f64) -> f64 {
    if decimal_odds.is_finite() && decimal_odds > 0.0 {
        1.0 / decimal_odds
    } else {
        0.0
    }
}

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Rescale so the outcomes sum to 1. A distribution with no mass is returned as is.
pub fn normalize(dist: Distribution) -> Distribution {
    let total = dist.total();
    if total <= 0.0 {
        return dist;
    }
    Distribution {
        home: dist.home / total,
        away: dist.away / total,
        draw: dist.draw.map(|p| p / total),
    }
}

/// Market-implied distribution of one bookmaker line, with the overround removed.
///
/// A draw quote only counts when the league is draw-eligible. A quote with a
/// bad price stays in the support at zero probability.
pub fn implied_distribution(line: &BookLine, draw_eligible: bool) -> Distribution {
    let raw = |outcome| line.price(outcome).map(implied_probability);
    normalize(Distribution {
        home: raw(Outcome::Home).unwrap_or(0.0),
        away: raw(Outcome::Away).unwrap_or(0.0),
        draw: if draw_eligible { raw(Outcome::Draw) } else { None },
    })
}

/// Model distribution: a logistic nudge toward the home side.
///
/// `p_home = logistic(2 * (home_advantage + roster_delta))`. Draw-eligible
/// leagues reserve `DRAW_PROBABILITY` and scale home/away by the remainder.
pub fn model_distribution(params: &ModelParams, draw_eligible: bool) -> Distribution {
    let home = logistic(LOGISTIC_SCALE * (params.home_advantage + params.roster_delta));
    let away = 1.0 - home;

    if draw_eligible {
        let scale = 1.0 - DRAW_PROBABILITY;
        Distribution {
            home: home * scale,
            away: away * scale,
            draw: Some(DRAW_PROBABILITY),
        }
    } else {
        Distribution {
            home,
            away,
            draw: None,
        }
    }
}
