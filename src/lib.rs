pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod utils;

pub use api::*;
pub use config::*;
pub use error::EdgeError;
pub use models::*;
pub use utils::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use utils::edge_analysis::{rank_fixture, sort_by_edge, EdgeRecord};
use utils::time_window::TimeWindow;

/// Everything one run produced, ready for the presenter
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Ranked by edge, then model probability
    pub records: Vec<EdgeRecord>,
    pub leagues_scanned: usize,
    /// Leagues whose board could not be retrieved
    pub failed_leagues: Vec<String>,
    pub fixtures_seen: usize,
    pub fixtures_kept: usize,
    /// Quota from the last successful response
    pub usage: Option<ApiUsage>,
}

/// Fetch every selected league in turn and rank model edges against the market.
///
/// A league that fails to load is logged and skipped. Only errors that are
/// not retrieval failures abort the run.
pub async fn scan_edges<S>(
    source: &S,
    config: &ScanConfig,
    now: DateTime<Utc>,
) -> Result<ScanReport, EdgeError>
where
    S: OddsSource + ?Sized,
{
    let window = TimeWindow::upcoming(now, config.days_ahead);
    let mut report = ScanReport::default();

    for &league in &config.leagues {
        report.leagues_scanned += 1;

        let board = match source.fetch_board(league.key).await {
            Ok(board) => board,
            Err(e) if e.is_retrieval() => {
                warn!("Skipping {}: {}", league.label, e);
                report.failed_leagues.push(league.label.to_string());
                continue;
            }
            Err(e) => return Err(e),
        };

        report.usage = Some(board.usage);
        report.fixtures_seen += board.fixtures.len();

        for raw in &board.fixtures {
            let Some(fixture) = extract_fixture(league, raw, &window, &config.bookmakers) else {
                continue;
            };
            report.fixtures_kept += 1;
            report
                .records
                .extend(rank_fixture(&fixture, &config.model, config.policy));
        }
    }

    sort_by_edge(&mut report.records);
    if let Some(top) = report.records.first() {
        debug!("Top edge: {}", top.format());
    }

    info!(
        "Scanned {} leagues ({} failed): {} of {} fixtures in window, {} rows",
        report.leagues_scanned,
        report.failed_leagues.len(),
        report.fixtures_kept,
        report.fixtures_seen,
        report.records.len()
    );

    Ok(report)
}
