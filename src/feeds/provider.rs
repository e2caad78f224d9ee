use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CurrentMatch, MatchSnapshot};

/// Trait that every live-match provider adapter must implement. An adapter
/// owns its HTTP client and normalizes its upstream payload shape into the
/// canonical `MatchSnapshot` before returning.
#[async_trait]
pub trait MatchProvider: Send + Sync {
    /// Return a normalized snapshot of the tracked match, or an error when
    /// the upstream fails or carries no usable match.
    async fn fetch_live_match(&self) -> Result<MatchSnapshot>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Provider of the current-matches listing (catalog side).
#[async_trait]
pub trait MatchListProvider: Send + Sync {
    async fn fetch_current_matches(&self) -> Result<Vec<CurrentMatch>>;

    fn name(&self) -> &str;
}

/// Flag image for known sides; a neutral placeholder otherwise.
pub fn flag_for(team: &str) -> String {
    let path = match team {
        "India" => "india-flag.png",
        "Pakistan" => "pakistan-flag.png",
        "England" => "england-flag.png",
        "Australia" => "australia-flag.png",
        _ => "generic-flag.png",
    };
    format!("https://storage.googleapis.com/workspace-generated-images/{path}")
}
