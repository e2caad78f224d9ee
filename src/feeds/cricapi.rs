use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::debug;

use crate::models::{
    slugify, short_name_for, CurrentMatch, InningsScore, MatchSnapshot, MatchStatus, TeamState,
};

use super::provider::{flag_for, MatchListProvider, MatchProvider};
use super::synth::roster_for;

/// Adapter for the CricAPI current-matches endpoint.
/// Docs: <https://www.cricapi.com/>
pub struct CricApi {
    http: Client,
    /// Key is optional by design: a missing key makes every fetch fail
    /// cleanly so the resolver walks on to the next provider.
    api_key: Option<String>,
    /// Base URL for overriding in tests
    base_url: String,
    team1: String,
    team2: String,
}

impl CricApi {
    pub fn new(
        api_key: Option<&str>,
        base_url: Option<&str>,
        team1: &str,
        team2: &str,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(CricApi {
            http,
            api_key: api_key.map(str::to_string),
            base_url: base_url
                .unwrap_or("https://api.cricapi.com/v1")
                .to_string(),
            team1: team1.to_string(),
            team2: team2.to_string(),
        })
    }

    async fn fetch_raw(&self) -> Result<serde_json::Value> {
        let key = self
            .api_key
            .as_deref()
            .context("no CricAPI key configured")?;
        let url = format!("{}/currentMatches?apikey={}&offset=0", self.base_url, key);
        debug!("Fetching current matches from CricAPI");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("CricAPI request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("CricAPI error: {}", resp.status());
        }

        resp.json().await.context("Failed to parse CricAPI response")
    }
}

#[async_trait]
impl MatchProvider for CricApi {
    fn name(&self) -> &str {
        "CricAPI"
    }

    async fn fetch_live_match(&self) -> Result<MatchSnapshot> {
        let raw = self.fetch_raw().await?;
        parse_tracked_match(&raw, &self.team1, &self.team2)?
            .context("no usable match in CricAPI payload")
    }
}

#[async_trait]
impl MatchListProvider for CricApi {
    fn name(&self) -> &str {
        "CricAPI"
    }

    async fn fetch_current_matches(&self) -> Result<Vec<CurrentMatch>> {
        let raw = self.fetch_raw().await?;
        parse_match_list(&raw)
    }
}

fn team_references(team: &str, tracked1: &str, tracked2: &str) -> bool {
    let t = team.to_lowercase();
    t.contains(&tracked1.to_lowercase()) || t.contains(&tracked2.to_lowercase())
}

/// Find the tracked matchup in a CricAPI `currentMatches` payload and
/// normalize it. Returns `Ok(None)` when the payload parses but carries no
/// usable match.
fn parse_tracked_match(
    raw: &serde_json::Value,
    tracked1: &str,
    tracked2: &str,
) -> Result<Option<MatchSnapshot>> {
    let matches = match raw["data"].as_array() {
        Some(a) => a,
        None => return Ok(None),
    };

    let m = matches.iter().find(|m| {
        m["teams"]
            .as_array()
            .map(|teams| {
                teams
                    .iter()
                    .filter_map(|t| t.as_str())
                    .any(|t| team_references(t, tracked1, tracked2))
            })
            .unwrap_or(false)
    });

    let m = match m {
        Some(m) => m,
        None => return Ok(None),
    };

    let teams = m["teams"].as_array().cloned().unwrap_or_default();
    let name1 = teams.first().and_then(|t| t.as_str()).unwrap_or("Team 1");
    let name2 = teams.get(1).and_then(|t| t.as_str()).unwrap_or("Team 2");

    let started = m["matchStarted"].as_bool().unwrap_or(false);
    let ended = m["matchEnded"].as_bool().unwrap_or(false);
    let status = if !started {
        MatchStatus::Upcoming
    } else if ended {
        MatchStatus::Completed
    } else {
        MatchStatus::Live
    };

    let scores = m["score"].as_array().cloned().unwrap_or_default();
    let score1 = parse_score_entry(scores.first());
    let score2 = parse_score_entry(scores.get(1));
    let current_innings = if scores.len() > 1 { 2 } else { 1 };

    Ok(Some(MatchSnapshot {
        id: m["id"].as_str().unwrap_or("cricapi-match").to_string(),
        status,
        team1: normalized_team(name1),
        team2: normalized_team(name2),
        score1,
        score2,
        current_innings,
        toss: None,
        venue: m["venue"].as_str().unwrap_or("TBD").to_string(),
        match_type: m["matchType"]
            .as_str()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "T20I".to_string()),
        start_time: parse_start_time(m),
        weather: None,
    }))
}

fn parse_match_list(raw: &serde_json::Value) -> Result<Vec<CurrentMatch>> {
    let matches = match raw["data"].as_array() {
        Some(a) => a,
        None => return Ok(vec![]),
    };

    let list = matches
        .iter()
        .filter_map(|m| {
            let teams = m["teams"].as_array()?;
            let team1 = teams.first().and_then(|t| t.as_str())?.to_string();
            let team2 = teams.get(1).and_then(|t| t.as_str()).unwrap_or("TBD").to_string();
            let started = m["matchStarted"].as_bool().unwrap_or(false);
            let ended = m["matchEnded"].as_bool().unwrap_or(false);
            Some(CurrentMatch {
                id: m["id"].as_str().unwrap_or("cricapi-match").to_string(),
                title: m["name"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{team1} vs {team2}")),
                team1,
                team2,
                match_type: m["matchType"]
                    .as_str()
                    .map(str::to_uppercase)
                    .unwrap_or_else(|| "T20".to_string()),
                venue: m["venue"].as_str().unwrap_or("TBD").to_string(),
                start_time: parse_start_time(m),
                status: if !started {
                    MatchStatus::Upcoming
                } else if ended {
                    MatchStatus::Completed
                } else {
                    MatchStatus::Live
                },
                channels: vec![],
                official_stream: Some("https://www.hotstar.com/in/sports/cricket".into()),
            })
        })
        .collect();

    Ok(list)
}

fn normalized_team(name: &str) -> TeamState {
    TeamState {
        id: slugify(name),
        name: name.to_string(),
        short_name: short_name_for(name),
        flag: flag_for(name),
        players: roster_for(name),
    }
}

/// CricAPI score entries are `{r, w, o}` with overs as a decimal like 8.2
/// (8 overs, 2 balls). A missing entry normalizes to a zero score.
fn parse_score_entry(entry: Option<&serde_json::Value>) -> InningsScore {
    let entry = match entry {
        Some(e) => e,
        None => return InningsScore::default(),
    };
    let runs = entry["r"].as_u64().unwrap_or(0) as u32;
    let wickets = entry["w"].as_u64().unwrap_or(0) as u32;
    let o = entry["o"].as_f64().unwrap_or(0.0);
    let overs = o.trunc() as u32;
    let balls = (((o - o.trunc()) * 10.0).round() as u32).min(5);
    InningsScore::new(runs, wickets, overs, balls)
}

fn parse_start_time(m: &serde_json::Value) -> DateTime<Utc> {
    m["dateTimeGMT"]
        .as_str()
        .and_then(|s| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|n| n.and_utc())
        })
        .or_else(|| {
            m["date"]
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.with_timezone(&Utc))
        })
        .unwrap_or_else(Utc::now)
}
