use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::debug;

use crate::models::{
    short_name_for, slugify, CurrentMatch, InningsScore, MatchSnapshot, MatchStatus, TeamState,
};

use super::provider::{flag_for, MatchListProvider, MatchProvider};
use super::synth::roster_for;

/// Adapter for the ESPN Cricinfo consumer API. No key required.
pub struct EspnCricinfo {
    http: Client,
    /// Base URL for overriding in tests
    base_url: String,
    team1: String,
    team2: String,
}

impl EspnCricinfo {
    pub fn new(base_url: Option<&str>, team1: &str, team2: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(EspnCricinfo {
            http,
            base_url: base_url
                .unwrap_or("https://hs-consumer-api.espncricinfo.com/v1/pages")
                .to_string(),
            team1: team1.to_string(),
            team2: team2.to_string(),
        })
    }

    async fn fetch_raw(&self) -> Result<serde_json::Value> {
        let url = format!("{}/matches/current?lang=en", self.base_url);
        debug!("Fetching current matches from ESPN Cricinfo");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("ESPN Cricinfo request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("ESPN Cricinfo error: {}", resp.status());
        }

        resp.json()
            .await
            .context("Failed to parse ESPN Cricinfo response")
    }
}

#[async_trait]
impl MatchProvider for EspnCricinfo {
    fn name(&self) -> &str {
        "ESPN Cricinfo"
    }

    async fn fetch_live_match(&self) -> Result<MatchSnapshot> {
        let raw = self.fetch_raw().await?;
        parse_tracked_match(&raw, &self.team1, &self.team2)?
            .context("no usable match in ESPN Cricinfo payload")
    }
}

#[async_trait]
impl MatchListProvider for EspnCricinfo {
    fn name(&self) -> &str {
        "ESPN Cricinfo"
    }

    async fn fetch_current_matches(&self) -> Result<Vec<CurrentMatch>> {
        let raw = self.fetch_raw().await?;
        parse_match_list(&raw)
    }
}

/// ESPN status codes: 3 = live, 4 = completed, anything else upcoming.
fn status_from_type(t: i64) -> MatchStatus {
    match t {
        3 => MatchStatus::Live,
        4 => MatchStatus::Completed,
        _ => MatchStatus::Upcoming,
    }
}

fn match_team_name(m: &serde_json::Value, idx: usize) -> Option<String> {
    m["teams"]
        .get(idx)?
        .pointer("/team/name")?
        .as_str()
        .map(str::to_string)
}

fn parse_tracked_match(
    raw: &serde_json::Value,
    tracked1: &str,
    tracked2: &str,
) -> Result<Option<MatchSnapshot>> {
    let matches = match raw["matches"].as_array() {
        Some(a) => a,
        None => return Ok(None),
    };

    let t1 = tracked1.to_lowercase();
    let t2 = tracked2.to_lowercase();
    let m = matches.iter().find(|m| {
        m["teams"]
            .as_array()
            .map(|teams| {
                teams
                    .iter()
                    .filter_map(|t| t.pointer("/team/name").and_then(|n| n.as_str()))
                    .any(|n| {
                        let n = n.to_lowercase();
                        n.contains(&t1) || n.contains(&t2)
                    })
            })
            .unwrap_or(false)
    });

    let m = match m {
        Some(m) => m,
        None => return Ok(None),
    };

    Ok(Some(MatchSnapshot {
        id: match m["objectId"] {
            serde_json::Value::String(ref s) => s.clone(),
            serde_json::Value::Number(ref n) => n.to_string(),
            _ => "espn-match".to_string(),
        },
        status: status_from_type(m.pointer("/status/type").and_then(|t| t.as_i64()).unwrap_or(0)),
        team1: normalized_team(m, 0, "Team 1"),
        team2: normalized_team(m, 1, "Team 2"),
        score1: parse_innings(m, 0),
        score2: parse_innings(m, 1),
        current_innings: 1,
        toss: None,
        venue: m
            .pointer("/venue/fullName")
            .and_then(|v| v.as_str())
            .unwrap_or("TBD")
            .to_string(),
        match_type: "T20I".to_string(),
        start_time: m["startDate"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
        weather: None,
    }))
}

fn parse_match_list(raw: &serde_json::Value) -> Result<Vec<CurrentMatch>> {
    let matches = match raw["matches"].as_array() {
        Some(a) => a,
        None => return Ok(vec![]),
    };

    let list = matches
        .iter()
        .filter_map(|m| {
            let team1 = match_team_name(m, 0)?;
            let team2 = match_team_name(m, 1).unwrap_or_else(|| "TBD".to_string());
            Some(CurrentMatch {
                id: match m["objectId"] {
                    serde_json::Value::String(ref s) => s.clone(),
                    serde_json::Value::Number(ref n) => n.to_string(),
                    _ => return None,
                },
                title: m["title"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{team1} vs {team2}")),
                team1,
                team2,
                match_type: "T20".to_string(),
                venue: m
                    .pointer("/venue/fullName")
                    .and_then(|v| v.as_str())
                    .unwrap_or("TBD")
                    .to_string(),
                start_time: m["startDate"]
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|d| d.with_timezone(&Utc))
                    .unwrap_or_else(Utc::now),
                status: status_from_type(
                    m.pointer("/status/type").and_then(|t| t.as_i64()).unwrap_or(0),
                ),
                channels: vec![],
                official_stream: Some("https://www.espncricinfo.com".into()),
            })
        })
        .collect();

    Ok(list)
}

fn normalized_team(m: &serde_json::Value, idx: usize, fallback: &str) -> TeamState {
    let name = match_team_name(m, idx).unwrap_or_else(|| fallback.to_string());
    let short = m["teams"]
        .get(idx)
        .and_then(|t| t.pointer("/team/abbreviation"))
        .and_then(|a| a.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| short_name_for(&name));
    TeamState {
        id: slugify(&name),
        short_name: short,
        flag: flag_for(&name),
        players: roster_for(&name),
        name,
    }
}

/// First-innings scoreline for the team at `idx`; zero score when absent.
/// ESPN overs are decimal (8.2 = 8 overs, 2 balls).
fn parse_innings(m: &serde_json::Value, idx: usize) -> InningsScore {
    let innings = m["teams"]
        .get(idx)
        .and_then(|t| t.pointer("/score/innings/0"));
    let innings = match innings {
        Some(i) => i,
        None => return InningsScore::default(),
    };
    let runs = innings["runs"].as_u64().unwrap_or(0) as u32;
    let wickets = innings["wickets"].as_u64().unwrap_or(0) as u32;
    let o = innings["overs"].as_f64().unwrap_or(0.0);
    let overs = o.trunc() as u32;
    let balls = (((o - o.trunc()) * 10.0).round() as u32).min(5);
    InningsScore::new(runs, wickets, overs, balls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> serde_json::Value {
        json!({
            "matches": [
                {
                    "objectId": 987654,
                    "title": "India vs Pakistan, 3rd Match",
                    "startDate": "2024-01-15T14:30:00Z",
                    "status": {"type": 3, "description": "Live"},
                    "venue": {"fullName": "Dubai International Cricket Stadium"},
                    "teams": [
                        {
                            "team": {"id": "6", "name": "India", "abbreviation": "IND"},
                            "score": {"innings": [{"runs": 68, "wickets": 0, "overs": 8.2}]}
                        },
                        {
                            "team": {"id": "7", "name": "Pakistan", "abbreviation": "PAK"},
                            "score": {"innings": []}
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_finds_tracked_match() {
        let snap = parse_tracked_match(&sample_payload(), "India", "Pakistan")
            .unwrap()
            .unwrap();
        assert_eq!(snap.id, "987654");
        assert_eq!(snap.status, MatchStatus::Live);
        assert_eq!(snap.team1.short_name, "IND");
        assert_eq!(snap.score1.runs, 68);
        assert_eq!(snap.score1.balls, 2);
        assert_eq!(snap.score2.runs, 0);
        assert_eq!(snap.venue, "Dubai International Cricket Stadium");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_from_type(3), MatchStatus::Live);
        assert_eq!(status_from_type(4), MatchStatus::Completed);
        assert_eq!(status_from_type(1), MatchStatus::Upcoming);
    }

    #[test]
    fn test_missing_matches_key_is_none() {
        let snap = parse_tracked_match(&json!({}), "India", "Pakistan").unwrap();
        assert!(snap.is_none());
    }

    #[test]
    fn test_untracked_match_is_none() {
        let snap = parse_tracked_match(&sample_payload(), "England", "Australia").unwrap();
        assert!(snap.is_none());
    }

    #[test]
    fn test_match_list() {
        let list = parse_match_list(&sample_payload()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, MatchStatus::Live);
        assert_eq!(list[0].team2, "Pakistan");
    }
}
