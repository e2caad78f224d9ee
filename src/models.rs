use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on chat message length; longer input is truncated, not rejected.
pub const CHAT_TEXT_MAX: usize = 280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Upcoming,
    Live,
    Completed,
}

/// Provider-agnostic snapshot of the tracked match. Replaced wholesale on
/// every successful fetch, never patched field-by-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: String,
    pub status: MatchStatus,
    pub team1: TeamState,
    pub team2: TeamState,
    pub score1: InningsScore,
    pub score2: InningsScore,
    /// 1-based; selects which of the two innings scores is active.
    pub current_innings: u8,
    pub toss: Option<TossResult>,
    pub venue: String,
    pub match_type: String,
    pub start_time: DateTime<Utc>,
    pub weather: Option<WeatherInfo>,
}

impl MatchSnapshot {
    /// Mutable handle on the currently batting side's score.
    pub fn active_score_mut(&mut self) -> &mut InningsScore {
        if self.current_innings <= 1 {
            &mut self.score1
        } else {
            &mut self.score2
        }
    }

    pub fn active_score(&self) -> &InningsScore {
        if self.current_innings <= 1 {
            &self.score1
        } else {
            &self.score2
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TossResult {
    pub winner: String,
    /// "bat" or "bowl"
    pub decision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub condition: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamState {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub flag: String,
    pub players: Vec<PlayerState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Batsman,
    Bowler,
    Allrounder,
    Wicketkeeper,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    pub role: PlayerRole,
    pub is_on_field: bool,
    pub batting: Option<BattingFigures>,
    pub bowling: Option<BowlingFigures>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattingFigures {
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
    pub not_out: bool,
}

impl BattingFigures {
    pub fn new(runs: u32, balls: u32, fours: u32, sixes: u32, not_out: bool) -> Self {
        let mut b = BattingFigures {
            runs,
            balls,
            fours,
            sixes,
            strike_rate: 0.0,
            not_out,
        };
        b.recompute_strike_rate();
        b
    }

    /// strike_rate is derived from runs/balls and must track them.
    pub fn recompute_strike_rate(&mut self) {
        self.strike_rate = if self.balls > 0 {
            self.runs as f64 / self.balls as f64 * 100.0
        } else {
            0.0
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BowlingFigures {
    pub overs: f64,
    pub maidens: u32,
    pub runs: u32,
    pub wickets: u32,
    pub economy: f64,
    pub balls: u32,
}

impl BowlingFigures {
    pub fn new(overs: f64, maidens: u32, runs: u32, wickets: u32, balls: u32) -> Self {
        let mut b = BowlingFigures {
            overs,
            maidens,
            runs,
            wickets,
            economy: 0.0,
            balls,
        };
        b.recompute_economy();
        b
    }

    pub fn recompute_economy(&mut self) {
        self.economy = if self.overs > 0.0 {
            self.runs as f64 / self.overs
        } else {
            0.0
        };
    }
}

/// One innings scoreline. `balls` is the within-over count and stays in
/// [0,6); a completed over rolls into `overs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InningsScore {
    pub runs: u32,
    pub wickets: u32,
    pub overs: u32,
    pub balls: u32,
    pub run_rate: f64,
    pub required_run_rate: Option<f64>,
}

impl InningsScore {
    pub fn new(runs: u32, wickets: u32, overs: u32, balls: u32) -> Self {
        let mut s = InningsScore {
            runs,
            wickets,
            overs,
            balls,
            run_rate: 0.0,
            required_run_rate: None,
        };
        s.recompute_run_rate();
        s
    }

    /// Record one legal delivery worth `runs` runs, carrying a completed
    /// over into the overs counter.
    pub fn add_delivery(&mut self, runs: u32) {
        self.runs += runs;
        self.balls += 1;
        if self.balls >= 6 {
            self.overs += 1;
            self.balls = 0;
        }
        self.recompute_run_rate();
    }

    pub fn recompute_run_rate(&mut self) {
        let overs_faced = self.overs as f64 + self.balls as f64 / 6.0;
        self.run_rate = if overs_faced > 0.0 {
            self.runs as f64 / overs_faced
        } else {
            0.0
        };
    }
}

/// One ball of commentary. The commentary feed is ordered newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryEntry {
    pub id: String,
    pub over: u32,
    pub ball: u32,
    pub runs: u32,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_wicket: bool,
    pub is_boundary: bool,
    pub player: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatOrigin {
    #[serde(rename = "in")]
    India,
    #[serde(rename = "pk")]
    Pakistan,
    #[serde(rename = "other")]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub origin: ChatOrigin,
}

impl ChatMessage {
    pub fn new(
        id: impl Into<String>,
        user: impl Into<String>,
        text: &str,
        timestamp: DateTime<Utc>,
        origin: ChatOrigin,
    ) -> Self {
        let text = if text.chars().count() > CHAT_TEXT_MAX {
            text.chars().take(CHAT_TEXT_MAX).collect()
        } else {
            text.to_string()
        };
        ChatMessage {
            id: id.into(),
            user: user.into(),
            text,
            timestamp,
            origin,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchStatsBundle {
    pub partnerships: Vec<Partnership>,
    /// Append-only, ordered by wicket_number.
    pub fall_of_wickets: Vec<WicketFall>,
    pub powerplays: Vec<PowerplayPhase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partnership {
    pub player1: String,
    pub player2: String,
    pub runs: u32,
    pub balls: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WicketFall {
    pub wicket_number: u32,
    pub runs: u32,
    pub overs: f64,
    pub player: String,
    pub how_out: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerplayPhase {
    pub phase: String,
    pub overs: String,
    pub runs: u32,
    pub wickets: u32,
    pub run_rate: f64,
}

/// A broadcast channel in the static catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// "in" | "pk" | "global"
    pub country: String,
    pub logo: String,
    pub stream_url: String,
    pub backup_stream_url: Option<String>,
    pub is_live: bool,
    pub quality: Vec<StreamQuality>,
    pub languages: Vec<String>,
    pub current_program: Option<ProgramBlock>,
    pub viewer_count: u64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamQuality {
    pub resolution: String,
    pub bitrate: u32,
    pub url: String,
    pub codec: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramBlock {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_live: bool,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub channels: Vec<ChannelDescriptor>,
}

/// Entry in the current-matches listing (catalog side, not polled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMatch {
    pub id: String,
    pub title: String,
    pub team1: String,
    pub team2: String,
    pub match_type: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub status: MatchStatus,
    /// Catalog channel ids carrying this match.
    pub channels: Vec<String>,
    pub official_stream: Option<String>,
}

/// Short code for a team: known international sides get their usual
/// abbreviation, anything else a generated 3-letter code.
pub fn short_name_for(team: &str) -> String {
    match team {
        "India" => "IND".to_string(),
        "Pakistan" => "PAK".to_string(),
        "England" => "ENG".to_string(),
        "Australia" => "AUS".to_string(),
        "South Africa" => "SA".to_string(),
        "New Zealand" => "NZ".to_string(),
        "West Indies" => "WI".to_string(),
        "Sri Lanka" => "SL".to_string(),
        "Bangladesh" => "BAN".to_string(),
        "Afghanistan" => "AFG".to_string(),
        _ => {
            let code: String = team
                .chars()
                .filter(|c| c.is_alphabetic())
                .take(3)
                .collect::<String>()
                .to_uppercase();
            if code.is_empty() {
                "TBD".to_string()
            } else {
                code
            }
        }
    }
}

/// URL-ish id slug from a team name.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}
