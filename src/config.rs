use clap::Parser;

/// Live cricket match aggregation service
#[derive(Parser, Debug, Clone)]
#[command(name = "cricklive", version, about)]
pub struct Config {
    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// CricAPI key; when absent the CricAPI provider fails cleanly and the
    /// fallback chain continues
    #[arg(long, env = "CRICAPI_KEY")]
    pub cricapi_key: Option<String>,

    /// CricAPI base URL
    #[arg(long, env = "CRICAPI_URL", default_value = "https://api.cricapi.com/v1")]
    pub cricapi_url: String,

    /// ESPN Cricinfo consumer API base URL
    #[arg(
        long,
        env = "ESPN_API_URL",
        default_value = "https://hs-consumer-api.espncricinfo.com/v1/pages"
    )]
    pub espn_api_url: String,

    /// Match snapshot polling period in seconds (the slowest feed)
    #[arg(long, env = "SNAPSHOT_POLL_SECS", default_value = "30")]
    pub snapshot_poll_secs: u64,

    /// Commentary polling period in seconds
    #[arg(long, env = "COMMENTARY_POLL_SECS", default_value = "15")]
    pub commentary_poll_secs: u64,

    /// Chat polling period in seconds (the fastest feed)
    #[arg(long, env = "CHAT_POLL_SECS", default_value = "10")]
    pub chat_poll_secs: u64,

    /// First tracked team name
    #[arg(long, env = "TRACKED_TEAM1", default_value = "India")]
    pub tracked_team1: String,

    /// Second tracked team name
    #[arg(long, env = "TRACKED_TEAM2", default_value = "Pakistan")]
    pub tracked_team2: String,

    /// Simulated latency for the synthesized fallback, in milliseconds
    #[arg(long, env = "SYNTH_LATENCY_MS", default_value = "500")]
    pub synth_latency_ms: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.snapshot_poll_secs == 0 || self.commentary_poll_secs == 0 || self.chat_poll_secs == 0
        {
            anyhow::bail!("poll periods must be positive");
        }
        if self.commentary_poll_secs > self.snapshot_poll_secs {
            anyhow::bail!("commentary_poll_secs must not exceed snapshot_poll_secs");
        }
        if self.chat_poll_secs > self.commentary_poll_secs {
            anyhow::bail!("chat_poll_secs must not exceed commentary_poll_secs");
        }
        if self.tracked_team1.trim().is_empty() || self.tracked_team2.trim().is_empty() {
            anyhow::bail!("tracked team names must not be empty");
        }
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("listen_addr is not a valid socket address: {}", self.listen_addr);
        }
        Ok(())
    }
}
