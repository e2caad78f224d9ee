use chrono::{Duration as ChronoDuration, Utc};

use crate::models::{ChannelCategory, ChannelDescriptor, ProgramBlock, StreamQuality};

/// Static broadcast-channel catalog. Explicitly constructed and passed by
/// reference from the composition root; all operations are pure lookups over
/// the seeded channel list, no polling involved.
pub struct ChannelCatalog {
    channels: Vec<ChannelDescriptor>,
}

impl Default for ChannelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelCatalog {
    pub fn new() -> Self {
        ChannelCatalog {
            channels: seed_channels(),
        }
    }

    pub fn live_channels(&self) -> Vec<ChannelDescriptor> {
        self.channels.iter().filter(|c| c.is_live).cloned().collect()
    }

    pub fn channels_by_category(&self, category: &str) -> Vec<ChannelDescriptor> {
        self.channels
            .iter()
            .filter(|c| c.category == category && c.is_live)
            .cloned()
            .collect()
    }

    /// Country lookup includes global channels.
    pub fn channels_by_country(&self, country: &str) -> Vec<ChannelDescriptor> {
        self.channels
            .iter()
            .filter(|c| (c.country == country || c.country == "global") && c.is_live)
            .cloned()
            .collect()
    }

    pub fn channel_by_id(&self, id: &str) -> Option<ChannelDescriptor> {
        self.channels.iter().find(|c| c.id == id).cloned()
    }

    /// Case-insensitive search over name, description and tags.
    pub fn search(&self, query: &str) -> Vec<ChannelDescriptor> {
        let q = query.to_lowercase();
        self.channels
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&q)
                    || c.description.to_lowercase().contains(&q)
                    || c.tags.iter().any(|t| t.to_lowercase().contains(&q))
            })
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<ChannelCategory> {
        vec![
            ChannelCategory {
                id: "cricket".into(),
                name: "Cricket Channels".into(),
                description: "Dedicated cricket broadcasting channels".into(),
                icon: "🏏".into(),
                channels: self.channels_by_category("cricket"),
            },
            ChannelCategory {
                id: "sports".into(),
                name: "Sports Networks".into(),
                description: "General sports channels with cricket coverage".into(),
                icon: "⚽".into(),
                channels: self.channels_by_category("sports"),
            },
            ChannelCategory {
                id: "indian".into(),
                name: "Indian Channels".into(),
                description: "Indian broadcasting channels".into(),
                icon: "🇮🇳".into(),
                channels: self.channels_by_country("in"),
            },
            ChannelCategory {
                id: "pakistani".into(),
                name: "Pakistani Channels".into(),
                description: "Pakistani broadcasting channels".into(),
                icon: "🇵🇰".into(),
                channels: self.channels_by_country("pk"),
            },
        ]
    }

    /// Channel ids carrying a given matchup: team broadcasters first, the
    /// global channels always.
    pub fn channels_for_match(&self, team1: &str, team2: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for team in [team1.to_lowercase(), team2.to_lowercase()] {
            if team.contains("india") {
                ids.push("star-sports-1".into());
                ids.push("sony-liv".into());
            }
            if team.contains("pakistan") {
                ids.push("ptv-sports".into());
            }
        }
        ids.extend([
            "sky-sports-cricket".to_string(),
            "willow-tv".to_string(),
            "youtube-cricket".to_string(),
        ]);
        ids
    }
}

fn quality(resolution: &str, bitrate: u32, codec: &str) -> StreamQuality {
    StreamQuality {
        resolution: resolution.into(),
        bitrate,
        url: String::new(),
        codec: codec.into(),
    }
}

fn program(title: &str, description: &str, hours: i64, category: &str) -> ProgramBlock {
    let now = Utc::now();
    ProgramBlock {
        title: title.into(),
        description: description.into(),
        start_time: now,
        end_time: now + ChronoDuration::hours(hours),
        is_live: true,
        category: category.into(),
    }
}

fn logo(file: &str) -> String {
    format!("https://storage.googleapis.com/workspace-generated-images/{file}")
}

fn seed_channels() -> Vec<ChannelDescriptor> {
    vec![
        ChannelDescriptor {
            id: "star-sports-1".into(),
            name: "Star Sports 1 HD".into(),
            description: "Official India cricket broadcaster".into(),
            category: "cricket".into(),
            country: "in".into(),
            logo: logo("star-sports.png"),
            stream_url: "https://jiocinema.com/sports/cricket/live".into(),
            backup_stream_url: Some("https://www.hotstar.com/in/sports/cricket".into()),
            is_live: true,
            quality: vec![
                quality("1080p", 8000, "h264"),
                quality("720p", 4000, "h264"),
                quality("480p", 2000, "h264"),
            ],
            languages: vec!["Hindi".into(), "English".into()],
            current_program: Some(program(
                "India vs Pakistan LIVE",
                "T20 International Cricket Match",
                4,
                "Cricket",
            )),
            viewer_count: 2_500_000,
            tags: vec![
                "cricket".into(),
                "live".into(),
                "india".into(),
                "pakistan".into(),
                "official".into(),
            ],
        },
        ChannelDescriptor {
            id: "ptv-sports".into(),
            name: "PTV Sports HD".into(),
            description: "Pakistan national sports broadcaster".into(),
            category: "cricket".into(),
            country: "pk".into(),
            logo: logo("ptv-sports.png"),
            stream_url: "https://www.ptvsports.tv/live".into(),
            backup_stream_url: None,
            is_live: true,
            quality: vec![quality("1080p", 7000, "h264"), quality("720p", 3500, "h264")],
            languages: vec!["Urdu".into(), "English".into()],
            current_program: Some(program(
                "Pakistan vs India LIVE",
                "T20 International Cricket Match",
                4,
                "Cricket",
            )),
            viewer_count: 1_800_000,
            tags: vec![
                "cricket".into(),
                "live".into(),
                "pakistan".into(),
                "india".into(),
                "official".into(),
            ],
        },
        ChannelDescriptor {
            id: "sky-sports-cricket".into(),
            name: "Sky Sports Cricket".into(),
            description: "UK premium cricket coverage".into(),
            category: "cricket".into(),
            country: "global".into(),
            logo: logo("sky-sports.png"),
            stream_url: "https://www.skysports.com/watch/live-cricket".into(),
            backup_stream_url: None,
            is_live: true,
            quality: vec![
                quality("4K", 15000, "h265"),
                quality("1080p", 8000, "h264"),
                quality("720p", 4000, "h264"),
            ],
            languages: vec!["English".into()],
            current_program: Some(program(
                "India vs Pakistan LIVE",
                "T20 International - Premium Coverage",
                4,
                "Cricket",
            )),
            viewer_count: 950_000,
            tags: vec![
                "cricket".into(),
                "live".into(),
                "premium".into(),
                "4k".into(),
                "english".into(),
            ],
        },
        ChannelDescriptor {
            id: "willow-tv".into(),
            name: "Willow TV HD".into(),
            description: "Dedicated cricket channel for diaspora".into(),
            category: "cricket".into(),
            country: "global".into(),
            logo: logo("willow-tv.png"),
            stream_url: "https://www.willow.tv/live".into(),
            backup_stream_url: None,
            is_live: true,
            quality: vec![quality("1080p", 6000, "h264"), quality("720p", 3000, "h264")],
            languages: vec!["English".into(), "Hindi".into()],
            current_program: Some(program(
                "IND vs PAK T20 LIVE",
                "Complete match coverage with expert commentary",
                4,
                "Cricket",
            )),
            viewer_count: 680_000,
            tags: vec!["cricket".into(), "live".into(), "diaspora".into(), "subscription".into()],
        },
        ChannelDescriptor {
            id: "sony-liv".into(),
            name: "Sony LIV Sports".into(),
            description: "Sony's premium sports streaming".into(),
            category: "sports".into(),
            country: "in".into(),
            logo: logo("sony-liv.png"),
            stream_url: "https://www.sonyliv.com/sports/cricket".into(),
            backup_stream_url: None,
            is_live: true,
            quality: vec![quality("1080p", 8000, "h264"), quality("720p", 4000, "h264")],
            languages: vec![
                "Hindi".into(),
                "English".into(),
                "Tamil".into(),
                "Telugu".into(),
            ],
            current_program: Some(program(
                "Cricket LIVE - Multiple Matches",
                "Premium cricket coverage",
                6,
                "Sports",
            )),
            viewer_count: 1_200_000,
            tags: vec![
                "sports".into(),
                "cricket".into(),
                "premium".into(),
                "multilingual".into(),
            ],
        },
        ChannelDescriptor {
            id: "youtube-cricket".into(),
            name: "Cricket Official YouTube".into(),
            description: "Free official cricket streams".into(),
            category: "cricket".into(),
            country: "global".into(),
            logo: logo("youtube-cricket.png"),
            stream_url: "https://www.youtube.com/c/cricket/live".into(),
            backup_stream_url: None,
            is_live: true,
            quality: vec![
                quality("1080p", 5000, "h264"),
                quality("720p", 2500, "h264"),
                quality("480p", 1000, "h264"),
            ],
            languages: vec!["English".into()],
            current_program: Some(program(
                "IND vs PAK Highlights & Live",
                "Free cricket content and live streams",
                8,
                "Cricket",
            )),
            viewer_count: 3_200_000,
            tags: vec!["cricket".into(), "free".into(), "highlights".into(), "youtube".into()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_channels_all_seeded_live() {
        let catalog = ChannelCatalog::new();
        assert_eq!(catalog.live_channels().len(), 6);
    }

    #[test]
    fn test_category_filter() {
        let catalog = ChannelCatalog::new();
        let cricket = catalog.channels_by_category("cricket");
        assert_eq!(cricket.len(), 5);
        assert!(cricket.iter().all(|c| c.category == "cricket"));
        assert_eq!(catalog.channels_by_category("news").len(), 0);
    }

    #[test]
    fn test_country_filter_includes_global() {
        let catalog = ChannelCatalog::new();
        let indian = catalog.channels_by_country("in");
        assert!(indian.iter().any(|c| c.id == "star-sports-1"));
        assert!(indian.iter().any(|c| c.id == "sky-sports-cricket"));
        assert!(!indian.iter().any(|c| c.id == "ptv-sports"));
    }

    #[test]
    fn test_search_matches_tags_and_names() {
        let catalog = ChannelCatalog::new();
        assert!(!catalog.search("willow").is_empty());
        assert!(!catalog.search("DIASPORA").is_empty());
        assert!(catalog.search("curling").is_empty());
    }

    #[test]
    fn test_channel_by_id() {
        let catalog = ChannelCatalog::new();
        assert!(catalog.channel_by_id("ptv-sports").is_some());
        assert!(catalog.channel_by_id("missing").is_none());
    }

    #[test]
    fn test_categories_cover_four_blocks() {
        let catalog = ChannelCatalog::new();
        let cats = catalog.categories();
        assert_eq!(cats.len(), 4);
        assert!(cats.iter().all(|c| !c.channels.is_empty()));
    }

    #[test]
    fn test_channels_for_match_assignment() {
        let catalog = ChannelCatalog::new();
        let ids = catalog.channels_for_match("India", "Pakistan");
        assert!(ids.contains(&"star-sports-1".to_string()));
        assert!(ids.contains(&"sony-liv".to_string()));
        assert!(ids.contains(&"ptv-sports".to_string()));
        assert!(ids.contains(&"willow-tv".to_string()));

        let ids = catalog.channels_for_match("England", "Australia");
        assert_eq!(ids.len(), 3); // only the global channels
    }
}
