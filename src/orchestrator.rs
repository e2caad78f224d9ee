use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::feeds::MatchFeeds;
use crate::models::{ChatMessage, CommentaryEntry, MatchSnapshot, MatchStatsBundle, MatchStatus};
use crate::scheduler::{IntervalScheduler, TickFn};

/// Polling periods per feed. Snapshot is the slowest, chat the fastest;
/// statistics are fetched once at startup and on manual refetch only.
#[derive(Debug, Clone, Copy)]
pub struct Cadences {
    pub snapshot: Duration,
    pub commentary: Duration,
    pub chat: Duration,
}

/// Aggregate view-state exposed to consumers. One writer (the scheduled
/// fetch callbacks), one logical reader (the API layer). Each slot is
/// replaced wholesale by its own feed's completion.
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub match_data: Option<MatchSnapshot>,
    pub commentary: Vec<CommentaryEntry>,
    pub stats: Option<MatchStatsBundle>,
    pub chat: Vec<ChatMessage>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_update: DateTime<Utc>,
}

impl Default for MatchView {
    fn default() -> Self {
        MatchView {
            match_data: None,
            commentary: Vec::new(),
            stats: None,
            chat: Vec::new(),
            loading: false,
            error: None,
            last_update: Utc::now(),
        }
    }
}

struct Timers {
    snapshot: Mutex<IntervalScheduler>,
    commentary: Mutex<IntervalScheduler>,
    chat: Mutex<IntervalScheduler>,
}

impl Timers {
    /// Transition guard for the only-poll-while-live rule: a live snapshot
    /// runs all timers, anything else stops them.
    fn sync(&self, status: Option<MatchStatus>) {
        let live = status == Some(MatchStatus::Live);
        for timer in [&self.snapshot, &self.commentary, &self.chat] {
            let mut t = timer.lock().unwrap();
            if live {
                t.start();
            } else {
                t.stop();
            }
        }
    }

    fn any_running(&self) -> bool {
        [&self.snapshot, &self.commentary, &self.chat]
            .iter()
            .any(|t| t.lock().unwrap().is_running())
    }
}

/// Composes the per-feed schedulers over the feed resolver and owns the
/// aggregate view-state.
///
/// Overlapping fetches of the same feed are not fenced: the later-completing
/// call wins by completion time. Under normal cadence each feed has a single
/// in-flight fetch, so the race only arises when a manual refetch overlaps a
/// slow tick.
pub struct LiveMatchOrchestrator<F: MatchFeeds + 'static> {
    feeds: Arc<F>,
    view: Arc<RwLock<MatchView>>,
    timers: Arc<Timers>,
}

impl<F: MatchFeeds + 'static> LiveMatchOrchestrator<F> {
    pub fn new(feeds: Arc<F>, cadences: Cadences) -> Self {
        LiveMatchOrchestrator {
            feeds,
            view: Arc::new(RwLock::new(MatchView::default())),
            timers: Arc::new(Timers {
                snapshot: Mutex::new(IntervalScheduler::new("snapshot", cadences.snapshot)),
                commentary: Mutex::new(IntervalScheduler::new("commentary", cadences.commentary)),
                chat: Mutex::new(IntervalScheduler::new("chat", cadences.chat)),
            }),
        }
    }

    /// Shared handle for the API layer.
    pub fn view_handle(&self) -> Arc<RwLock<MatchView>> {
        Arc::clone(&self.view)
    }

    /// Initial fetch of every feed (including the one-time statistics
    /// fetch), then install the scheduled per-feed refreshes.
    pub async fn start(&self) {
        self.install_operations();
        self.refetch_all().await;
        info!(
            "Orchestrator started (polling {})",
            if self.timers.any_running() { "active" } else { "idle until live" }
        );
    }

    /// Concurrently resolve every feed. Each slot updates as its own fetch
    /// completes; `loading` covers the whole fan-out.
    pub async fn refetch_all(&self) {
        self.view.write().await.loading = true;
        tokio::join!(
            Self::refresh_snapshot(&self.feeds, &self.view),
            Self::refresh_commentary(&self.feeds, &self.view),
            Self::refresh_stats(&self.feeds, &self.view),
            Self::refresh_chat(&self.feeds, &self.view),
        );
        self.view.write().await.loading = false;
        self.timers.sync(Self::current_status(&self.view).await);
    }

    async fn current_status(view: &RwLock<MatchView>) -> Option<MatchStatus> {
        view.read().await.match_data.as_ref().map(|m| m.status)
    }

    /// Snapshot failures are the single user-visible error; the last good
    /// snapshot stays on display.
    async fn refresh_snapshot(feeds: &F, view: &RwLock<MatchView>) {
        match feeds.live_match().await {
            Ok(snapshot) => {
                let mut v = view.write().await;
                v.match_data = Some(snapshot);
                v.last_update = Utc::now();
                v.error = None;
            }
            Err(e) => {
                error!("Error fetching match data: {}", e);
                view.write().await.error = Some("Failed to fetch live match data".to_string());
            }
        }
    }

    async fn refresh_commentary(feeds: &F, view: &RwLock<MatchView>) {
        match feeds.commentary().await {
            Ok(entries) => view.write().await.commentary = entries,
            Err(e) => warn!("Error fetching commentary: {}", e),
        }
    }

    async fn refresh_stats(feeds: &F, view: &RwLock<MatchView>) {
        match feeds.match_stats().await {
            Ok(stats) => view.write().await.stats = Some(stats),
            Err(e) => warn!("Error fetching match stats: {}", e),
        }
    }

    async fn refresh_chat(feeds: &F, view: &RwLock<MatchView>) {
        match feeds.live_chat().await {
            Ok(messages) => view.write().await.chat = messages,
            Err(e) => warn!("Error fetching live chat: {}", e),
        }
    }

    fn install_operations(&self) {
        // Snapshot tick also re-syncs the gates, so a match going completed
        // shuts the polling down without a manual refetch.
        let feeds = Arc::clone(&self.feeds);
        let view = Arc::clone(&self.view);
        let timers = Arc::clone(&self.timers);
        let snapshot_op: TickFn = Arc::new(move || {
            let feeds = Arc::clone(&feeds);
            let view = Arc::clone(&view);
            let timers = Arc::clone(&timers);
            Box::pin(async move {
                if Self::current_status(&view).await != Some(MatchStatus::Live) {
                    return;
                }
                Self::refresh_snapshot(&feeds, &view).await;
                timers.sync(Self::current_status(&view).await);
            })
        });
        self.timers.snapshot.lock().unwrap().set_operation(snapshot_op);

        let feeds = Arc::clone(&self.feeds);
        let view = Arc::clone(&self.view);
        let commentary_op: TickFn = Arc::new(move || {
            let feeds = Arc::clone(&feeds);
            let view = Arc::clone(&view);
            Box::pin(async move {
                if Self::current_status(&view).await != Some(MatchStatus::Live) {
                    return;
                }
                Self::refresh_commentary(&feeds, &view).await;
            })
        });
        self.timers.commentary.lock().unwrap().set_operation(commentary_op);

        let feeds = Arc::clone(&self.feeds);
        let view = Arc::clone(&self.view);
        let chat_op: TickFn = Arc::new(move || {
            let feeds = Arc::clone(&feeds);
            let view = Arc::clone(&view);
            Box::pin(async move {
                if Self::current_status(&view).await != Some(MatchStatus::Live) {
                    return;
                }
                Self::refresh_chat(&feeds, &view).await;
            })
        });
        self.timers.chat.lock().unwrap().set_operation(chat_op);
    }

    /// Whether any feed timer is currently running.
    pub fn polling_active(&self) -> bool {
        self.timers.any_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::feeds::{synth, FeedError};

    #[derive(Default)]
    struct MockFeeds {
        fail_snapshot: AtomicBool,
        fail_chat: AtomicBool,
        status: Mutex<Option<MatchStatus>>,
        snapshot_tag: Mutex<String>,
    }

    impl MockFeeds {
        fn live() -> Self {
            let f = MockFeeds::default();
            *f.status.lock().unwrap() = Some(MatchStatus::Live);
            *f.snapshot_tag.lock().unwrap() = "first".into();
            f
        }
    }

    #[async_trait]
    impl MatchFeeds for MockFeeds {
        async fn live_match(&self) -> Result<MatchSnapshot, FeedError> {
            if self.fail_snapshot.load(Ordering::SeqCst) {
                return Err(FeedError::Exhausted { feed: "live-match" });
            }
            let mut snap = synth::SimState::seed().snapshot;
            snap.id = self.snapshot_tag.lock().unwrap().clone();
            if let Some(status) = *self.status.lock().unwrap() {
                snap.status = status;
            }
            Ok(snap)
        }

        async fn commentary(&self) -> Result<Vec<CommentaryEntry>, FeedError> {
            let mut entries = synth::fallback_commentary();
            entries.reverse();
            Ok(entries)
        }

        async fn match_stats(&self) -> Result<MatchStatsBundle, FeedError> {
            Ok(synth::fallback_stats())
        }

        async fn live_chat(&self) -> Result<Vec<ChatMessage>, FeedError> {
            if self.fail_chat.load(Ordering::SeqCst) {
                return Err(FeedError::Exhausted { feed: "chat" });
            }
            Ok(synth::fallback_chat())
        }
    }

    fn cadences() -> Cadences {
        Cadences {
            snapshot: Duration::from_secs(30),
            commentary: Duration::from_secs(15),
            chat: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_refetch_all_populates_every_slot() {
        let feeds = Arc::new(MockFeeds::live());
        let orch = LiveMatchOrchestrator::new(Arc::clone(&feeds), cadences());
        orch.start().await;

        let view = orch.view_handle();
        let v = view.read().await;
        assert!(v.match_data.is_some());
        assert_eq!(v.commentary.len(), 3);
        assert!(v.stats.is_some());
        assert_eq!(v.chat.len(), 3);
        assert!(!v.loading);
        assert!(v.error.is_none());
    }

    #[tokio::test]
    async fn test_commentary_arrives_newest_first() {
        let feeds = Arc::new(MockFeeds::live());
        let orch = LiveMatchOrchestrator::new(feeds, cadences());
        orch.refetch_all().await;

        let view = orch.view_handle();
        let v = view.read().await;
        assert_eq!((v.commentary[0].over, v.commentary[0].ball), (8, 2));
        assert_eq!((v.commentary[1].over, v.commentary[1].ball), (8, 1));
        assert_eq!((v.commentary[2].over, v.commentary[2].ball), (7, 6));
    }

    #[tokio::test]
    async fn test_snapshot_failure_keeps_stale_data_and_sets_error() {
        let feeds = Arc::new(MockFeeds::live());
        let orch = LiveMatchOrchestrator::new(Arc::clone(&feeds), cadences());
        orch.refetch_all().await;

        feeds.fail_snapshot.store(true, Ordering::SeqCst);
        *feeds.snapshot_tag.lock().unwrap() = "second".into();
        orch.refetch_all().await;

        let view = orch.view_handle();
        let v = view.read().await;
        let snap = v.match_data.as_ref().expect("stale snapshot blanked");
        assert_eq!(snap.id, "first");
        assert_eq!(v.error.as_deref(), Some("Failed to fetch live match data"));
        assert!(!v.loading);
        // Non-snapshot feeds still updated around the failure.
        assert_eq!(v.commentary.len(), 3);
    }

    #[tokio::test]
    async fn test_error_clears_on_next_success() {
        let feeds = Arc::new(MockFeeds::live());
        let orch = LiveMatchOrchestrator::new(Arc::clone(&feeds), cadences());

        feeds.fail_snapshot.store(true, Ordering::SeqCst);
        orch.refetch_all().await;
        assert!(orch.view_handle().read().await.error.is_some());

        feeds.fail_snapshot.store(false, Ordering::SeqCst);
        orch.refetch_all().await;
        assert!(orch.view_handle().read().await.error.is_none());
    }

    #[tokio::test]
    async fn test_chat_failure_degrades_silently() {
        let feeds = Arc::new(MockFeeds::live());
        let orch = LiveMatchOrchestrator::new(Arc::clone(&feeds), cadences());
        orch.refetch_all().await;

        feeds.fail_chat.store(true, Ordering::SeqCst);
        orch.refetch_all().await;

        let view = orch.view_handle();
        let v = view.read().await;
        assert!(v.error.is_none(), "chat failure must not be user-visible");
        assert_eq!(v.chat.len(), 3, "chat slot must keep its prior value");
    }

    #[tokio::test]
    async fn test_polling_gated_on_live_status() {
        let feeds = Arc::new(MockFeeds::live());
        let orch = LiveMatchOrchestrator::new(Arc::clone(&feeds), cadences());
        orch.start().await;
        assert!(orch.polling_active());

        *feeds.status.lock().unwrap() = Some(MatchStatus::Completed);
        orch.refetch_all().await;
        assert!(!orch.polling_active(), "timers must stop for a finished match");

        *feeds.status.lock().unwrap() = Some(MatchStatus::Live);
        orch.refetch_all().await;
        assert!(orch.polling_active());
    }

    #[tokio::test]
    async fn test_upcoming_match_does_not_poll() {
        let feeds = Arc::new(MockFeeds::live());
        *feeds.status.lock().unwrap() = Some(MatchStatus::Upcoming);
        let orch = LiveMatchOrchestrator::new(feeds, cadences());
        orch.start().await;
        assert!(!orch.polling_active());
    }

    #[tokio::test]
    async fn test_last_update_tracks_snapshot_success() {
        let feeds = Arc::new(MockFeeds::live());
        let orch = LiveMatchOrchestrator::new(Arc::clone(&feeds), cadences());
        orch.refetch_all().await;
        let first = orch.view_handle().read().await.last_update;

        feeds.fail_snapshot.store(true, Ordering::SeqCst);
        orch.refetch_all().await;
        let second = orch.view_handle().read().await.last_update;
        assert_eq!(first, second, "failed snapshot fetch must not move last_update");
    }
}
