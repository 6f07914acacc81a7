//! Feed snapshot cache.
//!
//! One background task periodically rebuilds the ranked stream and publishes
//! it through a watch channel. Readers clone the current `Arc` and never
//! block the refresher.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::graph::{Result, SocialGraph};
use crate::models::Post;
use crate::store::ScoreBound;

/// Default interval between feed rebuilds.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Ranked root posts with their reply trees.
pub type FeedSnapshot = Arc<Vec<Post>>;

/// Holds the latest feed snapshot.
#[derive(Debug)]
pub struct FeedCache {
    tx: watch::Sender<FeedSnapshot>,
}

impl FeedCache {
    /// Create a cache holding an empty snapshot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { tx }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.tx.subscribe()
    }

    /// Rebuild the stream from the ranked set and publish it.
    ///
    /// Returns the number of root posts published. On error nothing is
    /// published.
    pub async fn refresh(&self, graph: &SocialGraph) -> Result<usize> {
        let ids = graph
            .ranked_post_ids(ScoreBound::NegInf, ScoreBound::PosInf)
            .await?;
        let posts = graph.get_thread(&ids).await?;
        let count = posts.len();
        self.tx.send_replace(Arc::new(posts));
        Ok(count)
    }

    /// Start the refresher. It runs until `cancel` fires.
    pub fn spawn(
        self: &Arc<Self>,
        graph: SocialGraph,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            info!(interval_ms = every.as_millis() as u64, "feed refresher started");
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        match cache.refresh(&graph).await {
                            Ok(count) => debug!(posts = count, "feed refreshed"),
                            Err(e) => warn!(error = %e, "feed refresh failed, keeping previous snapshot"),
                        }
                    }
                }
            }
            info!("feed refresher stopped");
        })
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}
