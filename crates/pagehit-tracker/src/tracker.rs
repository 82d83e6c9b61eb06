use std::{future::Future, sync::Arc};

use tokio::{sync::Mutex, time::MissedTickBehavior};
use tracing::{debug, error, info};

use pagehit_core::{
    build_hit,
    config::Config,
    event::{Hit, HitOptions},
    BotFilter, ClientClassifier, HitRequest, Store, WootheeClassifier,
};

/// Runs the gate-then-build pipeline for incoming requests and hands the
/// resulting hits to a [`Store`] in batches.
///
/// Everything except the buffer is immutable after construction, so a single
/// `Arc<Tracker>` can serve any number of concurrent requests.
pub struct Tracker {
    store: Arc<dyn Store>,

    /// Loaded once at startup. Holds the salt and the default hit options.
    config: Arc<Config>,

    default_options: HitOptions,
    bot_filter: BotFilter,
    classifier: Arc<dyn ClientClassifier>,

    /// In-memory hit buffer.
    ///
    /// Lock, drain, release, then save. The lock is held only long enough to
    /// `std::mem::take` the buffer so a slow store does not block requests.
    buffer: Mutex<Vec<Hit>>,
}

impl Tracker {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            default_options: config.hit_options(),
            bot_filter: BotFilter::new(config.bot_tokens()),
            config: Arc::new(config),
            classifier: Arc::new(WootheeClassifier::new()),
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Replace the `User-Agent` classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn ClientClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the bot filter built from the configuration.
    pub fn with_bot_filter(mut self, bot_filter: BotFilter) -> Self {
        self.bot_filter = bot_filter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Record a page view for `request` unless the bot filter rejects it.
    ///
    /// `options` falls back to the options derived from the configuration.
    /// Returns `true` if a hit was buffered.
    pub async fn hit(&self, request: &HitRequest<'_>, options: Option<&HitOptions>) -> bool {
        if self.bot_filter.should_ignore(request.headers()) {
            return false;
        }

        let options = options.unwrap_or(&self.default_options);
        let hit = build_hit(request, &self.config.salt, options, self.classifier.as_ref());
        if self.enqueue(hit).await >= self.config.buffer_max_size {
            self.flush().await;
        }
        true
    }

    /// Buffer `hit`, returning the new buffer length.
    async fn enqueue(&self, hit: Hit) -> usize {
        let mut buffer = self.buffer.lock().await;
        buffer.push(hit);
        buffer.len()
    }

    /// Number of hits waiting for the next flush.
    pub async fn buffered(&self) -> usize {
        self.buffer.lock().await.len()
    }

    /// Hand every buffered hit to the store and return how many it accepted.
    ///
    /// A rejected batch is logged and dropped, it is not retried.
    pub async fn flush(&self) -> usize {
        let batch = std::mem::take(&mut *self.buffer.lock().await);
        if batch.is_empty() {
            return 0;
        }

        if let Err(e) = self.store.save_hits(&batch).await {
            error!(count = batch.len(), error = %e, "Store rejected hits, batch dropped");
            return 0;
        }
        debug!(count = batch.len(), "Buffered hits saved");
        batch.len()
    }

    /// Flush every `config.flush_interval()` until `shutdown` resolves, then
    /// flush once more so nothing buffered is lost.
    ///
    /// Pass `std::future::pending()` to run for the life of the process.
    pub async fn run_flush_loop<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.config.flush_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);
        info!(interval_ms = self.config.flush_interval_ms, "Hit flush loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush().await;
                }
                () = &mut shutdown => break,
            }
        }

        let saved = self.flush().await;
        info!(saved, "Hit flush loop stopped");
    }
}
