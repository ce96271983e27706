use crate::sink::RenderSink;
use crate::state::{DashboardState, render_snapshot};
use signaltrap_core::aggregate::Snapshot;
use signaltrap_core::config::PollConfig;
use std::future::Future;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

/// Fetches `/api/stats` on a fixed period and renders each good snapshot.
///
/// A failed tick (connect error, timeout, non-2xx, bad JSON) leaves the
/// previous render on screen; the next tick simply tries again.
pub struct Poller<S: RenderSink> {
    client: reqwest::Client,
    url: String,
    period: Duration,
    state: DashboardState,
    sink: S,
}

impl<S: RenderSink> Poller<S> {
    pub fn new(config: &PollConfig, sink: S) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            period: config.interval(),
            state: DashboardState::default(),
            sink,
        })
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn fetch(&self) -> Result<Snapshot, reqwest::Error> {
        self.client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Snapshot>()
            .await
    }

    /// One poll. Returns whether a new render was produced.
    pub async fn tick(&mut self) -> bool {
        let snapshot = match self.fetch().await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, url = %self.url, "poll: fetch failed, keeping last render");
                return false;
            }
        };

        let state = std::mem::take(&mut self.state);
        self.state = render_snapshot(state, &snapshot);
        if let Err(e) = self.sink.publish(&self.state) {
            warn!(error = %e, "poll: failed to publish render");
        }
        true
    }

    /// Poll until `shutdown` resolves. The first fetch happens immediately.
    pub async fn run<F>(mut self, shutdown: F) -> S
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(url = %self.url, period_secs = self.period.as_secs(), "Dashboard poller started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = &mut shutdown => break,
            }
        }
        info!("Dashboard poller stopped");
        self.sink
    }
}
