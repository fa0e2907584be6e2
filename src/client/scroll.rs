//! Infinite scroll: decides when the next page is requested
//!
//! [`ScrollTrigger`] is the pure decision; [`InfiniteScroll`] feeds it
//! throttled scroll positions from a background task and calls
//! [`CollectionStore::load_more`] when it fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::fetcher::PagingFetcher;
use super::store::CollectionStore;
use crate::config::ClientConfig;

/// Scroll geometry in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top
    pub offset: f64,
    /// Height of the visible area
    pub viewport: f64,
    /// Height of the whole list
    pub content: f64,
}

impl ScrollPosition {
    pub fn new(offset: f64, viewport: f64, content: f64) -> Self {
        Self {
            offset,
            viewport,
            content,
        }
    }

    /// Pixels between the bottom of the viewport and the end of the content
    pub fn distance_to_end(&self) -> f64 {
        (self.content - self.offset - self.viewport).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Armed,
    Firing,
}

#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    state: TriggerState,
    threshold_px: f64,
    cooldown: Duration,
    last_fired: Option<Instant>,
}

impl ScrollTrigger {
    pub fn new(threshold_px: f64, cooldown: Duration) -> Self {
        Self {
            state: TriggerState::Idle,
            threshold_px,
            cooldown,
            last_fired: None,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Arm when there is more to load; disarm when there is not
    pub fn arm(&mut self, has_next: bool) {
        self.state = match (self.state, has_next) {
            (TriggerState::Idle, true) => TriggerState::Armed,
            (TriggerState::Armed, false) => TriggerState::Idle,
            (state, _) => state,
        };
    }

    /// Returns `true` when a load should be requested now
    pub fn evaluate(&mut self, position: ScrollPosition, now: Instant, load_in_flight: bool) -> bool {
        if self.state != TriggerState::Armed || load_in_flight {
            return false;
        }
        if let Some(last) = self.last_fired {
            if now.saturating_duration_since(last) < self.cooldown {
                return false;
            }
        }
        if position.distance_to_end() > self.threshold_px {
            return false;
        }
        self.state = TriggerState::Firing;
        true
    }

    /// The requested load finished; start the cool-down
    pub fn fired(&mut self, now: Instant) {
        if self.state == TriggerState::Firing {
            self.state = TriggerState::Idle;
            self.last_fired = Some(now);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    pub threshold_px: f64,
    pub cooldown: Duration,
    pub throttle: Duration,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl ScrollOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            threshold_px: config.scroll_threshold_px,
            cooldown: config.scroll_cooldown(),
            throttle: config.scroll_throttle(),
        }
    }
}

/// Background task turning scroll reports into `load_more` calls.
/// Dropping the handle stops the task.
pub struct InfiniteScroll {
    positions: watch::Sender<Option<ScrollPosition>>,
    task: JoinHandle<()>,
}

impl InfiniteScroll {
    pub fn spawn<F>(store: Arc<CollectionStore<F>>, options: ScrollOptions) -> Self
    where
        F: PagingFetcher + 'static,
    {
        let (positions, mut rx) = watch::channel(None::<ScrollPosition>);

        let task = tokio::spawn(async move {
            let mut trigger = ScrollTrigger::new(options.threshold_px, options.cooldown);
            let mut throttle = tokio::time::interval(options.throttle);
            throttle.set_missed_tick_behavior(MissedTickBehavior::Skip);

            while rx.changed().await.is_ok() {
                throttle.tick().await;
                // Only the latest position matters
                let Some(position) = *rx.borrow_and_update() else {
                    continue;
                };

                trigger.arm(store.has_next().await);
                if !trigger.evaluate(position, Instant::now(), store.is_loading().await) {
                    continue;
                }

                let outcome = store.load_more().await;
                debug!(?outcome, distance = position.distance_to_end(), "Scroll trigger fired");
                trigger.fired(Instant::now());
            }
        });

        Self { positions, task }
    }

    /// Report the latest scroll position. Reports between two evaluations
    /// replace each other.
    pub fn report(&self, position: ScrollPosition) {
        self.positions.send_replace(Some(position));
    }
}

impl Drop for InfiniteScroll {
    fn drop(&mut self) {
        self.task.abort();
    }
}
