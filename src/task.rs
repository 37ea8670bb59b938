//! Timer loops that drive the animator and the feed.
//!
//! Each component runs as one tokio task that owns its state. The task keeps exactly one
//! pending timer, schedules the next tick only after the current one is published, and exits
//! when its handle is shut down or dropped.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::feed::{FeedSnapshot, SampleFeed};
use crate::model::Coordinate;
use crate::route::RouteAnimator;

/// Handle to a running route animation. Dropping it cancels the task.
pub struct AnimatorHandle {
    route: Arc<[Coordinate]>,
    position: watch::Receiver<Coordinate>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl AnimatorHandle {
    /// Position stream. Holds the latest interpolated coordinate.
    pub fn subscribe(&self) -> watch::Receiver<Coordinate> {
        self.position.clone()
    }

    pub fn position(&self) -> Coordinate {
        *self.position.borrow()
    }

    /// Waypoints the task is animating along.
    pub fn route(&self) -> Arc<[Coordinate]> {
        self.route.clone()
    }

    /// Stop the loop and wait for the task to finish. No tick fires afterwards.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for AnimatorHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

pub fn spawn_animator(mut animator: RouteAnimator) -> AnimatorHandle {
    let route: Arc<[Coordinate]> = animator.route().waypoints().into();
    let (tx, rx) = watch::channel(animator.state().position);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let period = animator.tick_interval();

    let task = tokio::spawn(async move {
        loop {
            let position = animator.advance();
            tx.send_replace(position);
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                _ = sleep(period) => {}
            }
        }
        tracing::debug!("route animator stopped");
    });

    AnimatorHandle {
        route,
        position: rx,
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    Start,
    Stop,
    Toggle,
    Reset,
}

/// Commands waiting for the feed task beyond this are dropped.
pub const COMMAND_QUEUE_CAPACITY: usize = 16;

/// Cloneable sender for feed commands. Holds no feed state itself.
#[derive(Clone)]
pub struct FeedControl {
    tx: mpsc::Sender<FeedCommand>,
}

impl FeedControl {
    /// Returns false if the command was dropped: queue full or feed task gone.
    pub fn send(&self, cmd: FeedCommand) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                tracing::warn!(?cmd, "feed command queue full; command dropped");
                false
            }
            Err(TrySendError::Closed(cmd)) => {
                tracing::warn!(?cmd, "feed is no longer running; command dropped");
                false
            }
        }
    }

    pub fn start(&self) -> bool {
        self.send(FeedCommand::Start)
    }

    pub fn stop(&self) -> bool {
        self.send(FeedCommand::Stop)
    }

    pub fn toggle(&self) -> bool {
        self.send(FeedCommand::Toggle)
    }

    pub fn reset(&self) -> bool {
        self.send(FeedCommand::Reset)
    }
}

/// Handle to a running sample feed. Dropping it cancels the task.
pub struct FeedHandle {
    control: FeedControl,
    snapshots: watch::Receiver<FeedSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub fn control(&self) -> FeedControl {
        self.control.clone()
    }

    /// Sample-window stream. Holds the latest published window.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn start(&self) -> bool {
        self.control.start()
    }

    pub fn stop(&self) -> bool {
        self.control.stop()
    }

    pub fn toggle(&self) -> bool {
        self.control.toggle()
    }

    pub fn reset(&self) -> bool {
        self.control.reset()
    }

    /// Stop the loop and wait for the task to finish. No tick fires afterwards.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

pub fn spawn_feed(mut feed: SampleFeed) -> FeedHandle {
    let (tx, rx) = watch::channel(feed.snapshot());
    let (cmd_tx, mut cmd_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let period = feed.tick_interval();

    let task = tokio::spawn(async move {
        let next_tick = sleep(period);
        tokio::pin!(next_tick);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    let was_running = feed.is_running();
                    match cmd {
                        FeedCommand::Start => {
                            feed.start();
                        }
                        FeedCommand::Stop => {
                            feed.stop();
                        }
                        FeedCommand::Toggle => feed.toggle(),
                        FeedCommand::Reset => feed.reset(),
                    }
                    if !was_running && feed.is_running() {
                        // first tick one full period after resuming
                        next_tick.as_mut().reset(Instant::now() + period);
                    }
                    tracing::debug!(?cmd, running = feed.is_running(), "feed command");
                    tx.send_replace(feed.snapshot());
                }
                _ = &mut next_tick, if feed.is_running() => {
                    feed.tick();
                    tx.send_replace(feed.snapshot());
                    next_tick.as_mut().reset(Instant::now() + period);
                }
            }
        }
        tracing::debug!("sample feed stopped");
    });

    FeedHandle {
        control: FeedControl { tx: cmd_tx },
        snapshots: rx,
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}
