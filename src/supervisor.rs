//! Reconnection supervision.
//!
//! [`ReconnectSupervisor`] reacts to link-loss and adapter power events by
//! driving a bounded, fixed-delay retry loop against the controller. At most
//! one retry loop runs at a time; the Idle/Retrying flag is armed with an
//! atomic compare-and-set so near-simultaneous triggers cannot start two
//! loops. The loop retries with a fixed delay rather than exponential
//! backoff: the medium is binary (peer in range or not), so a short fixed
//! delay bounds downtime while the attempt cap bounds background work when
//! the peer is simply absent.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::controller::MediaController;
use crate::device::RemotePeer;
use crate::transport::LinkEvent;

/// Retry loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum connect attempts per loop.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(5000),
        }
    }
}

/// Terminal outcome reported by a retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorStatus {
    /// The controller reconnected to the named peer.
    Connected { peer: String },
    /// The attempt cap was reached without success; an external trigger or
    /// manual action is required to retry again.
    RetryExhausted,
}

impl fmt::Display for SupervisorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorStatus::Connected { peer } => write!(f, "connected to {}", peer),
            SupervisorStatus::RetryExhausted => {
                write!(f, "reconnection failed - manual retry required")
            }
        }
    }
}

/// Receiver for supervisor status notifications (fire-and-forget).
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StatusSink: Send + Sync {
    /// Called when a retry loop reaches a terminal outcome.
    async fn report(&self, status: SupervisorStatus);
}

/// No-op status sink.
pub struct NoOpSink;

#[async_trait]
impl StatusSink for NoOpSink {
    async fn report(&self, _status: SupervisorStatus) {}
}

/// Callback-based status sink.
pub struct CallbackSink<F>
where
    F: Fn(SupervisorStatus) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: Fn(SupervisorStatus) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> StatusSink for CallbackSink<F>
where
    F: Fn(SupervisorStatus) + Send + Sync,
{
    async fn report(&self, status: SupervisorStatus) {
        (self.callback)(status);
    }
}

/// Supervises the link to a single target peer.
pub struct ReconnectSupervisor {
    controller: Arc<Mutex<MediaController>>,
    target: RemotePeer,
    policy: RetryPolicy,
    sink: Arc<dyn StatusSink>,
    retrying: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
}

impl ReconnectSupervisor {
    /// Create a supervisor for the given target peer.
    pub fn new(
        controller: Arc<Mutex<MediaController>>,
        target: RemotePeer,
        policy: RetryPolicy,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            controller,
            target,
            policy,
            sink,
            retrying: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// The peer this supervisor manages.
    pub fn target(&self) -> &RemotePeer {
        &self.target
    }

    /// Whether a retry loop is currently active.
    pub fn is_retrying(&self) -> bool {
        self.retrying.load(Ordering::SeqCst)
    }

    /// Whether an event should trigger reconnection for the given target.
    ///
    /// Link loss triggers only when it names the target peer; a power-on
    /// event always does (a configured target is a construction invariant).
    /// Power-off and foreign-peer events are ignored.
    fn wants_reconnect(event: &LinkEvent, target: &RemotePeer) -> bool {
        match event {
            LinkEvent::LinkLost(address) => *address == target.address,
            LinkEvent::AdapterPowered(powered) => *powered,
            LinkEvent::LinkEstablished(_) => false,
        }
    }

    /// Feed one link event into the supervisor.
    pub fn handle_event(&self, event: LinkEvent) {
        if !Self::wants_reconnect(&event, &self.target) {
            debug!("Ignoring link event: {:?}", event);
            return;
        }
        debug!("Reconnect trigger: {:?}", event);
        self.trigger();
    }

    /// Start a retry loop unless one is already active.
    ///
    /// Arming is a compare-and-set on the Idle/Retrying flag, so a trigger
    /// arriving while a loop runs is a no-op.
    pub fn trigger(&self) {
        if self
            .retrying
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Retry loop already active, ignoring trigger");
            return;
        }

        info!("Starting reconnect loop for {}", self.target);
        let controller = Arc::clone(&self.controller);
        let target = self.target.clone();
        let policy = self.policy;
        let sink = Arc::clone(&self.sink);
        let retrying = Arc::clone(&self.retrying);
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            Self::retry_loop(controller, target, policy, sink, shutdown_rx).await;
            retrying.store(false, Ordering::SeqCst);
        });
    }

    /// One bounded retry session.
    ///
    /// The cancellation watch is checked before every attempt and during
    /// every delay; a cancelled loop exits without a terminal report.
    async fn retry_loop(
        controller: Arc<Mutex<MediaController>>,
        target: RemotePeer,
        policy: RetryPolicy,
        sink: Arc<dyn StatusSink>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        for attempt in 1..=policy.max_attempts {
            if *shutdown_rx.borrow() {
                debug!("Retry loop cancelled before attempt {}", attempt);
                return;
            }

            debug!(
                "Reconnect attempt {}/{} for {}",
                attempt, policy.max_attempts, target
            );
            let connected = {
                let mut controller = controller.lock().await;
                controller.connect(&target).await.is_ok()
            };

            if connected {
                info!("Reconnected to {} after {} attempt(s)", target, attempt);
                sink.report(SupervisorStatus::Connected {
                    peer: target.name.clone(),
                })
                .await;
                return;
            }

            if attempt == policy.max_attempts {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(policy.delay) => {}
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        debug!("Retry loop cancelled during delay");
                        return;
                    }
                }
            }
        }

        warn!(
            "Gave up reconnecting to {} after {} attempts",
            target, policy.max_attempts
        );
        sink.report(SupervisorStatus::RetryExhausted).await;
    }

    /// Pump link events until the source closes or shutdown is requested.
    ///
    /// This is the supervisor's registration with the transport event
    /// source; dropping out of this loop deregisters interest.
    pub async fn run(&self, mut events: mpsc::Receiver<LinkEvent>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        info!("Supervising link to {}", self.target);
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            debug!("Link event source closed");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }

    /// Cancel any active retry loop and tear down the connection.
    ///
    /// The cancelled loop produces no terminal report. The controller is
    /// disconnected unconditionally, regardless of its current state.
    pub async fn shutdown(&self) {
        info!("Supervisor shutting down");
        let _ = self.shutdown_tx.send(true);
        self.controller.lock().await.disconnect().await;
    }
}
