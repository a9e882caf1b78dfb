//! Tone scheduler.
//!
//! `SchedulerCore` is the pure state machine: Idle -> Delaying -> Sounding
//! -> Idle, driven by requests and by a single timer event type tagged
//! with which timer elapsed. `ToneScheduler` runs the core inside a tokio
//! task that owns the timers, the route selector and the audio output, and
//! is reached only through its mailbox.

use super::{AfterBlowDelay, AlarmConfig, AlarmError, AlarmEvent, RequestOutcome, SchedulerState};
use crate::audio::{
    AcousticProfile, AudioOutput, ConnectivityProbe, OutputRoute, RouteSelector, ToneCatalog,
    ToneId,
};
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Sleep;

/// Mailbox depth for pending requests.
const COMMAND_CAPACITY: usize = 16;

/// Which timer elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// The after-blow delay is over
    DelayElapsed,
    /// The tone has sounded for its full duration
    DurationElapsed,
}

/// A timer the state machine wants armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub kind: TimerKind,
    pub after: Duration,
}

/// Everything one cycle needs, fixed when it is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePlan {
    pub tone: ToneId,
    pub delay: AfterBlowDelay,
    pub route: OutputRoute,
    pub profile: AcousticProfile,
}

/// Outcome of feeding a timer event to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Start the tone, then arm `then`
    Sound { plan: CyclePlan, then: ArmedTimer },
    /// Cycle finished
    Complete(CyclePlan),
    /// Event did not match the current state
    Ignored,
}

/// Pure scheduler state machine.
#[derive(Debug, Default)]
pub struct SchedulerCore {
    state: SchedulerState,
    cycle: Option<CyclePlan>,
}

impl SchedulerCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle
    }

    /// The cycle in flight, if any.
    pub fn current(&self) -> Option<&CyclePlan> {
        self.cycle.as_ref()
    }

    /// Start a cycle. Returns the delay timer to arm, or `None` when a
    /// cycle is already in flight.
    pub fn arm(&mut self, plan: CyclePlan) -> Option<ArmedTimer> {
        if !self.is_idle() {
            return None;
        }

        self.state = SchedulerState::Delaying;
        self.cycle = Some(plan);

        Some(ArmedTimer {
            kind: TimerKind::DelayElapsed,
            after: plan.delay.as_duration(),
        })
    }

    /// Advance on a timer event.
    pub fn on_timer(&mut self, kind: TimerKind) -> Step {
        match (self.state, kind, self.cycle) {
            (SchedulerState::Delaying, TimerKind::DelayElapsed, Some(plan)) => {
                self.state = SchedulerState::Sounding;
                Step::Sound {
                    plan,
                    then: ArmedTimer {
                        kind: TimerKind::DurationElapsed,
                        after: plan.profile.duration(),
                    },
                }
            }
            (SchedulerState::Sounding, TimerKind::DurationElapsed, Some(plan)) => {
                self.state = SchedulerState::Idle;
                self.cycle = None;
                Step::Complete(plan)
            }
            _ => Step::Ignored,
        }
    }
}

/// Messages accepted by the scheduler task.
#[derive(Debug)]
enum Command {
    Request {
        tone: ToneId,
        delay: AfterBlowDelay,
        reply: oneshot::Sender<RequestOutcome>,
    },
}

/// Handle to a running tone scheduler.
#[derive(Debug, Clone)]
pub struct ToneScheduler {
    commands: mpsc::Sender<Command>,
    state_rx: watch::Receiver<SchedulerState>,
    event_tx: broadcast::Sender<AlarmEvent>,
}

impl ToneScheduler {
    /// Spawn the scheduler task on the current tokio runtime.
    ///
    /// The task keeps running until every handle is dropped and any cycle
    /// in flight has completed.
    pub fn spawn<P, O>(
        selector: RouteSelector<P>,
        catalog: ToneCatalog,
        output: O,
        config: &AlarmConfig,
    ) -> Self
    where
        P: ConnectivityProbe + 'static,
        O: AudioOutput + 'static,
    {
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let actor = SchedulerActor {
            core: SchedulerCore::new(),
            timer: None,
            commands: command_rx,
            selector,
            catalog,
            output,
            state_tx,
            event_tx: event_tx.clone(),
        };
        tokio::spawn(actor.run());

        tracing::info!("Tone scheduler started");

        Self {
            commands,
            state_rx,
            event_tx,
        }
    }

    /// Request a tone after `delay`.
    ///
    /// Resolves once the scheduler has either armed the cycle or dropped
    /// the request because another cycle is in flight.
    pub async fn request(
        &self,
        tone: ToneId,
        delay: AfterBlowDelay,
    ) -> Result<RequestOutcome, AlarmError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Request { tone, delay, reply })
            .await
            .map_err(|_| AlarmError::SchedulerStopped)?;
        outcome.await.map_err(|_| AlarmError::SchedulerStopped)
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    /// Whether a cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.state() != SchedulerState::Idle
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.state_rx.clone()
    }

    /// Subscribe to alarm events
    pub fn subscribe_events(&self) -> broadcast::Receiver<AlarmEvent> {
        self.event_tx.subscribe()
    }

    /// Wait until the scheduler is idle.
    pub async fn wait_idle(&self) -> Result<(), AlarmError> {
        let mut rx = self.state_rx.clone();
        rx.wait_for(|state| *state == SchedulerState::Idle)
            .await
            .map(|_| ())
            .map_err(|_| AlarmError::SchedulerStopped)
    }
}

struct PendingTimer {
    kind: TimerKind,
    sleep: Pin<Box<Sleep>>,
}

enum Next {
    Timer(TimerKind),
    Command(Option<Command>),
}

struct SchedulerActor<P, O> {
    core: SchedulerCore,
    timer: Option<PendingTimer>,
    commands: mpsc::Receiver<Command>,
    selector: RouteSelector<P>,
    catalog: ToneCatalog,
    output: O,
    state_tx: watch::Sender<SchedulerState>,
    event_tx: broadcast::Sender<AlarmEvent>,
}

impl<P: ConnectivityProbe, O: AudioOutput> SchedulerActor<P, O> {
    async fn run(mut self) {
        let mut open = true;

        loop {
            // Timers first so a cycle completes before queued requests are seen
            let next = tokio::select! {
                biased;
                kind = next_timer(&mut self.timer) => Next::Timer(kind),
                command = self.commands.recv(), if open => Next::Command(command),
            };

            match next {
                Next::Timer(kind) => self.on_timer(kind),
                Next::Command(Some(command)) => self.on_command(command).await,
                Next::Command(None) => open = false,
            }

            if !open && self.timer.is_none() {
                break;
            }
        }

        tracing::info!("Tone scheduler stopped");
    }

    async fn on_command(&mut self, command: Command) {
        match command {
            Command::Request { tone, delay, reply } => {
                let outcome = self.on_request(tone, delay).await;
                // Caller may have given up waiting
                let _ = reply.send(outcome);
            }
        }
    }

    async fn on_request(&mut self, tone: ToneId, delay: AfterBlowDelay) -> RequestOutcome {
        if !self.core.is_idle() {
            tracing::debug!(
                "Dropping request for {} ({}) while {}",
                tone,
                delay,
                self.core.state()
            );
            self.emit(AlarmEvent::RequestDropped { tone, delay });
            return RequestOutcome::Dropped;
        }

        let route = self.selector.select_route().await;
        let profile = self.catalog.resolve(tone);
        let plan = CyclePlan {
            tone,
            delay,
            route,
            profile,
        };

        let Some(timer) = self.core.arm(plan) else {
            return RequestOutcome::Dropped;
        };

        tracing::info!("Armed {} tone on {} after {}", tone, route, delay);
        self.arm(timer);
        self.publish_state();
        self.emit(AlarmEvent::CycleArmed { tone, delay, route });

        RequestOutcome::Accepted
    }

    fn on_timer(&mut self, kind: TimerKind) {
        match self.core.on_timer(kind) {
            Step::Sound { plan, then } => {
                self.publish_state();

                match self.output.emit_tone(plan.profile, plan.route) {
                    Ok(()) => {
                        tracing::debug!("{} tone started on {}", plan.tone, plan.route);
                        self.emit(AlarmEvent::ToneStarted {
                            tone: plan.tone,
                            route: plan.route,
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Could not play {} tone: {}", plan.tone, e);
                        self.emit(AlarmEvent::PlaybackFailed {
                            tone: plan.tone,
                            message: e.to_string(),
                        });
                    }
                }

                // Armed regardless of playback so the cycle always completes
                self.arm(then);
            }
            Step::Complete(plan) => {
                self.publish_state();
                tracing::info!("{} tone cycle complete", plan.tone);
                self.emit(AlarmEvent::CycleCompleted { tone: plan.tone });
            }
            Step::Ignored => {
                tracing::debug!("Ignoring {:?} in state {}", kind, self.core.state());
            }
        }
    }

    fn arm(&mut self, timer: ArmedTimer) {
        self.timer = Some(PendingTimer {
            kind: timer.kind,
            sleep: Box::pin(tokio::time::sleep(timer.after)),
        });
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.core.state());
    }

    fn emit(&self, event: AlarmEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

/// Resolve when the pending timer fires; never resolves without one.
async fn next_timer(timer: &mut Option<PendingTimer>) -> TimerKind {
    let Some(pending) = timer.as_mut() else {
        return std::future::pending().await;
    };

    pending.sleep.as_mut().await;
    let kind = pending.kind;
    *timer = None;
    kind
}
