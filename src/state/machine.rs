//! Core timer state machine
//!
//! Owns the [`TimerState`], the 1 Hz ticker and the delayed phase flip.
//! [`TimerStateMachine::run`] is the only place that mutates the state, so
//! nothing here needs a lock.

use std::{future, pin::Pin, time::Duration};

use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{self, Instant, Interval, MissedTickBehavior, Sleep},
};
use tracing::{debug, info};

use super::{Adjustment, Phase, TimerState};
use crate::events::ClockEvent;

/// Period of the countdown ticker
pub const TICK_PERIOD: Duration = Duration::from_secs(1);
/// Delay between the alert and the switch to the next phase
pub const PHASE_FLIP_DELAY: Duration = Duration::from_secs(1);

const EVENT_BUFFER: usize = 100;

/// User actions the machine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AdjustLength(Phase, Adjustment),
    ToggleStartStop,
    Reset,
    Shutdown,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::AdjustLength(Phase::Session, adjustment) => write!(f, "session-{}", adjustment),
            Action::AdjustLength(Phase::Break, adjustment) => write!(f, "break-{}", adjustment),
            Action::ToggleStartStop => write!(f, "start_stop"),
            Action::Reset => write!(f, "reset"),
            Action::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// An action plus the channel that receives the resulting state
#[derive(Debug)]
pub struct Command {
    pub action: Action,
    pub reply: oneshot::Sender<TimerState>,
}

impl Command {
    /// Build a command and the receiver for its reply
    pub fn new(action: Action) -> (Self, oneshot::Receiver<TimerState>) {
        let (reply, reply_rx) = oneshot::channel();
        (Self { action, reply }, reply_rx)
    }
}

/// The countdown state machine
pub struct TimerStateMachine {
    state: TimerState,
    /// Live 1 Hz ticker, present only while running
    ticker: Option<Interval>,
    /// Pending switch to the next phase, present only during the alert delay
    pending_flip: Option<Pin<Box<Sleep>>>,
    event_tx: broadcast::Sender<ClockEvent>,
    update_tx: watch::Sender<TimerState>,
}

impl TimerStateMachine {
    /// Create an idle machine in the default state
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (update_tx, _) = watch::channel(TimerState::new());

        Self {
            state: TimerState::new(),
            ticker: None,
            pending_flip: None,
            event_tx,
            update_tx,
        }
    }

    /// Current state
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Whether the 1 Hz ticker is live
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Whether a phase flip is waiting on its delay
    pub fn flip_pending(&self) -> bool {
        self.pending_flip.is_some()
    }

    /// Subscribe to transition events
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.event_tx.subscribe()
    }

    /// Watch the state; updated after every mutation including ticks
    pub fn watch_updates(&self) -> watch::Receiver<TimerState> {
        self.update_tx.subscribe()
    }

    /// Run the machine until shut down or every command sender is gone
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        info!("timer state machine started");

        loop {
            let flip_pending = self.pending_flip.is_some();

            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command { action: Action::Shutdown, reply }) => {
                        self.shutdown();
                        let _ = reply.send(self.state.clone());
                        break;
                    }
                    Some(Command { action, reply }) => {
                        self.apply(action);
                        let _ = reply.send(self.state.clone());
                    }
                    None => {
                        debug!("command channel closed");
                        self.shutdown();
                        break;
                    }
                },

                _ = flip_due(&mut self.pending_flip) => self.flip_phase(),

                // The countdown holds at zero while the alert plays
                _ = tick_due(&mut self.ticker), if !flip_pending => self.on_tick(),
            }
        }

        info!("timer state machine stopped");
    }

    /// Apply a user action
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::AdjustLength(target, adjustment) => {
                self.adjust_length(target, adjustment);
            }
            Action::ToggleStartStop => self.toggle_start_stop(),
            Action::Reset => self.reset(),
            Action::Shutdown => self.shutdown(),
        }
    }

    /// Change a phase length by one minute; ignored while running or out of range
    pub fn adjust_length(&mut self, target: Phase, adjustment: Adjustment) -> bool {
        if !self.state.adjust_length(target, adjustment) {
            debug!(
                %target,
                %adjustment,
                running = self.state.is_running,
                "length adjustment ignored"
            );
            return false;
        }

        let minutes = self.state.length(target);
        info!(%target, minutes, "length adjusted");
        self.emit(ClockEvent::LengthAdjusted { target, minutes });
        self.publish();
        true
    }

    /// Start the countdown if idle, stop it if running
    pub fn toggle_start_stop(&mut self) {
        let phase = self.state.phase;
        let time_left_seconds = self.state.time_left_seconds;

        if self.state.is_running {
            self.ticker = None;
            self.state.is_running = false;
            info!(%phase, time_left_seconds, "countdown stopped");
            self.emit(ClockEvent::Stopped { phase, time_left_seconds });
        } else {
            let mut ticker = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ticker = Some(ticker);
            self.state.is_running = true;
            info!(%phase, time_left_seconds, "countdown started");
            self.emit(ClockEvent::Started { phase, time_left_seconds });
        }

        self.publish();
    }

    /// One second elapsed: decrement and arm the phase flip when reaching zero
    pub fn on_tick(&mut self) {
        self.state.time_left_seconds -= 1;

        if self.state.time_left_seconds == 0 {
            let phase = self.state.phase;
            info!(%phase, "countdown elapsed");
            self.emit(ClockEvent::PhaseEnded { phase });
            self.pending_flip = Some(Box::pin(time::sleep(PHASE_FLIP_DELAY)));
        }

        self.publish();
    }

    /// Switch to the next phase once the alert delay has passed
    pub fn flip_phase(&mut self) {
        self.pending_flip = None;
        let from = self.state.phase;
        self.state.flip_phase();

        // Next decrement one full period after the new phase appears
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.reset();
        }

        let phase = self.state.phase;
        let time_left_seconds = self.state.time_left_seconds;
        info!(%from, to = %phase, time_left_seconds, "phase transition");
        self.emit(ClockEvent::PhaseTransitioned { phase, time_left_seconds });
        self.publish();
    }

    /// Cancel all timers and return to the default state
    pub fn reset(&mut self) {
        self.cancel_timers();
        self.state = TimerState::new();
        info!("timer reset");
        self.emit(ClockEvent::Reset);
        self.publish();
    }

    /// Cancel all timers; the machine stops running
    pub fn shutdown(&mut self) {
        self.cancel_timers();
        self.state.is_running = false;
        self.publish();
        info!("timer shut down");
    }

    fn cancel_timers(&mut self) {
        if self.ticker.take().is_some() {
            debug!("ticker cancelled");
        }
        if self.pending_flip.take().is_some() {
            debug!("pending phase flip cancelled");
        }
    }

    fn emit(&self, event: ClockEvent) {
        debug!(%event, "emitting event");
        let _ = self.event_tx.send(event);
    }

    fn publish(&self) {
        self.update_tx.send_replace(self.state.clone());
    }
}

impl Default for TimerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

async fn flip_due(pending_flip: &mut Option<Pin<Box<Sleep>>>) {
    match pending_flip {
        Some(delay) => delay.as_mut().await,
        None => future::pending().await,
    }
}

async fn tick_due(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(events: &mut broadcast::Receiver<ClockEvent>) -> Vec<ClockEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }
        drained
    }

    fn one_minute_session() -> TimerStateMachine {
        let mut machine = TimerStateMachine::new();
        while machine.adjust_length(Phase::Session, Adjustment::Decrement) {}
        assert_eq!(machine.state().time_left_seconds, 60);
        machine
    }

    async fn send(commands: &mpsc::Sender<Command>, action: Action) -> TimerState {
        let (command, reply) = Command::new(action);
        commands.send(command).await.unwrap();
        reply.await.unwrap()
    }

    #[tokio::test]
    async fn test_initial_state() {
        let machine = TimerStateMachine::new();
        assert_eq!(machine.state(), &TimerState::new());
        assert!(!machine.is_ticking());
        assert!(!machine.flip_pending());
    }

    #[tokio::test]
    async fn test_toggle_arms_and_cancels_ticker() {
        let mut machine = TimerStateMachine::new();

        machine.toggle_start_stop();
        assert!(machine.state().is_running);
        assert!(machine.is_ticking());

        machine.toggle_start_stop();
        assert!(!machine.state().is_running);
        assert!(!machine.is_ticking());
    }

    #[tokio::test]
    async fn test_adjust_ignored_while_running() {
        let mut machine = TimerStateMachine::new();
        machine.toggle_start_stop();
        let before = machine.state().clone();

        assert!(!machine.adjust_length(Phase::Session, Adjustment::Increment));
        assert!(!machine.adjust_length(Phase::Break, Adjustment::Decrement));
        assert_eq!(machine.state(), &before);
    }

    #[tokio::test]
    async fn test_events_for_adjust_and_start_stop() {
        let mut machine = TimerStateMachine::new();
        let mut events = machine.subscribe_events();
        let mut updates = machine.watch_updates();

        assert!(machine.adjust_length(Phase::Break, Adjustment::Increment));
        assert!(updates.has_changed().unwrap());
        updates.borrow_and_update();

        while machine.adjust_length(Phase::Break, Adjustment::Increment) {}
        drain(&mut events);
        updates.borrow_and_update();

        assert!(!machine.adjust_length(Phase::Break, Adjustment::Increment));
        assert!(drain(&mut events).is_empty());
        assert!(!updates.has_changed().unwrap());

        machine.toggle_start_stop();
        machine.on_tick();
        machine.toggle_start_stop();
        assert!(!machine.adjust_length(Phase::Session, Adjustment::Increment));

        assert_eq!(
            drain(&mut events),
            vec![
                ClockEvent::Started { phase: Phase::Session, time_left_seconds: 1500 },
                ClockEvent::Stopped { phase: Phase::Session, time_left_seconds: 1499 },
            ]
        );
    }

    #[tokio::test]
    async fn test_adjust_emits_length_adjusted() {
        let mut machine = TimerStateMachine::new();
        let mut events = machine.subscribe_events();

        machine.adjust_length(Phase::Session, Adjustment::Decrement);
        assert!(machine.adjust_length(Phase::Session, Adjustment::Increment));

        assert_eq!(
            drain(&mut events),
            vec![
                ClockEvent::LengthAdjusted { target: Phase::Session, minutes: 24 },
                ClockEvent::LengthAdjusted { target: Phase::Session, minutes: 25 },
            ]
        );
    }

    #[tokio::test]
    async fn test_full_session_countdown() {
        let mut machine = TimerStateMachine::new();
        let mut events = machine.subscribe_events();

        machine.toggle_start_stop();
        for _ in 0..1500 {
            machine.on_tick();
        }

        assert_eq!(machine.state().time_left_seconds, 0);
        assert!(machine.flip_pending());
        assert_eq!(
            drain(&mut events),
            vec![
                ClockEvent::Started { phase: Phase::Session, time_left_seconds: 1500 },
                ClockEvent::PhaseEnded { phase: Phase::Session },
            ]
        );

        machine.flip_phase();
        assert!(!machine.flip_pending());
        assert_eq!(machine.state().phase, Phase::Break);
        assert_eq!(machine.state().time_left_seconds, 300);
        assert!(machine.state().is_running);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults_and_cancels_timers() {
        let mut machine = TimerStateMachine::new();
        machine.adjust_length(Phase::Session, Adjustment::Decrement);
        machine.adjust_length(Phase::Break, Adjustment::Increment);
        machine.toggle_start_stop();
        for _ in 0..(24 * 60) {
            machine.on_tick();
        }
        assert!(machine.flip_pending());

        machine.reset();

        assert_eq!(machine.state(), &TimerState::new());
        assert!(!machine.is_ticking());
        assert!(!machine.flip_pending());
    }

    #[tokio::test]
    async fn test_updates_follow_every_mutation() {
        let mut machine = TimerStateMachine::new();
        let updates = machine.watch_updates();

        machine.adjust_length(Phase::Session, Adjustment::Increment);
        assert_eq!(updates.borrow().time_left_seconds, 1560);

        machine.toggle_start_stop();
        machine.on_tick();
        assert_eq!(updates.borrow().time_left_seconds, 1559);
        assert!(updates.borrow().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_scenario() {
        let machine = TimerStateMachine::new();
        let updates = machine.watch_updates();
        let mut events = machine.subscribe_events();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(machine.run(rx));

        let started = send(&tx, Action::ToggleStartStop).await;
        assert!(started.is_running);
        assert_eq!(started.time_left_seconds, 1500);

        time::sleep(Duration::from_millis(1_500_500)).await;
        assert_eq!(updates.borrow().time_left_seconds, 0);
        assert!(updates.borrow().is_session_phase());

        time::sleep(Duration::from_secs(1)).await;
        {
            let state = updates.borrow();
            assert_eq!(state.phase, Phase::Break);
            assert_eq!(state.time_left_seconds, 300);
        }

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(updates.borrow().time_left_seconds, 299);

        assert_eq!(
            drain(&mut events),
            vec![
                ClockEvent::Started { phase: Phase::Session, time_left_seconds: 1500 },
                ClockEvent::PhaseEnded { phase: Phase::Session },
                ClockEvent::PhaseTransitioned { phase: Phase::Break, time_left_seconds: 300 },
            ]
        );

        send(&tx, Action::Shutdown).await;
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_countdown() {
        let machine = TimerStateMachine::new();
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(machine.run(rx));

        send(&tx, Action::ToggleStartStop).await;
        time::sleep(Duration::from_millis(10_500)).await;

        let stopped = send(&tx, Action::ToggleStartStop).await;
        assert!(!stopped.is_running);
        assert_eq!(stopped.time_left_seconds, 1490);

        time::sleep(Duration::from_secs(30)).await;
        let (command, reply) = Command::new(Action::AdjustLength(Phase::Break, Adjustment::Increment));
        tx.send(command).await.unwrap();
        let later = reply.await.unwrap();
        assert_eq!(later.time_left_seconds, 1490);
        assert_eq!(later.break_length, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_flip() {
        let machine = one_minute_session();
        let updates = machine.watch_updates();
        let mut events = machine.subscribe_events();
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(machine.run(rx));

        send(&tx, Action::ToggleStartStop).await;
        time::sleep(Duration::from_millis(60_500)).await;
        assert_eq!(updates.borrow().time_left_seconds, 0);

        let reset = send(&tx, Action::Reset).await;
        assert_eq!(reset, TimerState::new());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*updates.borrow(), TimerState::new());

        let seen = drain(&mut events);
        assert!(seen.contains(&ClockEvent::Reset));
        assert!(!seen
            .iter()
            .any(|event| matches!(event, ClockEvent::PhaseTransitioned { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flip_still_fires_after_stop() {
        let machine = one_minute_session();
        let updates = machine.watch_updates();
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(machine.run(rx));

        send(&tx, Action::ToggleStartStop).await;
        time::sleep(Duration::from_millis(60_500)).await;
        let stopped = send(&tx, Action::ToggleStartStop).await;
        assert_eq!(stopped.time_left_seconds, 0);

        time::sleep(Duration::from_secs(1)).await;
        let state = updates.borrow().clone();
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.time_left_seconds, 300);
        assert!(!state.is_running);
    }

    #[tokio::test]
    async fn test_run_ends_when_senders_dropped() {
        let machine = TimerStateMachine::new();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(machine.run(rx));

        send(&tx, Action::ToggleStartStop).await;
        drop(tx);

        handle.await.unwrap();
    }
}
