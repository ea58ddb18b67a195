//! Countdown controller state machine

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::{CountdownSnapshot, LapLog, LapRecord, TimerEvent, TimerState, TransparencyState};
use crate::{
    error::{CountdownError, Result},
    tasks::TickSource,
};

const EVENT_CAPACITY: usize = 100;

/// Countdown that moves between Stopped and Running and ticks down a target.
///
/// Every method expects to be called from the one control queue that also
/// delivers timer fires, so no locking happens here. Rejected operations
/// return an error and change nothing.
#[derive(Debug)]
pub struct CountdownController<T: TickSource> {
    timer: T,
    state: TimerState,
    transparency: TransparencyState,
    target_seconds: Option<u64>,
    remaining_seconds: u64,
    laps: LapLog,
    event_tx: broadcast::Sender<TimerEvent>,
    snapshot_tx: watch::Sender<CountdownSnapshot>,
}

impl<T: TickSource> CountdownController<T> {
    /// Create a stopped, opaque controller with no target
    pub fn new(timer: T) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (snapshot_tx, _) = watch::channel(CountdownSnapshot::new());

        Self {
            timer,
            state: TimerState::Stopped,
            transparency: TransparencyState::Opaque,
            target_seconds: None,
            remaining_seconds: 0,
            laps: LapLog::new(),
            event_tx,
            snapshot_tx,
        }
    }

    /// Subscribe to state-change events
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Watch the latest snapshot
    pub fn watch(&self) -> watch::Receiver<CountdownSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current timer state
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Current overlay transparency
    pub fn transparency(&self) -> TransparencyState {
        self.transparency
    }

    /// Last committed target, if any
    pub fn target_seconds(&self) -> Option<u64> {
        self.target_seconds
    }

    /// Seconds left in the countdown
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    /// Recorded laps in order
    pub fn laps(&self) -> &[LapRecord] {
        self.laps.records()
    }

    /// The owned tick source
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Build a snapshot of the current state
    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            state: self.state,
            transparency: self.transparency,
            target_seconds: self.target_seconds,
            remaining_seconds: self.remaining_seconds,
            lap_count: self.laps.len(),
        }
    }

    /// Commit a new countdown target. Only allowed while stopped.
    pub fn set_target(&mut self, seconds: i64) -> Result<()> {
        if self.state.is_running() {
            return Err(CountdownError::transition("set a target", self.state.as_str()));
        }
        let seconds = u64::try_from(seconds)
            .ok()
            .filter(|s| *s > 0)
            .ok_or(CountdownError::InvalidTarget(seconds))?;

        self.target_seconds = Some(seconds);
        self.remaining_seconds = seconds;
        debug!("Countdown target set to {}s", seconds);
        self.publish();
        Ok(())
    }

    /// Enter Running. Returns `Ok(false)` if already running.
    pub fn start(&mut self) -> Result<bool> {
        if self.state.is_running() {
            return Ok(false);
        }
        if self.target_seconds.is_none() || self.remaining_seconds == 0 {
            return Err(CountdownError::InvalidTarget(self.remaining_seconds as i64));
        }

        self.timer.start()?;
        self.state = TimerState::Running;
        info!("Countdown running with {}s remaining", self.remaining_seconds);
        self.emit(TimerEvent::EnteredRunning);
        self.request_transparency(TransparencyState::Transparent);
        self.publish();
        Ok(true)
    }

    /// Enter Stopped on user request. Returns `false` if already stopped.
    ///
    /// The remaining time is kept, so a later start resumes from it.
    pub fn stop(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        info!("Countdown stopped with {}s remaining", self.remaining_seconds);
        self.enter_stopped(TimerEvent::EnteredStopped);
        true
    }

    /// Start when stopped, stop when running
    pub fn toggle(&mut self) -> Result<bool> {
        match self.state {
            TimerState::Stopped => self.start(),
            TimerState::Running => Ok(self.stop()),
        }
    }

    /// Apply one timer fire and return the remaining seconds.
    ///
    /// Reaching zero stops the controller before this returns. Fires that
    /// arrive after a stop are rejected.
    pub fn tick(&mut self) -> Result<u64> {
        if !self.state.is_running() {
            return Err(CountdownError::transition("tick", self.state.as_str()));
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            info!("Countdown expired");
            self.enter_stopped(TimerEvent::Expired);
        } else {
            debug!("Countdown tick, {}s remaining", self.remaining_seconds);
            self.emit(TimerEvent::Tick {
                remaining_seconds: self.remaining_seconds,
            });
            self.publish();
        }
        Ok(self.remaining_seconds)
    }

    /// Pointer moved over the overlay. Only has an effect while running.
    pub fn pointer_entered(&mut self) -> bool {
        self.state.is_running() && self.request_transparency(TransparencyState::Opaque)
    }

    /// Pointer left the overlay. Only has an effect while running.
    pub fn pointer_exited(&mut self) -> bool {
        self.state.is_running() && self.request_transparency(TransparencyState::Transparent)
    }

    /// Record a question lap against the current remaining time
    pub fn record_lap(&mut self) -> Result<LapRecord> {
        if !self.state.is_running() {
            return Err(CountdownError::transition("record a lap", self.state.as_str()));
        }

        let baseline = self.target_seconds.unwrap_or(self.remaining_seconds);
        let lap = self.laps.record(baseline, self.remaining_seconds);
        info!("Lap {} recorded after {}s", lap.number, lap.duration_seconds);
        self.emit(TimerEvent::LapRecorded { lap });
        self.publish();
        Ok(lap)
    }

    /// Drop every recorded lap
    pub fn clear_laps(&mut self) {
        self.laps.clear();
        debug!("Laps cleared");
        self.emit(TimerEvent::LapsCleared);
        self.publish();
    }

    /// Hand the lap sequence to a companion view, leaving it empty here
    pub fn take_laps(&mut self) -> Vec<LapRecord> {
        let laps = self.laps.take();
        self.publish();
        laps
    }

    /// Take back a lap sequence from a companion view
    pub fn restore_laps(&mut self, laps: Vec<LapRecord>) {
        let count = laps.len();
        self.laps.restore(laps);
        debug!("Restored {} laps", count);
        self.emit(TimerEvent::LapsRestored { count });
        self.publish();
    }

    fn enter_stopped(&mut self, event: TimerEvent) {
        self.timer.stop();
        self.state = TimerState::Stopped;
        self.emit(event);
        self.request_transparency(TransparencyState::Opaque);
        self.publish();
    }

    fn request_transparency(&mut self, requested: TransparencyState) -> bool {
        if self.transparency == requested {
            return false;
        }
        self.transparency = requested;
        debug!("Transparency changed to {}", requested);
        self.emit(TimerEvent::TransparencyChanged { state: requested });
        self.publish();
        true
    }

    fn emit(&self, event: TimerEvent) {
        // No subscribers is a normal condition
        if let Err(e) = self.event_tx.send(event) {
            debug!("Dropped timer event without subscribers: {:?}", e.0);
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct ManualTicks {
        running: bool,
        starts: usize,
        stops: usize,
        cancelled: bool,
    }

    impl TickSource for ManualTicks {
        fn start(&mut self) -> Result<()> {
            if self.cancelled {
                return Err(CountdownError::transition("start the timer", "cancelled"));
            }
            if !self.running {
                self.running = true;
                self.starts += 1;
            }
            Ok(())
        }

        fn stop(&mut self) {
            if self.running {
                self.running = false;
                self.stops += 1;
            }
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    fn controller() -> (CountdownController<ManualTicks>, broadcast::Receiver<TimerEvent>) {
        let controller = CountdownController::new(ManualTicks::default());
        let events = controller.subscribe();
        (controller, events)
    }

    fn drain(events: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn test_countdown_of_three() {
        let (mut cd, mut events) = controller();
        cd.set_target(3).unwrap();
        assert!(cd.start().unwrap());
        assert_eq!(
            drain(&mut events),
            vec![
                TimerEvent::EnteredRunning,
                TimerEvent::TransparencyChanged { state: TransparencyState::Transparent },
            ]
        );

        assert_eq!(cd.tick().unwrap(), 2);
        assert_eq!(cd.tick().unwrap(), 1);
        assert_eq!(cd.tick().unwrap(), 0);
        assert_eq!(cd.state(), TimerState::Stopped);
        assert_eq!(
            drain(&mut events),
            vec![
                TimerEvent::Tick { remaining_seconds: 2 },
                TimerEvent::Tick { remaining_seconds: 1 },
                TimerEvent::Expired,
                TimerEvent::TransparencyChanged { state: TransparencyState::Opaque },
            ]
        );
        assert!(!cd.timer().is_running());
    }

    #[test]
    fn test_every_target_expires_exactly_once() {
        for d in 1..=25i64 {
            let (mut cd, mut events) = controller();
            cd.set_target(d).unwrap();
            cd.start().unwrap();
            for _ in 0..d {
                cd.tick().unwrap();
            }

            assert_eq!(cd.state(), TimerState::Stopped);
            assert_eq!(cd.remaining_seconds(), 0);
            let expired = drain(&mut events)
                .into_iter()
                .filter(|e| *e == TimerEvent::Expired)
                .count();
            assert_eq!(expired, 1, "target {}", d);
        }
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let (mut cd, mut events) = controller();
        cd.set_target(10).unwrap();

        assert!(cd.start().unwrap());
        assert!(!cd.start().unwrap());
        assert!(cd.stop());
        assert!(!cd.stop());

        let events = drain(&mut events);
        let running = events.iter().filter(|e| **e == TimerEvent::EnteredRunning).count();
        let stopped = events.iter().filter(|e| **e == TimerEvent::EnteredStopped).count();
        assert_eq!((running, stopped), (1, 1));
        assert_eq!((cd.timer().starts, cd.timer().stops), (1, 1));
    }

    #[test]
    fn test_stop_keeps_remaining() {
        let (mut cd, _events) = controller();
        cd.set_target(10).unwrap();
        cd.start().unwrap();
        cd.tick().unwrap();
        cd.tick().unwrap();
        cd.stop();
        assert_eq!(cd.remaining_seconds(), 8);

        cd.start().unwrap();
        assert_eq!(cd.tick().unwrap(), 7);
    }

    #[test]
    fn test_invalid_targets_rejected() {
        let (mut cd, _events) = controller();
        assert_eq!(cd.start(), Err(CountdownError::InvalidTarget(0)));

        cd.set_target(30).unwrap();
        assert_eq!(cd.set_target(0), Err(CountdownError::InvalidTarget(0)));
        assert_eq!(cd.set_target(-5), Err(CountdownError::InvalidTarget(-5)));
        assert_eq!(cd.target_seconds(), Some(30));
        assert_eq!(cd.remaining_seconds(), 30);
    }

    #[test]
    fn test_guarded_operations_while_stopped() {
        let (mut cd, mut events) = controller();
        assert!(matches!(cd.tick(), Err(CountdownError::InvalidStateTransition { .. })));
        assert!(matches!(cd.record_lap(), Err(CountdownError::InvalidStateTransition { .. })));
        assert!(!cd.pointer_entered());
        assert!(drain(&mut events).is_empty());
    }

    #[test]
    fn test_set_target_rejected_while_running() {
        let (mut cd, _events) = controller();
        cd.set_target(5).unwrap();
        cd.start().unwrap();
        assert_eq!(
            cd.set_target(60),
            Err(CountdownError::InvalidStateTransition { action: "set a target", state: "running" })
        );
        assert_eq!(cd.target_seconds(), Some(5));
    }

    #[test]
    fn test_restart_after_expiry_needs_new_target() {
        let (mut cd, _events) = controller();
        cd.set_target(1).unwrap();
        cd.start().unwrap();
        cd.tick().unwrap();
        assert_eq!(cd.start(), Err(CountdownError::InvalidTarget(0)));

        cd.set_target(2).unwrap();
        assert!(cd.start().unwrap());
    }

    #[test]
    fn test_late_tick_after_stop_is_ignored() {
        let (mut cd, _events) = controller();
        cd.set_target(5).unwrap();
        cd.start().unwrap();
        cd.stop();
        assert!(cd.tick().is_err());
        assert_eq!(cd.remaining_seconds(), 5);
    }

    #[test]
    fn test_cancelled_timer_blocks_start() {
        let mut ticks = ManualTicks::default();
        ticks.cancelled = true;
        let mut cd = CountdownController::new(ticks);
        cd.set_target(5).unwrap();
        assert!(cd.start().is_err());
        assert_eq!(cd.state(), TimerState::Stopped);
        assert_eq!(cd.transparency(), TransparencyState::Opaque);
    }

    #[test]
    fn test_hover_transparency() {
        let (mut cd, mut events) = controller();
        cd.set_target(10).unwrap();
        cd.start().unwrap();
        drain(&mut events);

        assert!(cd.pointer_entered());
        assert!(!cd.pointer_entered());
        assert_eq!(cd.transparency(), TransparencyState::Opaque);
        assert!(cd.pointer_exited());
        assert!(!cd.pointer_exited());
        assert_eq!(
            drain(&mut events),
            vec![
                TimerEvent::TransparencyChanged { state: TransparencyState::Opaque },
                TimerEvent::TransparencyChanged { state: TransparencyState::Transparent },
            ]
        );

        // Stopping while hovered does not repeat the opaque transition
        cd.pointer_entered();
        drain(&mut events);
        cd.stop();
        assert_eq!(drain(&mut events), vec![TimerEvent::EnteredStopped]);
    }

    #[test]
    fn test_laps_are_numbered_in_order() {
        let (mut cd, _events) = controller();
        cd.set_target(100).unwrap();
        cd.start().unwrap();

        for n in 0..6 {
            for _ in 0..n {
                cd.tick().unwrap();
            }
            cd.record_lap().unwrap();
        }

        let laps = cd.laps();
        assert_eq!(laps.len(), 6);
        for (i, lap) in laps.iter().enumerate() {
            assert_eq!(lap.number as usize, i + 1);
            assert_eq!(lap.duration_seconds, i as u64);
        }
        assert_eq!(laps[5].remaining_seconds, 85);
        assert_eq!(cd.state(), TimerState::Running);
    }

    #[test]
    fn test_lap_handoff_and_clear() {
        let (mut cd, mut events) = controller();
        cd.set_target(20).unwrap();
        cd.start().unwrap();
        cd.tick().unwrap();
        cd.record_lap().unwrap();
        cd.tick().unwrap();
        cd.record_lap().unwrap();

        let laps = cd.take_laps();
        assert!(cd.laps().is_empty());
        cd.restore_laps(laps);
        assert_eq!(cd.laps().len(), 2);

        cd.stop();
        drain(&mut events);
        cd.clear_laps();
        assert!(cd.laps().is_empty());
        assert_eq!(drain(&mut events), vec![TimerEvent::LapsCleared]);
    }

    #[test]
    fn test_snapshot_published() {
        let (mut cd, _events) = controller();
        let snapshots = cd.watch();
        cd.set_target(4).unwrap();
        assert!(snapshots.borrow().can_start());

        cd.start().unwrap();
        cd.tick().unwrap();
        let snapshot = snapshots.borrow().clone();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.transparency, TransparencyState::Transparent);
        assert_eq!(snapshot.remaining_seconds, 3);
        assert_eq!(snapshot, cd.snapshot());
    }
}
