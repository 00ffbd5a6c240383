/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::TimingConfig;
use crate::elevator::{ElevatorFSM, Event};
use crate::log_bridge::{LogBridge, LogCompletion, LogEntry};
use crate::shared::{Command, DisplayUpdate, ElevatorState, Status, GROUND_FLOOR, TOP_FLOOR};
use crate::timer::{TimerHandle, TimerQueue};

/**
 * Drives the elevator through its timed stages.
 *
 * The coordinator thread is the only owner of the `ElevatorFSM`. It waits on three things at once:
 * commands from the front-end, completions from its logging bridge and the deadline of the next
 * timer. Every stage is one one-shot timer; the armed one is tracked in `stage_timer` and is
 * always cancelled before a new one is scheduled, so a stage can never complete twice.
 *
 * # Fields
 * - `fsm`:                 The elevator state machine.
 * - `timing`:              Stage durations.
 * - `timers`:              Pending one-shot timers, each carrying the FSM event it will feed.
 * - `stage_timer`:         Handle of the timer currently allowed to advance the FSM.
 * - `live`:                Cleared by the emergency alarm; timer callbacks are no-ops while false.
 * - `alarm_active`:        Emergency alarm toggle.
 * - `command_rx`:          Receives commands from the front-end.
 * - `log_done_rx`:         Receives completions from the controller-level logging bridge.
 * - `display_tx`:          Publishes display updates.
 */
pub struct Coordinator {
    fsm: ElevatorFSM,
    timing: TimingConfig,
    timers: TimerQueue<Event>,
    stage_timer: Option<TimerHandle>,
    live: bool,
    alarm_active: bool,

    command_rx: cbc::Receiver<Command>,
    log_done_rx: cbc::Receiver<LogCompletion>,
    display_tx: cbc::Sender<DisplayUpdate>,
}

impl Coordinator {
    /// Wires the FSM notifications to the display channel and to `bridge`. The bridge's
    /// completions are expected on `log_done_rx`.
    pub fn new(
        mut fsm: ElevatorFSM,
        timing: TimingConfig,
        bridge: LogBridge,
        command_rx: cbc::Receiver<Command>,
        log_done_rx: cbc::Receiver<LogCompletion>,
        display_tx: cbc::Sender<DisplayUpdate>,
    ) -> Coordinator {
        let floor_display_tx = display_tx.clone();
        let floor_bridge = bridge.clone();
        fsm.on_floor_changed(move |state| {
            let _ = floor_display_tx.send(DisplayUpdate::Floor(state.floor));
            floor_bridge.log_async(LogEntry::new(
                state.floor,
                "Arrived",
                format!("Arrived at floor {}", state.floor),
            ));
        });

        let state_display_tx = display_tx.clone();
        fsm.on_state_changed(move |state, name| {
            let _ = state_display_tx.send(DisplayUpdate::Status {
                status: state.status,
                name,
            });
            bridge.log_async(LogEntry::new(
                state.floor,
                state.status.log_tag(),
                describe_transition(state),
            ));
        });

        Coordinator {
            fsm,
            timing,
            timers: TimerQueue::new(),
            stage_timer: None,
            live: true,
            alarm_active: false,
            command_rx,
            log_done_rx,
            display_tx,
        }
    }

    pub fn run(mut self) {
        info!(
            "Coordinator started at floor {} ({})",
            self.fsm.floor(),
            self.fsm.status()
        );
        self.publish(DisplayUpdate::Floor(self.fsm.floor()));
        self.publish(DisplayUpdate::Status {
            status: self.fsm.status(),
            name: self.fsm.status().name(),
        });

        // Main loop
        loop {
            let timeout = match self.timers.next_deadline() {
                Some(deadline) => cbc::at(deadline),
                None => cbc::never(),
            };

            cbc::select! {
                recv(self.command_rx) -> command => {
                    match command {
                        Ok(Command::Shutdown) => break,
                        Ok(command) => self.handle_command(command),
                        Err(_) => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
                recv(self.log_done_rx) -> completion => {
                    if let Ok(completion) = completion {
                        self.handle_log_completion(completion);
                    }
                }
                recv(timeout) -> _ => self.fire_expired_timers(Instant::now()),
            }
        }

        let cancelled = self.timers.cancel_all();
        info!("Coordinator terminated ({} pending timers cancelled)", cancelled);
    }

    pub fn state(&self) -> &ElevatorState {
        self.fsm.state()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn handle_command(&mut self, command: Command) {
        if self.alarm_active && command != Command::ToggleAlarm {
            debug!("{:?} ignored, emergency alarm active", command);
            self.publish(DisplayUpdate::Rejected(
                "Emergency alarm active".to_string(),
            ));
            return;
        }

        match command {
            Command::RequestFloor(floor) => self.request_floor(floor),
            Command::CallUp => self.request_floor(TOP_FLOOR),
            Command::CallDown => self.request_floor(GROUND_FLOOR),
            Command::OpenDoors => self.open_doors(),
            Command::CloseDoors => self.close_doors(),
            Command::ToggleAlarm => {
                if self.alarm_active {
                    self.deactivate_alarm();
                } else {
                    self.activate_alarm();
                }
            }
            Command::Shutdown => {
                self.live = false;
                self.timers.cancel_all();
                self.stage_timer = None;
            }
        }
    }

    /// Runs every timer due at `now`. Stale or cancelled timers and anything firing while the
    /// coordinator is not live are dropped without touching the FSM.
    pub fn fire_expired_timers(&mut self, now: Instant) {
        for (handle, event) in self.timers.pop_expired(now) {
            if !self.live {
                debug!("Timer {:?} ({:?}) fired while not live, ignored", handle, event);
                continue;
            }
            if self.stage_timer != Some(handle) {
                debug!("Stale timer {:?} ({:?}) ignored", handle, event);
                continue;
            }
            self.stage_timer = None;
            self.advance(event, now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn request_floor(&mut self, floor: u8) {
        match self.fsm.request_floor(floor) {
            Ok(Some(status)) => self.schedule_stage(status, Instant::now()),
            Ok(None) => {}
            Err(e) => {
                debug!("Rejected request: {}", e);
                self.publish(DisplayUpdate::Rejected(e.to_string()));
            }
        }
    }

    fn open_doors(&mut self) {
        match self.fsm.status() {
            Status::Idle => self.request_floor(self.fsm.floor()),
            Status::DoorsOpen => {
                // Hold the doors: the pending auto-close is replaced, not duplicated.
                let delay = self.timing.auto_close();
                self.arm(delay, Event::HoldExpired, Instant::now());
                debug!("Door hold re-armed for {:?}", delay);
            }
            other => debug!("Open doors ignored while {}", other),
        }
    }

    fn close_doors(&mut self) {
        if self.fsm.status() != Status::DoorsOpen {
            debug!("Close doors ignored while {}", self.fsm.status());
            return;
        }

        self.cancel_stage_timer();
        self.advance(Event::CloseRequested, Instant::now());
    }

    fn activate_alarm(&mut self) {
        self.live = false;
        let cancelled = self.timers.cancel_all();
        self.stage_timer = None;
        self.alarm_active = true;

        warn!(
            "EMERGENCY ALARM ACTIVATED at floor {} while {} ({} timers stopped)",
            self.fsm.floor(),
            self.fsm.status(),
            cancelled
        );
        self.publish(DisplayUpdate::Alarm(true));
    }

    fn deactivate_alarm(&mut self) {
        self.alarm_active = false;
        self.live = true;

        warn!(
            "EMERGENCY ALARM DEACTIVATED, resuming {} at floor {}",
            self.fsm.status(),
            self.fsm.floor()
        );
        self.publish(DisplayUpdate::Alarm(false));
        self.schedule_stage(self.fsm.status(), Instant::now());
    }

    fn advance(&mut self, event: Event, now: Instant) {
        match self.fsm.handle_event(event) {
            Ok(Some(status)) => self.schedule_stage(status, now),
            Ok(None) => debug!("{:?} did not change {}", event, self.fsm.status()),
            Err(e) => warn!("{:?} rejected: {}", event, e),
        }
    }

    /// Arms the timer that ends the stage `status` has just entered.
    fn schedule_stage(&mut self, status: Status, now: Instant) {
        match stage_timer_for(status, &self.timing) {
            Some((delay, event)) => self.arm(delay, event, now),
            None => self.cancel_stage_timer(),
        }
    }

    fn arm(&mut self, delay: Duration, event: Event, now: Instant) {
        self.cancel_stage_timer();
        self.stage_timer = Some(self.timers.schedule(now, delay, event));
    }

    fn cancel_stage_timer(&mut self) {
        if let Some(handle) = self.stage_timer.take() {
            if self.timers.cancel(handle) {
                debug!("Cancelled timer {:?}", handle);
            }
        }
    }

    fn handle_log_completion(&self, completion: LogCompletion) {
        if !completion.ok {
            debug!("[{}] {}", completion.bridge, completion.message);
        }
        self.publish(DisplayUpdate::LogWritten {
            ok: completion.ok,
            message: completion.message,
        });
    }

    fn publish(&self, update: DisplayUpdate) {
        if self.display_tx.send(update).is_err() {
            debug!("Display channel closed");
        }
    }
}

/// Which timer ends a stage, and the event it feeds back. `Idle` has no timed exit.
pub fn stage_timer_for(status: Status, timing: &TimingConfig) -> Option<(Duration, Event)> {
    match status {
        Status::Idle => None,
        Status::Moving { .. } => Some((timing.movement(), Event::Arrived)),
        Status::DoorsOpening => Some((timing.door_operation(), Event::DoorsOpened)),
        Status::DoorsOpen => Some((timing.door_open(), Event::HoldExpired)),
        Status::DoorsClosing => Some((timing.door_operation(), Event::DoorsClosed)),
    }
}

/// The floor only changes on arrival, so while `Moving` it is still the departure floor.
fn describe_transition(state: &ElevatorState) -> String {
    match state.status {
        Status::Moving { target } => {
            format!("Moving from floor {} to floor {}", state.floor, target)
        }
        Status::DoorsOpening => format!("Doors opening at floor {}", state.floor),
        Status::DoorsOpen => format!("Doors open at floor {}", state.floor),
        Status::DoorsClosing => format!("Doors closing at floor {}", state.floor),
        Status::Idle => format!("Elevator idle at floor {}", state.floor),
    }
}
