use crate::shared::{ElevatorError, ElevatorState, Status, GROUND_FLOOR, TOP_FLOOR};
use log::{debug, info};

/**
 * Owns the elevator cab: its current floor and what it is currently doing.
 *
 * The `ElevatorFSM` (Finite State Machine) is the single place deciding what happens when a floor is
 * requested or a timed stage completes. It never blocks and never schedules anything itself: the
 * coordinator thread feeds it events and schedules the follow-up timers for whatever status it
 * reports back.
 *
 * # Fields
 * - `state`:               Current floor and status of the cab.
 * - `on_floor_changed`:    Invoked inline whenever the floor changes.
 * - `on_state_changed`:    Invoked inline on every transition with the new state and its display name.
 *
 * # Transitions
 * - `Idle`           --FloorRequested(other)-->  `Moving(target)`
 * - `Idle`           --FloorRequested(same)--->  `DoorsOpening`
 * - `Moving(target)` --Arrived---------------->  `DoorsOpening` (floor set to target first)
 * - `DoorsOpening`   --DoorsOpened------------>  `DoorsOpen`
 * - `DoorsOpen`      --HoldExpired / CloseRequested--> `DoorsClosing`
 * - `DoorsClosing`   --DoorsClosed------------>  `Idle`
 *
 * Every other (status, event) pair is ignored.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    FloorRequested(u8),
    Arrived,
    DoorsOpened,
    HoldExpired,
    CloseRequested,
    DoorsClosed,
}

pub type FloorChangedFn = Box<dyn FnMut(&ElevatorState) + Send>;
pub type StateChangedFn = Box<dyn FnMut(&ElevatorState, &'static str) + Send>;

pub struct ElevatorFSM {
    state: ElevatorState,
    on_floor_changed: Option<FloorChangedFn>,
    on_state_changed: Option<StateChangedFn>,
}

/// Dispatch table for the cab. Pure, so it can be checked exhaustively.
pub fn next_status(state: &ElevatorState, event: Event) -> Option<Status> {
    match (state.status, event) {
        (Status::Idle, Event::FloorRequested(target)) if target == state.floor => {
            Some(Status::DoorsOpening)
        }
        (Status::Idle, Event::FloorRequested(target)) => Some(Status::Moving { target }),
        (Status::Moving { .. }, Event::Arrived) => Some(Status::DoorsOpening),
        (Status::DoorsOpening, Event::DoorsOpened) => Some(Status::DoorsOpen),
        (Status::DoorsOpen, Event::HoldExpired) | (Status::DoorsOpen, Event::CloseRequested) => {
            Some(Status::DoorsClosing)
        }
        (Status::DoorsClosing, Event::DoorsClosed) => Some(Status::Idle),
        _ => None,
    }
}

pub fn validate_floor(floor: u8) -> Result<u8, ElevatorError> {
    if (GROUND_FLOOR..=TOP_FLOOR).contains(&floor) {
        Ok(floor)
    } else {
        Err(ElevatorError::InvalidFloor(floor))
    }
}

impl ElevatorFSM {
    pub fn new(initial_floor: u8) -> Result<ElevatorFSM, ElevatorError> {
        Ok(ElevatorFSM {
            state: ElevatorState::new(validate_floor(initial_floor)?),
            on_floor_changed: None,
            on_state_changed: None,
        })
    }

    pub fn on_floor_changed(&mut self, callback: impl FnMut(&ElevatorState) + Send + 'static) {
        self.on_floor_changed = Some(Box::new(callback));
    }

    pub fn on_state_changed(
        &mut self,
        callback: impl FnMut(&ElevatorState, &'static str) + Send + 'static,
    ) {
        self.on_state_changed = Some(Box::new(callback));
    }

    pub fn state(&self) -> &ElevatorState {
        &self.state
    }

    pub fn floor(&self) -> u8 {
        self.state.floor
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    /// Returns the new status when the request started a transition, `None` when it was ignored.
    pub fn request_floor(&mut self, target: u8) -> Result<Option<Status>, ElevatorError> {
        self.handle_event(Event::FloorRequested(target))
    }

    pub fn handle_event(&mut self, event: Event) -> Result<Option<Status>, ElevatorError> {
        if let Event::FloorRequested(target) = event {
            validate_floor(target)?;
        }

        let next = match next_status(&self.state, event) {
            Some(next) => next,
            None => {
                debug!(
                    "{} ignored while {} at floor {}",
                    describe_event(event),
                    self.state.status,
                    self.state.floor
                );
                return Ok(None);
            }
        };

        if let (Status::Moving { target }, Event::Arrived) = (self.state.status, event) {
            self.set_floor(target);
        }

        self.transition_to(next);
        Ok(Some(next))
    }

    pub fn set_floor(&mut self, floor: u8) {
        self.state.floor = floor;
        if let Some(callback) = self.on_floor_changed.as_mut() {
            callback(&self.state);
        }
    }

    pub fn transition_to(&mut self, status: Status) {
        info!(
            "Floor {}: {} -> {}",
            self.state.floor, self.state.status, status
        );
        self.state.status = status;
        if let Some(callback) = self.on_state_changed.as_mut() {
            callback(&self.state, status.name());
        }
    }
}

fn describe_event(event: Event) -> String {
    match event {
        Event::FloorRequested(floor) => format!("Request to floor {}", floor),
        other => format!("{:?}", other),
    }
}
