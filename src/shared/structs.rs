/***************************************/
/*        3rd party libraries          */
/***************************************/
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/***************************************/
/*             Constants               */
/***************************************/
pub const GROUND_FLOOR: u8 = 1;
pub const TOP_FLOOR: u8 = 2;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Idle,
    Moving { target: u8 },
    DoorsOpening,
    DoorsOpen,
    DoorsClosing,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match *self {
            Status::Idle => "Idle",
            Status::Moving { .. } => "Moving",
            Status::DoorsOpening => "Doors Opening",
            Status::DoorsOpen => "Doors Open",
            Status::DoorsClosing => "Doors Closing",
        }
    }

    /// Short tag written to the log store for transitions.
    pub fn log_tag(&self) -> &'static str {
        match *self {
            Status::Idle => "Idle",
            Status::Moving { .. } => "Moving",
            Status::DoorsOpening => "DoorsOpening",
            Status::DoorsOpen => "DoorsOpen",
            Status::DoorsClosing => "DoorsClosing",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::Moving { target } => write!(f, "Moving to floor {}", target),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorState {
    pub floor: u8,
    pub status: Status,
}

impl ElevatorState {
    pub fn new(floor: u8) -> ElevatorState {
        ElevatorState {
            floor,
            status: Status::Idle,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub id: i64,
    pub floor: i64,
    pub status: String,
    pub timestamp: NaiveDateTime,
}

/// Inputs accepted by the coordinator thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RequestFloor(u8),
    CallUp,
    CallDown,
    OpenDoors,
    CloseDoors,
    ToggleAlarm,
    Shutdown,
}

/// Everything the front-end needs to redraw itself.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    Floor(u8),
    Status { status: Status, name: &'static str },
    Alarm(bool),
    LogWritten { ok: bool, message: String },
    Rejected(String),
}
