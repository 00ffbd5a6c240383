/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::path::PathBuf;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::console::viewer::FloorFilter;
use crate::log_bridge::LogEntry;
use crate::shared::{Command, Status, GROUND_FLOOR, TOP_FLOOR};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Elevator(Command),
    ViewLogs {
        filter: FloorFilter,
        search: Option<String>,
    },
    ClearLogs,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

/// What the front-end currently shows; used to decide which presses are worth logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMirror {
    pub floor: u8,
    pub status: Status,
    pub alarm: bool,
}

impl DisplayMirror {
    pub fn new(floor: u8) -> DisplayMirror {
        DisplayMirror {
            floor,
            status: Status::Idle,
            alarm: false,
        }
    }
}

pub const HELP: &str = "\
Commands:
  g | 1             go to the Ground Floor
  2                 go to Floor 1
  floor <n>         request floor n
  up | down         call the elevator up / down
  open | close      door open / door close buttons
  alarm             toggle the emergency alarm
  logs [all|1|2] [text]   show the operation log, optionally filtered
  export [file]     export the last log listing as CSV
  clear             delete every log entry (asks for confirmation)
  help              show this text
  quit              exit";

/***************************************/
/*             Public API              */
/***************************************/
pub fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let keyword = match words.next() {
        Some(word) => word.to_lowercase(),
        None => return Err("empty command".to_string()),
    };
    let rest: Vec<&str> = words.collect();

    let input = match keyword.as_str() {
        "g" | "ground" | "1" => Input::Elevator(Command::RequestFloor(GROUND_FLOOR)),
        "2" => Input::Elevator(Command::RequestFloor(TOP_FLOOR)),
        "floor" => {
            let floor = rest
                .first()
                .ok_or_else(|| "usage: floor <n>".to_string())?
                .parse::<u8>()
                .map_err(|_| "floor must be a number".to_string())?;
            Input::Elevator(Command::RequestFloor(floor))
        }
        "up" => Input::Elevator(Command::CallUp),
        "down" => Input::Elevator(Command::CallDown),
        "open" => Input::Elevator(Command::OpenDoors),
        "close" => Input::Elevator(Command::CloseDoors),
        "alarm" => Input::Elevator(Command::ToggleAlarm),
        "logs" | "log" => {
            let (filter, search_words) = match rest.first().map(|w| w.to_lowercase()) {
                Some(w) if w == "all" => (FloorFilter::All, &rest[1..]),
                Some(w) if w == "1" || w == "2" => {
                    let floor = if w == "1" { 1 } else { 2 };
                    (FloorFilter::Floor(floor), &rest[1..])
                }
                _ => (FloorFilter::All, &rest[..]),
            };
            let search = if search_words.is_empty() {
                None
            } else {
                Some(search_words.join(" "))
            };
            Input::ViewLogs { filter, search }
        }
        "clear" => Input::ClearLogs,
        "export" => Input::Export(rest.first().map(PathBuf::from)),
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command '{}', type 'help'", other)),
    };

    Ok(input)
}

pub fn floor_label(floor: u8) -> &'static str {
    match floor {
        GROUND_FLOOR => "Ground Floor (G)",
        TOP_FLOOR => "Floor 1",
        _ => "Unknown floor",
    }
}

fn floor_button_label(floor: u8) -> &'static str {
    match floor {
        GROUND_FLOOR => "Ground Floor",
        _ => "Floor 1",
    }
}

/// The entry the front-end writes for a button press, if the press does anything.
///
/// Judged against the mirror, which trails the coordinator until its status update arrives. A
/// quick second press is therefore judged against the old state: the coordinator ignores the
/// command, and the bridge drops the second write while the first is still in flight.
pub fn press_log_entry(command: Command, view: &DisplayMirror) -> Option<LogEntry> {
    let idle = view.status == Status::Idle;
    if view.alarm && command != Command::ToggleAlarm {
        return None;
    }

    match command {
        Command::RequestFloor(floor)
            if (GROUND_FLOOR..=TOP_FLOOR).contains(&floor) && floor != view.floor && idle =>
        {
            Some(LogEntry::new(
                view.floor,
                "Moving",
                format!("User pressed {} button", floor_button_label(floor)),
            ))
        }
        Command::CallUp if view.floor == GROUND_FLOOR && idle => Some(LogEntry::new(
            view.floor,
            "Called Up",
            "User pressed Call Up button",
        )),
        Command::CallDown if view.floor != GROUND_FLOOR && idle => Some(LogEntry::new(
            view.floor,
            "Called Down",
            "User pressed Call Down button",
        )),
        Command::OpenDoors if idle => Some(LogEntry::new(
            view.floor,
            "Doors Opening",
            "User pressed Door Open button",
        )),
        Command::CloseDoors if view.status == Status::DoorsOpen => Some(LogEntry::new(
            view.floor,
            "Doors Closing",
            "User pressed Door Close button",
        )),
        Command::ToggleAlarm if !view.alarm => Some(LogEntry::new(
            view.floor,
            "EMERGENCY ALARM ACTIVATED",
            format!(
                "[EMERGENCY] EMERGENCY ALARM ACTIVATED at {} - User initiated emergency alarm",
                floor_label(view.floor)
            ),
        )),
        Command::ToggleAlarm => Some(LogEntry::new(
            view.floor,
            "EMERGENCY ALARM DEACTIVATED",
            format!(
                "[EMERGENCY] EMERGENCY ALARM DEACTIVATED at {} - Emergency resolved",
                floor_label(view.floor)
            ),
        )),
        _ => None,
    }
}
