/***************************************/
/*        3rd party libraries          */
/***************************************/
use chrono::Local;
use crossbeam_channel as cbc;
use log::{debug, warn};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::Builder;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::console::commands::{floor_label, parse_input, press_log_entry, DisplayMirror, Input, HELP};
use crate::console::viewer::{filter_records, render_table, summarize, FloorFilter};
use crate::database::export::default_export_name;
use crate::database::{export_csv, LogStore};
use crate::log_bridge::{LogBridge, LogCompletion};
use crate::shared::{Command, DisplayUpdate, ExportError, StoreError};

/**
 * Text front-end for the simulator.
 *
 * Stands in for the window: it turns typed lines into `Command`s for the coordinator, prints
 * display updates and serves the log viewer actions straight from the store. Button presses are
 * logged through the front-end's own bridge, independent of the coordinator's.
 *
 * # Fields
 * - `store`:           Shared log store, used directly for viewing, exporting and clearing.
 * - `bridge`:          Front-end level logging bridge.
 * - `command_tx`:      Sends commands to the coordinator.
 * - `input_rx`:        Receives input lines from the stdin reader thread.
 * - `display_rx`:      Receives display updates from the coordinator.
 * - `log_done_rx`:     Receives completions from `bridge`.
 * - `view`:            What is currently on screen.
 * - `log_filter`:      Floor filter of the last log listing; exports use it too.
 * - `log_search`:      Search text of the last log listing.
 * - `confirm_clear`:   Set while waiting for the user to confirm a clear.
 */
pub struct Console {
    store: Arc<LogStore>,
    bridge: LogBridge,
    command_tx: cbc::Sender<Command>,
    input_rx: cbc::Receiver<String>,
    display_rx: cbc::Receiver<DisplayUpdate>,
    log_done_rx: cbc::Receiver<LogCompletion>,
    view: DisplayMirror,
    log_filter: FloorFilter,
    log_search: Option<String>,
    confirm_clear: bool,
}

impl Console {
    pub fn new(
        store: Arc<LogStore>,
        bridge: LogBridge,
        initial_floor: u8,
        command_tx: cbc::Sender<Command>,
        input_rx: cbc::Receiver<String>,
        display_rx: cbc::Receiver<DisplayUpdate>,
        log_done_rx: cbc::Receiver<LogCompletion>,
    ) -> Console {
        Console {
            store,
            bridge,
            command_tx,
            input_rx,
            display_rx,
            log_done_rx,
            view: DisplayMirror::new(initial_floor),
            log_filter: FloorFilter::All,
            log_search: None,
            confirm_clear: false,
        }
    }

    pub fn run(mut self) {
        println!("{}", HELP);

        // Main loop
        loop {
            cbc::select! {
                recv(self.input_rx) -> line => {
                    match line {
                        Ok(line) => {
                            if !self.handle_line(&line) {
                                break;
                            }
                        }
                        Err(_) => {
                            debug!("Input closed");
                            break;
                        }
                    }
                }
                recv(self.display_rx) -> update => {
                    match update {
                        Ok(update) => self.handle_display_update(update),
                        Err(_) => {
                            warn!("Coordinator stopped");
                            break;
                        }
                    }
                }
                recv(self.log_done_rx) -> completion => {
                    if let Ok(completion) = completion {
                        debug!("[{}] {}", completion.bridge, completion.message);
                    }
                }
            }
        }

        let _ = self.command_tx.send(Command::Shutdown);
    }

    /// Returns false once the user asked to quit.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }

        if self.confirm_clear {
            self.confirm_clear = false;
            if matches!(line.to_lowercase().as_str(), "y" | "yes") {
                match self.clear_logs() {
                    Ok(removed) => println!("All logs have been cleared ({} removed).", removed),
                    Err(e) => println!("Error clearing logs: {}", e),
                }
            } else {
                println!("Clear cancelled.");
            }
            return true;
        }

        let input = match parse_input(line) {
            Ok(input) => input,
            Err(e) => {
                println!("{}", e);
                return true;
            }
        };

        match input {
            Input::Elevator(command) => self.press(command),
            Input::ViewLogs { filter, search } => {
                self.log_filter = filter;
                self.log_search = search;
                match self.view_logs(self.log_filter, self.log_search.as_deref()) {
                    Ok(text) => print!("{}", text),
                    Err(e) => println!("Error loading logs: {}", e),
                }
            }
            Input::ClearLogs => {
                println!("Are you sure you want to delete ALL log entries? This cannot be undone. [y/N]");
                self.confirm_clear = true;
            }
            Input::Export(path) => match self.export_logs(path) {
                Ok(Some((count, path))) => {
                    println!("Exported {} records successfully: {}", count, path.display())
                }
                Ok(None) => println!("No data to export."),
                Err(e) => println!("Error exporting logs: {}", e),
            },
            Input::Help => println!("{}", HELP),
            Input::Quit => return false,
        }

        true
    }

    pub fn press(&mut self, command: Command) {
        if let Some(entry) = press_log_entry(command, &self.view) {
            self.bridge.log_async(entry);
        }
        if self.command_tx.send(command).is_err() {
            warn!("Coordinator is not running, {:?} dropped", command);
        }
    }

    pub fn view_logs(&self, filter: FloorFilter, search: Option<&str>) -> Result<String, StoreError> {
        let records = self.store.fetch_all()?;
        let shown = filter_records(&records, filter, search);
        let summary = summarize(&records);

        let mut text = render_table(&shown);
        text.push_str(&format!(
            "Showing {} of {} | Floor 1: {} | Floor 2: {}\n",
            shown.len(),
            summary.total,
            summary.floor_1,
            summary.floor_2
        ));
        Ok(text)
    }

    pub fn clear_logs(&self) -> Result<usize, StoreError> {
        self.store.clear_all()
    }

    /// Exports what the last `logs` listing showed. `Ok(None)` when that is nothing.
    pub fn export_logs(&self, path: Option<PathBuf>) -> Result<Option<(usize, PathBuf)>, ExportError> {
        let records = filter_records(
            &self.store.fetch_all()?,
            self.log_filter,
            self.log_search.as_deref(),
        );
        if records.is_empty() {
            return Ok(None);
        }

        let path = path.unwrap_or_else(|| PathBuf::from(default_export_name(&Local::now().naive_local())));
        let count = export_csv(&records, &path)?;
        Ok(Some((count, path)))
    }

    pub fn view(&self) -> &DisplayMirror {
        &self.view
    }

    pub fn handle_display_update(&mut self, update: DisplayUpdate) {
        if let Some(text) = self.apply(update) {
            println!("{}", text);
        }
    }

    /// Updates the mirror and returns the line to print, if any.
    fn apply(&mut self, update: DisplayUpdate) -> Option<String> {
        match update {
            DisplayUpdate::Floor(floor) => {
                self.view.floor = floor;
                Some(format!("Floor: {}", floor_label(floor)))
            }
            DisplayUpdate::Status { status, name } => {
                self.view.status = status;
                Some(format!("[{}] {}", floor_label(self.view.floor), name))
            }
            DisplayUpdate::Alarm(active) => {
                self.view.alarm = active;
                if active {
                    Some(format!(
                        "!!! EMERGENCY ALARM ACTIVE at {} !!! Type 'alarm' to reset.",
                        floor_label(self.view.floor)
                    ))
                } else {
                    Some("Emergency alarm deactivated.".to_string())
                }
            }
            DisplayUpdate::LogWritten { ok, message } => {
                debug!("Log write finished (ok: {}): {}", ok, message);
                None
            }
            DisplayUpdate::Rejected(message) => Some(format!("Notice: {}", message)),
        }
    }
}

/// Forwards stdin lines until EOF. Dropping the sender is how the console learns input ended.
pub fn spawn_input_reader(input_tx: cbc::Sender<String>) -> io::Result<()> {
    Builder::new()
        .name("console_input".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if input_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        })
        .map(|_| ())
}
