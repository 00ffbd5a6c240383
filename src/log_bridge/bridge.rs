/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::Builder;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::database::LogWriter;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub floor: u8,
    pub status: String,
    pub description: String,
}

impl LogEntry {
    pub fn new(floor: u8, status: impl Into<String>, description: impl Into<String>) -> LogEntry {
        LogEntry {
            floor,
            status: status.into(),
            description: description.into(),
        }
    }

    /// Text stored in the `Status` column.
    pub fn status_text(&self) -> String {
        if self.description.is_empty() {
            self.status.clone()
        } else {
            format!("{} - {}", self.status, self.description)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCompletion {
    pub bridge: &'static str,
    pub ok: bool,
    pub id: Option<i64>,
    pub message: String,
}

/**
 * Pushes log-store writes onto a background thread so the caller never blocks on I/O.
 *
 * At most one write is in flight per bridge. A `log_async` call made while a write is still running
 * is dropped, not queued. When a write finishes, the busy flag is cleared and a `LogCompletion` is
 * sent over `completion_tx`; the owning thread drains that channel, which is how results get back
 * onto the thread that produced the event. Failures are reported there and never retried.
 *
 * Cloning a bridge shares its busy flag.
 */
#[derive(Clone)]
pub struct LogBridge {
    name: &'static str,
    writer: Arc<dyn LogWriter>,
    busy: Arc<AtomicBool>,
    completion_tx: cbc::Sender<LogCompletion>,
}

impl LogBridge {
    pub fn new(
        name: &'static str,
        writer: Arc<dyn LogWriter>,
        completion_tx: cbc::Sender<LogCompletion>,
    ) -> LogBridge {
        LogBridge {
            name,
            writer,
            busy: Arc::new(AtomicBool::new(false)),
            completion_tx,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Returns true if the entry was handed to a background writer, false if it was dropped.
    pub fn log_async(&self, entry: LogEntry) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(
                "[{}] write in flight, dropping log: {}",
                self.name,
                entry.status_text()
            );
            return false;
        }

        let name = self.name;
        let writer = self.writer.clone();
        let busy = self.busy.clone();
        let completion_tx = self.completion_tx.clone();

        let spawned = Builder::new()
            .name(format!("{}_log_writer", name))
            .spawn(move || {
                let status = entry.status_text();
                let result = writer.insert(entry.floor as i64, &status);
                busy.store(false, Ordering::Release);

                let completion = match result {
                    Ok(id) => LogCompletion {
                        bridge: name,
                        ok: true,
                        id: Some(id),
                        message: "Operation logged".to_string(),
                    },
                    Err(e) => {
                        debug!("[{}] database error: {}", name, e);
                        LogCompletion {
                            bridge: name,
                            ok: false,
                            id: None,
                            message: format!("Failed to log operation: {}", e),
                        }
                    }
                };

                if completion_tx.send(completion).is_err() {
                    debug!("[{}] completion receiver gone", name);
                }
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                self.busy.store(false, Ordering::Release);
                debug!("[{}] failed to spawn log writer: {}", self.name, e);
                false
            }
        }
    }
}
