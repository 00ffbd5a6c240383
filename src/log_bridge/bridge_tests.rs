/*
 * Unit tests for log_bridge module
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 * A writer with an artificial delay stands in for a slow disk.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod bridge_tests {
    use crate::database::{LogStore, LogWriter};
    use crate::log_bridge::{LogBridge, LogCompletion, LogEntry};
    use crate::shared::StoreError;
    use crossbeam_channel::{unbounded, Receiver};
    use std::sync::Arc;
    use std::thread::sleep;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(3);

    struct SlowWriter {
        store: Arc<LogStore>,
        delay: Duration,
    }

    impl LogWriter for SlowWriter {
        fn insert(&self, floor: i64, status: &str) -> Result<i64, StoreError> {
            sleep(self.delay);
            self.store.insert(floor, status)
        }
    }

    struct FailingWriter;

    impl LogWriter for FailingWriter {
        fn insert(&self, _floor: i64, _status: &str) -> Result<i64, StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    fn setup_bridge(delay: Duration) -> (LogBridge, Arc<LogStore>, Receiver<LogCompletion>) {
        let store = Arc::new(LogStore::open_in_memory().unwrap());
        let writer = Arc::new(SlowWriter {
            store: store.clone(),
            delay,
        });
        let (completion_tx, completion_rx) = unbounded::<LogCompletion>();

        (
            LogBridge::new("test", writer, completion_tx),
            store,
            completion_rx,
        )
    }

    #[test]
    fn test_entry_status_text() {
        assert_eq!(
            LogEntry::new(1, "Moving", "Moving from floor 1 to floor 2").status_text(),
            "Moving - Moving from floor 1 to floor 2"
        );
        assert_eq!(LogEntry::new(2, "Idle", "").status_text(), "Idle");
    }

    #[test]
    fn test_log_async_writes_and_reports() {
        // Arrange
        let (bridge, store, completion_rx) = setup_bridge(Duration::ZERO);

        // Act
        let accepted = bridge.log_async(LogEntry::new(2, "Arrived", "Arrived at floor 2"));
        let completion = completion_rx.recv_timeout(TIMEOUT).unwrap();

        // Assert
        assert!(accepted);
        assert!(completion.ok);
        assert_eq!(completion.bridge, "test");
        let records = store.fetch_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(Some(records[0].id), completion.id);
        assert_eq!(records[0].floor, 2);
        assert_eq!(records[0].status, "Arrived - Arrived at floor 2");
    }

    #[test]
    fn test_second_write_while_busy_is_dropped() {
        // Arrange
        let (bridge, store, completion_rx) = setup_bridge(Duration::from_millis(200));

        // Act
        let first = bridge.log_async(LogEntry::new(1, "Moving", "first"));
        let busy = bridge.is_busy();
        let second = bridge.log_async(LogEntry::new(1, "DoorsOpening", "second"));
        let completion = completion_rx.recv_timeout(TIMEOUT).unwrap();

        // Assert
        assert!(first);
        assert!(busy);
        assert!(!second);
        assert!(completion.ok);
        assert!(completion_rx.recv_timeout(Duration::from_millis(300)).is_err());
        let records = store.fetch_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "Moving - first");
    }

    #[test]
    fn test_bridge_accepts_again_after_completion() {
        // Arrange
        let (bridge, store, completion_rx) = setup_bridge(Duration::from_millis(20));
        assert!(bridge.log_async(LogEntry::new(1, "Moving", "")));
        completion_rx.recv_timeout(TIMEOUT).unwrap();

        // Act
        let accepted = bridge.log_async(LogEntry::new(2, "Arrived", ""));
        completion_rx.recv_timeout(TIMEOUT).unwrap();

        // Assert
        assert!(accepted);
        assert!(!bridge.is_busy());
        assert_eq!(store.fetch_all().unwrap().len(), 2);
    }

    #[test]
    fn test_clones_share_the_in_flight_gate() {
        let (bridge, store, completion_rx) = setup_bridge(Duration::from_millis(200));
        let clone = bridge.clone();

        assert!(bridge.log_async(LogEntry::new(1, "Moving", "")));
        assert!(!clone.log_async(LogEntry::new(1, "Moving", "again")));

        completion_rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn test_independent_bridges_write_concurrently() {
        // Arrange
        let store = Arc::new(LogStore::open_in_memory().unwrap());
        let (completion_tx, completion_rx) = unbounded::<LogCompletion>();
        let slow = |name| {
            LogBridge::new(
                name,
                Arc::new(SlowWriter {
                    store: store.clone(),
                    delay: Duration::from_millis(100),
                }),
                completion_tx.clone(),
            )
        };
        let controller = slow("controller");
        let front_end = slow("front_end");

        // Act
        let a = controller.log_async(LogEntry::new(1, "Moving", ""));
        let b = front_end.log_async(LogEntry::new(1, "Called Up", ""));
        let done: Vec<LogCompletion> = (0..2)
            .map(|_| completion_rx.recv_timeout(TIMEOUT).unwrap())
            .collect();

        // Assert
        assert!(a && b);
        assert!(done.iter().all(|c| c.ok));
        assert_eq!(store.fetch_all().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_write_is_reported_not_retried() {
        // Arrange
        let (completion_tx, completion_rx) = unbounded::<LogCompletion>();
        let bridge = LogBridge::new("failing", Arc::new(FailingWriter), completion_tx);

        // Act
        let accepted = bridge.log_async(LogEntry::new(1, "Moving", ""));
        let completion = completion_rx.recv_timeout(TIMEOUT).unwrap();

        // Assert
        assert!(accepted);
        assert!(!completion.ok);
        assert_eq!(completion.id, None);
        assert!(completion.message.starts_with("Failed to log operation"));
        assert!(completion_rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(!bridge.is_busy());
    }
}
