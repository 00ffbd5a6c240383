/*
 * Unit tests for timer module
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 * Time is passed in explicitly, so none of these tests sleep.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod timer_tests {
    use crate::timer::TimerQueue;
    use std::time::{Duration, Instant};

    #[test]
    fn test_empty_queue_has_no_deadline() {
        let queue: TimerQueue<&str> = TimerQueue::new();

        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        // Arrange
        let now = Instant::now();
        let mut queue = TimerQueue::new();

        // Act
        queue.schedule(now, Duration::from_millis(300), "late");
        queue.schedule(now, Duration::from_millis(100), "early");

        // Assert
        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(100)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_pop_expired_returns_due_timers_in_order() {
        // Arrange
        let now = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(now, Duration::from_millis(200), "second");
        queue.schedule(now, Duration::from_millis(100), "first");
        queue.schedule(now, Duration::from_millis(500), "pending");

        // Act
        let fired: Vec<&str> = queue
            .pop_expired(now + Duration::from_millis(250))
            .into_iter()
            .map(|(_, payload)| payload)
            .collect();

        // Assert
        assert_eq!(fired, vec!["first", "second"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        // Arrange
        let now = Instant::now();
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(now, Duration::from_millis(10), "auto-close");

        // Act
        let cancelled = queue.cancel(handle);
        let cancelled_twice = queue.cancel(handle);

        // Assert
        assert!(cancelled);
        assert!(!cancelled_twice);
        assert!(!queue.is_pending(handle));
        assert!(queue.pop_expired(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_handles_are_unique() {
        let now = Instant::now();
        let mut queue = TimerQueue::new();

        let first = queue.schedule(now, Duration::ZERO, ());
        queue.cancel(first);
        let second = queue.schedule(now, Duration::ZERO, ());

        assert_ne!(first, second);
        assert!(queue.is_pending(second));
    }

    #[test]
    fn test_cancel_all() {
        let now = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(now, Duration::from_millis(1), 1);
        queue.schedule(now, Duration::from_millis(2), 2);

        assert_eq!(queue.cancel_all(), 2);
        assert!(queue.is_empty());
        assert!(queue.pop_expired(now + Duration::from_secs(1)).is_empty());
    }
}
