pub mod timer_queue;
mod timer_tests;

pub use timer_queue::TimerHandle;
pub use timer_queue::TimerQueue;
