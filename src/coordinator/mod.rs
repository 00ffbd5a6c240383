pub mod coordinator;

pub use coordinator::stage_timer_for;
pub use coordinator::Coordinator;
