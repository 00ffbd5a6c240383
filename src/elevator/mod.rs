pub mod fsm;

pub use fsm::ElevatorFSM;
pub use fsm::Event;
pub use fsm::{next_status, validate_floor};
