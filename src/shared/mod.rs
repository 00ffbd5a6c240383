pub mod errors;
pub mod macros;
pub mod structs;

pub use errors::ConfigError;
pub use errors::ElevatorError;
pub use errors::ExportError;
pub use errors::StoreError;
pub use structs::Command;
pub use structs::DisplayUpdate;
pub use structs::ElevatorState;
pub use structs::LogRecord;
pub use structs::Status;
pub use structs::{GROUND_FLOOR, TOP_FLOOR};
