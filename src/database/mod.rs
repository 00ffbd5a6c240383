pub mod export;
pub mod store;

pub use export::{export_csv, write_csv};
pub use store::LogStore;
pub use store::LogWriter;
