pub mod commands;
pub mod console;
pub mod viewer;

pub use commands::{parse_input, Input};
pub use console::{spawn_input_reader, Console};
pub use viewer::FloorFilter;
