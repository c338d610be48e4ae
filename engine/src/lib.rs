pub mod logging;
pub mod macros;

pub use logging::{init_logging, LogConfig};
