mod entry_order;
mod log_level;

pub use entry_order::EntryOrder;
pub use log_level::LogLevel;
