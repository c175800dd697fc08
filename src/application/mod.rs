pub mod monitor;

pub use monitor::{render_half_life, render_line, Monitor, MonitorError, MonitorStatus, TickOutcome};
