mod bench;
mod error;
mod fx2;
mod models;
mod script;
mod tb;
mod uart;
mod vcd;

// Re-export public API
pub use bench::{Bench, CLK_HALF_PERIOD, RESET_CYCLES};
pub use error::SimError;
pub use fx2::DeviceRecord;
pub use models::ModelId;
pub use script::{Command, ScriptError, parse_script, run_command, run_script};
pub use uart::{BIT_PERIOD, UartRx};
