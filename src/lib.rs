//! Launch bundled Android device tools (`adb`, `fastboot`) against a
//! specific device and optionally capture what they print.
//!
//! ```no_run
//! use adtrun::ToolRunner;
//!
//! let runner = ToolRunner::new("/opt/platform-tools");
//! runner.adb(Some("ABC123"), &["reboot", "bootloader"]);
//! let devices = runner.fastboot_capture(None, &["devices"]);
//! ```

pub mod error;
pub mod launch;
pub mod logging;
pub mod runner;
pub mod tool;

pub use error::{Result, ToolError};
pub use launch::{prepare_launch, LaunchOptions, LaunchSpec};
pub use runner::{Captured, ToolRunner};
pub use tool::Tool;
