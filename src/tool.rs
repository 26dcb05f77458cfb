use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ToolError;

/// Device tools shipped alongside the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Adb,
    Fastboot,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Adb => "adb",
            Tool::Fastboot => "fastboot",
        }
    }

    /// File name of the executable inside the tool directory, e.g. `adb.exe` on Windows.
    pub fn file_name(self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.name(), std::env::consts::EXE_SUFFIX))
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adb" => Ok(Tool::Adb),
            "fastboot" => Ok(Tool::Fastboot),
            _ => Err(ToolError::UnknownTool(s.to_string())),
        }
    }
}
