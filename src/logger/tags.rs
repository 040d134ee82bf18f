/// Log tags identifying the subsystem a message originates from
///
/// Each tag maps to a `--debug-<tag>` command-line flag so diagnostics can be
/// enabled per subsystem without drowning the console.

use colored::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Api,
    Cache,
    Link,
    Config,
    System,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Api => "API",
            LogTag::Cache => "CACHE",
            LogTag::Link => "LINK",
            LogTag::Config => "CONFIG",
            LogTag::System => "SYSTEM",
        }
    }

    /// Key used in `--debug-<key>` flags.
    pub fn to_debug_key(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Console color for the tag column.
    pub fn color(&self) -> Color {
        match self {
            LogTag::Api => Color::Green,
            LogTag::Cache => Color::Cyan,
            LogTag::Link => Color::Magenta,
            LogTag::Config => Color::Yellow,
            LogTag::System => Color::Blue,
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
