//! Severity definitions
//!
//! Lower numeric value is strictly more severe. `Undefined` sorts below
//! every real severity, so a ceiling of `Undefined` admits nothing.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[repr(i8)]
pub enum Severity {
    #[default]
    Undefined = -1,
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    /// All real severities, most severe first
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Undefined => "Undefined",
            Severity::Emergency => "Emergency",
            Severity::Alert => "Alert",
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Notice => "Notice",
            Severity::Info => "Info",
            Severity::Debug => "Debug",
        }
    }

    /// Bracketed one-letter label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Undefined => "[U]",
            Severity::Emergency => "[M]",
            Severity::Alert => "[A]",
            Severity::Critical => "[C]",
            Severity::Error => "[E]",
            Severity::Warning => "[W]",
            Severity::Notice => "[N]",
            Severity::Info => "[I]",
            Severity::Debug => "[D]",
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Severity::Emergency | Severity::Alert => BrightRed,
            Severity::Critical | Severity::Error => Red,
            Severity::Warning => Yellow,
            Severity::Notice => Cyan,
            Severity::Info => Green,
            Severity::Debug | Severity::Undefined => BrightBlack,
        }
    }

    /// Numeric value, -1 for `Undefined`
    #[inline]
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Inverse of [`Severity::as_i8`]; out-of-range values map to `Undefined`
    pub fn from_i8(value: i8) -> Self {
        match value {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            7 => Severity::Debug,
            _ => Severity::Undefined,
        }
    }

    /// Parse a configured name, degrading to `Undefined` when it is not recognised
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Severity::Undefined)
    }

    #[inline]
    pub fn is_defined(self) -> bool {
        self != Severity::Undefined
    }

    /// True when a call at `self` passes a ceiling of `ceiling`
    #[inline]
    pub fn passes(self, ceiling: Severity) -> bool {
        self.is_defined() && self <= ceiling
    }

    /// Should the console route this severity to stderr
    pub fn is_error_or_worse(self) -> bool {
        self.is_defined() && self <= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emergency" | "emerg" => Ok(Severity::Emergency),
            "alert" => Ok(Severity::Alert),
            "critical" | "crit" => Ok(Severity::Critical),
            "error" | "err" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "notice" => Ok(Severity::Notice),
            "info" | "informational" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            _ => Err(LoggerError::InvalidSeverity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_numeric_value() {
        assert!(Severity::Emergency < Severity::Debug);
        assert!(Severity::Undefined < Severity::Emergency);
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].as_i8() < pair[1].as_i8());
        }
    }

    #[test]
    fn test_labels() {
        let labels: Vec<&str> = Severity::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["[M]", "[A]", "[C]", "[E]", "[W]", "[N]", "[I]", "[D]"]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(" Debug ".parse::<Severity>().unwrap(), Severity::Debug);
        assert!("verbose".parse::<Severity>().is_err());
        assert_eq!(Severity::parse_lenient("verbose"), Severity::Undefined);
    }

    #[test]
    fn test_i8_roundtrip_and_out_of_range() {
        for s in Severity::ALL {
            assert_eq!(Severity::from_i8(s.as_i8()), s);
        }
        assert_eq!(Severity::from_i8(-1), Severity::Undefined);
        assert_eq!(Severity::from_i8(42), Severity::Undefined);
    }

    #[test]
    fn test_passes() {
        assert!(Severity::Error.passes(Severity::Warning));
        assert!(Severity::Warning.passes(Severity::Warning));
        assert!(!Severity::Debug.passes(Severity::Warning));
        assert!(!Severity::Emergency.passes(Severity::Undefined));
        assert!(!Severity::Undefined.passes(Severity::Debug));
    }
}
