use crate::conf::{DashboardConfig, LogLevelStyle};
use std::collections::BTreeMap;

/// How a level is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Severity<'a> {
    /// Text of the severity column.
    pub glyph: &'a str,
    /// Class of the severity column itself.
    pub glyph_class: &'a str,
    /// Class applied to the whole line.
    pub class: &'a str,
}

/// Built-in levels plus whatever the configuration adds.
#[derive(Debug, Clone, Default)]
pub struct LevelTable {
    extra: BTreeMap<String, LogLevelStyle>,
}

impl LevelTable {
    pub fn new(extra: BTreeMap<String, LogLevelStyle>) -> Self {
        Self { extra }
    }

    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self::new(cfg.additional_log_levels.clone())
    }

    /// Built-in names win over configured ones; unknown levels show verbatim
    /// under the info class.
    pub fn resolve<'a>(&'a self, level: &'a str) -> Severity<'a> {
        let builtin = match level {
            "DEBUG" => Some(("D", "d")),
            "INFO" => Some(("I", "i")),
            "WARN" | "WARNING" => Some(("W", "w")),
            "ERROR" => Some(("E", "e")),
            "CRITICAL" => Some(("C", "c")),
            _ => None,
        };

        if let Some((glyph, class)) = builtin {
            return Severity {
                glyph,
                glyph_class: class,
                class,
            };
        }

        match self.extra.get(level) {
            Some(style) => Severity {
                glyph: &style.shortname,
                glyph_class: "i",
                class: &style.class,
            },
            None => Severity {
                glyph: level,
                glyph_class: "i",
                class: "i",
            },
        }
    }
}
