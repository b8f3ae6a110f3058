//! Light/dark theme and the rendering-surface seam.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CuidarError;

/// Visual mode. Light is the new-user default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The literal persisted under the global theme key.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CuidarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CuidarError::InvalidValue(format!("unknown theme '{}'", other))),
        }
    }
}

/// The visual layer's side of the theme contract.
///
/// The whole contract is a single toggle: presence or absence of a "dark"
/// marker on the root rendering context.
pub trait ThemeSurface: Send + Sync {
    fn set_dark(&self, dark: bool);
}
