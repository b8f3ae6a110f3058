use std::sync::atomic::{AtomicBool, Ordering};

use cuidar_core::theme::ThemeSurface;

/// Theme surface for headless front-ends: remembers the dark marker and
/// reports changes through tracing.
#[derive(Debug, Default)]
pub struct TracingSurface {
    dark: AtomicBool,
}

impl TracingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dark(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }
}

impl ThemeSurface for TracingSurface {
    fn set_dark(&self, dark: bool) {
        let previous = self.dark.swap(dark, Ordering::SeqCst);
        if previous != dark {
            tracing::debug!(dark, "Root dark marker changed");
        }
    }
}
