use crate::core::Surface;
use std::sync::Mutex;

/// Terminal surface: alerts go to stderr, navigation becomes a hint to log in again.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn alert(&self, message: &str) {
        tracing::warn!("⚠️ {}", message);
        eprintln!("⚠️  {}", message);
    }

    fn navigate(&self, location: &str) {
        tracing::info!("➡️ Redirecting to {}", location);
        eprintln!("➡️  Please sign in again ({}): run `tour-erp login`", location);
    }
}

/// Records every alert and navigation; used by embedders that render the
/// messages themselves, and by tests.
#[derive(Debug, Default)]
pub struct MemorySurface {
    alerts: Mutex<Vec<String>>,
    navigations: Mutex<Vec<String>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Surface for MemorySurface {
    fn alert(&self, message: &str) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(message.to_string());
        }
    }

    fn navigate(&self, location: &str) {
        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(location.to_string());
        }
    }
}
