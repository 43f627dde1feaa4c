use std::sync::Mutex;

use courier_core::models::Navigation;

/// Applies a navigation effect (browser redirect, printed link, ...)
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: &Navigation);
}

/// Keeps every navigation it is asked to perform
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Navigation> {
        self.visits
            .lock()
            .map(|visits| visits.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, navigation: &Navigation) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(navigation.clone());
        }
    }
}
