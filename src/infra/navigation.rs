use std::sync::Mutex;

use tracing::{info, warn};
use url::Url;

use crate::application::ports::Navigator;

/// Terminal stand-in for the browser: resolves the list page against the
/// site origin and reports it instead of reloading a page.
#[derive(Debug)]
pub struct ConsoleNavigator {
    base: Option<Url>,
    last: Mutex<Option<String>>,
}

impl ConsoleNavigator {
    pub fn new(base: Option<Url>) -> Self {
        Self {
            base,
            last: Mutex::new(None),
        }
    }

    /// Absolute location of `path` when a base is known, otherwise `path`.
    pub fn resolve(&self, path: &str) -> String {
        self.base
            .as_ref()
            .and_then(|base| base.join(path).ok())
            .map_or_else(|| path.to_string(), |url| url.to_string())
    }

    /// The most recent destination, if any navigation happened.
    pub fn last_destination(&self) -> Option<String> {
        match self.last.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        let destination = self.resolve(path);
        info!(destination = %destination, "navigating to list page");
        match self.last.lock() {
            Ok(mut guard) => *guard = Some(destination),
            Err(poisoned) => {
                warn!("navigation state lock poisoned; recovering");
                *poisoned.into_inner() = Some(destination);
            }
        }
    }
}
