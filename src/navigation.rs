use std::sync::Mutex;

/// Where the user currently is, and the one way to send them elsewhere
///
/// The HTTP client consults it on 401 and the client guard uses it to bounce
/// unauthenticated visitors. The console gets one per request, the CLI one per
/// command.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn navigate(&self, path: &str);
}

/// Navigator that keeps its path history in memory
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![path.into()]),
        }
    }

    /// Last navigation performed after construction, if any
    pub fn redirected_to(&self) -> Option<String> {
        let history = self.history.lock().ok()?;
        if history.len() > 1 {
            history.last().cloned()
        } else {
            None
        }
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().cloned())
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(to = path, "navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_current_path_and_redirects() {
        let nav = HistoryNavigator::at("/clients");
        assert_eq!(nav.current_path(), "/clients");
        assert_eq!(nav.redirected_to(), None);

        nav.navigate("/login");
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.redirected_to().as_deref(), Some("/login"));
    }
}
