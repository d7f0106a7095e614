use std::sync::Mutex;

use crate::append_launcher_log;

/// Native window actions the command handlers may trigger.
pub(crate) trait UiControl: Send + Sync {
    fn close_browser(&self);
    fn minimize_window(&self);
    /// Restores and foregrounds the window, then asks the page to re-read
    /// its scale factor.
    fn show_window(&self);
    /// `None` when the picker was cancelled.
    fn pick_folder(&self) -> Option<String>;
}

pub(crate) trait BrowserInstance {
    /// Identity, not structural equality.
    fn is_same(&self, other: &Self) -> bool;
    fn detach_from_parent(&self);
}

/// Tracks the open browsers of one UI session and ends the session when
/// the last of them has closed.
pub(crate) struct BrowserLifecycle<B> {
    browsers: Mutex<Vec<B>>,
    on_last_closed: Box<dyn Fn() + Send + Sync>,
}

impl<B: BrowserInstance> BrowserLifecycle<B> {
    pub(crate) fn new<F>(on_last_closed: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            browsers: Mutex::new(Vec::new()),
            on_last_closed: Box::new(on_last_closed),
        }
    }

    pub(crate) fn on_after_created(&self, browser: B) {
        let mut browsers = self.lock_browsers();
        if browsers.iter().any(|tracked| tracked.is_same(&browser)) {
            return;
        }
        browsers.push(browser);
    }

    /// Never vetoes the close.
    pub(crate) fn on_close_requested(&self, browser: &B) {
        browser.detach_from_parent();
    }

    pub(crate) fn on_before_close(&self, browser: &B) {
        let now_empty = {
            let mut browsers = self.lock_browsers();
            let Some(index) = browsers.iter().position(|tracked| tracked.is_same(browser)) else {
                return;
            };
            browsers.remove(index);
            browsers.is_empty()
        };

        if now_empty {
            append_launcher_log("last browser closed; quitting ui loop");
            (self.on_last_closed)();
        }
    }

    pub(crate) fn is_closed(&self, browser: &B) -> bool {
        !self
            .lock_browsers()
            .iter()
            .any(|tracked| tracked.is_same(browser))
    }

    pub(crate) fn open_count(&self) -> usize {
        self.lock_browsers().len()
    }

    fn lock_browsers(&self) -> std::sync::MutexGuard<'_, Vec<B>> {
        self.browsers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
