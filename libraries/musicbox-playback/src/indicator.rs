//! Optional progress indicator
//!
//! The host may disable indicators. [`Indicator`] hides that behind one
//! type so session code calls it unconditionally.

use musicbox_core::{ProgressIndicator, UserId};

/// Indicator owned by a session; every call is a no-op when disabled
pub struct Indicator {
    inner: Option<Box<dyn ProgressIndicator>>,
    attached_to: Option<UserId>,
}

impl Indicator {
    /// Indicator for hosts that disabled it
    pub fn disabled() -> Self {
        Self {
            inner: None,
            attached_to: None,
        }
    }

    /// Wrap `inner`, hidden, and attach it to `user`
    pub fn attached(mut inner: Box<dyn ProgressIndicator>, user: &UserId) -> Self {
        inner.set_visible(false);
        inner.attach(user);
        Self {
            inner: Some(inner),
            attached_to: Some(user.clone()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn set_visible(&mut self, visible: bool) {
        if let Some(inner) = self.inner.as_mut() {
            inner.set_visible(visible);
        }
    }

    pub fn set_title(&mut self, title: &str) {
        if let Some(inner) = self.inner.as_mut() {
            inner.set_title(title);
        }
    }

    /// Forward `progress`, clamped to `[0, 1]`
    pub fn set_progress(&mut self, progress: f64) {
        if let Some(inner) = self.inner.as_mut() {
            let progress = if progress.is_nan() {
                0.0
            } else {
                progress.clamp(0.0, 1.0)
            };
            inner.set_progress(progress);
        }
    }

    /// Title, fill and reveal in one go
    pub fn show(&mut self, title: &str, progress: f64) {
        self.set_title(title);
        self.set_progress(progress);
        self.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    /// Hide, remove from the user's view and drop the indicator
    ///
    /// Every later call is a no-op.
    pub fn detach(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            inner.set_visible(false);
            if let Some(user) = self.attached_to.take() {
                inner.detach(&user);
            }
        }
    }
}
