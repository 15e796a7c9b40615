use log::{info, warn};

use crate::backend::{Backends, FALLBACK_BACKEND, ImageDisplay, NATIVE_BACKEND, WindowDisplay};
use crate::config::VisualizerConfig;
use crate::figure::FigureOptions;
use crate::host::WindowHost;

struct Snapshot {
    ext_id: String,
    backend: String,
    display: Box<dyn ImageDisplay>,
}

/// Scoped redirection of the plotting backend and display hooks into native windows.
///
/// The session mutably borrows the [`Backends`] it redirects, so two sessions
/// can never overlap. Everything is restored by [`release`](Self::release)
/// or, failing that, on drop.
pub struct BackendSession<'a> {
    backends: &'a mut Backends,
    snapshot: Option<Snapshot>,
}

impl<'a> BackendSession<'a> {
    /// Snapshot the current backend and hooks, then install the native ones.
    ///
    /// A prior backend of `agg` (any case) or an empty name is recorded as
    /// `config.default_backend_if_agg`, so release switches to a backend
    /// that can actually show windows.
    pub fn acquire<H: WindowHost + 'static>(
        backends: &'a mut Backends,
        host: &H,
        ext_id: &str,
        config: &VisualizerConfig,
    ) -> Self {
        let prior = backends.plotting_backend().to_string();
        let backend = if prior.is_empty() || prior.eq_ignore_ascii_case(FALLBACK_BACKEND) {
            info!(
                "[{ext_id}] prior backend `{prior}` is replaced by `{}` on release",
                config.default_backend_if_agg
            );
            config.default_backend_if_agg.clone()
        } else {
            prior
        };
        backends.plotting_backend = NATIVE_BACKEND.to_string();
        let display = backends.swap_display(Box::new(WindowDisplay::new(
            host,
            FigureOptions::from(config),
        )));
        info!("[{ext_id}] visualizer backend acquired");
        Self {
            backends,
            snapshot: Some(Snapshot {
                ext_id: ext_id.to_string(),
                backend,
                display,
            }),
        }
    }

    /// The redirected backends.
    pub fn backends(&mut self) -> &mut Backends {
        self.backends
    }

    /// Backend name that release will switch back to.
    pub fn restore_backend(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|snapshot| snapshot.backend.as_str())
    }

    /// Restore the snapshot and destroy every window of the session.
    pub fn release(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        let Snapshot {
            ext_id,
            backend,
            display,
        } = snapshot;
        if let Err(err) = self.backends.use_backend(&backend) {
            warn!("[{ext_id}] cannot restore backend: {err}; using `{FALLBACK_BACKEND}`");
            self.backends.plotting_backend = FALLBACK_BACKEND.to_string();
        }
        self.backends.reset_style();
        let mut session_display = self.backends.swap_display(display);
        session_display.destroy_all();
        info!(
            "[{ext_id}] visualizer backend released, `{}` restored",
            self.backends.plotting_backend()
        );
    }
}

impl Drop for BackendSession<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}
