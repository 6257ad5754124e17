use crossbeam_channel::Sender;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;

/// Watches share-link files on a background thread (notify's own threads)
/// and forwards filesystem events into the REPL's channel.
pub struct LinkWatcher {
    watcher: RecommendedWatcher,
}

impl LinkWatcher {
    /// Create a watcher that sends events to the provided channel.
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // Send errors mean the REPL is gone; nothing to do.
            let _ = tx.send(res);
        })?;

        Ok(Self { watcher })
    }

    /// Add a path to be watched
    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        self.watcher
            .watch(path.as_ref(), RecursiveMode::NonRecursive)
    }

    /// Remove a path from being watched
    pub fn unwatch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        self.watcher.unwatch(path.as_ref())
    }
}
