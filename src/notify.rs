use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for the shared status channel. Every engine-side
/// broadcast (starts, finishes, waitlist promotions, reservations) goes
/// through here; the transport adapter subscribes and delivers the text.
pub struct NotifyHub {
    tx: broadcast::Sender<String>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, text: impl Into<String>) {
        let _ = self.tx.send(text.into());
    }
}
