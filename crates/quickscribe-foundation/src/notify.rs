use crossbeam_channel::{Receiver, Sender};

/// One-way display updates published by the pipeline and consumed by the
/// shell. Each variant is an independent channel of information; the shell
/// decides how to render them.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Human-readable status line (errors, transitions, command results).
    Status(String),
    /// Recording indicator on/off.
    Recording(bool),
    /// Current partial hypothesis; an empty string clears the display.
    Partial(String),
    /// Full transcript preview snapshot after each merge.
    Transcript(String),
    /// Capture liveness line from the watchdog.
    Activity(String),
}

/// Cloneable publishing handle. Sends never block and are fire-and-forget:
/// a shell that has gone away must not stall the pipeline.
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

impl Notifier {
    pub fn status(&self, text: impl Into<String>) {
        let _ = self.tx.send(Notification::Status(text.into()));
    }

    pub fn recording(&self, active: bool) {
        let _ = self.tx.send(Notification::Recording(active));
    }

    pub fn partial(&self, text: impl Into<String>) {
        let _ = self.tx.send(Notification::Partial(text.into()));
    }

    pub fn transcript(&self, text: impl Into<String>) {
        let _ = self.tx.send(Notification::Transcript(text.into()));
    }

    pub fn activity(&self, text: impl Into<String>) {
        let _ = self.tx.send(Notification::Activity(text.into()));
    }
}

/// Create a notifier and the receiving end for the shell.
pub fn notification_channel() -> (Notifier, Receiver<Notification>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (Notifier { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_arrive_in_order() {
        let (notifier, rx) = notification_channel();
        notifier.recording(true);
        notifier.partial("hel");
        notifier.partial("hello");
        notifier.recording(false);

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                Notification::Recording(true),
                Notification::Partial("hel".into()),
                Notification::Partial("hello".into()),
                Notification::Recording(false),
            ]
        );
    }

    #[test]
    fn send_without_receiver_is_silent() {
        let (notifier, rx) = notification_channel();
        drop(rx);
        notifier.status("nobody listening");
    }
}
