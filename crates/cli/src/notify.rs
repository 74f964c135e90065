use collecta_netting::Notifier;

/// Prints submit notifications to stderr, keeping stdout for data.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn success(&self, message: &str) {
        if message.is_empty() {
            eprintln!("ok: compensation recorded");
        } else {
            eprintln!("ok: {}", message);
        }
    }

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}
