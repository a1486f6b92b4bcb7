const APP_NAME: &str = "mapmarks";

/// Short-lived user-facing notice.
pub trait Notifier {
    fn notify(&self, body: &str);
}

/// Desktop notification through the system notification daemon.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNotifier;

impl Notifier for SystemNotifier {
    fn notify(&self, body: &str) {
        send(body);
    }
}

pub fn send(body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(APP_NAME)
        .body(&body)
        .timeout(notify_rust::Timeout::Milliseconds(2000))
        .show()
    {
        tracing::warn!("system notification failed: {err}");
    }
}
