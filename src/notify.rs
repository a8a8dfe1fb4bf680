//! Desktop notifications.
//!
//! Launch failures and hotkeys that could not be registered are logged at
//! `warn` or `error`; [`NotificationLayer`] is how they reach the user.

use notify_rust::Notification;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::icon::NOTIFICATION_ICON;
use crate::{APP_NAME, APP_NAME_PRETTY};

/// Send a system notification with a summary and body.
pub fn notify(summary: &str, body: &str) {
    Notification::new()
        .icon(NOTIFICATION_ICON)
        .appname(APP_NAME)
        .summary(&format!("{} - {}", APP_NAME_PRETTY, summary))
        .body(body)
        .show()
        .map_err(|e| error!(target: "hotlaunch::notify", "Failed to send notification: {}", e))
        .ok();
}

/// Collects the message and the fields that identify a hotkey.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    chord: Option<String>,
    path: Option<String>,
}

impl MessageVisitor {
    fn body(self) -> Option<String> {
        let message = self.message?;
        let context = [self.chord, self.path]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        if context.is_empty() {
            Some(message)
        } else {
            Some(format!("{message} ({})", context.join(", ")))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record(field, format!("{:?}", value));
    }
}

impl MessageVisitor {
    fn record(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            "chord" => self.chord = Some(value),
            "path" => self.path = Some(value),
            _ => {}
        }
    }
}

/// Tracing layer that sends notifications for warnings and errors.
#[derive(Debug, Default)]
pub struct NotificationLayer {}

impl NotificationLayer {
    pub fn new() -> Self {
        Self {}
    }
}

fn should_notify(level: Level, target: &str) -> Option<&'static str> {
    // A failing notification must not notify about itself.
    if target == "hotlaunch::notify" {
        return None;
    }
    match level {
        Level::ERROR => Some("error"),
        Level::WARN => Some("warning"),
        _ => None,
    }
}

impl<S: Subscriber> Layer<S> for NotificationLayer {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let metadata = event.metadata();

        if let Some(summary) = should_notify(*metadata.level(), metadata.target()) {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);

            if let Some(body) = visitor.body() {
                notify(summary, &body);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_notify_levels() {
        assert_eq!(should_notify(Level::ERROR, "hotlaunch::registry"), Some("error"));
        assert_eq!(should_notify(Level::WARN, "hotlaunch::registry"), Some("warning"));
        assert_eq!(should_notify(Level::INFO, "hotlaunch::registry"), None);
        assert_eq!(should_notify(Level::ERROR, "hotlaunch::notify"), None);
    }

    #[test]
    fn test_body_includes_hotkey_context() {
        let visitor = MessageVisitor {
            message: Some("could not register stored hotkey".into()),
            chord: Some("Control + K".into()),
            path: None,
        };
        assert_eq!(
            visitor.body().as_deref(),
            Some("could not register stored hotkey (Control + K)")
        );
        assert_eq!(MessageVisitor::default().body(), None);
    }
}
