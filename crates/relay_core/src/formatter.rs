//! Event → notification text.
//!
//! [`format_event`] is a pure function: it performs no I/O and the same event
//! always yields the same text. Each event type has a renderer that builds an
//! ordered list of lines; every dynamic value passes through
//! [`escape_markdown`] (directly or via the [`markdown`](crate::markdown)
//! helpers) before it is interpolated.

use crate::event::{EventKind, EventPayload, WebhookEvent};
use crate::markdown::{code, escape_markdown, labelled, link};

#[cfg(test)]
#[path = "formatter_tests.rs"]
mod tests;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Renders `event` as a MarkdownV2 message.
pub fn format_event(event: &WebhookEvent) -> String {
    let lines = match &event.kind {
        EventKind::DeploymentCreated => deployment_created(event),
        EventKind::DeploymentSucceeded => deployment_succeeded(event),
        EventKind::DeploymentError => deployment_error(event),
        EventKind::DeploymentCanceled => deployment_canceled(event),
        EventKind::DeploymentPromoted => deployment_promoted(event),
        EventKind::ProjectCreated => project_created(event),
        EventKind::ProjectRemoved => project_removed(event),
        EventKind::AttackDetected => attack_detected(event),
        EventKind::Unknown(tag) => unknown(tag, event),
    };
    lines.join("\n")
}

/// Accumulates message lines, skipping fields the payload does not carry.
struct Lines(Vec<String>);

impl Lines {
    fn titled(emoji: &str, title: &str) -> Self {
        Lines(vec![format!("{} *{}*", emoji, escape_markdown(title))])
    }

    fn push(&mut self, line: String) -> &mut Self {
        self.0.push(line);
        self
    }

    fn field(&mut self, label: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.0.push(labelled(label, &escape_markdown(value)));
        }
        self
    }

    fn code_field(&mut self, label: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.0.push(labelled(label, &code(value)));
        }
        self
    }

    fn link_field(&mut self, label: &str, text: &str, url: Option<&str>) -> &mut Self {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.0.push(labelled(label, &link(text, url)));
        }
        self
    }

    fn project(&mut self, payload: &EventPayload) -> &mut Self {
        self.field("Project", payload.project_name())
    }

    fn environment(&mut self, payload: &EventPayload) -> &mut Self {
        let target = payload.target().map(str::to_uppercase);
        self.field("Environment", target.as_deref())
    }

    fn deployment_link(&mut self, payload: &EventPayload) -> &mut Self {
        if let Some(url) = payload.deployment_url() {
            let label = url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string();
            self.0.push(labelled("URL", &link(&label, &url)));
        }
        self
    }

    fn inspector(&mut self, payload: &EventPayload) -> &mut Self {
        self.link_field("Inspector", "View deployment", payload.inspector_url())
    }

    fn domains(&mut self, payload: &EventPayload) -> &mut Self {
        let aliases = payload.aliases();
        if !aliases.is_empty() {
            let rendered: Vec<String> = aliases.iter().map(|a| escape_markdown(a)).collect();
            self.0.push(labelled("Domains", &rendered.join(", ")));
        }
        self
    }

    fn timestamp(&mut self, event: &WebhookEvent) -> &mut Self {
        let formatted = event
            .created_at_utc()
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string());
        self.field("Time", formatted.as_deref())
    }

    fn into_lines(self) -> Vec<String> {
        self.0
    }
}

fn deployment_created(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let mut lines = Lines::titled("🚀", "Deployment Created");
    lines
        .project(payload)
        .environment(payload)
        .code_field("Branch", payload.branch())
        .field("Commit", payload.commit_message())
        .deployment_link(payload)
        .inspector(payload)
        .timestamp(event);
    lines.into_lines()
}

fn deployment_succeeded(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let mut lines = Lines::titled("✅", "Deployment Succeeded");
    lines
        .project(payload)
        .environment(payload)
        .code_field("Branch", payload.branch())
        .deployment_link(payload)
        .domains(payload)
        .inspector(payload)
        .timestamp(event);
    lines.into_lines()
}

fn deployment_error(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let error = payload.error.as_ref();
    let mut lines = Lines::titled("❌", "Deployment Failed");
    lines
        .project(payload)
        .environment(payload)
        .code_field("Branch", payload.branch())
        .field("Error", error.and_then(|e| e.message.as_deref()))
        .code_field("Code", error.and_then(|e| e.code.as_deref()))
        .inspector(payload)
        .timestamp(event);
    lines.into_lines()
}

fn deployment_canceled(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let mut lines = Lines::titled("🚫", "Deployment Canceled");
    lines
        .project(payload)
        .environment(payload)
        .code_field("Branch", payload.branch())
        .inspector(payload)
        .timestamp(event);
    lines.into_lines()
}

// Payload layout for promotions is unconfirmed; only fields shared with the
// other deployment events are read.
fn deployment_promoted(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let mut lines = Lines::titled("⭐", "Deployment Promoted");
    lines
        .project(payload)
        .environment(payload)
        .deployment_link(payload)
        .domains(payload)
        .inspector(payload)
        .timestamp(event);
    lines.into_lines()
}

fn project_created(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let mut lines = Lines::titled("📁", "Project Created");
    lines
        .project(payload)
        .link_field("Dashboard", "Open project", payload.project_url())
        .timestamp(event);
    lines.into_lines()
}

fn project_removed(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let mut lines = Lines::titled("🗑️", "Project Removed");
    lines.project(payload).timestamp(event);
    lines.into_lines()
}

fn attack_detected(event: &WebhookEvent) -> Vec<String> {
    let payload = &event.payload;
    let attack = payload.attack.as_ref();
    let mut lines = Lines::titled("🛡️", "Attack Detected");
    lines
        .project(payload)
        .field("Attack", attack.and_then(|a| a.kind.as_deref()))
        .field("Action", attack.and_then(|a| a.action.as_deref()))
        .code_field("Source IP", attack.and_then(|a| a.source_ip.as_deref()))
        .code_field("Path", attack.and_then(|a| a.path.as_deref()))
        .timestamp(event);
    lines.into_lines()
}

fn unknown(tag: &str, event: &WebhookEvent) -> Vec<String> {
    let mut lines = Lines::titled("ℹ️", "Webhook Event");
    lines
        .push(labelled("Type", &code(tag)))
        .project(&event.payload)
        .timestamp(event);
    lines.into_lines()
}
