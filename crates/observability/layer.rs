use super::config::ServiceContext;
use super::discord::DiscordNotifier;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Forwards error-level events to the notifier with their structured
/// fields attached.
pub(crate) struct ErrorNotifyLayer {
    notifier: DiscordNotifier,
    service_context: ServiceContext,
}

impl ErrorNotifyLayer {
    pub(crate) fn new(notifier: DiscordNotifier, service_context: ServiceContext) -> Self {
        Self {
            notifier,
            service_context,
        }
    }
}

#[derive(Default)]
struct FieldMapVisitor {
    message: Option<String>,
    values: BTreeMap<String, String>,
}

impl Visit for FieldMapVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            self.values.insert(field.name().to_string(), rendered);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.values
                .insert(field.name().to_string(), value.to_string());
        }
    }
}

impl<S> Layer<S> for ErrorNotifyLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldMapVisitor::default();
        event.record(&mut visitor);

        let mut lines = vec![
            format!(
                "**{}** `{}` `{}` `{}`",
                self.service_context.service_name,
                self.service_context.environment,
                self.service_context.component,
                event.metadata().level()
            ),
            format!(
                "`{}` `{}`",
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                event.metadata().target()
            ),
        ];

        if let Some(message) = visitor.message.as_ref().filter(|m| !m.trim().is_empty()) {
            lines.push(format!("> {}", message.trim()));
        }
        for (key, value) in &visitor.values {
            lines.push(format!("- `{}` = `{}`", key, value));
        }

        self.notifier.try_notify(lines.join("\n"));
    }
}
