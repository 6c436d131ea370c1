mod config;
mod discord;
mod layer;

use anyhow::Result;
use config::ObservabilityConfig;
use discord::DiscordNotifier;
use layer::ErrorNotifyLayer;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);

    let notify_layer = config.discord.as_ref().map(|discord| {
        let notifier = DiscordNotifier::spawn(discord.webhook_url.clone());
        ErrorNotifyLayer::new(notifier, config.service_context.clone()).with_filter(
            tracing_subscriber::filter::LevelFilter::from_level(discord.min_level),
        )
    });

    // RUST_LOG overrides; the default keeps production at info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(notify_layer)
        .with(env_filter)
        .try_init()?;

    for warning in &config.warnings {
        warn!(
            component = %config.service_context.component,
            warning = %warning,
            "Observability config warning"
        );
    }

    info!(
        service = %config.service_context.service_name,
        environment = %config.service_context.environment,
        component = %config.service_context.component,
        discord_notifications = config.discord.is_some(),
        "Observability initialized"
    );

    Ok(())
}
