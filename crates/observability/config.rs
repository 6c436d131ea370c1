use std::env;
use tracing::Level;
use url::Url;

#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone)]
pub(crate) struct DiscordConfig {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) discord: Option<DiscordConfig>,
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        let component = component.trim().to_string();
        let service_name = env_string("SERVICE_NAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "commission-ledger".to_string());
        let environment = env_string("STAGE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let mut warnings = Vec::new();
        let discord = match env_string("DISCORD_WEBHOOK_URL").filter(|v| !v.is_empty()) {
            Some(raw) => match Url::parse(&raw) {
                Ok(webhook_url) => Some(DiscordConfig {
                    webhook_url,
                    min_level: Level::ERROR,
                }),
                Err(err) => {
                    // Never echo the raw URL; webhook URLs carry secrets.
                    warnings.push(format!(
                        "DISCORD_WEBHOOK_URL is set but invalid; notifications disabled (parse error: {err})"
                    ));
                    None
                }
            },
            None => None,
        };

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            discord,
            warnings,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string())
}
