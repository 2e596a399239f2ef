use anyhow::{Context, Result};

use super::{
    config_model::{BackendServer, Database, DotEnvyConfig, Featured, Stripe, Supabase},
    stage::Stage,
};

const DEFAULT_CURRENCY: &str = "usd";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
        success_url: required("STRIPE_SUCCESS_URL")?,
        cancel_url: required("STRIPE_CANCEL_URL")?,
    };

    let featured = Featured {
        currency: std::env::var("FEATURED_CURRENCY")
            .ok()
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        sweep_interval_secs: std::env::var("FEATURED_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "0".to_string())
            .parse::<u64>()
            .context("FEATURED_SWEEP_INTERVAL_SECS is invalid")?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        stripe,
        featured,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is missing"))
}
