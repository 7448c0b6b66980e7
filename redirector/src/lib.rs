//! Redirects template requests such as `/blog@4.0.0?on=codesandbox` to the
//! matching example project on the requested platform.

mod cache;
pub mod config;
pub mod errors;
pub mod github;
pub mod metrics_defs;
pub mod platform;
pub mod reference;
pub mod releases;
pub mod request;
pub mod resolver;
pub mod service;
pub mod templates;

#[cfg(test)]
mod testutils;

use errors::RedirectError;
use resolver::Resolver;
use service::RedirectService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

pub async fn run(config: config::Config) -> Result<(), RedirectError> {
    let token = config.upstream.token_from_env();
    if token.is_none() {
        tracing::warn!(
            env = %config.upstream.token_env,
            "No upstream API token found, upstream requests will be unauthenticated"
        );
    }

    let resolver = Arc::new(Resolver::new(&config, token)?);

    let redirect_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        RedirectService::new(resolver),
    );
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<RedirectError>::new(),
    );

    tokio::try_join!(redirect_task, admin_task)?;
    Ok(())
}
