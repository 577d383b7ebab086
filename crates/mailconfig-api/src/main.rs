use lambda_http::{Error, Request, run, service_fn};
use mailconfig_api::ApiContext;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Structured JSON logs; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting Mailconfig API Lambda function");

    let ctx = ApiContext::new().await?;

    run(service_fn(|event: Request| {
        let ctx = ctx.clone();
        async move { mailconfig_api::handler(ctx, event).await }
    }))
    .await
}
