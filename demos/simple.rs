use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use vk_http_api::client::VkClient;
use vk_http_api::config::{ClientConfig, Mode};
use vk_http_api::error::Result;
use vk_http_api::response::ResponseTarget;

/// Simple program to test the VK HTTP API: optionally get a token, then call a method.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Application id
    #[arg(long)]
    app_id: String,

    /// Application secret
    #[arg(long)]
    app_secret: String,

    /// Request mode: sig or oauth
    #[arg(short, long, default_value = "oauth")]
    mode: Mode,

    /// Access token to use instead of a grant
    #[arg(short, long)]
    token: Option<String>,

    /// Method to call
    #[arg(long, default_value = "users.get")]
    method: String,

    /// Comma-separated user ids passed as `user_ids`
    #[arg(long, default_value = "1")]
    user_ids: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = ClientConfig::new(&args.app_id, &args.app_secret).mode(args.mode);
    let vk = VkClient::new(config)?;

    vk.on("error", |err| eprintln!("Transport error: {}", err));
    vk.on("appServerTokenNotReady", |body| eprintln!("No server token: {}", body));

    if args.mode == Mode::OAuth {
        match args.token {
            Some(token) => vk.set_token(token).await,
            None => vk.app_server_token().await?,
        }
        println!("Token present: {}", vk.token().await.is_some());
    }

    let params = json!({ "user_ids": args.user_ids })
        .as_object()
        .cloned()
        .unwrap_or_default();

    // Callback delivery.
    vk.request(
        &args.method,
        Some(params.clone()),
        Some(ResponseTarget::callback(|body| {
            println!("Callback response: {:#}", body);
        })),
    )
    .await?;

    // Event delivery on the default `done:<method>` event.
    vk.on(&format!("done:{}", args.method), |body| {
        println!("Event response: {:#}", body);
    });
    vk.request(&args.method, Some(params), None).await?;

    Ok(())
}
