use actix_web::{web, App, HttpServer};
use clap::Parser;
use hashrate_shop::application::accounts::AccountService;
use hashrate_shop::application::payments::PaymentService;
use hashrate_shop::config::GatewayConfig;
use hashrate_shop::domain::ports::{AppliedOrderStoreRef, PaymentGatewayRef, UserStoreRef};
use hashrate_shop::infrastructure::json_file::JsonFileStore;
use hashrate_shop::infrastructure::razorpay::RazorpayClient;
use hashrate_shop::interfaces::http::{routes, AppState};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Path to the JSON file backing the user store
    #[arg(long, default_value = "users.json")]
    store_path: PathBuf,
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        eprintln!("tracing init failed: {err}");
    }

    let cli = Cli::parse();

    // Refuses to start without gateway credentials.
    let gateway_config = GatewayConfig::from_env().into_diagnostic()?;

    let store = JsonFileStore::open(&cli.store_path).into_diagnostic()?;
    let users: UserStoreRef = Arc::new(store.clone());
    let applied_orders: AppliedOrderStoreRef = Arc::new(store);
    let gateway: PaymentGatewayRef =
        Arc::new(RazorpayClient::new(&gateway_config).into_diagnostic()?);

    let state = AppState {
        accounts: AccountService::new(users.clone()),
        payments: PaymentService::new(
            users.clone(),
            applied_orders,
            gateway,
            gateway_config.key_secret.clone(),
        ),
        users,
        gateway_key_id: gateway_config.key_id.clone(),
    };

    tracing::info!(bind = %cli.bind, store = %cli.store_path.display(), "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes)
    })
    .bind(&cli.bind)
    .into_diagnostic()?
    .run()
    .await
    .into_diagnostic()
}
