use darshan_booking_client::{BookingClient, config::Config, http_client::ReqwestBookingClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_env = std::env::var("DARSHAN_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    // Example: expects DARSHAN_API_BASE, DARSHAN_PHONE and DARSHAN_PASSWORD in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestBookingClient::from_config(&cfg);
    let Some((phone, password)) = cfg.credentials() else {
        eprintln!("set DARSHAN_PHONE and DARSHAN_PASSWORD to log in");
        return Ok(());
    };

    let login = client.login(phone, password).await?;
    println!("{} ({})", login.message, login.full_name.unwrap_or_default());
    let profile = client.get_profile().await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
