use darshan_booking_client::{
    AppointmentFilter, BookingClient, config::Config, http_client::ReqwestBookingClient,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = Config::from_env()?;
    let client = ReqwestBookingClient::from_config(&cfg);
    if let Some((phone, password)) = cfg.credentials() {
        client.login(phone, password).await?;
    }

    let page_length = std::env::var("DARSHAN_PAGE_LENGTH")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(10);

    let bookings = client
        .get_bookings(&AppointmentFilter::page(0, page_length))
        .await
        .map_err(|e| format!("failed to fetch bookings: {}", e))?;

    if bookings.is_empty() {
        println!("No bookings returned (check role or credentials)");
        return Ok(());
    }

    println!("Bookings (page length {}):", page_length);
    for b in bookings {
        println!(
            "- {} | {} | {} | {}",
            b.name,
            b.darshan_type.as_str(),
            b.display_when(),
            b.workflow_state.as_str()
        );
    }
    Ok(())
}
