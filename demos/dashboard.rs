use tms_api_client::{models::StatsParams, ApiClient, ClientError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ApiClient::from_env().map_err(anyhow::Error::msg)?;
    if let Ok(token) = std::env::var("TMS_TOKEN") {
        client.credentials().store_access_token(Some(token));
    }

    let layout = client.dashboard_layout().await?;
    println!("layout: {layout:#}");

    let params = StatsParams {
        from_date: Some("2026-01-01".to_owned()),
        to_date: Some("2026-01-31".to_owned()),
        include: vec!["revenue".to_owned(), "ontime".to_owned()],
    };
    match client.dashboard_stats(&params).await {
        Ok(stats) => println!("stats: {stats:#}"),
        Err(ClientError::AuthExpired { login_path, .. }) => {
            eprintln!("session expired, log in at {login_path}");
        }
        Err(err) => eprintln!("stats unavailable ({}): {err}", err.status()),
    }

    let preferences = client.dashboard_preferences().await?;
    println!("hidden widgets: {:?}", preferences.hidden_widgets);

    Ok(())
}
