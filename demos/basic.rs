use serde_json::{json, Value as JsonValue};
use tms_api_client::{
    models::{LoadFilters, LoadStatus, LoginRequest},
    ApiClient, RequestDescriptor,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ApiClient::from_env().map_err(anyhow::Error::msg)?;

    client
        .login(&LoginRequest {
            email: std::env::var("TMS_EMAIL")?,
            password: std::env::var("TMS_PASSWORD")?,
        })
        .await?;

    let loads = client
        .list_loads(&LoadFilters {
            status: Some(LoadStatus::Assigned),
            limit: Some(10),
            ..LoadFilters::default()
        })
        .await?;
    println!("{loads:#}");

    let created = client
        .execute::<JsonValue>(
            RequestDescriptor::post("/orders")
                .with_body(json!({ "customer_id": "C-1", "reference": "PO-1001" }))
                .with_retries(5),
        )
        .await?;
    println!("created order: {}", created.data);

    Ok(())
}
