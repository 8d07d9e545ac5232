//! Typed helpers for the TMS API endpoints.
//!
//! Responses the API returns unwrapped are decoded with
//! [`ApiClient::send`]; untyped payloads come back as `serde_json::Value`.

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::{
    models::{
        AccountingFilters, AuthResponse, DashboardPreferences, FleetFilters, InvoiceFilters,
        LoadFilters, LoadStatus, LoginRequest, StatsParams, UploadTarget, User,
    },
    ApiClient, ApiResponse, QueryParams, RequestDescriptor, Result,
};

impl ApiClient {
    /// Logs in and stores the returned access token for later requests.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        let request = RequestDescriptor::post("/auth/login").with_json(credentials)?;
        let response: AuthResponse = self.send(request).await?;
        self.credentials()
            .store_access_token(Some(response.access_token.clone()));
        Ok(response)
    }

    /// Ends the session. The local token is cleared even if the call fails.
    pub async fn logout(&self) -> Result<()> {
        let outcome = self
            .send::<JsonValue>(RequestDescriptor::post("/auth/logout"))
            .await;
        self.credentials().store_access_token(None);
        outcome.map(|_| ())
    }

    /// Profile of the logged-in user.
    pub async fn current_user(&self) -> Result<User> {
        self.send(RequestDescriptor::get("/auth/me")).await
    }

    /// Lists loads matching `filters`.
    pub async fn list_loads(&self, filters: &LoadFilters) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(filters.to_query().apply("/loads")))
            .await
    }

    /// Fetches one load.
    pub async fn get_load(&self, id: &str) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(format!("/loads/{id}")))
            .await
    }

    /// Moves a load to `status`.
    pub async fn update_load_status(&self, id: &str, status: LoadStatus) -> Result<JsonValue> {
        let request =
            RequestDescriptor::patch(format!("/loads/{id}/status")).with_body(json!({ "status": status }));
        self.send(request).await
    }

    /// Assigns a driver to a load.
    pub async fn assign_driver(&self, load_id: &str, driver_id: &str) -> Result<JsonValue> {
        let request = RequestDescriptor::post(format!("/loads/{load_id}/assign"))
            .with_body(json!({ "driver_id": driver_id }));
        self.send(request).await
    }

    /// Replaces the driver/tractor/trailer assignment of a load.
    pub async fn update_load_assignment<A: Serialize + ?Sized>(
        &self,
        load_id: &str,
        assignment: &A,
    ) -> Result<JsonValue> {
        let request =
            RequestDescriptor::put(format!("/loads/{load_id}/assignment")).with_json(assignment)?;
        self.send(request).await
    }

    /// Lists drivers.
    pub async fn list_drivers(&self, query: &QueryParams) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(query.apply("/drivers")))
            .await
    }

    /// Lists tractors.
    pub async fn list_tractors(&self, query: &QueryParams) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(query.apply("/tractors")))
            .await
    }

    /// Lists trailers.
    pub async fn list_trailers(&self, query: &QueryParams) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(query.apply("/trailers")))
            .await
    }

    /// Lists customers.
    pub async fn list_customers(&self) -> Result<JsonValue> {
        self.send(RequestDescriptor::get("/customers")).await
    }

    /// Fetches one customer.
    pub async fn get_customer(&self, id: &str) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(format!("/customers/{id}")))
            .await
    }

    /// Creates a customer.
    pub async fn create_customer<C: Serialize + ?Sized>(&self, customer: &C) -> Result<JsonValue> {
        self.send(RequestDescriptor::post("/customers").with_json(customer)?)
            .await
    }

    /// Applies a partial update to a customer.
    pub async fn update_customer<C: Serialize + ?Sized>(
        &self,
        id: &str,
        changes: &C,
    ) -> Result<JsonValue> {
        self.send(RequestDescriptor::patch(format!("/customers/{id}")).with_json(changes)?)
            .await
    }

    /// Deletes a customer.
    pub async fn delete_customer(&self, id: &str) -> Result<JsonValue> {
        self.send(RequestDescriptor::delete(format!("/customers/{id}")))
            .await
    }

    /// Lists orders.
    pub async fn list_orders(&self) -> Result<JsonValue> {
        self.send(RequestDescriptor::get("/orders")).await
    }

    /// Fetches one order.
    pub async fn get_order(&self, id: &str) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(format!("/orders/{id}")))
            .await
    }

    /// Creates an order.
    pub async fn create_order<O: Serialize + ?Sized>(&self, order: &O) -> Result<JsonValue> {
        self.send(RequestDescriptor::post("/orders").with_json(order)?)
            .await
    }

    /// Applies a partial update to an order.
    pub async fn update_order<O: Serialize + ?Sized>(
        &self,
        id: &str,
        changes: &O,
    ) -> Result<JsonValue> {
        self.send(RequestDescriptor::patch(format!("/orders/{id}")).with_json(changes)?)
            .await
    }

    /// Deletes an order.
    pub async fn delete_order(&self, id: &str) -> Result<JsonValue> {
        self.send(RequestDescriptor::delete(format!("/orders/{id}")))
            .await
    }

    /// Widget layout for the current user.
    pub async fn dashboard_layout(&self) -> Result<JsonValue> {
        self.send(RequestDescriptor::get("/v1/dashboard/layout"))
            .await
    }

    /// Statistics for every dashboard widget in the range.
    pub async fn dashboard_stats(&self, params: &StatsParams) -> Result<JsonValue> {
        self.send(RequestDescriptor::get(
            params.to_query().apply("/v1/dashboard/stats"),
        ))
        .await
    }

    /// Statistics for a single widget; `include` is ignored.
    pub async fn widget_stats(&self, widget_key: &str, params: &StatsParams) -> Result<JsonValue> {
        let query = QueryParams::new()
            .push_opt("from_date", params.from_date.as_deref())
            .push_opt("to_date", params.to_date.as_deref());
        self.send(RequestDescriptor::get(
            query.apply(&format!("/v1/dashboard/stats/{widget_key}")),
        ))
        .await
    }

    /// Hidden widgets and widget order.
    pub async fn dashboard_preferences(&self) -> Result<DashboardPreferences> {
        self.send(RequestDescriptor::get("/v1/dashboard/preferences"))
            .await
    }

    /// Saves hidden widgets and widget order.
    pub async fn update_dashboard_preferences(
        &self,
        preferences: &DashboardPreferences,
    ) -> Result<JsonValue> {
        self.send(RequestDescriptor::patch("/v1/dashboard/preferences").with_json(preferences)?)
            .await
    }

    /// Requests a pre-signed URL for uploading `filename`.
    pub async fn upload_url(&self, filename: &str, content_type: &str) -> Result<UploadTarget> {
        let request = RequestDescriptor::post("/upload/url")
            .with_body(json!({ "filename": filename, "content_type": content_type }));
        self.send(request).await
    }

    /// Lists invoices; the envelope carries the pagination cursor.
    pub async fn list_invoices(
        &self,
        filters: &InvoiceFilters,
    ) -> Result<ApiResponse<Vec<JsonValue>>> {
        self.execute(RequestDescriptor::get(
            filters.to_query().apply("/v1/invoices"),
        ))
        .await
    }

    /// Lists fleet tractors; the envelope carries the pagination cursor.
    pub async fn list_fleet_tractors(
        &self,
        filters: &FleetFilters,
    ) -> Result<ApiResponse<Vec<JsonValue>>> {
        self.execute(RequestDescriptor::get(
            filters.to_query().apply("/v1/fleet/tractors"),
        ))
        .await
    }

    /// Lists fleet trailers; the envelope carries the pagination cursor.
    pub async fn list_fleet_trailers(
        &self,
        filters: &FleetFilters,
    ) -> Result<ApiResponse<Vec<JsonValue>>> {
        self.execute(RequestDescriptor::get(
            filters.to_query().apply("/v1/fleet/trailers"),
        ))
        .await
    }

    /// Revenue and cost summary for the accounting period.
    pub async fn accounting_summary(&self, filters: &AccountingFilters) -> Result<JsonValue> {
        let envelope: ApiResponse<JsonValue> = self
            .execute(RequestDescriptor::get(
                filters.to_query().apply("/v1/accounting/summary"),
            ))
            .await?;
        Ok(envelope.data)
    }
}
