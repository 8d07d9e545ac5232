use std::fmt;

use serde::{Deserialize, Serialize};

use crate::QueryParams;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Lifecycle state of a load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Draft,
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Invoiced,
    Completed,
    Cancelled,
}

impl LoadStatus {
    /// Wire name, as used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Invoiced => "invoiced",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for the loads listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<LoadStatus>,
    /// ISO date, inclusive.
    pub pickup_date_from: Option<String>,
    /// ISO date, inclusive.
    pub pickup_date_to: Option<String>,
    pub customer_id: Option<String>,
}

impl LoadFilters {
    /// Renders the set fields as query parameters.
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push_opt("page", self.page)
            .push_opt("limit", self.limit)
            .push_opt("status", self.status)
            .push_opt("pickup_date_from", self.pickup_date_from.as_deref())
            .push_opt("pickup_date_to", self.pickup_date_to.as_deref())
            .push_opt("customer_id", self.customer_id.as_deref())
    }
}

/// Date range and widget selection for dashboard statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsParams {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    /// Widget keys to include; empty means all.
    pub include: Vec<String>,
}

impl StatsParams {
    /// Renders the set fields as query parameters.
    pub fn to_query(&self) -> QueryParams {
        let include = (!self.include.is_empty()).then(|| self.include.join(","));
        QueryParams::new()
            .push_opt("from_date", self.from_date.as_deref())
            .push_opt("to_date", self.to_date.as_deref())
            .push_opt("include", include)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardPreferences {
    pub hidden_widgets: Vec<String>,
    pub widget_order: Vec<String>,
}

/// Pre-signed upload location returned by `/upload/url`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadTarget {
    pub upload_url: String,
    pub file_url: String,
}

/// Lifecycle state of an invoice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Wire name, as used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for the cursor-paginated invoice listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvoiceFilters {
    /// Opaque cursor from the previous page's `meta.nextCursor`.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    /// Matches any of the listed states.
    pub status: Vec<InvoiceStatus>,
    pub customer_id: Option<String>,
    pub load_id: Option<String>,
    pub issue_date_from: Option<String>,
    pub issue_date_to: Option<String>,
    pub due_date_from: Option<String>,
    pub due_date_to: Option<String>,
    pub is_overdue: Option<bool>,
}

impl InvoiceFilters {
    /// Renders the set fields as query parameters.
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push_opt("cursor", self.cursor.as_deref())
            .push_opt("limit", self.limit)
            .push_all("status", &self.status)
            .push_opt("customerId", self.customer_id.as_deref())
            .push_opt("loadId", self.load_id.as_deref())
            .push_opt("issueDateFrom", self.issue_date_from.as_deref())
            .push_opt("issueDateTo", self.issue_date_to.as_deref())
            .push_opt("dueDateFrom", self.due_date_from.as_deref())
            .push_opt("dueDateTo", self.due_date_to.as_deref())
            .push_opt("isOverdue", self.is_overdue)
    }
}

/// Filters shared by the fleet tractor and trailer listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FleetFilters {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    /// Equipment states, e.g. `active` or `maintenance`.
    pub status: Vec<String>,
    pub available: Option<bool>,
}

impl FleetFilters {
    /// Renders the set fields as query parameters.
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push_opt("cursor", self.cursor.as_deref())
            .push_opt("limit", self.limit)
            .push_all("status", &self.status)
            .push_opt("available", self.available)
    }
}

/// Reporting granularity of the accounting summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    /// Wire name, as used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of the accounting summary. The date range is required.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountingFilters {
    pub period_type: PeriodType,
    /// ISO date, inclusive.
    pub start_date: String,
    /// ISO date, inclusive.
    pub end_date: String,
    pub customer_id: Option<String>,
    pub driver_id: Option<String>,
    pub include_projections: Option<bool>,
}

impl AccountingFilters {
    /// Renders the set fields as query parameters.
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push("periodType", self.period_type)
            .push("startDate", &self.start_date)
            .push("endDate", &self.end_date)
            .push_opt("customerId", self.customer_id.as_deref())
            .push_opt("driverId", self.driver_id.as_deref())
            .push_opt("includeProjections", self.include_projections)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        AccountingFilters, FleetFilters, InvoiceFilters, InvoiceStatus, LoadFilters, LoadStatus,
        LoginRequest, PeriodType, StatsParams,
    };

    #[test]
    fn load_status_uses_snake_case() {
        assert_eq!(
            serde_json::to_value(LoadStatus::InTransit).expect("must encode"),
            json!("in_transit")
        );
        assert_eq!(LoadStatus::InTransit.to_string(), "in_transit");
    }

    #[test]
    fn load_filters_render_only_set_fields() {
        let filters = LoadFilters {
            page: Some(2),
            status: Some(LoadStatus::Assigned),
            customer_id: Some("C-9".to_owned()),
            ..LoadFilters::default()
        };
        assert_eq!(
            filters.to_query().apply("/loads"),
            "/loads?page=2&status=assigned&customer_id=C-9"
        );
        assert_eq!(LoadFilters::default().to_query().apply("/loads"), "/loads");
    }

    #[test]
    fn stats_params_join_widget_keys() {
        let params = StatsParams {
            from_date: Some("2026-01-01".to_owned()),
            to_date: None,
            include: vec!["revenue".to_owned(), "ontime".to_owned()],
        };
        assert_eq!(
            params.to_query().to_query_string(),
            "?from_date=2026-01-01&include=revenue%2Contime"
        );
    }

    #[test]
    fn login_request_debug_hides_password() {
        let request = LoginRequest {
            email: "ops@example.com".to_owned(),
            password: "hunter2".to_owned(),
        };
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn invoice_filters_use_camel_case_keys() {
        let filters = InvoiceFilters {
            limit: Some(25),
            status: vec![InvoiceStatus::Sent, InvoiceStatus::Overdue],
            customer_id: Some("C-9".to_owned()),
            due_date_to: Some("2026-02-01".to_owned()),
            is_overdue: Some(true),
            ..InvoiceFilters::default()
        };
        assert_eq!(
            filters.to_query().to_query_string(),
            "?limit=25&status=sent&status=overdue&customerId=C-9&dueDateTo=2026-02-01&isOverdue=true"
        );
    }

    #[test]
    fn fleet_filters_pass_the_cursor_through() {
        let filters = FleetFilters {
            cursor: Some("abc".to_owned()),
            status: vec!["active".to_owned()],
            available: Some(true),
            ..FleetFilters::default()
        };
        assert_eq!(
            filters.to_query().to_query_string(),
            "?cursor=abc&status=active&available=true"
        );
    }

    #[test]
    fn accounting_filters_always_send_the_period() {
        let filters = AccountingFilters {
            period_type: PeriodType::Quarterly,
            start_date: "2026-01-01".to_owned(),
            end_date: "2026-03-31".to_owned(),
            include_projections: Some(false),
            ..AccountingFilters::default()
        };
        assert_eq!(
            filters.to_query().to_query_string(),
            "?periodType=quarterly&startDate=2026-01-01&endDate=2026-03-31&includeProjections=false"
        );
    }
}
