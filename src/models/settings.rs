use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Single-row application settings. `vat_rate` is a percent, e.g. 18 means 18%.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AppSettings {
    pub id: i32,
    pub business_name: String,
    pub vat_rate: Decimal,
    pub currency_symbol: String,
    pub quote_footer: Option<String>,
    pub google_calendar_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub google_refresh_token: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AppSettings {
    pub fn vat_fraction(&self) -> Decimal {
        self.vat_rate / dec!(100)
    }

    /// Defaults used when the settings row has not been written yet.
    pub fn fallback() -> Self {
        Self {
            id: 1,
            business_name: "Event Planner".to_string(),
            vat_rate: dec!(18),
            currency_symbol: "$".to_string(),
            quote_footer: None,
            google_calendar_id: None,
            google_refresh_token: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub business_name: String,
    pub vat_rate: Decimal,
    pub currency_symbol: String,
    pub quote_footer: Option<String>,
    pub google_calendar_id: Option<String>,
}
