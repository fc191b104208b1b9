use crate::{config::Config, errors::AppError, models::Event};
use base64::{Engine as _, engine::general_purpose};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

#[derive(Clone)]
pub struct GoogleCalendarService {
    client: Client,
    config: Arc<Config>,
}

// ─── OAuth token exchange ─────────────────────────────────────────────────────

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

// ─── Calendar events ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CalendarDate {
    date: String,
}

#[derive(Debug, Serialize)]
struct CalendarEventRequest {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start: CalendarDate,
    end: CalendarDate,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct CalendarEventResponse {
    pub id: String,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

impl GoogleCalendarService {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Consent URL the admin opens to grant calendar access.
    pub fn oauth_consent_url(&self) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.config.google_client_id.as_str()),
                ("redirect_uri", self.config.google_redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", CALENDAR_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(url.to_string())
    }

    fn basic_auth_header(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.config.google_client_id, self.config.google_client_secret
        );
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .header("Authorization", self.basic_auth_header())
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::GoogleError(e.to_string()))?;

        if !resp.status().is_success() {
            let err: TokenErrorResponse = resp
                .json()
                .await
                .map_err(|e| AppError::GoogleError(e.to_string()))?;
            return Err(AppError::GoogleError(format!(
                "Token exchange failed: {} {}",
                err.error,
                err.error_description.unwrap_or_default()
            )));
        }

        resp.json()
            .await
            .map_err(|e| AppError::GoogleError(e.to_string()))
    }

    /// Exchange the authorization code from the consent redirect for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.google_redirect_uri.as_str()),
        ])
        .await
    }

    /// Trade the stored refresh token for a short-lived access token. Also
    /// serves as the connection check: failure means not connected.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AppError> {
        let tokens = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;
        Ok(tokens.access_token)
    }

    /// Create or update the all-day calendar entry for an event. Returns the
    /// Google event id to store back on the event row.
    pub async fn upsert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &Event,
    ) -> Result<String, AppError> {
        let body = CalendarEventRequest {
            summary: format!("{} — {}", event.title, event.client_name),
            location: event.location.clone(),
            description: event.notes.clone(),
            start: CalendarDate {
                date: event.event_date.to_string(),
            },
            end: CalendarDate {
                date: event
                    .event_date
                    .succ_opt()
                    .unwrap_or(event.event_date)
                    .to_string(),
            },
        };

        let request = match &event.google_event_id {
            Some(google_id) => self.client.put(format!(
                "{}/calendars/{}/events/{}",
                CALENDAR_API, calendar_id, google_id
            )),
            None => self
                .client
                .post(format!("{}/calendars/{}/events", CALENDAR_API, calendar_id)),
        };

        let resp = request
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GoogleError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::GoogleError(format!(
                "Calendar API returned {}: {}",
                status, text
            )));
        }

        let created: CalendarEventResponse = resp
            .json()
            .await
            .map_err(|e| AppError::GoogleError(e.to_string()))?;

        Ok(created.id)
    }
}
