use alloy::primitives::Address;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ConfigStatus;
use crate::error::ApiError;
use crate::fallback;
use crate::models::{ChartSeries, DashboardData, TimeRange};
use crate::portfolio::Portfolio;

#[derive(Clone)]
pub struct AppState {
    pub portfolio: Option<Arc<Portfolio>>, // None → not configured, fallback only
    pub status: ConfigStatus,
}

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub address: Option<String>,
    #[serde(default, deserialize_with = "range_param")]
    pub range: TimeRange,
}

/// Ranges go through `TimeRange::from_str`, so `1h` and `1H` both work
fn range_param<'de, D>(deserializer: D) -> Result<TimeRange, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn parse_address(raw: Option<&str>) -> Result<Option<Address>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Address::from_str(s)
            .map(Some)
            .map_err(|_| ApiError::InvalidAddress(s.to_string())),
        None => Ok(None),
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Wallet PnL API running" }))
        .route("/status", get(status))
        .route("/dashboard", get(dashboard))
        .route("/chart", get(chart))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> eyre::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn status(State(state): State<AppState>) -> Json<ConfigStatus> {
    Json(state.status)
}

async fn dashboard(
    State(state): State<AppState>,
    Query(q): Query<WalletQuery>,
) -> Result<Json<DashboardData>, ApiError> {
    let address = parse_address(q.address.as_deref())?;

    let data = match &state.portfolio {
        Some(portfolio) => portfolio.get_dashboard(address, q.range).await,
        None => fallback::build_dashboard(q.range, None, Utc::now().timestamp_millis()),
    };
    Ok(Json(data))
}

async fn chart(
    State(state): State<AppState>,
    Query(q): Query<WalletQuery>,
) -> Result<Json<ChartSeries>, ApiError> {
    let address = parse_address(q.address.as_deref())?;

    let series = match &state.portfolio {
        Some(portfolio) => portfolio.get_chart(address, q.range).await,
        None => fallback::build_chart(q.range, Utc::now().timestamp_millis()),
    };
    Ok(Json(series))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_query_parsing() {
        assert_eq!(parse_address(None).unwrap(), None);
        assert_eq!(parse_address(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_address(Some("0x1111111111111111111111111111111111111111")).unwrap(),
            Some(Address::repeat_byte(0x11))
        );
        assert!(matches!(parse_address(Some("0xnope")), Err(ApiError::InvalidAddress(_))));
    }

    #[test]
    fn range_defaults_to_six_hours() {
        let q: WalletQuery = serde_json::from_str(r#"{"address": null}"#).unwrap();
        assert_eq!(q.range, TimeRange::SixHours);

        let q: WalletQuery = serde_json::from_str(r#"{"range": "ALL"}"#).unwrap();
        assert_eq!(q.range, TimeRange::All);
    }

    #[test]
    fn range_query_is_case_insensitive() {
        let q: WalletQuery = serde_json::from_str(r#"{"range": "1h"}"#).unwrap();
        assert_eq!(q.range, TimeRange::OneHour);

        assert!(serde_json::from_str::<WalletQuery>(r#"{"range": "2D"}"#).is_err());
    }

    fn unconfigured() -> AppState {
        AppState {
            portfolio: None,
            status: ConfigStatus {
                is_ready: false,
                missing_keys: vec!["TRACKED_PUBLIC_KEY".to_string()],
                error: Some("missing required env: TRACKED_PUBLIC_KEY".to_string()),
            },
        }
    }

    fn query(address: Option<&str>, range: TimeRange) -> Query<WalletQuery> {
        Query(WalletQuery {
            address: address.map(str::to_string),
            range,
        })
    }

    #[tokio::test]
    async fn unconfigured_dashboard_serves_fallback() {
        let Json(data) = dashboard(State(unconfigured()), query(None, TimeRange::OneWeek))
            .await
            .unwrap();

        assert_eq!(data.metrics.balance_usd, fallback::MOCK_CURRENT_VALUE_USD);
        assert_eq!(data.metrics.identity, fallback::mock_identity());
        assert_eq!(data.chart.range, TimeRange::OneWeek);
        assert_eq!(data.chart.current_value_usd, fallback::MOCK_CURRENT_VALUE_USD);
    }

    #[tokio::test]
    async fn unconfigured_chart_serves_fallback() {
        let Json(series) = chart(State(unconfigured()), query(None, TimeRange::All)).await.unwrap();

        assert_eq!(series.range, TimeRange::All);
        assert_eq!(series.current_value_usd, fallback::MOCK_CURRENT_VALUE_USD);
    }

    #[tokio::test]
    async fn bad_address_is_rejected_even_when_unconfigured() {
        let res = chart(State(unconfigured()), query(Some("junk"), TimeRange::OneDay)).await;
        assert!(matches!(res, Err(ApiError::InvalidAddress(_))));

        let res = dashboard(State(unconfigured()), query(Some("junk"), TimeRange::OneDay)).await;
        assert!(matches!(res, Err(ApiError::InvalidAddress(_))));
    }
}
