//! HTTP Handlers
//!
//! A single route dispatches on method: POST is lead intake, everything else
//! answers a liveness probe. The body is parsed by hand so malformed JSON
//! yields the documented 500 JSON error instead of an extractor rejection.

use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use funnel_core::error::FunnelError;
use funnel_core::lead::{NewLead, ProductCode};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub ok: bool,
    pub checkout_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// Single-route entry point: POST is intake, anything else is liveness.
/// CORS preflight is answered by the `CorsLayer` before reaching here.
pub async fn root(State(state): State<AppState>, method: Method, body: String) -> Response {
    if method == Method::POST {
        intake(&state, &body).await.into_response()
    } else {
        Json(LivenessResponse {
            status: "alive",
            version: env!("CARGO_PKG_VERSION"),
        })
        .into_response()
    }
}

/// Lead intake: parse, store, pick the payment link, notify best-effort.
pub async fn intake(
    state: &AppState,
    body: &str,
) -> Result<Json<IntakeResponse>, (StatusCode, Json<ErrorResponse>)> {
    match process_intake(state, body).await {
        Ok(checkout_url) => Ok(Json(IntakeResponse { ok: true, checkout_url })),
        Err(e) => {
            tracing::error!("Intake failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { ok: false, error: e.user_message() }),
            ))
        }
    }
}

async fn process_intake(state: &AppState, body: &str) -> funnel_core::Result<String> {
    let request: IntakeRequest =
        serde_json::from_str(body).map_err(|e| FunnelError::Parse(e.to_string()))?;

    let product = request
        .product_code
        .as_deref()
        .map(ProductCode::parse)
        .unwrap_or_default();
    let external_id = request
        .external_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let lead = NewLead::from_intake(
        request.name,
        external_id.clone(),
        request.email,
        request.phone,
        product,
        state.pricing.amount_for(product),
        request.notes,
    );
    let name = lead.name.clone();
    state.store.create(lead).await?;

    let checkout_url = state.links.url_for(product).to_string();

    // Notification is best-effort: a push failure never fails the request.
    let summary = format!(
        "New lead: {} ({})\nProduct: {}\nCheckout: {}",
        name,
        external_id,
        product.display_name(),
        checkout_url
    );
    if let Err(e) = state.notifier.push(&summary).await {
        tracing::warn!("Lead notification failed: {}", e);
    }

    Ok(checkout_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::config::{PaymentLinkTable, PricingConfig};
    use funnel_core::outreach::RecordingNotifier;
    use funnel_core::store::MemoryLeadStore;
    use std::sync::Arc;

    fn test_state() -> (AppState, Arc<MemoryLeadStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(MemoryLeadStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let state = AppState {
            store: store.clone(),
            notifier: notifier.clone(),
            links: Arc::new(PaymentLinkTable {
                guide_url: "https://buy.stripe.com/guide".into(),
                consult_url: "https://buy.stripe.com/consult".into(),
            }),
            pricing: PricingConfig { guide_amount: 1480, consult_amount: 3000 },
        };
        (state, store, notifier)
    }

    #[tokio::test]
    async fn test_consult_deposit_selects_consult_link() {
        let (state, store, _) = test_state();
        let body = r#"{"name":"Taro","email":"taro@example.com","product_code":"consult_deposit"}"#;

        let Json(resp) = intake(&state, body).await.unwrap();
        assert!(resp.ok);
        assert_eq!(resp.checkout_url, "https://buy.stripe.com/consult");

        let leads = store.snapshot();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].product, ProductCode::ConsultDeposit);
        assert_eq!(leads[0].price, 3000);
    }

    #[tokio::test]
    async fn test_unknown_and_missing_product_codes_default_to_guide() {
        let (state, _, _) = test_state();

        let Json(resp) = intake(&state, r#"{"product_code":"mystery"}"#).await.unwrap();
        assert_eq!(resp.checkout_url, "https://buy.stripe.com/guide");

        let Json(resp) = intake(&state, r#"{"name":"NoCode"}"#).await.unwrap();
        assert_eq!(resp.checkout_url, "https://buy.stripe.com/guide");
    }

    #[tokio::test]
    async fn test_missing_external_id_is_generated() {
        let (state, store, _) = test_state();
        intake(&state, r#"{"name":"Taro"}"#).await.unwrap();
        assert!(!store.snapshot()[0].external_id.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_500_with_error_string() {
        let (state, _, _) = test_state();
        let (status, Json(resp)) = intake(&state, "{not json").await.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!resp.ok);
        assert!(!resp.error.is_empty());
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_the_request() {
        let (mut state, store, _) = test_state();
        state.notifier = Arc::new(RecordingNotifier::failing());

        let Json(resp) = intake(&state, r#"{"name":"Taro"}"#).await.unwrap();
        assert!(resp.ok);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_carries_lead_summary_and_link() {
        let (state, _, notifier) = test_state();
        intake(&state, r#"{"name":"Taro","product_code":"consult_deposit"}"#)
            .await
            .unwrap();

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Taro"));
        assert!(messages[0].contains("https://buy.stripe.com/consult"));
    }

    #[tokio::test]
    async fn test_non_post_answers_liveness() {
        let (state, _, _) = test_state();
        let response = root(State(state), Method::GET, String::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
