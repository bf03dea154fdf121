//! Notion Lead Store
//!
//! [`LeadStore`] over the Notion REST API. One database row per lead with a
//! fixed property schema; queries paginate with the store's cursor until
//! exhausted and sort by creation time ascending.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use funnel_core::config::NotionConfig;
use funnel_core::error::{FunnelError, Result};
use funnel_core::lead::{Lead, LeadStatus, NewLead, PaymentStatus, ProductCode};
use funnel_core::store::LeadStore;

const NOTION_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const QUERY_PAGE_SIZE: u32 = 100;

/// Notion-backed lead store
pub struct NotionLeadStore {
    http: reqwest::Client,
    config: NotionConfig,
    base_url: String,
}

impl NotionLeadStore {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            base_url: NOTION_BASE_URL.to_string(),
        }
    }

    async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(FunnelError::Store(format!("{} failed: {} {}", what, status, body)))
    }

    /// Query the database, accumulating every page before returning.
    async fn query(&self, filter: Option<Value>) -> Result<Vec<Lead>> {
        let url = format!("{}/databases/{}/query", self.base_url, self.config.database_id);
        let mut leads = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut payload = json!({
                "sorts": [{"timestamp": "created_time", "direction": "ascending"}],
                "page_size": QUERY_PAGE_SIZE,
            });
            if let Some(filter) = &filter {
                payload["filter"] = filter.clone();
            }
            if let Some(cursor) = &cursor {
                payload["start_cursor"] = json!(cursor);
            }

            let resp = self
                .http
                .post(&url)
                .bearer_auth(&self.config.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&payload)
                .send()
                .await
                .map_err(|e| FunnelError::Store(format!("query request failed: {}", e)))?;
            let body: Value = Self::check(resp, "database query")
                .await?
                .json()
                .await
                .map_err(|e| FunnelError::Store(format!("query response unreadable: {}", e)))?;

            for page in body["results"].as_array().into_iter().flatten() {
                match parse_page(page) {
                    Ok(lead) => leads.push(lead),
                    Err(e) => tracing::warn!("Skipping unreadable lead row: {}", e),
                }
            }

            cursor = body["next_cursor"].as_str().map(String::from);
            let has_more = body["has_more"].as_bool().unwrap_or(false);
            if !has_more || cursor.is_none() {
                break;
            }
        }

        tracing::info!("Fetched {} leads from Notion", leads.len());
        Ok(leads)
    }
}

#[async_trait]
impl LeadStore for NotionLeadStore {
    async fn create(&self, lead: NewLead) -> Result<String> {
        let url = format!("{}/pages", self.base_url);
        let payload = json!({
            "parent": {"database_id": self.config.database_id},
            "properties": build_properties(&lead),
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FunnelError::Store(format!("create request failed: {}", e)))?;
        let body: Value = Self::check(resp, "page create")
            .await?
            .json()
            .await
            .map_err(|e| FunnelError::Store(format!("create response unreadable: {}", e)))?;
        let id = body["id"]
            .as_str()
            .ok_or_else(|| FunnelError::Store("page create returned no id".into()))?;
        tracing::info!("Created lead page {} ({})", id, lead.external_id);
        Ok(id.to_string())
    }

    async fn list_uncontacted(&self) -> Result<Vec<Lead>> {
        self.query(Some(json!({
            "property": "Contacted",
            "checkbox": {"equals": false},
        })))
        .await
    }

    async fn list_all(&self) -> Result<Vec<Lead>> {
        self.query(None).await
    }

    async fn mark_contacted(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let url = format!("{}/pages/{}", self.base_url, id);
        let payload = json!({
            "properties": {
                "Contacted": {"checkbox": true},
                "Contacted_At": {"date": {"start": at.to_rfc3339()}},
            }
        });
        let resp = self
            .http
            .patch(&url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FunnelError::Store(format!("update request failed: {}", e)))?;
        Self::check(resp, "page update").await?;
        Ok(())
    }
}

/// Map a lead onto the database's property schema
fn build_properties(lead: &NewLead) -> Value {
    json!({
        "Name": {"title": [{"text": {"content": lead.name}}]},
        "External_ID": {"rich_text": [{"text": {"content": lead.external_id}}]},
        "Email": {"email": lead.email},
        "Phone": {"phone_number": lead.phone},
        "Product": {"rich_text": [{"text": {"content": lead.product.sku()}}]},
        "Price": {"number": lead.price},
        "CVR": {"number": lead.expected_cvr},
        "Status": {"select": {"name": LeadStatus::New.as_str()}},
        "Payment_Status": {"select": {"name": PaymentStatus::Pending.as_str()}},
        "Notes": {"rich_text": if lead.notes.is_empty() {
            json!([])
        } else {
            json!([{"text": {"content": lead.notes}}])
        }},
        "Contacted": {"checkbox": false},
    })
}

/// Read a lead back out of a query result page
fn parse_page(page: &Value) -> Result<Lead> {
    let id = page["id"]
        .as_str()
        .ok_or_else(|| FunnelError::MalformedRecord("page without id".into()))?;
    let props = &page["properties"];

    let created_at = page["created_time"]
        .as_str()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| FunnelError::MalformedRecord(format!("page {} has no created_time", id)))?;

    Ok(Lead {
        id: id.to_string(),
        name: title_text(&props["Name"]),
        external_id: rich_text(&props["External_ID"]),
        email: non_empty(props["Email"]["email"].as_str()),
        phone: non_empty(props["Phone"]["phone_number"].as_str()),
        product: ProductCode::parse(&rich_text(&props["Product"])),
        price: props["Price"]["number"].as_i64().unwrap_or(0),
        expected_cvr: props["CVR"]["number"].as_f64().unwrap_or(0.0),
        status: LeadStatus::parse(select_name(&props["Status"])),
        payment_status: PaymentStatus::parse(select_name(&props["Payment_Status"])),
        payment_date: date_value(&props["Payment_Date"]),
        notes: rich_text(&props["Notes"]),
        contacted: props["Contacted"]["checkbox"].as_bool().unwrap_or(false),
        contacted_at: date_value(&props["Contacted_At"]),
        created_at,
    })
}

fn title_text(prop: &Value) -> String {
    prop["title"][0]["text"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

fn rich_text(prop: &Value) -> String {
    prop["rich_text"][0]["text"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

fn select_name(prop: &Value) -> &str {
    prop["select"]["name"].as_str().unwrap_or_default()
}

fn date_value(prop: &Value) -> Option<DateTime<Utc>> {
    prop["date"]["start"]
        .as_str()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty()).map(String::from)
}
