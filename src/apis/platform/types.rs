//! Response shapes for the platform backend
//!
//! The backend wraps every payload in a `{ success, data, message }`
//! envelope. Payload shapes here mirror what the dashboard actually renders;
//! unknown fields are ignored so backend additions do not break older
//! clients.

use serde::{Deserialize, Serialize};

/// Standard response envelope used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Authorization URL for an external OAuth provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUrlData {
    pub url: String,
}

/// Linked condition for one external platform account.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkStatusData {
    pub linked: bool,
    #[serde(default)]
    pub page_name: Option<String>,
}

/// Dashboard overview aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewData {
    pub connected_pages: u32,
    pub scheduled_posts: u32,
    pub published_posts: u32,
    #[serde(default)]
    pub failed_posts: u32,
}

/// Usage counters for the current billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageData {
    pub posts_used: u32,
    pub posts_limit: u32,
    pub ai_generations_used: u32,
    pub ai_generations_limit: u32,
    #[serde(default)]
    pub period_end: Option<String>,
}

/// One subscription tier as shown on the pricing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierData {
    pub id: String,
    pub name: String,
    pub monthly_price_cents: u32,
    pub currency: String,
    pub post_limit: u32,
    pub ai_generation_limit: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decodes_success_payload() {
        let body = r#"{"success": true, "data": {"linked": true, "page_name": "My Page"}}"#;
        let envelope: ApiEnvelope<LinkStatusData> = serde_json::from_str(body).unwrap();

        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert!(data.linked);
        assert_eq!(data.page_name.as_deref(), Some("My Page"));
    }

    #[test]
    fn envelope_decodes_failure_without_data() {
        let body = r#"{"success": false, "message": "token expired"}"#;
        let envelope: ApiEnvelope<LinkStatusData> = serde_json::from_str(body).unwrap();

        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("token expired"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body = r#"{"success": true, "data": {"connected_pages": 2, "scheduled_posts": 5,
                        "published_posts": 40, "brand_new_field": "x"}}"#;
        let envelope: ApiEnvelope<OverviewData> = serde_json::from_str(body).unwrap();

        let data = envelope.data.unwrap();
        assert_eq!(data.connected_pages, 2);
        assert_eq!(data.failed_posts, 0);
    }
}
