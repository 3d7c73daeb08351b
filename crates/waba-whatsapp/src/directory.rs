//! Assigned-WABA discovery for the configured business.
//!
//! Lists the WhatsApp Business Accounts shared with the tech provider's
//! business portfolio, filtered by the client business id, following
//! `paging.next` links in service order.

use crate::api_client::GraphClient;
use crate::types::{Business, WabaRef};
use async_trait::async_trait;
use log::{error, info, warn};
use waba_core::{ApiError, ApiResult, Audience};

const REJECTED: &str = "Failed to get assigned WABAs";
const FAILED: &str = "Assigned WABAs retrieval failed";

/// Anything that can enumerate the WABAs assigned to the business.
#[async_trait]
pub trait WabaSource: Send + Sync {
    async fn list_assigned_wabas(&self) -> ApiResult<Vec<WabaRef>>;
}

/// Directory backed by `/{portfolio}/client_whatsapp_business_accounts`.
#[derive(Debug, Clone)]
pub struct WabaDirectory {
    client: GraphClient,
    business: Business,
    max_pages: u32,
}

impl WabaDirectory {
    pub fn new(client: GraphClient, business: Business, max_pages: u32) -> Self {
        Self {
            client,
            business,
            max_pages: max_pages.max(1),
        }
    }

    async fn fetch_all(&self) -> ApiResult<Vec<WabaRef>> {
        let url = self.client.node_url(
            &self.business.business_portfolio_id,
            "client_whatsapp_business_accounts",
        )?;
        let mut page = self
            .client
            .get(
                Audience::WhatsAppProvider,
                &url,
                &[("business", self.business.account_id.as_str())],
            )
            .await?;

        let mut wabas = Vec::new();
        let mut fetched = 1;
        loop {
            let (entries, next) = parse_page(&page)?;
            wabas.extend(entries);
            let Some(next) = next else { break };
            if fetched >= self.max_pages {
                warn!(
                    "Stopped following assigned WABA pages after {} pages",
                    fetched
                );
                break;
            }
            if !self.client.same_origin(&next) {
                return Err(ApiError::invalid_payload(format!(
                    "paging link leaves the Graph API host: {}",
                    next
                )));
            }
            page = self
                .client
                .get(Audience::WhatsAppProvider, &next, &[])
                .await?;
            fetched += 1;
        }
        Ok(wabas)
    }
}

#[async_trait]
impl WabaSource for WabaDirectory {
    async fn list_assigned_wabas(&self) -> ApiResult<Vec<WabaRef>> {
        info!("Getting assigned WABAs");
        match self.fetch_all().await {
            Ok(wabas) => {
                info!("Successfully got {} assigned WABAs", wabas.len());
                Ok(wabas)
            }
            Err(e) => {
                let e = e.in_step(REJECTED, FAILED);
                error!("{}", e);
                Err(e)
            }
        }
    }
}

/// Split one listing page into entries and the next-page link.
fn parse_page(page: &serde_json::Value) -> ApiResult<(Vec<WabaRef>, Option<String>)> {
    if !page.is_object() {
        return Err(ApiError::invalid_payload(
            "assigned WABA listing is not a JSON object",
        ));
    }
    let entries = match &page["data"] {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(arr) => arr.iter().map(WabaRef::from_value).collect(),
        _ => {
            return Err(ApiError::invalid_payload(
                "assigned WABA listing `data` is not an array",
            ))
        }
    };
    let next = page["paging"]["next"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from);
    Ok((entries, next))
}
