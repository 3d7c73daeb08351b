//! WhatsApp Business Profile management via the Cloud API.
//!
//! Get and update the profile shown to customers for a registered phone
//! number. Both calls use the client business token.

use crate::api_client::GraphClient;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use waba_core::{ApiError, ApiResult, Audience};

const PROFILE_FIELDS: &str = "about,address,description,email,profile_picture_url,websites,vertical";

/// Business profile as returned by the Graph API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub messaging_product: String,
    pub about: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub vertical: Option<String>,
    pub websites: Vec<String>,
    pub profile_picture_url: Option<String>,
}

/// Fields that can be updated on the business profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBusinessProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websites: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct BusinessProfileManager {
    client: GraphClient,
}

impl BusinessProfileManager {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, phone_number_id: &str) -> ApiResult<BusinessProfile> {
        let url = self
            .client
            .node_url(phone_number_id, "whatsapp_business_profile")?;
        let resp = self
            .client
            .get(Audience::WhatsAppBusiness, &url, &[("fields", PROFILE_FIELDS)])
            .await?;

        let data = resp["data"]
            .as_array()
            .and_then(|arr| arr.first())
            .unwrap_or(&resp);

        Ok(BusinessProfile {
            messaging_product: data["messaging_product"]
                .as_str()
                .unwrap_or("whatsapp")
                .to_string(),
            about: data["about"].as_str().map(String::from),
            address: data["address"].as_str().map(String::from),
            description: data["description"].as_str().map(String::from),
            email: data["email"].as_str().map(String::from),
            vertical: data["vertical"].as_str().map(String::from),
            websites: data["websites"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|w| w.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
            profile_picture_url: data["profile_picture_url"].as_str().map(String::from),
        })
    }

    /// Only provided fields change; omitted fields keep their value.
    pub async fn update(
        &self,
        phone_number_id: &str,
        request: &UpdateBusinessProfile,
    ) -> ApiResult<()> {
        if request.websites.as_ref().is_some_and(|w| w.len() > 2) {
            return Err(ApiError::invalid_parameter(
                "WhatsApp Business API allows max 2 websites",
            ));
        }

        let url = self
            .client
            .node_url(phone_number_id, "whatsapp_business_profile")?;
        let mut body = serde_json::to_value(request)
            .map_err(|e| ApiError::invalid_payload(e.to_string()))?;
        body["messaging_product"] = json!("whatsapp");

        self.client
            .post_status(Audience::WhatsAppBusiness, &url, body)
            .await?;
        info!("Updated business profile for phone {}", phone_number_id);
        Ok(())
    }
}
