use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::{ServiceResult, UpstreamFailure};
use crate::models::{
    AccessToken, AccessTokenRequest, AccessTokenResponse, Catalog, Credential,
    NomenclatureRequest, NomenclatureResponse, OrderReceipt, OrderRequest, OrganizationId,
    OrganizationsResponse, ProductId, TerminalGroupId, TerminalGroupsRequest,
    TerminalGroupsResponse,
};

pub const ACCESS_TOKEN: &str = "access_token";
pub const ORGANIZATIONS: &str = "organizations";
pub const NOMENCLATURE: &str = "nomenclature";
pub const TERMINAL_GROUPS: &str = "terminal_groups";
pub const ORDER_CREATE: &str = "order/create";

/// Thin wrapper over the iiko.services endpoints. One method, one round trip.
#[derive(Clone)]
pub struct IikoClient {
    client: reqwest::Client,
    base_url: String,
}

impl IikoClient {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("iiko-order-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::new(&AppConfig::with_base_url(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Exchanges the API login for a bearer token.
    pub async fn access_token(&self, credential: &Credential) -> ServiceResult<AccessToken> {
        let request = self
            .client
            .post(self.endpoint(ACCESS_TOKEN))
            .json(&AccessTokenRequest {
                api_login: credential.as_str(),
            });

        let body: AccessTokenResponse = self.send_expecting(ACCESS_TOKEN, request).await?;
        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UpstreamFailure::missing_field(ACCESS_TOKEN, "token"))?;

        Ok(AccessToken::new(token))
    }

    /// First organization visible to `token`.
    pub async fn organization_id(&self, token: &AccessToken) -> ServiceResult<OrganizationId> {
        let request = self
            .client
            .get(self.endpoint(ORGANIZATIONS))
            .bearer_auth(token.as_str());

        let body: OrganizationsResponse = self.send_expecting(ORGANIZATIONS, request).await?;
        let first = body
            .organizations
            .and_then(|orgs| orgs.into_iter().next())
            .ok_or_else(|| UpstreamFailure::missing_field(ORGANIZATIONS, "organizations"))?;

        debug!(organization_id = %first.id, "organization resolved");
        Ok(OrganizationId::new(first.id))
    }

    /// Full product catalog of `organization`, from revision zero.
    pub async fn nomenclature(
        &self,
        token: &AccessToken,
        organization: &OrganizationId,
    ) -> ServiceResult<Catalog> {
        let request = self
            .client
            .post(self.endpoint(NOMENCLATURE))
            .bearer_auth(token.as_str())
            .json(&NomenclatureRequest {
                organization_id: organization,
                start_revision: 0,
            });

        let body: NomenclatureResponse = self.send_expecting(NOMENCLATURE, request).await?;
        let products = body
            .products
            .filter(|products| !products.is_empty())
            .ok_or_else(|| UpstreamFailure::missing_field(NOMENCLATURE, "products"))?;

        let catalog: Catalog = products
            .into_iter()
            .map(|product| (product.name, ProductId::new(product.id)))
            .collect();

        debug!(products = catalog.len(), "nomenclature loaded");
        Ok(catalog)
    }

    /// First item of the first terminal group of `organization`.
    pub async fn terminal_group_id(
        &self,
        token: &AccessToken,
        organization: &OrganizationId,
    ) -> ServiceResult<TerminalGroupId> {
        let request = self
            .client
            .post(self.endpoint(TERMINAL_GROUPS))
            .bearer_auth(token.as_str())
            .json(&TerminalGroupsRequest {
                organization_ids: [organization],
            });

        let body: TerminalGroupsResponse = self.send_expecting(TERMINAL_GROUPS, request).await?;
        let group = body
            .terminal_groups
            .and_then(|groups| groups.into_iter().next())
            .ok_or_else(|| UpstreamFailure::missing_field(TERMINAL_GROUPS, "terminalGroups"))?;
        let item = group.items.into_iter().next().ok_or_else(|| {
            UpstreamFailure::missing_field(TERMINAL_GROUPS, "terminalGroups[0].items")
        })?;

        debug!(terminal_group_id = %item.id, "terminal group resolved");
        Ok(TerminalGroupId::new(item.id))
    }

    /// Places the order. This creates a real order on the point of sale.
    pub async fn create_order(
        &self,
        token: &AccessToken,
        order: &OrderRequest,
    ) -> ServiceResult<OrderReceipt> {
        let response = self
            .client
            .post(self.endpoint(ORDER_CREATE))
            .bearer_auth(token.as_str())
            .json(order)
            .send()
            .await
            .map_err(|e| UpstreamFailure::transport(ORDER_CREATE, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body_text = response.text().await.unwrap_or_default();
            warn!(endpoint = ORDER_CREATE, status = status.as_u16(), body = %body_text, "order rejected");
            return Err(UpstreamFailure::status(ORDER_CREATE, status.as_u16()).into());
        }

        // The order exists once we see a 200, so an odd body must not turn
        // it into a failure.
        let text = response.text().await.unwrap_or_default();
        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        Ok(OrderReceipt::from_body(body))
    }

    async fn send_expecting<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, UpstreamFailure> {
        debug!(endpoint, "sending request");
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamFailure::transport(endpoint, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body_text = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), body = %body_text, "unexpected status");
            return Err(UpstreamFailure::status(endpoint, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamFailure::decode(endpoint, e.to_string()))
    }
}
