//! The ordering chain: authenticate, resolve the organization, then read the
//! catalog or terminal group, and finally submit an order.
//!
//! Each step takes what the previous one produced as a parameter. The
//! convenience entry points run the chain once per call; nothing is cached
//! between calls.

use tracing::{info, instrument};

use crate::client::IikoClient;
use crate::errors::ServiceResult;
use crate::models::{
    AccessToken, Catalog, Credential, OrderItems, OrderReceipt, OrderRequest, OrganizationId,
    TerminalGroupId,
};

/// Token and organization resolved for one run of the chain.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: AccessToken,
    pub organization_id: OrganizationId,
}

pub struct OrderingWorkflow {
    client: IikoClient,
    credential: Credential,
    order_comment: String,
}

impl OrderingWorkflow {
    pub fn new(client: IikoClient, credential: Credential, order_comment: impl Into<String>) -> Self {
        Self {
            client,
            credential,
            order_comment: order_comment.into(),
        }
    }

    pub fn client(&self) -> &IikoClient {
        &self.client
    }

    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> ServiceResult<AccessToken> {
        self.client.access_token(&self.credential).await
    }

    #[instrument(skip(self, token))]
    pub async fn resolve_organization(&self, token: &AccessToken) -> ServiceResult<OrganizationId> {
        self.client.organization_id(token).await
    }

    #[instrument(skip(self, session), fields(organization_id = %session.organization_id))]
    pub async fn fetch_catalog(&self, session: &Session) -> ServiceResult<Catalog> {
        self.client
            .nomenclature(&session.token, &session.organization_id)
            .await
    }

    #[instrument(skip(self, session), fields(organization_id = %session.organization_id))]
    pub async fn resolve_terminal(&self, session: &Session) -> ServiceResult<TerminalGroupId> {
        self.client
            .terminal_group_id(&session.token, &session.organization_id)
            .await
    }

    #[instrument(skip(self, session, items), fields(items = items.len()))]
    pub async fn submit_order(
        &self,
        session: &Session,
        terminal_group_id: TerminalGroupId,
        items: &OrderItems,
    ) -> ServiceResult<OrderReceipt> {
        let request = OrderRequest::new(
            session.organization_id.clone(),
            terminal_group_id,
            items,
            &self.order_comment,
        );

        let receipt = self.client.create_order(&session.token, &request).await?;
        info!(
            organization_id = %request.organization_id(),
            terminal_group_id = %request.terminal_group_id(),
            correlation_id = ?receipt.correlation_id,
            "order created"
        );
        Ok(receipt)
    }

    /// Authenticates and resolves the organization.
    pub async fn open_session(&self) -> ServiceResult<Session> {
        let token = self.authenticate().await?;
        let organization_id = self.resolve_organization(&token).await?;
        Ok(Session {
            token,
            organization_id,
        })
    }

    pub async fn organization(&self) -> ServiceResult<OrganizationId> {
        Ok(self.open_session().await?.organization_id)
    }

    pub async fn menu(&self) -> ServiceResult<Catalog> {
        let session = self.open_session().await?;
        self.fetch_catalog(&session).await
    }

    pub async fn terminal(&self) -> ServiceResult<TerminalGroupId> {
        let session = self.open_session().await?;
        self.resolve_terminal(&session).await
    }

    /// Runs the whole chain and places the order. Nothing is sent to
    /// `order/create` unless the organization and terminal group resolved.
    pub async fn place_order(&self, items: &OrderItems) -> ServiceResult<OrderReceipt> {
        let session = self.open_session().await?;
        let terminal_group_id = self.resolve_terminal(&session).await?;
        self.submit_order(&session, terminal_group_id, items).await
    }
}
