use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::models::{OrderItems, OrderReceipt};
use crate::workflow::OrderingWorkflow;

/// Where the smoke-test order stopped.
#[derive(Debug, thiserror::Error)]
pub enum TestOrderError {
    #[error("could not fetch the menu: {0}")]
    Menu(#[source] ServiceError),

    #[error("could not create the order: {0}")]
    Order(#[source] ServiceError),
}

impl TestOrderError {
    pub fn service_error(&self) -> &ServiceError {
        match self {
            Self::Menu(err) | Self::Order(err) => err,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestOrderOutcome {
    pub items: OrderItems,
    pub receipt: OrderReceipt,
}

/// Fetches the menu, takes the first `limit` products at amount zero and
/// submits them. Exercises the full chain; places a real (empty) order.
#[instrument(skip(workflow))]
pub async fn run_test_order(
    workflow: &OrderingWorkflow,
    limit: usize,
) -> Result<TestOrderOutcome, TestOrderError> {
    let session = workflow
        .open_session()
        .await
        .map_err(TestOrderError::Menu)?;
    let catalog = workflow
        .fetch_catalog(&session)
        .await
        .map_err(TestOrderError::Menu)?;

    let items: OrderItems = catalog
        .product_ids()
        .take(limit)
        .map(|id| (id.clone(), Decimal::ZERO))
        .collect();
    info!(items = items.len(), "submitting test order");

    let terminal_group_id = workflow
        .resolve_terminal(&session)
        .await
        .map_err(TestOrderError::Order)?;
    let receipt = workflow
        .submit_order(&session, terminal_group_id, &items)
        .await
        .map_err(TestOrderError::Order)?;

    Ok(TestOrderOutcome { items, receipt })
}
