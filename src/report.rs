//! Console wording for results, decided at the boundary rather than where
//! the failure happens.

use serde_json::{json, Value};

use crate::driver::TestOrderError;
use crate::errors::{ServiceError, UpstreamFailureKind};

pub const ORDER_CREATED: &str = "Заказ успешно создан";
pub const ORDER_FAILED: &str = "Ошибка при создании заказа";
pub const MENU_UNAVAILABLE: &str = "Не удалось получить меню";

const FILE_NOT_FOUND: &str = "file not found";

/// One-line diagnostic for a failed step.
pub fn describe_failure(err: &ServiceError) -> String {
    match err {
        ServiceError::MissingCredential { path, reason } if reason == FILE_NOT_FOUND => {
            format!("Файл '{}' не найден", path.display())
        }
        ServiceError::MissingCredential { path, reason } => {
            format!("Файл '{}': {}", path.display(), reason)
        }
        ServiceError::Upstream(failure) => match &failure.kind {
            UpstreamFailureKind::Status { status } => format!("Error: {}", status),
            UpstreamFailureKind::MissingField { field } => match *field {
                "organizations" => "No organizations found".to_string(),
                "products" => "No products found".to_string(),
                "terminalGroups" => "No terminal groups found".to_string(),
                other => format!("Error: {} returned no '{}'", failure.endpoint, other),
            },
            UpstreamFailureKind::Transport { message } | UpstreamFailureKind::Decode { message } => {
                format!("Error: {}: {}", failure.endpoint, message)
            }
        },
    }
}

/// Outcome line for an order submission.
pub fn describe_order_result<T>(result: &Result<T, ServiceError>) -> String {
    match result {
        Ok(_) => ORDER_CREATED.to_string(),
        Err(err) => match err.status_code() {
            Some(status) if err.endpoint() == Some(crate::client::ORDER_CREATE) => {
                format!("{}: {}", ORDER_FAILED, status)
            }
            _ => describe_failure(err),
        },
    }
}

/// Outcome line for the smoke-test order.
pub fn describe_test_order_error(err: &TestOrderError) -> String {
    match err {
        TestOrderError::Menu(inner) => format!("{} ({})", MENU_UNAVAILABLE, describe_failure(inner)),
        TestOrderError::Order(inner) => describe_order_result::<()>(&Err(inner.clone())),
    }
}

/// `--json` counterpart of [`describe_failure`].
pub fn failure_json(err: &ServiceError) -> Value {
    json!({ "error": err, "message": describe_failure(err) })
}

pub fn order_failure_json(err: &ServiceError) -> Value {
    json!({
        "error": err,
        "message": describe_order_result::<()>(&Err(err.clone())),
    })
}

pub fn test_order_failure_json(err: &TestOrderError) -> Value {
    let stage = match err {
        TestOrderError::Menu(_) => "menu",
        TestOrderError::Order(_) => "order",
    };
    json!({
        "stage": stage,
        "error": err.service_error(),
        "message": describe_test_order_error(err),
    })
}
