//! Identifiers, the product catalog, the order payload and the wire bodies
//! exchanged with the iiko.services API.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// API login string that identifies the caller. Read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Short-lived bearer token returned by `access_token`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Tenant under which menus, terminals and orders live.
    OrganizationId
);
string_id!(
    /// Point-of-sale endpoint an order is routed to.
    TerminalGroupId
);
string_id!(ProductId);

/// Product name to product id, iterated in the order names were first seen.
///
/// A repeated name replaces the earlier id but keeps the earlier position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(String, ProductId)>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: ProductId) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&pos) => self.entries[pos].1 = id,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, id));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ProductId> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), id))
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.entries.iter().map(|(_, id)| id)
    }
}

impl FromIterator<(String, ProductId)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, ProductId)>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for (name, id) in iter {
            catalog.insert(name, id);
        }
        catalog
    }
}

impl Serialize for Catalog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Requested amount per product, one line item each, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderItems(Vec<(ProductId, Decimal)>);

impl OrderItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount for `product`; an existing entry keeps its position.
    pub fn set(&mut self, product: ProductId, amount: Decimal) {
        match self.0.iter_mut().find(|(id, _)| *id == product) {
            Some(entry) => entry.1 = amount,
            None => self.0.push((product, amount)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &Decimal)> {
        self.0.iter().map(|(id, amount)| (id, amount))
    }
}

impl FromIterator<(ProductId, Decimal)> for OrderItems {
    fn from_iter<I: IntoIterator<Item = (ProductId, Decimal)>>(iter: I) -> Self {
        let mut items = OrderItems::new();
        for (id, amount) in iter {
            items.set(id, amount);
        }
        items
    }
}

/// Body of `order/create`. Only built from an already resolved organization
/// and terminal group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    organization_id: OrganizationId,
    terminal_group_id: TerminalGroupId,
    order: OrderPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayload {
    items: Vec<OrderLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: ProductId,
    #[serde(rename = "type")]
    pub item_type: OrderItemType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderItemType {
    Product,
}

impl OrderRequest {
    pub fn new(
        organization_id: OrganizationId,
        terminal_group_id: TerminalGroupId,
        items: &OrderItems,
        comment: &str,
    ) -> Self {
        let items = items
            .iter()
            .map(|(product_id, amount)| OrderLineItem {
                product_id: product_id.clone(),
                item_type: OrderItemType::Product,
                amount: *amount,
                comment: comment.to_string(),
            })
            .collect();

        Self {
            organization_id,
            terminal_group_id,
            order: OrderPayload { items },
        }
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    pub fn terminal_group_id(&self) -> &TerminalGroupId {
        &self.terminal_group_id
    }
}

/// What the API returned for a created order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderReceipt {
    pub correlation_id: Option<String>,
    pub body: serde_json::Value,
}

impl OrderReceipt {
    pub fn from_body(body: serde_json::Value) -> Self {
        let correlation_id = body
            .get("correlationId")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Self {
            correlation_id,
            body,
        }
    }
}

// Wire bodies. Responses keep only the fields this client reads; every
// collection is optional so an absent field can be told apart from bad JSON.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessTokenRequest<'a> {
    pub api_login: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct OrganizationsResponse {
    pub organizations: Option<Vec<IdEnvelope>>,
}

#[derive(Deserialize)]
pub(crate) struct IdEnvelope {
    pub id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NomenclatureRequest<'a> {
    pub organization_id: &'a OrganizationId,
    pub start_revision: i64,
}

#[derive(Deserialize)]
pub(crate) struct NomenclatureResponse {
    pub products: Option<Vec<NomenclatureProduct>>,
}

#[derive(Deserialize)]
pub(crate) struct NomenclatureProduct {
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TerminalGroupsRequest<'a> {
    pub organization_ids: [&'a OrganizationId; 1],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TerminalGroupsResponse {
    pub terminal_groups: Option<Vec<TerminalGroupEnvelope>>,
}

#[derive(Deserialize)]
pub(crate) struct TerminalGroupEnvelope {
    #[serde(default)]
    pub items: Vec<IdEnvelope>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn catalog_duplicate_name_overwrites_in_place() {
        let catalog: Catalog = vec![
            ("Pizza".to_string(), ProductId::new("p1")),
            ("Cola".to_string(), ProductId::new("p2")),
            ("Pizza".to_string(), ProductId::new("p3")),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Pizza"), Some(&ProductId::new("p3")));
        let ids: Vec<_> = catalog.product_ids().map(ProductId::as_str).collect();
        assert_eq!(ids, vec!["p3", "p2"]);
    }

    #[test]
    fn catalog_serializes_as_map() {
        let mut catalog = Catalog::new();
        catalog.insert("Pizza", ProductId::new("p1"));
        catalog.insert("Cola", ProductId::new("p2"));

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value, json!({"Pizza": "p1", "Cola": "p2"}));
    }

    #[test]
    fn order_request_matches_wire_shape() {
        let items: OrderItems = vec![
            (ProductId::new("p1"), dec!(0)),
            (ProductId::new("p2"), dec!(1.5)),
        ]
        .into_iter()
        .collect();
        let request = OrderRequest::new(
            OrganizationId::new("org1"),
            TerminalGroupId::new("tg1"),
            &items,
            "test",
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "organizationId": "org1",
                "terminalGroupId": "tg1",
                "order": {
                    "items": [
                        {"productId": "p1", "type": "Product", "amount": 0.0, "comment": "test"},
                        {"productId": "p2", "type": "Product", "amount": 1.5, "comment": "test"}
                    ]
                }
            })
        );
    }

    #[test]
    fn order_items_set_replaces_existing_amount() {
        let mut items = OrderItems::new();
        items.set(ProductId::new("p1"), dec!(2));
        items.set(ProductId::new("p2"), dec!(1));
        items.set(ProductId::new("p1"), dec!(0));

        let collected: Vec<_> = items.iter().map(|(id, a)| (id.as_str(), *a)).collect();
        assert_eq!(collected, vec![("p1", dec!(0)), ("p2", dec!(1))]);
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        assert_eq!(format!("{:?}", Credential::new("abc123")), "Credential(***)");
        assert_eq!(format!("{:?}", AccessToken::new("T")), "AccessToken(***)");
    }

    #[test]
    fn receipt_picks_up_correlation_id() {
        let receipt = OrderReceipt::from_body(json!({"correlationId": "c-1"}));
        assert_eq!(receipt.correlation_id.as_deref(), Some("c-1"));
        assert_eq!(OrderReceipt::from_body(json!({})).correlation_id, None);
    }
}
