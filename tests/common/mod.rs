#![allow(dead_code)]

use std::io::Write;

use iiko_order_client::{credentials, IikoClient, OrderingWorkflow};
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_LOGIN: &str = "abc123";
pub const TOKEN: &str = "T";
pub const ORDER_COMMENT: &str = "Тестовый заказ. Не делать!";

/// Mock iiko API plus a workflow wired to it through a real credential file.
pub struct TestApi {
    pub server: MockServer,
    pub workflow: OrderingWorkflow,
    _credential_file: NamedTempFile,
}

impl TestApi {
    pub async fn new() -> Self {
        let server = MockServer::start().await;

        let mut credential_file = NamedTempFile::new().unwrap();
        writeln!(credential_file, "{}", API_LOGIN).unwrap();
        let credential = credentials::load_api_login(credential_file.path()).unwrap();

        let client = IikoClient::with_base_url(format!("{}/api/1", server.uri())).unwrap();
        let workflow = OrderingWorkflow::new(client, credential, ORDER_COMMENT);

        Self {
            server,
            workflow,
            _credential_file: credential_file,
        }
    }

    pub async fn mock_token(&self, status: u16, body: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/1/access_token"))
            .and(body_json(json!({ "apiLogin": API_LOGIN })))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_organizations(&self, status: u16, body: Value, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/api/1/organizations"))
            .and(header("Authorization", "Bearer T"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_nomenclature(&self, status: u16, body: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/1/nomenclature"))
            .and(header("Authorization", "Bearer T"))
            .and(body_json(json!({ "organizationId": "org1", "startRevision": 0 })))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_terminal_groups(&self, status: u16, body: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/1/terminal_groups"))
            .and(header("Authorization", "Bearer T"))
            .and(body_json(json!({ "organizationIds": ["org1"] })))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Mounts `order/create`. With `expected_body`, only that exact payload matches.
    pub async fn mock_order_create(
        &self,
        status: u16,
        expected_body: Option<Value>,
        expected_calls: u64,
    ) {
        let mut mock = Mock::given(method("POST"))
            .and(path("/api/1/order/create"))
            .and(header("Authorization", "Bearer T"));
        if let Some(body) = expected_body {
            mock = mock.and(body_json(body));
        }
        mock.respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "correlationId": "corr-1" })),
        )
        .expect(expected_calls)
        .mount(&self.server)
        .await;
    }

    /// Token and a single organization `org1`, each expected exactly once.
    pub async fn mock_session(&self) {
        self.mock_token(200, json!({ "token": TOKEN }), 1).await;
        self.mock_organizations(200, json!({ "organizations": [{ "id": "org1", "name": "Main" }] }), 1)
            .await;
    }
}

pub fn products(entries: &[(&str, &str)]) -> Value {
    let products: Vec<Value> = entries
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name, "type": "Dish" }))
        .collect();
    json!({ "correlationId": "c", "products": products })
}
