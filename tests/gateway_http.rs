//! End-to-end HTTP tests: real router on 127.0.0.1:0 over the in-memory store
//!
//! Run with: cargo test --test gateway_http

use std::str::FromStr;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use bankcore::account::AccountNumberAllocator;
use bankcore::gateway::{self, state::AppState};
use bankcore::store::MemoryStore;

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let state = Arc::new(AppState::from_store(
            Arc::new(MemoryStore::new()),
            AccountNumberAllocator::default(),
            "BANK0000001",
            "gateway-test-secret".to_string(),
            1,
        ));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            gateway::serve(listener, state).await.unwrap();
        });
        Self {
            base: format!("http://{}/api/v1", addr),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    /// Register + login, returning the bearer token
    async fn customer(&self, email: &str) -> String {
        let (status, _) = self
            .post(
                "/auth/register",
                None,
                json!({"name": "Test Customer", "email": email, "password": "password123"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .post(
                "/auth/login",
                None,
                json!({"email": email, "password": "password123"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn open_account(&self, token: &str, initial_balance: &str) -> String {
        let (status, body) = self
            .post(
                "/accounts",
                Some(token),
                json!({"initialBalance": initial_balance}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["accountNumber"].as_str().unwrap().to_string()
    }
}

fn dec(v: &Value) -> Decimal {
    Decimal::from_str(v.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["store"], "memory");
}

#[tokio::test]
async fn test_own_transfer_end_to_end() {
    let server = TestServer::start().await;
    let token = server.customer("owner@example.com").await;
    let a = server.open_account(&token, "1000.00").await;
    let b = server.open_account(&token, "0").await;

    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": a, "toAccountNo": b, "amount": "300.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["code"], 0);
    let data = &body["data"];
    assert_eq!(data["fromAccount"]["accountNumber"], a.as_str());
    assert_eq!(dec(&data["fromAccount"]["newBalance"]), Decimal::new(700, 0));
    assert_eq!(dec(&data["toAccount"]["newBalance"]), Decimal::new(300, 0));
    let tx_id = data["transactionId"].as_str().unwrap().to_string();

    let (status, body) = server.get(&format!("/transactions/{}", tx_id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["senderAccNo"], a.as_str());
    assert_eq!(body["data"]["transactionType"], "TRANSFER");
    assert_eq!(body["data"]["category"], "SELF_TRANSFER");

    let (_, body) = server.get(&format!("/transactions/sender/{}", a), Some(&token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = server.get(&format!("/transactions/receiver/{}", a), Some(&token)).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = server.get(&format!("/accounts/{}", b), Some(&token)).await;
    assert_eq!(dec(&body["data"]["balance"]), Decimal::new(300, 0));
}

#[tokio::test]
async fn test_transfer_rejections() {
    let server = TestServer::start().await;
    let token = server.customer("reject@example.com").await;
    let a = server.open_account(&token, "100.00").await;
    let b = server.open_account(&token, "0").await;

    // insufficient funds
    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": a, "toAccountNo": b, "amount": "100.01"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 1002);

    // same account
    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": a, "toAccountNo": a, "amount": "1.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1004);

    // zero amount
    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": a, "toAccountNo": b, "amount": "0"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1003);

    // numeric JSON amount is malformed input
    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": a, "toAccountNo": b, "amount": 5}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    // unknown destination
    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": a, "toAccountNo": "999999999999", "amount": "1.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    // nothing moved
    let (_, body) = server.get(&format!("/accounts/{}", a), Some(&token)).await;
    assert_eq!(dec(&body["data"]["balance"]), Decimal::new(100, 0));
}

#[tokio::test]
async fn test_ownership_and_auth() {
    let server = TestServer::start().await;
    let alice = server.customer("alice@example.com").await;
    let bob = server.customer("bob@example.com").await;
    let alice_acc = server.open_account(&alice, "50.00").await;
    let bob_acc = server.open_account(&bob, "0").await;

    let (status, _) = server
        .post(
            "/accounts/transfer",
            None,
            json!({"fromAccountNo": alice_acc, "toAccountNo": bob_acc, "amount": "1.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some("garbage"),
            json!({"fromAccountNo": alice_acc, "toAccountNo": bob_acc, "amount": "1.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2002);

    // accounts of two different customers
    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&alice),
            json!({"fromAccountNo": alice_acc, "toAccountNo": bob_acc, "amount": "1.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2003);

    // bob cannot deactivate alice's account
    let (status, _) = server
        .post(&format!("/accounts/{}/deactivate", alice_acc), Some(&bob), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .post(&format!("/accounts/{}/deactivate", alice_acc), Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], false);

    let (_, body) = server.get("/accounts", Some(&alice)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    let (_, body) = server.get("/accounts?include_inactive=true", Some(&alice)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generic_transactions() {
    let server = TestServer::start().await;
    let alice = server.customer("gen-alice@example.com").await;
    let bob = server.customer("gen-bob@example.com").await;
    let alice_acc = server.open_account(&alice, "200.00").await;
    let bob_acc = server.open_account(&bob, "0").await;

    // ownershipCheck is mandatory
    let (status, _) = server
        .post(
            "/transactions",
            Some(&alice),
            json!({
                "senderAccNo": alice_acc, "receiverAccNo": bob_acc, "amount": "10.00",
                "transactionType": "TRANSFER", "category": "Gift"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // third-party transfer with an explicit "none" policy
    let (status, body) = server
        .post(
            "/transactions",
            Some(&alice),
            json!({
                "senderAccNo": alice_acc, "receiverAccNo": bob_acc, "amount": "10.00",
                "transactionType": "TRANSFER", "category": "Gift", "ownershipCheck": "none"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], true);

    // same transfer under same_customer is refused
    let (status, _) = server
        .post(
            "/transactions",
            Some(&alice),
            json!({
                "senderAccNo": alice_acc, "receiverAccNo": bob_acc, "amount": "10.00",
                "transactionType": "TRANSFER", "category": "Gift",
                "ownershipCheck": "same_customer"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // status=false on a balance-moving type
    let (status, _) = server
        .post(
            "/transactions",
            Some(&alice),
            json!({
                "senderAccNo": alice_acc, "receiverAccNo": bob_acc, "amount": "10.00",
                "transactionType": "TRANSFER", "category": "Gift", "status": false,
                "ownershipCheck": "none"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // payments are recorded without moving balances
    let (status, body) = server
        .post(
            "/transactions",
            Some(&alice),
            json!({
                "senderAccNo": alice_acc, "receiverAccNo": bob_acc, "amount": "5.50",
                "transactionType": "PAYMENT", "category": "Bills", "ownershipCheck": "none"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["transactionType"], "PAYMENT");

    let (_, body) = server.get(&format!("/accounts/{}", alice_acc), Some(&alice)).await;
    assert_eq!(dec(&body["data"]["balance"]), Decimal::new(190, 0));
    let (_, body) = server.get(&format!("/accounts/{}", bob_acc), Some(&bob)).await;
    assert_eq!(dec(&body["data"]["balance"]), Decimal::new(10, 0));

    let (status, body) = server.get("/transactions?limit=1", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["transactionType"], "PAYMENT");
}

#[tokio::test]
async fn test_auth_validation() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/auth/register",
            None,
            json!({"name": "X", "email": "not-an-email", "password": "short"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    server.customer("dup@example.com").await;
    let (status, body) = server
        .post(
            "/auth/register",
            None,
            json!({"name": "Dup Again", "email": "dup@example.com", "password": "password123"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1006);

    let (status, _) = server
        .post(
            "/auth/login",
            None,
            json!({"email": "dup@example.com", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unstorable_amounts_rejected_at_boundary() {
    let server = TestServer::start().await;
    let token = server.customer("huge@example.com").await;

    let (status, body) = server
        .post(
            "/accounts",
            Some(&token),
            json!({"initialBalance": "79228162514264337593543950335"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    let top = server.open_account(&token, "999999999999999999.99").await;
    let small = server.open_account(&token, "5.00").await;

    // a credit past the storage range fails cleanly and moves nothing
    let (status, body) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": small, "toAccountNo": top, "amount": "1.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 5002);
    let (_, body) = server.get(&format!("/accounts/{}", small), Some(&token)).await;
    assert_eq!(dec(&body["data"]["balance"]), Decimal::new(5, 0));

    // the store keeps serving
    let (status, _) = server.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server
        .post(
            "/accounts/transfer",
            Some(&token),
            json!({"fromAccountNo": top, "toAccountNo": small, "amount": "1.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_payee_management() {
    use reqwest::Method;

    let server = TestServer::start().await;
    let anita = server.customer("payer@example.com").await;
    let ravi = server.customer("payee@example.com").await;
    let ravi_acc = server.open_account(&ravi, "0").await;

    let (status, body) = server
        .post(
            "/payees/name",
            Some(&anita),
            json!({"payeeAccNo": ravi_acc, "payeeIfsc": "BANK0000001"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["customerName"], "Test Customer");

    // IFSC must match the account
    let (status, body) = server
        .post(
            "/payees",
            Some(&anita),
            json!({"name": "Ravi", "payeeAccNo": ravi_acc, "payeeIfsc": "OTHER000001"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    let add = json!({"name": "Ravi", "payeeAccNo": ravi_acc, "payeeIfsc": "BANK0000001"});
    let (status, body) = server.post("/payees", Some(&anita), add.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["payeeAccNo"], ravi_acc.as_str());
    assert_eq!(body["data"]["payeeType"], "INDIVIDUAL");

    let (status, body) = server.post("/payees", Some(&anita), add).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1007);

    let (status, body) = server
        .send(
            Method::PUT,
            &format!("/payees/{}", ravi_acc),
            &anita,
            Some(json!({"name": "Ravi (rent)", "payeeType": "BUSINESS"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["name"], "Ravi (rent)");

    // payees are private to the payer
    let (_, body) = server.get("/payees", Some(&ravi)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    let (status, body) = server
        .send(Method::DELETE, &format!("/payees/{}", ravi_acc), &ravi, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4004);

    let (_, body) = server.get("/payees", Some(&anita)).await;
    let payees = body["data"].as_array().unwrap();
    assert_eq!(payees.len(), 1);
    assert_eq!(payees[0]["payeeType"], "BUSINESS");

    let (status, _) = server
        .send(Method::DELETE, &format!("/payees/{}", ravi_acc), &anita, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = server.get("/payees", Some(&anita)).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = server.get("/payees", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
