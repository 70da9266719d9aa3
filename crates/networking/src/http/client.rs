//! Points backend HTTP client with bearer-token authentication

use crate::session::Session;
use jifeng_core::{
    ApiEnvelope, Error, ExchangeRecord, ExchangeRecordQuery, ExchangeRequest, LoginRequest,
    LoginResponse, NewProduct, PointsRecord, Product, ProductStatus, ProductUpdate, RecordFilter,
    Result, StatusUpdate, StockUpdate, TimeRange,
};
use reqwest::{header::ACCEPT, Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const JSON_UTF8: &str = "application/json;charset=UTF-8";
const EXPIRED_FALLBACK: &str = "登录已过期，请重新登录";

/// Connection settings for `PointsClient`
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    /// Applied to every request; there is no automatic retry
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// How a request authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// Attach the session credential; a 401 invalidates the session
    Bearer,
    /// Login itself: no credential, a 401 is a plain login failure
    Anonymous,
}

/// HTTP client for the points backend.
///
/// Every call reads the current credential from the shared `Session` and
/// unwraps the `{ code, message, data }` envelope. Authentication failures
/// invalidate the session before the error is returned.
pub struct PointsClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl PointsClient {
    pub fn new(options: &ClientOptions, session: Arc<Session>) -> Result<Self> {
        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(options.base_url.trim_end_matches('/')).map_err(|e| {
            Error::ConfigError(format!("Invalid base URL '{}': {}", options.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "Base URL '{}' cannot carry a path",
                options.base_url
            )));
        }

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Endpoint URL from path segments; each segment is percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        auth: Auth,
        what: &str,
    ) -> Result<Option<T>> {
        let mut request = request.header(ACCEPT, JSON_UTF8);
        if auth == Auth::Bearer {
            if let Some(token) = self.session.token().await {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await.map_err(|e| {
            error!("{} request failed: {}", what, e);
            Error::from(e)
        })?;

        let status = response.status();
        debug!("{} response status: {}", what, status);

        let body = response.text().await.map_err(|e| {
            error!("Failed to read {} response body: {}", what, e);
            Error::from(e)
        })?;
        let envelope = serde_json::from_str::<ApiEnvelope<T>>(&body);

        let rejected = status == StatusCode::UNAUTHORIZED
            || envelope.as_ref().map(|e| e.is_auth_failure()).unwrap_or(false);
        if rejected {
            let message = envelope
                .as_ref()
                .map(|e| e.message_or(EXPIRED_FALLBACK))
                .unwrap_or_else(|_| EXPIRED_FALLBACK.to_string());
            return Err(match auth {
                Auth::Bearer => {
                    self.session.invalidate(&message).await;
                    Error::TokenExpired(message)
                }
                Auth::Anonymous => Error::AuthenticationError(message),
            });
        }

        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                error!(
                    "Failed to parse {} response: {}. Body preview: {}",
                    what,
                    e,
                    body.chars().take(200).collect::<String>()
                );
                return Err(Error::InvalidData(e.to_string()));
            }
            Err(_) => {
                error!("{} failed with HTTP {}", what, status);
                return Err(Error::ApiError {
                    code: i32::from(status.as_u16()),
                    message: format!("HTTP error: {}", status.as_u16()),
                });
            }
        };

        if !status.is_success() || !envelope.is_success() {
            let message = envelope.message_or(&format!("HTTP error: {}", status.as_u16()));
            error!("{} rejected ({}): {}", what, envelope.code, message);
            return Err(Error::ApiError {
                code: envelope.code,
                message,
            });
        }

        Ok(envelope.data)
    }

    /// Like `send`, but the payload must be present
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        self.send(request, Auth::Bearer, what)
            .await?
            .ok_or_else(|| Error::InvalidData(format!("{} response carried no data", what)))
    }

    /// Like `send`, for calls whose payload is irrelevant
    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<()> {
        self.send::<serde_json::Value>(request, Auth::Bearer, what)
            .await
            .map(|_| ())
    }

    // ─── Auth ────────────────────────────────────────────────────────

    /// Exchange username/password for a credential.
    ///
    /// Does not touch the session; see `api::login` for that.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.http.post(self.url(&["api", "auth", "login"])).json(&body);

        let response: LoginResponse = self
            .send(request, Auth::Anonymous, "Login")
            .await?
            .ok_or_else(|| Error::InvalidData("Login response carried no data".to_string()))?;

        debug!("Login accepted for {}", response.user_info.username);
        Ok(response)
    }

    // ─── Points ──────────────────────────────────────────────────────

    #[instrument(skip(self))]
    pub async fn get_balance(&self) -> Result<u64> {
        let balance: u64 = self
            .fetch(self.http.get(self.url(&["api", "points", "balance"])), "Balance")
            .await?;
        debug!("Balance: {}", balance);
        Ok(balance)
    }

    #[instrument(skip(self))]
    pub async fn get_points_records(
        &self,
        filter: RecordFilter,
        range: TimeRange,
    ) -> Result<Vec<PointsRecord>> {
        let request = self
            .http
            .get(self.url(&["api", "points", "records"]))
            .query(&[("type", filter.as_query()), ("timeRange", range.as_query())]);

        let records: Vec<PointsRecord> = self.fetch(request, "Points records").await?;
        debug!("Fetched {} points records", records.len());
        Ok(records)
    }

    /// Ask the backend to text a one-time code. Returns the code only when
    /// the backend echoes it (development deployments).
    #[instrument(skip(self))]
    pub async fn send_sms_code(&self) -> Result<Option<String>> {
        let request = self.http.post(self.url(&["api", "points", "send-sms-code"]));
        let echoed: Option<String> = self.send(request, Auth::Bearer, "Send SMS code").await?;
        debug!("Verification code dispatched");
        Ok(echoed.filter(|c| !c.is_empty()))
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id, quantity = request.quantity))]
    pub async fn exchange(&self, request: &ExchangeRequest) -> Result<()> {
        let http_request = self
            .http
            .post(self.url(&["api", "points", "exchange"]))
            .json(request);
        self.execute(http_request, "Exchange").await?;
        debug!("Exchange accepted");
        Ok(())
    }

    // ─── Products ────────────────────────────────────────────────────

    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>> {
        let products: Vec<Product> = self
            .fetch(self.http.get(self.url(&["api", "products"])), "Products")
            .await?;
        debug!("Fetched {} products", products.len());
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Product> {
        let url = self.url(&["api", "products", id]);
        self.fetch(self.http.get(url), "Product").await
    }

    // ─── Admin ───────────────────────────────────────────────────────

    /// All products including offline ones
    #[instrument(skip(self))]
    pub async fn admin_list_products(&self) -> Result<Vec<Product>> {
        let products: Vec<Product> = self
            .fetch(
                self.http.get(self.url(&["api", "products", "admin", "all"])),
                "Admin products",
            )
            .await?;
        debug!("Fetched {} products (admin)", products.len());
        Ok(products)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn admin_create_product(&self, product: &NewProduct) -> Result<Product> {
        let request = self
            .http
            .post(self.url(&["api", "products", "admin"]))
            .json(product);
        self.fetch(request, "Create product").await
    }

    #[instrument(skip(self, update))]
    pub async fn admin_update_product(&self, id: &str, update: &ProductUpdate) -> Result<Product> {
        let request = self
            .http
            .put(self.url(&["api", "products", "admin", id]))
            .json(update);
        self.fetch(request, "Update product").await
    }

    #[instrument(skip(self))]
    pub async fn admin_update_stock(&self, id: &str, stock: u32) -> Result<Product> {
        let request = self
            .http
            .put(self.url(&["api", "products", "admin", id, "stock"]))
            .json(&StockUpdate { stock });
        self.fetch(request, "Update stock").await
    }

    #[instrument(skip(self))]
    pub async fn admin_update_status(&self, id: &str, status: ProductStatus) -> Result<Product> {
        let request = self
            .http
            .put(self.url(&["api", "products", "admin", id, "status"]))
            .json(&StatusUpdate { status });
        self.fetch(request, "Update status").await
    }

    #[instrument(skip(self))]
    pub async fn admin_exchange_records(
        &self,
        query: &ExchangeRecordQuery,
    ) -> Result<Vec<ExchangeRecord>> {
        let request = self
            .http
            .get(self.url(&["api", "points", "admin", "exchanges"]))
            .query(query);
        let records: Vec<ExchangeRecord> = self.fetch(request, "Exchange records").await?;
        debug!("Fetched {} exchange records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionEvent;
    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use jifeng_core::SessionScope;
    use jifeng_persistence::{CredentialStore, MemoryCredentialStore};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct ServerState {
        exchange_bodies: Arc<Mutex<Vec<Value>>>,
        sms_calls: Arc<Mutex<u32>>,
    }

    fn ok(data: Value) -> Json<Value> {
        Json(json!({ "code": 200, "message": "操作成功", "data": data, "timestamp": 1 }))
    }

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }

    async fn login(Json(body): Json<Value>) -> impl IntoResponse {
        if body["password"] == "secret" {
            ok(json!({
                "token": "tok-1",
                "refreshToken": "ref-1",
                "expiresIn": 3600,
                "userInfo": { "userId": "u-1", "username": body["username"], "nickname": "Alice" }
            }))
            .into_response()
        } else {
            (
                AxumStatus::UNAUTHORIZED,
                Json(json!({ "code": 401, "message": "用户名或密码错误", "data": null })),
            )
                .into_response()
        }
    }

    async fn balance(headers: HeaderMap) -> Json<Value> {
        match bearer(&headers).as_deref() {
            Some("tok-1") => ok(json!(100)),
            _ => Json(json!({ "code": 401, "message": "Token已过期", "data": null })),
        }
    }

    async fn send_code(State(state): State<ServerState>) -> Json<Value> {
        *state.sms_calls.lock().await += 1;
        ok(json!("654321"))
    }

    async fn exchange(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
        state.exchange_bodies.lock().await.push(body.clone());
        if body["verificationCode"] == "000000" {
            Json(json!({ "code": 500, "message": "验证码错误", "data": null }))
        } else {
            ok(Value::Null)
        }
    }

    async fn products() -> Json<Value> {
        ok(json!([
            { "id": 1, "name": "Coffee", "points": 30, "stock": 2,
              "monthlyLimit": 5, "usedThisMonth": 1, "description": "", "image": "" }
        ]))
    }

    async fn product(Path(id): Path<String>) -> Json<Value> {
        if id == "missing" {
            return Json(json!({ "code": 404, "message": "产品不存在", "data": null }));
        }
        ok(json!({ "id": id, "name": "Tea", "points": 10, "stock": 5,
                   "monthlyLimit": 2, "usedThisMonth": 0, "description": "", "image": "" }))
    }

    async fn broken() -> impl IntoResponse {
        (AxumStatus::BAD_GATEWAY, "upstream down")
    }

    async fn start_server() -> (String, ServerState) {
        let state = ServerState::default();
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/points/balance", get(balance))
            .route("/api/points/send-sms-code", post(send_code))
            .route("/api/points/exchange", post(exchange))
            .route("/api/products", get(products))
            .route("/api/products/{id}", get(product))
            .route("/api/products/admin/all", get(broken))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    fn client(base_url: String, store: Arc<MemoryCredentialStore>) -> PointsClient {
        let session = Arc::new(Session::new(SessionScope::Member, store));
        let options = ClientOptions {
            base_url,
            timeout: Duration::from_secs(5),
        };
        PointsClient::new(&options, session).unwrap()
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let (base_url, _) = start_server().await;
        let client = client(base_url, Arc::new(MemoryCredentialStore::new()));

        let login = client.login("alice", "secret").await.unwrap();
        assert_eq!(login.token, "tok-1");
        client
            .session()
            .set_credential(&login.token, Some(login.user_info))
            .await
            .unwrap();

        assert_eq!(client.get_balance().await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_bad_password_is_not_a_session_expiry() {
        let (base_url, _) = start_server().await;
        let client = client(base_url, Arc::new(MemoryCredentialStore::new()));
        let mut events = client.session().subscribe();

        let err = client.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationError(ref m) if m == "用户名或密码错误"));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_envelope_401_invalidates_session() {
        let (base_url, _) = start_server().await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client(base_url, store.clone());
        client.session().set_credential("stale", None).await.unwrap();
        let mut events = client.session().subscribe();

        let err = client.get_balance().await.unwrap_err();
        assert!(matches!(err, Error::TokenExpired(ref m) if m == "Token已过期"));
        assert_eq!(client.session().token().await, None);
        assert_eq!(store.get("token").await.unwrap(), None);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Invalidated { message: "Token已过期".into() }
        );

        // A second rejection while the first is unhandled is suppressed.
        assert!(client.get_balance().await.is_err());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_exchange_body_and_error_message() {
        let (base_url, state) = start_server().await;
        let client = client(base_url, Arc::new(MemoryCredentialStore::new()));

        let good = ExchangeRequest {
            product_id: "1".into(),
            quantity: 2,
            verification_code: "123456".into(),
        };
        client.exchange(&good).await.unwrap();

        let bad = ExchangeRequest {
            verification_code: "000000".into(),
            ..good
        };
        let err = client.exchange(&bad).await.unwrap_err();
        assert_eq!(err.server_message(), "验证码错误");

        let bodies = state.exchange_bodies.lock().await;
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0]["productId"], "1");
        assert_eq!(bodies[0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_sms_code_echo_and_products() {
        let (base_url, state) = start_server().await;
        let client = client(base_url, Arc::new(MemoryCredentialStore::new()));

        assert_eq!(client.send_sms_code().await.unwrap().as_deref(), Some("654321"));
        assert_eq!(*state.sms_calls.lock().await, 1);

        let products = client.get_products().await.unwrap();
        assert_eq!(products[0].id, "1");
        assert_eq!(products[0].remaining(), 4);
    }

    #[tokio::test]
    async fn test_non_json_error_body_maps_to_status() {
        let (base_url, _) = start_server().await;
        let client = client(base_url, Arc::new(MemoryCredentialStore::new()));

        let err = client.admin_list_products().await.unwrap_err();
        assert!(matches!(err, Error::ApiError { code: 502, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(format!("http://{}", addr), Arc::new(MemoryCredentialStore::new()));
        let err = client.get_products().await.unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_product_detail_by_id() {
        let (base_url, _) = start_server().await;
        let client = client(base_url, Arc::new(MemoryCredentialStore::new()));

        let product = client.get_product("7").await.unwrap();
        assert_eq!(product.id, "7");
        assert_eq!(product.name, "Tea");

        let err = client.get_product("missing").await.unwrap_err();
        assert_eq!(err.server_message(), "产品不存在");
    }

    #[tokio::test]
    async fn test_product_id_stays_one_path_segment() {
        let (base_url, _) = start_server().await;
        let client = client(base_url, Arc::new(MemoryCredentialStore::new()));

        // Without encoding these would hit /api/products/a or drop into the query
        let product = client.get_product("a/b?c#d").await.unwrap();
        assert_eq!(product.id, "a/b?c#d");
    }

    #[test]
    fn test_base_url_path_is_kept() {
        let session = Arc::new(Session::new(
            SessionScope::Member,
            Arc::new(MemoryCredentialStore::new()),
        ));
        let options = ClientOptions {
            base_url: "http://points.local/backend/".into(),
            timeout: Duration::from_secs(5),
        };
        let client = PointsClient::new(&options, session).unwrap();
        assert_eq!(
            client.url(&["api", "products", "x y"]).as_str(),
            "http://points.local/backend/api/products/x%20y"
        );
    }
}
