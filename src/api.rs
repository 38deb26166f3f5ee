// API client module: a small blocking HTTP client for the APOS REST
// service. Every call returns `ApiResult`; nothing here prints or exits,
// the controller decides what a failure means for the process.

use crate::config::Session;
use crate::model::{GroupOrder, Item, NewItem, NewOrder, OrderId};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything that can go wrong talking to the service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please login before any other command!")]
    Unauthenticated,
    #[error("Login not successful (http {status})")]
    AuthFailure { status: u16 },
    #[error("Request not successful (http {status})")]
    Request { status: u16, body: String },
    #[error("could not reach the APOS service")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from the APOS service")]
    Decode(#[from] serde_json::Error),
    #[error("stored token is not a valid header value, please login again")]
    InvalidToken,
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthFailure { status } | ApiError::Request { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Outcome of probing the service with the stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected(u16),
    AuthRejected(u16),
    ServiceError(u16),
}

/// The remote operations the controller depends on.
pub trait OrderService {
    /// Exchange credentials for a bearer token. On success the token is also
    /// used for subsequent calls on this service.
    fn authenticate(&mut self, username: &str, password: &str) -> ApiResult<String>;
    fn list_active_orders(&self) -> ApiResult<Vec<GroupOrder>>;
    fn list_user_groups(&self) -> ApiResult<Vec<GroupOrder>>;
    fn list_user_items(&self) -> ApiResult<Vec<Item>>;
    /// Returns the id of the new order when the service reports one.
    fn create_order(&self, order: &NewOrder) -> ApiResult<Option<OrderId>>;
    fn create_item(&self, order_id: OrderId, item: &NewItem) -> ApiResult<()>;
    fn check_connection(&self) -> ApiResult<ConnectionStatus>;
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Deserialize)]
struct CreatedOrder {
    #[serde(alias = "order_id")]
    id: Option<OrderId>,
}

/// Blocking client holding the reqwest client, the base URL of the service
/// and the bearer token, if any.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("apos-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Use a preconfigured reqwest client (proxies, timeouts, TLS).
    pub fn with_client(client: Client, base_url: &str, token: Option<String>) -> Self {
        ApiClient {
            client,
            base_url: normalize_base_url(base_url),
            token,
        }
    }

    pub fn from_session(session: &Session) -> ApiResult<Self> {
        Self::new(&session.base_url, session.token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    /// Precondition for every authenticated call.
    pub fn require_token(&self) -> ApiResult<&str> {
        self.token.as_deref().ok_or(ApiError::Unauthenticated)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> ApiResult<HeaderMap> {
        let token = self.require_token()?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidToken)?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn get(&self, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.url(path);
        let headers = self.auth_headers()?;
        tracing::debug!(%url, "GET");
        Ok(self.client.get(url).headers(headers))
    }

    fn put(&self, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.url(path);
        let headers = self.auth_headers()?;
        tracing::debug!(%url, "PUT");
        Ok(self.client.put(url).headers(headers))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let res = expect_success(self.get(path)?.send()?)?;
        decode(res)
    }
}

impl OrderService for ApiClient {
    fn authenticate(&mut self, username: &str, password: &str) -> ApiResult<String> {
        let url = self.url("auth");
        tracing::debug!(%url, username, "POST");
        let res = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::info!(status, "login rejected");
            return Err(ApiError::AuthFailure { status });
        }
        let auth: AuthResponse = decode(res)?;
        self.set_token(&auth.token);
        Ok(auth.token)
    }

    fn list_active_orders(&self) -> ApiResult<Vec<GroupOrder>> {
        self.get_json("orders/active")
    }

    fn list_user_groups(&self) -> ApiResult<Vec<GroupOrder>> {
        self.get_json("orders")
    }

    fn list_user_items(&self) -> ApiResult<Vec<Item>> {
        self.get_json("items")
    }

    fn create_order(&self, order: &NewOrder) -> ApiResult<Option<OrderId>> {
        let res = expect_success(self.put("orders")?.json(order).send()?)?;
        let body = res.text()?;
        // Older service versions answer with an empty body.
        let created = serde_json::from_str::<CreatedOrder>(&body)
            .ok()
            .and_then(|c| c.id);
        Ok(created)
    }

    fn create_item(&self, order_id: OrderId, item: &NewItem) -> ApiResult<()> {
        let path = format!("orders/{}/items", order_id);
        expect_success(self.put(&path)?.json(item).send()?)?;
        Ok(())
    }

    fn check_connection(&self) -> ApiResult<ConnectionStatus> {
        let res = self.get("orders")?.send()?;
        let status = res.status();
        Ok(match status.as_u16() {
            code if status.is_success() => ConnectionStatus::Connected(code),
            code @ (401 | 403) => ConnectionStatus::AuthRejected(code),
            code => ConnectionStatus::ServiceError(code),
        })
    }
}

fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim().trim_end_matches('/'))
}

/// Turns a non-2xx response into `ApiError::Request`, keeping the body for
/// diagnostics.
fn expect_success(res: Response) -> ApiResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    tracing::debug!(status = status.as_u16(), %body, "request failed");
    Err(ApiError::Request {
        status: status.as_u16(),
        body,
    })
}

fn decode<T: DeserializeOwned>(res: Response) -> ApiResult<T> {
    let body = res.text()?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 9 (discard) on loopback: nothing should ever be sent there.
    const UNREACHABLE: &str = "http://127.0.0.1:9/api/v1/";

    #[test]
    fn base_url_always_ends_with_one_slash() {
        assert_eq!(normalize_base_url("http://h/api/v1"), "http://h/api/v1/");
        assert_eq!(normalize_base_url("http://h/api/v1//"), "http://h/api/v1/");
        let client = ApiClient::new("http://h/api/v1/", None).unwrap();
        assert_eq!(client.url("orders/active"), "http://h/api/v1/orders/active");
    }

    #[test]
    fn every_authenticated_call_requires_a_token() {
        let client = ApiClient::new(UNREACHABLE, None).unwrap();
        let item = NewItem {
            name: "Margherita".into(),
            tip_percent: 10.0,
            price: 8.5,
        };
        let order = NewOrder {
            title: "t".into(),
            description: String::new(),
            deadline: chrono::Utc::now(),
            location: String::new(),
            deliverer: String::new(),
        };

        assert!(matches!(client.require_token(), Err(ApiError::Unauthenticated)));
        assert!(matches!(client.list_active_orders(), Err(ApiError::Unauthenticated)));
        assert!(matches!(client.list_user_groups(), Err(ApiError::Unauthenticated)));
        assert!(matches!(client.list_user_items(), Err(ApiError::Unauthenticated)));
        assert!(matches!(client.create_order(&order), Err(ApiError::Unauthenticated)));
        assert!(matches!(client.create_item(1, &item), Err(ApiError::Unauthenticated)));
        assert!(matches!(client.check_connection(), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn token_with_newline_is_rejected_before_sending() {
        let client = ApiClient::new(UNREACHABLE, Some("bad\ntoken".into())).unwrap();
        assert!(matches!(client.list_active_orders(), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn status_is_exposed_on_http_errors() {
        assert_eq!(ApiError::AuthFailure { status: 401 }.status(), Some(401));
        let err = ApiError::Request {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "Request not successful (http 500)");
        assert_eq!(ApiError::Unauthenticated.status(), None);
    }
}
