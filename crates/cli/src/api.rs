//! HTTP client for the storefront JSON API.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use url::Url;

use atelier_core::account::{LoginResponse, RegisteredUser, UserProfile};
use atelier_core::catalog::{CategorySummary, Product};
use atelier_core::order::{Order, OrderDraft};
use atelier_core::query::{ProductPage, ProductQuery};

/// Errors talking to the storefront.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The storefront rejected the token or none was sent.
    #[error("not logged in: {0}")]
    Unauthenticated(String),

    /// Any other non-success response.
    #[error("storefront returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// JSON error body returned by the storefront.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Product page with related products.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub related_products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct CategoryList {
    categories: Vec<CategorySummary>,
}

#[derive(Debug, Deserialize)]
struct OrderList {
    orders: Vec<Order>,
}

/// Storefront API client.
///
/// Cheap to clone; holds the base URL and, once logged in, the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
    token: Option<SecretString>,
}

impl ApiClient {
    /// Client for the storefront at `base` (e.g. `http://127.0.0.1:3000`).
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            token: None,
        }
    }

    /// Attach a bearer token to every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    /// `path` followed by one percent-encoded segment.
    fn resource(&self, path: &str, segment: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// One page of the product listing.
    ///
    /// The query is sent as-is; call [`ProductQuery::validate`] first to
    /// catch bad pagination without a round trip.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with status 400 for invalid pagination.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let params = query.to_params();
        let mut url = self.endpoint("api/products")?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in [
                ("page", &params.page),
                ("limit", &params.limit),
                ("tags", &params.tags),
                ("categories", &params.categories),
                ("sort", &params.sort),
                ("search", &params.search),
            ] {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        decode(self.client.get(url).send().await?).await
    }

    /// Product detail by slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with status 404 for an unknown slug.
    pub async fn product(&self, slug: &str) -> Result<ProductDetail, ApiError> {
        let url = self.resource("api/products/", slug)?;
        decode(self.client.get(url).send().await?).await
    }

    /// Every category with its product count.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn categories(&self) -> Result<Vec<CategorySummary>, ApiError> {
        let url = self.endpoint("api/categories")?;
        let list: CategoryList = decode(self.client.get(url).send().await?).await?;
        Ok(list.categories)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with status 400 for invalid or taken details.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<RegisteredUser, ApiError> {
        let url = self.endpoint("api/auth/register")?;
        let body = json!({
            "name": name,
            "email": email,
            "password": password.expose_secret(),
        });
        decode(self.client.post(url).json(&body).send().await?).await
    }

    /// Log in. The returned token is not attached to this client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` for wrong credentials.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("api/auth/login")?;
        let body = json!({ "email": email, "password": password.expose_secret() });
        decode(self.client.post(url).json(&body).send().await?).await
    }

    /// Invalidate the current token on the server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint("api/auth/logout")?;
        let _: serde_json::Value =
            decode(self.authorized(self.client.post(url)).send().await?).await?;
        Ok(())
    }

    /// The logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a valid token.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let url = self.endpoint("api/auth/me")?;
        decode(self.authorized(self.client.get(url)).send().await?).await
    }

    /// Submit an order draft.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a valid token and
    /// `ApiError::Status` if the draft is rejected or cannot be stored.
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        let url = self.endpoint("api/orders")?;
        decode(
            self.authorized(self.client.post(url))
                .json(draft)
                .send()
                .await?,
        )
        .await
    }

    /// The logged-in user's orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a valid token.
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("api/orders")?;
        let list: OrderList = decode(self.authorized(self.client.get(url)).send().await?).await?;
        Ok(list.orders)
    }
}

/// Decode a success body, or turn an error body into `ApiError`.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned(),
    };

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthenticated(message));
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoints_resolve_against_origin() {
        let api = client("http://127.0.0.1:3000");
        assert_eq!(
            api.endpoint("api/products").unwrap().as_str(),
            "http://127.0.0.1:3000/api/products"
        );
    }

    #[test]
    fn test_slugs_are_encoded_as_one_segment() {
        let api = client("http://shop.test/");
        let url = api.resource("api/products/", "silk scarf/red").unwrap();
        assert_eq!(url.as_str(), "http://shop.test/api/products/silk%20scarf%2Fred");
    }
}
