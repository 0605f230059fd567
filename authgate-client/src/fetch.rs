/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! HTTP helper that attaches `Authorization: Bearer <id token>` to requests.

use authgate_types::responses::APIResponse;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response};

use crate::error::FetchError;
use crate::provider::Identity;

/// Build an [`AuthenticatedClient`] for `identity`.
///
/// With no identity, requests go out exactly as the caller built them.
pub fn fetch_with_auth(identity: Option<Identity>) -> AuthenticatedClient {
    AuthenticatedClient::new(Client::new(), identity)
}

/// Request executor bound to an (optional) signed-in identity.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    http: Client,
    identity: Option<Identity>,
}

impl AuthenticatedClient {
    pub fn new(http: Client, identity: Option<Identity>) -> Self {
        Self { http, identity }
    }

    /// The underlying client, for building requests to pass to [`Self::execute`].
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Stamp `request` with the identity's current token, replacing any
    /// `Authorization` header the caller set. The token lookup may refresh
    /// it; a failure there is returned as-is.
    pub async fn authorize(&self, mut request: Request) -> Result<Request, FetchError> {
        let Some(identity) = &self.identity else {
            return Ok(request);
        };

        let token = identity.id_token().await?;
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| FetchError::InvalidToken)?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(request)
    }

    pub async fn execute(&self, request: Request) -> Result<Response, FetchError> {
        let request = self.authorize(request).await?;
        Ok(self.http.execute(request).await?)
    }

    pub async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let request = self.http.get(url).build()?;
        self.execute(request).await
    }

    /// Execute `request` and unwrap the `APIResponse<T>` envelope.
    pub async fn fetch_json<T>(&self, request: Request) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let response = self.execute(request).await?;
        let status = response.status().as_u16();
        match status {
            200..=299 => {
                let wrapper: APIResponse<T> = response.json().await?;
                Ok(wrapper.result)
            }
            401 => Err(FetchError::NotAuthenticated),
            403 => {
                let text = response.text().await.unwrap_or_default();
                Err(FetchError::Forbidden(text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(FetchError::ServerError { status, body: text })
            }
        }
    }
}
