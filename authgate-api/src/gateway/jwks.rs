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

//! JWKS (JSON Web Key Set) cache with rate-limited refresh.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use super::GatewayError;

/// Minimum interval between JWKS refreshes (5 minutes).
pub const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Minimum interval between attempts after a failed fetch.
pub const JWKS_FAILURE_BACKOFF: Duration = Duration::from_secs(30);

/// A JWK entry from the JWKS endpoint.
#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    alg: Option<String>,
    // RSA fields
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    // EC fields
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkEntry>,
}

/// Decoding keys by `kid`.
pub type KeyMap = HashMap<String, (Algorithm, DecodingKey)>;

/// Caches the identity provider's signing keys by `kid`. Shared by every
/// in-flight verification.
pub struct JwksCache {
    keys: RwLock<KeyMap>,
    jwks_url: String,
    http: reqwest::Client,
    /// Held for the whole fetch so concurrent misses share one request.
    /// `None` until the first attempt.
    last_attempt: Mutex<Option<RefreshAttempt>>,
}

/// Outcome of the most recent fetch, successful or not.
#[derive(Debug, Clone)]
struct RefreshAttempt {
    at: Instant,
    error: Option<GatewayError>,
}

impl RefreshAttempt {
    fn is_fresh(&self) -> bool {
        let window = match self.error {
            None => JWKS_REFRESH_INTERVAL,
            Some(_) => JWKS_FAILURE_BACKOFF,
        };
        self.at.elapsed() < window
    }
}

impl JwksCache {
    pub fn new(jwks_url: String) -> Arc<Self> {
        Arc::new(Self {
            keys: RwLock::new(HashMap::new()),
            jwks_url,
            http: reqwest::Client::new(),
            last_attempt: Mutex::new(None),
        })
    }

    /// A cache pre-loaded with `keys` that never fetches.
    pub fn with_keys(keys: KeyMap) -> Arc<Self> {
        Arc::new(Self {
            keys: RwLock::new(keys),
            jwks_url: String::new(),
            http: reqwest::Client::new(),
            last_attempt: Mutex::new(Some(RefreshAttempt {
                at: Instant::now(),
                error: None,
            })),
        })
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Get the decoding key for a given `kid`. Refreshes the cache if the key
    /// is not found (rate-limited to once per [`JWKS_REFRESH_INTERVAL`], or
    /// [`JWKS_FAILURE_BACKOFF`] after a failed fetch).
    pub async fn get_key(&self, kid: &str) -> Result<(Algorithm, DecodingKey), GatewayError> {
        if let Some(found) = self.cached(kid).await {
            return Ok(found);
        }

        self.refresh(kid).await?;

        self.cached(kid)
            .await
            .ok_or_else(|| GatewayError::InvalidToken(format!("no signing key for kid {kid}")))
    }

    async fn cached(&self, kid: &str) -> Option<(Algorithm, DecodingKey)> {
        let keys = self.keys.read().await;
        keys.get(kid).map(|(alg, key)| (*alg, key.clone()))
    }

    /// Fetch the JWKS document and replace the cache, unless another caller
    /// already did so for `kid` or the last attempt is still fresh. A recent
    /// failed attempt is reported again instead of retried.
    async fn refresh(&self, kid: &str) -> Result<(), GatewayError> {
        if self.jwks_url.is_empty() {
            return Ok(());
        }

        let mut last_attempt = self.last_attempt.lock().await;
        if self.cached(kid).await.is_some() {
            return Ok(());
        }
        if let Some(attempt) = last_attempt.as_ref().filter(|a| a.is_fresh()) {
            return match &attempt.error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            };
        }

        let result = self.fetch().await;
        *last_attempt = Some(RefreshAttempt {
            at: Instant::now(),
            error: result.as_ref().err().cloned(),
        });

        let new_keys = result?;
        tracing::info!("Loaded {} JWKS signing keys", new_keys.len());
        *self.keys.write().await = new_keys;
        Ok(())
    }

    async fn fetch(&self) -> Result<KeyMap, GatewayError> {
        tracing::debug!("Refreshing JWKS from {}", self.jwks_url);

        let resp = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("JWKS fetch failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(GatewayError::Unavailable(format!(
                "JWKS fetch returned HTTP {status}"
            )));
        }

        let doc: JwksDocument = resp
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("Failed to parse JWKS: {e}")))?;

        Ok(decode_keys(&doc))
    }
}

/// Usable keys from a JWKS document. Entries without a `kid`, with an
/// unsupported `kty`, or with malformed components are skipped.
fn decode_keys(doc: &JwksDocument) -> KeyMap {
    let mut keys = HashMap::new();
    for jwk in &doc.keys {
        let Some(kid) = &jwk.kid else {
            continue;
        };

        let decoded = match jwk.kty.as_str() {
            "RSA" => match (jwk.n.as_deref(), jwk.e.as_deref()) {
                (Some(n), Some(e)) if !n.is_empty() && !e.is_empty() => {
                    DecodingKey::from_rsa_components(n, e)
                }
                _ => continue,
            },
            "EC" => match (jwk.x.as_deref(), jwk.y.as_deref()) {
                (Some(x), Some(y)) if !x.is_empty() && !y.is_empty() => {
                    DecodingKey::from_ec_components(x, y)
                }
                _ => continue,
            },
            _ => continue,
        };

        match decoded {
            Ok(key) => {
                keys.insert(kid.clone(), (jwk_algorithm(jwk), key));
            }
            Err(e) => tracing::warn!("Skipping invalid {} JWK {kid}: {e}", jwk.kty),
        }
    }
    keys
}

/// Determine the JWT algorithm for a JWK entry.
fn jwk_algorithm(jwk: &JwkEntry) -> Algorithm {
    if let Some(alg) = &jwk.alg {
        match alg.as_str() {
            "RS384" => return Algorithm::RS384,
            "RS512" => return Algorithm::RS512,
            "ES256" => return Algorithm::ES256,
            "ES384" => return Algorithm::ES384,
            "RS256" => return Algorithm::RS256,
            _ if jwk.kty == "RSA" => return Algorithm::RS256,
            _ => {}
        }
    }
    match jwk.kty.as_str() {
        "EC" => match jwk.crv.as_deref() {
            Some("P-384") => Algorithm::ES384,
            _ => Algorithm::ES256,
        },
        _ => Algorithm::RS256,
    }
}
