//! Wolfram|Alpha client for the "n-th prime" lookup
//!
//! The only real side effect in the app. The reducer never sees a
//! `Result`: [`WolframAlphaClient::nth_prime_effect`] folds every failure
//! into `None`.

use crate::config::PrimeTimeConfig;
use reducer_kit_core::Effect;
use reqwest::Client;
use serde::Deserialize;

/// Errors from a single lookup
#[derive(Debug, thiserror::Error)]
pub enum NthPrimeError {
    /// Transport failure or non-success status
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body was not the expected JSON
    #[error("Response parsing failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// No pod is marked primary, or it has no subpods
    #[error("Response has no primary result")]
    NoPrimaryResult,

    /// The primary result is not an integer
    #[error("Primary result is not an integer: {0:?}")]
    NotAnInteger(String),
}

/// Top level of a v2 query response with `output=JSON`
#[derive(Debug, Clone, Deserialize)]
pub struct WolframAlphaResult {
    /// The single `queryresult` object
    pub queryresult: QueryResult,
}

/// Result pods
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    /// Absent when the query failed
    #[serde(default)]
    pub pods: Vec<Pod>,
}

/// One result pod
#[derive(Debug, Clone, Deserialize)]
pub struct Pod {
    /// Set on the pod that answers the query
    pub primary: Option<bool>,
    /// Pod contents
    #[serde(default)]
    pub subpods: Vec<SubPod>,
}

/// Plaintext content of a pod
#[derive(Debug, Clone, Deserialize)]
pub struct SubPod {
    /// Requested with `format=plaintext`
    pub plaintext: String,
}

impl WolframAlphaResult {
    /// Plaintext of the first subpod of the primary pod
    #[must_use]
    pub fn primary_plaintext(&self) -> Option<&str> {
        self.queryresult
            .pods
            .iter()
            .find(|pod| pod.primary == Some(true))?
            .subpods
            .first()
            .map(|subpod| subpod.plaintext.as_str())
    }

    /// The primary result as an integer
    ///
    /// # Errors
    ///
    /// Returns `NoPrimaryResult` or `NotAnInteger`.
    pub fn primary_integer(&self) -> Result<i64, NthPrimeError> {
        let text = self.primary_plaintext().ok_or(NthPrimeError::NoPrimaryResult)?;
        text.trim()
            .parse()
            .map_err(|_| NthPrimeError::NotAnInteger(text.to_string()))
    }
}

/// Wolfram|Alpha v2 query client
#[derive(Clone)]
pub struct WolframAlphaClient {
    client: Client,
    app_id: String,
    base_url: String,
}

impl WolframAlphaClient {
    /// Create a client from configuration
    #[must_use]
    pub fn new(config: &PrimeTimeConfig) -> Self {
        Self {
            client: Client::new(),
            app_id: config.app_id.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// Run a free-form query
    ///
    /// # Errors
    ///
    /// Returns `Request` for transport failures and error statuses, and
    /// `Decode` when the body is not a query result.
    pub async fn query(&self, input: &str) -> Result<WolframAlphaResult, NthPrimeError> {
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("input", input),
                ("format", "plaintext"),
                ("output", "JSON"),
                ("appid", self.app_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Look up the `n`-th prime
    ///
    /// # Errors
    ///
    /// Any [`NthPrimeError`].
    #[tracing::instrument(skip(self))]
    pub async fn nth_prime(&self, n: i64) -> Result<i64, NthPrimeError> {
        let result = self.query(&format!("prime {n}")).await?;
        let prime = result.primary_integer()?;
        tracing::debug!(prime, "Wolfram|Alpha answered");
        Ok(prime)
    }

    /// The lookup as an effect; failures become `None`
    #[must_use]
    pub fn nth_prime_effect(&self, n: i64) -> Effect<Option<i64>> {
        let client = self.clone();
        Effect::from_fallible(async move { client.nth_prime(n).await })
    }
}

impl std::fmt::Debug for WolframAlphaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WolframAlphaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
