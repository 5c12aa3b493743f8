// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Transport carrying wire messages to the pod manager.
//!
//! Every call is one blocking round trip with no implicit retries. The
//! transport timeout, when it fires, surfaces as [`TransportError::Timeout`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use super::wire::{
    decode_message, encode_message, CreatePodRequest, ManagerRequest, ManagerResponse, WireError,
    MAX_MESSAGE_SIZE,
};
use crate::config::ModuleConfig;
use crate::error::Unreachable;
use crate::k8s::ManagerEndpoint;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<WireError> for TransportError {
    fn from(err: WireError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<TransportError> for Unreachable {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(reason) => Unreachable::Connect(reason),
            TransportError::Timeout(after) => Unreachable::Timeout(after),
            TransportError::Protocol(reason) => Unreachable::Protocol(reason),
        }
    }
}

#[async_trait]
pub trait ManagerTransport: Send + Sync {
    /// Ask the manager to run a worker pod for `module`. An already running
    /// pod is success.
    async fn ensure_pod(
        &self,
        endpoint: &ManagerEndpoint,
        module: &str,
        config: &ModuleConfig,
    ) -> Result<(), TransportError>;

    /// Send one request and wait for its response.
    async fn send(
        &self,
        endpoint: &ManagerEndpoint,
        request: &ManagerRequest,
    ) -> Result<ManagerResponse, TransportError>;
}

/// HTTP transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpManagerTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpManagerTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Connect(err.to_string())
        }
    }

    async fn post(&self, url: String, body: Vec<u8>) -> Result<(StatusCode, Vec<u8>), TransportError> {
        let mut response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if let Some(len) = response.content_length() {
            if len > MAX_MESSAGE_SIZE as u64 {
                return Err(too_large(len));
            }
        }

        // Chunked bodies carry no length up front; stop once over the limit.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if bytes.len() + chunk.len() > MAX_MESSAGE_SIZE {
                return Err(too_large((bytes.len() + chunk.len()) as u64));
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!(%url, %status, len = bytes.len(), "Manager responded");
        Ok((status, bytes))
    }
}

fn too_large(len: u64) -> TransportError {
    TransportError::Protocol(format!(
        "response too large: at least {} bytes (max {})",
        len, MAX_MESSAGE_SIZE
    ))
}

#[async_trait]
impl ManagerTransport for HttpManagerTransport {
    async fn ensure_pod(
        &self,
        endpoint: &ManagerEndpoint,
        module: &str,
        config: &ModuleConfig,
    ) -> Result<(), TransportError> {
        let url = format!("{}/create_pod/{}", endpoint.url(), module);
        let body = encode_message(&CreatePodRequest { module_name: module, module_config: config })?;
        let (status, bytes) = self.post(url, body).await?;

        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(());
        }
        Err(TransportError::Protocol(format!(
            "create_pod for '{}' returned HTTP {}: {}",
            module,
            status,
            String::from_utf8_lossy(&bytes)
        )))
    }

    async fn send(
        &self,
        endpoint: &ManagerEndpoint,
        request: &ManagerRequest,
    ) -> Result<ManagerResponse, TransportError> {
        let url = format!("{}/run_module", endpoint.url());
        let body = encode_message(request)?;
        let (status, bytes) = self.post(url, body).await?;

        match decode_message::<ManagerResponse>(&bytes) {
            Ok(response) if status.is_success() || !response.success => Ok(response),
            Ok(_) => Err(TransportError::Protocol(format!(
                "HTTP {} with a success response",
                status
            ))),
            Err(_) if !status.is_success() => Err(TransportError::Protocol(format!(
                "HTTP {}: {}",
                status,
                String::from_utf8_lossy(&bytes)
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
