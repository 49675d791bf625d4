// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Transport`] over a WhatsApp Web bridge.
//!
//! The bridge pushes events over a WebSocket at `{url}/events` and exposes
//! media download, presence and receipts as plain HTTP endpoints. A reader
//! task owns the socket, decodes frames into batches and hands them to
//! [`Transport::next_batch`] through a bounded channel. When the socket drops
//! it emits a `connection.update close` with status 408 and re-dials after
//! the configured delay, resending the latest credentials it has seen.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use lookout_config::model::BridgeConfig;
use lookout_core::error::LookoutError;
use lookout_core::traits::{PluginAdapter, Transport};
use lookout_core::types::{
    AdapterType, ConnectionPhase, ConnectionUpdate, Credentials, DisconnectReason,
    HealthStatus, LastDisconnect, MediaRef, MessageKey, PresenceState, TransportEvent,
};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::protocol::{
    decode_frame, events_url, ClientFrame, MediaDownloadRequest, PresenceRequest,
    ReceiptsRequest,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const EVENT_CHANNEL_CAPACITY: usize = 64;
/// Bounds only connection setup; downloads of large media may take as long
/// as they need.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// WhatsApp Web bridge client implementing [`Transport`].
pub struct BridgeTransport {
    base_url: String,
    events_url: String,
    http: reqwest::Client,
    device_name: String,
    credentials: Option<Credentials>,
    reconnect_delay: Duration,
    events: Mutex<mpsc::Receiver<Vec<TransportEvent>>>,
    sender: Option<mpsc::Sender<Vec<TransportEvent>>>,
    cancel: CancellationToken,
}

impl BridgeTransport {
    /// Creates an unconnected transport.
    ///
    /// `credentials` is `None` when the device has never been paired.
    pub fn new(
        config: &BridgeConfig,
        device_name: &str,
        credentials: Option<Credentials>,
    ) -> Result<Self, LookoutError> {
        let base_url = config.url.trim_end_matches('/').to_string();
        let events_url = events_url(&base_url).ok_or_else(|| {
            LookoutError::Config(format!("bridge.url must be http(s), got `{}`", config.url))
        })?;
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LookoutError::Internal(format!("failed to build HTTP client: {e}")))?;
        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            base_url,
            events_url,
            http,
            device_name: device_name.to_string(),
            credentials,
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            events: Mutex::new(receiver),
            sender: Some(sender),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, LookoutError> {
        let url = self.endpoint(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LookoutError::Transport {
                message: format!("POST /{path} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LookoutError::Transport {
                message: format!("POST /{path} returned {status}: {detail}"),
                source: None,
            });
        }
        Ok(response)
    }
}

/// Opens the event socket and sends the `auth` frame.
async fn dial(
    url: &str,
    credentials: Option<&Credentials>,
    device_name: &str,
) -> Result<WsStream, LookoutError> {
    let (mut stream, _) = connect_async(url)
        .await
        .map_err(|e| LookoutError::Transport {
            message: format!("failed to connect to bridge at {url}: {e}"),
            source: Some(Box::new(e)),
        })?;

    let auth = ClientFrame::Auth {
        creds: credentials,
        device_name,
        mark_online_on_connect: false,
    };
    let frame = serde_json::to_string(&auth)
        .map_err(|e| LookoutError::Internal(format!("failed to encode auth frame: {e}")))?;
    stream
        .send(Message::text(frame))
        .await
        .map_err(|e| LookoutError::Transport {
            message: format!("failed to send auth frame: {e}"),
            source: Some(Box::new(e)),
        })?;

    debug!(url, paired = credentials.is_some(), "bridge event stream open");
    Ok(stream)
}

struct Reader {
    url: String,
    device_name: String,
    credentials: Option<Credentials>,
    reconnect_delay: Duration,
    sender: mpsc::Sender<Vec<TransportEvent>>,
    cancel: CancellationToken,
}

impl Reader {
    async fn run(mut self, mut stream: WsStream) {
        loop {
            if !self.pump(&mut stream).await {
                return;
            }
            if self.cancel.is_cancelled() {
                return;
            }

            warn!("bridge event stream lost");
            let lost = ConnectionUpdate {
                connection: Some(ConnectionPhase::Close),
                last_disconnect: Some(LastDisconnect {
                    status_code: DisconnectReason::ConnectionLost.status_code(),
                    message: Some("bridge event stream lost".to_string()),
                }),
                ..Default::default()
            };
            if self
                .sender
                .send(vec![TransportEvent::ConnectionUpdate(lost)])
                .await
                .is_err()
            {
                return;
            }

            match self.redial().await {
                Some(next) => stream = next,
                None => return,
            }
        }
    }

    /// Forwards frames until the socket ends. Returns `false` when the
    /// receiving side is gone or shutdown was requested.
    async fn pump(&mut self, stream: &mut WsStream) -> bool {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    let _ = stream.close(None).await;
                    return false;
                }
                frame = stream.next() => frame,
            };

            let text = match frame {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => return true,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!(error = %e, "bridge event stream error");
                    return true;
                }
            };

            let batch = match decode_frame(text.as_str()) {
                Ok(batch) if batch.is_empty() => continue,
                Ok(batch) => batch,
                Err(e) => {
                    warn!(error = %e, "undecodable bridge frame");
                    continue;
                }
            };

            for event in &batch {
                if let TransportEvent::CredsUpdate(credentials) = event {
                    self.credentials = Some(credentials.clone());
                }
            }
            if self.sender.send(batch).await.is_err() {
                return false;
            }
        }
    }

    async fn redial(&self) -> Option<WsStream> {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
            match dial(&self.url, self.credentials.as_ref(), &self.device_name).await {
                Ok(stream) => {
                    info!("bridge event stream re-established");
                    return Some(stream);
                }
                Err(e) => warn!(
                    error = %e,
                    retry_in = ?self.reconnect_delay,
                    "bridge reconnect failed"
                ),
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for BridgeTransport {
    fn name(&self) -> &str {
        "whatsapp-bridge"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, LookoutError> {
        let url = self.endpoint("health");
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Unhealthy(format!(
                "bridge health returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("bridge unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), LookoutError> {
        debug!("bridge transport shutting down");
        self.cancel.cancel();
        Ok(())
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    async fn connect(&mut self) -> Result<(), LookoutError> {
        let Some(sender) = self.sender.take() else {
            return Ok(());
        };
        let stream = dial(
            &self.events_url,
            self.credentials.as_ref(),
            &self.device_name,
        )
        .await?;

        let reader = Reader {
            url: self.events_url.clone(),
            device_name: self.device_name.clone(),
            credentials: self.credentials.clone(),
            reconnect_delay: self.reconnect_delay,
            sender,
            cancel: self.cancel.clone(),
        };
        tokio::spawn(reader.run(stream));
        info!(url = %self.events_url, "connected to WhatsApp bridge");
        Ok(())
    }

    async fn next_batch(&self) -> Result<Vec<TransportEvent>, LookoutError> {
        self.events
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| LookoutError::Transport {
                message: "bridge event stream closed".to_string(),
                source: None,
            })
    }

    async fn fetch_media(&self, media: &MediaRef) -> Result<Vec<u8>, LookoutError> {
        let body = MediaDownloadRequest::new(media)
            .map_err(|e| LookoutError::Internal(format!("failed to encode media request: {e}")))?;
        let response = self.post("media/download", &body).await?;
        let bytes = response.bytes().await.map_err(|e| LookoutError::Transport {
            message: format!("media download interrupted: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(id = %media.key.id, size = bytes.len(), "media downloaded");
        Ok(bytes.to_vec())
    }

    async fn send_presence(&self, state: PresenceState) -> Result<(), LookoutError> {
        self.post("presence", &PresenceRequest { state }).await?;
        Ok(())
    }

    async fn send_read_receipt(&self, keys: &[MessageKey]) -> Result<(), LookoutError> {
        self.post("receipts", &ReceiptsRequest { keys }).await?;
        Ok(())
    }
}

impl Drop for BridgeTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
