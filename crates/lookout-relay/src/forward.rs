// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload composition and throttled submission to the delivery sink.

use std::sync::Arc;
use std::time::Duration;

use lookout_core::types::{ClassifiedStatus, ForwardPayload, MessageId, StatusKind};
use lookout_core::{DeliverySink, LookoutError};
use thiserror::Error;
use tracing::{debug, info};

use crate::caption::CaptionBuilder;
use crate::media::MediaRetriever;

/// Which step of forwarding failed.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("media fetch failed: {0}")]
    Fetch(#[source] LookoutError),

    #[error("delivery failed: {0}")]
    Delivery(#[source] LookoutError),

    #[error("status kind {0} cannot be forwarded")]
    NotForwardable(StatusKind),
}

/// Turns classified statuses into sink submissions.
///
/// Every submission, successful or not, is followed by a fixed pause before
/// `forward` returns. A failed media fetch submits nothing and is not paused.
pub struct Forwarder {
    sink: Arc<dyn DeliverySink>,
    media: MediaRetriever,
    captions: CaptionBuilder,
    throttle: Duration,
}

impl Forwarder {
    pub fn new(
        sink: Arc<dyn DeliverySink>,
        media: MediaRetriever,
        captions: CaptionBuilder,
        throttle: Duration,
    ) -> Self {
        Self {
            sink,
            media,
            captions,
            throttle,
        }
    }

    pub async fn forward(&self, status: &ClassifiedStatus) -> Result<MessageId, ForwardError> {
        let payload = match (&status.kind, &status.media) {
            (StatusKind::Text, _) => ForwardPayload::Text {
                text: self.captions.text_message(status),
            },
            (_, Some(media)) => {
                info!(
                    phone = %status.sender_phone,
                    kind = %status.kind,
                    "downloading status media"
                );
                let attachment = self.media.fetch(media).await.map_err(ForwardError::Fetch)?;
                ForwardPayload::Media {
                    kind: media.kind,
                    caption: self.captions.media_caption(status),
                    attachment,
                }
            }
            (kind, None) => return Err(ForwardError::NotForwardable(*kind)),
        };

        let result = self.submit(payload).await;
        tokio::time::sleep(self.throttle).await;
        result
    }

    async fn submit(&self, payload: ForwardPayload) -> Result<MessageId, ForwardError> {
        let kind = payload.kind();
        let id = self
            .sink
            .deliver(payload)
            .await
            .map_err(ForwardError::Delivery)?;
        debug!(kind = %kind, message_id = %id.0, "sink accepted payload");
        Ok(id)
    }
}
