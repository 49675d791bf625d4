// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Silent media download through the transport.

use std::sync::Arc;

use lookout_core::types::{Attachment, MediaKind, MediaRef};
use lookout_core::{LookoutError, Transport};
use tracing::debug;

/// Downloads status media without acknowledging it to the sender.
#[derive(Clone)]
pub struct MediaRetriever {
    transport: Arc<dyn Transport>,
}

impl MediaRetriever {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetches the bytes behind `media` and names the attachment.
    ///
    /// An empty body counts as a failed download.
    pub async fn fetch(&self, media: &MediaRef) -> Result<Attachment, LookoutError> {
        let bytes = self.transport.fetch_media(media).await?;
        if bytes.is_empty() {
            return Err(LookoutError::Transport {
                message: format!("empty media body for message {}", media.key.id),
                source: None,
            });
        }
        debug!(id = %media.key.id, kind = %media.kind, bytes = bytes.len(), "media downloaded");
        Ok(Attachment {
            bytes,
            file_name: attachment_name(media),
        })
    }
}

/// `status.<ext>` for the kind; documents keep their own file name when
/// they carry one.
pub fn attachment_name(media: &MediaRef) -> String {
    if media.kind == MediaKind::Document
        && let Some(name) = media.message.file_name.as_deref()
    {
        let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
        if !base.is_empty() {
            return base.to_string();
        }
    }
    format!("status.{}", media.kind.extension())
}
