// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory contact directory fed by `contacts.update` events.

use std::collections::HashMap;

use lookout_core::types::{ContactUpdate, Jid};
use tracing::debug;

/// Maps sender addresses to display names.
///
/// Entries are keyed by the address without its device suffix, so a lookup
/// by `15551234567:3@s.whatsapp.net` finds the entry stored for
/// `15551234567@s.whatsapp.net`. Entries are only ever overwritten.
#[derive(Debug, Default)]
pub struct ContactDirectory {
    names: HashMap<Jid, String>,
}

impl ContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a batch of updates in order; later entries win.
    ///
    /// An entry without any non-empty name candidate leaves the stored
    /// name untouched.
    pub fn update(&mut self, batch: &[ContactUpdate]) {
        for contact in batch {
            let Some(name) = first_non_empty([
                contact.notify.as_deref(),
                contact.verified_name.as_deref(),
                contact.name.as_deref(),
            ]) else {
                continue;
            };
            debug!(phone = %contact.id.phone(), name, "contact updated");
            self.names
                .insert(contact.id.without_device(), name.to_string());
        }
    }

    pub fn lookup(&self, jid: &Jid) -> Option<&str> {
        self.names.get(&jid.without_device()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn first_non_empty<'a>(candidates: [Option<&'a str>; 3]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
}
