// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Screenshots of the viewer.
//!
//! [`Snapshot::take`] sends a request and returns a [`Photo`] that develops
//! when the viewer answers with image data for the same file name.

mod photo;

pub use photo::{Photo, PhotoData};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};
use virtualdisplay_proto::Message;

use crate::error::{Result, VirtualdisplayError};
use crate::events::{DomainEvent, EventBus, EventName, Listener};

/// Accepted image extensions, compared case-insensitively.
pub const VALID_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

type Pending = RefCell<HashMap<String, Rc<Photo>>>;

/// Snapshot API.
#[derive(Debug)]
pub struct Snapshot {
    bus: EventBus,
    pending: Rc<Pending>,
}

impl Snapshot {
    /// Snapshot API on `bus`; develops photos from inbound snapshot messages.
    pub fn new(bus: &EventBus) -> Self {
        let pending: Rc<Pending> = Rc::default();
        let weak: Weak<Pending> = Rc::downgrade(&pending);
        let _: Listener = bus.subscribe(EventName::MessageReceived, move |event| {
            let DomainEvent::MessageReceived(Message::Snapshot {
                filename,
                data: Some(data),
            }) = event
            else {
                return;
            };
            if let Some(pending) = weak.upgrade() {
                develop(&pending, filename, data);
            }
        });
        Self {
            bus: bus.clone(),
            pending,
        }
    }

    /// Request a snapshot saved as `filename`.
    ///
    /// A later request for the same file name replaces the pending photo.
    ///
    /// # Errors
    /// [`VirtualdisplayError::InvalidParameter`] for an empty name, an
    /// unsupported extension, or a name containing `..`, `/` or `\`.
    pub fn take(&self, filename: &str) -> Result<Rc<Photo>> {
        validate_filename(filename)?;
        debug!(filename, "taking snapshot");
        let photo = Rc::new(Photo::new(filename));
        self.pending
            .borrow_mut()
            .insert(filename.to_owned(), Rc::clone(&photo));
        self.bus.emit(&DomainEvent::SnapshotMessage(Message::Snapshot {
            filename: filename.to_owned(),
            data: None,
        }));
        Ok(photo)
    }

    /// Photos waiting for data.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

fn develop(pending: &Pending, filename: &str, data: &str) {
    let photo = pending.borrow_mut().remove(filename);
    match photo {
        Some(photo) => {
            debug!(filename, bytes = data.len(), "developing photo");
            photo.develop(PhotoData {
                filename: filename.to_owned(),
                data: data.to_owned(),
            });
        }
        None => warn!(filename, "no pending photo for snapshot"),
    }
}

/// Check a snapshot file name.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(VirtualdisplayError::invalid_parameter(
            "Filename must be a non-empty string",
        ));
    }
    let lower = filename.to_lowercase();
    if !VALID_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Err(VirtualdisplayError::invalid_parameter(format!(
            "Invalid filename: \"{filename}\". Filename must end with one of: {}",
            VALID_EXTENSIONS.join(", ")
        )));
    }
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(VirtualdisplayError::invalid_parameter(
            "Filename cannot contain path separators or \"..\"",
        ));
    }
    Ok(())
}
