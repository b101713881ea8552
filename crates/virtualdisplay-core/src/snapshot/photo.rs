// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A requested snapshot and its result.

use std::cell::RefCell;

/// Developed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoData {
    /// Requested file name.
    pub filename: String,
    /// Encoded image as sent by the viewer.
    pub data: String,
}

type DevelopedCallback = Box<dyn FnOnce(&PhotoData)>;

/// Pending or developed snapshot.
pub struct Photo {
    filename: String,
    data: RefCell<Option<PhotoData>>,
    callbacks: RefCell<Vec<DevelopedCallback>>,
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("filename", &self.filename)
            .field("developed", &self.is_developed())
            .field("callbacks", &self.callbacks.borrow().len())
            .finish()
    }
}

impl Photo {
    /// Photo awaiting data for `filename`.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            data: RefCell::new(None),
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Run `callback` once the photo develops; immediately if it already has.
    pub fn on_developed(&self, callback: impl FnOnce(&PhotoData) + 'static) -> &Self {
        let developed = self.data.borrow().clone();
        match developed {
            Some(data) => callback(&data),
            None => self.callbacks.borrow_mut().push(Box::new(callback)),
        }
        self
    }

    /// Requested file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Image data, once developed.
    pub fn data(&self) -> Option<PhotoData> {
        self.data.borrow().clone()
    }

    /// Whether data has arrived.
    pub fn is_developed(&self) -> bool {
        self.data.borrow().is_some()
    }

    /// Store `data` and run the waiting callbacks. Later calls are ignored.
    pub fn develop(&self, data: PhotoData) {
        if self.is_developed() {
            return;
        }
        *self.data.borrow_mut() = Some(data.clone());
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        for callback in callbacks {
            callback(&data);
        }
    }
}
