//! Attribute store adapters.
//!
//! - [`MemoryAttributeStore`]: in-process stand-in for the Matter data
//!   model, with a bounded change-notification queue.  Used on the host and
//!   by firmware builds that keep attribute state locally.
//! - [`SharedAttributeStore`]: cloneable handle that lets the controller
//!   command context and the button context share one store.  Every
//!   operation, including the toggle's compare-and-set, runs under a single
//!   critical section.

use core::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Deque;
use log::warn;

use crate::app::ports::{AttributeStore, StoreError};
use crate::attribute::{AttrValue, AttributeChange, AttributePath};

/// Pending change notifications before writes are refused.
pub const CHANGE_QUEUE_CAP: usize = 32;

#[derive(Default)]
pub struct MemoryAttributeStore {
    values: HashMap<AttributePath, AttrValue>,
    changes: Deque<AttributeChange, CHANGE_QUEUE_CAP>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute with its persisted or default value.
    /// Does not queue a change notification.
    pub fn provision(&mut self, path: AttributePath, value: AttrValue) {
        self.values.insert(path, value);
    }

    pub fn pending(&self) -> usize {
        self.changes.len()
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn get(&self, path: AttributePath) -> Result<AttrValue, StoreError> {
        self.values.get(&path).copied().ok_or(StoreError::NotFound)
    }

    fn set(&mut self, path: AttributePath, value: AttrValue) -> Result<(), StoreError> {
        let slot = self.values.get_mut(&path).ok_or(StoreError::NotFound)?;
        if !slot.same_type(value) {
            return Err(StoreError::TypeMismatch);
        }
        // Refuse rather than apply a write the router would never see.
        if self.changes.is_full() {
            warn!("attribute store: change queue full, rejecting write to {}", path);
            return Err(StoreError::QueueFull);
        }
        *slot = value;
        let _ = self.changes.push_back(AttributeChange::new(path, value));
        Ok(())
    }

    fn take_change(&mut self) -> Option<AttributeChange> {
        self.changes.pop_front()
    }
}

/// Shared, lock-protected store handle.
pub struct SharedAttributeStore<S> {
    inner: Arc<Mutex<CriticalSectionRawMutex, RefCell<S>>>,
}

impl<S> Clone for SharedAttributeStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: AttributeStore> SharedAttributeStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RefCell::new(store))),
        }
    }

    /// Run `f` with exclusive access to the wrapped store.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

impl<S: AttributeStore> AttributeStore for SharedAttributeStore<S> {
    fn get(&self, path: AttributePath) -> Result<AttrValue, StoreError> {
        self.inner.lock(|cell| cell.borrow().get(path))
    }

    fn set(&mut self, path: AttributePath, value: AttrValue) -> Result<(), StoreError> {
        self.with(|s| s.set(path, value))
    }

    fn compare_and_set(
        &mut self,
        path: AttributePath,
        expected: AttrValue,
        new: AttrValue,
    ) -> Result<bool, StoreError> {
        self.with(|s| s.compare_and_set(path, expected, new))
    }

    fn take_change(&mut self) -> Option<AttributeChange> {
        self.with(S::take_change)
    }
}
