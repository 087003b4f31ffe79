//! Attribute addressing shared by the router, reconciler and toggle handler.
//!
//! An attribute is addressed by the Matter triple
//! `(endpoint, cluster, attribute)`.  The only attribute this crate acts on
//! is the boolean OnOff attribute of the OnOff cluster; every other path is
//! passed through untouched.

use core::fmt;

use serde::{Deserialize, Serialize};

pub type EndpointId = u16;
pub type ClusterId = u32;
pub type AttributeId = u32;

/// Matter OnOff cluster.
pub const ON_OFF_CLUSTER: ClusterId = 0x0006;
/// `OnOff` attribute inside the OnOff cluster.
pub const ON_OFF_ATTRIBUTE: AttributeId = 0x0000;

/// Fully-qualified attribute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributePath {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub attribute: AttributeId,
}

impl AttributePath {
    pub const fn new(endpoint: EndpointId, cluster: ClusterId, attribute: AttributeId) -> Self {
        Self {
            endpoint,
            cluster,
            attribute,
        }
    }

    /// The OnOff attribute of `endpoint`.
    pub const fn on_off(endpoint: EndpointId) -> Self {
        Self::new(endpoint, ON_OFF_CLUSTER, ON_OFF_ATTRIBUTE)
    }

    pub const fn is_on_off(&self) -> bool {
        self.cluster == ON_OFF_CLUSTER && self.attribute == ON_OFF_ATTRIBUTE
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ep{}/0x{:04X}/0x{:04X}",
            self.endpoint, self.cluster, self.attribute
        )
    }
}

/// Typed attribute payload.
///
/// Stores may hold other types for unrelated attributes; the OnOff
/// attribute is always `Bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Uint(u32),
    Null,
}

impl AttrValue {
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Whether two values carry the same type tag.
    pub fn same_type(self, other: Self) -> bool {
        core::mem::discriminant(&self) == core::mem::discriminant(&other)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A change notification pushed by the attribute store, whatever the
/// origin of the write (controller command, local button, timer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeChange {
    pub path: AttributePath,
    pub value: AttrValue,
}

impl AttributeChange {
    pub const fn new(path: AttributePath, value: AttrValue) -> Self {
        Self { path, value }
    }
}
