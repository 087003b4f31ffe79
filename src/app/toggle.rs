//! Input toggle handler.
//!
//! Turns an accepted wall-switch edge into a write of the negated OnOff
//! value of the bound endpoint.  The handler never touches an output: the
//! write lands in the attribute store, and the store's change notification
//! carries it through the router like any controller command.

use core::fmt;

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{AttributeStore, ConfigError, StoreError};
use crate::attribute::{AttrValue, AttributePath, EndpointId};
use crate::config::{DeviceTopology, MAX_ENDPOINTS, ToggleEdge};
use crate::error::ToggleError;

/// Read-compare-write attempts before a toggle is reported as contended.
pub const TOGGLE_ATTEMPTS: usize = 3;

/// Logical input identity: the position of the input among the topology's
/// endpoints that declare one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputId(u8);

impl InputId {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in{}", self.0)
    }
}

/// A debounced change of the logical pressed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

/// The toggle transform.
pub const fn toggled(current: bool) -> bool {
    !current
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBinding {
    pub input: InputId,
    pub endpoint: EndpointId,
}

pub struct ToggleHandler {
    bindings: Vec<InputBinding, MAX_ENDPOINTS>,
    edge: ToggleEdge,
}

impl ToggleHandler {
    /// Bind every declared input to its endpoint, numbering inputs in
    /// topology order.  Rejects a topology that fails validation.
    pub fn new(topology: &DeviceTopology) -> Result<Self, ConfigError> {
        topology.validate()?;
        let bindings = topology
            .endpoints
            .iter()
            .filter(|e| e.input.is_some())
            .enumerate()
            .map(|(i, e)| InputBinding {
                input: InputId(i as u8),
                endpoint: e.endpoint_id,
            })
            .collect();

        Ok(Self {
            bindings,
            edge: topology.toggle_edge,
        })
    }

    /// Whether `edge` is one this handler reacts to.
    pub fn subscribes(&self, edge: Edge) -> bool {
        matches!(
            (self.edge, edge),
            (ToggleEdge::Both, _)
                | (ToggleEdge::Press, Edge::Press)
                | (ToggleEdge::Release, Edge::Release)
        )
    }

    pub fn endpoint_for(&self, input: InputId) -> Option<EndpointId> {
        self.bindings
            .iter()
            .find(|b| b.input == input)
            .map(|b| b.endpoint)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &InputBinding> {
        self.bindings.iter()
    }

    pub fn toggle_edge(&self) -> ToggleEdge {
        self.edge
    }

    /// Handle an accepted edge from `input`.
    ///
    /// Returns the newly written state, or `None` when the edge kind is not
    /// subscribed.  A missing or non-boolean attribute aborts with no write.
    pub fn on_edge(
        &self,
        input: InputId,
        edge: Edge,
        store: &mut impl AttributeStore,
    ) -> Result<Option<bool>, ToggleError> {
        if !self.subscribes(edge) {
            return Ok(None);
        }
        let endpoint = self
            .endpoint_for(input)
            .ok_or(ToggleError::UnboundInput(input))?;
        let path = AttributePath::on_off(endpoint);
        let store_err = |e: StoreError| match e {
            StoreError::NotFound => ToggleError::AttributeNotFound(endpoint),
            other => ToggleError::Store(endpoint, other),
        };

        for _ in 0..TOGGLE_ATTEMPTS {
            let current = store.get(path).map_err(|e| {
                if e == StoreError::NotFound {
                    warn!("endpoint {}: OnOff attribute not found, toggle ignored", endpoint);
                }
                store_err(e)
            })?;
            let on = current
                .as_bool()
                .ok_or(ToggleError::InvalidValue(endpoint))?;
            let next = toggled(on);

            if store
                .compare_and_set(path, current, AttrValue::Bool(next))
                .map_err(store_err)?
            {
                info!("input {} toggled endpoint {} -> {}", input, endpoint, next);
                return Ok(Some(next));
            }
        }

        Err(ToggleError::Contended(endpoint))
    }
}
