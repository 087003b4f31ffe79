//! Endpoint router: the single path from attribute state to hardware.
//!
//! Maps each configured endpoint's OnOff attribute to the actuator that
//! realises it.  Controller commands, local button toggles and timers all
//! end up in [`EndpointRouter::route`]; nothing else drives an output after
//! startup.

use heapless::Vec;

use crate::app::actuator::{ActuatorBank, ActuatorId};
use crate::app::ports::{ConfigError, PinDriver};
use crate::attribute::{AttrValue, AttributePath, EndpointId};
use crate::config::{DeviceTopology, MAX_ENDPOINTS};
use crate::error::RouteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: AttributePath,
    pub actuator: ActuatorId,
}

/// Owns the actuator bank and the route table built over it.
pub struct EndpointRouter {
    actuators: ActuatorBank,
    routes: Vec<Route, MAX_ENDPOINTS>,
}

impl EndpointRouter {
    /// Initialise one actuator per topology endpoint and route the
    /// endpoint's OnOff attribute to it.
    ///
    /// The topology is validated first: with unique endpoint ids routes and
    /// actuators are 1:1, so every actuator is reachable.  Outputs that fail
    /// to come up are kept disabled (see [`ActuatorBank::faults`]).
    pub fn init(
        topology: &DeviceTopology,
        pins: &mut impl PinDriver,
    ) -> Result<Self, ConfigError> {
        topology.validate()?;
        let actuators = ActuatorBank::init(pins, topology.endpoints.iter().map(|e| &e.actuator));

        let routes = topology
            .endpoints
            .iter()
            .zip(actuators.bindings())
            .map(|(ep, binding)| Route {
                path: AttributePath::on_off(ep.endpoint_id),
                actuator: binding.id(),
            })
            .collect();

        Ok(Self { actuators, routes })
    }

    /// Apply an attribute change to the hardware.
    ///
    /// Paths without a route are ignored and return `Ok(())`.
    pub fn route(
        &mut self,
        pins: &mut impl PinDriver,
        path: AttributePath,
        value: AttrValue,
    ) -> Result<(), RouteError> {
        let Some(actuator) = self.resolve(path) else {
            return Ok(());
        };
        let on = value.as_bool().ok_or(RouteError::InvalidValue(path))?;
        self.actuators.set_power(pins, actuator, on)?;
        Ok(())
    }

    pub fn resolve(&self, path: AttributePath) -> Option<ActuatorId> {
        self.routes
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.actuator)
    }

    pub fn actuator_for(&self, endpoint: EndpointId) -> Option<ActuatorId> {
        self.resolve(AttributePath::on_off(endpoint))
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = EndpointId> + '_ {
        self.routes.iter().map(|r| r.path.endpoint)
    }

    pub fn actuators(&self) -> &ActuatorBank {
        &self.actuators
    }

    pub(crate) fn actuators_mut(&mut self) -> &mut ActuatorBank {
        &mut self.actuators
    }
}
