//! Startup reconciler.
//!
//! After boot the attribute store may hold a persisted or default OnOff
//! value that the freshly initialised outputs (all parked *off*) do not
//! reflect.  Reconciling drives each actuator to its stored state once,
//! before any change notification is processed.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{AttributeStore, PinDriver, StoreError};
use crate::app::router::EndpointRouter;
use crate::attribute::{AttributePath, EndpointId};
use crate::config::MAX_ENDPOINTS;
use crate::error::ReconcileError;

/// Drive `endpoint`'s actuator to the OnOff value held in `store`.
///
/// Returns the applied state.
pub fn apply_defaults(
    router: &mut EndpointRouter,
    pins: &mut impl PinDriver,
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<bool, ReconcileError> {
    let actuator = router
        .actuator_for(endpoint)
        .ok_or(ReconcileError::NotRouted(endpoint))?;

    let value = store
        .get(AttributePath::on_off(endpoint))
        .map_err(|e| match e {
            StoreError::NotFound => ReconcileError::AttributeNotFound(endpoint),
            other => ReconcileError::Store(endpoint, other),
        })?;
    let on = value
        .as_bool()
        .ok_or(ReconcileError::InvalidValue(endpoint))?;

    router.actuators_mut().set_power(pins, actuator, on)?;
    info!("endpoint {}: restored {}", endpoint, if on { "on" } else { "off" });
    Ok(on)
}

/// Per-endpoint outcome of [`reconcile_all`].
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub results: Vec<(EndpointId, Result<bool, ReconcileError>), MAX_ENDPOINTS>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReconcileError> {
        self.results.iter().filter_map(|(_, r)| r.as_ref().err())
    }

    pub fn get(&self, endpoint: EndpointId) -> Option<&Result<bool, ReconcileError>> {
        self.results
            .iter()
            .find(|(ep, _)| *ep == endpoint)
            .map(|(_, r)| r)
    }
}

/// Reconcile every routed endpoint.  A failing endpoint is logged and
/// skipped; the rest are still reconciled.
pub fn reconcile_all(
    router: &mut EndpointRouter,
    pins: &mut impl PinDriver,
    store: &impl AttributeStore,
) -> ReconcileReport {
    let endpoints: Vec<EndpointId, MAX_ENDPOINTS> = router.endpoints().collect();
    let mut report = ReconcileReport::default();

    for ep in endpoints {
        let result = apply_defaults(router, pins, store, ep);
        if let Err(e) = &result {
            warn!("Reconcile failed: {}", e);
        }
        // One entry per routed endpoint; the route table has the same bound.
        let _ = report.results.push((ep, result));
    }

    report
}
