//! In-memory transport for host-side tests and simulation.
//!
//! Clones of a [`SimTransport`] share state, so a test can hand one clone to an
//! adapter and keep another to inspect what went over the "wire".

use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::time::Duration;

use crate::controller::{ErrorCode, RevStatus, SparkMode, TalonMode};
use crate::error::Result;
use crate::provider::DeviceBus;

use super::{DeviceStatus, Request, Signal, Transport};

struct SimState<M, S> {
    requests: Vec<(Request<M>, Duration)>,
    scripted: VecDeque<S>,
    position: f64,
    velocity: f64,
    output: f64,
}

/// Recording transport with scripted status codes.
pub struct SimTransport<M, S> {
    state: Rc<RefCell<SimState<M, S>>>,
}

impl<M, S> Clone for SimTransport<M, S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<M, S> Default for SimTransport<M, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, S> fmt::Debug for SimTransport<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimTransport")
            .field("requests", &self.state.borrow().requests.len())
            .finish()
    }
}

impl<M, S> SimTransport<M, S> {
    /// Create a transport that acknowledges everything.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                requests: Vec::new(),
                scripted: VecDeque::new(),
                position: 0.0,
                velocity: 0.0,
                output: 0.0,
            })),
        }
    }

    /// Queue a status for the next unanswered request.
    ///
    /// Requests beyond the queue are acknowledged with the success status.
    pub fn push_status(&self, status: S) {
        self.state.borrow_mut().scripted.push_back(status);
    }

    /// Set the value returned for a telemetry signal (native units).
    pub fn set_signal(&self, signal: Signal, value: f64) {
        let mut state = self.state.borrow_mut();
        match signal {
            Signal::Position => state.position = value,
            Signal::Velocity => state.velocity = value,
            Signal::Output => state.output = value,
        }
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }
}

impl<M: Copy, S> SimTransport<M, S> {
    /// All requests received, oldest first.
    pub fn requests(&self) -> Vec<Request<M>> {
        self.state
            .borrow()
            .requests
            .iter()
            .map(|(request, _)| *request)
            .collect()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<Request<M>> {
        self.state.borrow().requests.last().map(|(request, _)| *request)
    }

    /// Timeout attached to the most recent request.
    pub fn last_timeout(&self) -> Option<Duration> {
        self.state.borrow().requests.last().map(|(_, timeout)| *timeout)
    }
}

impl<M, S> Transport for SimTransport<M, S>
where
    M: Copy + fmt::Debug,
    S: DeviceStatus,
{
    type Mode = M;
    type Status = S;

    fn request(&mut self, request: Request<M>, timeout: Duration) -> S {
        let mut state = self.state.borrow_mut();
        state.requests.push((request, timeout));
        state.scripted.pop_front().unwrap_or(S::OK)
    }

    fn read(&mut self, signal: Signal) -> f64 {
        let state = self.state.borrow();
        match signal {
            Signal::Position => state.position,
            Signal::Velocity => state.velocity,
            Signal::Output => state.output,
        }
    }
}

/// Simulated CTRE transport.
pub type SimCtre = SimTransport<TalonMode, ErrorCode>;

/// Simulated REV transport.
pub type SimRev = SimTransport<SparkMode, RevStatus>;

/// Device bus that opens simulated transports and keeps a handle to each.
#[derive(Debug, Default)]
pub struct SimBus {
    ctre: BTreeMap<u8, SimCtre>,
    rev: BTreeMap<u8, SimRev>,
}

impl SimBus {
    /// Empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer for the CTRE device opened with `device_id`.
    pub fn ctre(&self, device_id: u8) -> Option<SimCtre> {
        self.ctre.get(&device_id).cloned()
    }

    /// Observer for the REV device opened with `device_id`.
    pub fn rev(&self, device_id: u8) -> Option<SimRev> {
        self.rev.get(&device_id).cloned()
    }
}

impl DeviceBus for SimBus {
    type Ctre = SimCtre;
    type Rev = SimRev;

    fn open_ctre(&mut self, device_id: u8) -> Result<SimCtre> {
        Ok(self.ctre.entry(device_id).or_default().clone())
    }

    fn open_rev(&mut self, device_id: u8) -> Result<SimRev> {
        Ok(self.rev.entry(device_id).or_default().clone())
    }
}
