//! Backend module for hazard service access
//!
//! All service I/O runs in a separate thread from the UI, communicating via
//! crossbeam channels:
//!
//! - [`ServiceCommand`] - Messages sent from UI to the worker (fetch
//!   parameters, compute, shutdown)
//! - [`ServiceMessage`] - Messages sent from the worker to the UI (catalog,
//!   curve responses, errors), compute replies tagged with their request
//!   generation
//! - [`ServiceBridge`] - UI-side handle for sending commands and draining
//!   messages
//!
//! # Components
//!
//! - [`HazardService`] - Trait over the opaque remote computation
//! - [`HttpHazardService`] - Blocking HTTP-JSON client for the real services
//! - [`MockHazardService`] - Deterministic in-process service for demos/tests
//! - [`ServiceWorker`] - Worker loop processing commands serially

pub mod mock_service;
pub mod service;
pub mod worker;

pub use mock_service::MockHazardService;
pub use service::{HazardService, HttpHazardService};
pub use worker::ServiceWorker;

use crate::catalog::ParameterCatalog;
use crate::types::HazardRequest;
use crate::wire::CurveResponse;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::JoinHandle;

/// Message sent from the UI to the service worker
#[derive(Debug, Clone)]
pub enum ServiceCommand {
    /// Fetch the parameter usage document
    FetchParameters,
    /// Compute hazard curves, one request per edition; the reply echoes
    /// `generation` so superseded responses can be discarded
    Compute {
        generation: u64,
        requests: Vec<HazardRequest>,
    },
    /// Stop the worker loop
    Shutdown,
}

/// Message sent from the service worker to the UI
#[derive(Debug, Clone)]
pub enum ServiceMessage {
    /// Parameter fetch succeeded
    Parameters(ParameterCatalog),
    /// Parameter fetch failed; the view cannot initialize
    ParametersFailed(String),
    /// Computation succeeded, groups in request order
    ComputeComplete {
        generation: u64,
        response: CurveResponse,
    },
    /// Computation failed
    ComputeFailed { generation: u64, error: String },
}

/// UI-side handle to the service worker
pub struct ServiceBridge {
    commands: Sender<ServiceCommand>,
    messages: Receiver<ServiceMessage>,
}

impl ServiceBridge {
    /// Spawn the worker thread around a service implementation
    pub fn spawn(service: Box<dyn HazardService>) -> (Self, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (msg_tx, msg_rx) = unbounded();
        let worker = ServiceWorker::new(service, cmd_rx, msg_tx);
        let handle = std::thread::Builder::new()
            .name("hazard-service".to_string())
            .spawn(move || worker.run())
            .expect("failed to spawn service worker thread");
        (
            Self {
                commands: cmd_tx,
                messages: msg_rx,
            },
            handle,
        )
    }

    pub fn fetch_parameters(&self) {
        let _ = self.commands.send(ServiceCommand::FetchParameters);
    }

    pub fn compute(&self, generation: u64, requests: Vec<HazardRequest>) {
        let _ = self
            .commands
            .send(ServiceCommand::Compute {
                generation,
                requests,
            });
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(ServiceCommand::Shutdown);
    }

    /// Drain all pending messages without blocking
    pub fn drain(&self) -> Vec<ServiceMessage> {
        self.messages.try_iter().collect()
    }
}

impl Drop for ServiceBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
