//! Service worker thread
//!
//! Runs every hazard service call on a separate thread so the UI stays
//! responsive, communicating with the frontend through crossbeam channels.
//! Commands are processed strictly in order, one at a time, so there is at
//! most one in-flight service call by construction; the frontend enforces
//! the single-submission discipline by disabling the form while it waits,
//! and discards any reply whose generation is not the latest issued.

use crate::backend::service::HazardService;
use crate::backend::{ServiceCommand, ServiceMessage};
use crossbeam_channel::{Receiver, Sender};

/// Worker loop owning the hazard service implementation
pub struct ServiceWorker {
    service: Box<dyn HazardService>,
    commands: Receiver<ServiceCommand>,
    messages: Sender<ServiceMessage>,
}

impl ServiceWorker {
    pub fn new(
        service: Box<dyn HazardService>,
        commands: Receiver<ServiceCommand>,
        messages: Sender<ServiceMessage>,
    ) -> Self {
        Self {
            service,
            commands,
            messages,
        }
    }

    /// Process commands until shutdown or channel disconnect
    pub fn run(mut self) {
        tracing::info!("service worker started");
        loop {
            let command = match self.commands.recv() {
                Ok(cmd) => cmd,
                Err(_) => {
                    tracing::debug!("command channel closed, stopping worker");
                    break;
                }
            };

            let message = match command {
                ServiceCommand::Shutdown => {
                    tracing::info!("service worker shutting down");
                    break;
                }
                ServiceCommand::FetchParameters => match self.service.fetch_parameters() {
                    Ok(catalog) => ServiceMessage::Parameters(catalog),
                    Err(err) => {
                        tracing::error!(%err, "parameter fetch failed");
                        ServiceMessage::ParametersFailed(err.to_string())
                    }
                },
                ServiceCommand::Compute {
                    generation,
                    requests,
                } => {
                    tracing::info!(generation, count = requests.len(), "computing hazard");
                    let mut groups = Vec::with_capacity(requests.len());
                    let mut failure = None;
                    for request in &requests {
                        match self.service.compute_hazard(request) {
                            Ok(group) => groups.push(group),
                            Err(err) => {
                                tracing::error!(%err, edition = %request.edition,
                                    "hazard computation failed");
                                failure = Some(err.to_string());
                                break;
                            }
                        }
                    }
                    match failure {
                        Some(error) => ServiceMessage::ComputeFailed { generation, error },
                        None => ServiceMessage::ComputeComplete {
                            generation,
                            response: groups,
                        },
                    }
                }
            };

            if self.messages.send(message).is_err() {
                tracing::debug!("message channel closed, stopping worker");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock_service::MockHazardService;
    use crate::types::HazardRequest;
    use crossbeam_channel::unbounded;

    fn spawn_worker() -> (Sender<ServiceCommand>, Receiver<ServiceMessage>) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (msg_tx, msg_rx) = unbounded();
        let worker = ServiceWorker::new(Box::new(MockHazardService::new()), cmd_rx, msg_tx);
        std::thread::spawn(move || worker.run());
        (cmd_tx, msg_rx)
    }

    #[test]
    fn test_fetch_then_compute_in_order() {
        let (cmd_tx, msg_rx) = spawn_worker();

        cmd_tx.send(ServiceCommand::FetchParameters).unwrap();
        assert!(matches!(
            msg_rx.recv().unwrap(),
            ServiceMessage::Parameters(_)
        ));

        cmd_tx
            .send(ServiceCommand::Compute {
                generation: 1,
                requests: vec![HazardRequest {
                    edition: "E2014".to_string(),
                    region: "COUS".to_string(),
                    latitude: 34.05,
                    longitude: -118.25,
                    vs30: "760".to_string(),
                }],
            })
            .unwrap();
        match msg_rx.recv().unwrap() {
            ServiceMessage::ComputeComplete {
                generation,
                response,
            } => {
                assert_eq!(generation, 1);
                assert_eq!(response.len(), 1);
            }
            other => panic!("unexpected message: {other:?}"),
        }

        cmd_tx.send(ServiceCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_compute_failure_carries_generation() {
        let (cmd_tx, msg_rx) = spawn_worker();
        cmd_tx
            .send(ServiceCommand::Compute {
                generation: 7,
                requests: vec![HazardRequest {
                    edition: "E1899".to_string(),
                    region: "COUS".to_string(),
                    latitude: 34.05,
                    longitude: -118.25,
                    vs30: "760".to_string(),
                }],
            })
            .unwrap();
        match msg_rx.recv().unwrap() {
            ServiceMessage::ComputeFailed { generation, error } => {
                assert_eq!(generation, 7);
                assert!(error.contains("E1899"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
        cmd_tx.send(ServiceCommand::Shutdown).unwrap();
    }
}
