//! Refresh orchestration.
//!
//! The [`Orchestrator`] issues backend requests on background tasks and
//! applies their results to the [`ViewState`] when the UI loop calls
//! [`Orchestrator::poll`]. The UI thread never blocks on the network.
//!
//! Every completed request is tagged with the selection generation it was
//! issued under. Selecting a service bumps the generation, so responses for
//! a previously selected service are dropped instead of leaking into the
//! new view. At most one refresh is outstanding per selection; timer ticks
//! that arrive while one is in flight are skipped.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::{unix_now, ServiceData, ViewState};
use crate::source::{ApiError, Backend, ServiceDescriptor};

/// Whether a service is currently being polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// No service selected.
    Idle,
    /// A service is selected and refreshed on every tick.
    Polling,
}

/// A completed background request.
#[derive(Debug)]
enum Outcome {
    Services(Result<Vec<String>, ApiError>),
    Refreshed {
        generation: u64,
        result: Result<ServiceDescriptor, ApiError>,
    },
    Saved {
        generation: u64,
        key: String,
        result: Result<(), ApiError>,
    },
}

/// Drives backend requests for the dashboard and owns the view state.
#[derive(Debug)]
pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    runtime: Handle,
    sender: mpsc::UnboundedSender<Outcome>,
    receiver: mpsc::UnboundedReceiver<Outcome>,
    generation: u64,
    in_flight: bool,
    services: Vec<String>,
    view: ViewState,
}

impl Orchestrator {
    /// Create an orchestrator that spawns its requests on `runtime`.
    pub fn new(backend: Arc<dyn Backend>, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            backend,
            runtime,
            sender,
            receiver,
            generation: 0,
            in_flight: false,
            services: Vec::new(),
            view: ViewState::default(),
        }
    }

    pub fn backend_description(&self) -> &str {
        self.backend.description()
    }

    pub fn state(&self) -> OrchestratorState {
        if self.view.service.is_some() {
            OrchestratorState::Polling
        } else {
            OrchestratorState::Idle
        }
    }

    pub fn selected_service(&self) -> Option<&str> {
        self.view.service.as_deref()
    }

    /// Service names from the last successful listing.
    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Mutable access to the merged fields, for in-place edits.
    pub fn service_data_mut(&mut self) -> Option<&mut ServiceData> {
        self.view.service_data.as_mut()
    }

    pub fn is_loading(&self) -> bool {
        self.view.loading
    }

    /// Log whether the backend answers its liveness check.
    pub fn check_backend(&self) {
        let backend = self.backend.clone();
        self.runtime.spawn(async move {
            match backend.check().await {
                Ok(()) => info!(backend = backend.description(), "Backend is reachable"),
                Err(e) => warn!(backend = backend.description(), error = %e, "Backend check failed"),
            }
        });
    }

    /// Request the list of services.
    pub fn load_services(&self) {
        let backend = self.backend.clone();
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let result = backend.list_services().await;
            let _ = sender.send(Outcome::Services(result));
        });
    }

    /// Select a service, discarding all state derived for the previous one,
    /// and refresh it immediately.
    pub fn select_service(&mut self, service: &str) {
        self.generation += 1;
        self.in_flight = false;
        self.view = ViewState::for_service(service);
        info!(service, generation = self.generation, "Selected service");
        self.refresh();
    }

    /// Issue a refresh of the selected service.
    ///
    /// Returns false when idle or when a refresh is already outstanding.
    pub fn refresh(&mut self) -> bool {
        let Some(service) = self.view.service.clone() else {
            return false;
        };
        if self.in_flight {
            debug!(service, "Refresh still in flight, skipping tick");
            return false;
        }

        self.in_flight = true;
        self.view.loading = true;
        debug!(service, generation = self.generation, "Refreshing service");

        let backend = self.backend.clone();
        let sender = self.sender.clone();
        let generation = self.generation;
        self.runtime.spawn(async move {
            let result = backend.fetch_service(&service).await;
            let _ = sender.send(Outcome::Refreshed { generation, result });
        });
        true
    }

    /// Save the current value of a field.
    ///
    /// Returns false if nothing was sent: no service selected, unknown or
    /// read-only field, or a field without a value.
    pub fn save_field(&mut self, key: &str) -> bool {
        let Some(service) = self.view.service.clone() else {
            return false;
        };
        if ServiceData::is_read_only(key) {
            return false;
        }
        let Some(value) = self
            .view
            .service_data
            .as_ref()
            .and_then(|data| data.get(key))
            .and_then(|field| field.value.clone())
        else {
            return false;
        };

        info!(service, key, "Saving field");
        let backend = self.backend.clone();
        let sender = self.sender.clone();
        let generation = self.generation;
        let key = key.to_string();
        self.runtime.spawn(async move {
            let result = backend.save_key(&service, &key, &value).await;
            let _ = sender.send(Outcome::Saved { generation, key, result });
        });
        true
    }

    /// Apply every completed request without blocking.
    ///
    /// Returns true if the view or service list changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.receiver.try_recv() {
            changed |= self.apply(outcome);
        }
        changed
    }

    fn apply(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Services(Ok(services)) => {
                debug!(count = services.len(), "Loaded service list");
                self.services = services;
                true
            }
            Outcome::Services(Err(e)) => {
                warn!(error = %e, "Failed to list services");
                false
            }
            Outcome::Refreshed { generation, .. } | Outcome::Saved { generation, .. }
                if generation != self.generation =>
            {
                debug!(generation, current = self.generation, "Dropping stale response");
                false
            }
            Outcome::Refreshed { result, .. } => {
                self.in_flight = false;
                self.view.loading = false;
                match result {
                    Ok(descriptor) => {
                        self.view.apply(descriptor, unix_now());
                        true
                    }
                    Err(e) => {
                        warn!(service = ?self.view.service, error = %e, "Refresh failed");
                        true
                    }
                }
            }
            Outcome::Saved { key, result, .. } => match result {
                Ok(()) => {
                    info!(service = ?self.view.service, key, "Saved field");
                    self.view
                        .service_data
                        .as_mut()
                        .is_some_and(|data| data.mark_saved(&key))
                }
                Err(e) => {
                    warn!(service = ?self.view.service, key, error = %e, "Save failed");
                    false
                }
            },
        }
    }
}

/// Fetch one service and build its view state in a single pass.
///
/// Used by export mode, which has no refresh loop.
pub async fn snapshot(backend: &dyn Backend, service: &str) -> Result<ViewState, ApiError> {
    let descriptor = backend.fetch_service(service).await?;
    let mut view = ViewState::for_service(service);
    view.apply(descriptor, unix_now());
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ConfigItem, FileBackend, SchemaItem, ServiceStore};
    use serde_json::json;
    use std::time::Duration;

    async fn settle(orchestrator: &mut Orchestrator) -> bool {
        tokio::time::sleep(Duration::from_millis(50)).await;
        orchestrator.poll()
    }

    fn two_services() -> ServiceStore {
        let mut store = ServiceStore::default();

        let mut billing = ServiceDescriptor::default();
        billing
            .schema
            .insert("timeout".into(), SchemaItem::new("30", "integer", "Timeout", "Seconds"));
        billing.config.insert("v".into(), ConfigItem::new("4", 0));
        billing.clients.insert(
            "b-1".into(),
            serde_json::from_value(json!({"v": "4", "ts": unix_now(), "c_hits": ["2"], "k_zone": "z1"}))
                .unwrap(),
        );
        store.services.insert("billing".into(), billing);

        let mut search = ServiceDescriptor::default();
        search
            .schema
            .insert("depth".into(), SchemaItem::new("3", "integer", "Depth", "Max depth"));
        store.services.insert("search".into(), search);
        store
    }

    fn orchestrator(backend: FileBackend) -> Orchestrator {
        Orchestrator::new(Arc::new(backend), Handle::current())
    }

    #[tokio::test]
    async fn test_load_services() {
        let mut orch = orchestrator(FileBackend::from_store(two_services()));
        assert!(orch.services().is_empty());

        orch.load_services();
        assert!(settle(&mut orch).await);
        assert_eq!(orch.services(), &["billing".to_string(), "search".to_string()]);
    }

    #[tokio::test]
    async fn test_idle_refresh_is_noop() {
        let mut orch = orchestrator(FileBackend::mock());
        assert_eq!(orch.state(), OrchestratorState::Idle);
        assert!(!orch.refresh());
        assert!(!settle(&mut orch).await);
    }

    #[tokio::test]
    async fn test_select_and_refresh() {
        let mut orch = orchestrator(FileBackend::from_store(two_services()));
        orch.select_service("billing");
        assert_eq!(orch.state(), OrchestratorState::Polling);
        assert!(orch.is_loading());

        assert!(settle(&mut orch).await);
        assert!(!orch.is_loading());

        let view = orch.view();
        let data = view.service_data.as_ref().unwrap();
        assert_eq!(data.get("timeout").unwrap().value.as_deref(), Some("30"));
        assert_eq!(data.version(), Some("4"));
        assert_eq!(view.tags_for("b-1")[0].text, "Ok");
        assert_eq!(view.totals.get("hits 1/min"), Some(2));
    }

    #[tokio::test]
    async fn test_select_resets_state_before_first_refresh() {
        let mut orch = orchestrator(FileBackend::from_store(two_services()));
        orch.select_service("billing");
        settle(&mut orch).await;
        assert!(!orch.view().headers.is_empty());

        orch.select_service("search");
        let view = orch.view();
        assert_eq!(view.service.as_deref(), Some("search"));
        assert!(view.service_data.is_none());
        assert!(view.headers.is_empty());
        assert!(view.tags.is_empty());
        assert!(view.totals.is_empty());
        assert!(view.instances.is_empty());

        settle(&mut orch).await;
        let data = orch.view().service_data.as_ref().unwrap();
        assert!(data.get("depth").is_some());
        assert!(data.get("timeout").is_none());
    }

    #[tokio::test]
    async fn test_stale_response_is_dropped() {
        let mut orch = orchestrator(FileBackend::from_store(two_services()));
        orch.select_service("billing");
        // Switch before the billing response is applied; the new service
        // does not exist, so nothing may be applied at all.
        orch.select_service("unknown");

        settle(&mut orch).await;
        let view = orch.view();
        assert_eq!(view.service.as_deref(), Some("unknown"));
        assert!(view.service_data.is_none());
        assert!(view.headers.is_empty());
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_single_refresh_in_flight() {
        let mut orch = orchestrator(FileBackend::from_store(two_services()));
        orch.select_service("billing");
        assert!(!orch.refresh());

        settle(&mut orch).await;
        assert!(orch.refresh());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_view() {
        let mut orch = orchestrator(FileBackend::mock());
        orch.select_service("example");
        settle(&mut orch).await;
        let before = orch.view().service_data.clone();
        assert!(before.is_some());

        // A failed refresh for the same selection leaves the state alone
        orch.apply(Outcome::Refreshed {
            generation: orch.generation,
            result: Err(ApiError::Timeout),
        });
        assert_eq!(orch.view().service_data, before);
        assert!(!orch.is_loading());
    }

    #[tokio::test]
    async fn test_save_marks_value_saved() {
        let mut orch = orchestrator(FileBackend::mock());
        orch.select_service("example");
        settle(&mut orch).await;

        let data = orch.service_data_mut().unwrap();
        assert_eq!(data.get("example").unwrap().value.as_deref(), Some("Current value"));
        assert!(data.edit("example", "New value".to_string()));

        assert!(orch.save_field("example"));
        assert!(settle(&mut orch).await);

        let field = orch.view().service_data.as_ref().unwrap().get("example").unwrap();
        assert_eq!(field.value_orig.as_deref(), Some("New value"));
        assert!(!field.is_dirty());

        // The backend bumped the version; the next refresh does not revert
        // the saved value and reports the same value back anyway.
        orch.refresh();
        settle(&mut orch).await;
        let data = orch.view().service_data.as_ref().unwrap();
        assert_eq!(data.get("example").unwrap().value.as_deref(), Some("New value"));
    }

    #[tokio::test]
    async fn test_save_ack_covers_edit_made_in_flight() {
        let mut orch = orchestrator(FileBackend::mock());
        orch.select_service("example");
        settle(&mut orch).await;

        let data = orch.service_data_mut().unwrap();
        data.edit("example", "A".to_string());
        assert!(orch.save_field("example"));

        // Typed after the PUT went out, before its acknowledgment is applied
        orch.service_data_mut()
            .unwrap()
            .edit("example", "AB".to_string());
        assert!(settle(&mut orch).await);

        let field = orch.view().service_data.as_ref().unwrap().get("example").unwrap();
        assert_eq!(field.value.as_deref(), Some("AB"));
        assert_eq!(field.value_orig, field.value);
        assert!(!field.is_dirty());
    }

    #[tokio::test]
    async fn test_save_rejects_read_only_and_unknown() {
        let mut orch = orchestrator(FileBackend::mock());
        assert!(!orch.save_field("example"));

        orch.select_service("example");
        settle(&mut orch).await;
        assert!(!orch.save_field("v"));
        assert!(!orch.save_field("missing"));
    }

    #[tokio::test]
    async fn test_snapshot() {
        let backend = FileBackend::from_store(two_services());
        let view = snapshot(&backend, "billing").await.unwrap();
        assert_eq!(view.service.as_deref(), Some("billing"));
        assert_eq!(view.headers.get("k_zone").map(String::as_str), Some("zone"));

        let err = snapshot(&backend, "nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
