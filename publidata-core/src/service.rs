//! High-level service facade combining all configured sources.

use std::sync::Arc;

use log::{debug, info};

use crate::model::{AddressId, CollectionEvent, SourceId, SourceMeta};
use crate::plugin::PluginRegistry;
use crate::ports::PortError;

/// Public entry point for resolving addresses and fetching schedules.
pub struct PublidataService {
    registry: Arc<PluginRegistry>,
}

impl PublidataService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// List all configured sources.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceMeta> {
        self.registry.sources()
    }

    /// Resolve the configured input of a source to an address identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the source is unknown or a lookup fails.
    pub async fn resolve_address(&self, source: &SourceId) -> Result<AddressId, PortError> {
        let plugin = self.registry.plugin(source)?;
        plugin.address_port.resolve(&plugin.input).await
    }

    /// Resolve the address of a source and load its collection events.
    ///
    /// Requests run one after another; any failure aborts the whole call.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the source is unknown, resolution fails, or the
    /// events cannot be fetched.
    pub async fn fetch(&self, source: &SourceId) -> Result<Vec<CollectionEvent>, PortError> {
        let plugin = self.registry.plugin(source)?;
        debug!("fetching {} source '{source}'", plugin.meta.kind);

        let address_id = plugin.address_port.resolve(&plugin.input).await?;
        let events = plugin.schedule_port.schedule(&address_id).await?;

        info!("source '{source}': {} collection events", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{AddressInput, SourceKind};
    use crate::plugin::SourcePlugin;
    use crate::ports::{AddressPort, SchedulePort};

    struct FixedAddress(&'static str);

    #[async_trait]
    impl AddressPort for FixedAddress {
        async fn resolve(&self, _input: &AddressInput) -> Result<AddressId, PortError> {
            Ok(AddressId(self.0.to_owned()))
        }
    }

    struct FailingAddress;

    #[async_trait]
    impl AddressPort for FailingAddress {
        async fn resolve(&self, _input: &AddressInput) -> Result<AddressId, PortError> {
            Err(PortError::NoResults("address"))
        }
    }

    #[derive(Default)]
    struct RecordingSchedule {
        seen: Mutex<Vec<AddressId>>,
    }

    #[async_trait]
    impl SchedulePort for RecordingSchedule {
        async fn schedule(
            &self,
            address_id: &AddressId,
        ) -> Result<Vec<CollectionEvent>, PortError> {
            self.seen
                .lock()
                .expect("lock poisoned")
                .push(address_id.clone());
            let date = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
            Ok(vec![CollectionEvent::new(date, "Verre")])
        }
    }

    fn plugin(
        id: &str,
        address_port: Arc<dyn AddressPort>,
        schedule_port: Arc<dyn SchedulePort>,
    ) -> SourcePlugin {
        SourcePlugin {
            meta: SourceMeta {
                id: SourceId(id.to_owned()),
                name: id.to_owned(),
                kind: SourceKind::Api,
                timezone: "Europe/Paris".to_owned(),
            },
            input: AddressInput::Direct(AddressId("configured".to_owned())),
            address_port,
            schedule_port,
        }
    }

    #[tokio::test]
    async fn fetch_passes_resolved_address_to_schedule() {
        let schedule = Arc::new(RecordingSchedule::default());
        let registry = PluginRegistry::new(vec![plugin(
            "beuvry",
            Arc::new(FixedAddress("addr-7")),
            Arc::clone(&schedule) as Arc<dyn SchedulePort>,
        )]);
        let service = PublidataService::new(Arc::new(registry));

        let events = service
            .fetch(&SourceId("beuvry".to_owned()))
            .await
            .expect("fetch succeeds");

        assert_eq!(events.len(), 1, "one event");
        assert_eq!(
            *schedule.seen.lock().expect("lock poisoned"),
            vec![AddressId("addr-7".to_owned())],
            "schedule sees the resolved id"
        );
    }

    #[tokio::test]
    async fn resolution_failure_aborts_before_schedule() {
        let schedule = Arc::new(RecordingSchedule::default());
        let registry = PluginRegistry::new(vec![plugin(
            "broken",
            Arc::new(FailingAddress),
            Arc::clone(&schedule) as Arc<dyn SchedulePort>,
        )]);
        let service = PublidataService::new(Arc::new(registry));

        let err = service
            .fetch(&SourceId("broken".to_owned()))
            .await
            .expect_err("resolution fails");

        assert!(matches!(err, PortError::NoResults("address")), "got {err:?}");
        assert!(
            schedule.seen.lock().expect("lock poisoned").is_empty(),
            "no events request after a failed resolution"
        );
    }

    #[tokio::test]
    async fn unknown_source_is_rejected() {
        let service = PublidataService::new(Arc::new(PluginRegistry::new(Vec::new())));

        let err = service
            .fetch(&SourceId("missing".to_owned()))
            .await
            .expect_err("not registered");

        assert!(matches!(err, PortError::UnsupportedSource), "got {err:?}");
    }

    #[test]
    fn sources_keep_registration_order() {
        let schedule: Arc<dyn SchedulePort> = Arc::new(RecordingSchedule::default());
        let registry = PluginRegistry::new(vec![
            plugin("zeta", Arc::new(FixedAddress("z")), Arc::clone(&schedule)),
            plugin("alpha", Arc::new(FixedAddress("a")), Arc::clone(&schedule)),
        ]);
        let service = PublidataService::new(Arc::new(registry));

        let ids = service
            .sources()
            .into_iter()
            .map(|meta| meta.id.0)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["zeta", "alpha"], "configuration order");
    }
}
