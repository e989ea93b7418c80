//! Registry for all configured source plugins and their ports.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{AddressInput, SourceId, SourceMeta};
use crate::ports::{AddressPort, PortError, SchedulePort};

/// Ports and validated input implementing one configured source.
pub struct SourcePlugin {
    /// Static metadata describing the source.
    pub meta: SourceMeta,
    /// Validated identifying input handed to the address port.
    pub input: AddressInput,
    /// Strategy resolving the input to an address identifier.
    pub address_port: Arc<dyn AddressPort>,
    /// Strategy fetching events for the address.
    pub schedule_port: Arc<dyn SchedulePort>,
}

/// Registry that resolves plugins by source identifier, keeping configuration order.
pub struct PluginRegistry {
    order: Vec<SourceId>,
    plugins: HashMap<SourceId, SourcePlugin>,
}

impl PluginRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<SourcePlugin>) -> Self {
        let order = plugins.iter().map(|plugin| plugin.meta.id.clone()).collect();
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            order,
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered sources in registration order.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceMeta> {
        self.sources_iter().cloned().collect()
    }

    /// Iterator over source metadata in registration order.
    pub fn sources_iter(&self) -> impl Iterator<Item = &SourceMeta> {
        self.order
            .iter()
            .filter_map(|id| self.plugins.get(id))
            .map(|plugin| &plugin.meta)
    }

    /// Look up a plugin for the given source.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedSource`] when no plugin is registered.
    pub fn plugin(&self, source: &SourceId) -> Result<&SourcePlugin, PortError> {
        self.plugins.get(source).ok_or(PortError::UnsupportedSource)
    }
}
