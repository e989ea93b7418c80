use std::sync::Arc;

use publidata_core::{
    model::{CollectionEvent, SourceMeta},
    service::PublidataService,
};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Screen {
    SourceSelect,
    ScheduleView,
}

pub(crate) struct App {
    pub service: Arc<PublidataService>,

    pub screen: Screen,
    pub sources: Vec<SourceMeta>,
    pub source_list_index: usize,
    pub selected_source: Option<SourceMeta>,

    pub events: Vec<CollectionEvent>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<PublidataService>) -> Self {
        let sources = service.sources();
        Self {
            service,
            screen: Screen::SourceSelect,
            sources,
            source_list_index: 0,
            selected_source: None,
            events: Vec::new(),
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn select_current_source(&mut self) -> Option<SourceMeta> {
        let source = self.sources.get(self.source_list_index).cloned()?;
        self.selected_source = Some(source.clone());
        self.events.clear();
        self.screen = Screen::ScheduleView;
        Some(source)
    }
}
