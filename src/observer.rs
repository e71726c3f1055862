use std::sync::mpsc::Sender;

use tracing::debug;

/// Something that happened to the catalog state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Loaded { count: usize },
    LoadFailed,
    FormOpened { editing: Option<i32> },
    FormClosed,
    ValidationFailed,
    Saved { id: i32 },
    SaveFailed,
    DeleteRequested { id: i32 },
    DeleteCancelled { id: i32 },
    Deleted { id: i32 },
    DeleteFailed { id: i32 },
    /// An operation was refused because a request was still in flight
    Rejected,
}

/// Trait for catalog change observation
pub trait CatalogObserver {
    /// Called after the catalog state has changed
    fn on_change(&self, event: &CatalogEvent);
}

/// Logs every event at debug level
#[derive(Debug)]
pub struct TracingObserver;

impl CatalogObserver for TracingObserver {
    fn on_change(&self, event: &CatalogEvent) {
        debug!("Catalog event: {event:?}");
    }
}

/// Forwards events over a channel, e.g. to wake up a render loop
#[derive(Debug)]
pub struct ChannelObserver {
    sender: Sender<CatalogEvent>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<CatalogEvent>) -> Self {
        ChannelObserver { sender }
    }
}

impl CatalogObserver for ChannelObserver {
    fn on_change(&self, event: &CatalogEvent) {
        // The receiver going away just means nobody is drawing any more
        let _ = self.sender.send(event.clone());
    }
}
