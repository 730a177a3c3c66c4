//! Outside-interaction dismissal
//!
//! The host delivers pointer interactions to an [`InteractionHub`]. A
//! [`DismissalCoordinator`] attached to the hub turns each one into a reset
//! broadcast. Attaching returns a [`Subscription`]; dropping it detaches
//! exactly the listener it attached.

use crate::registry::{BroadcastReport, EditorRegistry};
use crate::signal::{ContextToken, EditorInstanceId};
use draftgrid_model::RecordId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// A pointer interaction observed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Outside every row and popup
    Outside,
    /// On a row of the grid
    Row(RecordId),
    /// Inside an editor's own popup
    InsidePopup(EditorInstanceId),
}

impl Interaction {
    /// Broadcast context for this interaction; `None` means no broadcast
    #[must_use]
    pub fn context(&self) -> Option<ContextToken> {
        match self {
            Self::Outside => Some(ContextToken::ResetAll),
            Self::Row(row) => Some(ContextToken::Row(row.clone())),
            Self::InsidePopup(_) => None,
        }
    }
}

type Listener = Arc<dyn Fn(&Interaction) + Send + Sync>;

struct HubInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

/// Fan-out point for host interactions
#[derive(Clone)]
pub struct InteractionHub {
    inner: Arc<HubInner>,
}

impl InteractionHub {
    /// Create hub with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                next_id: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Attach a listener; it stays attached while the subscription lives
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Interaction) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
            active: true,
        }
    }

    /// Deliver an interaction to every listener; returns how many ran
    pub fn dispatch(&self, interaction: &Interaction) -> usize {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in &listeners {
            listener(interaction);
        }
        listeners.len()
    }

    /// Number of attached listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl Default for InteractionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InteractionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Attachment guard returned by [`InteractionHub::subscribe`]
#[must_use = "dropping a subscription detaches its listener"]
#[derive(Debug)]
pub struct Subscription {
    hub: Weak<HubInner>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Detach now; later calls are no-ops
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(hub) = self.hub.upgrade() {
            hub.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }

    /// Whether the listener is still attached
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active && self.hub.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for HubInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubInner")
            .field("listeners", &self.listeners.lock().len())
            .finish_non_exhaustive()
    }
}

/// Closes open popups when the user interacts elsewhere
#[derive(Debug, Clone)]
pub struct DismissalCoordinator {
    registry: Arc<EditorRegistry>,
}

impl DismissalCoordinator {
    /// Create coordinator over `registry`
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<EditorRegistry>) -> Self {
        Self { registry }
    }

    /// Broadcast the reset an interaction calls for
    pub fn handle(&self, interaction: &Interaction) -> Option<BroadcastReport> {
        let context = interaction.context()?;
        tracing::trace!(?interaction, "dismissal broadcast");
        Some(self.registry.broadcast_reset_all(&context))
    }

    /// Listen on `hub` until the returned subscription is dropped
    pub fn attach(&self, hub: &InteractionHub) -> Subscription {
        let coordinator = self.clone();
        hub.subscribe(move |interaction| {
            coordinator.handle(interaction);
        })
    }

    /// Registry the coordinator broadcasts to
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<EditorRegistry> {
        &self.registry
    }
}
