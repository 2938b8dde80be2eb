//! Quick-action list shown on the devotee dashboard.
//!
//! The list is plain application state: the host builds an [`ActionStore`],
//! hands clones to whatever renders or edits it, and observers follow changes
//! through [`ActionStore::subscribe`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub label: String,
}

impl Action {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

pub fn default_actions() -> Vec<Action> {
    vec![
        Action::new("viewBookings", "View Bookings"),
        Action::new("bookShigra", "Book - Shigra Darshan"),
        Action::new("bookVip", "Book - VIP Darshan"),
        Action::new("bookLocalide", "Book - Localide Darshan"),
        Action::new("bookBhasm", "Book - Bhasm Arti"),
    ]
}

#[derive(Clone, Debug)]
pub struct ActionStore {
    tx: Arc<watch::Sender<Vec<Action>>>,
}

impl ActionStore {
    pub fn new(actions: Vec<Action>) -> Self {
        let (tx, _rx) = watch::channel(actions);
        Self { tx: Arc::new(tx) }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_actions())
    }

    /// Snapshot of the current list.
    pub fn get(&self) -> Vec<Action> {
        self.tx.borrow().clone()
    }

    pub fn find(&self, id: &str) -> Option<Action> {
        self.tx.borrow().iter().find(|a| a.id == id).cloned()
    }

    /// Replace the list and notify subscribers.
    pub fn set(&self, actions: Vec<Action>) {
        self.tx.send_replace(actions);
    }

    /// Edit the list in place and notify subscribers.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<Action>),
    {
        self.tx.send_modify(f);
    }

    /// Receiver that starts at the current list and sees every later change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Action>> {
        self.tx.subscribe()
    }
}

impl Default for ActionStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
