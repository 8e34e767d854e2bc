//! Wizard state store: the in-progress profile plus the step cursor.
//!
//! Every operation is a total function over in-memory state; nothing here
//! performs I/O or can fail. Observers are told about every profile
//! mutation (merge and reset) synchronously, after the change is applied.
//! Navigation never notifies: the step index is not part of what observers
//! persist.

use std::sync::Arc;

use tracing::debug;

use crate::profile::ProfileData;

use super::state::{STEP_ORDER, WizardStep};
use super::update::StepUpdate;

/// Receives the full profile after every mutation.
pub trait StoreObserver: Send + Sync {
    fn profile_changed(&self, data: &ProfileData);
}

pub struct WizardStore {
    data: ProfileData,
    step_index: usize,
    steps: &'static [WizardStep],
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl Default for WizardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WizardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardStore")
            .field("data", &self.data)
            .field("step_index", &self.step_index)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl WizardStore {
    /// A store holding the empty profile, at the first step.
    pub fn new() -> Self {
        Self::with_profile(ProfileData::empty())
    }

    /// A store pre-filled with `data` (e.g. rehydrated), at the first step.
    pub fn with_profile(data: ProfileData) -> Self {
        Self {
            data,
            step_index: 0,
            steps: STEP_ORDER,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn data(&self) -> &ProfileData {
        &self.data
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn steps(&self) -> &'static [WizardStep] {
        self.steps
    }

    pub fn current_step(&self) -> WizardStep {
        self.steps[self.step_index]
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index == self.steps.len() - 1
    }

    /// Overwrite only the fields named by `update`. Does not move the cursor.
    pub fn merge(&mut self, update: StepUpdate) {
        debug!(step = %update.step(), fields = ?update.touched_fields(), "Merging step update");
        update.apply_to(&mut self.data);
        self.notify();
    }

    /// Move forward one step; a no-op at the last step. Does not validate.
    pub fn advance(&mut self) {
        self.step_index = (self.step_index + 1).min(self.steps.len() - 1);
    }

    /// Move back one step; a no-op at the first step. Never touches data.
    pub fn retreat(&mut self) {
        self.step_index = self.step_index.saturating_sub(1);
    }

    /// Move to `step` if it is part of the sequence.
    pub fn jump_to(&mut self, step: WizardStep) {
        if let Some(idx) = self.steps.iter().position(|s| *s == step) {
            self.step_index = idx;
        }
    }

    /// Move to the step with wire id `id`. Unknown ids are ignored.
    pub fn jump_to_id(&mut self, id: &str) {
        match WizardStep::from_id(id) {
            Some(step) => self.jump_to(step),
            None => debug!(step_id = id, "Ignoring jump to unknown step"),
        }
    }

    /// Back to the empty profile at the first step.
    pub fn reset(&mut self) {
        self.data = ProfileData::empty();
        self.step_index = 0;
        self.notify();
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.profile_changed(&self.data);
        }
    }
}
