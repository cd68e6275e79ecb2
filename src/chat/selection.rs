use crate::core::error::ChatError;
use crate::providers::registry::{self, ProviderEntry};
use crate::providers::{ProviderFamily, Tuning, TuningField};
use std::collections::HashMap;

/// Current/previous provider plus per-family tuning.
///
/// A difference between `current` and `previous` is a pending switch that
/// the engine resolves by opening a new conversation.
#[derive(Debug, Clone)]
pub struct ProviderSelection {
    current: &'static ProviderEntry,
    previous: &'static ProviderEntry,
    tuning: HashMap<ProviderFamily, Tuning>,
}

impl ProviderSelection {
    pub fn new(provider_id: &str, initial_tuning: Tuning) -> Result<Self, ChatError> {
        let entry = registry::resolve(provider_id)?;
        let initial_tuning = initial_tuning.validated()?;
        let tuning = ProviderFamily::all()
            .into_iter()
            .filter(ProviderFamily::supports_tuning)
            .map(|family| (family, initial_tuning))
            .collect();
        Ok(Self {
            current: entry,
            previous: entry,
            tuning,
        })
    }

    pub fn current(&self) -> &'static ProviderEntry {
        self.current
    }

    pub fn previous(&self) -> &'static ProviderEntry {
        self.previous
    }

    /// Group headers and unknown ids are rejected and leave the selection
    /// unchanged.
    pub fn select(&mut self, provider_id: &str) -> Result<(), ChatError> {
        self.current = registry::resolve(provider_id)?;
        Ok(())
    }

    pub fn has_pending_switch(&self) -> bool {
        self.current.id != self.previous.id
    }

    pub fn acknowledge_switch(&mut self) {
        self.previous = self.current;
    }

    /// Tuning to send with a request; `None` for families that take none.
    pub fn tuning_for(&self, family: ProviderFamily) -> Option<Tuning> {
        if family.supports_tuning() {
            self.tuning.get(&family).copied()
        } else {
            None
        }
    }

    /// Adjusts tuning for the current provider's family.
    pub fn set_tuning(&mut self, field: TuningField, value: f32) -> Result<Tuning, ChatError> {
        let family = self.current.family;
        if !family.supports_tuning() {
            return Err(ChatError::Tuning(format!(
                "{} models do not accept tuning parameters",
                self.current.label
            )));
        }
        let tuning = self.tuning.entry(family).or_default();
        tuning.set(field, value)?;
        Ok(*tuning)
    }
}
