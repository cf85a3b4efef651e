use super::credential;
use super::traits::CompletionProvider;
use super::types::ProviderDescriptor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One configured provider: its static description, its adapter, and whether
/// its credential has been rejected during this process run.
pub struct ProviderSlot {
    descriptor: ProviderDescriptor,
    adapter: Arc<dyn CompletionProvider>,
    revoked: AtomicBool,
}

impl ProviderSlot {
    pub fn new(descriptor: ProviderDescriptor, adapter: Arc<dyn CompletionProvider>) -> Self {
        Self {
            descriptor,
            adapter,
            revoked: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    pub fn adapter(&self) -> &dyn CompletionProvider {
        self.adapter.as_ref()
    }

    pub fn models(&self) -> &[String] {
        &self.descriptor.models
    }

    /// Re-evaluated on every call: the credential gate plus revocation.
    pub fn is_configured(&self) -> bool {
        !self.revoked.load(Ordering::Acquire) && credential::is_configured(&self.descriptor)
    }

    /// Mark the credential unusable for the rest of the process run.
    pub fn revoke(&self) {
        if !self.revoked.swap(true, Ordering::AcqRel) {
            tracing::warn!(
                provider = self.name(),
                "Credential rejected; provider disabled for this run"
            );
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }
}

/// Providers in configured preference order.
pub struct ProviderRegistry {
    slots: Vec<ProviderSlot>,
}

impl ProviderRegistry {
    pub fn new(slots: Vec<ProviderSlot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    pub fn get(&self, name: &str) -> Option<&ProviderSlot> {
        self.slots.iter().find(|slot| slot.name() == name)
    }

    pub fn configured(&self) -> impl Iterator<Item = &ProviderSlot> {
        self.slots.iter().filter(|slot| slot.is_configured())
    }

    pub fn any_configured(&self) -> bool {
        self.configured().next().is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.slots.iter().map(|slot| slot.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
