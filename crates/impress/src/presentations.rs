//! Presentations keyed by root id
//!
//! Hosts usually run one presentation, but nothing stops a page from having
//! several. The registry hands out one [`Presentation`] per root id, creating
//! it on first request through a factory.

use crate::presentation::Presentation;
use rustc_hash::FxHashMap;

/// Root id used when the host does not name one
pub const DEFAULT_ROOT_ID: &str = "impress";

type Factory = Box<dyn Fn(&str) -> Presentation>;

/// One presentation per root id
pub struct PresentationRegistry {
    instances: FxHashMap<String, Presentation>,
    factory: Factory,
}

impl PresentationRegistry {
    /// Create a registry that builds missing presentations with `factory`
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Presentation + 'static,
    {
        Self {
            instances: FxHashMap::default(),
            factory: Box::new(factory),
        }
    }

    /// Presentation for `root_id`, created on first request
    pub fn presentation(&mut self, root_id: &str) -> Presentation {
        if let Some(existing) = self.instances.get(root_id) {
            return existing.clone();
        }
        let created = (self.factory)(root_id);
        tracing::debug!("presentation registry: created '{}'", root_id);
        self.instances.insert(root_id.to_string(), created.clone());
        created
    }

    /// Presentation for [`DEFAULT_ROOT_ID`]
    pub fn default_presentation(&mut self) -> Presentation {
        self.presentation(DEFAULT_ROOT_ID)
    }

    pub fn get(&self, root_id: &str) -> Option<Presentation> {
        self.instances.get(root_id).cloned()
    }

    /// Like [`presentation`](Self::presentation), with a one-off factory
    pub fn get_or_insert_with<F>(&mut self, root_id: &str, f: F) -> Presentation
    where
        F: FnOnce() -> Presentation,
    {
        self.instances
            .entry(root_id.to_string())
            .or_insert_with(f)
            .clone()
    }

    /// Drop the registry's reference to a presentation
    ///
    /// Outstanding handles keep working; pending timers are cancelled once
    /// the last handle is gone.
    pub fn remove(&mut self, root_id: &str) -> Option<Presentation> {
        self.instances.remove(root_id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Root ids, sorted
    pub fn root_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.instances.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for PresentationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationRegistry")
            .field("root_ids", &self.root_ids())
            .finish()
    }
}
