//! Ordered step registry
//!
//! The registry is the single place steps are looked up. All navigation goes
//! through [`StepRegistry::resolve`], which accepts an index, an id or a
//! handle via [`StepRef`].

use crate::step::StepHandle;

/// A reference to a step: by position, by id, or by handle
#[derive(Clone, Copy, Debug)]
pub enum StepRef<'a> {
    /// Zero-based position; negative values count from the end
    Index(isize),
    /// First step with this id
    Id(&'a str),
    /// This exact step, if it is registered
    Step(&'a StepHandle),
}

impl From<isize> for StepRef<'_> {
    fn from(index: isize) -> Self {
        StepRef::Index(index)
    }
}

impl From<i32> for StepRef<'_> {
    fn from(index: i32) -> Self {
        StepRef::Index(index as isize)
    }
}

impl From<usize> for StepRef<'_> {
    fn from(index: usize) -> Self {
        // Indices past isize::MAX can never resolve anyway
        StepRef::Index(isize::try_from(index).unwrap_or(isize::MAX))
    }
}

impl<'a> From<&'a str> for StepRef<'a> {
    fn from(id: &'a str) -> Self {
        StepRef::Id(id)
    }
}

impl<'a> From<&'a String> for StepRef<'a> {
    fn from(id: &'a String) -> Self {
        StepRef::Id(id.as_str())
    }
}

impl<'a> From<&'a StepHandle> for StepRef<'a> {
    fn from(step: &'a StepHandle) -> Self {
        StepRef::Step(step)
    }
}

/// What [`StepRegistry::add`] did with a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Added {
    /// Appended to an empty registry
    First,
    /// Appended after existing steps
    Appended,
    /// The handle was already registered; nothing changed
    AlreadyRegistered,
}

/// Steps in presentation order
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Vec<StepHandle>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    ///
    /// Adding a handle that is already registered does nothing. Duplicate ids
    /// are allowed.
    pub fn add(&mut self, step: StepHandle) -> Added {
        if self.contains(&step) {
            tracing::warn!("step '{}' is already registered, ignoring", step.id());
            return Added::AlreadyRegistered;
        }
        self.steps.push(step);
        if self.steps.len() == 1 {
            Added::First
        } else {
            Added::Appended
        }
    }

    /// Remove a step, returning it if it was registered
    pub fn remove(&mut self, step: StepRef<'_>) -> Option<StepHandle> {
        let index = self.position(step)?;
        Some(self.steps.remove(index))
    }

    /// Look up a step
    pub fn resolve(&self, step: StepRef<'_>) -> Option<StepHandle> {
        self.position(step).map(|index| self.steps[index].clone())
    }

    /// Registry position of a step
    pub fn position(&self, step: StepRef<'_>) -> Option<usize> {
        match step {
            StepRef::Index(index) => {
                let len = self.steps.len() as isize;
                let index = if index < 0 { len + index } else { index };
                (0..len).contains(&index).then_some(index as usize)
            }
            StepRef::Id(id) => self.steps.iter().position(|s| s.has_id(id)),
            StepRef::Step(handle) => self.index_of(handle),
        }
    }

    pub fn index_of(&self, step: &StepHandle) -> Option<usize> {
        self.steps.iter().position(|s| s.ptr_eq(step))
    }

    pub fn contains(&self, step: &StepHandle) -> bool {
        self.index_of(step).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&StepHandle> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepHandle> {
        self.steps.iter()
    }

    /// Read-only view in registry order
    pub fn as_slice(&self) -> &[StepHandle] {
        &self.steps
    }

    /// Stable sort by each step's `order`
    pub fn sort_by_order(&mut self) {
        self.steps.sort_by_key(|s| s.get().order);
    }
}
