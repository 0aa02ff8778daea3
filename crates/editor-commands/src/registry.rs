//! Command Registry
//!
//! An arena of [`CommandDescriptor`]s keyed by name, with a chord index per platform.
//!
//! - Registration order is kept and is the order of [`CommandRegistry::iter`] and of chord
//!   candidates.
//! - Registering an existing name swaps the `Arc` in its slot: readers see either the old or the
//!   new descriptor, never a mix, and the slot keeps its original position.
//! - Malformed bindings never block registration. They are logged and kept in
//!   [`CommandRegistry::binding_diagnostics`].

use crate::chord::{Chord, KeySequence, MalformedBindingError, Platform};
use crate::descriptor::CommandDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Registry lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No command with this name is registered.
    #[error("command `{0}` is not registered")]
    NotFound(String),
}

/// A table of named commands.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    entries: Vec<Arc<CommandDescriptor>>,
    by_name: HashMap<String, usize>,
    chord_index: HashMap<(Platform, Chord), Vec<usize>>,
    diagnostics: Vec<(String, MalformedBindingError)>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor, or replace the one registered under the same name.
    ///
    /// Returns the replaced descriptor, if any.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Option<Arc<CommandDescriptor>> {
        let name = descriptor.name().to_string();

        self.diagnostics.retain(|(owner, _)| *owner != name);
        for error in descriptor.binding_errors() {
            tracing::warn!(command = %name, %error, "ignoring malformed key binding");
            self.diagnostics.push((name.clone(), error.clone()));
        }

        let descriptor = Arc::new(descriptor);
        match self.by_name.get(&name) {
            Some(&slot) => {
                tracing::debug!(command = %name, slot, "replacing command");
                let previous = std::mem::replace(&mut self.entries[slot], descriptor);
                self.rebuild_chord_index();
                Some(previous)
            }
            None => {
                let slot = self.entries.len();
                self.index_chords(slot, &descriptor);
                self.entries.push(descriptor);
                self.by_name.insert(name, slot);
                None
            }
        }
    }

    /// Remove a command. Later commands keep their relative order.
    pub fn remove(&mut self, name: &str) -> Option<Arc<CommandDescriptor>> {
        let slot = self.by_name.remove(name)?;
        let removed = self.entries.remove(slot);
        for index in self.by_name.values_mut() {
            if *index > slot {
                *index -= 1;
            }
        }
        self.diagnostics.retain(|(owner, _)| owner != name);
        self.rebuild_chord_index();
        Some(removed)
    }

    /// Look up a command by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<CommandDescriptor>, RegistryError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Borrow a command by name.
    pub fn get(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.by_name.get(name).map(|&slot| &self.entries[slot])
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Commands bound to the single-stroke `chord` on `platform`, in registration order.
    ///
    /// Several commands may share a chord; choosing between them is left to the caller.
    pub fn resolve_by_chord(&self, chord: &Chord, platform: Platform) -> Vec<Arc<CommandDescriptor>> {
        self.chord_index
            .get(&(platform, *chord))
            .map(|slots| slots.iter().map(|&slot| self.entries[slot].clone()).collect())
            .unwrap_or_default()
    }

    /// Commands bound to the full multi-stroke `sequence` on `platform`, in registration order.
    pub fn resolve_sequence(
        &self,
        sequence: &KeySequence,
        platform: Platform,
    ) -> Vec<Arc<CommandDescriptor>> {
        self.entries
            .iter()
            .filter(|descriptor| descriptor.binding().matches_sequence(sequence, platform))
            .cloned()
            .collect()
    }

    /// All commands, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.entries.iter()
    }

    /// Commands accepted by `filter`, in registration order.
    pub fn enumerate<'a, F>(&'a self, filter: F) -> impl Iterator<Item = &'a Arc<CommandDescriptor>>
    where
        F: Fn(&CommandDescriptor) -> bool + 'a,
    {
        self.entries.iter().filter(move |descriptor| filter(descriptor))
    }

    /// Command names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|descriptor| descriptor.name())
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Malformed bindings seen by [`register`](Self::register), with their command names.
    pub fn binding_diagnostics(&self) -> &[(String, MalformedBindingError)] {
        &self.diagnostics
    }

    fn index_chords(&mut self, slot: usize, descriptor: &CommandDescriptor) {
        for platform in Platform::ALL {
            for sequence in descriptor.binding().for_platform(platform) {
                if let Some(chord) = sequence.as_single() {
                    self.chord_index
                        .entry((platform, *chord))
                        .or_default()
                        .push(slot);
                }
            }
        }
    }

    fn rebuild_chord_index(&mut self) {
        self.chord_index.clear();
        let entries = std::mem::take(&mut self.entries);
        for (slot, descriptor) in entries.iter().enumerate() {
            self.index_chords(slot, descriptor);
        }
        self.entries = entries;
    }
}

impl Extend<CommandDescriptor> for CommandRegistry {
    fn extend<T: IntoIterator<Item = CommandDescriptor>>(&mut self, iter: T) {
        for descriptor in iter {
            self.register(descriptor);
        }
    }
}

impl FromIterator<CommandDescriptor> for CommandRegistry {
    fn from_iter<T: IntoIterator<Item = CommandDescriptor>>(iter: T) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.entries.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
