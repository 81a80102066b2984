use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use super::model::{Model, ModelError};

/// Lightweight reference to a model owned by a [`ModelRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(usize);

/// Owns every imported model, keyed by the path it was loaded from.
///
/// Game objects hold [`ModelHandle`]s instead of the models themselves, so
/// several objects can draw the same asset. A model stays loaded until
/// [`ModelRegistry::prune`] finds no object referencing it; handles to a
/// pruned model resolve to `None`.
#[derive(Default)]
pub struct ModelRegistry {
    slots: Vec<Option<Model>>,
    by_path: HashMap<PathBuf, ModelHandle>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path`, or returns the existing handle if it is already loaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<ModelHandle, ModelError> {
        let path = path.as_ref();
        if let Some(&handle) = self.by_path.get(path) {
            log::debug!("'{}' already loaded", path.display());
            return Ok(handle);
        }

        let model = Model::load(path)?;
        Ok(self.insert(path.to_path_buf(), model))
    }

    fn insert(&mut self, path: PathBuf, model: Model) -> ModelHandle {
        let handle = ModelHandle(self.slots.len());
        self.slots.push(Some(model));
        self.by_path.insert(path, handle);
        handle
    }

    pub fn get(&self, handle: ModelHandle) -> Option<&Model> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: ModelHandle) -> Option<&mut Model> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Number of models currently loaded.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelHandle, &Model)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|m| (ModelHandle(i), m)))
    }

    /// Drops every model whose handle is not in `referenced`. Returns how
    /// many were dropped.
    pub fn prune(&mut self, referenced: impl IntoIterator<Item = ModelHandle>) -> usize {
        let keep: HashSet<ModelHandle> = referenced.into_iter().collect();
        let mut dropped = 0;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_some() && !keep.contains(&ModelHandle(i)) {
                if let Some(model) = slot.take() {
                    log::info!("Unloaded model '{}'", model.path().display());
                }
                dropped += 1;
            }
        }
        self.by_path.retain(|_, handle| keep.contains(handle));

        dropped
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_layout: &wgpu::BindGroupLayout,
    ) {
        for model in self.slots.iter_mut().flatten() {
            model.init_gpu_resources(device, queue, texture_layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn same_path_shares_one_model() {
        let mut registry = ModelRegistry::new();
        let a = registry.load(fixture("triangle.obj")).unwrap();
        let b = registry.load(fixture("triangle.obj")).unwrap();
        let c = registry.load(fixture("crates.obj")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn failed_load_registers_nothing() {
        let mut registry = ModelRegistry::new();
        assert!(registry.load(fixture("missing.obj")).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn prune_drops_unreferenced_models() {
        let mut registry = ModelRegistry::new();
        let keep = registry.load(fixture("triangle.obj")).unwrap();
        let drop = registry.load(fixture("crates.obj")).unwrap();

        assert_eq!(registry.prune([keep]), 1);
        assert!(registry.get(keep).is_some());
        assert!(registry.get(drop).is_none());
        assert_eq!(registry.iter().count(), 1);

        // Reloading a pruned path imports it again under a fresh handle.
        let again = registry.load(fixture("crates.obj")).unwrap();
        assert_ne!(again, drop);
        assert!(registry.get(again).is_some());
    }
}
