use crate::core::config::data::Config;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::SystemTime;

#[derive(Default)]
pub(crate) struct ConfigCacheState {
    config: Option<Config>,
    modified: Option<SystemTime>,
}

/// Caches the parsed config and reloads it when the file changes on disk.
pub(crate) struct ConfigOrchestrator {
    path: PathBuf,
    state: Mutex<ConfigCacheState>,
}

pub(crate) static CONFIG_ORCHESTRATOR: LazyLock<ConfigOrchestrator> =
    LazyLock::new(|| ConfigOrchestrator::new(Config::get_config_path()));

#[cfg(test)]
pub(crate) static TEST_ORCHESTRATOR: LazyLock<Mutex<Option<ConfigOrchestrator>>> =
    LazyLock::new(|| Mutex::new(None));

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ConfigOrchestrator {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(ConfigCacheState::default()),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn load_with_cache(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut state = lock(&self.state);
        self.refresh(&mut state)?;
        Ok(state.config.clone().unwrap_or_default())
    }

    pub(crate) fn mutate<F, T>(&self, mutator: F) -> Result<T, Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn std::error::Error>>,
    {
        let mut state = lock(&self.state);
        self.refresh(&mut state)?;
        let mut working = state.config.clone().unwrap_or_default();
        let result = mutator(&mut working)?;
        working.save_to_path(&self.path)?;
        state.modified = Self::modified_time(&self.path);
        state.config = Some(working);
        Ok(result)
    }

    fn refresh(&self, state: &mut ConfigCacheState) -> Result<(), Box<dyn std::error::Error>> {
        let disk_modified = Self::modified_time(&self.path);
        if state.config.is_none() || state.modified != disk_modified {
            let config = Config::load_from_path(&self.path)?;
            state.modified = disk_modified;
            state.config = Some(config);
        }
        Ok(())
    }

    fn modified_time(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).ok()?.modified().ok()
    }
}

impl Config {
    #[cfg(not(test))]
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        CONFIG_ORCHESTRATOR.load_with_cache()
    }

    #[cfg(test)]
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        match lock(&TEST_ORCHESTRATOR).as_ref() {
            Some(orchestrator) => orchestrator.load_with_cache(),
            None => Ok(Config::default()),
        }
    }

    /// Load, modify and persist the config in one step.
    #[cfg(not(test))]
    pub fn mutate<F, T>(mutator: F) -> Result<T, Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn std::error::Error>>,
    {
        CONFIG_ORCHESTRATOR.mutate(mutator)
    }

    #[cfg(test)]
    pub fn mutate<F, T>(mutator: F) -> Result<T, Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn std::error::Error>>,
    {
        if let Some(orchestrator) = lock(&TEST_ORCHESTRATOR).as_ref() {
            orchestrator.mutate(mutator)
        } else {
            let mut config = Config::default();
            mutator(&mut config)
        }
    }

    #[cfg(not(test))]
    pub fn config_path() -> PathBuf {
        CONFIG_ORCHESTRATOR.path().to_path_buf()
    }

    #[cfg(test)]
    pub fn config_path() -> PathBuf {
        lock(&TEST_ORCHESTRATOR)
            .as_ref()
            .map(|orchestrator| orchestrator.path().to_path_buf())
            .unwrap_or_else(Config::get_config_path)
    }

    #[cfg(test)]
    pub(crate) fn set_test_config_path(path: PathBuf) {
        *lock(&TEST_ORCHESTRATOR) = Some(ConfigOrchestrator::new(path));
    }

    #[cfg(test)]
    pub(crate) fn clear_test_config_override() {
        lock(&TEST_ORCHESTRATOR).take();
    }
}
