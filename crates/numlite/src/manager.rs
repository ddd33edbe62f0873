//! Backend selection
//!
//! A [`BackendManager`] owns both variants and decides which one operations
//! run on. Selection is attempted at most once: if the accelerated backend
//! fails to initialize, the reference backend is pinned and no retry happens
//! until [`BackendManager::reinitialize`] is called explicitly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use numlite_core::{Backend, BackendKind, NumliteError, Result};
use numlite_cpu::ReferenceBackend;

#[cfg(feature = "accelerated")]
use numlite_accel::AcceleratedBackend;

use crate::config::{BackendPreference, ManagerConfig};

pub struct BackendManager {
    config: ManagerConfig,
    reference: Arc<ReferenceBackend>,
    #[cfg(feature = "accelerated")]
    accelerated: Arc<AcceleratedBackend>,
    attempted: AtomicBool,
    active: RwLock<Arc<dyn Backend>>,
}

impl std::fmt::Debug for BackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendManager")
            .field("config", &self.config)
            .field("attempted", &self.attempted.load(Ordering::Acquire))
            .field("active", &self.active_kind())
            .finish()
    }
}

impl Default for BackendManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl BackendManager {
    /// Manager that starts on the reference backend; nothing is loaded
    /// until [`initialize`](Self::initialize).
    pub fn new(config: ManagerConfig) -> Self {
        #[cfg(feature = "accelerated")]
        {
            Self::with_accelerated(config, AcceleratedBackend::new())
        }
        #[cfg(not(feature = "accelerated"))]
        {
            let reference = Arc::new(ReferenceBackend::new());
            Self {
                config,
                active: RwLock::new(reference.clone()),
                reference,
                attempted: AtomicBool::new(false),
            }
        }
    }

    /// Manager driving a caller-supplied accelerated backend, e.g. one with
    /// a custom kernel loader.
    #[cfg(feature = "accelerated")]
    pub fn with_accelerated(config: ManagerConfig, accelerated: AcceleratedBackend) -> Self {
        let reference = Arc::new(ReferenceBackend::new());
        Self {
            config,
            active: RwLock::new(reference.clone()),
            reference,
            accelerated: Arc::new(accelerated),
            attempted: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Run backend selection once; later calls return the memoized choice.
    pub async fn initialize(&self) -> Arc<dyn Backend> {
        if self.attempted.swap(true, Ordering::AcqRel) {
            return self.backend();
        }
        self.select().await
    }

    /// [`initialize`](Self::initialize), driven to completion on this thread.
    pub fn initialize_blocking(&self) -> Arc<dyn Backend> {
        pollster::block_on(self.initialize())
    }

    /// Run selection again regardless of earlier attempts.
    pub async fn reinitialize(&self) -> Arc<dyn Backend> {
        self.attempted.store(true, Ordering::Release);
        log::debug!("re-running backend selection");
        self.select().await
    }

    /// The backend currently selected. Does not trigger initialization.
    pub fn backend(&self) -> Arc<dyn Backend> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The selected backend, running selection first if it never ran.
    pub fn get_or_init(&self) -> Arc<dyn Backend> {
        if self.attempted.load(Ordering::Acquire) {
            self.backend()
        } else {
            self.initialize_blocking()
        }
    }

    pub fn active_kind(&self) -> BackendKind {
        self.backend().kind()
    }

    /// Force a variant. The accelerated one must already be initialized.
    ///
    /// An override also counts as the selection attempt, so a later
    /// [`initialize`](Self::initialize) will not replace it.
    pub fn set_backend(&self, kind: BackendKind) -> Result<()> {
        let backend: Arc<dyn Backend> = match kind {
            BackendKind::Reference => self.reference.clone(),
            BackendKind::Accelerated => self.ready_accelerated()?,
        };
        self.attempted.store(true, Ordering::Release);
        log::debug!("backend overridden to {}", kind);
        self.activate(backend);
        Ok(())
    }

    #[cfg(feature = "accelerated")]
    fn ready_accelerated(&self) -> Result<Arc<dyn Backend>> {
        if self.accelerated.is_ready() {
            Ok(self.accelerated.clone())
        } else {
            Err(NumliteError::BackendNotReady("accelerated"))
        }
    }

    #[cfg(not(feature = "accelerated"))]
    fn ready_accelerated(&self) -> Result<Arc<dyn Backend>> {
        Err(NumliteError::BackendNotReady("accelerated"))
    }

    fn activate(&self, backend: Arc<dyn Backend>) {
        *self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = backend;
    }

    async fn select(&self) -> Arc<dyn Backend> {
        let backend: Arc<dyn Backend> = match self.config.preference {
            BackendPreference::Reference => self.reference.clone(),
            BackendPreference::Auto | BackendPreference::Accelerated => {
                self.try_accelerated().await
            }
        };
        log::info!("numlite using the {} backend", backend.name());
        self.activate(backend.clone());
        backend
    }

    #[cfg(feature = "accelerated")]
    async fn try_accelerated(&self) -> Arc<dyn Backend> {
        match self.accelerated.init().await {
            Ok(()) => self.accelerated.clone(),
            Err(e) => {
                log::log!(
                    self.config.preference.fallback_level(),
                    "accelerated backend unavailable, pinning reference: {}",
                    e
                );
                self.reference.clone()
            }
        }
    }

    #[cfg(not(feature = "accelerated"))]
    async fn try_accelerated(&self) -> Arc<dyn Backend> {
        if self.config.preference == BackendPreference::Accelerated {
            log::error!("built without the `accelerated` feature; using reference");
        }
        self.reference.clone()
    }
}

static MANAGER: OnceLock<BackendManager> = OnceLock::new();

/// The process-wide manager, configured from the environment on first use.
pub fn manager() -> &'static BackendManager {
    MANAGER.get_or_init(|| BackendManager::new(ManagerConfig::from_env()))
}

/// Current backend of the process-wide manager, selecting one on first use.
pub fn get_backend() -> Arc<dyn Backend> {
    manager().get_or_init()
}

pub fn set_backend(kind: BackendKind) -> Result<()> {
    manager().set_backend(kind)
}

pub async fn init_backend() -> Arc<dyn Backend> {
    manager().initialize().await
}

pub fn init_backend_blocking() -> Arc<dyn Backend> {
    manager().initialize_blocking()
}

pub async fn reinitialize() -> Arc<dyn Backend> {
    manager().reinitialize().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_starts_on_reference_without_loading() {
        let manager = BackendManager::default();
        assert_eq!(manager.active_kind(), BackendKind::Reference);
    }

    #[test]
    fn test_reference_preference_never_loads() {
        init_logger();
        let manager = BackendManager::new(ManagerConfig::with_preference(BackendPreference::Reference));
        let backend = manager.initialize_blocking();
        assert_eq!(backend.kind(), BackendKind::Reference);
        assert_eq!(
            manager.set_backend(BackendKind::Accelerated).unwrap_err(),
            NumliteError::BackendNotReady("accelerated")
        );
    }

    #[cfg(feature = "accelerated")]
    #[test]
    fn test_auto_selects_accelerated() {
        init_logger();
        let manager = BackendManager::default();
        let backend = manager.initialize_blocking();
        assert_eq!(backend.kind(), BackendKind::Accelerated);
        assert!(backend.is_ready());

        manager.set_backend(BackendKind::Reference).unwrap();
        assert_eq!(manager.active_kind(), BackendKind::Reference);
        // memoized: a second initialize keeps the override
        assert_eq!(manager.initialize_blocking().kind(), BackendKind::Reference);
        assert_eq!(pollster::block_on(manager.reinitialize()).kind(), BackendKind::Accelerated);
    }

    #[cfg(feature = "accelerated")]
    struct CountingFailure(Arc<std::sync::atomic::AtomicUsize>);

    #[cfg(feature = "accelerated")]
    impl numlite_accel::KernelLoader for CountingFailure {
        fn name(&self) -> &str {
            "counting-failure"
        }

        fn load(&self) -> numlite_accel::LoadFuture<'_> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(std::future::ready(Err::<Arc<dyn numlite_accel::KernelModule>, _>(
                NumliteError::UninitializedModule("missing".into()),
            )))
        }
    }

    #[cfg(feature = "accelerated")]
    #[test]
    fn test_failed_init_pins_reference() {
        use std::sync::atomic::AtomicUsize;

        init_logger();
        let attempts = Arc::new(AtomicUsize::new(0));
        let manager = BackendManager::with_accelerated(
            ManagerConfig::default(),
            AcceleratedBackend::with_loader(CountingFailure(attempts.clone())),
        );

        assert_eq!(manager.get_or_init().kind(), BackendKind::Reference);
        assert_eq!(manager.get_or_init().kind(), BackendKind::Reference);
        assert_eq!(manager.initialize_blocking().kind(), BackendKind::Reference);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        assert!(matches!(
            manager.set_backend(BackendKind::Accelerated),
            Err(NumliteError::BackendNotReady(_))
        ));

        pollster::block_on(manager.reinitialize());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[cfg(feature = "accelerated")]
    #[test]
    fn test_explicit_accelerated_preference_still_falls_back() {
        use std::sync::atomic::AtomicUsize;

        init_logger();
        let attempts = Arc::new(AtomicUsize::new(0));
        let manager = BackendManager::with_accelerated(
            ManagerConfig::with_preference(BackendPreference::Accelerated),
            AcceleratedBackend::with_loader(CountingFailure(attempts.clone())),
        );

        assert_eq!(manager.initialize_blocking().kind(), BackendKind::Reference);
        assert_eq!(manager.active_kind(), BackendKind::Reference);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
