//! Backend manager behavior

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::utils::*;
    use numlite::{
        AcceleratedBackend, Backend, BackendKind, BackendManager, BackendPreference,
        KernelLoader, KernelModule, ManagerConfig, NumliteError,
    };
    use numlite_accel::LoadFuture;
    use numlite_core::ops::{LinalgOps, MathOps, Operand, StatsOps};

    struct Unavailable(Arc<AtomicUsize>);

    impl KernelLoader for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn load(&self) -> LoadFuture<'_> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                Err::<Arc<dyn KernelModule>, _>(NumliteError::UninitializedModule(
                    "no kernel module in this environment".into(),
                ))
            })
        }
    }

    fn failing_manager() -> (BackendManager, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let manager = BackendManager::with_accelerated(
            ManagerConfig::default(),
            AcceleratedBackend::with_loader(Unavailable(attempts.clone())),
        );
        (manager, attempts)
    }

    #[test]
    fn test_uninitialized_accelerated_refuses_work() {
        let backend = AcceleratedBackend::new();
        assert!(!backend.is_ready());
        let a = arr(vec![1.0, 2.0]);
        assert_eq!(
            backend.add(&a, Operand::Scalar(1.0)).unwrap_err(),
            NumliteError::BackendNotReady("accelerated")
        );
        assert_eq!(
            backend.sum(&a).unwrap_err(),
            NumliteError::BackendNotReady("accelerated")
        );
    }

    #[test]
    fn test_default_manager_accelerates() {
        init_logger();
        let manager = BackendManager::default();
        let backend = pollster::block_on(manager.initialize());
        assert_eq!(backend.kind(), BackendKind::Accelerated);
        assert_eq!(backend.name(), "accelerated");
        assert_eq!(backend.sum(&arr(vec![1.0, 2.0, 3.0])).unwrap(), 6.0);
    }

    #[test]
    fn test_fallback_is_memoized() {
        init_logger();
        let (manager, attempts) = failing_manager();
        let first = pollster::block_on(manager.initialize());
        let second = pollster::block_on(manager.initialize());
        assert_eq!(first.kind(), BackendKind::Reference);
        assert_eq!(second.kind(), BackendKind::Reference);
        assert_eq!(manager.get_or_init().kind(), BackendKind::Reference);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fallback_still_computes() {
        let (manager, _) = failing_manager();
        let backend = manager.get_or_init();
        let a = mat(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_eq!(backend.det(&a).unwrap(), -2.0);
    }

    #[test]
    fn test_reinitialize_retries() {
        let (manager, attempts) = failing_manager();
        manager.initialize_blocking();
        pollster::block_on(manager.reinitialize());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_backend_requires_ready_variant() {
        let (manager, _) = failing_manager();
        manager.initialize_blocking();
        assert_eq!(
            manager.set_backend(BackendKind::Accelerated).unwrap_err(),
            NumliteError::BackendNotReady("accelerated")
        );
        assert_eq!(manager.active_kind(), BackendKind::Reference);
    }

    #[test]
    fn test_set_backend_switches_both_ways() {
        let manager = BackendManager::default();
        manager.initialize_blocking();
        manager.set_backend(BackendKind::Reference).unwrap();
        assert_eq!(manager.active_kind(), BackendKind::Reference);
        manager.set_backend(BackendKind::Accelerated).unwrap();
        assert_eq!(manager.active_kind(), BackendKind::Accelerated);
    }

    #[test]
    fn test_reference_preference_skips_loading() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let manager = BackendManager::with_accelerated(
            ManagerConfig::with_preference(BackendPreference::Reference),
            AcceleratedBackend::with_loader(Unavailable(attempts.clone())),
        );
        assert_eq!(manager.initialize_blocking().kind(), BackendKind::Reference);
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_backends_agree_through_manager() {
        let accelerated = BackendManager::default();
        let (fallback, _) = failing_manager();
        let a = arr(vec![0.5, 1.5, 2.5, 3.5]);
        let x = accelerated.initialize_blocking().exp(&a).unwrap();
        let r = fallback.initialize_blocking().exp(&a).unwrap();
        assert!(accelerated.config().tolerance().allclose(&x, &r));
    }
}
