// ABOUTME: Lazy, single-flight identity provisioning for a client instance.
// ABOUTME: Generates a key at most once when the config carries none, then reuses it.

use crate::config::ConnectionConfig;
use crate::error::{Result, SnipsError};
use snips_ssh::KeyGenerator;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Supplies the identity every session of one client authenticates with.
///
/// If the base config already carries a key it is used as is. Otherwise the
/// first caller generates one; concurrent callers wait for that same
/// generation instead of starting their own. A failed generation leaves
/// nothing cached, so the next call tries again.
pub struct KeyProvisioner {
    base: Arc<ConnectionConfig>,
    generator: Arc<dyn KeyGenerator>,
    provisioned: OnceCell<Arc<ConnectionConfig>>,
}

impl KeyProvisioner {
    pub fn new(base: ConnectionConfig, generator: Arc<dyn KeyGenerator>) -> Self {
        Self {
            base: Arc::new(base),
            generator,
            provisioned: OnceCell::new(),
        }
    }

    /// Config with a private key filled in.
    pub async fn ensure_identity(&self) -> Result<Arc<ConnectionConfig>> {
        if self.base.private_key.is_some() {
            return Ok(Arc::clone(&self.base));
        }

        let provisioned = self
            .provisioned
            .get_or_try_init(|| async {
                let generator = Arc::clone(&self.generator);
                // RSA prime search is CPU bound, so it is the one step that runs
                // on the blocking pool; every network exchange stays on the task.
                let pem = tokio::task::spawn_blocking(move || generator.generate())
                    .await
                    .map_err(|e| SnipsError::Provisioning(e.to_string()))??;

                info!(host = %self.base.host, "Generated ephemeral identity");
                Ok::<_, SnipsError>(Arc::new(ConnectionConfig {
                    private_key: Some(pem),
                    ..(*self.base).clone()
                }))
            })
            .await?;

        Ok(Arc::clone(provisioned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Hands out numbered fake keys and counts how often it ran.
    struct CountingGenerator {
        calls: AtomicUsize,
        fail_first: bool,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: false,
            }
        }
    }

    impl KeyGenerator for CountingGenerator {
        fn generate(&self) -> snips_ssh::Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            // Widen the race window for concurrent callers.
            std::thread::sleep(Duration::from_millis(50));
            if self.fail_first && n == 0 {
                return Err(snips_ssh::SshError::SerializeKey("boom".to_string()));
            }
            Ok(format!("KEY-{n}"))
        }
    }

    #[tokio::test]
    async fn test_configured_key_is_used_unchanged() {
        let generator = Arc::new(CountingGenerator::new());
        let base = ConnectionConfig::default().with_private_key("MINE");
        let provisioner = KeyProvisioner::new(base.clone(), generator.clone());

        let config = provisioner.ensure_identity().await.unwrap();

        assert_eq!(*config, base);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generates_once_and_reuses() {
        let generator = Arc::new(CountingGenerator::new());
        let provisioner = KeyProvisioner::new(ConnectionConfig::default(), generator.clone());

        let first = provisioner.ensure_identity().await.unwrap();
        let second = provisioner.ensure_identity().await.unwrap();

        assert_eq!(first.private_key.as_deref(), Some("KEY-0"));
        assert_eq!(first, second);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.host, "snips.sh");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_generation() {
        let generator = Arc::new(CountingGenerator::new());
        let provisioner = Arc::new(KeyProvisioner::new(
            ConnectionConfig::default(),
            generator.clone(),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let provisioner = Arc::clone(&provisioner);
                tokio::spawn(async move { provisioner.ensure_identity().await })
            })
            .collect();

        for task in tasks {
            let config = task.await.unwrap().unwrap();
            assert_eq!(config.private_key.as_deref(), Some("KEY-0"));
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_generation_can_be_retried() {
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail_first: true,
        });
        let provisioner = KeyProvisioner::new(ConnectionConfig::default(), generator.clone());

        let err = provisioner.ensure_identity().await.unwrap_err();
        assert!(matches!(err, SnipsError::Key(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        let config = provisioner.ensure_identity().await.unwrap();
        assert_eq!(config.private_key.as_deref(), Some("KEY-1"));
    }
}
