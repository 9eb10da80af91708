use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use psra_config::{PsraConfig, StoreBackend};
use psra_dispatch::{DispatchService, open_backend};
use psra_relay::{NotificationRelay, SenderId, TransportKind};
use psra_store::KeyValueStore;

use crate::cli::GlobalFlags;

/// Extra wait past `relay.fallback_clear_ms` so the pending signal removal runs.
const SETTLE_MARGIN_MS: u64 = 20;

/// Load layered configuration, then apply `--store`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<PsraConfig> {
    let mut config = PsraConfig::load_with_dotenv().context("failed to load psra configuration")?;
    if let Some(path) = &flags.store {
        config.store.backend = StoreBackend::File;
        config.store.path.clone_from(path);
        config.validate()?;
    }
    if config.store.backend == StoreBackend::Memory {
        tracing::warn!("memory store selected; nothing will outlive this command");
    }
    Ok(config)
}

/// Shared resources for one command invocation.
pub struct AppContext {
    pub service: DispatchService,
    pub config: PsraConfig,
}

impl AppContext {
    /// Open the configured store and attach a notification relay to it.
    ///
    /// A relay that cannot be built is logged and skipped; commands still run.
    pub fn init(config: PsraConfig) -> anyhow::Result<Self> {
        let backend = open_backend(&config.store)
            .with_context(|| format!("failed to open store at '{}'", config.store.path))?;

        let mut service = DispatchService::from_config(Arc::clone(&backend), &config);
        match connect_relay(&config, backend) {
            Ok(relay) => service = service.with_relay(Arc::new(relay)),
            Err(error) => tracing::warn!(%error, "notifications disabled for this session"),
        }

        Ok(Self { service, config })
    }

    /// Let a posted store signal clear itself, then close the relay.
    pub async fn settle(&self) {
        let Some(relay) = self.service.relay() else {
            return;
        };
        if relay.transport_kind() == TransportKind::StoreSignal {
            let wait = self.config.relay.fallback_clear_ms + SETTLE_MARGIN_MS;
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }
        relay.close();
    }
}

fn connect_relay(
    config: &PsraConfig,
    backend: Arc<dyn KeyValueStore>,
) -> anyhow::Result<NotificationRelay> {
    let sender_id = SenderId::generate()?;
    let relay = NotificationRelay::connect(&config.relay, sender_id, None, Some(backend))?;
    Ok(relay)
}
