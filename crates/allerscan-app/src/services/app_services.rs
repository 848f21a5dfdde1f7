// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — wires configuration, durable session storage, the
// HTTP gateway, the platform bridge and the webview camera together for the
// Dioxus UI.
//
// The controller holds `&mut` state across awaits, so it sits behind a
// `tokio::sync::Mutex`; every UI action locks it, runs, and publishes a
// snapshot of `AppState` back into the page signal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use allerscan_api::{ApiClient, KeyValueStore, MemoryStore, SessionStore, SqliteStore};
use allerscan_bridge::traits::PlatformBridge;
use allerscan_core::config::AppConfig;
use allerscan_core::error::Result;
use allerscan_flow::Session;
use tracing::{debug, info, warn};

use super::data_dir;
use super::webview_camera::WebviewCamera;

const CONFIG_FILE: &str = "config.json";
const SESSION_DB: &str = "session.db";

/// The session controller as the app runs it: over the real HTTP gateway.
pub type AppSession = Session<ApiClient>;

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// All fields are Arc-wrapped so the struct can be moved into event handlers
/// and spawned tasks.
#[derive(Clone)]
pub struct AppServices {
    session: Arc<tokio::sync::Mutex<AppSession>>,
    bridge: Arc<dyn PlatformBridge>,
    camera: Arc<WebviewCamera>,
    config: Arc<AppConfig>,
    data_dir: PathBuf,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    ///
    /// Loads (or seeds) `config.json` and opens the SQLite session store in
    /// the data directory.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");

        let config = load_or_seed_config(&dir);
        let store = SqliteStore::open(dir.join(SESSION_DB))?;

        Ok(Self::assemble(Arc::new(store), config, dir))
    }

    /// Services backed by an in-memory session store, for when the data
    /// directory is unusable. Sign-in lasts only for this run.
    pub fn fallback() -> Self {
        let dir = data_dir::data_dir();
        let config = load_config(&dir).unwrap_or_default().with_env_overrides();
        Self::assemble(Arc::new(MemoryStore::new()), config, dir)
    }

    fn assemble(kv: Arc<dyn KeyValueStore>, config: AppConfig, dir: PathBuf) -> Self {
        let store = Arc::new(SessionStore::new(kv));
        match store.client_id() {
            Ok(id) => debug!(client_id = %id, "client id ready"),
            Err(e) => warn!(error = %e, "could not read or create client id"),
        }

        let client = Arc::new(ApiClient::new(config.clone(), Arc::clone(&store)));
        let bridge: Arc<dyn PlatformBridge> = Arc::from(allerscan_bridge::platform_bridge());
        info!(
            server = %config.server_url,
            platform = bridge.platform_name(),
            "app services initialised"
        );

        Self {
            session: Arc::new(tokio::sync::Mutex::new(Session::new(
                client,
                store,
                config.clone(),
            ))),
            bridge,
            camera: Arc::new(WebviewCamera::new(config.jpeg_quality)),
            config: Arc::new(config),
            data_dir: dir,
        }
    }

    pub fn session(&self) -> Arc<tokio::sync::Mutex<AppSession>> {
        Arc::clone(&self.session)
    }

    pub fn bridge(&self) -> &dyn PlatformBridge {
        self.bridge.as_ref()
    }

    pub fn camera(&self) -> &WebviewCamera {
        &self.camera
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Read `config.json`, writing the defaults out on first run, then apply the
/// environment override. The override is never written back.
fn load_or_seed_config(data_dir: &Path) -> AppConfig {
    let config = match load_config(data_dir) {
        Some(config) => config,
        None => {
            let config = AppConfig::default();
            if let Err(e) = persist_config(data_dir, &config) {
                warn!(error = %e, "could not write default config");
            }
            config
        }
    };
    config.with_env_overrides()
}

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_core::config::NutritionBackfill;

    #[test]
    fn first_run_seeds_default_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_config(dir.path()).is_none());

        load_or_seed_config(dir.path());
        let seeded = load_config(dir.path()).expect("config written");
        assert_eq!(seeded, AppConfig::default());
    }

    #[test]
    fn persisted_config_is_read_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            splash_delay_ms: 0,
            nutrition_backfill: NutritionBackfill::Unknown,
            ..AppConfig::default()
        };
        persist_config(dir.path(), &config).expect("persist");
        assert_eq!(load_config(dir.path()), Some(config));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"jpeg_quality": 75}"#)
            .expect("write");
        let config = load_config(dir.path()).expect("config");
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.api_prefix, "/api/v1");
    }

    #[test]
    fn garbage_config_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "not json").expect("write");
        assert!(load_config(dir.path()).is_none());
    }
}
