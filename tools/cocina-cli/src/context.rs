//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use cocina_cache::{Cache, SessionId, Sessions};
use cocina_commerce::persist::{cart_key, open_store, CartPersistence};
use cocina_commerce::{CartUi, Storefront};

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (CliConfig::load(&path)?, Some(path))
            }
            None => match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "loaded config");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    match CliConfig::load(&config_path) {
                        Ok(config) => return Some((config, config_path)),
                        Err(e) => {
                            tracing::warn!(
                                path = %config_path.display(),
                                error = %e,
                                "skipping config"
                            );
                        }
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Directory holding stored carts and sessions.
    pub fn storage_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.dir)
    }

    /// Open the on-disk cache.
    pub fn open_cache(&self) -> Result<Cache> {
        let dir = self.storage_dir();
        Cache::open_dir(&dir)
            .with_context(|| format!("Failed to open storage at {}", dir.display()))
    }

    /// Session store backed by the on-disk cache.
    pub fn sessions(&self) -> Result<Sessions> {
        Ok(Sessions::new(self.open_cache()?))
    }

    /// Session the cart belongs to: the pinned one from config, otherwise the
    /// current session, started on first use.
    pub fn session(&self) -> Result<SessionId> {
        if let Some(pinned) = &self.config.storage.session {
            return Ok(SessionId::new(pinned.as_str()));
        }
        self.sessions()?
            .current_or_start()
            .context("Failed to read current session")
    }

    /// Restore the session cart and keep it saved while the handle lives.
    pub fn open_cart(&self) -> Result<CartSession> {
        let cache = self.open_cache()?;
        let session = self.session()?;
        let key = cart_key(&self.config.store, &session);

        let store = Arc::new(open_store(&cache, &key, &self.config.store));
        let persistence = CartPersistence::attach(&store, cache, key)
            .context("Failed to start cart persistence")?;
        let storefront = Storefront::new(store, Arc::new(CartUi::new()), self.config.ui.clone());

        self.output.debug(&format!("Session {}", session));

        Ok(CartSession {
            session,
            storefront,
            persistence,
        })
    }
}

/// A storefront whose cart is saved to the session's storage.
pub struct CartSession {
    pub session: SessionId,
    pub storefront: Storefront,
    persistence: CartPersistence,
}

impl CartSession {
    /// Wait until every change so far is on disk.
    pub fn flush(&self) {
        self.persistence.flush();
    }
}
