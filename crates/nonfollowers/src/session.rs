use crate::prelude::*;
use nonfollowers_core::instagram::SessionState;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Where authenticated session state lives between runs
///
/// Implementations only ever see the storage form of the state: internal-only
/// fields are stripped before `save` is called.
pub trait SessionStore {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<SessionState>>;

    fn save(&self, state: &SessionState) -> Result<()>;

    /// Short description used in log lines
    fn describe(&self) -> String;
}

/// JSON file backed session store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<cache dir>/nonfollowers/instagram-<username>.json`
    pub fn default_path(username: &str) -> Result<PathBuf> {
        let cache_dir = dirs_next::cache_dir()
            .ok_or_else(|| eyre!("Unable to determine cache directory"))?
            .join("nonfollowers");

        Ok(cache_dir.join(f!("instagram-{}.json", username.trim().to_lowercase())))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            Error::Session(f!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let state: SessionState = serde_json::from_str(&contents).map_err(|e| {
            Error::Session(f!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        Ok(Some(state))
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Session(f!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string(&state.for_storage())
            .map_err(|e| Error::Session(f!("Failed to serialize session: {}", e)))?;

        let write_err =
            |e: std::io::Error| Error::Session(f!("Failed to write {}: {}", self.path.display(), e));

        // The file holds a bearer token, keep it owner-only
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(write_err)?;

        // `mode` only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }

        file.write_all(json.as_bytes()).map_err(write_err)?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Session store that lives only for the current process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<Option<SessionState>>,
}

impl MemorySessionStore {
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// Current stored state, if any
    pub fn snapshot(&self) -> Option<SessionState> {
        self.state.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionState>> {
        let guard = self
            .state
            .lock()
            .map_err(|_| Error::Session("session store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| Error::Session("session store lock poisoned".to_string()))?;
        *guard = Some(state.for_storage());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory session".to_string()
    }
}
