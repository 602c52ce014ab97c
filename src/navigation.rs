//! Screens, the services menu and the persisted last-screen flag

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Top-level screens of the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    #[default]
    Splash,
    Login,
    Register,
    ForgotPassword,
    Chat,
    Menu,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Splash => "splash",
            Screen::Login => "login",
            Screen::Register => "register",
            Screen::ForgotPassword => "forgot-password",
            Screen::Chat => "chat",
            Screen::Menu => "menu",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown screen: {0}")]
pub struct UnknownScreen(String);

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "splash" => Ok(Screen::Splash),
            "login" => Ok(Screen::Login),
            "register" => Ok(Screen::Register),
            "forgot-password" => Ok(Screen::ForgotPassword),
            "chat" => Ok(Screen::Chat),
            "menu" => Ok(Screen::Menu),
            other => Err(UnknownScreen(other.to_string())),
        }
    }
}

/// What the chat should open with when the hosting screen mounts it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Certificates,
    ProtocolLookup,
    ContactRequest,
}

// ============================================================================
// Services menu
// ============================================================================

/// A tile on the services menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub title: &'static str,
    pub description: &'static str,
    /// `None` for services that are not offered yet
    pub action: Option<ChatAction>,
}

pub const MENU_ENTRIES: &[MenuEntry] = &[
    MenuEntry {
        title: "Certificados",
        description: "AVCB, CLCB e outros documentos",
        action: Some(ChatAction::Certificates),
    },
    MenuEntry {
        title: "Consultar Protocolo",
        description: "Acompanhe sua solicitação",
        action: Some(ChatAction::ProtocolLookup),
    },
    MenuEntry {
        title: "Histórico",
        description: "Veja suas solicitações anteriores",
        action: None,
    },
    MenuEntry {
        title: "Unidades",
        description: "Encontre o posto mais próximo",
        action: None,
    },
    MenuEntry {
        title: "Emergência",
        description: "Informações de segurança",
        action: None,
    },
    MenuEntry {
        title: "Contato",
        description: "Fale conosco",
        action: Some(ChatAction::ContactRequest),
    },
];

pub const EMERGENCY_NUMBER: &str = "193";
pub const COMING_SOON: &str = "Em breve disponível.";

// ============================================================================
// Last-screen persistence
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Screen store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Screen store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Holds the single flag that survives a restart
pub trait ScreenStore: Send + Sync {
    fn load(&self) -> Result<Option<Screen>, StoreError>;
    fn save(&self, screen: Screen) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ScreenFile {
    last_screen: Screen,
}

/// JSON file under the state directory
#[derive(Debug, Clone)]
pub struct FileScreenStore {
    path: PathBuf,
}

impl FileScreenStore {
    pub const FILE_NAME: &'static str = "last_screen.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }
}

impl ScreenStore for FileScreenStore {
    fn load(&self) -> Result<Option<Screen>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: ScreenFile = serde_json::from_str(&raw)?;
        Ok(Some(file.last_screen))
    }

    fn save(&self, screen: Screen) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(&ScreenFile {
            last_screen: screen,
        })?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Keeps the flag in memory only
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryScreenStore {
    last: Mutex<Option<Screen>>,
}

#[cfg(test)]
impl ScreenStore for MemoryScreenStore {
    fn load(&self) -> Result<Option<Screen>, StoreError> {
        Ok(*self.last.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, screen: Screen) -> Result<(), StoreError> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(screen);
        Ok(())
    }
}

// ============================================================================
// Navigator
// ============================================================================

/// Tracks the current screen and writes it through on every change
pub struct Navigator {
    current: Screen,
    store: Arc<dyn ScreenStore>,
}

impl Navigator {
    /// Starts on the stored screen, or the splash when there is none or it
    /// cannot be read.
    pub fn restore(store: Arc<dyn ScreenStore>) -> Self {
        let current = match store.load() {
            Ok(Some(screen)) => screen,
            Ok(None) => Screen::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read last screen, starting at splash");
                Screen::default()
            }
        };
        tracing::info!(screen = %current, "Initial screen");
        Self { current, store }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn navigate(&mut self, screen: Screen) {
        tracing::debug!(from = %self.current, to = %screen, "Navigate");
        self.current = screen;
        if let Err(e) = self.store.save(screen) {
            tracing::warn!(error = %e, screen = %screen, "Failed to persist last screen");
        }
    }
}
