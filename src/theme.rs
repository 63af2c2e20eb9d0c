//! Light/dark preference: startup resolution, document flag, persistence.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Storage key holding `"dark"` or `"light"`.
pub const THEME_KEY: &str = "theme";

/// Root class toggled for the dark variant.
pub const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        Self::from_dark(!self.is_dark())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents are not a JSON object: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// System color-scheme preference (`prefers-color-scheme`).
pub trait ColorSchemeQuery {
    fn prefers_dark(&self) -> Result<bool, StorageError>;
}

/// The document root whose class list selects the styling variant.
pub trait DocumentRoot {
    fn set_dark_class(&mut self, dark: bool);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value state persisted as a flat JSON object on disk.
///
/// A missing file reads as empty. Every `set` rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<serde_json::Map<String, serde_json::Value>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new());
            }
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Map::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.load()?;
        Ok(map.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = match self.load() {
            Ok(map) => map,
            Err(StorageError::Corrupt(err)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "overwriting unreadable state file"
                );
                serde_json::Map::new()
            }
            Err(err) => return Err(err),
        };
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

/// A preference that is known up front, or `None` when the host cannot tell.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedScheme(pub Option<bool>);

impl ColorSchemeQuery for FixedScheme {
    fn prefers_dark(&self) -> Result<bool, StorageError> {
        self.0.ok_or(StorageError::Unavailable)
    }
}

/// Root class list as the renderer will emit it. Clones share state, so a
/// caller can hand one to the controller and keep reading the other.
#[derive(Debug, Clone, Default)]
pub struct RootClass {
    classes: Rc<RefCell<Vec<String>>>,
}

impl RootClass {
    pub fn new(base: &[&str]) -> Self {
        Self {
            classes: Rc::new(RefCell::new(base.iter().map(|c| c.to_string()).collect())),
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    /// Space-separated `class` attribute value.
    pub fn value(&self) -> String {
        self.classes.borrow().join(" ")
    }
}

impl DocumentRoot for RootClass {
    fn set_dark_class(&mut self, dark: bool) {
        let mut classes = self.classes.borrow_mut();
        let present = classes.iter().any(|c| c == DARK_CLASS);
        if dark && !present {
            classes.push(DARK_CLASS.to_string());
        } else if !dark && present {
            classes.retain(|c| c != DARK_CLASS);
        }
    }
}

pub struct ThemeController<S, D> {
    theme: Theme,
    store: S,
    document: D,
}

impl<S: KeyValueStore, D: DocumentRoot> ThemeController<S, D> {
    /// Resolve the initial theme and apply it. Runs once per controller.
    pub fn start(store: S, scheme: &dyn ColorSchemeQuery, document: D) -> Self {
        let theme = initial_theme(&store, scheme);
        tracing::debug!(theme = theme.as_str(), "initial theme resolved");
        let mut controller = Self {
            theme,
            store,
            document,
        };
        controller.document.set_dark_class(theme.is_dark());
        controller.commit();
        controller
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn dark(&self) -> bool {
        self.theme.is_dark()
    }

    pub fn set_dark(&mut self, dark: bool) {
        self.theme = Theme::from_dark(dark);
        self.commit();
    }

    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.commit();
        self.theme
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    fn commit(&mut self) {
        self.document.set_dark_class(self.theme.is_dark());
        if let Err(err) = self.store.set(THEME_KEY, self.theme.as_str()) {
            tracing::warn!(error = %err, theme = self.theme.as_str(), "failed to persist theme");
        }
    }
}

/// Persisted value, then system preference, then light.
pub fn initial_theme(store: &dyn KeyValueStore, scheme: &dyn ColorSchemeQuery) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(saved)) if !saved.is_empty() => return Theme::from_dark(saved == "dark"),
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(error = %err, "persisted theme unreadable; using light");
            return Theme::Light;
        }
    }
    match scheme.prefers_dark() {
        Ok(dark) => Theme::from_dark(dark),
        Err(err) => {
            tracing::debug!(error = %err, "no system color preference");
            Theme::Light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct BrokenStore {
        readable: bool,
    }

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            if self.readable {
                Ok(None)
            } else {
                Err(StorageError::Unavailable)
            }
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn start(store: MemoryStore, scheme: Option<bool>) -> ThemeController<MemoryStore, RootClass> {
        ThemeController::start(store, &FixedScheme(scheme), RootClass::default())
    }

    #[test]
    fn system_preference_used_when_nothing_saved() {
        let c = start(MemoryStore::new(), Some(true));
        assert!(c.dark());
        assert_eq!(c.store().get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert!(c.document().contains("dark"));
    }

    #[test]
    fn saved_value_beats_system_preference() {
        let c = start(MemoryStore::with_entry(THEME_KEY, "light"), Some(true));
        assert!(!c.dark());
        assert!(!c.document().contains("dark"));

        let c = start(MemoryStore::with_entry(THEME_KEY, "dark"), Some(false));
        assert!(c.dark());
    }

    #[test]
    fn defaults_to_light() {
        let c = start(MemoryStore::new(), None);
        assert_eq!(c.theme(), Theme::Light);
        assert_eq!(c.store().get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn double_toggle_round_trips_and_persists() {
        for initial in [false, true] {
            let mut c = start(MemoryStore::new(), Some(initial));
            for _ in 0..2 {
                c.toggle();
                let saved = c.store().get(THEME_KEY).unwrap();
                assert_eq!(saved.as_deref(), Some(c.theme().as_str()));
                assert_eq!(c.document().contains("dark"), c.dark());
            }
            assert_eq!(c.dark(), initial);
        }
    }

    #[test]
    fn unreadable_store_falls_back_to_light() {
        let c = ThemeController::start(
            BrokenStore { readable: false },
            &FixedScheme(Some(true)),
            RootClass::default(),
        );
        assert!(!c.dark());
    }

    #[test]
    fn failed_write_still_updates_document() {
        let root = RootClass::new(&["scroll-smooth"]);
        let mut c = ThemeController::start(
            BrokenStore { readable: true },
            &FixedScheme(None),
            root.clone(),
        );
        assert_eq!(root.value(), "scroll-smooth");
        c.toggle();
        assert!(c.dark());
        assert_eq!(root.value(), "scroll-smooth dark");
    }

    #[test]
    fn json_file_store_persists_between_instances() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state/theme.json");

        let mut c = start_file(&path, Some(false));
        assert!(!c.dark());
        c.toggle();
        drop(c);

        let c = start_file(&path, Some(false));
        assert!(c.dark());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn corrupt_state_file_reads_as_light() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("theme.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.get(THEME_KEY).is_err());
        assert_eq!(initial_theme(&store, &FixedScheme(Some(true))), Theme::Light);
    }

    #[test]
    fn corrupt_state_file_is_rewritten_on_toggle() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("theme.json");
        std::fs::write(&path, "{oops").unwrap();

        let mut c = start_file(&path, Some(true));
        assert!(!c.dark());
        c.toggle();
        assert!(c.dark());
        assert_eq!(c.store().get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        drop(c);

        let c = start_file(&path, Some(false));
        assert!(c.dark());
    }

    #[test]
    fn set_dark_is_idempotent() {
        let root = RootClass::new(&["scroll-smooth"]);
        let mut c = ThemeController::start(MemoryStore::new(), &FixedScheme(None), root.clone());
        for _ in 0..2 {
            c.set_dark(true);
            assert!(c.dark());
            assert_eq!(root.value(), "scroll-smooth dark");
            assert_eq!(c.store().get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        }
        c.set_dark(false);
        assert_eq!(root.value(), "scroll-smooth");
        assert_eq!(c.store().get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    fn start_file(path: &Path, scheme: Option<bool>) -> ThemeController<JsonFileStore, RootClass> {
        ThemeController::start(JsonFileStore::new(path), &FixedScheme(scheme), RootClass::default())
    }
}
