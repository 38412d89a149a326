//! Durable configuration: saved behaviors, saved banks, the two pointer tiers
//! and the helper-overlay flag, all kept in a flat string key-value backend.
//!
//! Backend failures never escape [`ConfigStore`]: they are logged and the
//! operation reports failure (`false` / `None`).

use crate::config::{BehaviorConfig, BehaviorKind};
use crate::error::{ConfigError, StoreError};
use crate::registry;
use fnv::FnvHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimal string key-value backend (`localStorage`, a JSON file, memory).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Process-local backend. `read_only` makes every write fail, which is how a
/// full or disabled browser storage behaves.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: FnvHashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Write {
                key: key.to_string(),
                reason: "store is read-only".into(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Write {
                key: key.to_string(),
                reason: "store is read-only".into(),
            });
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Behavior,
    Bank,
}

impl PointerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointerKind::Behavior => "behavior",
            PointerKind::Bank => "bank",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "behavior" => Some(PointerKind::Behavior),
            "bank" => Some(PointerKind::Bank),
            _ => None,
        }
    }
}

/// `{kind, name}` record naming what a tier activates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    pub kind: PointerKind,
    pub name: String,
}

impl Pointer {
    pub fn behavior(name: impl Into<String>) -> Self {
        Self {
            kind: PointerKind::Behavior,
            name: name.into(),
        }
    }

    pub fn bank(name: impl Into<String>) -> Self {
        Self {
            kind: PointerKind::Bank,
            name: name.into(),
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind.as_str(), self.name)
    }
}

/// The two pointer tiers. Scene-default is rewritten on every successful
/// load; default only changes on explicit request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Default,
    SceneDefault,
}

impl Tier {
    fn prefix(self) -> &'static str {
        match self {
            Tier::Default => "default",
            Tier::SceneDefault => "scene_default",
        }
    }
}

/// Export document; round-trips through [`ConfigStore::import_json`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behaviors: Option<BTreeMap<String, BehaviorConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banks: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<String>,
}

type BehaviorTable = BTreeMap<String, BehaviorConfig>;
type BankTable = BTreeMap<String, Vec<String>>;
type Entries = BTreeMap<String, serde_json::Value>;

const BEHAVIORS: &str = "behaviors";
const BANKS: &str = "banks";
const HELPERS: &str = "scene_default_helpers";

/// Namespaced configuration persistence over a [`KeyValueStore`].
pub struct ConfigStore<S> {
    backend: S,
    namespace: String,
}

impl<S: KeyValueStore> ConfigStore<S> {
    pub fn new(backend: S, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// [`ConfigStore::new`] plus first-run seeding of the built-in behaviors.
    pub fn open(backend: S, namespace: impl Into<String>) -> Self {
        let mut store = Self::new(backend, namespace);
        store.seed_builtins();
        store
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Full backend key for a namespaced suffix.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.namespace, suffix)
    }

    fn read_raw(&self, suffix: &str) -> Option<String> {
        let key = self.key(suffix);
        match self.backend.get(&key) {
            Ok(v) => v,
            Err(e) => {
                log::error!("read of `{key}` failed: {e}");
                None
            }
        }
    }

    fn write_raw(&mut self, suffix: &str, value: &str) -> bool {
        let key = self.key(suffix);
        match self.backend.set(&key, value) {
            Ok(()) => true,
            Err(e) => {
                log::error!("write of `{key}` failed: {e}");
                false
            }
        }
    }

    fn remove_raw(&mut self, suffix: &str) -> bool {
        let key = self.key(suffix);
        match self.backend.remove(&key) {
            Ok(()) => true,
            Err(e) => {
                log::error!("removal of `{key}` failed: {e}");
                false
            }
        }
    }

    /// Raw entries of a table. An absent table is empty; one that is not a
    /// JSON object is an error so callers never write over it.
    fn read_entries(&self, suffix: &str) -> Result<Entries, StoreError> {
        let Some(text) = self.read_raw(suffix) else {
            return Ok(Entries::new());
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
            key: self.key(suffix),
            source,
        })
    }

    /// Typed view of a table. Entries that do not parse are logged and
    /// skipped; they stay untouched in the backend.
    fn read_table<T: DeserializeOwned>(&self, suffix: &str) -> BTreeMap<String, T> {
        let entries = match self.read_entries(suffix) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("{e}; treating as empty");
                return BTreeMap::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|(name, value)| match serde_json::from_value(value) {
                Ok(entry) => Some((name, entry)),
                Err(e) => {
                    log::warn!("skipping unreadable entry `{name}` in `{}`: {e}", self.key(suffix));
                    None
                }
            })
            .collect()
    }

    fn put_table<T: Serialize>(&mut self, suffix: &str, table: &T) -> Result<(), StoreError> {
        let key = self.key(suffix);
        let text = serde_json::to_string(table).map_err(|e| StoreError::Write {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.backend.set(&key, &text)
    }

    fn write_table<T: Serialize>(&mut self, suffix: &str, table: &T) -> bool {
        match self.put_table(suffix, table) {
            Ok(()) => true,
            Err(e) => {
                log::error!("write of `{}` failed: {e}", self.key(suffix));
                false
            }
        }
    }

    /// Read-modify-write of one table. Refuses to write when the stored
    /// table is unreadable or `edit` returns `false`.
    fn edit_table(&mut self, suffix: &str, edit: impl FnOnce(&mut Entries) -> bool) -> bool {
        let mut entries = match self.read_entries(suffix) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("{e}; refusing to overwrite it");
                return false;
            }
        };
        edit(&mut entries) && self.write_table(suffix, &entries)
    }

    /// Save the built-in behaviors if the behavior table has never been written.
    /// Returns how many were seeded.
    pub fn seed_builtins(&mut self) -> usize {
        if self.read_raw(BEHAVIORS).is_some() {
            return 0;
        }
        let table: BehaviorTable = registry::SEEDED_NAMES
            .iter()
            .filter_map(|name| registry::preset(name).map(|cfg| (name.to_string(), cfg)))
            .collect();
        if self.write_table(BEHAVIORS, &table) {
            log::info!("seeded {} built-in behaviors", table.len());
            table.len()
        } else {
            0
        }
    }

    // Behaviors

    /// Store `config` under `name`, tagged with `kind` (or its own tag, or
    /// `default`). Overwrites an existing entry.
    pub fn save_behavior(&mut self, name: &str, config: &BehaviorConfig, kind: Option<BehaviorKind>) -> bool {
        let mut stored = config.clone();
        stored.behavior_type = Some(kind.or(config.behavior_type).unwrap_or(BehaviorKind::Default));
        let value = match serde_json::to_value(&stored) {
            Ok(value) => value,
            Err(e) => {
                log::error!("could not serialize behavior `{name}`: {e}");
                return false;
            }
        };
        let ok = self.edit_table(BEHAVIORS, |table| {
            table.insert(name.to_string(), value);
            true
        });
        if ok {
            log::info!("saved behavior `{name}`");
        }
        ok
    }

    pub fn load_behavior(&self, name: &str) -> Option<BehaviorConfig> {
        let mut table: BehaviorTable = self.read_table(BEHAVIORS);
        table.remove(name)
    }

    pub fn has_behavior(&self, name: &str) -> bool {
        self.read_table::<BehaviorConfig>(BEHAVIORS).contains_key(name)
    }

    pub fn delete_behavior(&mut self, name: &str) -> bool {
        self.edit_table(BEHAVIORS, |table| {
            let found = table.remove(name).is_some();
            if !found {
                log::warn!("behavior `{name}` not found");
            }
            found
        })
    }

    /// Saved behavior names, sorted.
    pub fn list_behaviors(&self) -> Vec<String> {
        self.read_table::<BehaviorConfig>(BEHAVIORS).into_keys().collect()
    }

    // Banks

    /// Store an ordered bank. Fails without writing if the list is empty or
    /// any member is not a saved behavior.
    pub fn save_bank<N: AsRef<str>>(&mut self, name: &str, members: &[N]) -> bool {
        if members.is_empty() {
            log::warn!("bank `{name}` has no members");
            return false;
        }
        let behaviors: BehaviorTable = self.read_table(BEHAVIORS);
        let missing: Vec<&str> = members
            .iter()
            .map(AsRef::as_ref)
            .filter(|m| !behaviors.contains_key(*m))
            .collect();
        if !missing.is_empty() {
            log::warn!("cannot save bank `{name}`, missing behaviors: {}", missing.join(", "));
            return false;
        }
        let list: Vec<serde_json::Value> = members
            .iter()
            .map(|m| serde_json::Value::from(m.as_ref()))
            .collect();
        let ok = self.edit_table(BANKS, |banks| {
            banks.insert(name.to_string(), serde_json::Value::Array(list));
            true
        });
        if ok {
            log::info!("saved bank `{name}` ({} behaviors)", members.len());
        }
        ok
    }

    pub fn load_bank(&self, name: &str) -> Option<Vec<String>> {
        let mut banks: BankTable = self.read_table(BANKS);
        banks.remove(name)
    }

    pub fn delete_bank(&mut self, name: &str) -> bool {
        self.edit_table(BANKS, |banks| {
            let found = banks.remove(name).is_some();
            if !found {
                log::warn!("bank `{name}` not found");
            }
            found
        })
    }

    pub fn list_banks(&self) -> Vec<String> {
        self.read_table::<Vec<String>>(BANKS).into_keys().collect()
    }

    // Pointers

    pub fn pointer(&self, tier: Tier) -> Option<Pointer> {
        let p = tier.prefix();
        let kind_text = self.read_raw(&format!("{p}_type"))?;
        let Some(kind) = PointerKind::parse(&kind_text) else {
            log::warn!("ignoring unknown {p} pointer type `{kind_text}`");
            return None;
        };
        let name = self.read_raw(&format!("{p}_{}", kind.as_str()))?;
        Some(Pointer { kind, name })
    }

    /// A type slot is stored for `tier`, whether or not it names anything
    /// readable.
    pub fn has_pointer_type(&self, tier: Tier) -> bool {
        self.read_raw(&format!("{}_type", tier.prefix())).is_some()
    }

    /// Point `tier` at `pointer`, clearing the slot of the other kind.
    pub fn set_pointer(&mut self, tier: Tier, pointer: &Pointer) -> bool {
        let p = tier.prefix();
        let other = match pointer.kind {
            PointerKind::Behavior => PointerKind::Bank,
            PointerKind::Bank => PointerKind::Behavior,
        };
        self.write_raw(&format!("{p}_{}", pointer.kind.as_str()), &pointer.name)
            && self.write_raw(&format!("{p}_type"), pointer.kind.as_str())
            && self.remove_raw(&format!("{p}_{}", other.as_str()))
    }

    pub fn clear_pointer(&mut self, tier: Tier) -> bool {
        let p = tier.prefix();
        let mut ok = true;
        for slot in ["behavior", "bank", "type"] {
            ok &= self.remove_raw(&format!("{p}_{slot}"));
        }
        ok
    }

    pub fn set_default(&mut self, pointer: &Pointer) -> bool {
        self.set_pointer(Tier::Default, pointer)
    }

    pub fn default_pointer(&self) -> Option<Pointer> {
        self.pointer(Tier::Default)
    }

    pub fn clear_default(&mut self) -> bool {
        self.clear_pointer(Tier::Default)
    }

    pub fn set_scene_default(&mut self, pointer: &Pointer) -> bool {
        self.set_pointer(Tier::SceneDefault, pointer)
    }

    pub fn scene_default(&self) -> Option<Pointer> {
        self.pointer(Tier::SceneDefault)
    }

    pub fn clear_scene_default(&mut self) -> bool {
        self.clear_pointer(Tier::SceneDefault)
    }

    // Helper overlay flag

    pub fn set_helper_visibility(&mut self, visible: bool) -> bool {
        self.write_raw(HELPERS, if visible { "true" } else { "false" })
    }

    /// Persisted flag; absent or unreadable means hidden.
    pub fn helper_visibility(&self) -> bool {
        self.read_raw(HELPERS).as_deref() == Some("true")
    }

    pub fn clear_helper_visibility(&mut self) -> bool {
        self.remove_raw(HELPERS)
    }

    // Export / import

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            behaviors: Some(self.read_table(BEHAVIORS)),
            banks: Some(self.read_table(BANKS)),
            exported: None,
        }
    }

    /// Both tables as one JSON document, stamped with `exported`.
    pub fn export_json(&self, exported: &str) -> Result<String, ConfigError> {
        let snapshot = Snapshot {
            exported: Some(exported.to_string()),
            ..self.snapshot()
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replace each table present in `text`. Returns the number of behaviors
    /// and banks now stored. Stops at the first table the backend rejects.
    pub fn import_json(&mut self, text: &str) -> Result<(usize, usize), ConfigError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        if let Some(behaviors) = &snapshot.behaviors {
            self.put_table(BEHAVIORS, behaviors)?;
        }
        if let Some(banks) = &snapshot.banks {
            self.put_table(BANKS, banks)?;
        }
        let counts = (self.list_behaviors().len(), self.list_banks().len());
        log::info!("imported {} behaviors, {} banks", counts.0, counts.1);
        Ok(counts)
    }
}
