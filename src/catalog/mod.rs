pub mod normalize;
pub mod overrides;

use std::collections::HashMap;
use std::path::Path;

use crate::core::ScannerResult;

pub use normalize::{clean_name, normalize_name};

/// Maps a listing's display name and lore to the catalog id used by the price
/// feeds. `None` means "no reference price available".
pub trait CatalogResolver: Send + Sync {
    fn resolve(&self, display_name: &str, lore: &str) -> Option<String>;
}

/// Item table keyed by display name, backed by an `items.json` export of the
/// form `{ "<CATALOG_ID>": { "name": "<display name>" } }`.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    by_name: HashMap<String, String>,
}

impl ItemCatalog {
    pub fn from_json_str(body: &str) -> ScannerResult<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(body)?;

        let mut by_name: HashMap<String, String> = HashMap::with_capacity(raw.len());
        for (id, item) in raw {
            let Some(name) = item.get("name").and_then(|n| n.as_str()) else {
                continue;
            };
            // Several ids can share a display name; keep the smallest for a
            // stable answer across restarts.
            by_name
                .entry(clean_name(name))
                .and_modify(|existing| {
                    if id < *existing {
                        *existing = id.clone();
                    }
                })
                .or_insert(id);
        }

        tracing::info!("Loaded {} catalog names", by_name.len());
        Ok(Self { by_name })
    }

    pub fn from_path(path: impl AsRef<Path>) -> ScannerResult<Self> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json_str(&body)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn resolve_exact(&self, name: &str, lore: &str) -> Option<String> {
        if let Some(entry) = overrides::lookup(name) {
            return entry.resolve(lore).map(str::to_string);
        }
        self.by_name.get(name).cloned()
    }
}

impl CatalogResolver for ItemCatalog {
    fn resolve(&self, display_name: &str, lore: &str) -> Option<String> {
        // Some real names start with a reforge word, so try the name as-is
        // before stripping.
        let cleaned = clean_name(display_name);
        if let Some(id) = self.resolve_exact(&cleaned, lore) {
            return Some(id);
        }

        let normalized = normalize_name(&cleaned);
        if normalized != cleaned {
            return self.resolve_exact(&normalized, lore);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = r#"{
        "HYPERION": {"name": "Hyperion", "tier": "LEGENDARY"},
        "ASPECT_OF_THE_END": {"name": "Aspect of the End"},
        "LUCKY_CLOVER": {"name": "Lucky Clover"},
        "NO_NAME": {"tier": "COMMON"},
        "SALMON_HELMET": {"name": "Salmon Helmet"}
    }"#;

    #[test]
    fn test_resolves_plain_and_reforged_names() {
        let catalog = ItemCatalog::from_json_str(ITEMS).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.resolve("Hyperion", ""), Some("HYPERION".to_string()));
        assert_eq!(catalog.resolve("Heroic Hyperion", ""), Some("HYPERION".to_string()));
        assert_eq!(catalog.resolve("Unknown Thing", ""), None);
    }

    #[test]
    fn test_name_starting_with_reforge_word() {
        let catalog = ItemCatalog::from_json_str(ITEMS).unwrap();
        assert_eq!(
            catalog.resolve("Lucky Clover", ""),
            Some("LUCKY_CLOVER".to_string())
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let catalog = ItemCatalog::from_json_str(ITEMS).unwrap();
        assert_eq!(
            catalog.resolve("Salmon Helmet", "§9§lRARE HELMET"),
            Some("SALMON_HELMET_NEW".to_string())
        );
        assert_eq!(catalog.resolve("Silex", ""), Some("SIL_EX".to_string()));
        // Override hit with no matching lore rule stays unmapped.
        assert_eq!(catalog.resolve("God Potion", "COMMON"), None);
    }

    #[test]
    fn test_missing_file() {
        assert!(ItemCatalog::from_path("/definitely/not/here/items.json").is_err());
    }
}
