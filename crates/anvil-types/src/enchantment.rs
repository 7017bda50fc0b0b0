use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Namespace assumed for keys written without one (`"sharpness"`).
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Enchantment levels keyed by canonical id.
///
/// Keys are unique canonical ids; a level of 0 is never stored by the engine.
pub type EnchantmentMap = BTreeMap<EnchantmentId, u32>;

/// A namespaced enchantment key as reported by a host or a plugin.
///
/// Several raw keys (`minecraft:sharpness`, `enchantplus:sharpness`) may
/// resolve to one [`EnchantmentId`] through the registry's resolution table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RawEnchantmentKey {
    pub namespace: String,
    pub key: String,
}

impl RawEnchantmentKey {
    /// Parse `namespace:key` or a bare `key`.
    ///
    /// Input is trimmed and lower-cased. Both parts must be non-empty and use
    /// only `[a-z0-9_.-]` (the key may also contain `/`).
    ///
    /// # Examples
    ///
    /// ```
    /// use anvil_types::RawEnchantmentKey;
    ///
    /// let key = RawEnchantmentKey::parse("Sharpness").unwrap();
    /// assert_eq!(key.namespace, "minecraft");
    /// assert_eq!(key.key, "sharpness");
    /// assert!(RawEnchantmentKey::parse("bad key").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let normalized = raw.trim().to_ascii_lowercase();
        let (namespace, key) = match normalized.split_once(':') {
            Some((ns, key)) => (ns.to_string(), key.to_string()),
            None => (DEFAULT_NAMESPACE.to_string(), normalized.clone()),
        };

        let invalid = |reason: &str| TypeError::InvalidEnchantmentKey {
            raw: raw.to_string(),
            reason: reason.into(),
        };

        if namespace.is_empty() {
            return Err(invalid("namespace must not be empty"));
        }
        if key.is_empty() {
            return Err(invalid("key must not be empty"));
        }
        if !namespace.chars().all(is_namespace_char) {
            return Err(invalid("namespace contains a forbidden character"));
        }
        if !key.chars().all(|c| is_namespace_char(c) || c == '/') {
            return Err(invalid("key contains a forbidden character"));
        }

        Ok(Self { namespace, key })
    }

    /// The canonical id this key would have if it named itself.
    pub fn to_id(&self) -> EnchantmentId {
        EnchantmentId(format!("{}:{}", self.namespace, self.key))
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
}

impl fmt::Display for RawEnchantmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

/// Canonical, deduplicated enchantment identifier (`namespace:key`).
///
/// Construct through [`EnchantmentId::parse`] or the registry; the inner
/// string is always in canonical form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnchantmentId(String);

impl EnchantmentId {
    /// Parse a raw identifier into canonical form.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        RawEnchantmentKey::parse(raw).map(|k| k.to_id())
    }

    /// The full canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace part (`minecraft` in `minecraft:sharpness`).
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Key part (`sharpness` in `minecraft:sharpness`).
    pub fn key(&self) -> &str {
        self.0.split_once(':').map(|(_, key)| key).unwrap_or(&self.0)
    }
}

impl TryFrom<String> for EnchantmentId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EnchantmentId> for String {
    fn from(id: EnchantmentId) -> Self {
        id.0
    }
}

impl From<RawEnchantmentKey> for EnchantmentId {
    fn from(key: RawEnchantmentKey) -> Self {
        key.to_id()
    }
}

impl fmt::Debug for EnchantmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnchantmentId({})", self.0)
    }
}

impl fmt::Display for EnchantmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_key_gets_default_namespace() {
        let id = EnchantmentId::parse("sharpness").unwrap();
        assert_eq!(id.as_str(), "minecraft:sharpness");
        assert_eq!(id.namespace(), "minecraft");
        assert_eq!(id.key(), "sharpness");
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let a = EnchantmentId::parse("  Minecraft:SHARPNESS ").unwrap();
        let b = EnchantmentId::parse("minecraft:sharpness").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn foreign_namespace_is_kept() {
        let key = RawEnchantmentKey::parse("enchantplus:life_steal").unwrap();
        assert_eq!(key.namespace, "enchantplus");
        assert_eq!(key.to_string(), "enchantplus:life_steal");
    }

    #[test]
    fn key_may_contain_slash() {
        assert!(RawEnchantmentKey::parse("pack:tools/magnet").is_ok());
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(RawEnchantmentKey::parse("").is_err());
        assert!(RawEnchantmentKey::parse(":sharpness").is_err());
        assert!(RawEnchantmentKey::parse("minecraft:").is_err());
    }

    #[test]
    fn rejects_spaces_inside_key() {
        let err = RawEnchantmentKey::parse("fire aspect").unwrap_err();
        assert!(matches!(err, TypeError::InvalidEnchantmentKey { .. }));
    }

    #[test]
    fn serde_normalizes_on_deserialize() {
        let id: EnchantmentId = serde_json::from_str("\"Mending\"").unwrap();
        assert_eq!(id.as_str(), "minecraft:mending");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"minecraft:mending\"");
    }

    #[test]
    fn serde_rejects_malformed_id() {
        let parsed: Result<EnchantmentId, _> = serde_json::from_str("\"not valid\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn map_keys_serialize_as_strings() {
        let mut map = EnchantmentMap::new();
        map.insert(EnchantmentId::parse("unbreaking").unwrap(), 3);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "{\"minecraft:unbreaking\":3}");
    }
}
