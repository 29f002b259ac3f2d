use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for element IDs. Handles are 4-byte copies.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Opaque identifier of a text element, stable across serialization.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing handle.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Mint a fresh id of the form `{prefix}-{n}`.
    ///
    /// Unique within the process; ids loaded from persisted state may still
    /// collide, so callers check against the live scene and mint again.
    pub fn mint(prefix: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}-{n}"))
    }

    /// Mint until the result is not rejected by `taken`.
    pub fn mint_unique(prefix: &str, taken: impl Fn(ElementId) -> bool) -> Self {
        loop {
            let id = Self::mint(prefix);
            if !taken(id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("text-title");
        let b = ElementId::intern("text-title");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "text-title");
    }

    #[test]
    fn minted_ids_are_unique() {
        let a = ElementId::mint("text");
        let b = ElementId::mint("text");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("text-"));
    }

    #[test]
    fn mint_unique_skips_taken_ids() {
        let mut taken = HashSet::new();
        for _ in 0..3 {
            taken.insert(ElementId::mint("dup"));
        }
        let fresh = ElementId::mint_unique("dup", |id| taken.contains(&id));
        assert!(!taken.contains(&fresh));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ElementId::intern("text-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"text-42\"");
        let back: ElementId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
