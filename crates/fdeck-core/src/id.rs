#![forbid(unsafe_code)]

//! Identifiers for panels, scopes and host elements.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

/// Stable identifier of an open panel.
///
/// Either chosen by the caller (and then used to de-duplicate creation) or
/// generated. Cloning is cheap: the string is reference counted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(Rc<str>);

impl PanelId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PanelId").field(&&*self.0).finish()
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PanelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PanelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PanelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PanelId {
    fn from(value: String) -> Self {
        Self(Rc::from(value))
    }
}

impl PartialEq<str> for PanelId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for PanelId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Locally unique identifier of a mounted scope (provider instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Opaque handle to a host element (a DOM node for browser hosts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn panel_id_compares_with_str() {
        let id = PanelId::new("settings");
        assert_eq!(id, "settings");
        assert_eq!(id.as_str(), "settings");
        assert_eq!(id.to_string(), "settings");
        assert_eq!(format!("{id:?}"), "PanelId(\"settings\")");
    }

    #[test]
    fn panel_id_borrows_as_str_for_lookup() {
        let mut map = HashMap::new();
        map.insert(PanelId::from("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn panel_id_clone_shares_storage() {
        let id = PanelId::from(String::from("x"));
        let copy = id.clone();
        assert!(Rc::ptr_eq(&id.0, &copy.0));
    }

    #[test]
    fn scope_id_display() {
        assert_eq!(ScopeId::new(4).to_string(), "scope#4");
        assert_eq!(ElementId::new(9).get(), 9);
    }
}
