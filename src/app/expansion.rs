use std::collections::HashMap;

/// Which packages the user has expanded, keyed by package name so the state
/// outlives any single snapshot.
#[derive(Debug, Default, Clone)]
pub struct ExpansionState {
    expanded: HashMap<String, bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a package's state and return the new value. Unknown names start
    /// out collapsed.
    pub fn toggle(&mut self, name: &str) -> bool {
        let entry = self.expanded.entry(name.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: &str, expanded: bool) {
        self.expanded.insert(name.to_string(), expanded);
    }

    pub fn expand_all<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.set(name, true);
        }
    }

    pub fn collapse_all(&mut self) {
        for value in self.expanded.values_mut() {
            *value = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_is_collapsed() {
        let state = ExpansionState::new();
        assert!(!state.is_expanded("never/seen"));
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let mut state = ExpansionState::new();
        let before = state.is_expanded("pkgA");
        assert!(state.toggle("pkgA"));
        assert!(!state.toggle("pkgA"));
        assert_eq!(state.is_expanded("pkgA"), before);

        state.set("pkgB", true);
        state.toggle("pkgB");
        state.toggle("pkgB");
        assert!(state.is_expanded("pkgB"));
    }

    #[test]
    fn test_toggle_is_per_key() {
        let mut state = ExpansionState::new();
        state.toggle("pkgA");
        assert!(state.is_expanded("pkgA"));
        assert!(!state.is_expanded("pkgB"));
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut state = ExpansionState::new();
        state.expand_all(["a", "b"]);
        assert!(state.is_expanded("a") && state.is_expanded("b"));
        state.collapse_all();
        assert!(!state.is_expanded("a") && !state.is_expanded("b"));
    }
}
