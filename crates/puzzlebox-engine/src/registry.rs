//! Token identity to component category lookup.
//!
//! The registry is built once from configuration and never changes
//! afterwards. Identities that were never registered resolve to
//! [`Category::Empty`], so a stray card behaves like an empty gate.

use std::collections::HashMap;

use puzzlebox_core::{Category, Error, Result, TokenIdentity};

/// Immutable mapping from token identity to component category.
///
/// # Examples
///
/// ```
/// use puzzlebox_core::{Category, TokenIdentity};
/// use puzzlebox_engine::CategoryRegistry;
///
/// let led: TokenIdentity = "04:5C:4E:8A".parse().unwrap();
/// let registry = CategoryRegistry::from_entries([(led, Category::LedStraight)]).unwrap();
///
/// assert_eq!(registry.resolve(&led), Category::LedStraight);
/// assert_eq!(registry.resolve(&"04:00:00:01".parse().unwrap()), Category::Empty);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    entries: HashMap<TokenIdentity, Category>,
}

impl CategoryRegistry {
    /// Registry with no entries; every identity resolves to empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(identity, category)` pairs.
    ///
    /// Repeating an identity with the same category is accepted.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateToken` if an identity is mapped to two
    /// different categories, or `Error::Config` if an entry maps to
    /// [`Category::Empty`].
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (TokenIdentity, Category)>,
    {
        let mut registry = Self::new();
        for (identity, category) in entries {
            registry.insert(identity, category)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, identity: TokenIdentity, category: Category) -> Result<()> {
        if category.is_empty() {
            return Err(Error::Config(format!(
                "Token {identity} cannot be registered as empty"
            )));
        }

        match self.entries.get(&identity) {
            Some(&existing) if existing != category => Err(Error::DuplicateToken {
                identity: identity.to_string(),
                existing: existing.to_string(),
                conflicting: category.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(identity, category);
                Ok(())
            }
        }
    }

    /// Category of a token, [`Category::Empty`] when unregistered.
    #[inline]
    #[must_use]
    pub fn resolve(&self, identity: &TokenIdentity) -> Category {
        self.entries
            .get(identity)
            .copied()
            .unwrap_or(Category::Empty)
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no token is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered entries ordered by category, then identity text.
    pub fn entries(&self) -> Vec<(TokenIdentity, Category)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(identity, category)| (*identity, *category))
            .collect();
        entries.sort_by_key(|(identity, category)| (category.code(), identity.to_hex()));
        entries
    }
}
