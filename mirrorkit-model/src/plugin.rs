use crate::entity::MirrorEntity;
use crate::schema::{EntityKind, EntitySchema, IndexedField};
use mirrorkit_types::{ScopeId, StableKey};
use serde::{Deserialize, Serialize};

/// A plugin installed on a site.
///
/// Plugins have no numeric remote id. The slug identifies them; plugins the
/// remote reports without a slug fall back to their name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitePlugin {
    pub local_site_id: ScopeId,
    pub name: String,
    pub slug: Option<String>,
    pub display_name: String,
    pub version: Option<String>,
    pub author_name: String,
    pub description: String,
    pub plugin_url: String,
    pub settings_url: Option<String>,
    pub is_active: bool,
    pub is_auto_update_enabled: bool,
}

impl SitePlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

impl MirrorEntity for SitePlugin {
    const KIND: EntityKind = EntityKind::SitePlugin;

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::KIND)
            .with_field(IndexedField::text("/name"))
            .with_field(IndexedField::text("/slug"))
            .with_field(IndexedField::text("/display_name"))
            .with_field(IndexedField::bool("/is_active"))
    }

    fn local_parent_id(&self) -> ScopeId {
        self.local_site_id
    }

    fn set_local_parent_id(&mut self, scope: ScopeId) {
        self.local_site_id = scope;
    }

    fn stable_key(&self) -> StableKey {
        match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => StableKey::slug(slug),
            _ => StableKey::name(&self.name),
        }
    }
}
