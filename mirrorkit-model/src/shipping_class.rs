use crate::entity::MirrorEntity;
use crate::schema::{EntityKind, EntitySchema, IndexedField};
use mirrorkit_types::{ScopeId, StableKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductShippingClass {
    pub local_site_id: ScopeId,
    pub remote_shipping_class_id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Products using this class, as counted by the remote.
    pub count: i64,
}

impl ProductShippingClass {
    pub fn new(remote_shipping_class_id: i64, name: impl Into<String>) -> Self {
        Self {
            remote_shipping_class_id,
            name: name.into(),
            ..Self::default()
        }
    }
}

impl MirrorEntity for ProductShippingClass {
    const KIND: EntityKind = EntityKind::ProductShippingClass;

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::KIND)
            .with_field(IndexedField::integer("/remote_shipping_class_id"))
            .with_field(IndexedField::text("/name"))
            .with_field(IndexedField::text("/slug"))
    }

    fn local_parent_id(&self) -> ScopeId {
        self.local_site_id
    }

    fn set_local_parent_id(&mut self, scope: ScopeId) {
        self.local_site_id = scope;
    }

    fn stable_key(&self) -> StableKey {
        StableKey::remote(self.remote_shipping_class_id)
    }
}
