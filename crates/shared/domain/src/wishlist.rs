//! Wishlist item documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::constants::FIELD_NAME;
use crate::error::{DomainError, DomainResult};

/// Wishlist item read model.
///
/// The store key travels as document metadata, so `id` defaults to nil when
/// decoding a stored body and is normalized afterwards with [`WishlistItem::with_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// Document key
    #[serde(default)]
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Soft delete timestamp (None = live, Some = tombstone)
    #[serde(default)]
    pub deleted: Option<DateTime<Utc>>,
}

impl WishlistItem {
    /// Replace whatever identifier the body carried with the store key.
    pub fn with_id(self, id: Uuid) -> Self {
        Self { id, ..self }
    }

    /// Check if item is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

/// Wishlist item write model.
///
/// An absent or blank `id` asks for a new document; anything else addresses
/// an existing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub deleted: Option<DateTime<Utc>>,
}

impl WishlistItemDraft {
    /// Draft for a brand new item.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            deleted: None,
        }
    }

    /// Draft addressing an existing item.
    pub fn for_key(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            deleted: None,
        }
    }

    /// Store key this draft addresses, if any. Blank identifiers count as absent.
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Copy of the draft carrying the given identifier.
    pub fn with_id(self, id: Option<String>) -> Self {
        Self { id, ..self }
    }

    /// Body written by create-or-edit. Only the name is persisted.
    pub fn body(&self) -> Value {
        json!({ FIELD_NAME: self.name })
    }
}

/// Reject documents carrying a soft delete timestamp.
///
/// Every read path runs this before handing a document out.
pub fn ensure_not_deleted(deleted: Option<DateTime<Utc>>) -> DomainResult<()> {
    match deleted {
        Some(at) => Err(DomainError::SoftDeleted(at)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_draft_key_blank_is_absent() {
        assert_eq!(WishlistItemDraft::new("Globe").key(), None);
        assert_eq!(WishlistItemDraft::for_key("", "Globe").key(), None);
        assert_eq!(WishlistItemDraft::for_key("   ", "Globe").key(), None);
        assert_eq!(WishlistItemDraft::for_key(" abc ", "Globe").key(), Some("abc"));
    }

    #[test]
    fn test_draft_body_only_carries_name() {
        let mut draft = WishlistItemDraft::for_key("abc", "Globe");
        draft.deleted = Some(Utc::now());

        assert_eq!(draft.body(), json!({ "name": "Globe" }));
    }

    #[test]
    fn test_item_decodes_without_id() {
        let item: WishlistItem = serde_json::from_value(json!({ "name": "Globe" })).unwrap();

        assert!(item.id.is_nil());
        assert!(!item.is_deleted());
    }

    #[test]
    fn test_with_id_overrides_body_id() {
        let body_id = Uuid::new_v4();
        let key = Uuid::new_v4();
        let item: WishlistItem =
            serde_json::from_value(json!({ "id": body_id, "name": "Globe" })).unwrap();

        assert_eq!(item.with_id(key).id, key);
    }

    #[test]
    fn test_item_serializes_null_deleted() {
        let item = WishlistItem {
            id: Uuid::nil(),
            name: "Globe".to_string(),
            deleted: None,
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["deleted"], Value::Null);
    }

    #[test]
    fn test_ensure_not_deleted() {
        assert!(ensure_not_deleted(None).is_ok());

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let err = ensure_not_deleted(Some(at)).unwrap_err();
        assert_eq!(err, DomainError::SoftDeleted(at));
        assert!(err.to_string().contains("2024-03-01"));
    }
}
