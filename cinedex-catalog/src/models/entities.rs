//! Shared catalog entities and the reference type that links movies to them

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cast member, deduplicated across movies by external id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// External numeric id (natural key)
    pub id: i64,
    pub name: String,
    pub picture: String,
}

/// Director, deduplicated across movies by external id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    /// External numeric id (natural key)
    pub id: i64,
    pub name: String,
    pub picture: String,
}

/// Award-style poll a movie can appear in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    /// External numeric id (natural key)
    pub id: i64,
    pub label: String,
    pub cover: Option<String>,
    pub participation_count: i64,
}

/// Movie→actor edge: the embedded actor plus the role credited on this movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastEntry {
    pub actor: Actor,
    pub role: Option<String>,
}

/// Reference to a stored entity inside a persisted movie document
///
/// Serialized untagged: a JSON number is the entity's external id
/// (natural-key mode), a JSON string is its storage guid (resolved-id mode).
/// Stored documents are therefore self-describing regardless of the link
/// mode that wrote them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// External numeric id written as-is
    External(i64),
    /// Storage guid assigned at first insert
    Stored(Uuid),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::External(id) => write!(f, "{}", id),
            EntityRef::Stored(guid) => write!(f, "{}", guid),
        }
    }
}

/// Movie→actor edge in stored form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastRef {
    pub actor: EntityRef,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_ref_deserializes_number_as_external() {
        let reference: EntityRef = serde_json::from_value(json!(5914)).unwrap();
        assert_eq!(reference, EntityRef::External(5914));
    }

    #[test]
    fn test_entity_ref_deserializes_uuid_string_as_stored() {
        let guid = Uuid::new_v4();
        let reference: EntityRef = serde_json::from_value(json!(guid.to_string())).unwrap();
        assert_eq!(reference, EntityRef::Stored(guid));
    }

    #[test]
    fn test_entity_ref_rejects_non_uuid_string() {
        assert!(serde_json::from_value::<EntityRef>(json!("not-a-guid")).is_err());
    }

    #[test]
    fn test_entity_ref_serialization_round_trips() {
        for reference in [
            EntityRef::External(42),
            EntityRef::Stored(Uuid::new_v4()),
        ] {
            let encoded = serde_json::to_value(reference).unwrap();
            let decoded: EntityRef = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, reference);
        }
    }

    #[test]
    fn test_cast_ref_keeps_role_alongside_reference() {
        let edge: CastRef =
            serde_json::from_value(json!({ "actor": 17, "role": "Ellen Ripley" })).unwrap();
        assert_eq!(edge.actor, EntityRef::External(17));
        assert_eq!(edge.role.as_deref(), Some("Ellen Ripley"));
    }
}
