//! Schema upgrade applied when a stored document predates [`CURRENT_VERSION`].
//!
//! Version 1 documents (no `version` field) may hold collections as arrays,
//! lack `updatedAt`/`hashtags`/counter fields, and carry stale metadata. The
//! upgrade reshapes the raw JSON first, then re-derives everything that is
//! derivable: hashtags from content, per-post counts, aggregate metadata.

use chrono::{DateTime, Utc};
use models::{DataDocument, Mood, ReactionType, CURRENT_VERSION};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::ServiceError;
use crate::hashtags::extract_hashtags;

/// Version assumed for documents without a `version` field.
pub const LEGACY_VERSION: u32 = 1;

const COLLECTIONS: [&str; 4] = ["users", "posts", "comments", "reactions"];

/// Result of loading a stored document.
#[derive(Debug)]
pub struct Upgrade {
    pub document: DataDocument,
    /// `Some(v)` when the document was upgraded from version `v`.
    pub from_version: Option<u32>,
}

impl Upgrade {
    pub fn migrated(&self) -> bool { self.from_version.is_some() }
}

pub fn stored_version(value: &Value) -> Result<u32, ServiceError> {
    match value.get("version") {
        None | Some(Value::Null) => Ok(LEGACY_VERSION),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ServiceError::Corrupted(format!("invalid version field: {v}"))),
    }
}

/// Turn raw stored JSON into a current-version document.
///
/// A current document is decoded as-is. Anything older is upgraded in memory;
/// persisting the result is the caller's job.
pub fn upgrade(mut value: Value, now: DateTime<Utc>) -> Result<Upgrade, ServiceError> {
    if !value.is_object() {
        return Err(ServiceError::Corrupted("document root is not an object".into()));
    }
    let version = stored_version(&value)?;
    if version > CURRENT_VERSION {
        return Err(ServiceError::Storage(format!(
            "document version {version} is newer than supported version {CURRENT_VERSION}"
        )));
    }
    if version == CURRENT_VERSION {
        let document = serde_json::from_value(value).map_err(|e| ServiceError::Corrupted(e.to_string()))?;
        return Ok(Upgrade { document, from_version: None });
    }

    reshape_legacy(&mut value, now);
    let mut document: DataDocument =
        serde_json::from_value(value).map_err(|e| ServiceError::Corrupted(format!("legacy document: {e}")))?;
    rederive(&mut document, now);
    debug!(from = version, to = CURRENT_VERSION, posts = document.posts.len(), "document upgraded");
    Ok(Upgrade { document, from_version: Some(version) })
}

fn reshape_legacy(value: &mut Value, now: DateTime<Utc>) {
    let now_str = Value::String(now.to_rfc3339());
    let Some(root) = value.as_object_mut() else { return };

    for name in COLLECTIONS {
        let reshaped = match root.remove(name) {
            Some(Value::Object(map)) => map,
            Some(Value::Array(items)) => index_array(name, items),
            _ => Map::new(),
        };
        root.insert(name.to_string(), Value::Object(reshaped));
    }

    let user_names: Map<String, Value> = root
        .get("users")
        .and_then(Value::as_object)
        .map(|users| {
            users
                .iter()
                .filter_map(|(id, u)| u.get("name").map(|n| (id.clone(), n.clone())))
                .collect()
        })
        .unwrap_or_default();

    for user in entities_mut(root, "users") {
        fix_timestamp(user, "createdAt", &now_str);
        let created = user.get("createdAt").cloned().unwrap_or_else(|| now_str.clone());
        fix_timestamp(user, "updatedAt", &created);
    }

    for post in entities_mut(root, "posts") {
        fix_timestamp(post, "createdAt", &now_str);
        let created = post.get("createdAt").cloned().unwrap_or_else(|| now_str.clone());
        fix_timestamp(post, "updatedAt", &created);
        fill_author_name(post, &user_names);
        let mood_ok = match post.get("mood") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.parse::<Mood>().is_ok(),
            Some(_) => false,
        };
        if !mood_ok {
            post.remove("mood");
        } else if let Some(Value::String(s)) = post.get("mood") {
            let lowered = Value::String(s.trim().to_ascii_lowercase());
            post.insert("mood".into(), lowered);
        }
    }

    for comment in entities_mut(root, "comments") {
        fix_timestamp(comment, "createdAt", &now_str);
        fill_author_name(comment, &user_names);
    }

    for reaction in entities_mut(root, "reactions") {
        fix_timestamp(reaction, "createdAt", &now_str);
        // unknown or missing types become a like so the engagement survives
        let kind = match reaction.get("type") {
            Some(Value::String(s)) => s.parse::<ReactionType>().unwrap_or(ReactionType::Like),
            _ => ReactionType::Like,
        };
        reaction.insert("type".into(), Value::String(kind.as_str().into()));
    }

    let created_at = root
        .get("metadata")
        .and_then(|m| m.get("createdAt"))
        .and_then(normalize_timestamp)
        .unwrap_or_else(|| now_str.clone());
    root.insert(
        "metadata".into(),
        serde_json::json!({
            "totalUsers": 0, "totalPosts": 0, "totalComments": 0, "totalReactions": 0,
            "createdAt": created_at, "lastUpdated": now_str,
        }),
    );
    root.insert("version".into(), Value::from(CURRENT_VERSION));
}

fn rederive(doc: &mut DataDocument, now: DateTime<Utc>) {
    for post in doc.posts.values_mut() {
        post.hashtags = extract_hashtags(&post.content);
    }
    let reactions = std::mem::take(&mut doc.reactions);
    for reaction in reactions.into_values() {
        doc.reactions.insert(reaction.key(), reaction);
    }
    let pruned = doc.prune_orphans();
    if pruned > 0 {
        debug!(pruned, "dropped orphaned comments/reactions during upgrade");
    }
    doc.recompute_counts();
    doc.refresh_metadata(now);
    doc.version = CURRENT_VERSION;
}

/// Legacy array collections become maps keyed by `id` (reactions by `postId:userId`).
fn index_array(name: &str, items: Vec<Value>) -> Map<String, Value> {
    let mut map = Map::new();
    for item in items {
        let key = if name == "reactions" {
            match (item.get("postId").and_then(Value::as_str), item.get("userId").and_then(Value::as_str)) {
                (Some(p), Some(u)) => Some(models::reaction::reaction_key(p, u)),
                _ => None,
            }
        } else {
            item.get("id").and_then(Value::as_str).map(str::to_string)
        };
        if let Some(key) = key {
            map.insert(key, item);
        }
    }
    map
}

fn entities_mut<'a>(root: &'a mut Map<String, Value>, name: &str) -> impl Iterator<Item = &'a mut Map<String, Value>> {
    root.get_mut(name)
        .and_then(Value::as_object_mut)
        .into_iter()
        .flat_map(|m| m.values_mut())
        .filter_map(Value::as_object_mut)
}

fn fix_timestamp(entity: &mut Map<String, Value>, field: &str, fallback: &Value) {
    let fixed = entity.get(field).and_then(normalize_timestamp).unwrap_or_else(|| fallback.clone());
    entity.insert(field.to_string(), fixed);
}

/// RFC 3339 strings pass through; epoch milliseconds are converted.
fn normalize_timestamp(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Value::String(dt.with_timezone(&Utc).to_rfc3339())),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| Value::String(dt.to_rfc3339())),
        _ => None,
    }
}

fn fill_author_name(entity: &mut Map<String, Value>, user_names: &Map<String, Value>) {
    if entity.get("authorName").is_some_and(Value::is_string) {
        return;
    }
    let name = entity
        .get("authorId")
        .and_then(Value::as_str)
        .and_then(|id| user_names.get(id))
        .cloned()
        .unwrap_or_else(|| Value::String("Unknown".into()));
    entity.insert("authorName".into(), name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy() -> Value {
        json!({
            "users": {
                "u1": {"id": "u1", "name": "Aigerim", "email": "a@b.kz", "createdAt": "2024-03-01T10:00:00Z"}
            },
            "posts": [
                {"id": "p1", "content": "Hello #Almaty #almaty", "authorId": "u1",
                 "createdAt": 1709287200000i64, "mood": "Happy", "reactionCount": 7},
                {"id": "p2", "content": "bad mood value", "authorId": "u1",
                 "createdAt": "2024-03-02T10:00:00Z", "mood": "sleepy"}
            ],
            "comments": {
                "c1": {"id": "c1", "content": "nice", "postId": "p1", "authorId": "u1", "authorName": "Aigerim",
                       "createdAt": "2024-03-01T11:00:00Z"},
                "c2": {"id": "c2", "content": "orphan", "postId": "gone", "authorId": "u1", "authorName": "Aigerim",
                       "createdAt": "2024-03-01T11:00:00Z"}
            },
            "reactions": [
                {"postId": "p1", "userId": "u1", "type": "love", "createdAt": "2024-03-01T12:00:00Z"}
            ]
        })
    }

    #[test]
    fn missing_version_is_legacy() {
        assert_eq!(stored_version(&json!({})).unwrap(), LEGACY_VERSION);
        assert_eq!(stored_version(&json!({"version": 2})).unwrap(), 2);
        assert!(stored_version(&json!({"version": "two"})).is_err());
    }

    #[test]
    fn legacy_document_is_upgraded_and_rederived() {
        let now = Utc::now();
        let up = upgrade(legacy(), now).unwrap();
        assert_eq!(up.from_version, Some(LEGACY_VERSION));
        let doc = up.document;
        assert_eq!(doc.version, CURRENT_VERSION);

        let p1 = &doc.posts["p1"];
        assert_eq!(p1.hashtags, vec!["almaty"]);
        assert_eq!(p1.author_name, "Aigerim");
        assert_eq!(p1.mood, Some(Mood::Happy));
        assert_eq!(p1.reaction_count, 1);
        assert_eq!(p1.comment_count, 1);
        assert_eq!(p1.updated_at, p1.created_at);
        assert_eq!(p1.created_at.timestamp_millis(), 1709287200000);

        assert!(doc.posts["p2"].mood.is_none());
        assert!(!doc.comments.contains_key("c2"));
        assert!(doc.reactions.contains_key("p1:u1"));
        assert_eq!(doc.metadata.total_posts, 2);
        assert_eq!(doc.metadata.total_comments, 1);
        assert_eq!(doc.consistency_error(), None);
    }

    #[test]
    fn legacy_reaction_types_are_normalized_or_defaulted() {
        let mut doc = legacy();
        doc["users"]["u2"] = json!({"id": "u2", "name": "Berik", "email": "b@b.kz", "createdAt": "2024-03-01T10:00:00Z"});
        doc["users"]["u3"] = json!({"id": "u3", "name": "Dana", "email": "d@b.kz", "createdAt": "2024-03-01T10:00:00Z"});
        if let Some(reactions) = doc["reactions"].as_array_mut() {
            reactions.push(json!({"postId": "p1", "userId": "u2", "type": "Like", "createdAt": "2024-03-01T12:00:00Z"}));
            reactions.push(json!({"postId": "p1", "userId": "u3", "type": "Heart", "createdAt": "2024-03-01T12:00:00Z"}));
        }

        let doc = upgrade(doc, Utc::now()).unwrap().document;
        assert_eq!(doc.reactions["p1:u1"].kind, ReactionType::Love);
        assert_eq!(doc.reactions["p1:u2"].kind, ReactionType::Like);
        assert_eq!(doc.reactions["p1:u3"].kind, ReactionType::Like);
        assert_eq!(doc.posts["p1"].reaction_count, 3);
        assert_eq!(doc.consistency_error(), None);
    }

    #[test]
    fn upgraded_document_is_stable_on_second_pass() {
        let now = Utc::now();
        let first = upgrade(legacy(), now).unwrap().document;
        let again = upgrade(serde_json::to_value(&first).unwrap(), now).unwrap();
        assert!(!again.migrated());
        assert_eq!(again.document, first);
    }

    #[test]
    fn newer_versions_are_rejected() {
        let err = upgrade(json!({"version": CURRENT_VERSION + 1}), Utc::now()).unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn non_object_root_is_corrupted() {
        assert!(matches!(upgrade(json!([1, 2]), Utc::now()), Err(ServiceError::Corrupted(_))));
    }

    #[test]
    fn empty_legacy_object_upgrades_to_empty_document() {
        let up = upgrade(json!({}), Utc::now()).unwrap();
        assert!(up.migrated());
        assert!(up.document.posts.is_empty());
        assert_eq!(up.document.metadata.total_users, 0);
    }
}
