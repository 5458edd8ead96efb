use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ItemboxError;

/// Page size used by `GET /items` when the caller does not pass `limit`.
pub const DEFAULT_PAGE_LIMIT: usize = 10;
/// Larger requested pages are clamped to this size.
pub const MAX_PAGE_LIMIT: usize = 1000;

pub const MSG_INVALID_BODY: &str = "Invalid request body";
pub const MSG_INVALID_NAME: &str = "Valid name is required";
pub const MSG_INVALID_DESCRIPTION: &str = "description must be a string";
pub const MSG_INVALID_ID: &str = "Valid item ID is required";
pub const MSG_INVALID_LIMIT: &str = "limit must be a positive integer";
pub const MSG_INVALID_CURSOR: &str = "Invalid lastKey";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a new item from validated input, assigning its id and timestamps.
    ///
    /// Ids are UUIDv7, so they sort in creation order; the scan cursor relies on that.
    pub fn new(input: &CreateItem) -> Result<Self, ItemboxError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ItemboxError::invalid(MSG_INVALID_NAME));
        }
        let description = input.description.as_deref().unwrap_or("").trim();
        let now = Utc::now().trunc_subsecs(3);
        Ok(Self {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn cursor(&self) -> ItemCursor {
        ItemCursor {
            id: self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateItem {
    /// Interpret an untyped request body, rejecting wrong shapes with the
    /// message the API reports.
    pub fn from_json(body: &Value) -> Result<Self, ItemboxError> {
        let obj = body
            .as_object()
            .ok_or_else(|| ItemboxError::invalid(MSG_INVALID_BODY))?;

        let name = match obj.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => return Err(ItemboxError::invalid(MSG_INVALID_NAME)),
        };

        let description = match obj.get("description") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ItemboxError::invalid(MSG_INVALID_DESCRIPTION)),
        };

        Ok(Self { name, description })
    }
}

/// Validate a path id, returning it trimmed.
pub fn validate_item_id(id: &str) -> Result<&str, ItemboxError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ItemboxError::invalid(MSG_INVALID_ID));
    }
    Ok(id)
}

/// Opaque resume point for a scan. Serialized as `{"id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCursor {
    pub id: String,
}

impl ItemCursor {
    /// Decode the JSON-encoded `lastKey` query parameter.
    pub fn parse(raw: &str) -> Result<Self, ItemboxError> {
        let cursor: ItemCursor =
            serde_json::from_str(raw).map_err(|_| ItemboxError::invalid(MSG_INVALID_CURSOR))?;
        if cursor.id.is_empty() {
            return Err(ItemboxError::invalid(MSG_INVALID_CURSOR));
        }
        Ok(cursor)
    }

    pub fn encode(&self) -> String {
        serde_json::json!({ "id": self.id }).to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItems {
    pub limit: Option<usize>,
    pub last_key: Option<ItemCursor>,
}

impl ListItems {
    /// Build from the raw `limit` / `lastKey` query values.
    pub fn from_query(limit: Option<&str>, last_key: Option<&str>) -> Result<Self, ItemboxError> {
        let limit = limit.map(parse_limit).transpose()?;
        let last_key = last_key
            .filter(|raw| !raw.is_empty())
            .map(ItemCursor::parse)
            .transpose()?;
        Ok(Self { limit, last_key })
    }

    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }
}

fn parse_limit(raw: &str) -> Result<usize, ItemboxError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ItemboxError::invalid(MSG_INVALID_LIMIT)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_key: Option<ItemCursor>,
}

/// Envelope returned by `DELETE /items/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItemResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Item,
}

impl DeleteItemResponse {
    pub fn new(data: Item) -> Self {
        Self {
            success: true,
            message: "Item deleted successfully".into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(name: &str, description: Option<&str>) -> CreateItem {
        CreateItem {
            name: name.into(),
            description: description.map(String::from),
        }
    }

    #[test]
    fn new_item_trims_and_defaults_description() {
        let item = Item::new(&create("  Widget ", None)).unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.description, "");
        assert!(!item.id.is_empty());
        assert_eq!(item.created_at, item.updated_at);

        let item = Item::new(&create("A", Some("  B\n"))).unwrap();
        assert_eq!(item.description, "B");
    }

    #[test]
    fn new_item_rejects_blank_name() {
        let err = Item::new(&create("   ", None)).unwrap_err();
        assert_eq!(err.message(), MSG_INVALID_NAME);
    }

    #[test]
    fn new_item_ids_are_unique_and_ordered() {
        let ids: Vec<String> = (0..200)
            .map(|_| Item::new(&create("x", None)).unwrap().id)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert_eq!(sorted, ids, "v7 ids should sort in creation order");
    }

    #[test]
    fn item_serializes_camel_case() {
        let item = Item::new(&create("Widget", None)).unwrap();
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["name"], "Widget");
        assert_eq!(v["description"], "");
        assert!(v["createdAt"].is_string());
        assert_eq!(v["createdAt"], v["updatedAt"]);
        assert!(v.get("created_at").is_none());
    }

    #[test]
    fn from_json_accepts_valid_bodies() {
        let input = CreateItem::from_json(&json!({"name": "A", "description": "B"})).unwrap();
        assert_eq!(input, create("A", Some("B")));

        let input = CreateItem::from_json(&json!({"name": "A", "description": null})).unwrap();
        assert_eq!(input.description, None);
    }

    #[test]
    fn from_json_rejects_bad_bodies() {
        let cases = [
            (json!([1, 2]), MSG_INVALID_BODY),
            (json!("name"), MSG_INVALID_BODY),
            (json!({}), MSG_INVALID_NAME),
            (json!({"name": ""}), MSG_INVALID_NAME),
            (json!({"name": "   "}), MSG_INVALID_NAME),
            (json!({"name": 42}), MSG_INVALID_NAME),
            (json!({"name": "ok", "description": 7}), MSG_INVALID_DESCRIPTION),
        ];
        for (body, expected) in cases {
            let err = CreateItem::from_json(&body).unwrap_err();
            assert_eq!(err.message(), expected, "body: {body}");
        }
    }

    #[test]
    fn validate_item_id_trims() {
        assert_eq!(validate_item_id(" abc ").unwrap(), "abc");
        assert_eq!(validate_item_id("  ").unwrap_err().message(), MSG_INVALID_ID);
    }

    #[test]
    fn cursor_parse_and_encode() {
        let cursor = ItemCursor::parse(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(cursor.id, "abc");
        assert_eq!(ItemCursor::parse(&cursor.encode()).unwrap(), cursor);

        for raw in ["not json", "{}", r#"{"id":""}"#, r#"{"id":3}"#, "[]"] {
            assert!(ItemCursor::parse(raw).is_err(), "should reject {raw}");
        }
    }

    #[test]
    fn list_query_parsing() {
        let q = ListItems::from_query(None, None).unwrap();
        assert_eq!(q.effective_limit(), DEFAULT_PAGE_LIMIT);
        assert!(q.last_key.is_none());

        let q = ListItems::from_query(Some("25"), Some(r#"{"id":"x"}"#)).unwrap();
        assert_eq!(q.effective_limit(), 25);
        assert_eq!(q.last_key.unwrap().id, "x");

        // An empty lastKey is treated as the first page.
        let q = ListItems::from_query(None, Some("")).unwrap();
        assert!(q.last_key.is_none());

        for bad in ["0", "-1", "abc", "2.5", ""] {
            let err = ListItems::from_query(Some(bad), None).unwrap_err();
            assert_eq!(err.message(), MSG_INVALID_LIMIT, "limit {bad}");
        }
    }

    #[test]
    fn oversized_limit_is_clamped() {
        let q = ListItems::from_query(Some("5000"), None).unwrap();
        assert_eq!(q.limit, Some(5000));
        assert_eq!(q.effective_limit(), MAX_PAGE_LIMIT);

        let q = ListItems::from_query(Some("1000"), None).unwrap();
        assert_eq!(q.effective_limit(), 1000);

        let q = ListItems {
            limit: Some(0),
            last_key: None,
        };
        assert_eq!(q.effective_limit(), 1);
    }

    #[test]
    fn page_omits_missing_last_key() {
        let page = ItemPage::default();
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v, json!({ "items": [] }));

        let page = ItemPage {
            items: vec![],
            last_key: Some(ItemCursor { id: "k".into() }),
        };
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["lastKey"]["id"], "k");
    }
}
