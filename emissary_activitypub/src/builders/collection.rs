use serde::Serialize;
use serde_json::{Value as JsonValue};

use crate::{
    constants::FIRST_PAGE_CURSOR,
    contexts::{build_default_context, Context},
    vocabulary::{ORDERED_COLLECTION, ORDERED_COLLECTION_PAGE},
};

/// Page cursor is the creation time (Unix milliseconds) of the last
/// item on the previous page
pub fn collection_page_id(collection_id: &str, cursor: i64) -> String {
    format!("{}?publishDate={}", collection_id, cursor)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedCollection {
    #[serde(rename = "@context")]
    _context: Context,

    id: String,

    #[serde(rename = "type")]
    object_type: String,

    first: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    total_items: Option<usize>,
}

impl OrderedCollection {
    pub fn new(
        collection_id: String,
        total_items: Option<usize>,
    ) -> Self {
        let first_page_id = collection_page_id(&collection_id, FIRST_PAGE_CURSOR);
        Self {
            _context: build_default_context(),
            id: collection_id,
            object_type: ORDERED_COLLECTION.to_string(),
            first: first_page_id,
            total_items,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedCollectionPage {
    #[serde(rename = "@context")]
    _context: Context,

    id: String,

    #[serde(rename = "type")]
    object_type: String,

    part_of: String,

    ordered_items: Vec<JsonValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
}

impl OrderedCollectionPage {
    /// Items are pairs of (cursor, JSON-LD representation),
    /// sorted by cursor in descending order
    pub fn new(
        collection_id: String,
        page_cursor: i64,
        items: Vec<(i64, JsonValue)>,
        page_size: u16,
    ) -> Self {
        let next_page_id = if items.len() == usize::from(page_size) {
            items.last()
                .map(|(cursor, _)| collection_page_id(&collection_id, *cursor))
        } else {
            None
        };
        Self {
            _context: build_default_context(),
            id: collection_page_id(&collection_id, page_cursor),
            object_type: ORDERED_COLLECTION_PAGE.to_string(),
            part_of: collection_id,
            ordered_items: items.into_iter().map(|(_, item)| item).collect(),
            next: next_page_id,
        }
    }
}
