use serde::Deserialize;

/// Shape of a collection response.
///
/// The server answers with a bare string when the collection holds one
/// item, an array when it holds several, and `{}` when it is empty.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ListResponse {
    Many(Vec<String>),
    Single(String),
    Empty(Option<EmptyObject>),
}

/// Matches `{}`. Any other object is rejected so unexpected bodies surface
/// as decode errors instead of empty lists.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EmptyObject {}

impl ListResponse {
    /// Flattens every shape into a plain list, in server order.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ListResponse::Many(items) => items,
            ListResponse::Single(item) => vec![item],
            ListResponse::Empty(_) => Vec::new(),
        }
    }

    /// Flattens and sorts ascending, the order every list is displayed in.
    pub fn into_sorted(self) -> Vec<String> {
        let mut items = self.into_vec();
        items.sort();
        items
    }
}
