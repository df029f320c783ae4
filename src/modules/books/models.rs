use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::error::CatalogError;

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, never reused
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Unique across all stored books
    pub isbn: String,
    /// Free-form, not validated as a date
    pub published_date: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

/// Create request body. Every field is optional on the wire so that missing
/// required fields surface as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPayload {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub published_date: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

/// A validated book ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_date: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

impl BookPayload {
    /// Decode a create body. A missing body or `null` decodes to an empty
    /// payload, which then fails the required-field check.
    pub fn from_json(body: Option<Value>) -> Result<Self, CatalogError> {
        match body {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => decode_object(value),
        }
    }
}

impl TryFrom<BookPayload> for NewBook {
    type Error = CatalogError;

    fn try_from(payload: BookPayload) -> Result<Self, Self::Error> {
        match (
            non_empty(payload.title),
            non_empty(payload.author),
            non_empty(payload.isbn),
        ) {
            (Some(title), Some(author), Some(isbn)) => Ok(Self {
                title,
                author,
                isbn,
                published_date: payload.published_date,
                genre: payload.genre,
                description: payload.description,
            }),
            _ => Err(CatalogError::InvalidInput(
                "title, author and isbn are required".to_string(),
            )),
        }
    }
}

/// Update request body.
///
/// `None` leaves the stored value untouched. A JSON `null` decodes to `None`
/// as well, so optional fields cannot be cleared through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub published_date: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

impl BookPatch {
    /// Decode an update body.
    ///
    /// Only a missing body, `null` or `{}` counts as "no data". Keys that
    /// carry nothing usable (nulls, unknown fields) give an empty patch.
    pub fn from_json(body: Option<Value>) -> Result<Self, CatalogError> {
        match body {
            None | Some(Value::Null) => Err(no_data()),
            Some(Value::Object(fields)) if fields.is_empty() => Err(no_data()),
            Some(value) => decode_object(value),
        }
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.published_date.is_none()
            && self.genre.is_none()
            && self.description.is_none()
    }

    /// Reject patches that would blank out a required field.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let blanked: Vec<&str> = [
            ("title", &self.title),
            ("author", &self.author),
            ("isbn", &self.isbn),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_some_and(str::is_empty))
        .map(|(name, _)| name)
        .collect();

        if blanked.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::InvalidInput(format!(
                "{} cannot be empty",
                blanked.join(", ")
            )))
        }
    }

    /// Apply the patch to a copy of `book`.
    pub fn apply_to(&self, book: &Book) -> Book {
        Book {
            id: book.id,
            title: self.title.clone().unwrap_or_else(|| book.title.clone()),
            author: self.author.clone().unwrap_or_else(|| book.author.clone()),
            isbn: self.isbn.clone().unwrap_or_else(|| book.isbn.clone()),
            published_date: self
                .published_date
                .clone()
                .or_else(|| book.published_date.clone()),
            genre: self.genre.clone().or_else(|| book.genre.clone()),
            description: self.description.clone().or_else(|| book.description.clone()),
        }
    }
}

fn no_data() -> CatalogError {
    CatalogError::InvalidInput("no data provided".to_string())
}

fn decode_object<T: DeserializeOwned>(value: Value) -> Result<T, CatalogError> {
    if !value.is_object() {
        return Err(CatalogError::InvalidInput(
            "invalid book data: expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|err| CatalogError::InvalidInput(format!("invalid book data: {err}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Delete acknowledgment: `{"message": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}
