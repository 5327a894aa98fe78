//! Key paths and index declarations.

use serde::{Deserialize, Serialize};

/// The field(s) a key is read from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum KeyPath {
    /// No key path: keys are supplied by the store (outbound keys).
    #[default]
    None,
    /// A single field (dotted paths allowed).
    Single(String),
    /// An ordered list of fields forming a compound key.
    Compound(Vec<String>),
}

impl KeyPath {
    /// Creates a single-field key path.
    pub fn single(field: impl Into<String>) -> Self {
        KeyPath::Single(field.into())
    }

    /// Creates a compound key path in declaration order.
    pub fn compound<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyPath::Compound(fields.into_iter().map(Into::into).collect())
    }

    /// Returns true if there is no key path.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, KeyPath::None)
    }

    /// Returns true for compound key paths.
    #[inline]
    pub fn is_compound(&self) -> bool {
        matches!(self, KeyPath::Compound(_))
    }

    /// Returns the fields of this key path in declaration order.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            KeyPath::None => Vec::new(),
            KeyPath::Single(field) => vec![field.as_str()],
            KeyPath::Compound(fields) => fields.iter().map(String::as_str).collect(),
        }
    }

    /// Returns the single field, if this is a single-field key path.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            KeyPath::Single(field) => Some(field),
            _ => None,
        }
    }

    /// Renders the key path the way schema declarations write it (`a` or `[a+b]`).
    pub fn declaration(&self) -> String {
        match self {
            KeyPath::None => String::new(),
            KeyPath::Single(field) => field.clone(),
            KeyPath::Compound(fields) => format!("[{}]", fields.join("+")),
        }
    }
}

/// Primary key declaration of a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PrimaryKey {
    /// Key path; `KeyPath::None` for outbound-key tables.
    pub key_path: KeyPath,
    /// Whether the store generates keys.
    pub auto_increment: bool,
}

impl PrimaryKey {
    /// Creates a primary key on the given key path.
    pub fn new(key_path: KeyPath) -> Self {
        Self {
            key_path,
            auto_increment: false,
        }
    }

    /// Creates an outbound primary key (keys supplied by the store).
    pub fn outbound() -> Self {
        Self::default()
    }

    /// Sets auto-increment flag.
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Returns true if keys are not stored inside rows.
    #[inline]
    pub fn is_outbound(&self) -> bool {
        self.key_path.is_none()
    }
}

/// A secondary index declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name. For single-field indexes this is the field.
    pub name: String,
    /// Key path the index reads.
    pub key_path: KeyPath,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Whether array values are indexed element by element.
    pub multi_entry: bool,
}

impl IndexSpec {
    /// Creates a single-field index named after the field.
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            name: field.clone(),
            key_path: KeyPath::Single(field),
            unique: false,
            multi_entry: false,
        }
    }

    /// Creates a compound index named like its declaration (`[a+b]`).
    pub fn compound<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key_path = KeyPath::compound(fields);
        Self {
            name: key_path.declaration(),
            key_path,
            unique: false,
            multi_entry: false,
        }
    }

    /// Sets whether this index is unique.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Sets whether this index is multi-entry.
    pub fn multi_entry(mut self, multi_entry: bool) -> Self {
        self.multi_entry = multi_entry;
        self
    }

    /// Renders the index the way schema declarations write it.
    pub fn declaration(&self) -> String {
        let mut out = String::new();
        if self.unique {
            out.push('&');
        }
        if self.multi_entry {
            out.push('*');
        }
        out.push_str(&self.key_path.declaration());
        out
    }
}
