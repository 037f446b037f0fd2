use serde::ser::{Serialize, SerializeMap, Serializer};

/// Backend collections reachable through the generic CRUD operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Books,
    Loans,
    Reservations,
}

impl EntityKind {
    /// Collection path segment on the backend router
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Books => "livros",
            EntityKind::Loans => "emprestimos",
            EntityKind::Reservations => "reservas",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Books => "books",
            EntityKind::Loans => "loans",
            EntityKind::Reservations => "reservations",
        }
    }
}

/// Ordered set of form values sent as a JSON object body.
///
/// Values are opaque strings and are sent verbatim, empty ones included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing an earlier value with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Book form as the harness collects it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
}

impl From<&BookFields> for Fields {
    fn from(book: &BookFields) -> Self {
        Fields::new()
            .with("titulo", book.title.as_str())
            .with("autor", book.author.as_str())
            .with("genero", book.genre.as_str())
            .with("descricao", book.description.as_str())
    }
}
