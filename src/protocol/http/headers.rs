//! Ordered header multimap with case-insensitive lookup.

use serde::{Deserialize, Serialize};

/// HTTP header fields in arrival order.
///
/// Names keep the case they were sent with. Repeated fields are kept as
/// distinct entries; [`Headers::folded`] joins them for consumers that want
/// a single value.
///
/// # Examples
///
/// ```
/// use traceframe::protocol::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.push("Accept", "text/html");
/// headers.push("accept", "*/*");
///
/// assert_eq!(headers.get("ACCEPT"), Some("text/html"));
/// assert_eq!(headers.folded("accept").as_deref(), Some("text/html, */*"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a field, keeping any earlier field with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Value of the first field called `name`, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Values of every field called `name`, in arrival order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Values of every field called `name` joined with `", "`.
    #[must_use]
    pub fn folded(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self.get_all(name).collect();
        (!values.is_empty()).then(|| values.join(", "))
    }

    /// Whether any field is called `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool { self.get(name).is_some() }

    /// Iterate over `(name, value)` pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of fields, counting repeats.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl From<&[httparse::Header<'_>]> for Headers {
    fn from(fields: &[httparse::Header<'_>]) -> Self {
        fields
            .iter()
            .map(|field| {
                (
                    field.name.to_owned(),
                    String::from_utf8_lossy(field.value).into_owned(),
                )
            })
            .collect()
    }
}
