//! Copy-on-write edit draft.
//!
//! The draft is an untyped JSON tree detached from the cached document.
//! Every update builds a fresh tree and swaps it in, so a snapshot taken
//! before an update never observes it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::content::ContentDocument;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => write!(f, "{k}"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Ordered keys/indices addressing a location in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Empty path (the root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Appends an object key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    /// Appends an array index.
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    /// Parses `site.name`, `about.philosophy.values[0].title` or
    /// `about.philosophy.values.0.title`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut path = Self::root();
        for part in s.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };

            if key.is_empty() && rest.is_empty() {
                return Err(PathError::Syntax(s.to_string()));
            }
            if !key.is_empty() {
                path = match key.parse::<usize>() {
                    Ok(index) => path.index(index),
                    Err(_) => path.key(key),
                };
            }

            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .ok_or_else(|| PathError::Syntax(s.to_string()))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| PathError::Syntax(s.to_string()))?;
                path = path.index(index);
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(PathError::Syntax(s.to_string()));
                }
            }
        }
        Ok(path)
    }
}

impl<S: AsRef<str>> From<&[S]> for FieldPath {
    /// Builds a path from string segments, treating all-digit segments as
    /// indices.
    fn from(parts: &[S]) -> Self {
        parts.iter().fold(Self::root(), |path, part| {
            let part = part.as_ref();
            match part.parse::<usize>() {
                Ok(index) => path.index(index),
                Err(_) => path.key(part),
            }
        })
    }
}

/// A path that does not resolve against the draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path text could not be parsed.
    #[error("malformed field path '{0}'")]
    Syntax(String),

    /// Updating the root is not a field update.
    #[error("field path is empty")]
    Empty,

    /// An intermediate location does not exist or is a scalar.
    #[error("field path '{path}' does not resolve at '{at}'")]
    Unresolved {
        /// Full path.
        path: String,
        /// Segment that failed.
        at: String,
    },
}

/// The editor's working copy of the content document.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    root: Arc<Value>,
}

impl Draft {
    /// Wraps an untyped tree.
    pub fn new(value: Value) -> Self {
        Self {
            root: Arc::new(value),
        }
    }

    /// Current tree.
    pub fn value(&self) -> &Value {
        &self.root
    }

    /// Shared handle to the current tree; unaffected by later updates.
    pub fn snapshot(&self) -> Arc<Value> {
        Arc::clone(&self.root)
    }

    /// Reads the value at `path`.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(self.root.as_ref(), |node, segment| child(node, segment))
    }

    /// Sets the value at `path` and replaces the draft with the new tree.
    ///
    /// Every intermediate location must exist. The leaf may be a new object
    /// key, or the index one past the end of an array (append).
    pub fn update_field(&mut self, path: &FieldPath, value: Value) -> Result<(), PathError> {
        let (leaf, parents) = path.segments().split_last().ok_or(PathError::Empty)?;

        let mut next = Value::clone(&self.root);
        let mut node = &mut next;
        for segment in parents {
            node = child_mut(node, segment).ok_or_else(|| unresolved(path, segment))?;
        }

        match (node, leaf) {
            (Value::Object(map), segment) => {
                map.insert(segment.to_string(), value);
            }
            (Value::Array(items), PathSegment::Index(i)) if *i < items.len() => {
                items[*i] = value;
            }
            (Value::Array(items), PathSegment::Index(i)) if *i == items.len() => {
                items.push(value);
            }
            _ => return Err(unresolved(path, leaf)),
        }

        self.root = Arc::new(next);
        Ok(())
    }

    /// Converts the draft back into a typed document.
    pub fn to_document(&self) -> serde_json::Result<ContentDocument> {
        ContentDocument::from_value(Value::clone(&self.root))
    }
}

fn child<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(map), segment) => map.get(&segment.to_string()),
        (Value::Array(items), PathSegment::Index(i)) => items.get(*i),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (node, segment) {
        (Value::Object(map), segment) => map.get_mut(&segment.to_string()),
        (Value::Array(items), PathSegment::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

fn unresolved(path: &FieldPath, at: &PathSegment) -> PathError {
    PathError::Unresolved {
        path: path.to_string(),
        at: at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tests::sample_json;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(path("site.name"), FieldPath::root().key("site").key("name"));
        assert_eq!(
            path("about.philosophy.values[0].title"),
            FieldPath::root()
                .key("about")
                .key("philosophy")
                .key("values")
                .index(0)
                .key("title")
        );
        assert_eq!(path("destinations.2.countries"), path("destinations[2].countries"));
        assert_eq!(path("a[1][2]"), FieldPath::root().key("a").index(1).index(2));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("site..name".parse::<FieldPath>().is_err());
        assert!("values[x]".parse::<FieldPath>().is_err());
        assert!("values[0".parse::<FieldPath>().is_err());
        assert!("values[0]x".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let p = path("about.philosophy.values[0].title");
        assert_eq!(p.to_string(), "about.philosophy.values[0].title");
        assert_eq!(p.to_string().parse::<FieldPath>().unwrap(), p);
    }

    #[test]
    fn test_from_string_segments() {
        let parts = ["about", "philosophy", "values"];
        assert_eq!(FieldPath::from(&parts[..]), path("about.philosophy.values"));
    }

    #[test]
    fn test_update_sets_leaf_and_leaves_siblings() {
        let mut draft = Draft::new(sample_json());
        let before = draft.value().clone();

        draft.update_field(&path("site.name"), json!("Raou")).unwrap();

        assert_eq!(draft.get(&path("site.name")), Some(&json!("Raou")));
        assert_eq!(draft.get(&path("site.tagline")), before.pointer("/site/tagline"));
        assert_eq!(draft.get(&path("footer")), before.pointer("/footer"));
    }

    #[test]
    fn test_update_array_element_and_whole_array() {
        let mut draft = Draft::new(sample_json());

        draft
            .update_field(&path("about.philosophy.values[0].title"), json!("Craft"))
            .unwrap();
        assert_eq!(
            draft.get(&path("about.philosophy.values[0]")),
            Some(&json!({"title": "Craft", "description": "Always"}))
        );

        let values = json!([{"title": "A", "description": "a"}, {"title": "B", "description": "b"}]);
        draft
            .update_field(&path("about.philosophy.values"), values.clone())
            .unwrap();
        assert_eq!(draft.get(&path("about.philosophy.values")), Some(&values));
    }

    #[test]
    fn test_update_appends_one_past_end() {
        let mut draft = Draft::new(sample_json());
        draft
            .update_field(&path("about.whatWereAbout.paragraphs[2]"), json!("Three"))
            .unwrap();
        assert_eq!(
            draft.get(&path("about.whatWereAbout.paragraphs")),
            Some(&json!(["One", "Two", "Three"]))
        );
    }

    #[test]
    fn test_update_does_not_touch_earlier_snapshot() {
        let mut draft = Draft::new(sample_json());
        let snapshot = draft.snapshot();

        draft.update_field(&path("site.name"), json!("Raou")).unwrap();

        assert_eq!(snapshot.pointer("/site/name"), Some(&json!("Raou Travel")));
        assert!(!Arc::ptr_eq(&snapshot, &draft.snapshot()));
    }

    #[test]
    fn test_unresolved_paths_fail_without_change() {
        let mut draft = Draft::new(sample_json());
        let before = draft.clone();

        assert!(matches!(
            draft.update_field(&path("nope.name"), json!(1)),
            Err(PathError::Unresolved { .. })
        ));
        assert!(draft.update_field(&path("site.name.deeper"), json!(1)).is_err());
        assert!(draft
            .update_field(&path("about.whatWereAbout.paragraphs[5]"), json!("x"))
            .is_err());
        assert_eq!(draft.update_field(&FieldPath::root(), json!({})), Err(PathError::Empty));

        assert_eq!(draft, before);
    }

    #[test]
    fn test_to_document() {
        let mut draft = Draft::new(sample_json());
        draft.update_field(&path("site.name"), json!("Raou")).unwrap();
        assert_eq!(draft.to_document().unwrap().site.name, "Raou");

        draft.update_field(&path("site.name"), json!(42)).unwrap();
        assert!(draft.to_document().is_err());
    }
}
