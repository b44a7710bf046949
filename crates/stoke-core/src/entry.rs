//! Entry configuration and hot-client injection.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Modules for one entry target: a single path or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryPoints {
    One(String),
    Many(Vec<String>),
}

impl EntryPoints {
    pub fn as_slice(&self) -> &[String] {
        match self {
            EntryPoints::One(path) => std::slice::from_ref(path),
            EntryPoints::Many(paths) => paths,
        }
    }

    fn prepended(&self, modules: &[String]) -> EntryPoints {
        let mut out = Vec::with_capacity(modules.len() + self.as_slice().len());
        out.extend_from_slice(modules);
        out.extend_from_slice(self.as_slice());
        EntryPoints::Many(out)
    }
}

impl From<&str> for EntryPoints {
    fn from(path: &str) -> Self {
        EntryPoints::One(path.to_string())
    }
}

/// Bundler entry configuration: anonymous modules or named targets.
///
/// Named targets keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Points(EntryPoints),
    Named(IndexMap<String, EntryPoints>),
}

impl Entry {
    pub fn single(path: impl Into<String>) -> Self {
        Entry::Points(EntryPoints::One(path.into()))
    }

    /// Every module referenced by the configuration, in order.
    pub fn modules(&self) -> Vec<&str> {
        match self {
            Entry::Points(points) => points.as_slice().iter().map(String::as_str).collect(),
            Entry::Named(targets) => targets
                .values()
                .flat_map(|points| points.as_slice().iter().map(String::as_str))
                .collect(),
        }
    }
}

impl Default for Entry {
    fn default() -> Self {
        Entry::single("./client.js")
    }
}

/// Prepend `modules` to every entry target.
///
/// Not idempotent: applying it twice prepends twice.
///
/// ```
/// use stoke_core::{add_entry, Entry};
///
/// let entry: Entry = serde_json::from_str(r#"{"a": "./a.js"}"#).unwrap();
/// let hot = vec!["./hot.js".to_string()];
/// assert_eq!(
///     serde_json::to_value(add_entry(&entry, &hot)).unwrap(),
///     serde_json::json!({"a": ["./hot.js", "./a.js"]}),
/// );
/// ```
pub fn add_entry(entry: &Entry, modules: &[String]) -> Entry {
    match entry {
        Entry::Points(points) => Entry::Points(points.prepended(modules)),
        Entry::Named(targets) => Entry::Named(
            targets
                .iter()
                .map(|(name, points)| (name.clone(), points.prepended(modules)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hot() -> Vec<String> {
        vec!["./hot.js".to_string()]
    }

    #[test]
    fn test_named_entry_keeps_names_and_order() {
        let entry: Entry = serde_json::from_value(json!({
            "zeta": "./z.js",
            "alpha": ["./a1.js", "./a2.js"],
        }))
        .unwrap();

        let result = add_entry(&entry, &hot());
        let Entry::Named(targets) = &result else {
            panic!("expected named entry");
        };

        let names: Vec<&str> = targets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(targets["alpha"].as_slice(), ["./hot.js", "./a1.js", "./a2.js"]);
    }

    #[test]
    fn test_single_string_entry() {
        let result = add_entry(&Entry::single("./index.js"), &hot());
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            json!(["./hot.js", "./index.js"])
        );
    }

    #[test]
    fn test_array_entry() {
        let entry: Entry = serde_json::from_value(json!(["./polyfills.js", "./index.js"])).unwrap();
        let result = add_entry(&entry, &hot());
        assert_eq!(
            result.modules(),
            vec!["./hot.js", "./polyfills.js", "./index.js"]
        );
    }

    #[test]
    fn test_applying_twice_prepends_twice() {
        let entry: Entry = serde_json::from_value(json!({"a": "./a.js"})).unwrap();
        let twice = add_entry(&add_entry(&entry, &hot()), &hot());
        assert_eq!(
            serde_json::to_value(twice).unwrap(),
            json!({"a": ["./hot.js", "./hot.js", "./a.js"]})
        );
    }

    #[test]
    fn test_empty_prepend_normalizes_to_lists() {
        let entry: Entry = serde_json::from_value(json!({"a": "./a.js"})).unwrap();
        let result = add_entry(&entry, &[]);
        assert_eq!(serde_json::to_value(result).unwrap(), json!({"a": ["./a.js"]}));
    }
}
