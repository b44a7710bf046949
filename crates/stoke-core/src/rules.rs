//! Bundler module rules and a structure-preserving rewrite over them.
//!
//! A rule is an open-ended JSON object. Three keys hold nested rules:
//! `rules`, `oneOf` and `use`. Entries of `use` may be written as bare
//! loader names (`"style-loader"`); those read as `{ "loader": "style-loader" }`.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Rule>>,

    #[serde(
        rename = "use",
        default,
        deserialize_with = "deserialize_use",
        skip_serializing_if = "Option::is_none"
    )]
    pub uses: Option<Vec<Rule>>,

    /// Every other key (`test`, `include`, `loader`, `options`, ...).
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loader(name: impl Into<String>) -> Self {
        Self::new().with("loader", Value::String(name.into()))
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_one_of(mut self, rules: Vec<Rule>) -> Self {
        self.one_of = Some(rules);
        self
    }

    pub fn with_uses(mut self, uses: Vec<Rule>) -> Self {
        self.uses = Some(uses);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Total number of rules in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(Rule::node_count).sum::<usize>())
            .sum::<usize>()
    }

    fn children(&self) -> impl Iterator<Item = &Vec<Rule>> {
        [&self.rules, &self.one_of, &self.uses].into_iter().flatten()
    }
}

/// Apply `patch` to every rule in the tree, parents before children.
///
/// Each rule is patched first; the nested collections of the *patched* rule
/// are then rewritten recursively. Sibling order and nesting are unchanged.
pub fn override_rules<F>(rules: &[Rule], patch: &F) -> Vec<Rule>
where
    F: Fn(&Rule) -> Rule,
{
    rules
        .iter()
        .map(|rule| {
            let mut patched = patch(rule);
            for nested in [&mut patched.rules, &mut patched.one_of, &mut patched.uses]
                .into_iter()
                .flatten()
            {
                *nested = override_rules(nested, patch);
            }
            patched
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UseEntry {
    Loader(String),
    Rule(Rule),
}

impl From<UseEntry> for Rule {
    fn from(entry: UseEntry) -> Self {
        match entry {
            UseEntry::Loader(name) => Rule::loader(name),
            UseEntry::Rule(rule) => rule,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UseField {
    One(UseEntry),
    Many(Vec<UseEntry>),
}

fn deserialize_use<'de, D>(deserializer: D) -> Result<Option<Vec<Rule>>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<UseField>::deserialize(deserializer)?;
    Ok(field.map(|field| match field {
        UseField::One(entry) => vec![entry.into()],
        UseField::Many(entries) => entries.into_iter().map(Rule::from).collect(),
    }))
}
