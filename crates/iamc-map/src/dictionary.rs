//! Lookup dictionaries.

use std::collections::BTreeMap;

use iamc_model::MappingRule;
use serde::Serialize;

/// Original variable key to canonical variable name.
///
/// Keys and values are trimmed. A repeated key keeps the value inserted
/// last, so the result depends on control-table row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableDictionary {
    entries: BTreeMap<String, String>,
}

impl VariableDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from rules in the given order.
    pub fn from_rules<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a MappingRule>,
    {
        let mut dict = Self::new();
        for rule in rules {
            dict.insert(&rule.original_value, &rule.new_name);
        }
        dict
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        let mut dict = Self::new();
        for (original, canonical) in pairs {
            dict.insert(original, canonical);
        }
        dict
    }

    /// Inserts one mapping. A blank canonical name contributes nothing.
    pub fn insert(&mut self, original: &str, canonical: &str) {
        let canonical = canonical.trim();
        if canonical.is_empty() {
            return;
        }
        self.entries
            .insert(original.trim().to_string(), canonical.to_string());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// A copy of `base` with this dictionary's entries laid over it.
    pub fn overlay_on(&self, base: &VariableDictionary) -> VariableDictionary {
        let mut merged = base.clone();
        for (original, canonical) in &self.entries {
            merged.entries.insert(original.clone(), canonical.clone());
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Synonym table for regions, scenarios or models.
///
/// Lookups fall back to the value itself; nothing is ever dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueDictionary {
    entries: BTreeMap<String, String>,
}

impl ValueDictionary {
    /// Later pairs win. Pairs with a blank target are ignored so the source
    /// value passes through.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        let mut entries = BTreeMap::new();
        for (source, target) in pairs {
            let (source, target) = (source.trim(), target.trim());
            if source.is_empty() || target.is_empty() {
                continue;
            }
            entries.insert(source.to_string(), target.to_string());
        }
        Self { entries }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.contains_key(value)
    }

    pub fn get(&self, value: &str) -> Option<&str> {
        self.entries.get(value).map(String::as_str)
    }

    /// The mapped value, or `value` unchanged.
    pub fn translate(&self, value: &str) -> String {
        self.get(value).unwrap_or(value).to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run-wide dictionaries shared by every file group.
///
/// A `None` dictionary means that kind of substitution is skipped.
#[derive(Debug, Clone, Default)]
pub struct DictionarySet {
    /// Base variable dictionary under each group's own rules.
    pub variables: Option<VariableDictionary>,
    pub regions: Option<ValueDictionary>,
    pub scenarios: Option<ValueDictionary>,
    pub models: Option<ValueDictionary>,
}

impl DictionarySet {
    /// Dictionaries from the control workbook only. A region sheet without
    /// usable pairs disables region substitution.
    pub fn from_region_pairs(regions: Option<&[(String, String)]>) -> Self {
        Self {
            regions: regions.map(ValueDictionary::from_pairs).and_then(non_empty),
            ..Self::default()
        }
    }

    /// Adds the sheets of a dictionary file. Region pairs from the control
    /// workbook, if any, stay on top of the file's pairs. Empty sheets leave
    /// that kind of substitution off.
    pub fn with_dictionary_pairs(
        mut self,
        variables: &[(String, String)],
        regions: &[(String, String)],
        scenarios: &[(String, String)],
        models: &[(String, String)],
    ) -> Self {
        let variables = VariableDictionary::from_pairs(variables);
        self.variables = (!variables.is_empty()).then_some(variables);
        let mut region_dict = ValueDictionary::from_pairs(regions);
        if let Some(existing) = self.regions.take() {
            region_dict.entries.extend(existing.entries);
        }
        self.regions = non_empty(region_dict);
        self.scenarios = non_empty(ValueDictionary::from_pairs(scenarios));
        self.models = non_empty(ValueDictionary::from_pairs(models));
        self
    }
}

fn non_empty(dictionary: ValueDictionary) -> Option<ValueDictionary> {
    (!dictionary.is_empty()).then_some(dictionary)
}
