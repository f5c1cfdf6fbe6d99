//! Grouping of mapping rules by source file.

use iamc_model::{ColumnConfig, FileIdentity, MappingRule};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::dictionary::VariableDictionary;

/// One source file plus the rules that govern its conversion.
#[derive(Debug, Clone, Serialize)]
pub struct FileGroup {
    pub identity: FileIdentity,
    /// Rules in control-table order. Never empty.
    pub rules: Vec<MappingRule>,
    pub dictionary: VariableDictionary,
}

/// A later rule whose column selection differs from the group's first rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigConflict {
    /// Control-table data row of the disagreeing rule.
    pub row: usize,
    pub fields: Vec<&'static str>,
}

impl FileGroup {
    /// Column selection of the first rule. Later rows are not consulted.
    pub fn config(&self) -> &ColumnConfig {
        &self.rules[0].config
    }

    /// Rules whose column selection disagrees with the first rule. Purely
    /// diagnostic: [`FileGroup::config`] still returns the first rule's.
    pub fn config_conflicts(&self) -> Vec<ConfigConflict> {
        let first = self.config();
        self.rules[1..]
            .iter()
            .filter_map(|rule| {
                let fields = first.differing_fields(&rule.config);
                if fields.is_empty() {
                    None
                } else {
                    Some(ConfigConflict {
                        row: rule.row,
                        fields,
                    })
                }
            })
            .collect()
    }

    /// The source model as declared in the control table.
    pub fn declared_model(&self) -> &str {
        &self.identity.source_model
    }
}

/// Groups rules by (file location, file name, source model).
///
/// Groups come out in order of first appearance. Each group's dictionary is
/// built from its rules in table order, so a repeated original value keeps
/// the last row's canonical name.
pub fn group(rules: &[MappingRule]) -> Vec<FileGroup> {
    let mut groups: IndexMap<FileIdentity, Vec<MappingRule>> = IndexMap::new();
    for rule in rules {
        groups
            .entry(rule.identity.clone())
            .or_default()
            .push(rule.clone());
    }
    groups
        .into_iter()
        .map(|(identity, rules)| {
            let dictionary = VariableDictionary::from_rules(&rules);
            debug!(
                group = %identity,
                rules = rules.len(),
                entries = dictionary.len(),
                "file group resolved"
            );
            FileGroup {
                identity,
                rules,
                dictionary,
            }
        })
        .collect()
}
