//! Static catalog of textual slide templates.

mod catalog;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, SlidecraftError};

/// Category bucket used to filter candidates before scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Hook,
    ValorDado,
    ValorInsight,
    ValorSolucao,
    ValorExemplo,
    Cta,
    Transition,
}

impl ModuleType {
    pub const ALL: [ModuleType; 7] = [
        ModuleType::Hook,
        ModuleType::ValorDado,
        ModuleType::ValorInsight,
        ModuleType::ValorSolucao,
        ModuleType::ValorExemplo,
        ModuleType::Cta,
        ModuleType::Transition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Hook => "hook",
            ModuleType::ValorDado => "valor_dado",
            ModuleType::ValorInsight => "valor_insight",
            ModuleType::ValorSolucao => "valor_solucao",
            ModuleType::ValorExemplo => "valor_exemplo",
            ModuleType::Cta => "cta",
            ModuleType::Transition => "transition",
        }
    }
}

impl std::fmt::Display for ModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextualTemplate {
    pub id: String,
    pub module_type: ModuleType,
    /// Short description of the narrative job this template does.
    pub function: String,
    /// Text pattern with `{placeholders}`.
    pub structure: String,
    /// Min and max character counts of a filled template.
    pub length_range: (usize, usize),
    pub tone: String,
    pub example: String,
    pub keywords: Vec<String>,
    /// Sentence used as the embedding anchor.
    pub semantic_description: String,
}

impl TextualTemplate {
    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.structure.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else { break };
            let name = after[..end].to_string();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
            rest = &after[end + 1..];
        }
        names
    }
}

/// The template corpus, ordered by id.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<TextualTemplate>,
    by_id: BTreeMap<String, usize>,
}

impl TemplateLibrary {
    /// The built-in 46-template catalog.
    pub fn builtin() -> Self {
        let mut templates = catalog::builtin_templates();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        let by_id = templates
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id.clone(), idx))
            .collect();
        Self { templates, by_id }
    }

    /// Build a library from arbitrary templates, rejecting duplicate ids.
    pub fn from_templates(mut templates: Vec<TextualTemplate>) -> Result<Self> {
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        let mut by_id = BTreeMap::new();
        for (idx, t) in templates.iter().enumerate() {
            if by_id.insert(t.id.clone(), idx).is_some() {
                return Err(SlidecraftError::Validation(format!(
                    "Duplicate template id: {}",
                    t.id
                )));
            }
            if t.length_range.0 > t.length_range.1 {
                return Err(SlidecraftError::Validation(format!(
                    "Template {} has inverted length range",
                    t.id
                )));
            }
        }
        Ok(Self { templates, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&TextualTemplate> {
        self.by_id.get(id).map(|idx| &self.templates[*idx])
    }

    /// Templates of one module type, in id order.
    pub fn by_module(&self, module: ModuleType) -> impl Iterator<Item = &TextualTemplate> {
        self.templates.iter().filter(move |t| t.module_type == module)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextualTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn module_types(&self) -> HashSet<ModuleType> {
        self.templates.iter().map(|t| t.module_type).collect()
    }
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_complete() {
        let lib = TemplateLibrary::builtin();
        assert_eq!(lib.len(), 46);
        assert!(TemplateLibrary::from_templates(lib.iter().cloned().collect()).is_ok());
        assert_eq!(lib.module_types().len(), ModuleType::ALL.len());
        for module in ModuleType::ALL {
            assert!(lib.by_module(module).count() >= 4, "pool {module} too small");
        }
    }

    #[test]
    fn builtin_entries_are_well_formed() {
        let lib = TemplateLibrary::builtin();
        for t in lib.iter() {
            assert!(!t.semantic_description.is_empty(), "{} has no anchor", t.id);
            assert!(!t.keywords.is_empty(), "{} has no keywords", t.id);
            assert!(t.length_range.0 < t.length_range.1, "{} range", t.id);
            assert!(!t.placeholders().is_empty(), "{} has no placeholders", t.id);
        }
    }

    #[test]
    fn iteration_is_id_ordered() {
        let lib = TemplateLibrary::builtin();
        let ids: Vec<&str> = lib.iter().map(|t| t.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let lib = TemplateLibrary::builtin();
        let first = lib.iter().next().unwrap().clone();
        let err = TemplateLibrary::from_templates(vec![first.clone(), first]).unwrap_err();
        assert!(err.to_string().contains("Duplicate template id"));
    }

    #[test]
    fn placeholders_in_order() {
        let lib = TemplateLibrary::builtin();
        let hook = lib.get("H01").unwrap();
        assert_eq!(hook.placeholders(), vec!["question", "tension"]);
    }
}
