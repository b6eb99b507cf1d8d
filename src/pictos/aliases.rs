//! Semantic alias table
//!
//! Maps a concept to synonym search terms tried when the literal word has no
//! direct match. Lookup is exact on the normalized word; there is no fuzzy
//! matching or stemming.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::normalize::normalize;

/// Built-in core vocabulary, Portuguese first
const BUILTIN: &[(&str, &[&str])] = &[
    ("beber", &["beber", "tomar"]),
    ("comer", &["comida", "alimentar"]),
    ("quero", &["querer", "desejar"]),
    ("querer", &["quero", "desejar"]),
    ("agua", &["água", "beber agua", "copo de agua"]),
    ("banheiro", &["vaso sanitario", "toalete", "wc"]),
    ("xixi", &["urinar", "banheiro"]),
    ("dormir", &["cama", "sono", "descansar"]),
    ("brincar", &["jogar", "brinquedo"]),
    ("mae", &["mamae", "mãe"]),
    ("mamae", &["mãe"]),
    ("pai", &["papai"]),
    ("papai", &["pai"]),
    ("vovo", &["avó", "avô"]),
    ("vovó", &["avó"]),
    ("dor", &["doer", "machucado"]),
    ("eu", &["mim", "pessoa"]),
    ("voce", &["tu"]),
    ("casa", &["lar"]),
    ("escola", &["colegio", "sala de aula"]),
    ("feliz", &["alegre", "contente"]),
    ("triste", &["chorar"]),
    ("sim", &["afirmar"]),
    ("nao", &["negar"]),
    ("ajuda", &["ajudar", "socorro"]),
    ("passear", &["passeio", "andar"]),
    ("tv", &["televisao"]),
];

static BUILTIN_TABLE: Lazy<AliasTable> = Lazy::new(|| AliasTable::from_pairs(BUILTIN.iter().copied()));

/// Concept to synonyms, stored in normalized form
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// The built-in table
    pub fn builtin() -> &'static AliasTable {
        &BUILTIN_TABLE
    }

    /// Build a table from raw pairs, normalizing keys and synonyms.
    ///
    /// Synonym order is kept; later duplicates of a synonym are dropped.
    pub fn from_pairs<'a, I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, S)>,
        S: AsRef<[&'a str]>,
    {
        let mut table = AliasTable::default();
        for (concept, synonyms) in pairs {
            table.insert(concept, synonyms.as_ref().iter().copied());
        }
        table
    }

    /// Add synonyms for a concept, appending after existing ones
    pub fn insert<'a>(&mut self, concept: &str, synonyms: impl IntoIterator<Item = &'a str>) {
        let key = normalize(concept);
        if key.is_empty() {
            return;
        }
        let entry = self.entries.entry(key).or_default();
        for synonym in synonyms {
            let s = normalize(synonym);
            if !s.is_empty() && !entry.contains(&s) {
                entry.push(s);
            }
        }
    }

    /// Merge user-provided aliases from a JSON object `{ "concept": ["synonym", ...] }`.
    ///
    /// User synonyms are tried before built-in ones for the same concept.
    pub fn merge_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read alias file: {:?}", path))?;
        let user: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid alias file: {:?}", path))?;

        let count = user.len();
        for (concept, synonyms) in user {
            let key = normalize(&concept);
            let existing = self.entries.remove(&key).unwrap_or_default();
            self.insert(&concept, synonyms.iter().map(String::as_str));
            self.insert(&concept, existing.iter().map(String::as_str));
        }
        Ok(count)
    }

    /// Synonyms for a word, in table order. Empty when the word is not a concept.
    pub fn aliases_for(&self, word: &str) -> &[String] {
        self.entries
            .get(&normalize(word))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
