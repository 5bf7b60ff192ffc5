//! Reading grammars and engine options from files
//!
//! Grammars are YAML (`.yaml`, `.yml`) or JSON (`.json`); the extension picks
//! the parser. Anything else is read as YAML, which also accepts JSON.

use crate::config::EngineOptions;
use crate::grammar::Grammar;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarFormat {
    Yaml,
    Json,
}

impl GrammarFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => GrammarFormat::Json,
            _ => GrammarFormat::Yaml,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn from_yaml(text: &str) -> Result<Grammar, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

pub fn from_json(text: &str) -> Result<Grammar, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn load_grammar(path: impl AsRef<Path>) -> Result<Grammar, LoadError> {
    let path = path.as_ref();
    let text = read(path)?;
    let grammar = match GrammarFormat::from_path(path) {
        GrammarFormat::Yaml => from_yaml(&text).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
        GrammarFormat::Json => from_json(&text).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?,
    };
    debug!(path = %path.display(), grammar = %grammar.name, states = grammar.states.len(), "loaded grammar");
    Ok(grammar)
}

pub fn load_grammars<I, P>(paths: I) -> Result<Vec<Grammar>, LoadError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().map(load_grammar).collect()
}

/// Read [`EngineOptions`] from a YAML file
pub fn load_options(path: impl AsRef<Path>) -> Result<EngineOptions, LoadError> {
    let path = path.as_ref();
    let text = read(path)?;
    serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
