//! INI-file implementation of the `DefinitionStore` port.
//!
//! Load order is `<base>/procServ.conf`, then `<base>/procServ.d/*.conf`
//! sorted by file name. Missing files and a missing `procServ.d` are empty.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{DefinitionStore, LocalFs};
use crate::domain::error::ConfigError;
use crate::domain::ini::IniDocument;
use crate::domain::instance::{Definitions, InstanceDefinition};
use crate::infra::fs;

const CONFIG_SUFFIX: &str = ".conf";

/// Config tree rooted at one base directory.
pub struct IniConfigStore<F = fs::LocalFs> {
    fs: F,
    config_file: PathBuf,
    config_dir: PathBuf,
}

impl IniConfigStore {
    #[must_use]
    pub fn new(config_file: PathBuf, config_dir: PathBuf) -> Self {
        Self::with_fs(fs::LocalFs, config_file, config_dir)
    }
}

impl<F: LocalFs> IniConfigStore<F> {
    #[must_use]
    pub fn with_fs(fs: F, config_file: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            fs,
            config_file,
            config_dir,
        }
    }

    /// Every existing config file, in load order.
    fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if self.fs.exists(&self.config_file) {
            files.push(self.config_file.clone());
        }
        for name in self.fs.list_dir(&self.config_dir)? {
            if name.ends_with(CONFIG_SUFFIX) && !name.starts_with('.') {
                files.push(self.config_dir.join(name));
            }
        }
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<Option<IniDocument>> {
        let Some(text) = self.fs.read_if_exists(path)? else {
            return Ok(None);
        };
        let doc = IniDocument::parse(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            line: e.line,
            message: e.message,
        })?;
        Ok(Some(doc))
    }

    fn documents(&self) -> Result<Vec<(PathBuf, IniDocument)>> {
        let mut docs = Vec::new();
        for path in self.files()? {
            if let Some(doc) = self.read(&path)? {
                docs.push((path, doc));
            }
        }
        Ok(docs)
    }
}

impl<F: LocalFs> DefinitionStore for IniConfigStore<F> {
    fn load(&self) -> Result<Definitions> {
        let docs = self.documents()?;
        let definitions = Definitions::from_documents(docs.iter().map(|(p, d)| (p.as_path(), d)))?;
        tracing::debug!(count = definitions.len(), "loaded definitions");
        Ok(definitions)
    }

    fn definition_file(&self, name: &str) -> PathBuf {
        self.config_dir.join(format!("{name}{CONFIG_SUFFIX}"))
    }

    fn write(&self, definition: &InstanceDefinition, target: &Path) -> Result<()> {
        if let Some(parent) = target.parent() {
            self.fs
                .create_dir_all(parent)
                .with_context(|| format!("preparing {}", parent.display()))?;
        }
        let doc = IniDocument {
            defaults: Vec::new(),
            sections: vec![definition.to_section()],
        };
        self.fs.write_atomic(target, &doc.render())?;
        tracing::info!(path = %target.display(), name = %definition.name, "wrote definition");
        Ok(())
    }

    fn locate(&self, name: &str) -> Result<Vec<PathBuf>> {
        Ok(self
            .documents()?
            .into_iter()
            .filter(|(_, doc)| doc.section(name).is_some())
            .map(|(path, _)| path)
            .collect())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let mut removed = false;
        for (path, mut doc) in self.documents()? {
            if !doc.remove_section(name) {
                continue;
            }
            removed = true;
            if doc.sections.is_empty() {
                self.fs.remove_file(&path)?;
                tracing::info!(path = %path.display(), "deleted empty config file");
            } else {
                self.fs.write_atomic(&path, &doc.render())?;
                tracing::info!(path = %path.display(), %name, "removed section");
            }
        }
        Ok(removed)
    }
}
