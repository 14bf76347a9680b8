use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use log::*;
use serde::{de::DeserializeOwned, Serialize};

/// A value that lives in a single named storage slot, the way the browser
/// front end kept its cart under one `localStorage` key.
pub trait Document: Serialize + DeserializeOwned {
    const KEY: &'static str;
}

pub trait Storage {
    fn load<D: Document>(&self) -> Result<Option<D>>;
    fn save<D: Document>(&self, document: &D) -> Result<()>;
    fn remove<D: Document>(&self) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<&'static str, serde_json::Value>>>,
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load<D: Document>(&self) -> Result<Option<D>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?;
        let doc = match slots.get(D::KEY) {
            Some(json) => Some(
                serde_json::from_value(json.clone())
                    .with_context(|| format!("decode document {}", D::KEY))?,
            ),
            None => None,
        };
        trace!("load {} -> present:{}", D::KEY, doc.is_some());
        Ok(doc)
    }

    fn save<D: Document>(&self, document: &D) -> Result<()> {
        let json = serde_json::to_value(document)
            .with_context(|| format!("encode document {}", D::KEY))?;
        self.slots
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?
            .insert(D::KEY, json);
        trace!("saved {}", D::KEY);
        Ok(())
    }

    fn remove<D: Document>(&self) -> Result<()> {
        self.slots
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?
            .remove(D::KEY);
        Ok(())
    }
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        FileStorage { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn load<D: Document>(&self) -> Result<Option<D>> {
        let path = self.path_of(D::KEY);
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No document at {:?}", path);
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("read {:?}", path)),
        };
        let doc = serde_json::from_slice(&body)
            .with_context(|| format!("decode document {} from {:?}", D::KEY, path))?;
        debug!("Loaded {} from {:?}", D::KEY, path);
        Ok(Some(doc))
    }

    fn save<D: Document>(&self, document: &D) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("create {:?}", self.dir))?;
        let path = self.path_of(D::KEY);
        let tmp = self.dir.join(format!(".{}.json.tmp", D::KEY));
        {
            let mut f = fs::File::create(&tmp).with_context(|| format!("create {:?}", tmp))?;
            serde_json::to_writer(&mut f, document)
                .with_context(|| format!("encode document {}", D::KEY))?;
            f.flush()?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &path).with_context(|| format!("rename {:?} -> {:?}", tmp, path))?;
        debug!("Saved {} to {:?}", D::KEY, path);
        Ok(())
    }

    fn remove<D: Document>(&self) -> Result<()> {
        let path = self.path_of(D::KEY);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {:?}", path);
                Ok(())
            }
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {:?}", path)),
        }
    }
}
