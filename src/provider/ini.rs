//! Format-preserving INI file provider
//!
//! Edits happen line by line: comments, blank lines, ordering, and the
//! spacing around `=` of untouched lines survive every write. Only flat
//! `[section]` / `key = value` files are understood.

use log::{debug, trace};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::FileProvider;
use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// Blank line, comment, or anything else kept verbatim
    Verbatim(String),
    Header { raw: String, name: String },
    /// `prefix` is everything up to the value: indentation, key, `=`, spacing
    Setting {
        prefix: String,
        key: String,
        value: String,
    },
}

impl Line {
    fn setting(key: &str, value: &str) -> Self {
        Self::Setting {
            prefix: format!("{key} = "),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn header(name: &str) -> Self {
        Self::Header {
            raw: format!("[{name}]"),
            name: name.to_string(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Verbatim(raw) if raw.trim().is_empty())
    }

    fn render(&self) -> String {
        match self {
            Self::Verbatim(raw) | Self::Header { raw, .. } => raw.clone(),
            Self::Setting { prefix, value, .. } => format!("{prefix}{value}"),
        }
    }
}

/// Why a document could not be parsed, with a 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub line: usize,
    pub reason: String,
}

/// An INI file held as a list of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniDocument {
    lines: Vec<Line>,
    trailing_newline: bool,
    /// Line terminator of the source text, `\r\n` or `\n`
    newline: &'static str,
}

impl IniDocument {
    pub fn parse(text: &str) -> Result<Self, ParseFailure> {
        let mut lines = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let fail = |reason: &str| ParseFailure {
                line: index + 1,
                reason: reason.to_string(),
            };
            let trimmed = raw.trim();

            let line = if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';')
            {
                Line::Verbatim(raw.to_string())
            } else if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| fail("malformed section header"))?;
                Line::Header {
                    raw: raw.to_string(),
                    name: name.to_string(),
                }
            } else if let Some((left, right)) = raw.split_once('=') {
                let key = left.trim();
                if key.is_empty() {
                    return Err(fail("setting has no name"));
                }
                let value = right.trim_start();
                Line::Setting {
                    prefix: raw[..raw.len() - value.len()].to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                }
            } else {
                return Err(fail("expected `key = value`, a comment, or a [section] header"));
            };
            lines.push(line);
        }

        let newline = match text.find('\n') {
            Some(end) if text[..end].ends_with('\r') => "\r\n",
            _ => "\n",
        };
        Ok(Self {
            lines,
            trailing_newline: text.is_empty() || text.ends_with('\n'),
            newline,
        })
    }

    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(Line::render)
            .collect::<Vec<_>>()
            .join(self.newline);
        if self.trailing_newline && !self.lines.is_empty() {
            out.push_str(self.newline);
        }
        out
    }

    /// Raw value after `=`, leading whitespace removed
    pub fn get(&self, section: &str, key: &str) -> Result<Option<&str>, ProviderError> {
        Ok(self
            .locate(section, key)?
            .and_then(|index| match &self.lines[index] {
                Line::Setting { value, .. } => Some(value.as_str()),
                _ => None,
            }))
    }

    /// Update the setting in place, or insert it at the end of its section
    ///
    /// A section that does not exist yet is appended to the document.
    pub fn set(&mut self, section: &str, key: &str, new_value: &str) -> Result<(), ProviderError> {
        if let Some(reason) = unwritable_reason(section, key, new_value) {
            return Err(ProviderError::Unwritable {
                section: section.to_string(),
                setting: key.to_string(),
                reason: reason.to_string(),
            });
        }

        if let Some(index) = self.locate(section, key)? {
            if let Line::Setting { value, .. } = &mut self.lines[index] {
                trace!("Updating line {} of [{section}]", index + 1);
                *value = new_value.to_string();
            }
            return Ok(());
        }

        if let Some(anchor) = self.section_end(section) {
            trace!("Inserting {key} into [{section}] after line {}", anchor + 1);
            self.lines.insert(anchor + 1, Line::setting(key, new_value));
            return Ok(());
        }

        trace!("Appending new section [{section}]");
        if self.lines.last().is_some_and(|line| !line.is_blank()) {
            self.lines.push(Line::Verbatim(String::new()));
        }
        self.lines.push(Line::header(section));
        self.lines.push(Line::setting(key, new_value));
        self.trailing_newline = true;
        Ok(())
    }

    /// Delete the setting, returning whether anything was removed
    ///
    /// With `prune_empty`, headers of a section left without settings are
    /// dropped as well.
    pub fn remove(
        &mut self,
        section: &str,
        key: &str,
        prune_empty: bool,
    ) -> Result<bool, ProviderError> {
        let Some(index) = self.locate(section, key)? else {
            return Ok(false);
        };
        self.lines.remove(index);

        if prune_empty && self.settings_in(section) == 0 {
            debug!("Pruning empty section [{section}]");
            self.lines
                .retain(|line| !matches!(line, Line::Header { name, .. } if name == section));
        }
        Ok(true)
    }

    /// Indices of `key` lines inside `section`, across repeated headers
    fn positions(&self, section: &str, key: &str) -> Vec<usize> {
        let mut current: Option<&str> = None;
        let mut found = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            match line {
                Line::Header { name, .. } => current = Some(name),
                Line::Setting { key: k, .. } if current == Some(section) && k == key => {
                    found.push(index);
                }
                _ => {}
            }
        }
        found
    }

    fn locate(&self, section: &str, key: &str) -> Result<Option<usize>, ProviderError> {
        match self.positions(section, key).as_slice() {
            [] => Ok(None),
            [index] => Ok(Some(*index)),
            many => Err(ProviderError::Ambiguous {
                section: section.to_string(),
                setting: key.to_string(),
                reason: format!(
                    "defined {} times (lines {})",
                    many.len(),
                    many.iter()
                        .map(|i| (i + 1).to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }),
        }
    }

    /// Index of the last header or setting line belonging to `section`
    fn section_end(&self, section: &str) -> Option<usize> {
        let mut current: Option<&str> = None;
        let mut end = None;
        for (index, line) in self.lines.iter().enumerate() {
            match line {
                Line::Header { name, .. } => {
                    current = Some(name);
                    if name == section {
                        end = Some(index);
                    }
                }
                Line::Setting { .. } if current == Some(section) => end = Some(index),
                _ => {}
            }
        }
        end
    }

    fn settings_in(&self, section: &str) -> usize {
        let mut current: Option<&str> = None;
        let mut count = 0;
        for line in &self.lines {
            match line {
                Line::Header { name, .. } => current = Some(name),
                Line::Setting { .. } if current == Some(section) => count += 1,
                _ => {}
            }
        }
        count
    }
}

/// Why `section/key = value` would not read back as the same setting
fn unwritable_reason(section: &str, key: &str, value: &str) -> Option<&'static str> {
    if value.contains(['\n', '\r']) {
        Some("value spans multiple lines")
    } else if section.contains(['\n', '\r']) || key.contains(['\n', '\r']) {
        Some("name spans multiple lines")
    } else if section.contains(']') {
        Some("section name contains `]`")
    } else if key.contains('=') {
        Some("setting name contains `=`")
    } else if key.starts_with(['#', ';']) {
        Some("setting name would read as a comment")
    } else if key.starts_with('[') {
        Some("setting name would read as a section header")
    } else {
        None
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Provider backed by an INI file on disk
///
/// Every read-modify-write cycle holds an internal lock, so resources
/// applied in parallel against the same provider never interleave.
#[derive(Debug)]
pub struct IniFileProvider {
    path: PathBuf,
    create_missing: bool,
    prune_empty_sections: bool,
    lock: Mutex<()>,
}

impl IniFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_missing: false,
            prune_empty_sections: false,
            lock: Mutex::new(()),
        }
    }

    /// Treat a missing file as empty and create it on first write
    pub fn create_missing(mut self, create: bool) -> Self {
        self.create_missing = create;
        self
    }

    /// Drop section headers left without settings after a removal
    pub fn prune_empty_sections(mut self, prune: bool) -> Self {
        self.prune_empty_sections = prune;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot the file into an in-memory provider for previews
    pub fn stage(&self) -> Result<StagedIni, ProviderError> {
        let _guard = lock(&self.lock);
        let original = self.read_text()?;
        let document = self.parse(&original)?;
        Ok(StagedIni {
            location: self.location(),
            original,
            document: Mutex::new(document),
            prune_empty_sections: self.prune_empty_sections,
        })
    }

    fn read_text(&self) -> Result<String, ProviderError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound && self.create_missing => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                Ok(String::new())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ProviderError::NotFound(self.path.clone()))
            }
            Err(source) => Err(ProviderError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn parse(&self, text: &str) -> Result<IniDocument, ProviderError> {
        IniDocument::parse(text).map_err(|failure| ProviderError::Parse {
            path: self.path.clone(),
            line: failure.line,
            reason: failure.reason,
        })
    }

    fn load(&self) -> Result<IniDocument, ProviderError> {
        let text = self.read_text()?;
        self.parse(&text)
    }

    /// Write through a sibling temp file and rename over the target
    fn store(&self, document: &IniDocument) -> Result<(), ProviderError> {
        let tmp = temp_path(&self.path);
        let result = self
            .ensure_parent()
            .and_then(|()| fs::write(&tmp, document.render()))
            .and_then(|()| match fs::metadata(&self.path) {
                Ok(meta) => fs::set_permissions(&tmp, meta.permissions()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e),
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(source) = result {
            let _ = fs::remove_file(&tmp);
            return Err(ProviderError::Write {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    fn ensure_parent(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if self.create_missing && !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)
            }
            _ => Ok(()),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl FileProvider for IniFileProvider {
    fn read(&self, section: &str, setting: &str) -> Result<Option<String>, ProviderError> {
        let _guard = lock(&self.lock);
        let document = self.load()?;
        Ok(document.get(section, setting)?.map(str::to_string))
    }

    fn write(&self, section: &str, setting: &str, value: &str) -> Result<(), ProviderError> {
        let _guard = lock(&self.lock);
        let mut document = self.load()?;
        document.set(section, setting, value)?;
        self.store(&document)?;
        debug!("Wrote {section}/{setting} to {}", self.path.display());
        Ok(())
    }

    fn remove(&self, section: &str, setting: &str) -> Result<(), ProviderError> {
        let _guard = lock(&self.lock);
        let mut document = self.load()?;
        if document.remove(section, setting, self.prune_empty_sections)? {
            self.store(&document)?;
            debug!("Removed {section}/{setting} from {}", self.path.display());
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory copy of an INI file that records edits without touching disk
#[derive(Debug)]
pub struct StagedIni {
    location: String,
    original: String,
    document: Mutex<IniDocument>,
    prune_empty_sections: bool,
}

impl StagedIni {
    /// File content at the time it was staged
    pub fn original(&self) -> &str {
        &self.original
    }

    /// File content with every staged edit applied
    pub fn render(&self) -> String {
        lock(&self.document).render()
    }
}

impl FileProvider for StagedIni {
    fn read(&self, section: &str, setting: &str) -> Result<Option<String>, ProviderError> {
        Ok(lock(&self.document)
            .get(section, setting)?
            .map(str::to_string))
    }

    fn write(&self, section: &str, setting: &str, value: &str) -> Result<(), ProviderError> {
        lock(&self.document).set(section, setting, value)
    }

    fn remove(&self, section: &str, setting: &str) -> Result<(), ProviderError> {
        lock(&self.document)
            .remove(section, setting, self.prune_empty_sections)
            .map(|_| ())
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
