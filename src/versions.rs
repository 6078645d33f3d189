//! Server version picker form
//!
//! Keeps the version picker and the custom jar input in step: picking a
//! version copies it into the jar input, typing in the jar input resets the
//! picker to its first entry.

use crate::error::Result;
use crate::forms::{FieldConstraints, FieldValidity};
use tracing::warn;

/// Label of the picker's first entry; its value is empty
pub const PICKER_PROMPT: &str = "Choose a version";

const JAR_REQUIRED_MSG: &str = "Please enter a jar name";

/// One downloadable server version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// e.g. `1.20.1` or `23w31a`
    pub version: String,
    /// e.g. `minecraft_server-1.20.1.jar`
    pub jar_name: String,
}

impl VersionEntry {
    /// Parse `minecraft_server-<version>.jar`
    pub fn from_jar_name(jar_name: &str) -> Option<Self> {
        let (_, rest) = jar_name.split_once('-')?;
        let (version, _) = rest.rsplit_once('.')?;
        if version.is_empty() {
            return None;
        }
        Some(Self {
            version: version.to_string(),
            jar_name: jar_name.to_string(),
        })
    }

    /// Stable releases are purely numeric (`1.20.1`)
    pub fn is_stable(&self) -> bool {
        self.version
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.')
    }

    fn numeric_key(&self) -> Vec<u64> {
        self.version
            .split('.')
            .map(|part| part.parse().unwrap_or(0))
            .collect()
    }
}

/// Stable and snapshot versions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    /// Newest first
    pub stable: Vec<VersionEntry>,
    /// Input order
    pub snapshot: Vec<VersionEntry>,
}

impl VersionCatalog {
    /// Classify jar names; unparseable names are skipped
    pub fn from_jar_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for name in names {
            let name = name.as_ref();
            match VersionEntry::from_jar_name(name) {
                Some(entry) if entry.is_stable() => catalog.stable.push(entry),
                Some(entry) => catalog.snapshot.push(entry),
                None => warn!("Skipping unrecognized server jar name: {}", name),
            }
        }
        catalog
            .stable
            .sort_by(|a, b| b.numeric_key().cmp(&a.numeric_key()));
        catalog
    }

    pub fn group(&self, snapshots: bool) -> &[VersionEntry] {
        if snapshots {
            &self.snapshot
        } else {
            &self.stable
        }
    }
}

/// Which form controls are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionVisibility {
    pub stable_versions: bool,
    pub snapshot_versions: bool,
    pub version_picker: bool,
    pub use_snapshot: bool,
    pub jar_input: bool,
}

/// Version picker form state
#[derive(Debug, Clone)]
pub struct VersionForm {
    catalog: VersionCatalog,
    selected: usize,
    use_snapshot: bool,
    use_custom: bool,
    jar_input: String,
    jar_field: FieldValidity,
}

impl VersionForm {
    pub fn new(catalog: VersionCatalog) -> Self {
        Self {
            catalog,
            selected: 0,
            use_snapshot: false,
            use_custom: false,
            jar_input: String::new(),
            jar_field: FieldValidity::new(FieldConstraints::new().required(JAR_REQUIRED_MSG)),
        }
    }

    /// Picker entries: the prompt, then the visible group
    pub fn options(&self) -> Vec<&str> {
        std::iter::once(PICKER_PROMPT)
            .chain(
                self.catalog
                    .group(self.use_snapshot)
                    .iter()
                    .map(|entry| entry.version.as_str()),
            )
            .collect()
    }

    /// Value of a picker entry; the prompt's value is empty
    fn option_value(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return Some("");
        }
        self.catalog
            .group(self.use_snapshot)
            .get(index - 1)
            .map(|entry| entry.version.as_str())
    }

    /// Pick an entry and mirror its value into the jar input
    ///
    /// Returns false for an index outside the picker.
    pub fn select_version(&mut self, index: usize) -> bool {
        let Some(value) = self.option_value(index).map(str::to_string) else {
            return false;
        };
        self.selected = index;
        self.jar_input = value;
        true
    }

    /// Pick by version string
    pub fn select_by_version(&mut self, version: &str) -> bool {
        let position = self.options().iter().skip(1).position(|v| *v == version);
        match position {
            Some(pos) => self.select_version(pos + 1),
            None => false,
        }
    }

    /// Type into the jar input; resets the picker
    pub fn edit_jar_input(&mut self, text: impl Into<String>) {
        self.jar_input = text.into();
        self.jar_field.on_input();
        self.reset_picker();
    }

    /// Switch between stable and snapshot versions; resets the picker
    pub fn set_use_snapshot(&mut self, use_snapshot: bool) {
        self.reset_picker();
        self.use_snapshot = use_snapshot;
    }

    /// Switch between the picker and the custom jar input
    pub fn set_use_custom(&mut self, use_custom: bool) {
        self.use_custom = use_custom;
    }

    pub fn reset_picker(&mut self) {
        self.selected = 0;
    }

    pub fn visibility(&self) -> VersionVisibility {
        VersionVisibility {
            stable_versions: !self.use_snapshot,
            snapshot_versions: self.use_snapshot,
            version_picker: !self.use_custom,
            use_snapshot: !self.use_custom,
            jar_input: self.use_custom,
        }
    }

    /// Jar input lost focus
    pub fn jar_input_blurred(&mut self) {
        let value = self.jar_input.clone();
        self.jar_field.on_focus_out(&value);
    }

    /// Validated jar name for submission
    pub fn jar_name(&mut self) -> Result<String> {
        let value = self.jar_input.trim().to_string();
        self.jar_field.validate(&value)?;
        Ok(value)
    }

    /// Catalog entry matching the jar input, if any
    pub fn selected_entry(&self) -> Option<&VersionEntry> {
        self.catalog
            .stable
            .iter()
            .chain(self.catalog.snapshot.iter())
            .find(|entry| entry.version == self.jar_input || entry.jar_name == self.jar_input)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn jar_input(&self) -> &str {
        &self.jar_input
    }

    pub fn use_snapshot(&self) -> bool {
        self.use_snapshot
    }

    pub fn use_custom(&self) -> bool {
        self.use_custom
    }

    pub fn jar_field(&self) -> &FieldValidity {
        &self.jar_field
    }
}
