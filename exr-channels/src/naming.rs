//! Default channel names by channel count.
//!
//! A [`ChannelNameConvention`] decides which names an image gets when the
//! caller does not name its channels. The seeded conventions follow the usual
//! EXR layout: a single channel is luminance `Y`, three channels are `R G B`
//! and four are `R G B A`.
//!
//! Conventions can be owned and passed explicitly to the `*_with` entry
//! points, or installed as the process-wide default used by the plain entry
//! points. The process-wide table is guarded by a lock, so concurrent readers
//! and writers are safe, but a caller that changes the defaults while another
//! thread relies on them must still order those calls itself.

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ChannelError, Result};

/// Mapping from channel count to the ordered default names for that count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNameConvention {
    names: BTreeMap<usize, Vec<String>>,
}

impl Default for ChannelNameConvention {
    fn default() -> Self {
        let mut names = BTreeMap::new();
        names.insert(1, vec!["Y".to_string()]);
        names.insert(3, ["R", "G", "B"].map(String::from).to_vec());
        names.insert(4, ["R", "G", "B", "A"].map(String::from).to_vec());
        Self { names }
    }
}

impl ChannelNameConvention {
    /// Convention seeded with `Y`, `RGB` and `RGBA`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convention with no registered counts.
    pub fn empty() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    /// Replace the default names for `count` channels.
    pub fn set<I, S>(&mut self, count: usize, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        validate_names(count, &names)?;
        debug!("default channel names for {count} channels set to {names:?}");
        self.names.insert(count, names);
        Ok(())
    }

    /// Default names for `count` channels.
    pub fn get(&self, count: usize) -> Result<&[String]> {
        self.names
            .get(&count)
            .map(Vec::as_slice)
            .ok_or_else(|| ChannelError::UnknownChannelCount {
                count,
                known: self.known_counts(),
            })
    }

    /// Channel counts with a registered convention, ascending.
    pub fn known_counts(&self) -> Vec<usize> {
        self.names.keys().copied().collect()
    }

    /// Names for `count` channels: the explicit list if given, else the default.
    ///
    /// Explicit names must have exactly `count` distinct entries.
    pub fn resolve(&self, count: usize, explicit: Option<&[&str]>) -> Result<Vec<String>> {
        match explicit {
            Some(names) => {
                let names: Vec<String> = names.iter().map(|name| name.to_string()).collect();
                if names.len() != count {
                    return Err(ChannelError::NameCountMismatch {
                        expected: count,
                        names,
                    });
                }
                check_distinct(&names)?;
                Ok(names)
            }
            None => Ok(self.get(count)?.to_vec()),
        }
    }

    /// Save as pretty JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON, validating every entry.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let convention: ChannelNameConvention = serde_json::from_str(&json)?;
        for (&count, names) in &convention.names {
            validate_names(count, names)?;
        }
        debug!(
            "loaded channel name convention for counts {:?} from {}",
            convention.known_counts(),
            path.display()
        );
        Ok(convention)
    }
}

fn validate_names(count: usize, names: &[String]) -> Result<()> {
    if count == 0 {
        return Err(ChannelError::ZeroChannelCount);
    }
    if names.len() != count {
        return Err(ChannelError::NameCountMismatch {
            expected: count,
            names: names.to_vec(),
        });
    }
    check_distinct(names)
}

pub(crate) fn check_distinct(names: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ChannelError::DuplicateChannelName {
                name: name.clone(),
                names: names.to_vec(),
            });
        }
    }
    Ok(())
}

static DEFAULT_CONVENTION: Lazy<RwLock<ChannelNameConvention>> =
    Lazy::new(|| RwLock::new(ChannelNameConvention::default()));

// The table is replaced or extended in a single insert, so a writer that
// panicked cannot have left it half-updated.
fn read_defaults() -> RwLockReadGuard<'static, ChannelNameConvention> {
    DEFAULT_CONVENTION.read().unwrap_or_else(|poisoned| {
        warn!("default channel name table lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write_defaults() -> RwLockWriteGuard<'static, ChannelNameConvention> {
    DEFAULT_CONVENTION.write().unwrap_or_else(|poisoned| {
        warn!("default channel name table lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Set the process-wide default names for `count` channels.
///
/// # Example
/// ```
/// use exr_channels::{get_default_channel_names, set_default_channel_names};
///
/// set_default_channel_names(2, ["U", "V"]).unwrap();
/// assert_eq!(get_default_channel_names(2).unwrap(), vec!["U", "V"]);
/// ```
pub fn set_default_channel_names<I, S>(count: usize, names: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    write_defaults().set(count, names)
}

/// Process-wide default names for `count` channels.
pub fn get_default_channel_names(count: usize) -> Result<Vec<String>> {
    read_defaults().get(count).map(<[String]>::to_vec)
}

/// Snapshot of the process-wide convention.
///
/// The lock is released on return, so later changes to the defaults do not
/// affect the snapshot.
pub fn default_convention() -> ChannelNameConvention {
    read_defaults().clone()
}

/// Replace the whole process-wide convention, e.g. with one loaded from a file.
pub fn install_default_convention(convention: ChannelNameConvention) {
    *write_defaults() = convention;
}

/// Restore the seeded process-wide defaults.
pub fn reset_default_channel_names() {
    install_default_convention(ChannelNameConvention::default());
}
