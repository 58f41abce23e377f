//! Insertion-ordered mapping from channel names to 2D arrays.

use crate::sample::SampleArray;

/// Channel name to array mapping.
///
/// Iteration follows insertion order. Inserting a name that is already
/// present replaces its data without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelMap {
    channels: Vec<(String, SampleArray)>,
}

impl ChannelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Vec::with_capacity(capacity),
        }
    }

    /// Insert or replace a channel, returning the previous data for `name`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        data: impl Into<SampleArray>,
    ) -> Option<SampleArray> {
        let name = name.into();
        let data = data.into();
        match self.channels.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, data)),
            None => {
                self.channels.push((name, data));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SampleArray> {
        self.channels
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, data)| data)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a channel, keeping the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<SampleArray> {
        let index = self.channels.iter().position(|(existing, _)| existing == name)?;
        Some(self.channels.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel names in iteration order.
    pub fn names(&self) -> Vec<String> {
        self.channels.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleArray)> {
        self.channels
            .iter()
            .map(|(name, data)| (name.as_str(), data))
    }
}

impl<S: Into<String>> FromIterator<(S, SampleArray)> for ChannelMap {
    fn from_iter<I: IntoIterator<Item = (S, SampleArray)>>(iter: I) -> Self {
        let mut map = ChannelMap::new();
        for (name, data) in iter {
            map.insert(name, data);
        }
        map
    }
}

impl IntoIterator for ChannelMap {
    type Item = (String, SampleArray);
    type IntoIter = std::vec::IntoIter<(String, SampleArray)>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.into_iter()
    }
}
