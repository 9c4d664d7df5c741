use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[cfg(test)]
#[path = "meta_servers.test.rs"]
mod tests;

/// The set of metadata-service addresses known to a node.
///
/// Addresses are kept in first-seen order so a save followed by a load yields
/// the exact same sequence. Duplicates are dropped on every path into the set,
/// including deserialization. A JSON `null` decodes as the empty set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "Vec<String>")]
pub struct MetaServers(Vec<String>);

impl MetaServers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Merge `addrs` into the set, returning how many were not already known.
    pub fn extend<I, S>(&mut self, addrs: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: HashSet<String> = self.0.iter().cloned().collect();
        let before = self.0.len();
        for addr in addrs {
            let addr = addr.into();
            if seen.insert(addr.clone()) {
                self.0.push(addr);
            }
        }
        self.0.len() - before
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.0.iter().any(|a| a == addr)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for MetaServers {
    fn from(addrs: Vec<String>) -> Self {
        let mut servers = Self::new();
        servers.extend(addrs);
        servers
    }
}

impl From<Option<Vec<String>>> for MetaServers {
    fn from(addrs: Option<Vec<String>>) -> Self {
        addrs.map(Self::from).unwrap_or_default()
    }
}

impl From<MetaServers> for Vec<String> {
    fn from(servers: MetaServers) -> Self {
        servers.0
    }
}

impl<S: Into<String>> FromIterator<S> for MetaServers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut servers = Self::new();
        servers.extend(iter);
        servers
    }
}

impl<'a> IntoIterator for &'a MetaServers {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
