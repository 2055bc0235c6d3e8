//! # Variable Snapshot
//!
//! Flat, lower-cased view of a target that precondition filters are matched
//! against. Keys are sorted so dumps and iteration are deterministic.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSnapshot(BTreeMap<String, String>);

impl VariableSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the URL variables: `input`, `baseurl`, `rooturl`, `hostname`,
    /// `host`, `port`, `path`, `file`, `scheme` and `query`.
    ///
    /// `path` is the directory part here, callers wanting the full path
    /// override it.
    pub fn from_url(url: &Url) -> Self {
        let mut vars = Self::new();
        let host = url.host_str().unwrap_or_default();
        let hostname = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let port = url
            .port_or_known_default()
            .map(|p| p.to_string())
            .unwrap_or_default();

        let full_path = url.path();
        let (directory, file) = match full_path.rsplit_once('/') {
            Some((dir, file)) => (dir, file),
            None => ("", full_path),
        };

        vars.insert("Input", url.as_str());
        vars.insert("BaseURL", url.as_str());
        vars.insert("RootURL", format!("{}://{}", url.scheme(), hostname));
        vars.insert("Hostname", hostname);
        vars.insert("Host", host);
        vars.insert("Port", port);
        vars.insert("Path", directory);
        vars.insert("File", file);
        vars.insert("Scheme", url.scheme());
        vars.insert("Query", url.query().unwrap_or_default());
        vars
    }

    /// Inserts `value` under the lower-cased `name`.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const MAX_DUMP_VALUE: usize = 255;

impl fmt::Display for VariableSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.iter().enumerate() {
            let value = value.trim_end();
            if value.chars().count() > MAX_DUMP_VALUE {
                let cut: String = value.chars().take(MAX_DUMP_VALUE).collect();
                writeln!(f, "{}. {key} => {cut} [...]", index + 1)?;
            } else {
                writeln!(f, "{}. {key} => {value}", index + 1)?;
            }
        }
        Ok(())
    }
}
