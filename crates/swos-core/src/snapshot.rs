//! Sections and poll-cycle snapshots

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::record::{FieldValue, Record};

/// A logical group of device telemetry, each served by its own endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// System information (`sys.b`)
    Sys,
    /// Link status (`link.b`)
    Link,
    /// Port statistics (`stats.b`)
    Stats,
}

impl Section {
    /// Every known section, in poll order
    pub const ALL: [Section; 3] = [Section::Sys, Section::Link, Section::Stats];

    /// Stable section name used as the snapshot key
    pub fn name(self) -> &'static str {
        match self {
            Section::Sys => "sys",
            Section::Link => "link",
            Section::Stats => "stats",
        }
    }

    /// Endpoint paths to try, in precedence order: canonical first, then
    /// the legacy `!`-prefixed form
    pub fn candidates(self) -> [&'static str; 2] {
        match self {
            Section::Sys => ["sys.b", "!sys.b"],
            Section::Link => ["link.b", "!link.b"],
            Section::Stats => ["stats.b", "!stats.b"],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Section {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let name = s.trim().trim_start_matches('!');
        let name = name.strip_suffix(".b").unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "sys" => Ok(Section::Sys),
            "link" => Ok(Section::Link),
            "stats" => Ok(Section::Stats),
            _ => Err(CoreError::UnknownSection(s.to_string())),
        }
    }
}

/// What one section contributed to a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionData {
    /// Body decoded into at least one field
    Decoded(Record),
    /// Body arrived but carried no usable field; kept verbatim
    Raw {
        /// The undecoded body
        raw: String,
    },
}

impl SectionData {
    /// Classify a non-empty body
    pub fn from_body(body: &str) -> Self {
        let record = crate::blob::decode(body);
        if record.is_empty() {
            SectionData::Raw {
                raw: body.to_string(),
            }
        } else {
            SectionData::Decoded(record)
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            SectionData::Decoded(record) => Some(record),
            SectionData::Raw { .. } => None,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            SectionData::Decoded(_) => None,
            SectionData::Raw { raw } => Some(raw),
        }
    }
}

/// One poll cycle's result across all sections.
///
/// A missing section means no endpoint answered with a body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    sections: BTreeMap<Section, SectionData>,
}

impl Snapshot {
    pub fn get(&self, section: Section) -> Option<&SectionData> {
        self.sections.get(&section)
    }

    /// Decoded record of a section, if it decoded
    pub fn record(&self, section: Section) -> Option<&Record> {
        self.get(section).and_then(SectionData::record)
    }

    /// Field lookup across the nested mapping
    pub fn field(&self, section: Section, key: &str) -> Option<&FieldValue> {
        self.record(section).and_then(|r| r.get(key))
    }

    pub fn contains(&self, section: Section) -> bool {
        self.sections.contains_key(&section)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        self.sections.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &SectionData)> {
        self.sections.iter().map(|(s, d)| (*s, d))
    }
}

impl FromIterator<(Section, SectionData)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Section, SectionData)>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}
