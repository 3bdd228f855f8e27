// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::fmt;

use chrono::NaiveDate;

/// A single `%changelog` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub date: NaiveDate,
    pub author: String,
    pub version: String,
    pub release: String,
    pub lines: Vec<String>,
}

impl Entry {
    pub fn new(date: NaiveDate, author: impl ToString, version: impl ToString, release: impl ToString) -> Self {
        Self {
            date,
            author: author.to_string(),
            version: version.to_string(),
            release: release.to_string(),
            lines: vec![],
        }
    }

    pub fn line(mut self, line: impl ToString) -> Self {
        self.lines.push(line.to_string());
        self
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "* {} {} - {}-{}",
            self.date.format("%a %b %d %Y"),
            self.author,
            self.version,
            self.release
        )?;

        for line in &self.lines {
            writeln!(f, "- {line}")?;
        }

        Ok(())
    }
}
