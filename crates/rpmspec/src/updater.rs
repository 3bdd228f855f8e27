// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use crate::{format_tag, tag_value, Entry};

const DESKTOP_ENTRY: &str = "[Desktop Entry]";
const CHANGELOG: &str = "%changelog";

/// Apply update operations to a spec file
///
/// Operations are applied in the order they were queued. Lines
/// no operation touches are emitted unchanged, line endings included.
#[derive(Debug, Default)]
pub struct Updater {
    operations: Vec<Operation>,
}

impl Updater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value of every `name:` tag line
    pub fn update_tag(&mut self, name: impl ToString, value: impl ToString) {
        self.operations.push(Operation::Tag {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Replace `key=` on the line directly following `[Desktop Entry]`
    pub fn update_desktop_entry(&mut self, key: impl ToString, value: impl ToString) {
        self.operations.push(Operation::DesktopEntry {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Prepend `entry` to `%changelog`, creating the section if needed
    pub fn add_changelog(&mut self, entry: Entry) {
        self.operations.push(Operation::Changelog(entry));
    }

    pub fn apply(&self, input: impl AsRef<str>) -> String {
        let mut document = Document::parse(input.as_ref());

        for operation in &self.operations {
            operation.apply(&mut document);
        }

        document.to_string()
    }
}

/// A line split from its terminator
#[derive(Debug)]
struct Line {
    content: String,
    ending: &'static str,
}

#[derive(Debug)]
struct Document {
    lines: Vec<Line>,
    /// Terminator used for lines we add, `\r\n` if the file uses it
    newline: &'static str,
}

impl Document {
    fn parse(input: &str) -> Self {
        let lines = input
            .split_inclusive('\n')
            .map(|raw| {
                if let Some(content) = raw.strip_suffix("\r\n") {
                    Line {
                        content: content.to_owned(),
                        ending: "\r\n",
                    }
                } else if let Some(content) = raw.strip_suffix('\n') {
                    Line {
                        content: content.to_owned(),
                        ending: "\n",
                    }
                } else {
                    Line {
                        content: raw.to_owned(),
                        ending: "",
                    }
                }
            })
            .collect::<Vec<_>>();

        let newline = lines
            .iter()
            .map(|line| line.ending)
            .find(|ending| !ending.is_empty())
            .unwrap_or("\n");

        Self { lines, newline }
    }

    fn line(&self, content: impl Into<String>) -> Line {
        Line {
            content: content.into(),
            ending: self.newline,
        }
    }

    /// Terminate the last line so more can follow it
    fn terminate_last(&mut self) {
        let newline = self.newline;
        if let Some(last) = self.lines.last_mut().filter(|last| last.ending.is_empty()) {
            last.ending = newline;
        }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            write!(f, "{}{}", line.content, line.ending)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
enum Operation {
    Tag { name: String, value: String },
    DesktopEntry { key: String, value: String },
    Changelog(Entry),
}

impl Operation {
    fn apply(&self, document: &mut Document) {
        match self {
            Operation::Tag { name, value } => {
                for line in document.lines.iter_mut() {
                    let Some(range) = tag_value(&line.content, name) else {
                        continue;
                    };

                    if range.is_empty() {
                        line.content = format_tag(name, value);
                    } else {
                        line.content.replace_range(range, value);
                    }
                }
            }
            Operation::DesktopEntry { key, value } => {
                let mut after_header = false;

                for line in document.lines.iter_mut() {
                    let is_header = line.content.trim() == DESKTOP_ENTRY;

                    if after_header {
                        let indent = line.content.len() - line.content.trim_start().len();
                        let current = line.content[indent..]
                            .strip_prefix(key.as_str())
                            .and_then(|rest| rest.strip_prefix('='));

                        if let Some(current) = current {
                            let start = indent + key.len() + 1;
                            let end = start + current.len();
                            line.content.replace_range(start..end, value);
                        }
                    }

                    after_header = is_header;
                }
            }
            Operation::Changelog(entry) => {
                let rendered = entry.to_string();
                let mut entry_lines = rendered.lines().map(|line| document.line(line)).collect::<Vec<_>>();

                let section = document
                    .lines
                    .iter()
                    .position(|line| line.content.trim_end() == CHANGELOG);

                match section {
                    Some(idx) => {
                        let has_history = document
                            .lines
                            .get(idx + 1)
                            .is_some_and(|next| !next.content.trim().is_empty());
                        if has_history {
                            entry_lines.push(document.line(""));
                        }
                        if document.lines[idx].ending.is_empty() {
                            document.lines[idx].ending = document.newline;
                        }
                        document.lines.splice(idx + 1..idx + 1, entry_lines);
                    }
                    None => {
                        document.terminate_last();
                        if document
                            .lines
                            .last()
                            .is_some_and(|last| !last.content.trim().is_empty())
                        {
                            let blank = document.line("");
                            document.lines.push(blank);
                        }
                        let header = document.line(CHANGELOG);
                        document.lines.push(header);
                        document.lines.extend(entry_lines);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;

    const AUTHOR: &str = "Packager <packager@example.com>";

    fn entry(version: &str) -> Entry {
        Entry::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), AUTHOR, version, "1")
            .line(format!("Update to {version}"))
    }

    #[test]
    fn test_update() {
        let raw = "Name:           zen-browser
Version:        1.0.1b
Release:        4%{?dist}
Source0:        https://example.com/1.0.1b/zen.tar.xz

%install
cat > zen.desktop << EOF
[Desktop Entry]
Version=1.0.1b
Name=Zen Browser
Exec=zen %u
EOF

%changelog
* Mon Dec 02 2024 Someone <someone@example.com> - 1.0.1b-4
- Older entry
";
        let expected = "Name:           zen-browser
Version:        1.0.2b
Release:        1%{?dist}
Source0:        https://example.com/1.0.2b/zen.tar.xz

%install
cat > zen.desktop << EOF
[Desktop Entry]
Version=1.0.2b
Name=Zen Browser
Exec=zen %u
EOF

%changelog
* Mon Jan 06 2025 Packager <packager@example.com> - 1.0.2b-1
- Update to 1.0.2b

* Mon Dec 02 2024 Someone <someone@example.com> - 1.0.1b-4
- Older entry
";

        let mut updater = Updater::new();
        updater.update_tag("Version", "1.0.2b");
        updater.update_tag("Release", "1%{?dist}");
        updater.update_tag("Source0", "https://example.com/1.0.2b/zen.tar.xz");
        updater.update_desktop_entry("Version", "1.0.2b");
        updater.add_changelog(entry("1.0.2b"));

        assert_eq!(updater.apply(raw), expected);
    }

    #[test]
    fn empty_changelog_section() {
        let raw = "Version:        1\n\n%changelog\n";

        let mut updater = Updater::new();
        updater.add_changelog(entry("2"));

        assert_eq!(
            updater.apply(raw),
            "Version:        1\n\n%changelog\n* Mon Jan 06 2025 Packager <packager@example.com> - 2-1\n- Update to 2\n"
        );
    }

    #[test]
    fn missing_changelog_is_appended() {
        let raw = "Version:        1\n%files\n/usr/bin/zen";

        let mut updater = Updater::new();
        updater.add_changelog(entry("2"));

        assert_eq!(
            updater.apply(raw),
            "Version:        1\n%files\n/usr/bin/zen\n\n%changelog\n* Mon Jan 06 2025 Packager <packager@example.com> - 2-1\n- Update to 2\n"
        );
    }

    #[test]
    fn empty_tag_is_aligned() {
        let mut updater = Updater::new();
        updater.update_tag("Source0", "https://example.com/a.tar.xz");

        assert_eq!(
            updater.apply("Source0:\nSource1: keep\n"),
            "Source0:        https://example.com/a.tar.xz\nSource1: keep\n"
        );
    }

    #[test]
    fn desktop_entry_version_must_follow_header() {
        let mut updater = Updater::new();
        updater.update_desktop_entry("Version", "2");

        let raw = "[Desktop Entry]\nName=Zen\nVersion=1\n";
        assert_eq!(updater.apply(raw), raw);

        let raw = "Version=outside
[Desktop Entry]
Version=1
Name=Zen

[Desktop Action new-window]
Version=action
";
        assert_eq!(
            updater.apply(raw),
            "Version=outside
[Desktop Entry]
Version=2
Name=Zen

[Desktop Action new-window]
Version=action
"
        );
    }

    #[test]
    fn crlf_line_endings_are_kept() {
        let raw = "Name:           zen\r\nVersion:        1\r\n\r\n%changelog\r\n* Mon Dec 02 2024 Someone <s@example.com> - 1-1\r\n- Older entry\r\n";

        let mut updater = Updater::new();
        updater.update_tag("Version", "2");
        updater.add_changelog(entry("2"));

        assert_eq!(
            updater.apply(raw),
            "Name:           zen\r\nVersion:        2\r\n\r\n%changelog\r\n\
             * Mon Jan 06 2025 Packager <packager@example.com> - 2-1\r\n- Update to 2\r\n\r\n\
             * Mon Dec 02 2024 Someone <s@example.com> - 1-1\r\n- Older entry\r\n"
        );
    }

    #[test]
    fn untouched_input_is_unchanged() {
        let mut updater = Updater::new();
        updater.update_tag("Version", "2");

        assert_eq!(updater.apply("Name: zen\nVersion: 1"), "Name: zen\nVersion: 2");
        assert_eq!(updater.apply("Name: zen\n"), "Name: zen\n");
    }
}
