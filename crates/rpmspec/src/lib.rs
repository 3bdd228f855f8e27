// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Reading and in-place patching of RPM `.spec` descriptors
//!
//! Nothing here evaluates macros or understands sections beyond
//! the few lines we rewrite. Everything else in a descriptor passes
//! through untouched.

use std::ops;

pub use self::changelog::Entry;
pub use self::updater::Updater;

mod changelog;
mod updater;

/// Column tag values are aligned to when a tag has no value yet
const TAG_COLUMN: usize = 16;

/// Value of the first `name:` tag line in `source`
pub fn tag<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    source
        .lines()
        .find_map(|line| tag_value(line, name).map(|range| &line[range]))
}

/// Expand `%{?dist}` / `%{dist}` in a release value
pub fn expand_dist(release: &str, dist: &str) -> String {
    release.replace("%{?dist}", dist).replace("%{dist}", dist)
}

/// Reset the leading release number to `1`, keeping any suffix
/// such as `%{?dist}`
///
/// Returns `None` when the release has no numeric prefix, e.g.
/// `%autorelease`, since those are managed elsewhere.
pub fn reset_release(release: &str) -> Option<String> {
    let digits = release.find(|c: char| !c.is_ascii_digit()).unwrap_or(release.len());
    if digits == 0 {
        return None;
    }

    // Swallow dotted sub-levels, `3.2%{?dist}` -> `1%{?dist}`
    let mut end = digits;
    while let Some(rest) = release[end..].strip_prefix('.') {
        let len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if len == 0 {
            break;
        }
        end += 1 + len;
    }

    Some(format!("1{}", &release[end..]))
}

/// Byte range of the value on a `name:` tag line, possibly empty
fn tag_value(line: &str, name: &str) -> Option<ops::Range<usize>> {
    let rest = line.strip_prefix(name)?.strip_prefix(':')?;
    let start = line.len() - rest.trim_start().len();
    let end = start + line[start..].trim_end().len();

    Some(start..end)
}

/// Pad `name:` so the value starts at [`TAG_COLUMN`]
fn format_tag(name: &str, value: &str) -> String {
    let tag = format!("{name}:");
    format!("{tag:<width$}{value}", width = TAG_COLUMN.max(tag.len() + 1))
}
