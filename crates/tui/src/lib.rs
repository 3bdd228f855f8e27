// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

pub use self::reexport::*;
pub use self::styled::Styled;

mod styled;

const TICK_CHARS: &str = "--=≡■≡=--";
const TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Progress bar for a byte stream of known or unknown length
///
/// With a known `total` a bar is drawn, otherwise only
/// a spinner with the throughput.
pub fn transfer(message: impl Into<String>, total: Option<u64>) -> ProgressBar {
    let (len, template) = match total {
        Some(len) => (
            len,
            " {spinner} {wide_msg} |{bar:20.cyan/blue}| {binary_bytes:>.dim}/{binary_total_bytes:.dim} {binary_bytes_per_sec:>.dim} ",
        ),
        None => (u64::MAX, " {spinner} {wide_msg} {binary_bytes_per_sec:>.dim} "),
    };

    let pb = ProgressBar::new(len).with_message(message.into()).with_style(
        ProgressStyle::with_template(template)
            .expect("valid template")
            .progress_chars("■≡=- ")
            .tick_chars(TICK_CHARS),
    );
    pb.enable_steady_tick(TICK_INTERVAL);
    pb
}

/// Spinner for a step with no measurable progress, such as
/// waiting on an external tool
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner().with_message(message.into()).with_style(
        ProgressStyle::with_template(" {spinner} {wide_msg} ")
            .expect("valid template")
            .tick_chars(TICK_CHARS),
    );
    pb.enable_steady_tick(TICK_INTERVAL);
    pb
}

mod reexport {
    pub use crossterm::style::Stylize;
    pub use indicatif::*;
}
