// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0
pub use self::env::Env;
pub use self::paths::Paths;
pub use self::project::Project;

pub mod copr;
pub mod descriptor;
pub mod env;
pub mod fetch;
pub mod paths;
pub mod pipeline;
pub mod project;
pub mod release;
pub mod request;
pub mod srpm;
pub mod tool;
pub mod util;
