// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! encoding
//!   decode()/encode()  UTF-8 / UTF-16 / ISO-8859-1 translation files
//! fs
//!   walk:  parallel_walk(), WalkOptions
//!   write_atomic()
//! template
//!   render()  {{ name }} and {{ name|filter }} message templates
//! ```

pub mod encoding;
pub mod fs;
pub mod template;
