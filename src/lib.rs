// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        component / addon / worker
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '-------------+-------------'
//!                            v
//!              jobs  (queue, workers, scheduler)
//!                            |
//!                            v
//!              ,---------------------------,
//!              |           sync            |
//!              | update / scan / commit /  |
//!              | push / translate / addons |
//!              '--+--------+--------+------'
//!                 |        |        |
//!                 v        v        v
//!               vcs     formats    db
//!            git/hg/gh  po/json..  sqlite
//!                 |        |
//!                 v        v
//!            discovery  addons
//!
//!   +-----------------------------------------+
//!   |  core     process runner                |
//!   +-----------------------------------------+
//!   |  foundation   error, logging, models,   |
//!   |               utility                   |
//!   +-----------------------------------------+
//! ```

pub mod addons;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod db;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod sync;
pub mod utility;
pub mod vcs;
