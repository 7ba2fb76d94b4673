// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for each storage entity.

pub mod campaigns;
pub mod intents;
pub mod messages;
pub mod providers;
