// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply generation: brand-voice prompts, anti-repetition, and the static
//! template floor the engine degrades to when the provider fails.

pub mod generator;
pub mod prompt;
pub mod repetition;
pub mod templates;

pub use generator::{DraftReply, ReplyGenerator};
pub use repetition::{RunPhraseSet, extract_avoid_phrases};
