// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brand-voice prompt construction.
//!
//! Everything here is deterministic over its inputs: the same review,
//! voice, and avoid-phrase list always yields the same prompt text and
//! sampling temperature.

use replyflow_core::types::{BrandVoice, BusinessInfo, Review, VoicePreset};

/// Absolute ceiling on the reply length, in words.
pub const MAX_REPLY_WORDS: usize = 100;

/// Stock phrases the model is instructed to avoid regardless of voice.
pub const FORBIDDEN_PHRASES: &[&str] = &[
    "We're thrilled",
    "We are thrilled",
    "absolutely delighted",
    "Thank you so much for your amazing",
    "We strive to",
    "Your satisfaction is our",
    "your feedback is important to us",
    "We apologize for any inconvenience",
    "Please don't hesitate to",
    "valued customer",
    "As an AI",
    "I'd be happy to",
];

/// System and user prompt plus sampling parameters, ready for the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptParts {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub min_words: usize,
    pub max_words: usize,
}

/// The (min, max) word window for a reply.
///
/// Base tiers are keyed by the brevity scale; both bounds grow with the
/// source review's length, and low ratings (<= 3) get a wider upper bound
/// so apologies have room to address specifics. The ceiling is absolute.
pub fn word_budget(brevity: u8, rating: u8, review_words: usize) -> (usize, usize) {
    let (base_min, base_max): (f64, f64) = match brevity.clamp(1, 5) {
        1 => (55.0, 85.0),
        2 => (45.0, 70.0),
        3 => (35.0, 55.0),
        4 => (25.0, 45.0),
        _ => (15.0, 30.0),
    };

    let length_mult = (1.0 + review_words as f64 / 400.0).min(1.4);
    let low_mult = if rating <= 3 { 1.3 } else { 1.0 };

    let min = (base_min * length_mult).round() as usize;
    let max = ((base_max * length_mult * low_mult).round() as usize).min(MAX_REPLY_WORDS);
    (min.min(max), max)
}

/// Temperature derived from the voice profile, bounded to [0.2, 0.8].
///
/// More formal configurations sample more conservatively; warmer ones a
/// little more freely.
pub fn sampling_temperature(voice: &BrandVoice) -> f32 {
    let base = match voice.preset {
        VoicePreset::Friendly => 0.7,
        VoicePreset::Professional => 0.5,
        VoicePreset::Playful => 0.8,
        VoicePreset::Custom => 0.6,
    };
    let formality_shift = 0.05 * (voice.formality.clamp(1, 5) as f32 - 3.0);
    let warmth_shift = 0.05 * (voice.warmth.clamp(1, 5) as f32 - 3.0);
    (base - formality_shift + warmth_shift).clamp(0.2, 0.8)
}

fn formality_directive(formality: u8) -> &'static str {
    match formality.clamp(1, 5) {
        1 => "Be very casual; use contractions and everyday language.",
        2 => "Be casual and conversational; contractions are fine.",
        3 => "Use a relaxed but professional register.",
        4 => "Be polished and professional; avoid slang.",
        _ => "Be very formal; no contractions, no colloquialisms.",
    }
}

fn warmth_directive(warmth: u8) -> &'static str {
    match warmth.clamp(1, 5) {
        1 => "Keep the emotional register reserved and matter-of-fact.",
        2 => "Be courteous but restrained.",
        3 => "Be genuinely appreciative without gushing.",
        4 => "Be warm and personal; acknowledge the customer by name.",
        _ => "Be very warm and personal; make the customer feel individually seen.",
    }
}

fn preset_directive(preset: VoicePreset) -> &'static str {
    match preset {
        VoicePreset::Friendly => "Write as a friendly neighborhood business owner.",
        VoicePreset::Professional => "Write as a courteous, businesslike owner.",
        VoicePreset::Playful => "Write with light humor and personality, still respectful.",
        VoicePreset::Custom => "Follow the custom voice instruction below precisely.",
    }
}

/// Build the full prompt for one review.
pub fn build_prompt(
    review: &Review,
    voice: &BrandVoice,
    info: &BusinessInfo,
    avoid_phrases: &[String],
) -> PromptParts {
    let review_words = review.body.split_whitespace().count();
    let (min_words, max_words) = word_budget(voice.brevity, review.rating, review_words);

    let mut system = format!(
        "You write replies to customer reviews on behalf of {name}, a {industry}. \
         You are the voice of the business owner, never a third party.\n\
         {preset}\n{formality}\n{warmth}\n",
        name = info.name,
        industry = info.industry,
        preset = preset_directive(voice.preset),
        formality = formality_directive(voice.formality),
        warmth = warmth_directive(voice.warmth),
    );

    if let Some(instruction) = voice
        .custom_instruction
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        system.push_str("Custom voice instruction: ");
        system.push_str(instruction.trim());
        system.push('\n');
    }

    system.push_str(&format!(
        "The reply must be between {min_words} and {max_words} words.\n\
         Never use em dashes or en dashes; use commas or periods instead.\n"
    ));

    system.push_str("Never use any of these phrases or close variants:\n");
    for phrase in FORBIDDEN_PHRASES {
        system.push_str("- ");
        system.push_str(phrase);
        system.push('\n');
    }
    for phrase in avoid_phrases {
        system.push_str("- ");
        system.push_str(phrase);
        system.push('\n');
    }

    let mut user = format!(
        "Customer: {customer}\nRating: {rating} out of 5 stars\nReview:\n{body}\n\n",
        customer = review.customer_name,
        rating = review.rating.clamp(1, 5),
        body = review.body,
    );
    if review.rating <= 3 {
        user.push_str(
            "This is a negative or mixed review. Acknowledge the specific problem, \
             apologize plainly, and offer a concrete next step.",
        );
        if let Some(email) = info.support_email.as_deref() {
            user.push_str(&format!(" Invite them to reach us at {email}."));
        }
        user.push('\n');
    }
    user.push_str("Write only the reply text, with no preamble or sign-off placeholder.");

    PromptParts {
        system,
        user,
        temperature: sampling_temperature(voice),
        min_words,
        max_words,
    }
}
