// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static template fallback.
//!
//! Pure function over static data. This is the floor the generation engine
//! degrades to and it must always produce a usable reply.

use replyflow_core::types::ToneLabel;

/// Template reply for a tone and star rating. Ratings outside 1..=5 are
/// clamped.
pub fn fallback_reply(tone: ToneLabel, rating: u8, customer_name: &str) -> String {
    let first_name = customer_name.split_whitespace().next().unwrap_or("there");
    let body = match (tone, rating.clamp(1, 5)) {
        (ToneLabel::Friendly, 1) => {
            "we're really sorry we let you down. This isn't the experience we want anyone to have, and we'd like to make it right. Please reach out to us directly so we can sort this out."
        }
        (ToneLabel::Friendly, 2) => {
            "thanks for being honest with us. It sounds like we missed the mark, and we're sorry about that. We'd love a chance to do better next time."
        }
        (ToneLabel::Friendly, 3) => {
            "thanks for the feedback. We're glad some things worked for you, and we hear you on the rest. We'll keep working on it."
        }
        (ToneLabel::Friendly, 4) => {
            "thanks so much for the kind words! We're glad you had a good visit and hope to see you again soon."
        }
        (ToneLabel::Friendly, _) => {
            "this made our day, thank you! We really appreciate you taking the time, and we can't wait to welcome you back."
        }
        (ToneLabel::Professional, 1) => {
            "thank you for bringing this to our attention. We sincerely apologize that your experience fell short of our standards. Please contact us directly so we can address this properly."
        }
        (ToneLabel::Professional, 2) => {
            "we appreciate your candid feedback. We regret that your experience was not what it should have been and will review this with our team."
        }
        (ToneLabel::Professional, 3) => {
            "thank you for your balanced feedback. We are pleased some aspects met your expectations and are actively working to improve the others."
        }
        (ToneLabel::Professional, 4) => {
            "thank you for your positive review. We are glad your experience was a good one and look forward to serving you again."
        }
        (ToneLabel::Professional, _) => {
            "thank you for the excellent review. It is rewarding to know we met your expectations, and we look forward to your next visit."
        }
        (ToneLabel::Playful, 1) => {
            "ouch, we clearly dropped the ball here. No excuses. Give us a shout directly and let us make it up to you."
        }
        (ToneLabel::Playful, 2) => {
            "well, that's not the review we were hoping for! Thanks for keeping us honest. We'd love another shot at impressing you."
        }
        (ToneLabel::Playful, 3) => {
            "a solid middle of the road, noted! Thanks for the honest take. We'll work on turning those three stars into five."
        }
        (ToneLabel::Playful, 4) => {
            "four stars? We'll take it! Thanks a bunch, and we'll be chasing that fifth star next time you're in."
        }
        (ToneLabel::Playful, _) => {
            "you just made our whole week! Thanks for the five stars, come back soon so we can keep the streak going."
        }
    };
    format!("Hi {first_name}, {body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tone_and_rating_has_a_template() {
        for tone in [
            ToneLabel::Friendly,
            ToneLabel::Professional,
            ToneLabel::Playful,
        ] {
            for rating in 1..=5u8 {
                let reply = fallback_reply(tone, rating, "Sam Okafor");
                assert!(!reply.trim().is_empty());
                assert!(reply.starts_with("Hi Sam,"));
            }
        }
    }

    #[test]
    fn out_of_range_ratings_are_clamped() {
        assert_eq!(
            fallback_reply(ToneLabel::Friendly, 0, "Ana"),
            fallback_reply(ToneLabel::Friendly, 1, "Ana")
        );
        assert_eq!(
            fallback_reply(ToneLabel::Friendly, 9, "Ana"),
            fallback_reply(ToneLabel::Friendly, 5, "Ana")
        );
    }

    #[test]
    fn missing_customer_name_gets_a_neutral_greeting() {
        let reply = fallback_reply(ToneLabel::Professional, 3, "");
        assert!(reply.starts_with("Hi there,"));
    }
}
