//! Answer checking.

use charlie_common::CaptchaChallenge;

/// Compare a numeric answer with the challenge
pub fn is_correct(challenge: &CaptchaChallenge, answer: i64) -> bool {
    answer == challenge.expected_answer()
}

/// Parse what the user typed into the answer field.
///
/// Reads the leading integer and ignores whatever follows it, so `"7.5"` and
/// `"7abc"` both read as 7. Returns `None` when the input does not start with
/// an integer; callers treat that as a wrong answer.
pub fn parse_answer(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let end = trimmed
        .char_indices()
        .skip_while(|&(i, c)| i == 0 && (c == '+' || c == '-'))
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}
