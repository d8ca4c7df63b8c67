//! Arithmetic bot check gating the sign-in form.
//!
//! One challenge is live at a time. The gate publishes a binary "passed"
//! signal; the session manager consults it before accepting credentials.

mod generator;
mod verifier;

pub use generator::random_challenge;
pub use verifier::{is_correct, parse_answer};

use charlie_common::{CaptchaChallenge, CharlieError, Result};
use tokio::sync::watch;

/// Bot-check gate
pub struct CaptchaGate {
    /// Live challenge
    challenge: watch::Sender<CaptchaChallenge>,
    /// Validation signal
    passed: watch::Sender<bool>,
}

impl CaptchaGate {
    /// Create a gate with a freshly drawn challenge
    pub fn new() -> Self {
        Self::with_challenge(random_challenge(&mut rand::rng()))
    }

    /// Create a gate with a known challenge
    pub fn with_challenge(challenge: CaptchaChallenge) -> Self {
        Self {
            challenge: watch::Sender::new(challenge),
            passed: watch::Sender::new(false),
        }
    }

    /// Replace the live challenge with a new random one.
    ///
    /// Always drops the pass signal back to false.
    pub fn generate_challenge(&self) -> CaptchaChallenge {
        self.install(random_challenge(&mut rand::rng()))
    }

    /// Replace the live challenge with `challenge`
    pub fn install(&self, challenge: CaptchaChallenge) -> CaptchaChallenge {
        tracing::debug!(prompt = %challenge.prompt(), "New bot-check challenge");
        self.challenge.send_replace(challenge.clone());
        self.passed.send_replace(false);
        challenge
    }

    /// Check an answer against the live challenge.
    ///
    /// A wrong answer keeps the same problem live. Once solved, further
    /// answers are ignored until the gate is reset.
    pub fn submit_answer(&self, answer: i64) -> bool {
        let (solved, correct) = {
            let challenge = self.challenge.borrow();
            (challenge.is_solved(), is_correct(&challenge, answer))
        };

        if solved {
            return true;
        }

        if correct {
            self.challenge.send_modify(|c| c.mark_solved());
            self.passed.send_replace(true);
            tracing::debug!("Bot check passed");
        } else {
            self.passed.send_replace(false);
            tracing::debug!(answer, "Bot check answer rejected");
        }

        correct
    }

    /// Check raw text from the answer field
    pub fn submit_input(&self, input: &str) -> bool {
        match parse_answer(input) {
            Some(answer) => self.submit_answer(answer),
            None => {
                if self.passed() {
                    return true;
                }
                self.passed.send_replace(false);
                false
            }
        }
    }

    /// Re-arm a solved gate with a new challenge
    pub fn reset(&self) -> Result<CaptchaChallenge> {
        if !self.challenge.borrow().is_solved() {
            return Err(CharlieError::validation(
                "The bot check can only be reset after it is passed",
            ));
        }
        Ok(self.generate_challenge())
    }

    /// Snapshot of the live challenge for display
    pub fn challenge(&self) -> CaptchaChallenge {
        self.challenge.borrow().clone()
    }

    pub fn passed(&self) -> bool {
        *self.passed.borrow()
    }

    /// Watch the validation signal
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.passed.subscribe()
    }
}

impl Default for CaptchaGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charlie_common::CaptchaOperator;

    fn three_plus_four() -> CaptchaGate {
        CaptchaGate::with_challenge(CaptchaChallenge::new(3, 4, CaptchaOperator::Add))
    }

    #[test]
    fn test_correct_answer_passes() {
        let gate = three_plus_four();
        assert!(!gate.passed());

        assert!(gate.submit_answer(7));
        assert!(gate.passed());
        assert!(gate.challenge().is_solved());
    }

    #[test]
    fn test_wrong_answer_keeps_problem() {
        let gate = three_plus_four();
        let before = gate.challenge();

        assert!(!gate.submit_answer(6));
        assert!(!gate.passed());
        assert_eq!(gate.challenge(), before);

        // Same problem is still answerable
        assert!(gate.submit_answer(7));
    }

    #[test]
    fn test_text_input() {
        let gate = three_plus_four();
        assert!(!gate.submit_input("abc"));
        assert!(!gate.submit_input(""));
        assert!(gate.submit_input(" 7 "));
        assert!(gate.passed());
    }

    #[test]
    fn test_answers_after_solve_are_ignored() {
        let gate = three_plus_four();
        assert!(gate.submit_answer(7));
        let mut rx = gate.subscribe();
        let _ = rx.borrow_and_update();

        assert!(gate.submit_answer(999));
        assert!(gate.submit_input("nonsense"));
        assert!(gate.submit_input(""));

        assert!(gate.passed());
        assert!(gate.challenge().is_solved());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_reset_only_while_solved() {
        let gate = three_plus_four();
        assert!(gate.reset().is_err());

        gate.submit_answer(7);
        let fresh = gate.reset().unwrap();
        assert!(!fresh.is_solved());
        assert!(!gate.passed());
        assert!(!gate.challenge().is_solved());
    }

    #[test]
    fn test_new_challenge_invalidates_pass() {
        let gate = three_plus_four();
        let mut rx = gate.subscribe();

        gate.submit_answer(7);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        gate.generate_challenge();
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert!(!gate.passed());
    }
}
