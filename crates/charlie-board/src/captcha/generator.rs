//! Bot-check problem generation.

use charlie_common::constants::{CAPTCHA_OPERAND_MAX, CAPTCHA_OPERAND_MIN};
use charlie_common::{CaptchaChallenge, CaptchaOperator};
use rand::Rng;

/// Draw a challenge: operands uniform in [1, 10], operator uniform over
/// add/subtract/multiply.
pub fn random_challenge(rng: &mut impl Rng) -> CaptchaChallenge {
    let a = rng.random_range(CAPTCHA_OPERAND_MIN..=CAPTCHA_OPERAND_MAX);
    let b = rng.random_range(CAPTCHA_OPERAND_MIN..=CAPTCHA_OPERAND_MAX);
    let operator = CaptchaOperator::ALL[rng.random_range(0..CaptchaOperator::ALL.len())];

    CaptchaChallenge::new(a, b, operator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_challenge_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen_ops = Vec::new();

        for _ in 0..500 {
            let challenge = random_challenge(&mut rng);
            assert!((1..=10).contains(&challenge.a()));
            assert!((1..=10).contains(&challenge.b()));
            assert!(!challenge.is_solved());
            if !seen_ops.contains(&challenge.operator()) {
                seen_ops.push(challenge.operator());
            }
        }

        assert_eq!(seen_ops.len(), 3);
    }
}
