use std::fmt::Debug;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::domain::{AiVerificationStatus, Applicant};

/// Chance that the uploaded documents are legible.
pub const READABLE_PROBABILITY: f64 = 0.9;
/// Chance that legible documents agree with the entered data.
pub const MATCHES_PROBABILITY: f64 = 0.7;

/// Document-consistency check invoked by administrators for a single applicant.
pub trait DocumentVerifier: Debug + Send + Sync {
    fn verify(&self, applicant: &Applicant) -> AiVerificationStatus;
}

/// Draws the stand-in verification outcome: unreadable or mismatching documents need a manual
/// review, everything else is verified.
pub fn simulate_ai_verify<R: Rng + ?Sized>(rng: &mut R) -> AiVerificationStatus {
    let readable = rng.random_bool(READABLE_PROBABILITY);
    let matches = rng.random_bool(MATCHES_PROBABILITY);

    if !readable {
        AiVerificationStatus::ManualReview
    } else if matches {
        AiVerificationStatus::Verified
    } else {
        AiVerificationStatus::ManualReview
    }
}

/// Random stand-in used until a document-analysis service is wired in.
#[derive(Debug)]
pub struct SimulatedVerifier {
    rng: Mutex<StdRng>,
}

impl SimulatedVerifier {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SimulatedVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentVerifier for SimulatedVerifier {
    fn verify(&self, applicant: &Applicant) -> AiVerificationStatus {
        let mut rng = self.rng.lock().expect("verifier rng mutex poisoned");
        let outcome = simulate_ai_verify(&mut *rng);
        tracing::debug!(
            registration_number = %applicant.registration_number,
            outcome = outcome.label(),
            "simulated document verification"
        );
        outcome
    }
}

/// Verifier that always reports the same outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedVerifier(pub AiVerificationStatus);

impl DocumentVerifier for FixedVerifier {
    fn verify(&self, _applicant: &Applicant) -> AiVerificationStatus {
        self.0
    }
}
