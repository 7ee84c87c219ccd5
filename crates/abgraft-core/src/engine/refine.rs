use super::error::HumanizationError;
use tracing::debug;

pub type OracleError = Box<dyn std::error::Error + Send + Sync>;

/// Suggests a mutated version of a humanized sequence.
///
/// Implementations must keep the sequence length: refinement is a
/// per-position mutation model.
pub trait RefinementOracle: Send + Sync {
    fn mutate(&self, sequence: &str) -> Result<String, OracleError>;
}

impl<F> RefinementOracle for F
where
    F: Fn(&str) -> Result<String, OracleError> + Send + Sync,
{
    fn mutate(&self, sequence: &str) -> Result<String, OracleError> {
        self(sequence)
    }
}

/// Feeds `sequence` through `oracle` `iterations` times, each call receiving
/// the previous output. Iterations in errors are 1-based.
pub fn refine(
    sequence: &str,
    iterations: usize,
    oracle: &dyn RefinementOracle,
) -> Result<String, HumanizationError> {
    let mut current = sequence.to_string();
    for iteration in 1..=iterations {
        let next = oracle
            .mutate(&current)
            .map_err(|e| HumanizationError::Refinement {
                iteration,
                reason: e.to_string(),
            })?;
        if next.chars().count() != current.chars().count() {
            return Err(HumanizationError::Refinement {
                iteration,
                reason: format!(
                    "oracle changed the sequence length from {} to {}",
                    current.chars().count(),
                    next.chars().count()
                ),
            });
        }
        debug!(iteration, "Applied refinement iteration.");
        current = next;
    }
    Ok(current)
}
