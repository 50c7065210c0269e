use crate::types::WorkAssignment;
use eyre::Result;

/// Split the exponent space `[0, p)` into `n` residue classes modulo `n`.
///
/// Worker `i` gets `{i, i + n, i + 2n, ...}`, so that the expected distance
/// to the solution is the same for every worker wherever the solution lies.
/// - `p`:  modulus, upper bound of the exponent space
/// - `g`:  generator
/// - `h`:  target
/// - `n`:  number of workers
pub fn partition(p: u64, g: u64, h: u64, n: usize) -> Result<Vec<WorkAssignment>> {
    eyre::ensure!(n > 0, "Cannot partition the exponent space between 0 workers!");
    eyre::ensure!(p > 0, "The modulus must be positive!");
    Ok((0..n as u64)
        .map(|start| WorkAssignment {
            p,
            g,
            h,
            start,
            stride: n as u64,
            end: p,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_space() -> Result<()> {
        for p in [1u64, 2, 7, 97, 1000] {
            for n in 1..=9 {
                let assignments = partition(p, 2, 1, n)?;
                eyre::ensure!(assignments.len() == n, "Wrong number of assignments!");

                // every exponent must be owned by exactly one worker
                let mut owners = vec![0usize; p as usize];
                for a in &assignments {
                    a.validate()?;
                    for x in a.exponents() {
                        owners[x as usize] += 1;
                    }
                }
                eyre::ensure!(
                    owners.iter().all(|&count| count == 1),
                    "Partition of [0, {}) between {} workers is not exact!",
                    p,
                    n
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_more_workers_than_exponents() -> Result<()> {
        let assignments = partition(3, 2, 1, 5)?;
        let sizes: Vec<usize> = assignments.iter().map(|a| a.exponents().count()).collect();
        eyre::ensure!(sizes == vec![1, 1, 1, 0, 0], "Unexpected sizes: {:?}", sizes);
        Ok(())
    }

    #[test]
    fn test_invalid_partition() {
        assert!(partition(97, 5, 3, 0).is_err());
        assert!(partition(0, 5, 3, 2).is_err());
    }
}
