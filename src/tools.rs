use eyre::Result;
use std::thread;

/// Multiply two residues modulo `p`.
///
/// Moduli are at most 63 bits wide, so the product is computed on `u128`
/// and can never overflow.
/// - `a`:  first factor
/// - `b`:  second factor
/// - `p`:  modulus
#[inline]
pub fn mod_mul(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

/// Compute `g^e mod p` using the square-and-multiply method.
/// - `g`:  base
/// - `e`:  exponent
/// - `p`:  modulus
pub fn mod_pow(g: u64, mut e: u64, p: u64) -> u64 {
    if p == 1 {
        return 0;
    }
    let (mut base, mut res) = (g % p, 1);
    while e > 0 {
        if e & 1 == 1 {
            res = mod_mul(res, base, p);
        }
        base = mod_mul(base, base, p);
        e >>= 1;
    }
    res
}

/// Join an execution unit and return its result.
/// - `handle`: handle on the unit
pub(crate) fn join<T>(handle: thread::JoinHandle<Result<T>>) -> Result<T> {
    handle
        .join()
        .map_err(|err| eyre::eyre!("Error Join: {:?}", err))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_pow_small() {
        assert_eq!(mod_pow(5, 10, 97), 53);
        assert_eq!(mod_pow(2, 0, 97), 1);
        assert_eq!(mod_pow(0, 0, 97), 1);
        assert_eq!(mod_pow(7, 3, 1), 0);
    }

    #[test]
    fn test_fermat() {
        // a^(p-1) = 1 mod p for every prime p not dividing a
        for &p in &[97u64, 155641523, 10923184463] {
            for a in 2..10 {
                assert_eq!(mod_pow(a, p - 1, p), 1, "a={}, p={}", a, p);
            }
        }
    }

    #[test]
    fn test_mod_mul_wide() {
        // both factors close to a 34-bit modulus, the product needs 68 bits
        let p = 10542839327u64;
        let (a, b) = (p - 1, p - 2);
        assert_eq!(mod_mul(a, b, p), 2);
    }
}
