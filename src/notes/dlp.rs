//! # Discrete Logarithm Problem
//!
//! Given a prime `p`, a generator `g` of `(Z/pZ)*` and an element `h`, the
//! Discrete Logarithm Problem (DLP) consists in finding `x` such that:
//!
//! ``` text
//! g^x = h mod p
//! ```
//!
//! ## Linear search
//!
//! The moduli used here are small (up to 34 bits), so the DLP is solved by
//! trying every exponent of `[0, p)`. Instead of computing `g^x` for each `x`,
//! the successive powers are obtained by one modular multiplication:
//!
//! ``` text
//! g^(x + s) = g^x * g^s mod p
//! ```
//!
//! which gives:
//! - time complexity: O(p) multiplications
//! - space complexity: O(1)
//!
//! ## Splitting the search between `n` workers
//!
//! Worker `i` scans the residue class `{i, i + n, i + 2n, ...}` with the step
//! factor `g^n`. The classes are disjoint and cover `[0, p)`. Contiguous blocks
//! would leave the whole work to the last worker when the solution lies at
//! the end of the range; with interleaved classes, the worker owning the
//! solution reaches it after `x / n` steps wherever `x` is.
//!
//! The intermediate products are smaller than `p^2 < 2^68`, hence computed on
//! `u128`.
