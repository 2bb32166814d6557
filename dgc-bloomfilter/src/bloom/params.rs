// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Conversions between capacity (n), false positive rate (p), bit count (m)
//! and hash round count (k).
//!
//! All functions use `f64` arithmetic so that every implementation of the
//! format derives the same sizes from the same inputs.

use std::f64::consts::LN_2;

use crate::error::Error;

/// Number of bits needed to hold `capacity` items at false positive rate `fpp`.
///
/// Formula: `m = ceil((n * ln(p)) / ln(1 / 2^ln(2)))`
///
/// The result is not yet rounded to the storage word boundary.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if
/// `capacity` is 0 or `fpp` is not in (0.0, 1.0), and
/// [`ErrorKind::InvalidSize`](crate::error::ErrorKind::InvalidSize) if the result rounds to 0.
///
/// # Examples
///
/// ```
/// # use dgc_bloomfilter::bloom::params::derive_bit_count;
/// let bits = derive_bit_count(1000, 0.01).unwrap();
/// assert_eq!(bits, 9586);
/// ```
pub fn derive_bit_count(capacity: u64, fpp: f64) -> Result<u64, Error> {
    ensure_capacity(capacity)?;
    if !(fpp > 0.0 && fpp < 1.0) {
        return Err(
            Error::invalid_parameters("fpp must be between 0.0 and 1.0 (exclusive)")
                .with_context("fpp", fpp),
        );
    }

    let n = capacity as f64;
    let bits = ((n * fpp.ln()) / (1.0 / 2f64.powf(LN_2)).ln()).ceil();
    // float to int casts saturate, so an absurd request surfaces later as an oversized filter
    let bits = bits as u64;
    if bits == 0 {
        return Err(Error::invalid_size("derived bit count is 0")
            .with_context("capacity", capacity)
            .with_context("fpp", fpp));
    }
    Ok(bits)
}

/// Number of hash rounds that minimizes the false positive rate of an
/// `num_bits` filter holding `capacity` items.
///
/// Formula: `k = max(1, round((m / n) * ln(2)))`
///
/// The result is not capped at 255; the builder rejects larger counts.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if
/// `num_bits` or `capacity` is 0.
///
/// # Examples
///
/// ```
/// # use dgc_bloomfilter::bloom::params::derive_hash_rounds;
/// assert_eq!(derive_hash_rounds(9600, 1000).unwrap(), 7);
/// assert_eq!(derive_hash_rounds(32, 1000).unwrap(), 1);
/// ```
pub fn derive_hash_rounds(num_bits: u64, capacity: u64) -> Result<u32, Error> {
    ensure_bits(num_bits)?;
    ensure_capacity(capacity)?;

    let k = (num_bits as f64 / capacity as f64 * LN_2).round();
    Ok((k as u32).max(1))
}

/// False positive rate of a filter with `num_bits` bits and `num_hashes`
/// rounds once it holds `capacity` items.
///
/// Formula: `p = (1 - e^(-k / (m / n)))^k`
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if any
/// input is 0.
///
/// # Examples
///
/// ```
/// # use dgc_bloomfilter::bloom::params::derive_false_positive_rate;
/// let p = derive_false_positive_rate(9600, 1000, 7).unwrap();
/// assert!(p > 0.009 && p < 0.011);
/// ```
pub fn derive_false_positive_rate(
    num_bits: u64,
    capacity: u64,
    num_hashes: u32,
) -> Result<f64, Error> {
    ensure_bits(num_bits)?;
    ensure_capacity(capacity)?;
    if num_hashes == 0 {
        return Err(Error::invalid_parameters("num_hashes must be at least 1"));
    }

    let k = f64::from(num_hashes);
    let bits_per_item = num_bits as f64 / capacity as f64;
    Ok((1.0 - (-k / bits_per_item).exp()).powf(k))
}

fn ensure_capacity(capacity: u64) -> Result<(), Error> {
    if capacity == 0 {
        return Err(Error::invalid_parameters("capacity must be greater than 0"));
    }
    Ok(())
}

fn ensure_bits(num_bits: u64) -> Result<(), Error> {
    if num_bits == 0 {
        return Err(Error::invalid_parameters("num_bits must be greater than 0"));
    }
    Ok(())
}
