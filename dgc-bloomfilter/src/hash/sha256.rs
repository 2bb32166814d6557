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

use primitive_types::U256;
use sha2::Digest;
use sha2::Sha256;

/// Length of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Computes `SHA-256(element || round)`.
///
/// The round is appended as one byte, which is why a filter never uses more
/// than 255 hash rounds.
///
/// # Examples
///
/// ```
/// use dgc_bloomfilter::hash::seeded_digest;
///
/// let digest = seeded_digest(&[11], 1);
/// assert_eq!(digest[0], 0x1b);
/// ```
pub fn seeded_digest(element: &[u8], round: u8) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(element);
    hasher.update([round]);
    hasher.finalize().into()
}

/// Maps `element` to a bit position in `[0, num_bits)` for the given round.
///
/// The digest is read as an unsigned big-endian 256-bit integer. Reading it as
/// a signed two's-complement value would place roughly half of all elements on
/// different bits than other implementations of the format.
///
/// # Panics
///
/// Panics if `num_bits` is 0.
///
/// # Examples
///
/// ```
/// use dgc_bloomfilter::hash::hash_index;
///
/// assert_eq!(hash_index(&[11], 1, 100), 75);
/// assert_eq!(hash_index(&[1], 1, 1), 0);
/// ```
pub fn hash_index(element: &[u8], round: u8, num_bits: u64) -> u64 {
    assert!(num_bits > 0, "num_bits must be at least 1");
    let digest = seeded_digest(element, round);
    reduce(&digest, num_bits)
}

fn reduce(digest: &[u8; DIGEST_LEN], num_bits: u64) -> u64 {
    let value = U256::from_big_endian(digest);
    (value % U256::from(num_bits)).low_u64()
}
