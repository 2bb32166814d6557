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

//! Seeded hashing that turns an element and a round number into a bit position.
//!
//! Every implementation of the filter format must agree on this mapping, so it
//! is pinned down completely: the round is appended to the element as a single
//! byte, the concatenation is hashed with SHA-256, and the digest is reduced
//! modulo the filter's bit count as an unsigned big-endian integer.

mod sha256;

pub use self::sha256::DIGEST_LEN;
pub use self::sha256::hash_index;
pub use self::sha256::seeded_digest;

use crate::error::Error;

/// Digest algorithm recorded in the filter header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HashFunction {
    /// SHA-256 over `element || round`, wire id `0`.
    #[default]
    Sha256,
}

impl HashFunction {
    /// Returns the id stored in the filter header.
    pub const fn id(self) -> u8 {
        match self {
            HashFunction::Sha256 => 0,
        }
    }

    /// Resolves a header id.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnsupportedHashFunction`](crate::error::ErrorKind::UnsupportedHashFunction)
    /// for any id this implementation does not know.
    pub fn from_id(id: u8) -> Result<Self, Error> {
        match id {
            0 => Ok(HashFunction::Sha256),
            _ => Err(Error::unsupported_hash_function(id)),
        }
    }

    /// Bit position of `element` in round `round` for a filter of `num_bits` bits.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` is 0.
    pub fn hash_index(self, element: &[u8], round: u8, num_bits: u64) -> u64 {
        match self {
            HashFunction::Sha256 => hash_index(element, round, num_bits),
        }
    }
}

impl TryFrom<u8> for HashFunction {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_id_round_trip() {
        let function = HashFunction::default();
        assert_eq!(function, HashFunction::Sha256);
        assert_eq!(HashFunction::from_id(function.id()).unwrap(), function);
    }

    #[test]
    fn test_unknown_id() {
        let err = HashFunction::try_from(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedHashFunction);
        assert_eq!(err.message(), "unknown hash function id 1");
    }

    #[test]
    fn test_dispatch_matches_free_function() {
        for round in 0..8 {
            assert_eq!(
                HashFunction::Sha256.hash_index(b"element", round, 4096),
                hash_index(b"element", round, 4096)
            );
        }
    }
}
