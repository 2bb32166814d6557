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

use crate::bloom::params;
use crate::bloom::serialization::SERIAL_VERSION;
use crate::error::Error;
use crate::hash::HashFunction;
use crate::memory;

pub(super) const BITS_PER_WORD: u64 = 32;
pub(super) const BYTES_PER_WORD: u64 = 4;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides membership queries with:
/// - No false negatives (added elements always return `true`)
/// - A false positive rate fixed at construction
/// - Bit positions and a byte layout shared by every implementation of the format
///
/// Elements are arbitrary byte strings. Use [`BloomFilter::from_capacity_and_rate`],
/// [`BloomFilter::from_size_and_hashes`] or [`BloomFilterBuilder`] to construct instances.
///
/// Two filters are equal when they serialize to the same bytes; the false positive
/// rate is compared by its bit pattern, so a decoded NaN rate equals itself.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    /// Wire layout revision
    pub(super) version: u16,
    /// Digest used to derive bit positions
    pub(super) hash_function: HashFunction,
    /// Number of hash rounds (k)
    pub(super) num_hashes: u8,
    /// Supplied or derived false positive rate (p)
    pub(super) false_positive_rate: f64,
    /// Capacity the filter was sized for (n)
    pub(super) declared_elements: u32,
    /// Number of `add` calls so far
    pub(super) added_elements: u32,
    /// Bit array packed into u32 words, most significant bit first
    pub(super) bit_array: Vec<u32>,
}

impl PartialEq for BloomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.hash_function == other.hash_function
            && self.num_hashes == other.num_hashes
            && self.false_positive_rate.to_bits() == other.false_positive_rate.to_bits()
            && self.declared_elements == other.declared_elements
            && self.added_elements == other.added_elements
            && self.bit_array == other.bit_array
    }
}

impl Eq for BloomFilter {}

impl BloomFilter {
    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use dgc_bloomfilter::bloom::BloomFilter;
    /// use dgc_bloomfilter::bloom::BloomFilterBuilder;
    ///
    /// // By accuracy (recommended)
    /// let filter = BloomFilter::builder().accuracy(1000, 0.01).build().unwrap();
    ///
    /// // By size: 1 KiB of storage, 7 rounds, sized for 1000 elements
    /// let filter = BloomFilterBuilder::with_size(1024, 7, 1000).build().unwrap();
    /// assert_eq!(filter.num_bits(), 8192);
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    /// Creates a filter with `byte_budget` bytes of storage (rounded up to whole
    /// 32-bit words), `num_hashes` rounds, sized for `capacity` elements.
    ///
    /// The false positive rate is derived from the three inputs.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if any
    ///   input is 0 or `capacity` does not fit in 32 bits
    /// - [`ErrorKind::TooManyHashRounds`](crate::error::ErrorKind::TooManyHashRounds) if
    ///   `num_hashes` exceeds 255
    /// - [`ErrorKind::InvalidSize`](crate::error::ErrorKind::InvalidSize) if the word count
    ///   does not fit in 32 bits
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let filter = BloomFilter::from_size_and_hashes(1, 1, 1).unwrap();
    /// assert_eq!(filter.num_bits(), 32);
    /// assert_eq!(filter.num_hashes(), 1);
    /// ```
    pub fn from_size_and_hashes(
        byte_budget: u64,
        num_hashes: u32,
        capacity: u64,
    ) -> Result<Self, Error> {
        BloomFilterBuilder::with_size(byte_budget, num_hashes, capacity).build()
    }

    /// Creates a filter sized for `capacity` elements at false positive rate `fpp`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if
    ///   `capacity` is 0 or `fpp` is not in (0.0, 1.0)
    /// - [`ErrorKind::TooManyHashRounds`](crate::error::ErrorKind::TooManyHashRounds) if the
    ///   derived round count exceeds 255
    /// - [`ErrorKind::InvalidSize`](crate::error::ErrorKind::InvalidSize) if the derived
    ///   storage is empty or too large for the wire format
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let filter = BloomFilter::from_capacity_and_rate(1000, 0.01).unwrap();
    /// assert_eq!(filter.num_bits(), 9600);
    /// assert_eq!(filter.num_hashes(), 7);
    /// assert_eq!(filter.false_positive_rate(), 0.01);
    /// ```
    pub fn from_capacity_and_rate(capacity: u64, fpp: f64) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(capacity, fpp).build()
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Element was **possibly** added (or false positive)
    /// - `false`: Element was **definitely not** added
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::from_capacity_and_rate(100, 0.01).unwrap();
    /// filter.add("apple");
    ///
    /// assert!(filter.might_contain("apple")); // true - was added
    /// assert!(!filter.might_contain("grape")); // false - never added (probably)
    /// ```
    pub fn might_contain<T: AsRef<[u8]>>(&self, element: T) -> bool {
        let element = element.as_ref();
        (0..self.num_hashes).all(|round| self.get_bit(self.bit_index(element, round)))
    }

    /// Tests and adds an element in a single operation.
    ///
    /// Returns whether the element was possibly already in the set before it was added.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::from_capacity_and_rate(100, 0.01).unwrap();
    ///
    /// let was_present = filter.contains_and_add("apple");
    /// assert!(!was_present); // First insertion
    ///
    /// let was_present = filter.contains_and_add("apple");
    /// assert!(was_present); // Now it's in the set
    /// ```
    pub fn contains_and_add<T: AsRef<[u8]>>(&mut self, element: T) -> bool {
        let element = element.as_ref();
        let was_present = self.might_contain(element);
        self.add(element);
        was_present
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Adds an element to the filter.
    ///
    /// After this call, `might_contain(element)` always returns `true`.
    ///
    /// Adding more elements than the filter was declared for is allowed; it only
    /// raises the false positive rate. The transition is reported once through a
    /// `tracing` warning and can be queried with [`is_saturated`](Self::is_saturated).
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::from_capacity_and_rate(100, 0.01).unwrap();
    ///
    /// filter.add("apple");
    /// filter.add(b"raw bytes");
    /// filter.add(vec![0u8, 5, 33, 44]);
    ///
    /// assert!(filter.might_contain("apple"));
    /// assert_eq!(filter.added_elements(), 3);
    /// ```
    pub fn add<T: AsRef<[u8]>>(&mut self, element: T) {
        let element = element.as_ref();
        for round in 0..self.num_hashes {
            let bit_index = self.bit_index(element, round);
            self.set_bit(bit_index);
        }

        self.added_elements = self.added_elements.saturating_add(1);
        if self.added_elements == self.declared_elements {
            tracing::warn!(
                declared_elements = self.declared_elements,
                "bloom filter reached its declared capacity; further elements raise the false positive rate"
            );
        } else if self.added_elements > self.declared_elements {
            tracing::trace!(
                added_elements = self.added_elements,
                declared_elements = self.declared_elements,
                "bloom filter over capacity"
            );
        }
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether no bit has been set yet.
    pub fn is_empty(&self) -> bool {
        self.bit_array.iter().all(|&word| word == 0)
    }

    /// Returns whether the number of added elements has reached the declared capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::from_size_and_hashes(16, 3, 2).unwrap();
    /// filter.add("a");
    /// assert!(!filter.is_saturated());
    /// filter.add("b");
    /// assert!(filter.is_saturated());
    /// ```
    pub fn is_saturated(&self) -> bool {
        self.added_elements >= self.declared_elements
    }

    /// Returns the number of bits set to 1.
    pub fn bits_set(&self) -> u64 {
        self.bit_array
            .iter()
            .map(|word| u64::from(word.count_ones()))
            .sum()
    }

    /// Returns the total number of bits in the filter (m).
    pub fn num_bits(&self) -> u64 {
        self.bit_array.len() as u64 * BITS_PER_WORD
    }

    /// Returns the number of 32-bit storage words.
    pub fn num_words(&self) -> usize {
        self.bit_array.len()
    }

    /// Returns the number of hash rounds (k).
    pub fn num_hashes(&self) -> u8 {
        self.num_hashes
    }

    /// Returns the capacity the filter was sized for (n).
    pub fn declared_elements(&self) -> u32 {
        self.declared_elements
    }

    /// Returns how many times [`add`](Self::add) has been called.
    pub fn added_elements(&self) -> u32 {
        self.added_elements
    }

    /// Returns the false positive rate recorded at construction.
    ///
    /// This value is stored, not recomputed from the current fill level.
    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    /// Returns the wire layout revision.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Returns the digest used to derive bit positions.
    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Returns the backing words, most significant bit first within each word.
    pub fn words(&self) -> &[u32] {
        &self.bit_array
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn bit_index(&self, element: &[u8], round: u8) -> u64 {
        self.hash_function
            .hash_index(element, round, self.num_bits())
    }

    /// Gets the value of a single bit.
    fn get_bit(&self, bit_index: u64) -> bool {
        let (word_index, mask) = word_and_mask(bit_index);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets a single bit.
    fn set_bit(&mut self, bit_index: u64) {
        let (word_index, mask) = word_and_mask(bit_index);
        self.bit_array[word_index] |= mask;
    }
}

/// Bit 0 of a word is its most significant bit.
fn word_and_mask(bit_index: u64) -> (usize, u32) {
    let word_index = (bit_index / BITS_PER_WORD) as usize;
    let bit_offset = bit_index % BITS_PER_WORD;
    (word_index, 0x8000_0000u32 >> bit_offset)
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Size {
        byte_budget: u64,
        num_hashes: u32,
        capacity: u64,
    },
    Accuracy {
        capacity: u64,
        fpp: f64,
    },
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify target elements and false positive
///   rate (recommended)
/// - [`with_size()`](Self::with_size): Specify storage bytes, hash rounds and capacity (manual)
///
/// All validation happens in [`build()`](Self::build), before any storage is allocated.
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    sizing: Option<Sizing>,
    hash_function: HashFunction,
    version: u16,
}

impl Default for BloomFilterBuilder {
    fn default() -> Self {
        BloomFilterBuilder {
            sizing: None,
            hash_function: HashFunction::default(),
            version: SERIAL_VERSION,
        }
    }
}

impl BloomFilterBuilder {
    /// Creates a builder that derives size and hash rounds from a target accuracy.
    ///
    /// # Arguments
    ///
    /// - `capacity`: Maximum expected number of elements (n)
    /// - `fpp`: Target false positive probability (e.g., 0.01 for 1%)
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build().unwrap();
    /// assert_eq!(filter.declared_elements(), 10_000);
    /// ```
    pub fn with_accuracy(capacity: u64, fpp: f64) -> Self {
        Self::default().accuracy(capacity, fpp)
    }

    /// Creates a builder with manual size specification.
    ///
    /// # Arguments
    ///
    /// - `byte_budget`: Storage size in bytes, rounded up to whole 32-bit words
    /// - `num_hashes`: Number of hash rounds (k)
    /// - `capacity`: Number of elements the filter is sized for (n)
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(10, 3, 5).build().unwrap();
    /// assert_eq!(filter.num_words(), 3);
    /// ```
    pub fn with_size(byte_budget: u64, num_hashes: u32, capacity: u64) -> Self {
        Self::default().size(byte_budget, num_hashes, capacity)
    }

    /// Sizes the filter for a target accuracy, replacing any earlier sizing.
    pub fn accuracy(mut self, capacity: u64, fpp: f64) -> Self {
        self.sizing = Some(Sizing::Accuracy { capacity, fpp });
        self
    }

    /// Sizes the filter manually, replacing any earlier sizing.
    pub fn size(mut self, byte_budget: u64, num_hashes: u32, capacity: u64) -> Self {
        self.sizing = Some(Sizing::Size {
            byte_budget,
            num_hashes,
            capacity,
        });
        self
    }

    /// Sets the digest used to derive bit positions (default: SHA-256).
    pub fn hash_function(mut self, hash_function: HashFunction) -> Self {
        self.hash_function = hash_function;
        self
    }

    /// Sets the wire layout revision written to the header (default: 1).
    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidParameters`](crate::error::ErrorKind::InvalidParameters) if no
    ///   sizing was given, a numeric input is 0 or out of range
    /// - [`ErrorKind::InvalidSize`](crate::error::ErrorKind::InvalidSize) if the storage would
    ///   be empty or exceed `u32::MAX` words
    /// - [`ErrorKind::TooManyHashRounds`](crate::error::ErrorKind::TooManyHashRounds) if more
    ///   than 255 rounds are requested or derived
    /// - [`ErrorKind::InsufficientMemory`](crate::error::ErrorKind::InsufficientMemory) with
    ///   the `memory-guard` feature, if the storage exceeds available memory
    pub fn build(self) -> Result<BloomFilter, Error> {
        let sizing = self.sizing.ok_or_else(|| {
            Error::invalid_parameters("must call with_accuracy() or with_size() before build()")
        })?;

        let (num_words, num_hashes, capacity, fpp) = match sizing {
            Sizing::Size {
                byte_budget,
                num_hashes,
                capacity,
            } => {
                if byte_budget == 0 || num_hashes == 0 || capacity == 0 {
                    return Err(Error::invalid_parameters(
                        "byte_budget, num_hashes and capacity must be greater than 0",
                    )
                    .with_context("byte_budget", byte_budget)
                    .with_context("num_hashes", num_hashes)
                    .with_context("capacity", capacity));
                }
                let num_words = checked_num_words(byte_budget.div_ceil(BYTES_PER_WORD))?;
                let fpp = params::derive_false_positive_rate(
                    num_words * BITS_PER_WORD,
                    capacity,
                    num_hashes,
                )?;
                (num_words, num_hashes, capacity, fpp)
            }
            Sizing::Accuracy { capacity, fpp } => {
                let num_bits = params::derive_bit_count(capacity, fpp)?;
                let num_words = checked_num_words(num_bits.div_ceil(BITS_PER_WORD))?;
                let num_hashes = params::derive_hash_rounds(num_words * BITS_PER_WORD, capacity)?;
                (num_words, num_hashes, capacity, fpp)
            }
        };

        let declared_elements = u32::try_from(capacity).map_err(|_| {
            Error::invalid_parameters("capacity must fit in 32 bits")
                .with_context("capacity", capacity)
        })?;
        let num_hashes =
            u8::try_from(num_hashes).map_err(|_| Error::too_many_hash_rounds(num_hashes))?;

        memory::ensure_allocatable(num_words * BYTES_PER_WORD)?;

        Ok(BloomFilter {
            version: self.version,
            hash_function: self.hash_function,
            num_hashes,
            false_positive_rate: fpp,
            declared_elements,
            added_elements: 0,
            bit_array: vec![0u32; num_words as usize],
        })
    }
}

fn checked_num_words(num_words: u64) -> Result<u64, Error> {
    if num_words == 0 {
        return Err(Error::invalid_size("filter storage rounds to 0 words"));
    }
    if num_words > u64::from(u32::MAX) {
        return Err(Error::invalid_size("word count must fit in 32 bits")
            .with_context("num_words", num_words));
    }
    Ok(num_words)
}

// ============================================================================
// Tests
// ============================================================================
