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

//! Binary layout, all fields big-endian:
//!
//! ```text
//! offset  size  field
//!      0     2  format version
//!      2     1  hash rounds (k)
//!      3     1  hash function id
//!      4     8  false positive rate (f64)
//!     12     4  declared element count (n)
//!     16     4  added element count
//!     20     4  word count
//!     24   4*w  words
//! ```

use std::io;
use std::io::Read;
use std::io::Write;

use crate::bloom::BloomFilter;
use crate::bloom::sketch::BYTES_PER_WORD;
use crate::codec::FilterBytes;
use crate::codec::FilterReader;
use crate::error::Error;
use crate::hash::HashFunction;

pub(crate) const SERIAL_VERSION: u16 = 1;
pub(crate) const HEADER_SIZE_BYTES: usize = 24;

// Upper bound on words reserved up front when the header cannot be checked
// against the input length.
const MAX_PREALLOCATED_WORDS: u32 = 1 << 16;

struct Header {
    version: u16,
    num_hashes: u8,
    hash_function: HashFunction,
    false_positive_rate: f64,
    declared_elements: u32,
    added_elements: u32,
    num_words: u32,
}

impl BloomFilter {
    /// Serializes the filter to a byte vector of exactly `24 + 4 * num_words()` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::from_capacity_and_rate(100, 0.01).unwrap();
    /// filter.add("test");
    ///
    /// let bytes = filter.serialize();
    /// assert_eq!(bytes.len(), 24 + 4 * filter.num_words());
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let capacity = HEADER_SIZE_BYTES + self.bit_array.len() * BYTES_PER_WORD as usize;
        let mut bytes = FilterBytes::with_capacity(capacity);

        bytes.write_u16_be(self.version);
        bytes.write_u8(self.num_hashes);
        bytes.write_u8(self.hash_function.id());
        bytes.write_f64_be(self.false_positive_rate);
        bytes.write_u32_be(self.declared_elements);
        bytes.write_u32_be(self.added_elements);
        // the builder and the decoder both cap the word count at u32::MAX
        bytes.write_u32_be(self.bit_array.len() as u32);
        for &word in &self.bit_array {
            bytes.write_u32_be(word);
        }

        bytes.into_bytes()
    }

    /// Writes the serialized filter to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error produced by `writer`.
    pub fn serialize_into<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.serialize())
    }

    /// Deserializes a filter from bytes.
    ///
    /// The bit count is recomputed from the word count. Bytes after the last
    /// declared word are ignored.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::TruncatedData`](crate::error::ErrorKind::TruncatedData) if the input is
    ///   shorter than the header
    /// - [`ErrorKind::MalformedHeader`](crate::error::ErrorKind::MalformedHeader) if the word
    ///   count needs more bytes than remain, or k or the word count is 0
    /// - [`ErrorKind::UnsupportedHashFunction`](crate::error::ErrorKind::UnsupportedHashFunction)
    ///   if the hash function id is unknown
    ///
    /// # Examples
    ///
    /// ```
    /// # use dgc_bloomfilter::bloom::BloomFilter;
    /// let original = BloomFilter::from_capacity_and_rate(100, 0.01).unwrap();
    /// let bytes = original.serialize();
    ///
    /// let restored = BloomFilter::deserialize(&bytes).unwrap();
    /// assert_eq!(original, restored);
    /// ```
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = FilterReader::new(bytes);
        let header = read_header(&mut cursor)?;

        let required = u64::from(header.num_words) * BYTES_PER_WORD;
        let remaining = cursor.remaining() as u64;
        if required > remaining {
            return Err(Error::malformed_header(
                "word count requires more bytes than the input holds",
            )
            .with_context("num_words", header.num_words)
            .with_context("required_bytes", required)
            .with_context("remaining_bytes", remaining));
        }

        let bit_array = read_words(&mut cursor, header.num_words)?;
        Ok(header.into_filter(bit_array))
    }

    /// Reads a serialized filter from `reader`.
    ///
    /// Exactly the header and the declared words are consumed.
    ///
    /// # Errors
    ///
    /// Same as [`deserialize`](Self::deserialize), except that a stream ending
    /// before the declared words are read fails with
    /// [`ErrorKind::TruncatedData`](crate::error::ErrorKind::TruncatedData).
    pub fn deserialize_from<R: Read>(reader: R) -> Result<Self, Error> {
        let mut cursor = FilterReader::new(reader);
        let header = read_header(&mut cursor)?;
        let bit_array = read_words(&mut cursor, header.num_words)?;
        Ok(header.into_filter(bit_array))
    }
}

fn read_header<R: Read>(cursor: &mut FilterReader<R>) -> Result<Header, Error> {
    fn make_error(tag: &'static str) -> impl FnOnce(io::Error) -> Error {
        move |err| Error::truncated(tag).set_source(err)
    }

    let version = cursor.read_u16_be().map_err(make_error("version"))?;
    let num_hashes = cursor.read_u8().map_err(make_error("num_hashes"))?;
    let hash_function_id = cursor.read_u8().map_err(make_error("hash_function"))?;
    let false_positive_rate = cursor
        .read_f64_be()
        .map_err(make_error("false_positive_rate"))?;
    let declared_elements = cursor
        .read_u32_be()
        .map_err(make_error("declared_elements"))?;
    let added_elements = cursor.read_u32_be().map_err(make_error("added_elements"))?;
    let num_words = cursor.read_u32_be().map_err(make_error("num_words"))?;

    let hash_function = HashFunction::from_id(hash_function_id)?;
    if num_hashes == 0 {
        return Err(Error::malformed_header("num_hashes must be at least 1"));
    }
    if num_words == 0 {
        return Err(Error::malformed_header("word count must be at least 1"));
    }
    if added_elements > declared_elements {
        tracing::debug!(
            added_elements,
            declared_elements,
            "decoded bloom filter holds more elements than declared"
        );
    }

    Ok(Header {
        version,
        num_hashes,
        hash_function,
        false_positive_rate,
        declared_elements,
        added_elements,
        num_words,
    })
}

fn read_words<R: Read>(cursor: &mut FilterReader<R>, num_words: u32) -> Result<Vec<u32>, Error> {
    let mut words = Vec::with_capacity(num_words.min(MAX_PREALLOCATED_WORDS) as usize);
    for _ in 0..num_words {
        let word = cursor.read_u32_be().map_err(|err| {
            Error::truncated("bit_array")
                .with_context("num_words", num_words)
                .with_context("words_read", words.len())
                .set_source(err)
        })?;
        words.push(word);
    }
    Ok(words)
}

impl Header {
    fn into_filter(self, bit_array: Vec<u32>) -> BloomFilter {
        BloomFilter {
            version: self.version,
            hash_function: self.hash_function,
            num_hashes: self.num_hashes,
            false_positive_rate: self.false_positive_rate,
            declared_elements: self.declared_elements,
            added_elements: self.added_elements,
            bit_array,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn header(num_hashes: u8, hash_function: u8, num_words: u32) -> Vec<u8> {
        let mut bytes = FilterBytes::with_capacity(HEADER_SIZE_BYTES);
        bytes.write_u16_be(SERIAL_VERSION);
        bytes.write_u8(num_hashes);
        bytes.write_u8(hash_function);
        bytes.write_f64_be(0.5);
        bytes.write_u32_be(1);
        bytes.write_u32_be(0);
        bytes.write_u32_be(num_words);
        bytes.into_bytes()
    }

    #[test]
    fn test_header_layout() {
        let mut filter = BloomFilter::from_size_and_hashes(8, 3, 10).unwrap();
        filter.add("a");
        let bytes = filter.serialize();

        assert_eq!(bytes.len(), HEADER_SIZE_BYTES + 8);
        assert_eq!(&bytes[0..2], &[0, 1]);
        assert_eq!(bytes[2], 3);
        assert_eq!(bytes[3], 0);
        assert_eq!(&bytes[4..12], &filter.false_positive_rate().to_be_bytes());
        assert_eq!(&bytes[12..16], &[0, 0, 0, 10]);
        assert_eq!(&bytes[16..20], &[0, 0, 0, 1]);
        assert_eq!(&bytes[20..24], &[0, 0, 0, 2]);
        assert_eq!(&bytes[24..28], &filter.words()[0].to_be_bytes());
        assert_eq!(&bytes[28..32], &filter.words()[1].to_be_bytes());
    }

    #[test]
    fn test_short_header_is_truncated() {
        let bytes = header(1, 0, 1);
        for len in [0, 1, 2, 11, 23] {
            let err = BloomFilter::deserialize(&bytes[..len]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TruncatedData, "len={len}");
        }
    }

    #[test]
    fn test_word_count_beyond_input() {
        let mut bytes = header(1, 0, 3);
        bytes.extend_from_slice(&[0u8; 8]);
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);

        let err = BloomFilter::deserialize(&header(1, 0, u32::MAX)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn test_stream_ending_inside_words() {
        let mut bytes = header(1, 0, 3);
        bytes.extend_from_slice(&[0u8; 8]);
        let err = BloomFilter::deserialize_from(&bytes[..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedData);
    }

    #[test]
    fn test_unknown_hash_function() {
        let mut bytes = header(1, 7, 1);
        bytes.extend_from_slice(&[0u8; 4]);
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedHashFunction);
    }

    #[test]
    fn test_unqueryable_headers() {
        let mut bytes = header(0, 0, 1);
        bytes.extend_from_slice(&[0u8; 4]);
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);

        let err = BloomFilter::deserialize(&header(1, 0, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let filter = BloomFilter::from_size_and_hashes(4, 1, 1).unwrap();
        let mut bytes = filter.serialize();
        bytes.extend_from_slice(&[0xaa, 0xbb]);
        assert_eq!(BloomFilter::deserialize(&bytes).unwrap(), filter);
    }
}
