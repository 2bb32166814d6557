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

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dgc_bloomfilter::bloom::BloomFilter;
use dgc_bloomfilter::error::ErrorKind;
use dgc_bloomfilter::hash::hash_index;
use dgc_bloomfilter::hash::seeded_digest;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::le;

#[test]
fn test_single_word_filter() {
    let mut filter = BloomFilter::from_size_and_hashes(1, 1, 1).unwrap();
    filter.add([0u8, 5, 33, 44]);

    assert!(filter.might_contain([0u8, 5, 33, 44]));
    assert!(!filter.might_contain([0u8, 5, 88, 44]));
    assert_eq!(filter.num_words(), 1);
    // the element lands on bit 26, counted from the most significant bit
    assert_eq!(filter.words(), &[0x0000_0020]);
}

#[test]
fn test_reference_hash_values() {
    assert_eq!(hash_index(&[11], 1, 100), 75);
    assert_eq!(hash_index(&[1], 1, 1), 0);
    assert_eq!(
        STANDARD.encode(seeded_digest(&[11], 1)),
        "G2lkA9iYJ1bCNq+8WwnA9U3QaC7lNKddxLcKXV7Quo8="
    );
}

#[test]
fn test_hash_index_is_deterministic() {
    for round in 0..=u8::MAX {
        let first = hash_index(b"determinism", round, 9600);
        assert_eq!(first, hash_index(b"determinism", round, 9600));
        assert_that!(first, le(9599));
    }
}

#[test]
fn test_no_false_negatives() {
    let mut filter = BloomFilter::from_capacity_and_rate(10_000, 0.001).unwrap();
    let elements: Vec<String> = (0..10_000).map(|i| format!("element-{i}")).collect();

    for element in &elements {
        filter.add(element);
    }
    for element in &elements {
        assert!(filter.might_contain(element), "missing {element}");
    }
}

#[test]
fn test_false_positive_rate_is_near_target() {
    let mut filter = BloomFilter::from_capacity_and_rate(2_000, 0.01).unwrap();
    for i in 0..2_000 {
        filter.add(format!("in-{i}"));
    }

    let false_positives = (0..20_000)
        .filter(|i| filter.might_contain(format!("out-{i}")))
        .count();
    // 1% of 20k is 200; leave room for variance
    assert_that!(false_positives, le(400));
}

#[test]
fn test_adding_beyond_capacity() {
    let mut filter = BloomFilter::from_capacity_and_rate(10, 0.01).unwrap();
    let mut previous = filter.words().to_vec();

    for i in 0..100 {
        filter.add(format!("item-{i}"));
        for (before, after) in previous.iter().zip(filter.words()) {
            assert_eq!(before & after, *before, "a set bit was cleared");
        }
        previous = filter.words().to_vec();
    }

    assert_eq!(filter.added_elements(), 100);
    assert_eq!(filter.declared_elements(), 10);
    assert!(filter.is_saturated());
    for i in 0..100 {
        assert!(filter.might_contain(format!("item-{i}")));
    }
}

#[test]
fn test_empty_element() {
    let mut filter = BloomFilter::from_capacity_and_rate(10, 0.01).unwrap();
    assert!(!filter.might_contain(b""));
    filter.add(b"");
    assert!(filter.might_contain(b""));
}

#[test]
fn test_construction_errors() {
    let err = BloomFilter::from_capacity_and_rate(100, 0.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    assert_that!(err.message(), contains_substring("fpp must be between"));

    let err = BloomFilter::from_size_and_hashes(0, 3, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    assert_that!(err.to_string(), contains_substring("byte_budget: 0"));

    let err = BloomFilter::from_size_and_hashes(16, 1000, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooManyHashRounds);
    assert_that!(err.to_string(), contains_substring("num_hashes: 1000"));
}
