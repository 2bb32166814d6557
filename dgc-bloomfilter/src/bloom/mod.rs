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

//! Bloom filter with a portable bit layout and binary format.
//!
//! A filter built and serialized by one implementation can be deserialized and
//! queried by any other implementation of the same format: bit positions come
//! from [`crate::hash`], storage is a sequence of 32-bit words read most
//! significant bit first, and every header field is big-endian.
//!
//! # Usage
//!
//! ```rust
//! use dgc_bloomfilter::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::from_capacity_and_rate(1000, 0.01).unwrap();
//! filter.add("URN:UVCI:01:AT:10807843F94AEE0EE5093FBC254BD813#B");
//!
//! let bytes = filter.serialize();
//! let restored = BloomFilter::deserialize(&bytes).unwrap();
//! assert!(restored.might_contain("URN:UVCI:01:AT:10807843F94AEE0EE5093FBC254BD813#B"));
//! ```
//!
//! # Notes
//!
//! - Elements cannot be removed.
//! - Adding more elements than the declared capacity is allowed and only
//!   degrades the false positive rate.
//! - The filter has no interior locking; share it behind a lock if needed.

pub mod params;
mod serialization;
mod sketch;

pub use self::sketch::BloomFilter;
pub use self::sketch::BloomFilterBuilder;
