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

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// Resolves a file under `tests/test_data`.
pub fn test_data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test_data")
        .join(name)
}

/// One golden case, generated by a standalone Python implementation of the
/// hashing and wire format that was written independently of this crate.
#[derive(Debug, Deserialize)]
pub struct FilterCase {
    /// Target false positive rate the filter was built with.
    pub p: f64,
    /// Hash rounds the generator derived.
    pub k: u8,
    /// Candidate elements, added as UTF-8 bytes.
    pub data: Vec<String>,
    /// 1 where the element at the same index was added.
    pub written: Vec<u8>,
    /// 1 where the generated filter reports the element as possibly present.
    pub exists: Vec<u8>,
    /// Base64 of the serialized generated filter.
    pub filter: String,
}

impl FilterCase {
    pub fn filter_bytes(&self) -> Vec<u8> {
        STANDARD.decode(&self.filter).unwrap()
    }

    pub fn written_elements(&self) -> impl Iterator<Item = &str> {
        self.data
            .iter()
            .zip(&self.written)
            .filter(|(_, written)| **written == 1)
            .map(|(element, _)| element.as_str())
    }
}

pub fn load_filter_cases(name: &str) -> Vec<FilterCase> {
    let path = test_data(name);
    let json = fs::read_to_string(&path).unwrap();
    serde_json::from_str(&json).unwrap()
}
