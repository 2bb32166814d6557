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

//! Network-order primitives for the filter wire format.

use std::io;
use std::io::Read;

use byteorder::BigEndian;
use byteorder::ByteOrder;
use byteorder::ReadBytesExt;

/// Append-only big-endian byte buffer.
pub(crate) struct FilterBytes {
    bytes: Vec<u8>,
}

impl FilterBytes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    pub fn write_u8(&mut self, n: u8) {
        self.bytes.push(n);
    }

    pub fn write_u16_be(&mut self, n: u16) {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, n);
        self.write(&buf);
    }

    pub fn write_u32_be(&mut self, n: u32) {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, n);
        self.write(&buf);
    }

    pub fn write_f64_be(&mut self, n: f64) {
        let mut buf = [0u8; 8];
        BigEndian::write_f64(&mut buf, n);
        self.write(&buf);
    }
}

/// Big-endian reader over any byte source.
pub(crate) struct FilterReader<R> {
    reader: R,
}

impl<R: Read> FilterReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.reader.read_u8()
    }

    pub fn read_u16_be(&mut self) -> io::Result<u16> {
        self.reader.read_u16::<BigEndian>()
    }

    pub fn read_u32_be(&mut self) -> io::Result<u32> {
        self.reader.read_u32::<BigEndian>()
    }

    pub fn read_f64_be(&mut self) -> io::Result<f64> {
        self.reader.read_f64::<BigEndian>()
    }
}

impl FilterReader<&[u8]> {
    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.reader.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_is_network_order() {
        let mut bytes = FilterBytes::with_capacity(15);
        bytes.write_u16_be(0x0102);
        bytes.write_u8(0x03);
        bytes.write_u32_be(0x0405_0607);
        bytes.write_f64_be(1.0);

        assert_eq!(
            bytes.into_bytes(),
            vec![1, 2, 3, 4, 5, 6, 7, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_reader_tracks_remaining() {
        let data = [0x00, 0x01, 0xff, 0x80, 0x00, 0x00, 0x20, 0x99];
        let mut reader = FilterReader::new(&data[..]);
        assert_eq!(reader.read_u16_be().unwrap(), 1);
        assert_eq!(reader.read_u8().unwrap(), 0xff);
        assert_eq!(reader.remaining(), 5);
        assert_eq!(reader.read_u32_be().unwrap(), 0x8000_0020);
        assert_eq!(reader.remaining(), 1);
        assert!(reader.read_u32_be().is_err());
    }
}
