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

//! Admission check run before filter storage is allocated.

use crate::error::Error;

/// Fails if `num_bytes` exceeds the memory the OS reports as available.
///
/// A platform that cannot report available memory passes the check.
#[cfg(feature = "memory-guard")]
pub(crate) fn ensure_allocatable(num_bytes: u64) -> Result<(), Error> {
    use sysinfo::System;
    use sysinfo::SystemExt;

    use crate::error::ErrorKind;

    let mut system = System::new();
    system.refresh_memory();
    let available = system.available_memory();
    tracing::trace!(num_bytes, available, "checking filter allocation");

    if available != 0 && num_bytes > available {
        return Err(Error::new(
            ErrorKind::InsufficientMemory,
            "filter storage exceeds available memory",
        )
        .with_context("requested_bytes", num_bytes)
        .with_context("available_bytes", available));
    }
    Ok(())
}

/// No-op without the `memory-guard` feature.
#[cfg(not(feature = "memory-guard"))]
pub(crate) fn ensure_allocatable(_num_bytes: u64) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_allocation_is_admitted() {
        ensure_allocatable(4).unwrap();
    }

    #[test]
    #[cfg(feature = "memory-guard")]
    fn test_impossible_allocation_is_rejected() {
        use sysinfo::System;
        use sysinfo::SystemExt;

        use crate::error::ErrorKind;

        let mut system = System::new();
        system.refresh_memory();
        if system.available_memory() == 0 {
            return;
        }

        let err = ensure_allocatable(u64::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientMemory);
        assert_eq!(err.message(), "filter storage exceeds available memory");
    }
}
