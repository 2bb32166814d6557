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

//! Error types for Bloom filter operations

use std::fmt;

/// ErrorKind is all kinds of Error of dgc-bloomfilter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A construction input is non-positive, non-finite or out of range.
    InvalidParameters,
    /// The derived storage size rounds to zero words or does not fit the wire format.
    InvalidSize,
    /// The number of hash rounds exceeds what a single round byte can encode.
    TooManyHashRounds,
    /// The input ended before the fixed header could be read.
    TruncatedData,
    /// The header declares a layout that the input cannot satisfy.
    MalformedHeader,
    /// The hash function id is not known to this implementation.
    UnsupportedHashFunction,
    /// The storage to allocate exceeds the memory currently available.
    InsufficientMemory,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidParameters => "InvalidParameters",
            ErrorKind::InvalidSize => "InvalidSize",
            ErrorKind::TooManyHashRounds => "TooManyHashRounds",
            ErrorKind::TruncatedData => "TruncatedData",
            ErrorKind::MalformedHeader => "MalformedHeader",
            ErrorKind::UnsupportedHashFunction => "UnsupportedHashFunction",
            ErrorKind::InsufficientMemory => "InsufficientMemory",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all dgc-bloomfilter functions.
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::default(),
            source: None,
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Set source for error.
    ///
    /// # Panics
    ///
    /// Panics if the source has been set.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::error::Error as _;
    /// use dgc_bloomfilter::error::{Error, ErrorKind};
    ///
    /// let mut error = Error::new(ErrorKind::TruncatedData, "failed to read filter header");
    /// assert!(error.source().is_none());
    /// error = error.set_source(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    /// assert!(error.source().is_some());
    /// ```
    pub fn set_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(src.into());
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

// Shorthands used across the crate.
impl Error {
    pub(crate) fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameters, message)
    }

    pub(crate) fn invalid_size(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSize, message)
    }

    pub(crate) fn too_many_hash_rounds(rounds: impl ToString) -> Self {
        Self::new(
            ErrorKind::TooManyHashRounds,
            "hash round index must fit in a single byte",
        )
        .with_context("num_hashes", rounds)
        .with_context("max", u8::MAX)
    }

    pub(crate) fn truncated(field: &'static str) -> Self {
        Self::new(
            ErrorKind::TruncatedData,
            format!("insufficient data to read {field}"),
        )
    }

    pub(crate) fn malformed_header(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedHeader, message)
    }

    pub(crate) fn unsupported_hash_function(id: u8) -> Self {
        Self::new(
            ErrorKind::UnsupportedHashFunction,
            format!("unknown hash function id {id}"),
        )
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source:")?;
            writeln!(f, "   {source:#}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_context() {
        let err = Error::too_many_hash_rounds(300);
        assert_eq!(err.kind(), ErrorKind::TooManyHashRounds);
        assert_eq!(
            err.to_string(),
            "TooManyHashRounds, context: { num_hashes: 300, max: 255 } => hash round index must fit in a single byte"
        );
    }

    #[test]
    fn test_truncated_message() {
        let err = Error::truncated("word_count");
        assert_eq!(err.kind(), ErrorKind::TruncatedData);
        assert_eq!(err.message(), "insufficient data to read word_count");
    }
}
