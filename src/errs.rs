// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipSetError {
    #[error("continuation probability must be in (0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("maximum level count must be at least 1")]
    InvalidMaxLevels,
    #[error("unable to allocate storage for a new node")]
    OutOfMemory,
}

impl From<TryReserveError> for SkipSetError {
    fn from(_: TryReserveError) -> Self {
        SkipSetError::OutOfMemory
    }
}
