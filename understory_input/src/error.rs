// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// Errors surfaced by input entry points.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InputError {
    /// A raw pointer event carried a pointer type that could not be resolved.
    #[error("unknown pointer type `{0}`")]
    UnknownPointerType(String),
}

/// Apply the build-dependent policy for an unresolvable pointer type.
///
/// Debug builds return the error; release builds log it and carry on.
pub(crate) fn unknown_pointer_type(raw: &str) -> Result<(), InputError> {
    let err = InputError::UnknownPointerType(String::from(raw));
    if cfg!(debug_assertions) {
        Err(err)
    } else {
        log::warn!("dropping pointer event: {err}");
        Ok(())
    }
}
