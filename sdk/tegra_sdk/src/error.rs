//! Module for converting UEFI status codes to rusty errors.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// A specialized [`Result`](core::result::Result) type for firmware block store and fuse operations.
pub type Result<T> = core::result::Result<T, EfiError>;

use r_efi::efi;

/// EDK II Error Code equivalent as a Rust Error enum.
///
/// Only the codes the Tegra components can produce or must forward from a collaborator are given their own variant.
/// Anything else reported by a collaborator is carried through as [`EfiError::Unknown`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EfiError {
    /// The parameter was incorrect.
    InvalidParameter,
    /// The operation is not supported.
    Unsupported,
    /// The buffer was not the proper size for the request.
    ///
    /// Block reads and writes use this as a partial success signal: the clamped transfer was still performed.
    BadBufferSize,
    /// The buffer was not large enough to hold the requested data.
    BufferTooSmall,
    /// The hardware is not in the state the operation expects.
    NotReady,
    /// The physical device reported an error while attempting the operation.
    DeviceError,
    /// The device can not be written to.
    WriteProtected,
    /// The resource has run out.
    OutOfResources,
    /// An inconsistency was detected on the volume.
    VolumeCorrupted,
    /// The item was not found.
    NotFound,
    /// Access was denied.
    AccessDenied,
    /// A timeout time expired.
    Timeout,
    /// The operation was aborted.
    Aborted,
    /// A CRC error was detected.
    CrcError,
    /// An unknown EFI status code was encountered.
    Unknown(efi::Status),
}

impl EfiError {
    /// Converts an `r_efi::efi::Status` to a `Result`.
    ///
    /// If the status is `SUCCESS`, it returns `Ok(())`.
    /// Otherwise, it returns an `Err` with the corresponding `EfiError`.
    pub fn status_to_result(status: efi::Status) -> Result<()> {
        match status {
            efi::Status::SUCCESS => Ok(()),
            efi::Status::INVALID_PARAMETER => Err(EfiError::InvalidParameter),
            efi::Status::UNSUPPORTED => Err(EfiError::Unsupported),
            efi::Status::BAD_BUFFER_SIZE => Err(EfiError::BadBufferSize),
            efi::Status::BUFFER_TOO_SMALL => Err(EfiError::BufferTooSmall),
            efi::Status::NOT_READY => Err(EfiError::NotReady),
            efi::Status::DEVICE_ERROR => Err(EfiError::DeviceError),
            efi::Status::WRITE_PROTECTED => Err(EfiError::WriteProtected),
            efi::Status::OUT_OF_RESOURCES => Err(EfiError::OutOfResources),
            efi::Status::VOLUME_CORRUPTED => Err(EfiError::VolumeCorrupted),
            efi::Status::NOT_FOUND => Err(EfiError::NotFound),
            efi::Status::ACCESS_DENIED => Err(EfiError::AccessDenied),
            efi::Status::TIMEOUT => Err(EfiError::Timeout),
            efi::Status::ABORTED => Err(EfiError::Aborted),
            efi::Status::CRC_ERROR => Err(EfiError::CrcError),
            _ => Err(EfiError::Unknown(status)),
        }
    }
}

impl From<EfiError> for efi::Status {
    fn from(e: EfiError) -> efi::Status {
        match e {
            EfiError::InvalidParameter => efi::Status::INVALID_PARAMETER,
            EfiError::Unsupported => efi::Status::UNSUPPORTED,
            EfiError::BadBufferSize => efi::Status::BAD_BUFFER_SIZE,
            EfiError::BufferTooSmall => efi::Status::BUFFER_TOO_SMALL,
            EfiError::NotReady => efi::Status::NOT_READY,
            EfiError::DeviceError => efi::Status::DEVICE_ERROR,
            EfiError::WriteProtected => efi::Status::WRITE_PROTECTED,
            EfiError::OutOfResources => efi::Status::OUT_OF_RESOURCES,
            EfiError::VolumeCorrupted => efi::Status::VOLUME_CORRUPTED,
            EfiError::NotFound => efi::Status::NOT_FOUND,
            EfiError::AccessDenied => efi::Status::ACCESS_DENIED,
            EfiError::Timeout => efi::Status::TIMEOUT,
            EfiError::Aborted => efi::Status::ABORTED,
            EfiError::CrcError => efi::Status::CRC_ERROR,
            EfiError::Unknown(status) => status,
        }
    }
}

/// Converts a result into the status code an FVB or fuse protocol caller would observe.
pub fn result_to_status(result: Result<()>) -> efi::Status {
    match result {
        Ok(()) => efi::Status::SUCCESS,
        Err(e) => e.into(),
    }
}
