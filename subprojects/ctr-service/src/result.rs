//! CTR OS result codes.
//!
//! Every IPC operation reports completion through a packed 32-bit result
//! code. Zero is success; any code with the high bit set is an error, which
//! lets callers test failure with a sign check.
//!
//! The 32-bit code is structured as follows:
//!
//! - **Bits 0-9:** Description
//! - **Bits 10-17:** Module that produced the code
//! - **Bits 21-26:** Summary
//! - **Bits 27-31:** Level (severity)
//!
//! Bits 18-20 are reserved and always zero.

/// Severity of a result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Level {
    Success = 0,
    Info = 1,
    Status = 25,
    Temporary = 26,
    Permanent = 27,
    Usage = 28,
}

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Summary {
    Success = 0,
    NothingHappened = 1,
    WouldBlock = 2,
    OutOfResource = 3,
    NotFound = 4,
    InvalidState = 5,
    NotSupported = 6,
    InvalidArgument = 7,
    WrongArgument = 8,
    Canceled = 9,
    StatusChanged = 10,
    Internal = 11,
}

/// Originating module of a result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Module {
    Common = 0,
    Kernel = 1,
    Os = 6,
}

/// Fine-grained failure description (common pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Description {
    Success = 0,
    InvalidSize = 1004,
    InvalidEnumValue = 1005,
    InvalidCombination = 1006,
    OutOfMemory = 1011,
    NotImplemented = 1012,
    InvalidHandle = 1015,
    NotAuthorized = 1002,
}

/// Packed 32-bit result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ResultCode(u32);

impl ResultCode {
    /// The operation completed successfully.
    pub const SUCCESS: ResultCode = ResultCode(0);

    /// Reserved: header parsing is total, so this code is never produced by
    /// the current codec. Kept for stricter validation layers.
    pub const ERR_MALFORMED_HEADER: ResultCode = ResultCode::from_parts(
        Level::Permanent,
        Summary::WrongArgument,
        Module::Os,
        Description::InvalidEnumValue,
    );

    /// The translate-parameter region is inconsistent (a descriptor's
    /// payload runs past the declared region or the buffer).
    pub const ERR_INVALID_DESCRIPTOR: ResultCode = ResultCode::from_parts(
        Level::Permanent,
        Summary::WrongArgument,
        Module::Os,
        Description::InvalidCombination,
    );

    /// The command id is not present in the service's function table.
    pub const ERR_UNKNOWN_COMMAND: ResultCode = ResultCode::from_parts(
        Level::Permanent,
        Summary::NotSupported,
        Module::Os,
        Description::NotImplemented,
    );

    /// A handle in a descriptor payload was rejected by the handle table.
    pub const ERR_INVALID_HANDLE: ResultCode = ResultCode::from_parts(
        Level::Permanent,
        Summary::WrongArgument,
        Module::Kernel,
        Description::InvalidHandle,
    );

    /// A buffer translation was denied by the address-space collaborator.
    pub const ERR_PERMISSION_DENIED: ResultCode = ResultCode::from_parts(
        Level::Permanent,
        Summary::InvalidState,
        Module::Kernel,
        Description::NotAuthorized,
    );

    /// A requested memory mapping could not be established.
    pub const ERR_MAPPING_FAILED: ResultCode = ResultCode::from_parts(
        Level::Status,
        Summary::OutOfResource,
        Module::Kernel,
        Description::OutOfMemory,
    );

    /// Packs a result code from its fields.
    pub const fn from_parts(
        level: Level,
        summary: Summary,
        module: Module,
        description: Description,
    ) -> Self {
        Self(
            ((level as u32) << 27)
                | ((summary as u32) << 21)
                | ((module as u32) << 10)
                | (description as u32 & 0x3FF),
        )
    }

    /// Wraps a raw result code as produced by a service handler.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// `true` if the high (severity) bit marks this code as an error.
    pub const fn is_error(self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    pub const fn is_success(self) -> bool {
        !self.is_error()
    }

    /// Description field (bits 0-9).
    pub const fn description(self) -> u32 {
        self.0 & 0x3FF
    }

    /// Module field (bits 10-17).
    pub const fn module(self) -> u32 {
        (self.0 >> 10) & 0xFF
    }

    /// Summary field (bits 21-26).
    pub const fn summary(self) -> u32 {
        (self.0 >> 21) & 0x3F
    }

    /// Level field (bits 27-31).
    pub const fn level(self) -> u32 {
        self.0 >> 27
    }
}

impl core::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

/// Conversion from a structured error into the wire-level result code
/// written back to the client.
pub trait ToResultCode {
    fn to_rc(self) -> ResultCode;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_zero() {
        assert_eq!(ResultCode::SUCCESS.to_raw(), 0);
        assert!(ResultCode::SUCCESS.is_success());
        assert!(!ResultCode::SUCCESS.is_error());
    }

    #[test]
    fn test_error_codes_have_sign_bit() {
        for rc in [
            ResultCode::ERR_MALFORMED_HEADER,
            ResultCode::ERR_INVALID_DESCRIPTOR,
            ResultCode::ERR_UNKNOWN_COMMAND,
            ResultCode::ERR_INVALID_HANDLE,
            ResultCode::ERR_PERMISSION_DENIED,
            ResultCode::ERR_MAPPING_FAILED,
        ] {
            assert!(rc.is_error(), "{rc} should be an error");
        }
    }

    #[test]
    fn test_field_extraction() {
        let rc = ResultCode::ERR_INVALID_HANDLE;
        assert_eq!(rc.level(), Level::Permanent as u32);
        assert_eq!(rc.summary(), Summary::WrongArgument as u32);
        assert_eq!(rc.module(), Module::Kernel as u32);
        assert_eq!(rc.description(), Description::InvalidHandle as u32);
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ResultCode::ERR_MALFORMED_HEADER,
            ResultCode::ERR_INVALID_DESCRIPTOR,
            ResultCode::ERR_UNKNOWN_COMMAND,
            ResultCode::ERR_INVALID_HANDLE,
            ResultCode::ERR_PERMISSION_DENIED,
            ResultCode::ERR_MAPPING_FAILED,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
