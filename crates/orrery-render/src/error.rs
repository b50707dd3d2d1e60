//! Backend error codes and their reporting.
//!
//! Backends queue an [`ErrorCode`] whenever a call is rejected. Callers poll the
//! queue with [`RenderBackend::drain_errors`](crate::RenderBackend::drain_errors)
//! and report what they find; nothing here alters control flow.

use std::fmt;

/// Classified GPU-state error, in the GL error taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An enumerated argument was out of range.
    InvalidEnum,
    /// A numeric argument or handle was out of range.
    InvalidValue,
    /// The call is not allowed in the current state.
    InvalidOperation,
    /// The framebuffer is not ready to be drawn into.
    InvalidFramebufferOperation,
    /// The backend could not allocate memory.
    OutOfMemory,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::InvalidEnum,
        ErrorCode::InvalidValue,
        ErrorCode::InvalidOperation,
        ErrorCode::InvalidFramebufferOperation,
        ErrorCode::OutOfMemory,
    ];

    /// Human readable description used in logs.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::InvalidEnum => "Invalid enum",
            ErrorCode::InvalidValue => "Invalid value",
            ErrorCode::InvalidOperation => "Invalid operation",
            ErrorCode::InvalidFramebufferOperation => "Invalid framebuffer operation",
            ErrorCode::OutOfMemory => "Out of memory",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<&wgpu::Error> for ErrorCode {
    fn from(error: &wgpu::Error) -> Self {
        match error {
            wgpu::Error::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            _ => ErrorCode::InvalidOperation,
        }
    }
}

/// Log every drained error for `label` and return how many there were.
pub fn report_backend_errors(label: &str, errors: &[ErrorCode]) -> usize {
    for code in errors {
        log::error!("{label}: {code}");
    }
    errors.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.description()));
        }
    }

    #[test]
    fn test_display_matches_description() {
        assert_eq!(ErrorCode::OutOfMemory.to_string(), "Out of memory");
        assert_eq!(
            ErrorCode::InvalidFramebufferOperation.to_string(),
            "Invalid framebuffer operation"
        );
    }

    fn source(message: &str) -> wgpu::ErrorSource {
        Box::new(std::io::Error::other(message.to_string()))
    }

    #[test]
    fn test_wgpu_out_of_memory_maps_to_out_of_memory() {
        let error = wgpu::Error::OutOfMemory {
            source: source("allocation failed"),
        };
        assert_eq!(ErrorCode::from(&error), ErrorCode::OutOfMemory);
    }

    #[test]
    fn test_wgpu_validation_and_internal_map_to_invalid_operation() {
        let validation = wgpu::Error::Validation {
            source: source("texture too large"),
            description: "Dimension X value 10800 exceeds the limit of 8192".to_string(),
        };
        let internal = wgpu::Error::Internal {
            source: source("driver"),
            description: "internal failure".to_string(),
        };
        assert_eq!(ErrorCode::from(&validation), ErrorCode::InvalidOperation);
        assert_eq!(ErrorCode::from(&internal), ErrorCode::InvalidOperation);
    }

    #[test]
    fn test_report_counts_errors() {
        assert_eq!(report_backend_errors("sun", &[]), 0);
        assert_eq!(
            report_backend_errors("moon", &[ErrorCode::InvalidValue, ErrorCode::InvalidEnum]),
            2
        );
    }
}
