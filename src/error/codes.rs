/// Error code registry for decicalc
///
/// Error codes are organized by category:
/// - 1000-1999: Validation errors
/// - 2000-2999: Operation errors
/// - 3000-3999: Configuration errors
/// - 4000-4999: Persistence errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Validation errors (1000-1999)
    pub const VALIDATION_GENERIC: u16 = 1000;
    pub const VALIDATION_NOT_A_NUMBER: u16 = 1001;
    pub const VALIDATION_OUT_OF_RANGE: u16 = 1002;
    pub const VALIDATION_EMPTY_INPUT: u16 = 1003;

    // Operation errors (2000-2999)
    pub const OPERATION_GENERIC: u16 = 2000;
    pub const OPERATION_UNKNOWN: u16 = 2001;
    pub const OPERATION_DIVISION_BY_ZERO: u16 = 2002;
    pub const OPERATION_NEGATIVE_EXPONENT: u16 = 2003;
    pub const OPERATION_INVALID_ROOT: u16 = 2004;
    pub const OPERATION_OVERFLOW: u16 = 2005;

    // Configuration errors (3000-3999)
    pub const CONFIG_GENERIC: u16 = 3000;
    pub const CONFIG_INVALID_VALUE: u16 = 3001;
    pub const CONFIG_PARSE_ERROR: u16 = 3002;
    pub const CONFIG_NOT_FOUND: u16 = 3003;
    pub const CONFIG_PATH_ERROR: u16 = 3004;

    // Persistence errors (4000-4999)
    pub const PERSISTENCE_GENERIC: u16 = 4000;
    pub const PERSISTENCE_IO_ERROR: u16 = 4001;
    pub const PERSISTENCE_CORRUPTED: u16 = 4002;
    pub const PERSISTENCE_SERIALIZATION_ERROR: u16 = 4003;
}

/// Get a human-readable description of an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Validation errors
        1000 => "Generic validation error",
        1001 => "Input is not a valid number",
        1002 => "Input exceeds the maximum allowed value",
        1003 => "Input is empty",

        // Operation errors
        2000 => "Generic operation error",
        2001 => "Unknown operation",
        2002 => "Division by zero",
        2003 => "Negative exponents are not supported",
        2004 => "Invalid root operation",
        2005 => "Result does not fit the decimal range",

        // Configuration errors
        3000 => "Generic configuration error",
        3001 => "Invalid value in configuration",
        3002 => "Failed to parse configuration",
        3003 => "Configuration file not found",
        3004 => "Configuration path error",

        // Persistence errors
        4000 => "Generic persistence error",
        4001 => "History file I/O error",
        4002 => "History data is corrupted",
        4003 => "Failed to serialize history data",

        _ => "Unknown error code",
    }
}
