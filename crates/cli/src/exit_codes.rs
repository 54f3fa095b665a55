//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | query            | Lookup outcome and query codes           |
//! | 10-19   | catalog          | Catalog config and source data codes     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Query (3-9)
// =============================================================================

/// Neither manufacturer returned a row.
/// Like `grep(1)` when no line matches.
pub const EXIT_QUERY_EMPTY: u8 = 3;

/// Query rejected before matching (empty code, non-positive target,
/// inverted band override).
pub const EXIT_QUERY_INVALID: u8 = 4;

/// Result could not be written (`--output` path, serialization).
pub const EXIT_QUERY_OUTPUT: u8 = 5;

// =============================================================================
// Catalog (10-19)
// =============================================================================

/// Catalog config missing fields, unknown keys or invalid values.
pub const EXIT_CATALOG_CONFIG: u8 = 10;

/// A config or catalog file could not be read.
pub const EXIT_CATALOG_IO: u8 = 11;

/// Catalog content rejected: malformed CSV, missing column, or a value the
/// strict parse policy refuses.
pub const EXIT_CATALOG_DATA: u8 = 12;
