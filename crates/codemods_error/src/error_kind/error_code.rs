// --- Warnings
pub const EMPTY_FLAG_SET: &str = "EMPTY_FLAG_SET";
pub const EMPTY_OBJECT_LITERAL: &str = "EMPTY_OBJECT_LITERAL";
pub const NORMALIZATION_INCOMPLETE: &str = "NORMALIZATION_INCOMPLETE";

// --- Errors
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const STRUCTURAL_INCONSISTENCY: &str = "STRUCTURAL_INCONSISTENCY";
pub const INVALID_OPTION: &str = "INVALID_OPTION";
pub const IO_ERROR: &str = "IO_ERROR";
pub const PANIC: &str = "PANIC";
