// Test modules for distributed-errors crate
//
// Test organization follows the template pattern where each source file
// has a corresponding test file that focuses on behavior verification.

// Test helper utilities (recording and gated reporters, polling)
pub mod helpers;
