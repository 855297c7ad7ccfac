//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract — wrapper scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 2    | Any failure: usage error, missing input, pipeline error   |
//!
//! clap reports argument errors with exit code 2 as well, so every failure
//! path surfaces the same code.

/// Command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Any failure. The stderr message carries the detail.
pub const EXIT_FAILURE: u8 = 2;
