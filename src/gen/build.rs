//! Global constants, such as compiler version used, features, platform information and others.

// @generated

pub const COMPILATION_DATE: &str = "Aug 01 2026";
pub const COMPILATION_TIME: &str = "09:01:45";
pub const NAME: &str = "dotmatrix";
pub const VERSION: &str = "0.4.1";
pub const COMPILER: &str = "rustc";
pub const COMPILER_VERSION: &str = "1.95.0";
pub const FEATURES: [&str; 1] = ["default"];
pub const PLATFORM_CPU_BITS: usize = 64;
