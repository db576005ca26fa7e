//! Runtime schema descriptors.
//!
//! Record types declare their shape statically through these models; the
//! codec, index set, and session read field lists from here instead of
//! inspecting values at runtime.
pub mod entity;
pub mod field;
