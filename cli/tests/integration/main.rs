//! Integration tests for manage-procs
//!
//! These tests spawn the actual binaries against a temp directory tree, with
//! `true` standing in for systemctl.
