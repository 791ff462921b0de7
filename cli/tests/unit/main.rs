//! Unit tests for the procServ instance manager
//!
//! Services run against temp directories and recording mocks; nothing here
//! talks to a real service manager.

mod conserver_service;
mod lifecycle_service;
mod property_tests;
