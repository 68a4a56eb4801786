//! Unit tests for the session service

mod store_tests;
