//! Unit test modules.

mod tone_catalog_test;
