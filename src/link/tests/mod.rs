//! Unit tests for the link module.
