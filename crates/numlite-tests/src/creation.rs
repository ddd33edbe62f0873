//! Array construction and view tests
