//! Elementwise math tests - NumPy compatible
