//! Reduction tests - NumPy compatible
