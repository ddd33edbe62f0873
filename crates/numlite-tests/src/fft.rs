//! Fourier transform tests - NumPy compatible
