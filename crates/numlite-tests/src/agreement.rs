//! Cross-backend agreement on random inputs
//!
//! Every accelerated result must match the reference backend within the
//! default tolerance (`rtol = 1e-5`, `atol = 1e-8`).
