//! Broadcasting laws checked over random shapes
