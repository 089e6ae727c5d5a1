//! Spectral experiment groups.
//!
//! Load two-column experiment files, compose a group of them into one wide
//! table keyed on wavelength, and derive per-wavelength statistics. The
//! viewer binary is built on top of [`data`].

pub mod data;
