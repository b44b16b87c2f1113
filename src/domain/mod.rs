//! Core business types for the trails platform.

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;
