//! Parivar - Community Member Registry
//!
//! This crate implements a family-relationship graph over a community member
//! registry: households, marriages, parent/child links, and the resolution
//! engine that reconstructs the visible family unit for any member.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
