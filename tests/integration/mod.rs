//! Integration test suite for taskplan.
//!
//! These tests exercise planning end to end, from task records (or task
//! documents on disk) to the execution graph.
//!
//! # Test Categories
//!
//! - `scenarios`: Small hand-checked plans
//! - `properties`: Ordering, partition, and conflict guarantees on larger inputs
//! - `pipeline`: Task documents on disk through to the written plan


mod properties;
mod scenarios;
