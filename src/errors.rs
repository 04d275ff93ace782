// ABOUTME: Re-exports the unified error types from nutriscan-core
// ABOUTME: Keeps `crate::errors` paths stable for modules in the root crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use nutriscan_core::errors::*;
