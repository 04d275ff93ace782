// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports command modules for nutriscan-cli
// ABOUTME: Provides access to scan and condition management commands

pub mod conditions;
pub mod scan;
