// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod assembler;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod kubernetes;
pub mod output;

#[cfg(test)]
mod test_utils;
