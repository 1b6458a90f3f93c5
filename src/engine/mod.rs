// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Declared resources, their apply, and teardown of a stack.

pub mod stack;
pub mod teardown;

pub use stack::{Deployed, ResourceOptions, Stack, StackOutputs};
pub use teardown::destroy;
