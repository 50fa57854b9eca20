// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod allocation;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod db;
pub mod engine;
pub mod events;
pub mod models;
pub mod money;
pub mod refunds;
pub mod store;
pub mod utils;
