// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Allerscan API — the remote gateway. Issues authenticated requests to the
// backend, normalises transport and HTTP failures into `AllerscanError`, and
// owns the durable client-side session state (bearer token, client id).

pub mod backend;
pub mod client;
pub mod store;
pub mod wire;

pub use backend::Backend;
pub use client::ApiClient;
pub use store::{KeyValueStore, MemoryStore, SessionStore, SqliteStore};

#[cfg(any(test, feature = "mock"))]
pub use backend::MockBackend;
