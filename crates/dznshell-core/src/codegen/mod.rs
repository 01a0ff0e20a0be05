// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Text generation infrastructure.
//!
//! **DDD Context:** Code Generation
//!
//! - [`document`]: layout tree and renderer
//! - [`text`]: line blocks and bullet prefixing
//! - [`cpp`]: the structural C++ code model

pub mod cpp;
pub mod document;
pub mod text;
