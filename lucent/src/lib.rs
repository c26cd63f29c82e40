//! # A resource-managed OpenGL object model
//!
//! lucent wraps an OpenGL 3.3 / 4.x core context into an object model where every GPU resource is
//! created by a context, validated on creation and released deterministically. Every call
//! immediately issues driver commands; nothing is recorded or deferred.
//!
//! This crate holds the driver-agnostic part of lucent:
//!
//! - the [error] taxonomy shared by every operation;
//! - the vertex attribute [format] mini-language (`"3f 2f"`, `"4nu1/i"`…);
//! - [shader] sources, the `#include` pre-pass, the GLSL type table, uniform value coercion and a
//!   minimal SPIR-V reflector;
//! - texture formats and sampling parameters ([texture]);
//! - chunked buffer layouts ([chunk]), viewports and masks ([viewport]);
//! - render states ([blending], [depth_test], [face_culling], [state]), primitive [mode]s and
//!   [query] counters;
//! - release policies and object names ([gc]).
//!
//! The OpenGL backend, with the `Context` and all GPU objects, lives in the `lucent-gl` crate.
//!
//! # Feature flags
//!
//! None so far.

pub mod blending;
pub mod chunk;
pub mod depth_test;
pub mod error;
pub mod face_culling;
pub mod format;
pub mod gc;
pub mod mode;
pub mod query;
pub mod shader;
pub mod state;
pub mod texture;
pub mod viewport;

pub use error::{CompilationError, Error, ErrorKind, GlVersion, Result};
pub use gc::{GcMode, Glo, ObjectKind};
