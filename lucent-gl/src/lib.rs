//! OpenGL 3.3 / 4.x core backend of [lucent](https://crates.io/crates/lucent).
//!
//! Everything starts with a [`Context`], wrapping the OpenGL context current on the calling
//! thread. Contexts create every GPU object: [`Buffer`]s, textures, [`Sampler`]s,
//! [`Renderbuffer`]s, [`Framebuffer`]s, [`Program`]s, [`VertexArray`]s, [`ComputeShader`]s,
//! [`Query`]s and [`Scope`]s.
//!
//! The driver entry points must be loaded once per process with [`load_with`] before creating
//! the first context, typically from the windowing library:
//!
//! ```ignore
//! lucent_gl::load_with(|s| window.get_proc_address(s) as *const _);
//! let ctx = lucent_gl::Context::new(lucent_gl::ContextOptions::default())?;
//! ```

mod buffer;
mod compute;
mod context;
mod debug;
mod framebuffer;
mod object;
mod program;
mod query;
mod renderbuffer;
mod sampler;
mod scope;
mod shader;
mod state;
mod texture;
mod texture_3d;
mod texture_array;
mod texture_cube;
mod transfer;
mod uniform;
mod vertex_array;

pub use buffer::{Buffer, BufferMap, MapAccess};
pub use compute::{ComputeShader, DISPATCH_COMMAND_SIZE};
pub use context::{Context, ContextBinding, ContextOptions, CurrentGuard, Info, Limits};
pub use framebuffer::{
  Attachment, CopyDestination, Framebuffer, FramebufferReadOptions, ReadAttachment,
};
pub use program::{
  Attribute, CaptureMode, GeometryInfo, Member, Program, ProgramBuilder, StorageBlock,
  Subroutine, Uniform, UniformBlock, Varying,
};
pub use query::{ConditionalRender, ConditionalRenderGuard, Query, QueryGuard};
pub use renderbuffer::Renderbuffer;
pub use sampler::Sampler;
pub use scope::{Scope, ScopeBuilder, ScopeGuard};
pub use texture::{AnyTexture, Texture2D, TextureOptions};
pub use texture_3d::Texture3D;
pub use texture_array::TextureArray;
pub use texture_cube::TextureCube;
pub use transfer::{Destination, Source};
pub use vertex_array::{
  AttributeBinding, RenderOptions, TransformOptions, VertexArray, VertexArrayBuilder,
  VertexBinding, INDIRECT_COMMAND_SIZE,
};

pub use lucent;

/// Load the OpenGL entry points through `loader`, which maps a symbol name to its address.
pub fn load_with<F>(loader: F)
where
  F: FnMut(&'static str) -> *const std::os::raw::c_void,
{
  gl::load_with(loader)
}
