//! Framebuffers.
//!
//! A framebuffer bundles color attachments and an optional depth attachment, all of the same size
//! and sample count. It also carries the viewport, scissor and write masks applied whenever it
//! becomes the render target.
//!
//! The default framebuffer of the window system is available as [`Context::screen`].

use crate::{
  context::{Context, ContextState},
  object::{impl_object, RawObject},
  renderbuffer::Renderbuffer,
  state::GLState,
  texture::Texture2D,
  transfer::{begin_pack, end_pack, Destination},
};
use gl::types::*;
use lucent::{
  texture::{check_alignment, Dtype, PixelFormat},
  viewport::{ColorMask, Viewport},
  Error, Glo, ObjectKind, Result,
};
use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

/// An image attached to a framebuffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Attachment {
  Texture(Texture2D),
  Renderbuffer(Renderbuffer),
}

impl Attachment {
  fn live(&self) -> Result<(Rc<ContextState>, GLuint)> {
    match self {
      Attachment::Texture(texture) => texture.0.raw.live(),
      Attachment::Renderbuffer(renderbuffer) => renderbuffer.0.raw.live(),
    }
  }

  pub fn glo(&self) -> Glo {
    match self {
      Attachment::Texture(texture) => texture.glo(),
      Attachment::Renderbuffer(renderbuffer) => renderbuffer.glo(),
    }
  }

  pub fn size(&self) -> (u32, u32) {
    match self {
      Attachment::Texture(texture) => texture.size(),
      Attachment::Renderbuffer(renderbuffer) => renderbuffer.size(),
    }
  }

  pub fn samples(&self) -> u32 {
    match self {
      Attachment::Texture(texture) => texture.samples(),
      Attachment::Renderbuffer(renderbuffer) => renderbuffer.samples(),
    }
  }

  pub fn format(&self) -> PixelFormat {
    match self {
      Attachment::Texture(texture) => texture.format(),
      Attachment::Renderbuffer(renderbuffer) => renderbuffer.format(),
    }
  }

  /// Attach to `point` of the bound draw framebuffer.
  unsafe fn attach(&self, point: GLenum, name: GLuint) {
    match self {
      Attachment::Texture(texture) => {
        gl::FramebufferTexture2D(gl::DRAW_FRAMEBUFFER, point, texture.0.target, name, 0)
      }

      Attachment::Renderbuffer(_) => {
        gl::FramebufferRenderbuffer(gl::DRAW_FRAMEBUFFER, point, gl::RENDERBUFFER, name)
      }
    }
  }
}

impl From<Texture2D> for Attachment {
  fn from(texture: Texture2D) -> Self {
    Attachment::Texture(texture)
  }
}

impl From<&Texture2D> for Attachment {
  fn from(texture: &Texture2D) -> Self {
    Attachment::Texture(texture.clone())
  }
}

impl From<Renderbuffer> for Attachment {
  fn from(renderbuffer: Renderbuffer) -> Self {
    Attachment::Renderbuffer(renderbuffer)
  }
}

impl From<&Renderbuffer> for Attachment {
  fn from(renderbuffer: &Renderbuffer) -> Self {
    Attachment::Renderbuffer(renderbuffer.clone())
  }
}

/// Which image a framebuffer read targets.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReadAttachment {
  Color(u32),
  Depth,
}

impl Default for ReadAttachment {
  fn default() -> Self {
    ReadAttachment::Color(0)
  }
}

/// Parameters of [`Framebuffer::read`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramebufferReadOptions {
  /// Region to read; the whole framebuffer if `None`.
  pub viewport: Option<Viewport>,
  /// Components per pixel; ignored when reading depth.
  pub components: usize,
  pub attachment: ReadAttachment,
  pub alignment: usize,
  /// Component type of the returned pixels; ignored when reading depth.
  pub dtype: Dtype,
  /// Clamp float colors to `[0, 1]`.
  pub clamp: bool,
}

impl Default for FramebufferReadOptions {
  fn default() -> Self {
    FramebufferReadOptions {
      viewport: None,
      components: 3,
      attachment: ReadAttachment::default(),
      alignment: 1,
      dtype: Dtype::F1,
      clamp: false,
    }
  }
}

pub(crate) struct FramebufferInner {
  pub(crate) raw: RawObject,
  color_attachments: Vec<Attachment>,
  depth_attachment: Option<Attachment>,
  // component types of the color images, in draw buffer order
  color_dtypes: Vec<Dtype>,
  has_depth: bool,
  draw_buffers: Vec<GLenum>,
  size: (u32, u32),
  samples: u32,
  viewport: Cell<Viewport>,
  scissor: Cell<Option<Viewport>>,
  color_masks: RefCell<Vec<ColorMask>>,
  depth_mask: Cell<bool>,
}

#[derive(Clone)]
pub struct Framebuffer(pub(crate) Rc<FramebufferInner>);

impl_object!(Framebuffer);

/// State of a new framebuffer: full viewport, no scissor, every write mask on.
fn inner(
  raw: RawObject,
  size: (u32, u32),
  samples: u32,
  color_dtypes: Vec<Dtype>,
  has_depth: bool,
) -> FramebufferInner {
  let (w, h) = size;

  FramebufferInner {
    raw,
    color_attachments: Vec::new(),
    depth_attachment: None,
    color_masks: RefCell::new(vec![ColorMask::ALL; color_dtypes.len()]),
    color_dtypes,
    has_depth,
    draw_buffers: Vec::new(),
    size,
    samples,
    viewport: Cell::new(Viewport::full(w, h)),
    scissor: Cell::new(None),
    depth_mask: Cell::new(true),
  }
}

/// The framebuffer draw calls currently go to.
pub(crate) fn current_target(state: &Rc<ContextState>) -> Framebuffer {
  match &*state.fbo.borrow() {
    Some(fbo) if fbo.glo().is_live() => fbo.clone(),
    _ => screen(state),
  }
}

/// Bind the current target back, with its viewport, scissor and masks.
pub(crate) unsafe fn restore_target(state: &Rc<ContextState>, gl: &mut GLState) {
  let target = current_target(state);

  if let Glo::Live(name) = target.glo() {
    target.apply(gl, name);
  }
}

fn screen(state: &Rc<ContextState>) -> Framebuffer {
  state
    .screen
    .get_or_init(|| {
      let [x, y, w, h] = state.initial_viewport.map(|v| v.max(0) as u32);
      let raw = RawObject::external(state, ObjectKind::Framebuffer, 0);
      let inner = inner(raw, (x + w, y + h), 0, vec![Dtype::F1], true);
      inner.viewport.set(Viewport {
        x,
        y,
        width: w,
        height: h,
      });

      Framebuffer(Rc::new(inner))
    })
    .clone()
}

fn incomplete_reason(status: GLenum) -> &'static str {
  match status {
    gl::FRAMEBUFFER_UNDEFINED => "undefined",
    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
    gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "incomplete draw buffer",
    gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "incomplete read buffer",
    gl::FRAMEBUFFER_UNSUPPORTED => "unsupported attachment combination",
    gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "incomplete multisample",
    gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => "incomplete layer targets",
    _ => "unknown status",
  }
}

/// Check that attachments can live in the same framebuffer, and return their common size and
/// sample count.
fn check_attachments(
  color: &[Attachment],
  depth: Option<&Attachment>,
  max_color_attachments: u32,
) -> Result<((u32, u32), u32)> {
  if color.len() > max_color_attachments as usize {
    return Err(Error::creation(format!(
      "{} color attachments exceed the {} supported",
      color.len(),
      max_color_attachments
    )));
  }

  if let Some(index) = color.iter().position(|a| a.format().depth) {
    return Err(Error::creation(format!(
      "color attachment {} is a depth image",
      index
    )));
  }

  if let Some(depth) = depth {
    if !depth.format().depth {
      return Err(Error::creation("the depth attachment is not a depth image"));
    }
  }

  let mut all = color.iter().chain(depth);
  let first = all
    .next()
    .ok_or_else(|| Error::creation("a framebuffer needs at least one attachment"))?;
  let (size, samples) = (first.size(), first.samples());

  for attachment in all {
    if attachment.size() != size {
      return Err(Error::creation(format!(
        "attachment sizes differ: {:?} and {:?}",
        size,
        attachment.size()
      )));
    }

    if attachment.samples() != samples {
      return Err(Error::creation(format!(
        "attachment sample counts differ: {} and {}",
        samples,
        attachment.samples()
      )));
    }
  }

  Ok((size, samples))
}

impl Context {
  /// A framebuffer with color attachments, in draw buffer order, and an optional depth
  /// attachment.
  pub fn framebuffer<I>(&self, color: I, depth: Option<Attachment>) -> Result<Framebuffer>
  where
    I: IntoIterator,
    I::Item: Into<Attachment>,
  {
    let state = self.current_state()?;
    let color: Vec<Attachment> = color.into_iter().map(Into::into).collect();
    let limits = state.limits();
    let max_attachments = limits.max_color_attachments.min(limits.max_draw_buffers);
    let (size, samples) = check_attachments(&color, depth.as_ref(), max_attachments)?;

    let mut names = Vec::with_capacity(color.len());
    for attachment in &color {
      names.push(attachment.live()?.1);
    }

    let depth_name = match &depth {
      Some(attachment) => Some(attachment.live()?.1),
      None => None,
    };

    let draw_buffers: Vec<GLenum> = (0..color.len() as GLenum)
      .map(|i| gl::COLOR_ATTACHMENT0 + i)
      .collect();

    let mut gl = state.gl();

    let (name, status) = unsafe {
      let mut name: GLuint = 0;
      gl::GenFramebuffers(1, &mut name);
      gl.bind_draw_framebuffer(name);
      gl.bind_read_framebuffer(name);

      for ((attachment, &image), &point) in color.iter().zip(&names).zip(&draw_buffers) {
        attachment.attach(point, image);
      }

      if let (Some(attachment), Some(image)) = (&depth, depth_name) {
        attachment.attach(gl::DEPTH_ATTACHMENT, image);
      }

      if draw_buffers.is_empty() {
        gl::DrawBuffer(gl::NONE);
        gl::ReadBuffer(gl::NONE);
      } else {
        gl::DrawBuffers(draw_buffers.len() as GLsizei, draw_buffers.as_ptr());
        gl::ReadBuffer(gl::COLOR_ATTACHMENT0);
      }

      let status = gl::CheckFramebufferStatus(gl::DRAW_FRAMEBUFFER);
      restore_target(state, &mut gl);

      (name, status)
    };

    drop(gl);

    let raw = RawObject::new(state, ObjectKind::Framebuffer, name);

    if status != gl::FRAMEBUFFER_COMPLETE {
      raw.release();
      return Err(Error::creation(format!(
        "framebuffer is not complete: {}",
        incomplete_reason(status)
      )));
    }

    let mut inner = inner(
      raw,
      size,
      samples,
      color.iter().map(|a| a.format().dtype).collect(),
      depth.is_some(),
    );
    inner.color_attachments = color;
    inner.depth_attachment = depth;
    inner.draw_buffers = draw_buffers;

    Ok(Framebuffer(Rc::new(inner)))
  }

  /// The default framebuffer of the window system, sized from the initial viewport.
  pub fn screen(&self) -> Framebuffer {
    screen(self.state())
  }

  /// The framebuffer draw calls currently go to.
  pub fn fbo(&self) -> Framebuffer {
    current_target(self.state())
  }

  /// Wrap a framebuffer created outside of lucent; the bound draw framebuffer if `glo` is `None`.
  ///
  /// The framebuffer is sized from the current viewport and is never deleted by lucent.
  pub fn detect_framebuffer(&self, glo: Option<u32>) -> Result<Framebuffer> {
    let state = self.current_state()?;

    let name = match glo {
      Some(name) => name,
      None => unsafe {
        let mut name = 0;
        gl::GetIntegerv(gl::DRAW_FRAMEBUFFER_BINDING, &mut name);
        name as GLuint
      },
    };

    if name == 0 {
      return Ok(self.screen());
    }

    if unsafe { gl::IsFramebuffer(name) } == gl::FALSE {
      return Err(Error::creation(format!("{} is not a framebuffer", name)));
    }

    let max_attachments = state.limits().max_color_attachments;
    let mut gl = state.gl();

    let (colors, has_depth, viewport, samples) = unsafe {
      gl.bind_draw_framebuffer(name);

      let attached = |point: GLenum| {
        let mut ty = 0;
        gl::GetFramebufferAttachmentParameteriv(
          gl::DRAW_FRAMEBUFFER,
          point,
          gl::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
          &mut ty,
        );
        ty as GLenum != gl::NONE
      };

      let colors = (0..max_attachments)
        .take_while(|&i| attached(gl::COLOR_ATTACHMENT0 + i))
        .count();
      let has_depth = attached(gl::DEPTH_ATTACHMENT);

      let mut viewport = [0; 4];
      gl::GetIntegerv(gl::VIEWPORT, viewport.as_mut_ptr());
      let mut samples = 0;
      gl::GetIntegerv(gl::SAMPLES, &mut samples);

      restore_target(state, &mut gl);
      (colors, has_depth, viewport, samples)
    };

    drop(gl);

    let size = (viewport[2].max(0) as u32, viewport[3].max(0) as u32);
    let raw = RawObject::external(state, ObjectKind::Framebuffer, name);

    Ok(Framebuffer(Rc::new(inner(
      raw,
      size,
      samples.max(0) as u32,
      vec![Dtype::F1; colors],
      has_depth,
    ))))
  }

  /// Viewport of the current framebuffer.
  pub fn viewport(&self) -> Viewport {
    self.fbo().viewport()
  }

  pub fn set_viewport(&self, viewport: Viewport) -> Result<()> {
    self.fbo().set_viewport(viewport)
  }

  /// Scissor region of the current framebuffer; `None` when the scissor test is off.
  pub fn scissor(&self) -> Option<Viewport> {
    self.fbo().scissor()
  }

  pub fn set_scissor(&self, scissor: Option<Viewport>) -> Result<()> {
    self.fbo().set_scissor(scissor)
  }

  /// Clear the current framebuffer.
  pub fn clear(&self, color: [f32; 4], depth: f32, viewport: Option<Viewport>) -> Result<()> {
    self.fbo().clear(color, depth, viewport)
  }

  /// Copy the color images (and depth, if both have one) of `src` into `dst`, resolving samples
  /// on the way. Only the common area of both is copied.
  pub fn copy_framebuffer<'a>(
    &self,
    dst: impl Into<CopyDestination<'a>>,
    src: &Framebuffer,
  ) -> Result<()> {
    let state = self.current_state()?;
    let (_, src_name) = src.0.raw.live()?;

    match dst.into() {
      CopyDestination::Framebuffer(dst) => {
        let (_, dst_name) = dst.0.raw.live()?;

        if dst.0.samples > 0 && dst.0.samples != src.0.samples {
          return Err(Error::creation(
            "cannot copy into a multisample framebuffer of a different sample count",
          ));
        }

        let colors = src.0.color_dtypes.len().min(dst.0.color_dtypes.len());
        let depth = src.0.has_depth && dst.0.has_depth;

        if colors == 0 && !depth {
          return Err(Error::creation("the framebuffers have no image in common"));
        }

        let (w, h) = common_size(src.0.size, dst.0.size);
        let mut gl = state.gl();

        unsafe {
          gl.bind_read_framebuffer(src_name);
          gl.bind_draw_framebuffer(dst_name);
          gl.set_scissor(None);

          if colors == 0 {
            blit(w, h, gl::DEPTH_BUFFER_BIT);
          }

          for i in 0..colors as GLenum {
            if src_name != 0 {
              gl::ReadBuffer(gl::COLOR_ATTACHMENT0 + i);
            }

            if dst_name != 0 {
              gl::DrawBuffer(gl::COLOR_ATTACHMENT0 + i);
            }

            let depth_bit = if depth && i == 0 {
              gl::DEPTH_BUFFER_BIT
            } else {
              0
            };

            blit(w, h, gl::COLOR_BUFFER_BIT | depth_bit);
          }

          if src_name != 0 && colors > 0 {
            gl::ReadBuffer(gl::COLOR_ATTACHMENT0);
          }

          if dst_name != 0 && !dst.0.draw_buffers.is_empty() {
            gl::DrawBuffers(
              dst.0.draw_buffers.len() as GLsizei,
              dst.0.draw_buffers.as_ptr(),
            );
          }

          restore_target(state, &mut gl);
        }
      }

      CopyDestination::Texture(texture) => {
        let (_, texture_name) = texture.0.raw.live()?;

        if texture.0.samples > 0 {
          return Err(Error::creation("cannot copy into a multisample texture"));
        }

        let is_depth = texture.0.format.depth;

        if (is_depth && !src.0.has_depth) || (!is_depth && src.0.color_dtypes.is_empty()) {
          return Err(Error::creation(
            "the framebuffer has no image matching the texture format",
          ));
        }

        let (tw, th, _) = texture.0.size;
        let (w, h) = common_size(src.0.size, (tw, th));
        let (point, mask) = if is_depth {
          (gl::DEPTH_ATTACHMENT, gl::DEPTH_BUFFER_BIT)
        } else {
          (gl::COLOR_ATTACHMENT0, gl::COLOR_BUFFER_BIT)
        };

        let mut gl = state.gl();

        unsafe {
          let mut scratch: GLuint = 0;
          gl::GenFramebuffers(1, &mut scratch);
          gl.bind_draw_framebuffer(scratch);
          gl::FramebufferTexture2D(gl::DRAW_FRAMEBUFFER, point, gl::TEXTURE_2D, texture_name, 0);

          gl.bind_read_framebuffer(src_name);
          gl.set_scissor(None);
          blit(w, h, mask);

          gl.delete_object(ObjectKind::Framebuffer, scratch);
          restore_target(state, &mut gl);
        }
      }
    }

    Ok(())
  }
}

fn common_size((aw, ah): (u32, u32), (bw, bh): (u32, u32)) -> (GLint, GLint) {
  (aw.min(bw) as GLint, ah.min(bh) as GLint)
}

unsafe fn blit(w: GLint, h: GLint, mask: GLbitfield) {
  gl::BlitFramebuffer(0, 0, w, h, 0, 0, w, h, mask, gl::NEAREST);
}

/// Where [`Context::copy_framebuffer`] writes.
#[derive(Clone, Copy, Debug)]
pub enum CopyDestination<'a> {
  Framebuffer(&'a Framebuffer),
  Texture(&'a Texture2D),
}

impl<'a> From<&'a Framebuffer> for CopyDestination<'a> {
  fn from(framebuffer: &'a Framebuffer) -> Self {
    CopyDestination::Framebuffer(framebuffer)
  }
}

impl<'a> From<&'a Texture2D> for CopyDestination<'a> {
  fn from(texture: &'a Texture2D) -> Self {
    CopyDestination::Texture(texture)
  }
}

impl Framebuffer {
  /// Bind the framebuffer, its viewport, scissor and masks.
  pub(crate) unsafe fn apply(&self, gl: &mut GLState, name: GLuint) {
    gl.bind_draw_framebuffer(name);
    gl.bind_read_framebuffer(name);
    gl.set_viewport(self.0.viewport.get().as_gl());
    gl.set_scissor(self.0.scissor.get().map(|s| s.as_gl()));
    gl.set_color_masks(&self.0.color_masks.borrow());
    gl.set_depth_mask(self.0.depth_mask.get());
  }

  /// Make the framebuffer the target of draw calls and of [`Context`] state changes.
  pub fn bind(&self) -> Result<()> {
    let (state, name) = self.0.raw.live()?;
    unsafe { self.apply(&mut state.gl(), name) };

    let previous = state.fbo.replace(Some(self.clone()));
    drop(previous);

    Ok(())
  }

  fn is_target(&self, state: &Rc<ContextState>) -> bool {
    current_target(state) == *self
  }

  pub fn size(&self) -> (u32, u32) {
    self.0.size
  }

  pub fn width(&self) -> u32 {
    self.0.size.0
  }

  pub fn height(&self) -> u32 {
    self.0.size.1
  }

  pub fn samples(&self) -> u32 {
    self.0.samples
  }

  pub fn color_attachments(&self) -> &[Attachment] {
    &self.0.color_attachments
  }

  pub fn depth_attachment(&self) -> Option<&Attachment> {
    self.0.depth_attachment.as_ref()
  }

  pub fn viewport(&self) -> Viewport {
    self.0.viewport.get()
  }

  pub fn set_viewport(&self, viewport: Viewport) -> Result<()> {
    let (state, _) = self.0.raw.live()?;
    let viewport = Viewport::new(viewport.x, viewport.y, viewport.width, viewport.height)?;
    self.0.viewport.set(viewport);

    if self.is_target(&state) {
      unsafe { state.gl().set_viewport(viewport.as_gl()) };
    }

    Ok(())
  }

  /// The scissor region, `None` when the scissor test is off.
  pub fn scissor(&self) -> Option<Viewport> {
    self.0.scissor.get()
  }

  /// Set the scissor region; `None` turns the scissor test off.
  pub fn set_scissor(&self, scissor: Option<Viewport>) -> Result<()> {
    let (state, _) = self.0.raw.live()?;

    if let Some(s) = scissor {
      Viewport::new(s.x, s.y, s.width, s.height)?;
    }

    self.0.scissor.set(scissor);

    if self.is_target(&state) {
      unsafe { state.gl().set_scissor(scissor.map(|s| s.as_gl())) };
    }

    Ok(())
  }

  /// Write mask of the first color attachment.
  pub fn color_mask(&self) -> ColorMask {
    self
      .0
      .color_masks
      .borrow()
      .first()
      .copied()
      .unwrap_or(ColorMask::NONE)
  }

  pub fn color_masks(&self) -> Vec<ColorMask> {
    self.0.color_masks.borrow().clone()
  }

  /// Set the write mask of every color attachment.
  pub fn set_color_mask(&self, mask: impl Into<ColorMask>) -> Result<()> {
    let mask = mask.into();
    let masks = vec![mask; self.0.color_dtypes.len()];
    self.set_color_masks(&masks)
  }

  /// Set one write mask per color attachment.
  pub fn set_color_masks(&self, masks: &[ColorMask]) -> Result<()> {
    let (state, _) = self.0.raw.live()?;

    if masks.len() != self.0.color_dtypes.len() {
      return Err(Error::out_of_range(format!(
        "{} color masks given for {} color attachments",
        masks.len(),
        self.0.color_dtypes.len()
      )));
    }

    *self.0.color_masks.borrow_mut() = masks.to_vec();

    if self.is_target(&state) {
      unsafe { state.gl().set_color_masks(masks) };
    }

    Ok(())
  }

  pub fn depth_mask(&self) -> bool {
    self.0.depth_mask.get()
  }

  pub fn set_depth_mask(&self, mask: bool) -> Result<()> {
    let (state, _) = self.0.raw.live()?;
    self.0.depth_mask.set(mask);

    if self.is_target(&state) {
      unsafe { state.gl().set_depth_mask(mask) };
    }

    Ok(())
  }

  /// Clear every color attachment to `color` and the depth attachment to `depth`, through the
  /// write masks.
  ///
  /// With a `viewport`, only that region is cleared, whatever the scissor region.
  pub fn clear(&self, color: [f32; 4], depth: f32, viewport: Option<Viewport>) -> Result<()> {
    let (state, name) = self.0.raw.live()?;

    if let Some(v) = viewport {
      Viewport::new(v.x, v.y, v.width, v.height)?;
    }

    let mut gl = state.gl();

    unsafe {
      self.apply(&mut gl, name);

      if let Some(v) = viewport {
        gl.set_scissor(Some(v.as_gl()));
      }

      for (i, dtype) in self.0.color_dtypes.iter().enumerate() {
        let i = i as GLint;

        match dtype {
          Dtype::I1 | Dtype::I2 | Dtype::I4 => {
            let values = color.map(|c| c as GLint);
            gl::ClearBufferiv(gl::COLOR, i, values.as_ptr());
          }

          Dtype::U1 | Dtype::U2 | Dtype::U4 => {
            let values = color.map(|c| c as GLuint);
            gl::ClearBufferuiv(gl::COLOR, i, values.as_ptr());
          }

          _ => gl::ClearBufferfv(gl::COLOR, i, color.as_ptr()),
        }
      }

      if self.0.has_depth {
        gl::ClearBufferfv(gl::DEPTH, 0, &depth);
      }

      restore_target(&state, &mut gl);
    }

    Ok(())
  }

  /// Read pixels of an attachment. Rows go bottom to top, padded to the alignment.
  pub fn read(&self, options: FramebufferReadOptions) -> Result<Vec<u8>> {
    let (format, viewport) = self.read_layout(&options)?;
    let len = format.surface_size(
      viewport.width as usize,
      viewport.height as usize,
      1,
      options.alignment,
    )?;

    let mut out = vec![0; len];
    self.read_into(&mut out, options, 0)?;

    Ok(out)
  }

  /// Read pixels of an attachment into host bytes or a buffer, at `write_offset`.
  pub fn read_into<'a>(
    &self,
    dst: impl Into<Destination<'a>>,
    options: FramebufferReadOptions,
    write_offset: usize,
  ) -> Result<()> {
    let (state, name) = self.0.raw.live()?;
    let (format, viewport) = self.read_layout(&options)?;
    let expected = format.surface_size(
      viewport.width as usize,
      viewport.height as usize,
      1,
      options.alignment,
    )?;

    let read_buffer = match options.attachment {
      ReadAttachment::Color(i) if name != 0 => Some(gl::COLOR_ATTACHMENT0 + i),
      _ => None,
    };

    let mut dst = dst.into();
    let mut gl = state.gl();

    unsafe {
      gl.bind_read_framebuffer(name);
      gl.set_pack_alignment(options.alignment as GLint);
      let pixels = begin_pack(&mut gl, &mut dst, expected, write_offset)?;

      if let Some(buffer) = read_buffer {
        gl::ReadBuffer(buffer);
      }

      if options.clamp {
        gl::ClampColor(gl::CLAMP_READ_COLOR, gl::TRUE as GLenum);
      }

      gl::ReadPixels(
        viewport.x as GLint,
        viewport.y as GLint,
        viewport.width as GLsizei,
        viewport.height as GLsizei,
        format.base_format,
        format.gl_type,
        pixels,
      );

      if options.clamp {
        gl::ClampColor(gl::CLAMP_READ_COLOR, gl::FIXED_ONLY);
      }

      if read_buffer.is_some() {
        gl::ReadBuffer(gl::COLOR_ATTACHMENT0);
      }

      end_pack(&mut gl);
    }

    Ok(())
  }

  /// Pixel format and region of a read.
  fn read_layout(&self, options: &FramebufferReadOptions) -> Result<(PixelFormat, Viewport)> {
    check_alignment(options.alignment)?;

    if self.0.samples > 0 {
      return Err(Error::creation(
        "multisample framebuffers can’t be read; copy them into a single-sample one first",
      ));
    }

    let (w, h) = self.0.size;
    let viewport = options.viewport.unwrap_or(Viewport::full(w, h));
    Viewport::new(viewport.x, viewport.y, viewport.width, viewport.height)?;
    viewport.check_within(w, h)?;

    let format = match options.attachment {
      ReadAttachment::Depth if self.0.has_depth => PixelFormat::depth(),

      ReadAttachment::Depth => {
        return Err(Error::out_of_range("the framebuffer has no depth attachment"));
      }

      ReadAttachment::Color(i) if (i as usize) < self.0.color_dtypes.len() => {
        PixelFormat::color(options.components, options.dtype)?
      }

      ReadAttachment::Color(i) => {
        return Err(Error::out_of_range(format!(
          "color attachment {} does not exist, the framebuffer has {}",
          i,
          self.0.color_dtypes.len()
        )));
      }
    };

    Ok((format, viewport))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_read_options() {
    let options = FramebufferReadOptions::default();

    assert_eq!(options.components, 3);
    assert_eq!(options.attachment, ReadAttachment::Color(0));
    assert_eq!(options.alignment, 1);
    assert_eq!(options.dtype, Dtype::F1);
    assert!(!options.clamp);
  }

  #[test]
  fn common_copy_area() {
    assert_eq!(common_size((4, 8), (6, 2)), (4, 2));
  }

  #[test]
  fn requires_an_attachment() {
    assert!(check_attachments(&[], None, 8).is_err());
  }
}
