//! Hidden GLFW windows and the lucent contexts living in them.

use glfw::{Context as _, OpenGlProfileHint, WindowHint, WindowMode};
use lucent_gl::{Context, ContextBinding, ContextOptions};
use std::{cell::RefCell, fmt, os::raw::c_void, rc::Rc};

/// Why a fixture failed.
#[derive(Debug)]
pub struct Failure(pub String);

impl fmt::Display for Failure {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<lucent::Error> for Failure {
  fn from(e: lucent::Error) -> Self {
    Failure(e.to_string())
  }
}

impl From<String> for Failure {
  fn from(s: String) -> Self {
    Failure(s)
  }
}

impl From<&str> for Failure {
  fn from(s: &str) -> Self {
    Failure(s.to_owned())
  }
}

pub type Outcome = Result<(), Failure>;

/// Fail with `msg` unless `cond` holds.
pub fn ensure(cond: bool, msg: impl Into<String>) -> Outcome {
  if cond {
    Ok(())
  } else {
    Err(Failure(msg.into()))
  }
}

/// Fail unless `got` equals `expected`.
pub fn ensure_eq<T: PartialEq + fmt::Debug>(got: T, expected: T, what: &str) -> Outcome {
  ensure(
    got == expected,
    format!("{}: got {:?}, expected {:?}", what, got, expected),
  )
}

pub fn floats(bytes: &[u8]) -> Vec<f32> {
  bytemuck::pod_collect_to_vec(bytes)
}

pub fn bytes(floats: &[f32]) -> Vec<u8> {
  bytemuck::cast_slice(floats).to_vec()
}

type SharedWindow = Rc<RefCell<glfw::Window>>;

struct GlfwBinding(SharedWindow);

impl ContextBinding for GlfwBinding {
  fn make_current(&self) {
    self.0.borrow_mut().make_current();
  }

  fn release_current(&self) {
    glfw::make_context_current(None);
  }
}

/// A hidden window with a lucent context.
pub struct Harness {
  pub ctx: Context,
  pub window: SharedWindow,
  glfw: glfw::Glfw,
}

/// Most recent core versions first.
const VERSIONS: [(u32, u32); 5] = [(4, 6), (4, 5), (4, 3), (4, 1), (3, 3)];

impl Harness {
  pub fn new() -> Result<Self, Failure> {
    Self::with_options(ContextOptions::default())
  }

  pub fn with_options(options: ContextOptions) -> Result<Self, Failure> {
    let mut glfw = glfw::init(glfw::FAIL_ON_ERRORS).map_err(|e| Failure(format!("{:?}", e)))?;
    let window = open_window(&mut glfw, None)?;

    Self::attach(glfw, window, options)
  }

  /// A second context sharing the objects of this one.
  pub fn shared(&self, options: ContextOptions) -> Result<(Context, SharedWindow), Failure> {
    let mut glfw = self.glfw.clone();
    let window = {
      let parent = self.window.borrow();
      open_window(&mut glfw, Some(&parent))?
    };

    let window = Rc::new(RefCell::new(window));
    window.borrow_mut().make_current();

    let ctx = Context::new_shared(options, &self.ctx)?;
    ctx.set_binding(GlfwBinding(window.clone()));

    Ok((ctx, window))
  }

  fn attach(glfw: glfw::Glfw, window: glfw::Window, options: ContextOptions) -> Result<Self, Failure> {
    let window = Rc::new(RefCell::new(window));

    {
      let mut w = window.borrow_mut();
      w.make_current();
      lucent_gl::load_with(|s| w.get_proc_address(s) as *const c_void);
    }

    let ctx = Context::new(options)?;
    ctx.set_binding(GlfwBinding(window.clone()));

    log::info!("{}", ctx.info());

    Ok(Harness {
      ctx,
      window,
      glfw,
    })
  }
}

fn open_window(
  glfw: &mut glfw::Glfw,
  share: Option<&glfw::Window>,
) -> Result<glfw::Window, Failure> {
  for (major, minor) in VERSIONS {
    glfw.default_window_hints();
    glfw.window_hint(WindowHint::Visible(false));
    glfw.window_hint(WindowHint::OpenGlProfile(OpenGlProfileHint::Core));
    glfw.window_hint(WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(WindowHint::ContextVersionMajor(major));
    glfw.window_hint(WindowHint::ContextVersionMinor(minor));

    let created = match share {
      Some(parent) => parent.create_shared(64, 64, "lucent", WindowMode::Windowed),
      None => glfw.create_window(64, 64, "lucent", WindowMode::Windowed),
    };

    if let Some((window, _events)) = created {
      return Ok(window);
    }
  }

  Err(Failure("no OpenGL 3.3 core context available".to_owned()))
}
