use colored::Colorize as _;
use std::process::ExitCode;

mod harness;

macro_rules! tests {
  ($($name:expr, $module:ident),*) => {
    // declare the modules for all tests
    $(
      mod $module;
    )*

    // list of all available integration tests
    const TEST_NAMES: &[&str] = &[$( $name ),*];

    // run a given test; None if there is no such test
    fn run_test(name: &str) -> Option<harness::Outcome> {
      $(
        if name == $name {
          return Some($module::fixture());
        }
      )*

      None
    }
  }
}

tests! {
  "scissor-quadrants", scissor,
  "transform-strip", transform_strip,
  "uniform-blocks", uniform_blocks,
  "spirv-reflection", spirv_reflection,
  "pixel-pack", pixel_pack,
  "blend-emulation", blend_emulation,
  "round-trips", round_trips,
  "clear-idempotence", clear,
  "scope-restoration", scope_restoration,
  "release", release,
  "gc-modes", gc_modes,
  "current-guard", current_guard,
  "debug-output", debug_output,
  "includes", includes
}

fn main() -> ExitCode {
  env_logger::init();

  let requested: Vec<String> = std::env::args().skip(1).collect();
  let names: Vec<&str> = if requested.is_empty() {
    TEST_NAMES.to_vec()
  } else {
    requested.iter().map(String::as_str).collect()
  };

  let mut failed = 0;

  for name in names {
    match run_test(name) {
      Some(Ok(())) => println!("{} {}", "ok".green(), name),

      Some(Err(failure)) => {
        failed += 1;
        println!("{} {}: {}", "FAILED".red(), name, failure);
      }

      None => {
        failed += 1;
        println!("{} is not a valid test. Possible values", name.red());

        for test_name in TEST_NAMES {
          println!("  -> {}", test_name.blue());
        }
      }
    }
  }

  if failed == 0 {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}
