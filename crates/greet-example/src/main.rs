use std::cell::RefCell;
use std::io;
use std::process::ExitCode;

use greet_example::App;

fn main() -> ExitCode {
    let mut app = App::default();
    let out = RefCell::new(io::stdout());
    let result = greet_example::dispatcher(&mut app, &out).build().run_env();
    commando::exit_status(&result)
}
