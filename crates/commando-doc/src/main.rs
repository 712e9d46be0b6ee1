use std::process::ExitCode;

use commando::{Dispatcher, Globals};
use commando_doc::{help_md, init_logging, GlobalOptions, HelpOptions};

fn main() -> ExitCode {
    let mut global = GlobalOptions::default();
    let mut options = HelpOptions::default();

    let globals = Globals::new()
        .options(&mut global)
        .before_with(|global: &GlobalOptions| init_logging(global.verbose));

    let result = Dispatcher::builder()
        .globals(globals)
        .command(help_md::command(&mut options))
        .build()
        .run_env();
    commando::exit_status(&result)
}
