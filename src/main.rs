use anyhow::Result;
use argh::FromArgs;
use shell_runner::{Interpreter, LineReader, Mode, ShellError, Terminal, signals};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(FromArgs)]
/// Line-oriented command interpreter. Reads commands from the terminal, or from
/// BATCH_FILE when one is given.
struct Args {
    #[argh(positional)]
    /// file of commands to run without prompting; each command is echoed before it runs.
    batch_file: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    // Open the batch file before anything else so a bad path is a usage error.
    let batch = match &args.batch_file {
        Some(path) => {
            let file = File::open(path).map_err(|source| ShellError::BatchFile {
                path: path.clone(),
                source,
            })?;
            Some(LineReader::new(BufReader::new(file)))
        }
        None => None,
    };

    signals::ignore_job_control_signals()?;

    match batch {
        Some(mut source) => {
            log::info!("running batch file {:?}", args.batch_file);
            Interpreter::new(Mode::Batch).run(&mut source)
        }
        None => {
            log::info!("starting interactive session");
            let mut terminal = Terminal::new()?;
            Interpreter::new(Mode::Interactive).run(&mut terminal)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Args = argh::from_env();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
