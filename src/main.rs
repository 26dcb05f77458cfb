use std::io::Write;
use std::path::PathBuf;
use std::process::exit;

use adtrun::{logging, Tool, ToolRunner};
use clap::Parser;

#[derive(Parser)]
#[command(name = "adtrun")]
#[command(about = "Run a bundled adb/fastboot executable against an Android device")]
struct Cli {
    /// Directory holding the bundled tools
    #[arg(short = 'd', long, env = "ADTRUN_TOOL_DIR")]
    tool_dir: PathBuf,

    /// Tool to run: adb or fastboot
    #[arg(short, long, default_value = "adb")]
    tool: Tool,

    /// Device serial passed as `-s <serial>`
    #[arg(short, long)]
    serial: Option<String>,

    /// Capture the tool's stdout and print it once the tool exits
    #[arg(short, long)]
    capture: bool,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    json_logs: bool,

    /// Arguments forwarded to the tool
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let runner = ToolRunner::new(&cli.tool_dir);
    let tool = cli.tool.file_name();
    let serial = cli.serial.as_deref();

    if cli.capture {
        let captured = runner.try_capture(&tool, serial, cli.args.as_slice())?;
        eprint!("{}", captured.stderr);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(captured.stdout.as_bytes())?;
        stdout.flush()?;
        Ok(captured.status.code().unwrap_or(1))
    } else {
        let status = runner.try_run(&tool, serial, cli.args.as_slice())?;
        Ok(status.code().unwrap_or(1))
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.json_logs) {
        eprintln!("Error: {}", e);
        exit(1);
    }

    match run(&cli) {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}
