//! Renders the `devicefarm` manual pages from the clap parser.
//!
//! `devicefarm.1` documents the top-level command and each subcommand gets
//! its own `devicefarm-<name>.1` page, all written under `OUT_DIR/man`.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

fn render(man: &Man, target: &Path) -> std::io::Result<()> {
    let mut page = Vec::new();
    man.render(&mut page)?;
    fs::write(target, page)
}

fn render_subcommands(command: &Command, man_dir: &Path) -> std::io::Result<()> {
    for sub in command.get_subcommands() {
        let title = format!("{}-{}", command.get_name(), sub.get_name());
        let man = Man::new(sub.clone()).title(title.clone());
        render(&man, &man_dir.join(format!("{title}.1")))?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "cargo:rerun-if-changed=build.rs")?;
    writeln!(stdout, "cargo:rerun-if-changed=src/cli/mod.rs")?;

    let out_dir = env::var_os("OUT_DIR").ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR was not set")
    })?;
    let man_dir = PathBuf::from(out_dir).join("man");
    fs::create_dir_all(&man_dir)?;

    let command = Cli::command();
    render(&Man::new(command.clone()), &man_dir.join("devicefarm.1"))?;
    render_subcommands(&command, &man_dir)?;

    Ok(())
}
