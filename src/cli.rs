//! `lmfsutil` command-line surface. Builder-style `clap::Command`, one subcommand
//! per read-only operation exposed by [`crate::adapter`].

use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    let disk_arg = Arg::new("disk")
        .short('d')
        .long("disk")
        .value_name("IMAGE")
        .default_value("disk.img")
        .help("path to the Lambda disk image");
    let band_arg = Arg::new("band")
        .short('b')
        .long("band")
        .value_name("NAME")
        .default_value("LMFS")
        .help("4-character band partition name");
    let path_arg = Arg::new("path")
        .value_name("PATH")
        .default_value("/")
        .help("LMFS path, e.g. /SUB/FOO.LISP#3");
    let required_path_arg = Arg::new("path")
        .value_name("PATH")
        .required(true)
        .help("LMFS path, e.g. /SUB/FOO.LISP#3");

    Command::new("lmfsutil")
        .about("Inspect LMFS bands inside Lambda disk images")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(
            Command::new("geometry")
                .about("Print label and band geometry")
                .arg(disk_arg.clone())
                .arg(band_arg.clone()),
        )
        .subcommand(
            Command::new("ls")
                .about("List a directory")
                .arg(disk_arg.clone())
                .arg(band_arg.clone())
                .arg(path_arg.clone()),
        )
        .subcommand(
            Command::new("stat")
                .about("Print attributes for a path")
                .arg(disk_arg.clone())
                .arg(band_arg.clone())
                .arg(path_arg.clone()),
        )
        .subcommand(
            Command::new("cat")
                .about("Print file contents")
                .arg(disk_arg.clone())
                .arg(band_arg.clone())
                .arg(required_path_arg)
                .arg(
                    Arg::new("hex")
                        .long("hex")
                        .action(ArgAction::SetTrue)
                        .help("dump as hex instead of raw bytes"),
                ),
        )
}
