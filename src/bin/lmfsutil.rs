use colored::Colorize;
use lmfs::adapter::{self, EntryKind};
use lmfs::cli::build_cli;
use lmfs::time::posix_secs_to_datetime;
use lmfs::volume::MountConfig;
use lmfs::Result;
use std::process::ExitCode;

fn band_name_from_str(s: &str) -> [u8; 4] {
    let mut band = [0x20u8; 4];
    for (i, b) in s.as_bytes().iter().take(4).enumerate() {
        band[i] = *b;
    }
    band
}

fn run() -> Result<()> {
    let matches = build_cli().get_matches();

    let (sub_name, sub_matches) = match matches.subcommand() {
        Some((name, m)) => (name, m),
        None => return Ok(()),
    };

    let disk = sub_matches.get_one::<String>("disk").unwrap();
    let band = band_name_from_str(sub_matches.get_one::<String>("band").unwrap());
    let config = MountConfig::new(disk, band);
    let volume = config.open()?;

    match sub_name {
        "geometry" => {
            let geom = volume.geometry();
            let header = volume.band_header();
            println!("{}: {}", "label block".bold(), geom.label_block);
            println!("{}: {}", "band block".bold(), geom.band_block);
            println!("{}: {}", "band size (blocks)".bold(), geom.band_size_blocks);
            println!("{}: {}", "comment".bold(), geom.comment);
            println!("{}: {}", "LMFS version".bold(), header.version);
            println!("{}: {}", "root map entries".bold(), header.root_map.len());
        }
        "ls" => {
            let path = sub_matches.get_one::<String>("path").unwrap();
            for name in adapter::readdir(&volume, path)? {
                println!("{name}");
            }
        }
        "stat" => {
            let path = sub_matches.get_one::<String>("path").unwrap();
            let attr = adapter::getattr(&volume, path)?;
            let kind = match attr.kind {
                EntryKind::Directory => "directory",
                EntryKind::File => "file",
            };
            println!("{}: {}", "name".bold(), attr.name);
            println!("{}: {kind}", "kind".bold());
            println!("{}: {}", "version".bold(), attr.version);
            println!("{}: {}", "size".bold(), attr.size);
            println!("{}: {}", "mtime".bold(), posix_secs_to_datetime(attr.mtime_posix));
        }
        "cat" => {
            let path = sub_matches.get_one::<String>("path").unwrap();
            let hex_mode = sub_matches.get_flag("hex");
            let handle = adapter::open(&volume, path)?;
            let bytes = adapter::read(&volume, &handle, 0, usize::MAX)?;
            if hex_mode {
                println!("{}", hex::encode(&bytes));
            } else {
                use std::io::Write;
                std::io::stdout().write_all(&bytes).ok();
            }
        }
        other => unreachable!("unknown subcommand {other}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::from(e.errno().clamp(1, 255) as u8)
        }
    }
}
