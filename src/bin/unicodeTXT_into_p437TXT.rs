#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::Parser,
	std::{fs, path::PathBuf},
	vga_shenanigans::{initLogger, p437, IoResultExt, Result},
};

fn main() -> Result<()> {
	/// Re-encodes box-drawing and block glyphs of a UTF-8 text as code page 437 bytes.
	#[derive(Parser)]
	struct Args {
		textPath: PathBuf,

		#[clap(long, default_value = "p437.txt")]
		output: PathBuf,

		#[clap(short, long)]
		verbose: bool,
	}

	let Args { textPath, output, verbose } = Args::parse();
	initLogger(verbose);
	let text = p437::readText(&textPath)?;
	log::debug!("{textPath:?}: {} code points", text.chars().count());
	let p437 = p437::encode(&text, |c| println!("Unknown character: {c}"));
	fs::write(&output, &p437).atPath(&output)?;
	log::debug!("{output:?}: {} bytes", p437.len());
	Ok(())
}
