#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::Parser,
	const_format::formatcp,
	std::{fs, path::PathBuf},
	vga_shenanigans::{
		initLogger,
		palette::{Palette, DARK_LEN},
		wallpaper::{self, Wallpaper, PREVIEW_STRETCH},
		IoResultExt, Result, VGA_HEIGHT, VGA_WIDTH,
	},
};

fn main() -> Result<()> {
	#[derive(Parser)]
	#[clap(about = formatcp!(
		"Downsamples an image to {}x{} VGA background attributes and a {}x{} preview",
		VGA_WIDTH,
		VGA_HEIGHT,
		VGA_WIDTH,
		VGA_HEIGHT * PREVIEW_STRETCH
	))]
	struct Args {
		imagePath: PathBuf,

		#[clap(long, help = formatcp!("Only match against the first {} palette colors", DARK_LEN))]
		dark: bool,

		#[clap(long, default_value = "wallpaper.vga")]
		output: PathBuf,

		#[clap(long, default_value = "result.png")]
		preview: PathBuf,

		#[clap(short, long)]
		verbose: bool,
	}

	let Args { imagePath, dark, output, preview, verbose } = Args::parse();
	initLogger(verbose);
	let colors = Palette::fromDark(dark).colors();
	let image = wallpaper::load(&imagePath)?;
	let wallpaper = Wallpaper::fromImage(&image, colors);
	for (path, bytes) in [(&output, wallpaper.raw()), (&preview, wallpaper.preview(colors)?)] {
		fs::write(path, &bytes).atPath(path)?;
		log::debug!("{path:?}: {} bytes", bytes.len());
	}
	Ok(())
}
