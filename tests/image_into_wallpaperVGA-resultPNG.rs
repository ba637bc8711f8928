#![allow(non_snake_case)]

use {
	assert_cmd::Command,
	image::{Rgb, RgbImage},
	predicates::prelude::*,
	std::{fs, path::Path},
	vga_shenanigans::VGA_CELLS,
};

const BIN: &str = "image_into_wallpaperVGA-resultPNG";

fn solidImage(dir: &Path, rgb: [u8; 3]) {
	RgbImage::from_pixel(1, 1, Rgb(rgb)).save(dir.join("in.png")).unwrap();
}

fn convert(dir: &Path, dark: bool) -> Vec<u8> {
	let mut command = Command::cargo_bin(BIN).unwrap();
	command.current_dir(dir).arg("in.png");
	if dark {
		command.arg("--dark");
	}
	command.assert().success();
	fs::read(dir.join("wallpaper.vga")).unwrap()
}

#[test]
fn solidBlackIsAllZeros() {
	let dir = tempfile::tempdir().unwrap();
	solidImage(dir.path(), [0, 0, 0]);
	let raw = convert(dir.path(), false);
	assert_eq!(raw.len(), VGA_CELLS);
	assert!(raw.iter().all(|&byte| byte == 0x00));
}

#[test]
fn darkModeKeepsCyanOutOfTheBrightHalf() {
	let dir = tempfile::tempdir().unwrap();
	solidImage(dir.path(), [0x00, 0xFF, 0xFF]);
	let raw = convert(dir.path(), false);
	assert!(raw.iter().all(|&byte| byte == 11 << 4));
	let raw = convert(dir.path(), true);
	assert_eq!(raw.len(), VGA_CELLS);
	assert!(raw.iter().all(|&byte| byte == 3 << 4));
}

#[test]
fn previewIs80x50() {
	let dir = tempfile::tempdir().unwrap();
	solidImage(dir.path(), [0xFF, 0x00, 0x00]);
	convert(dir.path(), false);
	let preview = image::open(dir.path().join("result.png")).unwrap().into_rgb8();
	assert_eq!(preview.dimensions(), (80, 50));
	assert!(preview.pixels().all(|pixel| pixel.0 == [0xFF, 0x00, 0x00]));
}

#[test]
fn corruptImageFails() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("in.png"), b"definitely not a png").unwrap();
	Command::cargo_bin(BIN)
		.unwrap()
		.current_dir(dir.path())
		.arg("in.png")
		.assert()
		.failure()
		.stderr(predicate::str::contains("in.png"));
	assert!(!dir.path().join("wallpaper.vga").exists());
	assert!(!dir.path().join("result.png").exists());
}

#[test]
fn missingImageFails() {
	let dir = tempfile::tempdir().unwrap();
	Command::cargo_bin(BIN).unwrap().current_dir(dir.path()).arg("gone.png").assert().failure();
}
