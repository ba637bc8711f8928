#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case, clippy::cast_possible_truncation)]

use {
	glam::IVec3,
	log::LevelFilter,
	std::{
		io,
		path::{Path, PathBuf},
	},
};

pub const VGA_WIDTH: usize = 80;
pub const VGA_HEIGHT: usize = 25;
pub const VGA_CELLS: usize = VGA_WIDTH * VGA_HEIGHT;
pub const RGB_SIZE: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{path:?}: {source}")]
	Io { path: PathBuf, source: io::Error },

	#[error("{path:?}: {source}")]
	Decode { path: PathBuf, source: image::ImageError },

	#[error(transparent)]
	Encode(#[from] png::EncodingError),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

pub trait IoResultExt<T> {
	fn atPath(self, path: &Path) -> Result<T>;
}
impl<T> IoResultExt<T> for io::Result<T> {
	fn atPath(self, path: &Path) -> Result<T> {
		self.map_err(|source| Error::Io { path: path.to_owned(), source })
	}
}

pub trait DotExt {
	fn lengthSquared(self) -> i32;
}
impl DotExt for IVec3 {
	#[inline(always)]
	fn lengthSquared(self) -> i32 {
		self.dot(self)
	}
}

struct StderrLogger;

impl log::Log for StderrLogger {
	fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
		metadata.level() <= log::max_level()
	}
	fn log(&self, record: &log::Record<'_>) {
		if self.enabled(record.metadata()) {
			eprintln!("[{}] {}", record.level(), record.args());
		}
	}
	fn flush(&self) {}
}

/// Installs the stderr logger once; later calls only leave the first level in place.
pub fn initLogger(verbose: bool) {
	static LOGGER: StderrLogger = StderrLogger;
	if log::set_logger(&LOGGER).is_ok() {
		log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });
	}
}

/// Unicode box-drawing, block and shade glyphs down to IBM code page 437.
pub mod p437 {
	use {
		crate::{IoResultExt, Result},
		std::{fs, path::Path},
	};

	pub const PLACEHOLDER: u8 = b'?';

	/// Code points below this pass through untouched, control characters included.
	pub const ASCII_END: u8 = 127;

	// sorted by code point, `lookup` relies on it
	pub static GLYPHS: [(char, u8); 31] = [
		('\u{2500}', 196), // ─
		('\u{2502}', 179), // │
		('\u{250C}', 218), // ┌
		('\u{2510}', 191), // ┐
		('\u{2514}', 192), // └
		('\u{2518}', 217), // ┘
		('\u{251C}', 195), // ├
		('\u{2524}', 180), // ┤
		('\u{252C}', 194), // ┬
		('\u{2534}', 193), // ┴
		('\u{253C}', 197), // ┼
		('\u{2550}', 205), // ═
		('\u{2551}', 186), // ║
		('\u{2554}', 201), // ╔
		('\u{2557}', 187), // ╗
		('\u{255A}', 200), // ╚
		('\u{255D}', 188), // ╝
		('\u{2560}', 204), // ╠
		('\u{2563}', 185), // ╣
		('\u{2566}', 203), // ╦
		('\u{2569}', 202), // ╩
		('\u{256C}', 206), // ╬
		('\u{2580}', 223), // ▀
		('\u{2584}', 220), // ▄
		('\u{2588}', 219), // █
		('\u{258C}', 221), // ▌
		('\u{2590}', 222), // ▐
		('\u{2591}', 176), // ░
		('\u{2592}', 177), // ▒
		('\u{2593}', 178), // ▓
		('\u{25A0}', 254), // ■
	];

	pub fn lookup(c: char) -> Option<u8> {
		GLYPHS.binary_search_by_key(&c, |&(glyph, _)| glyph).ok().map(|i| GLYPHS[i].1)
	}

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub enum Classified {
		Ascii(u8),
		Glyph(u8),
		Unknown(char),
	}
	use Classified::*;

	impl Classified {
		pub fn byte(self) -> u8 {
			match self {
				Ascii(byte) | Glyph(byte) => byte,
				Unknown(_) => PLACEHOLDER,
			}
		}
	}

	pub fn classify(c: char) -> Classified {
		match u8::try_from(c) {
			Ok(byte) if byte < ASCII_END => Ascii(byte),
			_ => lookup(c).map_or(Unknown(c), Glyph),
		}
	}

	/// One output byte per code point. `onUnknown` fires once for every unmapped occurrence,
	/// which still lands in the output as [`PLACEHOLDER`].
	pub fn encode(text: &str, mut onUnknown: impl FnMut(char)) -> Vec<u8> {
		let mut p437 = Vec::with_capacity(text.len());
		for c in text.chars() {
			let classified = classify(c);
			if let Unknown(c) = classified {
				onUnknown(c);
			}
			p437.push(classified.byte());
		}
		p437
	}

	/// Reads a UTF-8 text file, folding `\r\n` and lone `\r` line endings into `\n`.
	pub fn readText(path: &Path) -> Result<String> {
		let text = fs::read_to_string(path).atPath(path)?;
		Ok(if text.contains('\r') { text.replace("\r\n", "\n").replace('\r', "\n") } else { text })
	}

}

/// The 16 colors of the VGA text-mode attribute nibble, in attribute order.
pub mod palette {
	use {
		crate::{DotExt, RGB_SIZE},
		glam::IVec3,
	};

	pub type Rgb = [u8; RGB_SIZE];

	pub static VGA: [Rgb; 16] = [
		[0x00, 0x00, 0x00],
		[0x00, 0x00, 0x80],
		[0x00, 0x80, 0x00],
		[0x00, 0x80, 0x80],
		[0x80, 0x00, 0x00],
		[0x80, 0x00, 0x80],
		[0x80, 0x80, 0x00],
		[0xC0, 0xC0, 0xC0],
		[0x80, 0x80, 0x80],
		[0x00, 0x00, 0xFF],
		[0x00, 0xFF, 0x00],
		[0x00, 0xFF, 0xFF],
		[0xFF, 0x00, 0x00],
		[0xFF, 0x00, 0xFF],
		[0xFF, 0xFF, 0x00],
		[0xFF, 0xFF, 0xFF],
	];

	/// The dark palette stops before the bright half, gray included.
	pub const DARK_LEN: usize = 9;

	#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
	pub enum Palette {
		#[default]
		Full,
		Dark,
	}

	impl Palette {
		pub fn fromDark(dark: bool) -> Self {
			if dark {
				Palette::Dark
			} else {
				Palette::Full
			}
		}

		pub fn colors(self) -> &'static [Rgb] {
			match self {
				Palette::Full => &VGA,
				Palette::Dark => &VGA[..DARK_LEN],
			}
		}
	}

	#[inline(always)]
	fn toIVec3(rgb: Rgb) -> IVec3 {
		IVec3::from_array(rgb.map(i32::from))
	}

	pub fn squaredDistance(a: Rgb, b: Rgb) -> i32 {
		(toIVec3(a) - toIVec3(b)).lengthSquared()
	}

	/// Index of the closest color; on a tie the lower index wins.
	pub fn nearestIndex(rgb: Rgb, colors: &[Rgb]) -> usize {
		assert!(!colors.is_empty());
		let (mut nearestSquaredDist, mut nearestI) = (i32::MAX, 0);
		for (i, &palColor) in colors.iter().enumerate() {
			let squaredDist = squaredDistance(rgb, palColor);
			if squaredDist < nearestSquaredDist {
				(nearestSquaredDist, nearestI) = (squaredDist, i);
			}
		}
		nearestI
	}

	/// Flat RGB triples, as a PNG PLTE chunk wants them.
	pub fn pngPalette(colors: &[Rgb]) -> Vec<u8> {
		colors.concat()
	}

	#[cfg(test)]
	mod tests {
		use {
			super::*,
			rand::{thread_rng, Rng},
		};

		#[test]
		fn exactColorsMapToThemselves() {
			for (i, &color) in VGA.iter().enumerate() {
				assert_eq!(nearestIndex(color, &VGA), i);
			}
		}

		#[test]
		fn tieGoesToLowestIndex() {
			// black and gray are both 3 * 64^2 away
			assert_eq!(squaredDistance([0x40; 3], VGA[0]), squaredDistance([0x40; 3], VGA[8]));
			assert_eq!(nearestIndex([0x40; 3], &VGA), 0);
		}

		#[test]
		fn darkPaletteNeverReachesBrightHalf() {
			let dark = Palette::Dark.colors();
			assert_eq!(dark.len(), DARK_LEN);
			assert_eq!(nearestIndex([0x00, 0xFF, 0xFF], &VGA), 11);
			assert_eq!(nearestIndex([0x00, 0xFF, 0xFF], dark), 3);
			assert_eq!(nearestIndex([0xFF; 3], dark), 7);
		}

		#[test]
		fn matchesBruteForceOnRandomColors() {
			let mut rng = thread_rng();
			for _ in 0..1000 {
				let testColor = rng.gen::<Rgb>();
				let nearestI = nearestIndex(testColor, &VGA);
				let nearestSquaredDist = squaredDistance(testColor, VGA[nearestI]);
				for (i, &palColor) in VGA.iter().enumerate() {
					let squaredDist = squaredDistance(testColor, palColor);
					assert!(squaredDist > nearestSquaredDist || (squaredDist == nearestSquaredDist && i >= nearestI));
				}
			}
		}

		#[test]
		fn pngPaletteIsFlat() {
			let flat = pngPalette(Palette::Dark.colors());
			assert_eq!(flat.len(), DARK_LEN * RGB_SIZE);
			assert_eq!(&flat[3 * 7..][..3], &[0xC0; 3]);
		}
	}
}

/// Images down to an 80x25 grid of VGA background attributes.
pub mod wallpaper {
	use {
		crate::{
			palette::{nearestIndex, pngPalette, Rgb},
			Error, Result, VGA_HEIGHT, VGA_WIDTH,
		},
		image::{imageops::FilterType, ImageError, RgbImage},
		png::ColorType,
		std::{io::Write, path::Path},
	};

	/// Attribute background lives in the high nibble; the low (foreground) one stays 0.
	pub const NIBBLE_SHIFT: u32 = 4;

	/// Text cells are about twice as tall as wide.
	pub const PREVIEW_STRETCH: usize = 2;

	pub fn load(path: &Path) -> Result<RgbImage> {
		match image::open(path) {
			Ok(image) => Ok(image.into_rgb8()),
			Err(ImageError::IoError(source)) => Err(Error::Io { path: path.to_owned(), source }),
			Err(source) => Err(Error::Decode { path: path.to_owned(), source }),
		}
	}

	pub fn resize(image: &RgbImage, width: usize, height: usize) -> RgbImage {
		image::imageops::resize(image, width as _, height as _, FilterType::Triangle)
	}

	/// Palette indices, row-major.
	pub fn quantize(image: &RgbImage, colors: &[Rgb]) -> Vec<u8> {
		image.pixels().map(|pixel| nearestIndex(pixel.0, colors) as u8).collect()
	}

	pub fn packNibbles(indices: &[u8]) -> Vec<u8> {
		indices.iter().map(|&i| i << NIBBLE_SHIFT).collect()
	}

	pub fn stretchRows(indices: &[u8], width: usize, factor: usize) -> Vec<u8> {
		let mut stretched = Vec::with_capacity(indices.len() * factor);
		for row in indices.chunks(width) {
			for _ in 0..factor {
				stretched.extend_from_slice(row);
			}
		}
		stretched
	}

	pub fn writePreview<W: Write>(
		writer: W,
		indices: &[u8],
		[width, height]: [usize; 2],
		colors: &[Rgb],
	) -> Result<()> {
		let mut png = png::Encoder::new(writer, width as _, height as _);
		png.set_color(ColorType::Indexed);
		png.set_palette(pngPalette(colors));
		let mut png = png.write_header()?;
		png.write_image_data(indices)?;
		png.finish().map_err(Error::from)
	}

	pub struct Wallpaper {
		pub width: usize,
		pub height: usize,
		pub indices: Vec<u8>,
	}

	impl Wallpaper {
		pub fn fromImage(image: &RgbImage, colors: &[Rgb]) -> Self {
			let (width, height) = (VGA_WIDTH, VGA_HEIGHT);
			let resized = resize(image, width, height);
			log::debug!("{}x{} -> {width}x{height}", image.width(), image.height());
			Wallpaper { width, height, indices: quantize(&resized, colors) }
		}

		pub fn raw(&self) -> Vec<u8> {
			packNibbles(&self.indices)
		}

		/// Indexed PNG, each row doubled.
		pub fn preview(&self, colors: &[Rgb]) -> Result<Vec<u8>> {
			let (stretched, mut png) = (stretchRows(&self.indices, self.width, PREVIEW_STRETCH), Vec::new());
			writePreview(&mut png, &stretched, [self.width, self.height * PREVIEW_STRETCH], colors)?;
			Ok(png)
		}
	}

}
