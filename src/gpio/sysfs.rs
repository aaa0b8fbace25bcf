use std::fs;
use std::io::Write;
use std::os::unix::fs::FileExt;
use std::path::{
	Path,
	PathBuf,
};

use super::Pins;
use crate::serial::{
	Direction,
	Hardware,
	Line,
};

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

fn write_control(path: &Path, value: &str) -> crate::AResult<()> {
	with_context!(("couldn't write {:?} to {}", value, path.display()), {
		fs::OpenOptions::new().write(true).truncate(true).open(path)?.write_all(value.as_bytes())?;
		Ok(())
	})
}

fn unexport(root: &Path, gpio: u32) {
	if let Err(e) = write_control(&root.join("unexport"), &gpio.to_string()) {
		error!("Failed to unexport GPIO {}: {}", gpio, e);
	}
}

struct SysfsLine {
	root: PathBuf,
	gpio: u32,
	value: fs::File,
	direction: Option<Direction>,
	// unexport again when dropped
	exported: bool,
}

impl SysfsLine {
	fn line_file(root: &Path, gpio: u32, name: &str) -> PathBuf {
		root.join(format!("gpio{}", gpio)).join(name)
	}

	fn open(root: &Path, gpio: u32) -> crate::AResult<Self> {
		let exported = if !root.join(format!("gpio{}", gpio)).exists() {
			debug!("exporting GPIO {}", gpio);
			write_control(&root.join("export"), &gpio.to_string())?;
			true
		} else {
			false
		};

		let path = SysfsLine::line_file(root, gpio, "value");
		let value = match fs::OpenOptions::new().read(true).write(true).open(&path) {
			Ok(f) => f,
			Err(e) => {
				if exported {
					unexport(root, gpio);
				}
				bail!("couldn't open {}: {}", path.display(), e);
			}
		};

		// from here on dropping `line` unexports again
		let mut line = SysfsLine {
			root: root.to_path_buf(),
			gpio,
			value,
			direction: None,
			exported,
		};
		line.direction = Some(line.read_direction()?);
		Ok(line)
	}

	fn read_direction(&self) -> crate::AResult<Direction> {
		let path = SysfsLine::line_file(&self.root, self.gpio, "direction");
		let direction = with_context!(("couldn't read {}", path.display()), {
			Ok(fs::read_to_string(&path)?)
		})?;
		match direction.trim() {
			"in" => Ok(Direction::Input),
			"out" => Ok(Direction::Output),
			d => bail!("GPIO {}: invalid direction {:?}", self.gpio, d),
		}
	}

	fn configure(&mut self, direction: Direction) -> crate::AResult<()> {
		if self.direction == Some(direction) {
			return Ok(());
		}
		let path = SysfsLine::line_file(&self.root, self.gpio, "direction");
		write_control(&path, match direction {
			Direction::Output => "out",
			Direction::Input => "in",
		})?;
		self.direction = Some(direction);
		Ok(())
	}

	fn set(&mut self, high: bool) -> crate::AResult<()> {
		ensure!(self.direction == Some(Direction::Output), "GPIO {} is not configured as output", self.gpio);
		let data: &[u8] = if high { b"1" } else { b"0" };
		with_context!(("GPIO {}: couldn't set value", self.gpio), {
			let l = self.value.write_at(data, 0)?;
			ensure!(l == data.len(), "short write");
			Ok(())
		})
	}

	fn get(&mut self) -> crate::AResult<bool> {
		let mut buf = [0u8; 1];
		let l = with_context!(("GPIO {}: couldn't read value", self.gpio), {
			Ok(self.value.read_at(&mut buf, 0)?)
		})?;
		ensure!(l == 1, "GPIO {}: empty value", self.gpio);
		match buf[0] {
			b'0' => Ok(false),
			b'1' => Ok(true),
			v => bail!("GPIO {}: invalid value 0x{:02x}", self.gpio, v),
		}
	}
}

impl Drop for SysfsLine {
	fn drop(&mut self) {
		if self.exported {
			unexport(&self.root, self.gpio);
		}
	}
}

/// Lines driven through the (deprecated, but still widely available) sysfs
/// GPIO interface.
pub struct SysfsGpio {
	lines: [SysfsLine; 3],
}

impl SysfsGpio {
	/// Leave lines exported by `open` behind when dropped, so their
	/// configuration outlives the process.
	pub fn keep_exported(&mut self) {
		for line in self.lines.iter_mut() {
			line.exported = false;
		}
	}

	fn line(&mut self, line: Line) -> &mut SysfsLine {
		&mut self.lines[line.index()]
	}
}

impl Hardware for SysfsGpio {
	fn configure(&mut self, line: Line, direction: Direction) -> crate::AResult<()> {
		self.line(line).configure(direction)
	}

	fn set_high(&mut self, line: Line) -> crate::AResult<()> {
		self.line(line).set(true)
	}

	fn set_low(&mut self, line: Line) -> crate::AResult<()> {
		self.line(line).set(false)
	}

	fn read_level(&mut self, line: Line) -> crate::AResult<bool> {
		self.line(line).get()
	}
}

pub fn open_at(root: &Path, pins: Pins) -> crate::AResult<SysfsGpio> {
	pins.ensure_distinct()?;
	with_context!(("couldn't open GPIO lines {}", pins), {
		// in `Line::index` order
		Ok(SysfsGpio {
			lines: [
				SysfsLine::open(root, pins.clock)?,
				SysfsLine::open(root, pins.data)?,
				SysfsLine::open(root, pins.chip_select)?,
			],
		})
	})
}

pub fn open(pins: Pins) -> crate::AResult<SysfsGpio> {
	open_at(Path::new(SYSFS_GPIO_ROOT), pins)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ds1302::{
		Ds1302,
		RealTimeClock,
	};

	struct ScratchRoot(PathBuf);

	impl ScratchRoot {
		fn new(name: &str, gpios: &[u32]) -> Self {
			let root = std::env::temp_dir().join(format!("ds1302-sysfs-{}-{}", name, std::process::id()));
			let _ = fs::remove_dir_all(&root);
			for gpio in gpios {
				let dir = root.join(format!("gpio{}", gpio));
				fs::create_dir_all(&dir).unwrap();
				fs::write(dir.join("direction"), "in\n").unwrap();
				fs::write(dir.join("value"), "0\n").unwrap();
			}
			ScratchRoot(root)
		}

		fn read(&self, gpio: u32, name: &str) -> String {
			fs::read_to_string(SysfsLine::line_file(&self.0, gpio, name)).unwrap()
		}
	}

	impl Drop for ScratchRoot {
		fn drop(&mut self) {
			let _ = fs::remove_dir_all(&self.0);
		}
	}

	#[test]
	fn drives_lines() {
		let root = ScratchRoot::new("drive", &[18, 19, 5]);
		let mut gpio = open_at(&root.0, Pins::new(18, 19, 5)).unwrap();

		// still inputs
		assert!(gpio.set_high(Line::Clock).is_err());

		gpio.configure(Line::Clock, Direction::Output).unwrap();
		assert_eq!(root.read(18, "direction"), "out");
		gpio.set_high(Line::Clock).unwrap();
		assert_eq!(&root.read(18, "value")[..1], "1");
		assert!(gpio.read_level(Line::Clock).unwrap());
		gpio.set_low(Line::Clock).unwrap();
		assert!(!gpio.read_level(Line::Clock).unwrap());

		gpio.configure(Line::Data, Direction::Input).unwrap();
		assert!(!gpio.read_level(Line::Data).unwrap());
	}

	#[test]
	fn init_configures_outputs() {
		let root = ScratchRoot::new("init", &[2, 3, 4]);
		let gpio = open_at(&root.0, Pins::new(2, 3, 4)).unwrap();
		let mut rtc = Ds1302::new(gpio);
		rtc.init().unwrap();

		for &gpio in [2, 3, 4].iter() {
			assert_eq!(root.read(gpio, "direction"), "out");
			assert_eq!(&root.read(gpio, "value")[..1], "0");
		}
	}

	#[test]
	fn missing_line() {
		let root = ScratchRoot::new("missing", &[18, 19]);
		// there is no export file in the scratch root either
		assert!(open_at(&root.0, Pins::new(18, 19, 5)).is_err());
	}

	#[test]
	fn export_then_missing_value() {
		let root = ScratchRoot::new("export", &[18, 19]);
		fs::write(root.0.join("export"), "").unwrap();
		// GPIO 5 gets exported, but never shows up; unexporting fails as well
		assert!(open_at(&root.0, Pins::new(18, 19, 5)).is_err());
		assert_eq!(fs::read_to_string(root.0.join("export")).unwrap(), "5");
		assert!(!root.0.join("unexport").exists());
	}

	#[test]
	fn unexport_on_drop() {
		let root = ScratchRoot::new("unexport", &[18, 19, 5]);
		fs::write(root.0.join("unexport"), "").unwrap();

		let mut gpio = open_at(&root.0, Pins::new(18, 19, 5)).unwrap();
		gpio.lines[2].exported = true;
		drop(gpio);
		assert_eq!(fs::read_to_string(root.0.join("unexport")).unwrap(), "5");

		fs::write(root.0.join("unexport"), "").unwrap();
		let mut gpio = open_at(&root.0, Pins::new(18, 19, 5)).unwrap();
		gpio.lines[2].exported = true;
		gpio.keep_exported();
		drop(gpio);
		assert_eq!(fs::read_to_string(root.0.join("unexport")).unwrap(), "");
	}

	#[test]
	fn shared_line() {
		let root = ScratchRoot::new("shared", &[18, 19]);
		assert!(open_at(&root.0, Pins::new(18, 19, 18)).is_err());
	}
}
