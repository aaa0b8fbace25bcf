use std::fmt;
use std::str;

use crate::serial::{
	Hardware,
	Line,
};

pub mod gpiomem;
mod null;
pub mod sysfs;

pub use self::null::NullHardware;

/// GPIO line numbers the chip is wired to
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Pins {
	pub clock: u32,
	pub data: u32,
	pub chip_select: u32,
}

impl Pins {
	pub fn new(clock: u32, data: u32, chip_select: u32) -> Self {
		Pins {
			clock,
			data,
			chip_select,
		}
	}

	pub fn pin(&self, line: Line) -> u32 {
		match line {
			Line::Clock => self.clock,
			Line::Data => self.data,
			Line::ChipSelect => self.chip_select,
		}
	}

	fn ensure_distinct(&self) -> crate::AResult<()> {
		ensure!(
			self.clock != self.data && self.clock != self.chip_select && self.data != self.chip_select,
			"lines must use distinct GPIOs: {}", self
		);
		Ok(())
	}
}

impl fmt::Display for Pins {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "CLK={} DAT={} RST={}", self.clock, self.data, self.chip_select)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Backend {
	/// `/sys/class/gpio`
	Sysfs,
	/// BCM283x registers through `/dev/gpiomem`
	GpioMem,
	/// no hardware at all
	Null,
}

impl Backend {
	pub fn open(self, pins: Pins) -> crate::AResult<Box<dyn Hardware>> {
		debug!("opening {} backend for {}", self, pins);
		let hardware: Box<dyn Hardware> = match self {
			Backend::Sysfs => Box::new(sysfs::open(pins)?),
			Backend::GpioMem => Box::new(gpiomem::open(pins)?),
			Backend::Null => Box::new(NullHardware),
		};
		Ok(hardware)
	}
}

impl fmt::Display for Backend {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Backend::Sysfs => "sysfs",
			Backend::GpioMem => "gpiomem",
			Backend::Null => "null",
		})
	}
}

impl str::FromStr for Backend {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"sysfs" => Backend::Sysfs,
			"gpiomem" => Backend::GpioMem,
			"null" => Backend::Null,
			_ => bail!("unknown GPIO backend {:?} (expected sysfs, gpiomem or null)", s),
		})
	}
}
