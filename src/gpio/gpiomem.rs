/* Chip documentation: BCM2835 ARM Peripherals, chapter 6 "General Purpose I/O" */

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::io::FromRawFd;
use std::ptr;

use libc::{
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	c_void,
	mmap,
	munmap,
	open as libc_open,
};

use super::Pins;
use crate::serial::{
	Direction,
	Hardware,
	Line,
};

pub const GPIOMEM_PATH: &str = "/dev/gpiomem";

mod consts {
	// size of the GPIO register block behind /dev/gpiomem
	pub const BLOCK_SIZE: usize = 0x1000;

	pub const GPFSEL0: usize = 0x00; // function select, 10 pins per register
	pub const GPSET0: usize = 0x1c; // output set, write only
	pub const GPCLR0: usize = 0x28; // output clear, write only
	pub const GPLEV0: usize = 0x34; // pin level, read only

	pub const FSEL_INPUT: u32 = 0b000;
	pub const FSEL_OUTPUT: u32 = 0b001;
	pub const FSEL_MASK: u32 = 0b111;

	pub const MAX_PIN: u32 = 53;
}

use self::consts::*;

/// 32-bit register window
pub trait Registers {
	fn read_dword(&self, offset: usize) -> u32;
	fn write_dword(&mut self, offset: usize, data: u32);
}

pub struct Mapped {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
	len: usize,
}

impl Drop for Mapped {
	fn drop(&mut self) {
		let res = unsafe {
			munmap(
				self.ptr.as_ptr() as *mut c_void,
				self.len,
			)
		};
		if 0 != res {
			error!("munmap failed: {}", io::Error::last_os_error());
		}
	}
}

impl Registers for Mapped {
	fn read_dword(&self, offset: usize) -> u32 {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < self.len);
		unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset) as *const u32) }
	}

	fn write_dword(&mut self, offset: usize, data: u32) {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < self.len);
		unsafe { ptr::write_volatile(self.ptr.as_ptr().add(offset) as *mut u32, data) }
	}
}

pub fn map(path: &str) -> io::Result<Mapped> {
	let path = CString::new(path)?;

	let fd = unsafe { libc_open(path.as_ptr(), O_RDWR | O_SYNC | O_CLOEXEC) };
	if -1 == fd {
		return Err(io::Error::last_os_error());
	}
	// now get fd managed to prevent resource leak
	let _f = unsafe { fs::File::from_raw_fd(fd) };

	let area = unsafe {
		mmap(
			ptr::null_mut(),
			BLOCK_SIZE,
			PROT_READ | PROT_WRITE,
			MAP_SHARED,
			fd,
			0,
		)
	};

	if area == libc::MAP_FAILED {
		return Err(io::Error::last_os_error());
	}
	match ptr::NonNull::new(area as *mut u8) {
		None => Err(io::Error::new(io::ErrorKind::Other, "mmap returned NULL")),
		Some(area) => Ok(Mapped {
			ptr: area,
			len: BLOCK_SIZE,
		}),
	}
}

/// Lines on a BCM283x (Raspberry Pi) driven through its GPIO registers.
pub struct GpioMem<R: Registers> {
	registers: R,
	pins: Pins,
	directions: [Option<Direction>; 3],
}

impl<R: Registers> GpioMem<R> {
	pub fn new(registers: R, pins: Pins) -> crate::AResult<Self> {
		pins.ensure_distinct()?;
		for &line in Line::ALL.iter() {
			let pin = pins.pin(line);
			ensure!(pin <= MAX_PIN, "GPIO {} out of range (0-{})", pin, MAX_PIN);
		}
		Ok(GpioMem {
			registers,
			pins,
			directions: [None; 3],
		})
	}

	pub fn into_inner(self) -> R {
		self.registers
	}

	// (register offset, bit mask) in the GPSET/GPCLR/GPLEV banks
	fn bank(&self, line: Line, base: usize) -> (usize, u32) {
		let pin = self.pins.pin(line);
		(base + 4 * (pin / 32) as usize, 1u32 << (pin % 32))
	}

	fn drive(&mut self, line: Line, base: usize) -> crate::AResult<()> {
		ensure!(
			self.directions[line.index()] == Some(Direction::Output),
			"GPIO {} ({:?}) is not configured as output", self.pins.pin(line), line
		);
		let (offset, mask) = self.bank(line, base);
		self.registers.write_dword(offset, mask);
		Ok(())
	}
}

impl<R: Registers> Hardware for GpioMem<R> {
	fn configure(&mut self, line: Line, direction: Direction) -> crate::AResult<()> {
		let pin = self.pins.pin(line);
		let offset = GPFSEL0 + 4 * (pin / 10) as usize;
		let shift = 3 * (pin % 10);
		let function = match direction {
			Direction::Output => FSEL_OUTPUT,
			Direction::Input => FSEL_INPUT,
		};
		let fsel = self.registers.read_dword(offset);
		self.registers.write_dword(offset, (fsel & !(FSEL_MASK << shift)) | (function << shift));
		self.directions[line.index()] = Some(direction);
		Ok(())
	}

	fn set_high(&mut self, line: Line) -> crate::AResult<()> {
		self.drive(line, GPSET0)
	}

	fn set_low(&mut self, line: Line) -> crate::AResult<()> {
		self.drive(line, GPCLR0)
	}

	fn read_level(&mut self, line: Line) -> crate::AResult<bool> {
		let (offset, mask) = self.bank(line, GPLEV0);
		Ok(0 != self.registers.read_dword(offset) & mask)
	}
}

pub fn open(pins: Pins) -> crate::AResult<GpioMem<Mapped>> {
	let registers = with_context!(("couldn't map {}", GPIOMEM_PATH), {
		Ok(map(GPIOMEM_PATH)?)
	})?;
	GpioMem::new(registers, pins)
}
