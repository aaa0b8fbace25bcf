use std::fmt;
use std::ops::{
	Deref,
	DerefMut,
};

use super::{
	Hardware,
	LowLevel,
};

pub const WRITE_PROTECT_ON: u8 = 0x80;
pub const WRITE_PROTECT_OFF: u8 = 0x00;
pub const CLOCK_HALT: u8 = 0x80;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Register {
	Seconds,
	Minutes,
	Hours,
	Date,
	Month,
	Day,
	Year,
	WriteProtect,
}

impl Register {
	pub const ALL: [Register; 8] = [
		Register::Seconds,
		Register::Minutes,
		Register::Hours,
		Register::Date,
		Register::Month,
		Register::Day,
		Register::Year,
		Register::WriteProtect,
	];

	pub fn write_address(self) -> u8 {
		match self {
			Register::Seconds => 0x80,
			Register::Minutes => 0x82,
			Register::Hours => 0x84,
			Register::Date => 0x86,
			Register::Month => 0x88,
			Register::Day => 0x8a,
			Register::Year => 0x8c,
			Register::WriteProtect => 0x8e,
		}
	}

	pub fn read_address(self) -> u8 {
		match self {
			Register::Seconds => 0x81,
			Register::Minutes => 0x83,
			Register::Hours => 0x85,
			Register::Date => 0x87,
			Register::Month => 0x89,
			Register::Day => 0x8b,
			Register::Year => 0x8d,
			Register::WriteProtect => 0x8f,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Register::Seconds => "seconds",
			Register::Minutes => "minutes",
			Register::Hours => "hours",
			Register::Date => "date",
			Register::Month => "month",
			Register::Day => "day",
			Register::Year => "year",
			Register::WriteProtect => "write-protect",
		}
	}
}

impl fmt::Display for Register {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

pub trait RegisterOperations: LowLevel {
	fn write_register(&mut self, register: Register, value: u8) -> crate::AResult<()> {
		trace!("write {} (0x{:02x}): 0x{:02x}", register, register.write_address(), value);
		let mut tx = self.start_transaction()?;
		tx.write_byte(register.write_address())?;
		tx.write_byte(value)?;
		tx.finish()
	}

	fn read_register(&mut self, register: Register) -> crate::AResult<u8> {
		let mut tx = self.start_transaction()?;
		tx.write_byte(register.read_address())?;
		let value = tx.read_byte()?;
		tx.finish()?;
		trace!("read {} (0x{:02x}): 0x{:02x}", register, register.read_address(), value);
		Ok(value)
	}

	/// Clears the write-protect latch until the returned guard is finished
	/// or dropped.
	fn start_writing(&mut self) -> crate::AResult<WriteEnabled<Self>> {
		self.write_register(Register::WriteProtect, WRITE_PROTECT_OFF)?;
		Ok(WriteEnabled {
			hardware: self,
			active: true,
		})
	}
}

impl<H: Hardware + ?Sized> RegisterOperations for H {
}

pub struct WriteEnabled<'a, H: ?Sized + RegisterOperations + 'a> {
	hardware: &'a mut H,
	active: bool,
}

impl<'a, H: ?Sized + RegisterOperations> WriteEnabled<'a, H> {
	pub fn finish(mut self) -> crate::AResult<()> {
		self.active = false;
		self.hardware.write_register(Register::WriteProtect, WRITE_PROTECT_ON)
	}
}

impl<'a, H: ?Sized + RegisterOperations> Drop for WriteEnabled<'a, H> {
	fn drop(&mut self) {
		if self.active {
			if let Err(e) = self.hardware.write_register(Register::WriteProtect, WRITE_PROTECT_ON) {
				error!("Couldn't enable write protection: {}", e);
			}
		}
	}
}

impl<'a, H: ?Sized + RegisterOperations> Deref for WriteEnabled<'a, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		&*self.hardware
	}
}

impl<'a, H: ?Sized + RegisterOperations> DerefMut for WriteEnabled<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut *self.hardware
	}
}
