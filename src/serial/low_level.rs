use std::ops::{
	Deref,
	DerefMut,
};

use super::{
	Direction,
	Hardware,
	Line,
};

/// One chip-select pulse; chip-select goes low again when finished or dropped.
pub struct Transaction<'a, H: ?Sized + LowLevel + 'a> {
	hardware: &'a mut H,
	active: bool,
}

impl<'a, H: ?Sized + LowLevel> Transaction<'a, H> {
	pub fn finish(mut self) -> crate::AResult<()> {
		self.active = false;
		self.hardware.set_low(Line::ChipSelect)
	}
}

impl<'a, H: ?Sized + LowLevel> Drop for Transaction<'a, H> {
	fn drop(&mut self) {
		if self.active {
			if let Err(e) = self.hardware.set_low(Line::ChipSelect) {
				error!("Couldn't deassert chip select: {}", e);
			}
		}
	}
}

impl<'a, H: ?Sized + LowLevel> Deref for Transaction<'a, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		&*self.hardware
	}
}

impl<'a, H: ?Sized + LowLevel> DerefMut for Transaction<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut *self.hardware
	}
}

pub trait LowLevel: Hardware {
	// the chip samples DATA on the rising CLK edge; CLK is low between bits
	fn write_byte(&mut self, value: u8) -> crate::AResult<()> {
		self.configure(Line::Data, Direction::Output)?;

		for bit in 0..8 {
			self.set_level(Line::Data, 0 != value & (1 << bit))?;
			self.set_high(Line::Clock)?;
			self.delay();
			self.set_low(Line::Clock)?;
			self.delay();
		}

		Ok(())
	}

	// read byte, starting with lowest bit
	fn read_byte(&mut self) -> crate::AResult<u8> {
		self.configure(Line::Data, Direction::Input)?;

		let mut result = 0u8;
		for bit in 0..8 {
			self.set_high(Line::Clock)?;
			self.delay();
			if self.read_level(Line::Data)? {
				result |= 1 << bit;
			}
			self.set_low(Line::Clock)?;
			self.delay();
		}

		Ok(result)
	}

	fn start_transaction(&mut self) -> crate::AResult<Transaction<Self>> {
		self.set_high(Line::ChipSelect)?;

		Ok(Transaction {
			hardware: self,
			active: true,
		})
	}
}

impl<H: Hardware + ?Sized> LowLevel for H {
}
