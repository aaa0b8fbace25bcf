use crate::bcd::{
	bcd_to_decimal,
	decimal_to_bcd,
};
use crate::serial::{
	CLOCK_HALT,
	Direction,
	Hardware,
	Line,
	Register,
	RegisterOperations,
};
use crate::timestamp::Timestamp;

/// The year register only holds the last two digits
pub const CENTURY: u16 = 2000;

pub trait RealTimeClock {
	/// configure the lines and drive them to idle (LOW); can be repeated
	fn init(&mut self) -> crate::AResult<()>;
	fn set_time(&mut self, time: &Timestamp) -> crate::AResult<()>;
	fn read_time(&mut self) -> crate::AResult<Timestamp>;
}

impl<'a, C: ?Sized + RealTimeClock> RealTimeClock for &'a mut C {
	fn init(&mut self) -> crate::AResult<()> {
		C::init(*self)
	}
	fn set_time(&mut self, time: &Timestamp) -> crate::AResult<()> {
		C::set_time(*self, time)
	}
	fn read_time(&mut self) -> crate::AResult<Timestamp> {
		C::read_time(*self)
	}
}

/// DS1302 attached to three lines.
///
/// Nothing is cached between calls, and nothing verifies what the chip
/// returns: without a chip on the wire reads decode to garbage.
pub struct Ds1302<H: Hardware> {
	hardware: H,
}

impl<H: Hardware> Ds1302<H> {
	pub fn new(hardware: H) -> Self {
		Ds1302 { hardware }
	}

	pub fn hardware(&mut self) -> &mut H {
		&mut self.hardware
	}

	pub fn into_inner(self) -> H {
		self.hardware
	}

	/// Raw register content, without masking or decoding
	pub fn read_register(&mut self, register: Register) -> crate::AResult<u8> {
		self.hardware.read_register(register)
	}
}

// years outside 2000-2099 wrap
/// Years outside `CENTURY..CENTURY + 100` wrap around
pub fn year_to_register(year: u16) -> u8 {
	decimal_to_bcd(year.wrapping_sub(CENTURY) as u8)
}

pub fn year_from_register(raw: u8) -> u16 {
	CENTURY + u16::from(bcd_to_decimal(raw))
}

impl<H: Hardware> RealTimeClock for Ds1302<H> {
	fn init(&mut self) -> crate::AResult<()> {
		for &line in Line::ALL.iter() {
			self.hardware.configure(line, Direction::Output)?;
		}
		self.hardware.set_low(Line::Clock)?;
		self.hardware.set_low(Line::ChipSelect)?;
		self.hardware.set_low(Line::Data)?;
		Ok(())
	}

	fn set_time(&mut self, time: &Timestamp) -> crate::AResult<()> {
		debug!("set time {}", time);
		let fields = [
			(Register::Seconds, decimal_to_bcd(time.second)),
			(Register::Minutes, decimal_to_bcd(time.minute)),
			(Register::Hours, decimal_to_bcd(time.hour)),
			(Register::Date, decimal_to_bcd(time.day)),
			(Register::Month, decimal_to_bcd(time.month)),
			(Register::Year, year_to_register(time.year)),
		];

		let mut regs = self.hardware.start_writing()?;
		for &(register, value) in fields.iter() {
			regs.write_register(register, value)?;
		}
		regs.finish()
	}

	fn read_time(&mut self) -> crate::AResult<Timestamp> {
		let second = bcd_to_decimal(self.hardware.read_register(Register::Seconds)? & !CLOCK_HALT);
		let minute = bcd_to_decimal(self.hardware.read_register(Register::Minutes)?);
		let hour = bcd_to_decimal(self.hardware.read_register(Register::Hours)?);
		let day = bcd_to_decimal(self.hardware.read_register(Register::Date)?);
		let month = bcd_to_decimal(self.hardware.read_register(Register::Month)?);
		let year = year_from_register(self.hardware.read_register(Register::Year)?);

		let time = Timestamp::new(year, month, day, hour, minute, second);
		debug!("read time {}", time);
		Ok(time)
	}
}

/// Stand-in for setups without a chip: does nothing and always reads the
/// zero timestamp.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct NullClock;

impl NullClock {
	/// Line identifiers are accepted for signature compatibility only.
	pub fn new<C, D, S>(_clock: C, _data: D, _chip_select: S) -> Self {
		NullClock
	}
}

impl RealTimeClock for NullClock {
	fn init(&mut self) -> crate::AResult<()> {
		Ok(())
	}

	fn set_time(&mut self, _time: &Timestamp) -> crate::AResult<()> {
		Ok(())
	}

	fn read_time(&mut self) -> crate::AResult<Timestamp> {
		Ok(Timestamp::default())
	}
}
