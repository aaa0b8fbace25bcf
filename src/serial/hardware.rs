use std::thread;
use std::time::{
	Duration,
	Instant,
};

// the chip is fine with much less, but long or noisy wires aren't
pub const CLOCK_EDGE: Duration = Duration::from_micros(1);

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Line {
	Clock,
	Data,
	ChipSelect,
}

impl Line {
	pub const ALL: [Line; 3] = [Line::Clock, Line::Data, Line::ChipSelect];

	pub fn index(self) -> usize {
		match self {
			Line::Clock => 0,
			Line::Data => 1,
			Line::ChipSelect => 2,
		}
	}
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
	Output,
	Input,
}

/// Access to the three lines wired to the chip.
///
/// Only lines configured as `Output` may be driven; the data line switches
/// direction within a single read transaction.
pub trait Hardware {
	fn configure(&mut self, line: Line, direction: Direction) -> crate::AResult<()>;
	fn set_high(&mut self, line: Line) -> crate::AResult<()>;
	fn set_low(&mut self, line: Line) -> crate::AResult<()>;
	fn read_level(&mut self, line: Line) -> crate::AResult<bool>;

	fn sleep(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}

	fn set_level(&mut self, line: Line, high: bool) -> crate::AResult<()> {
		if high {
			self.set_high(line)
		} else {
			self.set_low(line)
		}
	}

	// delay for (at least) one clock edge
	fn delay(&mut self) {
		self.sleep(CLOCK_EDGE);
	}
}

impl<'a, H: ?Sized + Hardware> Hardware for &'a mut H {
	fn configure(&mut self, line: Line, direction: Direction) -> crate::AResult<()> {
		H::configure(*self, line, direction)
	}
	fn set_high(&mut self, line: Line) -> crate::AResult<()> {
		H::set_high(*self, line)
	}
	fn set_low(&mut self, line: Line) -> crate::AResult<()> {
		H::set_low(*self, line)
	}
	fn read_level(&mut self, line: Line) -> crate::AResult<bool> {
		H::read_level(*self, line)
	}
	fn sleep(&mut self, duration: Duration) {
		H::sleep(*self, duration)
	}
}

impl<H: ?Sized + Hardware> Hardware for Box<H> {
	fn configure(&mut self, line: Line, direction: Direction) -> crate::AResult<()> {
		H::configure(self, line, direction)
	}
	fn set_high(&mut self, line: Line) -> crate::AResult<()> {
		H::set_high(self, line)
	}
	fn set_low(&mut self, line: Line) -> crate::AResult<()> {
		H::set_low(self, line)
	}
	fn read_level(&mut self, line: Line) -> crate::AResult<bool> {
		H::read_level(self, line)
	}
	fn sleep(&mut self, duration: Duration) {
		H::sleep(self, duration)
	}
}
