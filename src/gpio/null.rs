use std::time::Duration;

use crate::serial::{
	Direction,
	Hardware,
	Line,
};

/// Lines that go nowhere: driving them does nothing, they always read LOW.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct NullHardware;

impl Hardware for NullHardware {
	fn configure(&mut self, _line: Line, _direction: Direction) -> crate::AResult<()> {
		Ok(())
	}

	fn set_high(&mut self, _line: Line) -> crate::AResult<()> {
		Ok(())
	}

	fn set_low(&mut self, _line: Line) -> crate::AResult<()> {
		Ok(())
	}

	fn read_level(&mut self, _line: Line) -> crate::AResult<bool> {
		Ok(false)
	}

	fn sleep(&mut self, _duration: Duration) {
	}
}
