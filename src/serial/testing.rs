use std::time::Duration;

use super::{
	Direction,
	Hardware,
	Line,
	WRITE_PROTECT_ON,
};

const WRITE_PROTECT_INDEX: usize = 7;

/// DS1302 simulated at the line level.
///
/// Decodes command and data bits on rising CLK edges while chip select is
/// HIGH and shifts register contents out for read commands. Protocol
/// violations are collected in `faults` instead of failing the call.
pub(crate) struct SimulatedChip {
	/// indexed by address bits 5..1
	pub registers: [u8; 32],
	/// (command, data) for every completed chip select pulse
	pub transactions: Vec<(u8, u8)>,
	pub faults: Vec<String>,
	pub slept: Duration,
	pub selects: usize,
	directions: [Option<Direction>; 3],
	levels: [bool; 3],
	shift: u16,
	edges: usize,
}

impl SimulatedChip {
	pub fn new() -> Self {
		let mut registers = [0u8; 32];
		registers[WRITE_PROTECT_INDEX] = WRITE_PROTECT_ON;
		SimulatedChip {
			registers,
			transactions: Vec::new(),
			faults: Vec::new(),
			slept: Duration::from_secs(0),
			selects: 0,
			directions: [None; 3],
			levels: [false; 3],
			shift: 0,
			edges: 0,
		}
	}

	/// CLK and chip select configured as idle outputs
	pub fn initialized() -> Self {
		let mut chip = SimulatedChip::new();
		chip.directions[Line::Clock.index()] = Some(Direction::Output);
		chip.directions[Line::ChipSelect.index()] = Some(Direction::Output);
		chip
	}

	pub fn direction(&self, line: Line) -> Option<Direction> {
		self.directions[line.index()]
	}

	pub fn level(&self, line: Line) -> bool {
		self.levels[line.index()]
	}

	pub fn assert_clean(&self) {
		assert!(self.faults.is_empty(), "protocol faults: {:?}", self.faults);
	}

	fn selected(&self) -> bool {
		self.level(Line::ChipSelect)
	}

	fn command(&self) -> u8 {
		self.shift as u8
	}

	fn is_read(&self) -> bool {
		self.edges >= 8 && 0 != self.command() & 0x01
	}

	fn index(&self) -> usize {
		((self.command() >> 1) & 0x1f) as usize
	}

	fn select(&mut self) {
		if self.level(Line::Clock) {
			self.faults.push("chip select raised while CLK is HIGH".into());
		}
		self.selects += 1;
		self.shift = 0;
		self.edges = 0;
	}

	fn deselect(&mut self) {
		if self.edges < 8 {
			self.faults.push(format!("chip select dropped after {} bits", self.edges));
			return;
		}
		let command = self.command();
		if self.is_read() {
			let value = self.registers[self.index()];
			self.transactions.push((command, value));
			return;
		}
		if self.edges != 16 {
			self.faults.push(format!("write command 0x{:02x} with {} bits", command, self.edges));
			return;
		}
		let value = (self.shift >> 8) as u8;
		self.transactions.push((command, value));
		let index = self.index();
		let protected = 0 != self.registers[WRITE_PROTECT_INDEX] & WRITE_PROTECT_ON;
		if index == WRITE_PROTECT_INDEX || !protected {
			self.registers[index] = value;
		}
	}

	fn rising_clock(&mut self) {
		if !self.selected() {
			return;
		}
		if self.is_read() {
			self.edges += 1;
			return;
		}
		if self.edges >= 16 {
			self.faults.push("clock edge after data byte".into());
			return;
		}
		if self.direction(Line::Data) != Some(Direction::Output) {
			self.faults.push(format!("DATA sampled as input at bit {}", self.edges));
		}
		if self.level(Line::Data) {
			self.shift |= 1 << self.edges;
		}
		self.edges += 1;
	}
}

impl Hardware for SimulatedChip {
	fn configure(&mut self, line: Line, direction: Direction) -> crate::AResult<()> {
		self.directions[line.index()] = Some(direction);
		Ok(())
	}

	fn set_high(&mut self, line: Line) -> crate::AResult<()> {
		if self.direction(line) != Some(Direction::Output) {
			self.faults.push(format!("{:?} driven while not an output", line));
		}
		let was = self.level(line);
		self.levels[line.index()] = true;
		match line {
			Line::ChipSelect if !was => self.select(),
			Line::Clock if !was => self.rising_clock(),
			_ => (),
		}
		Ok(())
	}

	fn set_low(&mut self, line: Line) -> crate::AResult<()> {
		if self.direction(line) != Some(Direction::Output) {
			self.faults.push(format!("{:?} driven while not an output", line));
		}
		let was = self.level(line);
		self.levels[line.index()] = false;
		if line == Line::ChipSelect && was {
			self.deselect();
		}
		Ok(())
	}

	fn read_level(&mut self, line: Line) -> crate::AResult<bool> {
		if line != Line::Data || !self.selected() || !self.is_read() {
			return Ok(self.level(line));
		}
		if self.direction(Line::Data) != Some(Direction::Input) {
			self.faults.push("DATA read while driven by us".into());
		}
		// bit 0 is presented after the last command edge, every following
		// rising edge of ours moves on to the next bit
		let bit = self.edges.saturating_sub(9);
		if bit >= 8 {
			return Ok(false);
		}
		Ok(0 != self.registers[self.index()] & (1 << bit))
	}

	fn sleep(&mut self, duration: Duration) {
		self.slept += duration;
	}
}
