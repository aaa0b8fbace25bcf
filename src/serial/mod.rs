/// 3-wire serial protocol of the Maxim DS1302 real time clock
///
/// Three lines: CLK, a bidirectional DATA line and chip select (named RST
/// on the chip; active HIGH). CLK idles LOW.
///
/// Every register access is its own chip select pulse:
/// - command byte: bit 7 always set, bits 5..1 register address, bit 0 set
///   for READ (so write addresses are even, read addresses odd)
/// - data byte: either sent by us, or sent by the chip right after the
///   command byte (DATA has to be switched to input for that)
///
/// Bytes go over the wire starting with the lowest bit. The chip samples
/// DATA on rising CLK edges and shifts out read data on falling edges.
///
/// Burst mode (address 0xbe/0xbf) isn't supported.

mod hardware;
mod low_level;
mod operations;

#[cfg(test)]
pub(crate) mod testing;

pub use self::hardware::{
	CLOCK_EDGE,
	Direction,
	Hardware,
	Line,
	reliable_sleep,
};

pub use self::low_level::{
	LowLevel,
	Transaction,
};

pub use self::operations::{
	CLOCK_HALT,
	Register,
	RegisterOperations,
	WRITE_PROTECT_OFF,
	WRITE_PROTECT_ON,
	WriteEnabled,
};
