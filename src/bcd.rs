//! Binary-coded decimal as used by every DS1302 time register: the upper
//! nibble holds the tens digit, the lower nibble the ones digit.
//!
//! Both directions are total; bytes read from the chip are not validated,
//! and values above 99 encode to bytes the chip won't understand.

pub fn bcd_to_decimal(bcd: u8) -> u8 {
	(bcd >> 4) * 10 + (bcd & 0x0f)
}

pub fn decimal_to_bcd(dec: u8) -> u8 {
	((dec / 10) << 4) | (dec % 10)
}
