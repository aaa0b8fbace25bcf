#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate ds1302_rtc;
use ds1302_rtc::*;

use std::process::exit;
use std::thread;
use std::time::Duration;

use ds1302_rtc::gpio::{
	sysfs,
	Backend,
	Pins,
};
use ds1302_rtc::serial::{
	CLOCK_HALT,
	Register,
	WRITE_PROTECT_ON,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_pins(matches: &clap::ArgMatches) -> AResult<Pins> {
	Ok(Pins::new(
		get_param(matches, "clk")?,
		get_param(matches, "dat")?,
		get_param(matches, "rst")?,
	))
}

fn open_clock(matches: &clap::ArgMatches) -> AResult<Box<dyn RealTimeClock>> {
	let backend: Backend = get_param(matches, "backend")?;
	let pins = get_pins(matches)?;

	let mut clock: Box<dyn RealTimeClock> = match backend {
		Backend::Null => {
			warn!("null backend: nothing is written, reads return the zero timestamp");
			Box::new(NullClock::new(pins.clock, pins.data, pins.chip_select))
		},
		_ => Box::new(Ds1302::new(backend.open(pins)?)),
	};
	clock.init()?;
	Ok(clock)
}

fn init(matches: &clap::ArgMatches) -> AResult<()> {
	let backend: Backend = get_param(matches, "backend")?;
	if let Backend::Sysfs = backend {
		let mut gpio = sysfs::open(get_pins(matches)?)?;
		// the lines must stay configured after exiting
		gpio.keep_exported();
		return Ds1302::new(gpio).init();
	}
	open_clock(matches)?;
	Ok(())
}

fn read(matches: &clap::ArgMatches) -> AResult<()> {
	let mut clock = open_clock(matches)?;
	println!("{}", clock.read_time()?);
	Ok(())
}

fn set(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let time: Timestamp = if sub_m.is_present("now") {
		if sub_m.is_present("utc") {
			Timestamp::utc_now()?
		} else {
			Timestamp::local_now()?
		}
	} else {
		get_param(sub_m, "TIME")?
	};

	if time.year < ds1302::CENTURY || time.year > ds1302::CENTURY + 99 {
		let stored = ds1302::year_to_register(time.year);
		warn!("year {} can't be represented; the chip will store {:02x} (read back as {})", time.year, stored, ds1302::year_from_register(stored));
	}

	let mut clock = open_clock(matches)?;
	clock.set_time(&time)?;
	info!("time set to {}", time);
	Ok(())
}

fn watch(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let count: Option<u64> = match sub_m.value_of("count") {
		None => None,
		Some(_) => Some(get_param(sub_m, "count")?),
	};
	let interval = Duration::from_millis(get_param(sub_m, "interval")?);

	let mut clock = open_clock(matches)?;
	let mut reads = 0u64;
	loop {
		println!("{}", clock.read_time()?);
		reads += 1;
		if count.map_or(false, |count| reads >= count) {
			return Ok(());
		}
		thread::sleep(interval);
	}
}

fn dump(matches: &clap::ArgMatches) -> AResult<()> {
	let backend: Backend = get_param(matches, "backend")?;
	let pins = get_pins(matches)?;

	let mut rtc = Ds1302::new(backend.open(pins)?);
	rtc.init()?;

	for &register in Register::ALL.iter() {
		let raw = rtc.read_register(register)?;
		print!("{:<13} @{:02x}: {:02x}", register.name(), register.read_address(), raw);
		match register {
			Register::Seconds if 0 != raw & CLOCK_HALT => print!(" [HALT]"),
			Register::WriteProtect if 0 != raw & WRITE_PROTECT_ON => print!(" [WP]"),
			_ => (),
		}
		println!();
	}

	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg backend: -b --backend +takes_value possible_values(&["sysfs", "gpiomem", "null"]) default_value("sysfs") "GPIO backend driving the lines")
		(@arg clk: --clk +takes_value env("DS1302_CLK") default_value("18") "GPIO wired to CLK")
		(@arg dat: --dat +takes_value env("DS1302_DAT") default_value("19") "GPIO wired to DAT")
		(@arg rst: --rst +takes_value env("DS1302_RST") default_value("5") "GPIO wired to RST (chip select)")
		(@subcommand init =>
			(about: "configure the lines and leave them idle")
		)
		(@subcommand read =>
			(about: "print the time stored in the chip")
		)
		(@subcommand set =>
			(about: "write a time into the chip")
			(@arg now: --now conflicts_with[TIME] "use the current system time")
			(@arg utc: --utc requires[now] "use UTC instead of local time with --now")
			(@arg TIME: required_unless[now] "time to set (YYYY-MM-DD HH:MM:SS)")
		)
		(@subcommand watch =>
			(about: "print the time stored in the chip periodically")
			(@arg count: -n --count +takes_value "stop after this many reads")
			(@arg interval: -i --interval +takes_value default_value("1000") "milliseconds between reads")
		)
		(@subcommand dump =>
			(about: "show raw register contents")
		)
	).get_matches();

	match matches.subcommand() {
		("init", _) => {
			init(&matches)
		}
		("read", _) => {
			read(&matches)
		}
		("set", Some(sub_m)) => {
			set(&matches, sub_m)
		}
		("watch", Some(sub_m)) => {
			watch(&matches, sub_m)
		}
		("dump", _) => {
			dump(&matches)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
