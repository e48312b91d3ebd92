//! Platinum Cooler Control CLI
//!
//! Command-line interface for monitoring and controlling Corsair Hydro
//! Platinum coolers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::CString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use platinum_cooler::config::{self, DeviceDescriptor};
use platinum_cooler::device::{FanControl, HidTransport, PlatinumDevice, PumpControl};
use platinum_cooler::protocol::{FanMode, ModeSetting, ModeStatus};
use platinum_cooler::utils::parsing::{parse_curve, parse_fan_mode, parse_pump_mode};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Corsair Hydro Platinum Control Tool
#[derive(Parser, Debug)]
#[command(name = "platinum-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// USB product id of the cooler (hex, e.g. 0c18)
    #[arg(long, value_parser = parse_hex_u16, default_value = "0c18")]
    product_id: u16,

    /// Device descriptor JSON (defaults to the config directory file, if present)
    #[arg(long)]
    device_file: Option<PathBuf>,

    /// HID path of the cooler, when several are connected
    #[arg(long)]
    path: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show device name, vendor and firmware version
    Info,

    /// Show how many fans the unit drives
    FanCount,

    /// Show the mode of a fan channel
    FanMode {
        /// Fan channel
        #[arg(short, long, default_value = "0")]
        channel: u8,
    },

    /// Show the live speed of a fan channel
    FanSpeed {
        /// Fan channel
        #[arg(short, long, default_value = "0")]
        channel: u8,
    },

    /// Set a fixed fan speed in RPM
    SetFanRpm {
        /// Fan channel
        #[arg(short, long, default_value = "0")]
        channel: u8,

        /// Target speed in RPM
        rpm: u16,
    },

    /// Set a fixed fan PWM duty
    SetFanPwm {
        /// Fan channel
        #[arg(short, long, default_value = "0")]
        channel: u8,

        /// PWM duty (0-255)
        pwm: u8,
    },

    /// Set a fan mode
    SetFanMode {
        /// Fan channel
        #[arg(short, long, default_value = "0")]
        channel: u8,

        /// performance, balanced, quiet, default, custom, fixed-rpm:XXXX, fixed-pwm:XXX
        mode: String,
    },

    /// Show the pump mode
    PumpMode,

    /// Show the live pump speed
    PumpSpeed,

    /// Apply a pump curve preset
    SetPumpMode {
        /// quiet, balanced, performance or default
        mode: String,
    },

    /// Upload a custom pump curve
    SetPumpCurve {
        /// Five temperature:speed pairs, e.g. 25:20,30:40,35:60,40:80,45:100
        curve: String,
    },
}

fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{}': {}", s, e))
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cooler = open_cooler(&args)?;

    match args.command {
        Command::Info => cmd_info(&cooler),
        Command::FanCount => cmd_fan_count(&cooler),
        Command::FanMode { channel } => cmd_fan_mode(&cooler, channel),
        Command::FanSpeed { channel } => cmd_fan_speed(&cooler, channel),
        Command::SetFanRpm { channel, rpm } => {
            cmd_set_fan_mode(&cooler, channel, FanMode::FixedRpm(rpm))
        }
        Command::SetFanPwm { channel, pwm } => {
            cmd_set_fan_mode(&cooler, channel, FanMode::FixedPwm(pwm))
        }
        Command::SetFanMode { channel, mode } => {
            let mode = parse_fan_mode(&mode)?;
            cmd_set_fan_mode(&cooler, channel, mode)
        }
        Command::PumpMode => cmd_pump_mode(&cooler),
        Command::PumpSpeed => cmd_pump_speed(&cooler),
        Command::SetPumpMode { mode } => cmd_set_pump_mode(&cooler, &mode),
        Command::SetPumpCurve { curve } => cmd_set_pump_curve(&cooler, &curve),
    }
}

type Cooler = PlatinumDevice<HidTransport>;

fn resolve_descriptor(args: &Args) -> Result<DeviceDescriptor> {
    if let Some(path) = &args.device_file {
        return DeviceDescriptor::load(path)
            .with_context(|| format!("Failed to load device file {}", path.display()));
    }

    if let Ok(path) = config::default_descriptor_path()
        && path.exists()
    {
        return DeviceDescriptor::load(&path)
            .with_context(|| format!("Failed to load device file {}", path.display()));
    }

    DeviceDescriptor::by_product_id(args.product_id).with_context(|| {
        format!(
            "Unknown product id {:04x}. Pass --device-file to describe it.",
            args.product_id
        )
    })
}

fn open_cooler(args: &Args) -> Result<Cooler> {
    let descriptor = resolve_descriptor(args)?;

    let transport = match &args.path {
        Some(path) => {
            let path = CString::new(path.as_str()).context("HID path contains a NUL byte")?;
            HidTransport::open_path(&path, descriptor.timeout_ms)
        }
        None => HidTransport::open(&descriptor),
    }
    .with_context(|| format!("Failed to open {}", descriptor.name))?;

    Ok(PlatinumDevice::new(transport, descriptor))
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_info(cooler: &Cooler) -> Result<()> {
    let firmware = cooler
        .firmware_version()
        .context("Failed to read firmware version")?;

    println!("Vendor:   {}", cooler.vendor());
    println!("Product:  {}", cooler.product());
    println!("Device:   {:#04X}", cooler.device_id());
    println!("Firmware: {}", firmware);
    Ok(())
}

fn cmd_fan_count(cooler: &Cooler) -> Result<()> {
    let mut fan = FanControl::new(0);
    cooler
        .fan_count(&mut fan)
        .context("Failed to read fan count")?;
    println!("Fans: {}", fan.fan_count);
    Ok(())
}

fn cmd_fan_mode(cooler: &Cooler, channel: u8) -> Result<()> {
    let mut fan = FanControl::new(channel);
    cooler
        .fan_mode(&mut fan)
        .context("Failed to read fan mode")?;

    // Fetch the fixed value so the mode prints with it
    if let ModeStatus::Connected { setting, .. } = fan.mode_status() {
        match setting {
            ModeSetting::FixedRpm { .. } => cooler.fan_fixed_rpm(&mut fan)?,
            ModeSetting::FixedPwm { .. } => cooler.fan_fixed_pwm(&mut fan)?,
            _ => {}
        }
    }

    println!("Fan {}: {}", channel, fan.mode_status());
    Ok(())
}

fn cmd_fan_speed(cooler: &Cooler, channel: u8) -> Result<()> {
    let mut fan = FanControl::new(channel);
    cooler
        .fan_count(&mut fan)
        .context("Failed to read fan count")?;
    cooler
        .fan_speed(&mut fan)
        .context("Failed to read fan speed")?;
    println!("Fan {}: {} RPM", channel, fan.speed_rpm);
    Ok(())
}

fn cmd_set_fan_mode(cooler: &Cooler, channel: u8, mode: FanMode) -> Result<()> {
    let mut fan = FanControl::new(channel);
    cooler
        .set_fan_mode(&mut fan, mode)
        .context("Failed to set fan mode")?;
    println!("Fan {} set to {}", channel, mode);
    Ok(())
}

fn cmd_pump_mode(cooler: &Cooler) -> Result<()> {
    let mut pump = PumpControl::new(0);
    cooler
        .pump_mode(&mut pump)
        .context("Failed to read pump mode")?;
    println!("Pump: {}", pump.mode_status());
    Ok(())
}

fn cmd_pump_speed(cooler: &Cooler) -> Result<()> {
    let mut pump = PumpControl::new(0);
    cooler
        .pump_speed(&mut pump)
        .context("Failed to read pump speed")?;
    println!("Pump: {} RPM", pump.speed);
    Ok(())
}

fn cmd_set_pump_mode(cooler: &Cooler, name: &str) -> Result<()> {
    let mode = parse_pump_mode(name)?;
    let mut pump = PumpControl::new(0);
    cooler
        .set_pump_mode(&mut pump, mode)
        .context("Failed to set pump mode")?;
    println!("Pump set to {} ({})", mode, pump.table);
    Ok(())
}

fn cmd_set_pump_curve(cooler: &Cooler, curve: &str) -> Result<()> {
    let mut pump = PumpControl::new(0);
    pump.table = parse_curve(curve)?;
    cooler
        .set_pump_curve(&pump)
        .context("Failed to upload pump curve")?;
    println!("Pump curve set: {}", pump.table);
    Ok(())
}
