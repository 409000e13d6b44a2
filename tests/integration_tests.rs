/*
 * Integration tests for lm90mon
 *
 * These tests drive the public API against a simulated chip and verify
 * the interaction between probing, initialization, caching and the
 * channel table as a whole.
 */

use lm90mon::constants::registers;
use lm90mon::{
    format_channel_values, load_config, parse_channel_values, save_config, BusError, Channel,
    Clock, DeviceRegistry, DeviceVariant, DriverConfig, ForcedDevice, LimitUpdate, Lm90Error,
    ProbeMode, SmbusBus,
};
use parking_lot::Mutex;
use serial_test::serial;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Simulated LM90 family chip with a plain register file
struct SimChip {
    address: u8,
    regs: Mutex<[u8; 256]>,
    reads: Mutex<usize>,
    broken: Mutex<bool>,
}

impl SimChip {
    fn new(address: u8, manufacturer_id: u8, chip_id: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[registers::MAN_ID as usize] = manufacturer_id;
        regs[registers::CHIP_ID as usize] = chip_id;
        // Powered up in standby
        regs[registers::CONFIG1_READ as usize] = 0x40;
        Self {
            address,
            regs: Mutex::new(regs),
            reads: Mutex::new(0),
            broken: Mutex::new(false),
        }
    }

    fn lm90(address: u8) -> Self {
        Self::new(address, 0x01, 0x21)
    }

    fn adm1032(address: u8) -> Self {
        Self::new(address, 0x41, 0x42)
    }

    fn set(&self, register: u8, value: u8) {
        self.regs.lock()[register as usize] = value;
    }

    fn get(&self, register: u8) -> u8 {
        self.regs.lock()[register as usize]
    }

    fn reads(&self) -> usize {
        *self.reads.lock()
    }

    fn break_bus(&self) {
        *self.broken.lock() = true;
    }
}

/// Write registers that land in a different read register
fn read_side(register: u8) -> u8 {
    match register {
        0x09..=0x0E => register - 0x06,
        other => other,
    }
}

struct SimBus {
    chips: Vec<SimChip>,
}

impl SimBus {
    fn chip(&self, address: u8) -> Option<&SimChip> {
        self.chips.iter().find(|c| c.address == address)
    }
}

impl SmbusBus for SimBus {
    fn read_byte(&self, address: u8, register: u8) -> Result<u8, BusError> {
        let chip = self
            .chip(address)
            .ok_or_else(|| BusError::read(address, register, "nack"))?;
        if *chip.broken.lock() {
            return Err(BusError::read(address, register, "arbitration lost"));
        }
        *chip.reads.lock() += 1;
        Ok(chip.get(register))
    }

    fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
        let chip = self
            .chip(address)
            .ok_or_else(|| BusError::write(address, register, value, "nack"))?;
        if *chip.broken.lock() {
            return Err(BusError::write(address, register, value, "arbitration lost"));
        }
        chip.set(read_side(register), value);
        Ok(())
    }
}

#[derive(Clone)]
struct StepClock(Arc<Mutex<Instant>>);

impl StepClock {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Instant::now())))
    }

    fn step(&self, by: Duration) {
        *self.0.lock() += by;
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        *self.0.lock()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn bus_with(chips: Vec<SimChip>) -> Arc<SimBus> {
    Arc::new(SimBus { chips })
}

#[test]
#[serial]
fn test_scan_attach_and_read() {
    init_tracing();
    let bus = bus_with(vec![SimChip::lm90(0x4c)]);
    let registry = DeviceRegistry::with_clock(StepClock::new());

    let devices = registry.scan(&bus, &DriverConfig::default());
    assert_eq!(devices.len(), 1);
    let device = &devices[0];
    assert_eq!(device.variant(), DeviceVariant::Lm90);
    assert_eq!(device.name(), "lm90");

    // Initialization left the chip running with default limits
    let chip = bus.chip(0x4c).unwrap();
    assert_eq!(chip.get(registers::CONFIG1_READ) & 0x40, 0);
    assert_eq!(chip.get(registers::CONVRATE_READ), 5);

    chip.set(registers::LOCAL_TEMP, 38);
    chip.set(registers::REMOTE_TEMP_HIGH, 0x2D);
    chip.set(registers::REMOTE_TEMP_LOW, 0x40);

    assert_eq!(device.read_channel(Channel::Temp1).unwrap(), vec![70, 5, 38]);
    assert_eq!(device.read_channel(Channel::Temp2).unwrap(), vec![700, 50, 453]);
    assert_eq!(device.read_channel(Channel::Tcrit1).unwrap(), vec![85]);
    assert_eq!(device.read_channel(Channel::Tcrit2).unwrap(), vec![85]);
    assert_eq!(device.read_channel(Channel::Hyst).unwrap(), vec![10]);
    assert_eq!(device.read_channel(Channel::Alarms).unwrap(), vec![0]);
}

#[test]
#[serial]
fn test_scan_skips_foreign_chips() {
    init_tracing();
    // 0x4d answers but fails identification, 0x4e is empty
    let bus = bus_with(vec![SimChip::lm90(0x4c), SimChip::new(0x4d, 0x23, 0x00)]);
    let config = DriverConfig {
        candidate_addresses: vec![0x4c, 0x4d, 0x4e],
        ..DriverConfig::default()
    };
    let registry = DeviceRegistry::with_clock(StepClock::new());

    let addresses: Vec<_> = registry.scan(&bus, &config).iter().map(|d| d.address()).collect();
    assert_eq!(addresses, vec![0x4c]);
    assert_eq!(registry.addresses(), vec![0x4c]);
}

#[test]
#[serial]
fn test_forced_variant_on_ignored_address() {
    init_tracing();
    let bus = bus_with(vec![SimChip::adm1032(0x4c)]);
    let config = DriverConfig {
        ignored_addresses: vec![0x4c],
        forced: vec![ForcedDevice {
            address: 0x4c,
            variant: Some(DeviceVariant::Lm90),
        }],
        ..DriverConfig::default()
    };
    let registry = DeviceRegistry::with_clock(StepClock::new());

    let devices = registry.scan(&bus, &config);
    assert_eq!(devices.len(), 1);
    // Forced variant wins over what the chip reports
    assert_eq!(devices[0].variant(), DeviceVariant::Lm90);
}

#[test]
#[serial]
fn test_channel_text_round_trip() {
    init_tracing();
    let bus = bus_with(vec![SimChip::lm90(0x4c)]);
    let registry = DeviceRegistry::with_clock(StepClock::new());
    let device = registry
        .attach(&bus, 0x4c, ProbeMode::Identify, &DriverConfig::default())
        .unwrap();

    let channel: Channel = "temp2".parse().unwrap();
    let values = parse_channel_values("75.5 -12.5", channel.magnitude()).unwrap();
    device.write_channel(channel, &values).unwrap();

    let chip = bus.chip(0x4c).unwrap();
    assert_eq!(chip.get(registers::REMOTE_HIGH_HIGH_READ), 0x4B);
    assert_eq!(chip.get(registers::REMOTE_HIGH_LOW), 0x80);

    let text = format_channel_values(&device.read_channel(channel).unwrap(), channel.magnitude());
    assert!(text.starts_with("75.5 -12.5 "), "unexpected rendering: {}", text);
}

#[test]
#[serial]
fn test_cache_window_and_stale_fallback() {
    init_tracing();
    let bus = bus_with(vec![SimChip::lm90(0x4c)]);
    let clock = StepClock::new();
    let registry = DeviceRegistry::with_clock(clock.clone());
    let device = registry
        .attach(&bus, 0x4c, ProbeMode::Detect, &DriverConfig::default())
        .unwrap();
    let chip = bus.chip(0x4c).unwrap();

    chip.set(registers::LOCAL_TEMP, 40);
    device.local_temp().unwrap();
    let reads = chip.reads();

    chip.set(registers::LOCAL_TEMP, 45);
    clock.step(Duration::from_millis(1999));
    assert_eq!(device.local_temp().unwrap().input, 40);
    assert_eq!(chip.reads(), reads);

    clock.step(Duration::from_millis(2));
    assert_eq!(device.local_temp().unwrap().input, 45);

    chip.break_bus();
    clock.step(Duration::from_secs(5));
    assert_eq!(device.local_temp().unwrap().input, 45);

    // A failed write forces a refresh, which fails too, so the last good values are kept
    let err = device.set_local_limits(LimitUpdate::high(65)).unwrap_err();
    assert!(err.is_bus_error());
    let local = device.local_temp().unwrap();
    assert_eq!(local.input, 45);
    assert_eq!(local.high, 70);
}

#[test]
#[serial]
fn test_unread_device_reports_bus_fault() {
    init_tracing();
    let bus = bus_with(vec![SimChip::lm90(0x4c)]);
    let registry = DeviceRegistry::with_clock(StepClock::new());
    let device = registry
        .attach(&bus, 0x4c, ProbeMode::Detect, &DriverConfig::default())
        .unwrap();

    bus.chip(0x4c).unwrap().break_bus();
    assert!(matches!(device.local_temp(), Err(Lm90Error::Bus(_))));
}

#[test]
#[serial]
fn test_concurrent_access_to_one_device() {
    init_tracing();
    let bus = bus_with(vec![SimChip::lm90(0x4c)]);
    let registry = Arc::new(DeviceRegistry::with_clock(StepClock::new()));
    registry
        .attach(&bus, 0x4c, ProbeMode::Detect, &DriverConfig::default())
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                let device = registry.get(0x4c).unwrap();
                for n in 0..25 {
                    if i % 2 == 0 {
                        device.set_remote_limits(LimitUpdate::high(600 + n)).unwrap();
                    } else {
                        let remote = device.remote_temp().unwrap();
                        assert!((600..=700).contains(&remote.high));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
#[serial]
fn test_config_file_drives_bring_up() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lm90mon.json");

    let mut config = DriverConfig {
        staleness_window_ms: 500,
        candidate_addresses: vec![0x4c, 0x4d],
        ..DriverConfig::default()
    };
    config.init.high = 60;
    config.init.hyst = 5;
    save_config(&path, &config).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded, config);

    let bus = bus_with(vec![SimChip::adm1032(0x4d)]);
    let registry = DeviceRegistry::with_clock(StepClock::new());
    let devices = registry.scan(&bus, &loaded);
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].variant(), DeviceVariant::Adm1032);
    assert_eq!(devices[0].staleness_window(), Duration::from_millis(500));

    let local = devices[0].local_temp().unwrap();
    assert_eq!(local.high, 60);
    assert_eq!(devices[0].hysteresis().unwrap(), 5);
}
