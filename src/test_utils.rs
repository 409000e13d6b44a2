/*
 * Test utilities and fake hardware for lm90mon
 *
 * This module provides in-memory chips, a multi-device bus and a manual
 * clock that can be used across different test modules.
 */

#[cfg(test)]
pub mod test_utils {
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;

    use crate::clock::Clock;
    use crate::constants::registers;
    use crate::error::BusError;
    use crate::hw::SmbusBus;

    /// Default address of test chips
    pub const TEST_ADDRESS: u8 = 0x4c;

    /// Write-side register and the read-side register it shows up in
    const WRITE_MIRRORS: &[(u8, u8)] = &[
        (registers::CONFIG1_WRITE, registers::CONFIG1_READ),
        (registers::CONVRATE_WRITE, registers::CONVRATE_READ),
        (registers::LOCAL_HIGH_WRITE, registers::LOCAL_HIGH_READ),
        (registers::LOCAL_LOW_WRITE, registers::LOCAL_LOW_READ),
        (registers::REMOTE_HIGH_HIGH_WRITE, registers::REMOTE_HIGH_HIGH_READ),
        (registers::REMOTE_LOW_HIGH_WRITE, registers::REMOTE_LOW_HIGH_READ),
    ];

    struct ChipState {
        address: u8,
        registers: [u8; 256],
        scripted: HashMap<u8, VecDeque<u8>>,
        reads: Vec<u8>,
        writes: Vec<(u8, u8)>,
        failing_reads: HashSet<u8>,
        failing_writes: HashSet<u8>,
        byte_data: bool,
    }

    /// In-memory register file answering at one address
    pub struct FakeChip {
        state: Mutex<ChipState>,
    }

    impl FakeChip {
        /// Blank chip (all registers zero) at [`TEST_ADDRESS`]
        pub fn new() -> Self {
            Self::at(TEST_ADDRESS)
        }

        pub fn at(address: u8) -> Self {
            Self {
                state: Mutex::new(ChipState {
                    address,
                    registers: [0; 256],
                    scripted: HashMap::new(),
                    reads: Vec::new(),
                    writes: Vec::new(),
                    failing_reads: HashSet::new(),
                    failing_writes: HashSet::new(),
                    byte_data: true,
                }),
            }
        }

        pub fn address(&self) -> u8 {
            self.state.lock().address
        }

        pub fn set_address(&self, address: u8) {
            self.state.lock().address = address;
        }

        pub fn set_register(&self, register: u8, value: u8) {
            self.state.lock().registers[register as usize] = value;
        }

        pub fn register(&self, register: u8) -> u8 {
            self.state.lock().registers[register as usize]
        }

        /// Values returned by the next reads of `register`, before falling back to the register file
        pub fn script_reads(&self, register: u8, values: &[u8]) {
            self.state
                .lock()
                .scripted
                .entry(register)
                .or_default()
                .extend(values.iter().copied());
        }

        pub fn fail_reads_of(&self, register: u8) {
            self.state.lock().failing_reads.insert(register);
        }

        pub fn fail_writes_of(&self, register: u8) {
            self.state.lock().failing_writes.insert(register);
        }

        pub fn set_byte_data(&self, supported: bool) {
            self.state.lock().byte_data = supported;
        }

        /// Read attempts of one register, failed ones included
        pub fn read_count(&self, register: u8) -> usize {
            self.state.lock().reads.iter().filter(|&&r| r == register).count()
        }

        pub fn total_reads(&self) -> usize {
            self.state.lock().reads.len()
        }

        /// Accepted writes in order
        pub fn writes(&self) -> Vec<(u8, u8)> {
            self.state.lock().writes.clone()
        }

        pub fn clear_log(&self) {
            let mut state = self.state.lock();
            state.reads.clear();
            state.writes.clear();
        }
    }

    impl Default for FakeChip {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SmbusBus for FakeChip {
        fn supports_byte_data(&self) -> bool {
            self.state.lock().byte_data
        }

        fn read_byte(&self, address: u8, register: u8) -> Result<u8, BusError> {
            let mut state = self.state.lock();
            if address != state.address {
                return Err(BusError::read(address, register, "no acknowledge"));
            }
            state.reads.push(register);
            if state.failing_reads.contains(&register) {
                return Err(BusError::read(address, register, "injected failure"));
            }
            if let Some(value) = state.scripted.get_mut(&register).and_then(|q| q.pop_front()) {
                return Ok(value);
            }
            Ok(state.registers[register as usize])
        }

        fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
            let mut state = self.state.lock();
            if address != state.address {
                return Err(BusError::write(address, register, value, "no acknowledge"));
            }
            if state.failing_writes.contains(&register) {
                return Err(BusError::write(address, register, value, "injected failure"));
            }
            state.writes.push((register, value));
            let target = WRITE_MIRRORS
                .iter()
                .find(|(write, _)| *write == register)
                .map_or(register, |(_, read)| *read);
            state.registers[target as usize] = value;
            Ok(())
        }
    }

    /// LM90 at [`TEST_ADDRESS`] that passes detection and identification
    pub fn lm90_chip() -> FakeChip {
        let chip = FakeChip::new();
        chip.set_register(registers::MAN_ID, 0x01);
        chip.set_register(registers::CHIP_ID, 0x21);
        chip.set_register(registers::CONFIG2, 0x00);
        chip.set_register(registers::CONVRATE_READ, 0x09);
        chip.set_register(registers::CONFIG1_READ, 0x00);
        chip
    }

    /// ADM1032 at [`TEST_ADDRESS`] that passes detection and identification
    pub fn adm1032_chip() -> FakeChip {
        let chip = FakeChip::new();
        chip.set_register(registers::MAN_ID, 0x41);
        chip.set_register(registers::CHIP_ID, 0x41);
        chip.set_register(registers::CONFIG1_READ, 0x00);
        chip
    }

    /// A bus segment with several chips on it
    pub struct FakeBus {
        chips: Vec<FakeChip>,
    }

    impl FakeBus {
        pub fn with_chips(chips: Vec<FakeChip>) -> Self {
            Self { chips }
        }

        pub fn chip(&self, address: u8) -> Option<&FakeChip> {
            self.chips.iter().find(|chip| chip.address() == address)
        }
    }

    impl SmbusBus for FakeBus {
        fn read_byte(&self, address: u8, register: u8) -> Result<u8, BusError> {
            self.chip(address)
                .ok_or_else(|| BusError::read(address, register, "no acknowledge"))?
                .read_byte(address, register)
        }

        fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
            self.chip(address)
                .ok_or_else(|| BusError::write(address, register, value, "no acknowledge"))?
                .write_byte(address, register, value)
        }
    }

    /// Clock that only moves when told to
    #[derive(Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<Instant>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Arc::new(Mutex::new(Instant::now())),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.now.lock() += by;
        }

        pub fn rewind(&self, by: Duration) {
            *self.now.lock() -= by;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock()
        }
    }
}
