// src/mock.rs

//! Recording transport, delay and SPI bus / CS pin for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::command::Command;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Init,
    Select,
    Deselect,
    Byte(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Answers reads the way an SST25VF032B would, from scripted values.
pub struct MockTransport {
    pub events: Vec<Event>,
    /// Served one per status read; `idle_status` once empty.
    pub statuses: VecDeque<u8>,
    pub idle_status: u8,
    pub id: [u8; 2],
    pub jedec_id: [u8; 3],
    /// Returned byte by byte for the data phase of read commands.
    pub memory: Vec<u8>,
    /// Fail the n-th `transfer_byte` call (zero based).
    pub fail_transfer_at: Option<usize>,
    pub fail_select: bool,
    frame: Vec<u8>,
    transfers: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            statuses: VecDeque::new(),
            idle_status: 0x00,
            id: [0xBF, 0x4A],
            jedec_id: [0xBF, 0x25, 0x4A],
            memory: Vec::new(),
            fail_transfer_at: None,
            fail_select: false,
            frame: Vec::new(),
            transfers: 0,
        }
    }

    pub fn with_statuses(statuses: &[u8]) -> Self {
        let mut t = Self::new();
        t.statuses = statuses.iter().copied().collect();
        t
    }

    pub fn selects(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Select).count()
    }

    pub fn deselects(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Deselect).count()
    }

    /// Bytes sent inside each select/deselect span.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        let mut current: Option<Vec<u8>> = None;
        for event in &self.events {
            match event {
                Event::Select => current = Some(Vec::new()),
                Event::Deselect => {
                    if let Some(frame) = current.take() {
                        frames.push(frame);
                    }
                }
                Event::Byte(b) => {
                    if let Some(frame) = current.as_mut() {
                        frame.push(*b);
                    }
                }
                Event::Init => {}
            }
        }
        frames
    }

    /// Frames with status reads filtered out.
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.frames()
            .into_iter()
            .filter(|f| f.first() != Some(&Command::ReadStatus.opcode()))
            .collect()
    }

    pub fn count_opcode(&self, cmd: Command) -> usize {
        self.frames()
            .iter()
            .filter(|f| f.first() == Some(&cmd.opcode()))
            .count()
    }

    fn respond(&mut self, position: usize) -> u8 {
        let Some(&opcode) = self.frame.first() else {
            return 0xFF;
        };
        match opcode {
            op if op == Command::ReadStatus.opcode() && position == 1 => {
                self.statuses.pop_front().unwrap_or(self.idle_status)
            }
            op if op == Command::ReadJedecId.opcode() && (1..=3).contains(&position) => {
                self.jedec_id[position - 1]
            }
            op if op == Command::ReadId.opcode() && (4..=5).contains(&position) => {
                self.id[position - 4]
            }
            op if op == Command::Read.opcode() && position >= 4 => {
                self.memory.get(position - 4).copied().unwrap_or(0xFF)
            }
            op if op == Command::HighSpeedRead.opcode() && position >= 5 => {
                self.memory.get(position - 5).copied().unwrap_or(0xFF)
            }
            _ => 0xFF,
        }
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn init(&mut self) -> Result<(), MockError> {
        self.events.push(Event::Init);
        Ok(())
    }

    fn assert_select(&mut self) -> Result<(), MockError> {
        self.events.push(Event::Select);
        self.frame.clear();
        if self.fail_select {
            return Err(MockError);
        }
        Ok(())
    }

    fn deassert_select(&mut self) -> Result<(), MockError> {
        self.events.push(Event::Deselect);
        Ok(())
    }

    fn transfer_byte(&mut self, tx: u8) -> Result<u8, MockError> {
        let index = self.transfers;
        self.transfers += 1;
        if self.fail_transfer_at == Some(index) {
            return Err(MockError);
        }
        self.events.push(Event::Byte(tx));
        self.frame.push(tx);
        let position = self.frame.len() - 1;
        Ok(self.respond(position))
    }
}

/// Returns immediately, remembers how long it was asked to wait.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

impl embedded_hal::spi::Error for MockError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

impl embedded_hal::digital::Error for MockError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// What the SPI bus and /CS pin were asked to do, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalEvent {
    Transfer(u8),
    Flush,
    CsLow,
    CsHigh,
}

pub type HalLog = Rc<RefCell<Vec<HalEvent>>>;

/// `SpiBus<u8>` answering each exchanged byte from `replies` (0xFF once empty).
pub struct MockSpiBus {
    pub log: HalLog,
    pub replies: VecDeque<u8>,
    pub fail_flush: bool,
}

impl MockSpiBus {
    pub fn new(log: &HalLog) -> Self {
        Self {
            log: Rc::clone(log),
            replies: VecDeque::new(),
            fail_flush: false,
        }
    }
}

impl embedded_hal::spi::ErrorType for MockSpiBus {
    type Error = MockError;
}

impl SpiBus<u8> for MockSpiBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), MockError> {
        for word in words.iter_mut() {
            self.log.borrow_mut().push(HalEvent::Transfer(0x00));
            *word = self.replies.pop_front().unwrap_or(0xFF);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), MockError> {
        for &word in words {
            self.log.borrow_mut().push(HalEvent::Transfer(word));
            self.replies.pop_front();
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), MockError> {
        for (i, &word) in write.iter().enumerate() {
            self.log.borrow_mut().push(HalEvent::Transfer(word));
            let reply = self.replies.pop_front().unwrap_or(0xFF);
            if let Some(slot) = read.get_mut(i) {
                *slot = reply;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), MockError> {
        for word in words.iter_mut() {
            self.log.borrow_mut().push(HalEvent::Transfer(*word));
            *word = self.replies.pop_front().unwrap_or(0xFF);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockError> {
        self.log.borrow_mut().push(HalEvent::Flush);
        if self.fail_flush {
            return Err(MockError);
        }
        Ok(())
    }
}

/// `OutputPin` for /CS sharing the bus log.
pub struct MockCsPin {
    pub log: HalLog,
    pub fail: bool,
}

impl MockCsPin {
    pub fn new(log: &HalLog) -> Self {
        Self {
            log: Rc::clone(log),
            fail: false,
        }
    }
}

impl embedded_hal::digital::ErrorType for MockCsPin {
    type Error = MockError;
}

impl OutputPin for MockCsPin {
    fn set_low(&mut self) -> Result<(), MockError> {
        self.log.borrow_mut().push(HalEvent::CsLow);
        if self.fail {
            return Err(MockError);
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), MockError> {
        self.log.borrow_mut().push(HalEvent::CsHigh);
        if self.fail {
            return Err(MockError);
        }
        Ok(())
    }
}
