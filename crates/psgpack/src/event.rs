//! Encoder input: a chronological log of register writes and waits.
//!
//! Time is measured in 44.1 kHz samples, the unit used by VGM. The encoder
//! quantizes waits into playback ticks using a [`TickRate`].

use crate::chip::register::{Register, RegisterWrite};

/// Sample rate of the source time domain.
pub const SAMPLE_RATE: u32 = 44_100;

/// Playback tick rate, expressed as samples per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickRate {
    /// 60 Hz (735 samples per tick).
    #[default]
    Ntsc,
    /// 50 Hz (882 samples per tick).
    Pal,
}

impl TickRate {
    pub const fn samples_per_tick(self) -> u32 {
        match self {
            TickRate::Ntsc => 735,
            TickRate::Pal => 882,
        }
    }
}

/// One entry of an [`EventLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A logical register write carrying the register's full new value.
    Write(RegisterWrite),
    /// Wait the given number of samples before the next event.
    Wait(u32),
    /// Playback loops back to this point once the log has been played.
    LoopStart,
}

/// Ordered register-write log with an optional loop marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn push_write(&mut self, register: Register, value: u16) {
        self.events
            .push(Event::Write(RegisterWrite::new(register, value)));
    }

    pub fn push_wait(&mut self, samples: u32) {
        self.events.push(Event::Wait(samples));
    }

    /// Mark the current end of the log as the loop point.
    pub fn mark_loop(&mut self) {
        self.events.push(Event::LoopStart);
    }

    /// Place the loop marker at a sample position, replacing any marker
    /// already present.
    ///
    /// A position inside a wait splits the wait around the marker. A
    /// position past the end of the log puts the marker at the very end.
    pub fn set_loop_at_sample(&mut self, sample: u64) {
        self.events.retain(|e| *e != Event::LoopStart);

        let mut elapsed = 0u64;
        for i in 0..self.events.len() {
            if elapsed >= sample {
                self.events.insert(i, Event::LoopStart);
                return;
            }
            if let Event::Wait(n) = self.events[i] {
                let end = elapsed + u64::from(n);
                if end > sample {
                    // elapsed < sample < end, so both halves are non-empty
                    let head = (sample - elapsed) as u32;
                    self.events.splice(
                        i..=i,
                        [Event::Wait(head), Event::LoopStart, Event::Wait(n - head)],
                    );
                    return;
                }
                elapsed = end;
            }
        }
        self.events.push(Event::LoopStart);
    }

    pub fn has_loop(&self) -> bool {
        self.events.contains(&Event::LoopStart)
    }

    /// Sum of every wait in the log.
    pub fn total_samples(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                Event::Wait(n) => u64::from(*n),
                _ => 0,
            })
            .sum()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl Extend<Event> for EventLog {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
